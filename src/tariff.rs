//! Tariff policy: the single source of truth for what a subscription tier
//! allows. Consulted by server-side submission validation and by the
//! analytics read path; never trust the client to have applied these gates.

use serde::Serialize;
use std::ops::RangeInclusive;

use crate::db::entities::user::Tariff;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TariffCapabilities {
    pub can_submit_instrumental: bool,
    pub can_use_ffp: bool,
    pub can_view_country_analytics: bool,
    pub can_manage_artist_card: bool,
    pub revenue_share_percent: u8,
    #[serde(skip)]
    pub moderation_sla_hours: RangeInclusive<u32>,
    pub delivery_sla_hours_min: u32,
}

pub fn capabilities(tariff: Tariff) -> TariffCapabilities {
    match tariff {
        Tariff::Basic => TariffCapabilities {
            can_submit_instrumental: false,
            can_use_ffp: false,
            can_view_country_analytics: false,
            can_manage_artist_card: false,
            revenue_share_percent: 80,
            moderation_sla_hours: 24..=48,
            delivery_sla_hours_min: 24,
        },
        Tariff::Premium => TariffCapabilities {
            can_submit_instrumental: true,
            can_use_ffp: true,
            can_view_country_analytics: true,
            can_manage_artist_card: true,
            revenue_share_percent: 85,
            moderation_sla_hours: 12..=24,
            delivery_sla_hours_min: 6,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn basic_tier_is_fully_gated() {
        let caps = capabilities(Tariff::Basic);
        assert!(!caps.can_submit_instrumental);
        assert!(!caps.can_use_ffp);
        assert!(!caps.can_view_country_analytics);
        assert!(!caps.can_manage_artist_card);
        assert_eq!(caps.revenue_share_percent, 80);
        assert_eq!(caps.moderation_sla_hours, 24..=48);
        assert_eq!(caps.delivery_sla_hours_min, 24);
    }

    #[test]
    fn premium_tier_unlocks_everything() {
        let caps = capabilities(Tariff::Premium);
        assert!(caps.can_submit_instrumental);
        assert!(caps.can_use_ffp);
        assert!(caps.can_view_country_analytics);
        assert!(caps.can_manage_artist_card);
        assert_eq!(caps.revenue_share_percent, 85);
        assert_eq!(caps.moderation_sla_hours, 12..=24);
        assert_eq!(caps.delivery_sla_hours_min, 6);
    }
}
