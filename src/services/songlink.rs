//! Client for the external music-link lookup API (song.link / Odesli).
//!
//! Lookup is strictly best-effort: an unreachable service, a non-JSON
//! answer or an empty match all come back as `None` so the caller can fall
//! back to manual link entry.

use reqwest::Client;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

const API_TIMEOUT: Duration = Duration::from_secs(30);

/// API platform key -> display name used in the stored platform-link map.
const PLATFORMS: &[(&str, &str)] = &[
    ("spotify", "Spotify"),
    ("appleMusic", "Apple Music"),
    ("yandex", "Yandex Music"),
    ("youtubeMusic", "YouTube Music"),
    ("deezer", "Deezer"),
];

#[derive(Clone)]
pub struct SonglinkService {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct LinksResponse {
    #[serde(rename = "linksByPlatform", default)]
    links_by_platform: HashMap<String, PlatformEntry>,
}

#[derive(Debug, Deserialize)]
struct PlatformEntry {
    url: String,
}

impl SonglinkService {
    pub fn new(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(API_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self { client, base_url }
    }

    /// Look up platform links for a free-text query ("title artist").
    /// Returns `None` when the service is unreachable or finds nothing.
    pub async fn lookup(&self, query: &str) -> Option<BTreeMap<String, String>> {
        let url = format!(
            "{}/v1-alpha.1/links?userCountry=US&songIfNoneFound=true&q={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(query)
        );

        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Link lookup request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!("Link lookup returned status {}", response.status());
            return None;
        }

        let parsed: LinksResponse = match response.json().await {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("Link lookup returned malformed body: {}", e);
                return None;
            }
        };

        let links: BTreeMap<String, String> = PLATFORMS
            .iter()
            .filter_map(|(key, name)| {
                parsed
                    .links_by_platform
                    .get(*key)
                    .map(|entry| (name.to_string(), entry.url.clone()))
            })
            .collect();

        if links.is_empty() {
            None
        } else {
            Some(links)
        }
    }
}
