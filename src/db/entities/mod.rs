pub mod user;
pub mod release;
pub mod track;
pub mod notification;
pub mod analytics_report;
pub mod track_stat;
pub mod financial_report;
pub mod payout_request;
pub mod artist_request;
pub mod news;

pub use user::Entity as User;
pub use release::Entity as Release;
pub use track::Entity as Track;
pub use notification::Entity as Notification;
pub use analytics_report::Entity as AnalyticsReport;
pub use track_stat::Entity as TrackStat;
pub use financial_report::Entity as FinancialReport;
pub use payout_request::Entity as PayoutRequest;
pub use artist_request::Entity as ArtistRequest;
pub use news::Entity as News;
