pub mod mailer;
pub mod notifier;
pub mod songlink;
pub mod storage;

pub use mailer::Mailer;
pub use songlink::SonglinkService;
pub use storage::{AssetKind, StorageService};
