// ABOUTME: Notification dispatch used by handlers and workflow actions

pub mod storage;
pub mod types;

pub use storage::NotificationStorage;
pub use types::{Notification, NotificationKind};
