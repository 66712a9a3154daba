// ABOUTME: Audit trail written by mutating handlers and workflow actions

pub mod storage;
pub mod types;

pub use storage::AuditStorage;
pub use types::{AuditEntry, AuditFilter};
