// ABOUTME: Employee feedback entity
// ABOUTME: Create/respond/status lifecycle with optional employee reference

pub mod storage;
pub mod types;

pub use storage::FeedbackStorage;
pub use types::{Feedback, FeedbackCategory, FeedbackCreateInput, FeedbackFilter, FeedbackStatus};
