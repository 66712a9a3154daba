// ABOUTME: Invoice and receipt templates with a single default per organization

pub mod storage;
pub mod types;

pub use storage::TemplateStorage;
pub use types::{Template, TemplateCreateInput, TemplateKind, TemplateUpdateInput};
