// ABOUTME: Job postings with a draft/published/closed lifecycle

pub mod storage;
pub mod types;

pub use storage::JobPostingStorage;
pub use types::{
    EmploymentType, JobPosting, JobPostingCreateInput, JobPostingFilter, JobPostingStatus,
    JobPostingUpdateInput,
};
