// ABOUTME: Project entity with member assignment
// ABOUTME: CRUD scoped by organization, members populated from employees

pub mod storage;
pub mod types;

pub use storage::ProjectStorage;
pub use types::{
    Project, ProjectCreateInput, ProjectFilter, ProjectMember, ProjectPriority, ProjectStatus,
    ProjectUpdateInput,
};
