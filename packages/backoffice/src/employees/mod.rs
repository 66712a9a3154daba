// ABOUTME: Employee records scoped by organization
// ABOUTME: CRUD plus the terminate transition

pub mod storage;
pub mod types;

pub use storage::EmployeeStorage;
pub use types::{
    Employee, EmployeeCreateInput, EmployeeFilter, EmployeeStatus, EmployeeUpdateInput,
};
