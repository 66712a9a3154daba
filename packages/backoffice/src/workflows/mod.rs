// ABOUTME: Workflow automation: event-matched rules with sequential actions
// ABOUTME: Rules and execution instances are persisted, not process memory

pub mod engine;
pub mod storage;
pub mod types;

pub use engine::WorkflowEngine;
pub use storage::WorkflowStorage;
pub use types::{
    ActionResult, ConditionValue, InstanceStatus, TriggerInput, WorkflowAction, WorkflowInstance,
    WorkflowRule, WorkflowRuleCreateInput, WorkflowRuleUpdateInput,
};
