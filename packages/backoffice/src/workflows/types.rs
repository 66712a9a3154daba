use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// A rule condition value. Three forms are accepted:
/// the literal string `"any"` (always matches), a `{min, max}` numeric
/// range, or a literal that must equal the event value exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Range {
        min: Option<f64>,
        max: Option<f64>,
    },
    Literal(serde_json::Value),
}

impl ConditionValue {
    pub fn is_any(&self) -> bool {
        matches!(self, ConditionValue::Literal(serde_json::Value::String(s)) if s == "any")
    }
}

/// One automation step executed when a rule matches
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum WorkflowAction {
    AutoApprove,
    RequireApproval {
        approver: String,
    },
    SendReminder {
        recipient: String,
        message: Option<String>,
    },
    Notify {
        recipients: Vec<String>,
        message: Option<String>,
    },
    UpdateCompliance {
        requirement: String,
    },
}

impl WorkflowAction {
    pub fn kind(&self) -> &'static str {
        match self {
            WorkflowAction::AutoApprove => "auto-approve",
            WorkflowAction::RequireApproval { .. } => "require-approval",
            WorkflowAction::SendReminder { .. } => "send-reminder",
            WorkflowAction::Notify { .. } => "notify",
            WorkflowAction::UpdateCompliance { .. } => "update-compliance",
        }
    }
}

/// Outcome of a single executed action
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    pub action: String,
    pub outcome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRule {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    pub event: String,
    pub conditions: HashMap<String, ConditionValue>,
    pub actions: Vec<WorkflowAction>,
    pub enabled: bool,
    pub escalation_hours: Option<f64>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRuleCreateInput {
    pub organization_id: String,
    pub name: String,
    pub event: String,
    #[serde(default)]
    pub conditions: HashMap<String, ConditionValue>,
    pub actions: Vec<WorkflowAction>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub escalation_hours: Option<f64>,
    pub created_by: Option<String>,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRuleUpdateInput {
    pub name: Option<String>,
    pub event: Option<String>,
    pub conditions: Option<HashMap<String, ConditionValue>>,
    pub actions: Option<Vec<WorkflowAction>>,
    pub enabled: Option<bool>,
    pub escalation_hours: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceStatus {
    Completed,
    Failed,
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceStatus::Completed => write!(f, "completed"),
            InstanceStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for InstanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "completed" => Ok(InstanceStatus::Completed),
            "failed" => Ok(InstanceStatus::Failed),
            _ => Err(format!("Unknown instance status: {}", s)),
        }
    }
}

/// Execution record of a matched rule
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowInstance {
    pub id: String,
    pub rule_id: String,
    pub organization_id: String,
    pub event: String,
    pub payload: serde_json::Value,
    pub action_results: Vec<ActionResult>,
    pub status: InstanceStatus,
    pub escalate_at: Option<DateTime<Utc>>,
    pub triggered_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An incoming event to match against the organization's rules
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerInput {
    pub organization_id: String,
    pub event: String,
    #[serde(default)]
    pub data: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub context: HashMap<String, serde_json::Value>,
    pub triggered_by: Option<String>,
}
