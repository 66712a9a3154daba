use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Workflow,
    Reminder,
    Approval,
    System,
}

impl Default for NotificationKind {
    fn default() -> Self {
        NotificationKind::System
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NotificationKind::Workflow => "workflow",
            NotificationKind::Reminder => "reminder",
            NotificationKind::Approval => "approval",
            NotificationKind::System => "system",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "workflow" => Ok(NotificationKind::Workflow),
            "reminder" => Ok(NotificationKind::Reminder),
            "approval" => Ok(NotificationKind::Approval),
            "system" => Ok(NotificationKind::System),
            _ => Err(format!("Unknown notification kind: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub organization_id: String,
    pub recipient_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
