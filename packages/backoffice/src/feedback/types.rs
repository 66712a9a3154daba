use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle of a feedback entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeedbackStatus {
    New,
    UnderReview,
    Responded,
    Resolved,
    Closed,
}

impl Default for FeedbackStatus {
    fn default() -> Self {
        FeedbackStatus::New
    }
}

impl fmt::Display for FeedbackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FeedbackStatus::New => "new",
            FeedbackStatus::UnderReview => "under-review",
            FeedbackStatus::Responded => "responded",
            FeedbackStatus::Resolved => "resolved",
            FeedbackStatus::Closed => "closed",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for FeedbackStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(FeedbackStatus::New),
            "under-review" => Ok(FeedbackStatus::UnderReview),
            "responded" => Ok(FeedbackStatus::Responded),
            "resolved" => Ok(FeedbackStatus::Resolved),
            "closed" => Ok(FeedbackStatus::Closed),
            _ => Err(format!("Unknown feedback status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeedbackCategory {
    Workplace,
    Management,
    Compensation,
    Culture,
    Other,
}

impl Default for FeedbackCategory {
    fn default() -> Self {
        FeedbackCategory::Other
    }
}

impl fmt::Display for FeedbackCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FeedbackCategory::Workplace => "workplace",
            FeedbackCategory::Management => "management",
            FeedbackCategory::Compensation => "compensation",
            FeedbackCategory::Culture => "culture",
            FeedbackCategory::Other => "other",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for FeedbackCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "workplace" => Ok(FeedbackCategory::Workplace),
            "management" => Ok(FeedbackCategory::Management),
            "compensation" => Ok(FeedbackCategory::Compensation),
            "culture" => Ok(FeedbackCategory::Culture),
            "other" => Ok(FeedbackCategory::Other),
            _ => Err(format!("Unknown feedback category: {}", s)),
        }
    }
}

/// Populated employee reference attached at read time
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRef {
    pub id: String,
    pub name: String,
    pub department: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: String,
    pub organization_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee: Option<EmployeeRef>,
    pub subject: String,
    pub message: String,
    pub category: FeedbackCategory,
    pub rating: Option<i64>,
    pub anonymous: bool,
    pub status: FeedbackStatus,
    pub has_response: bool,
    pub response: Option<String>,
    pub responded_by: Option<String>,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a feedback entry
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackCreateInput {
    pub organization_id: String,
    pub employee_id: Option<String>,
    pub subject: String,
    pub message: String,
    #[serde(default)]
    pub category: FeedbackCategory,
    pub rating: Option<i64>,
    #[serde(default)]
    pub anonymous: bool,
    pub created_by: Option<String>,
}

/// Filters for listing feedback
#[derive(Debug, Clone, Default)]
pub struct FeedbackFilter {
    pub status: Option<FeedbackStatus>,
    pub category: Option<FeedbackCategory>,
}
