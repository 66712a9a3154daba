use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuggestionStatus {
    Open,
    UnderReview,
    Planned,
    Implemented,
    Declined,
}

impl Default for SuggestionStatus {
    fn default() -> Self {
        SuggestionStatus::Open
    }
}

impl fmt::Display for SuggestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SuggestionStatus::Open => "open",
            SuggestionStatus::UnderReview => "under-review",
            SuggestionStatus::Planned => "planned",
            SuggestionStatus::Implemented => "implemented",
            SuggestionStatus::Declined => "declined",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for SuggestionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(SuggestionStatus::Open),
            "under-review" => Ok(SuggestionStatus::UnderReview),
            "planned" => Ok(SuggestionStatus::Planned),
            "implemented" => Ok(SuggestionStatus::Implemented),
            "declined" => Ok(SuggestionStatus::Declined),
            _ => Err(format!("Unknown suggestion status: {}", s)),
        }
    }
}

/// Direction of a vote
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    Up,
    Down,
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoteType::Up => write!(f, "up"),
            VoteType::Down => write!(f, "down"),
        }
    }
}

impl FromStr for VoteType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(VoteType::Up),
            "down" => Ok(VoteType::Down),
            _ => Err(format!("Unknown vote type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub id: String,
    pub organization_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub status: SuggestionStatus,
    pub upvotes: i64,
    pub downvotes: i64,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionCreateInput {
    pub organization_id: String,
    pub title: String,
    pub description: String,
    #[serde(default = "default_category")]
    pub category: String,
    pub created_by: Option<String>,
}

fn default_category() -> String {
    "other".to_string()
}

#[derive(Debug, Clone, Default)]
pub struct SuggestionFilter {
    pub status: Option<SuggestionStatus>,
    pub category: Option<String>,
}
