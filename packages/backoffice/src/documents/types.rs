use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentCategory {
    Policy,
    Contract,
    Invoice,
    Report,
    Other,
}

impl Default for DocumentCategory {
    fn default() -> Self {
        DocumentCategory::Other
    }
}

impl fmt::Display for DocumentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DocumentCategory::Policy => "policy",
            DocumentCategory::Contract => "contract",
            DocumentCategory::Invoice => "invoice",
            DocumentCategory::Report => "report",
            DocumentCategory::Other => "other",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for DocumentCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "policy" => Ok(DocumentCategory::Policy),
            "contract" => Ok(DocumentCategory::Contract),
            "invoice" => Ok(DocumentCategory::Invoice),
            "report" => Ok(DocumentCategory::Report),
            "other" => Ok(DocumentCategory::Other),
            _ => Err(format!("Unknown document category: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: DocumentCategory,
    pub content_type: String,
    pub size_bytes: i64,
    pub storage_key: String,
    pub uploaded_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct DocumentCreateInput {
    pub organization_id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: DocumentCategory,
    pub content_type: String,
    pub size_bytes: i64,
    pub storage_key: String,
    pub uploaded_by: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUpdateInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<DocumentCategory>,
}
