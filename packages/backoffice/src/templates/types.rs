use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which billing document a template renders
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Invoice,
    Receipt,
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateKind::Invoice => write!(f, "invoice"),
            TemplateKind::Receipt => write!(f, "receipt"),
        }
    }
}

impl FromStr for TemplateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invoice" => Ok(TemplateKind::Invoice),
            "receipt" => Ok(TemplateKind::Receipt),
            _ => Err(format!("Unknown template kind: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub organization_id: String,
    pub kind: TemplateKind,
    pub name: String,
    /// Layout description (sections, fields, footer text) as free-form JSON
    pub body: serde_json::Value,
    pub is_default: bool,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateCreateInput {
    pub organization_id: String,
    pub name: String,
    pub body: serde_json::Value,
    pub created_by: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateUpdateInput {
    pub name: Option<String>,
    pub body: Option<serde_json::Value>,
}
