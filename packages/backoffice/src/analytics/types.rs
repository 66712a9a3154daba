use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Optional reporting window applied to created_at
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Count of rows per status value
#[derive(Debug, Clone, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackSummary {
    pub by_status: Vec<StatusCount>,
    pub average_rating: Option<f64>,
    /// Share of entries that have received a response, 0.0 - 1.0
    pub response_rate: f64,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionEngagement {
    pub by_status: Vec<StatusCount>,
    pub total_upvotes: i64,
    pub total_downvotes: i64,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyParticipationEntry {
    pub survey_id: String,
    pub title: String,
    pub responses: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadcountEntry {
    pub department: String,
    pub count: i64,
}

/// One source-currency bucket with its converted value
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyBreakdown {
    pub currency: String,
    pub amount: f64,
    pub converted: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStatusSummary {
    pub by_status: Vec<StatusCount>,
    pub budget_by_currency: Vec<CurrencyBreakdown>,
    pub total_budget: f64,
    pub target_currency: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutTotals {
    pub by_status: Vec<StatusCount>,
    pub by_currency: Vec<CurrencyBreakdown>,
    pub total: f64,
    pub target_currency: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HiringFunnel {
    pub by_status: Vec<StatusCount>,
    pub total: i64,
}
