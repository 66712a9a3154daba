// ABOUTME: HTTP request handlers for analytics reporting endpoints
// ABOUTME: Each endpoint is one independent aggregation query

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use super::response::ApiResponse;
use super::validation::validate_currency_code;
use crate::analytics::DateRange;
use crate::db::DbState;

#[derive(Deserialize)]
pub struct AnalyticsQuery {
    #[serde(rename = "organizationId")]
    pub organization_id: String,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// Target currency for money-valued metrics, defaults to USD
    pub currency: Option<String>,
}

impl AnalyticsQuery {
    fn range(&self) -> DateRange {
        DateRange {
            from: self.from,
            to: self.to,
        }
    }

    fn target_currency(&self) -> Result<String, crate::storage::StorageError> {
        match &self.currency {
            Some(code) => validate_currency_code(code),
            None => Ok("USD".to_string()),
        }
    }
}

/// Feedback counts per status, average rating, response rate
pub async fn feedback_summary(
    State(db): State<DbState>,
    Query(params): Query<AnalyticsQuery>,
) -> impl IntoResponse {
    info!("Analytics: feedback summary for {}", params.organization_id);

    match db
        .analytics
        .feedback_summary(&params.organization_id, &params.range())
        .await
    {
        Ok(summary) => {
            (StatusCode::OK, ResponseJson(ApiResponse::success(summary))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Suggestion status counts and vote totals
pub async fn suggestion_engagement(
    State(db): State<DbState>,
    Query(params): Query<AnalyticsQuery>,
) -> impl IntoResponse {
    info!("Analytics: suggestion engagement for {}", params.organization_id);

    match db
        .analytics
        .suggestion_engagement(&params.organization_id, &params.range())
        .await
    {
        Ok(summary) => {
            (StatusCode::OK, ResponseJson(ApiResponse::success(summary))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Per-survey response counts
pub async fn survey_participation(
    State(db): State<DbState>,
    Query(params): Query<AnalyticsQuery>,
) -> impl IntoResponse {
    info!("Analytics: survey participation for {}", params.organization_id);

    match db
        .analytics
        .survey_participation(&params.organization_id, &params.range())
        .await
    {
        Ok(entries) => {
            (StatusCode::OK, ResponseJson(ApiResponse::success(entries))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Active employees per department
pub async fn headcount(
    State(db): State<DbState>,
    Query(params): Query<AnalyticsQuery>,
) -> impl IntoResponse {
    info!("Analytics: headcount for {}", params.organization_id);

    match db.analytics.headcount(&params.organization_id).await {
        Ok(entries) => {
            (StatusCode::OK, ResponseJson(ApiResponse::success(entries))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Project counts per status and converted budget totals
pub async fn project_status(
    State(db): State<DbState>,
    Query(params): Query<AnalyticsQuery>,
) -> impl IntoResponse {
    info!("Analytics: project status for {}", params.organization_id);

    let target = match params.target_currency() {
        Ok(target) => target,
        Err(e) => return e.into_response(),
    };

    match db
        .analytics
        .project_status(&params.organization_id, &params.range(), &target)
        .await
    {
        Ok(summary) => {
            (StatusCode::OK, ResponseJson(ApiResponse::success(summary))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Payout sums per source currency converted into the target currency
pub async fn payout_totals(
    State(db): State<DbState>,
    Query(params): Query<AnalyticsQuery>,
) -> impl IntoResponse {
    info!("Analytics: payout totals for {}", params.organization_id);

    let target = match params.target_currency() {
        Ok(target) => target,
        Err(e) => return e.into_response(),
    };

    match db
        .analytics
        .payout_totals(&params.organization_id, &params.range(), &target)
        .await
    {
        Ok(totals) => (StatusCode::OK, ResponseJson(ApiResponse::success(totals))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Job posting counts per status
pub async fn hiring_funnel(
    State(db): State<DbState>,
    Query(params): Query<AnalyticsQuery>,
) -> impl IntoResponse {
    info!("Analytics: hiring funnel for {}", params.organization_id);

    match db
        .analytics
        .hiring_funnel(&params.organization_id, &params.range())
        .await
    {
        Ok(funnel) => (StatusCode::OK, ResponseJson(ApiResponse::success(funnel))).into_response(),
        Err(e) => e.into_response(),
    }
}
