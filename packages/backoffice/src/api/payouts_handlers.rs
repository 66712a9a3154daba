// ABOUTME: HTTP request handlers for affiliate payout operations

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson},
    Json,
};
use serde::Deserialize;
use tracing::{info, warn};

use super::response::ApiResponse;
use super::validation::{validate_amount, validate_currency_code};
use crate::db::DbState;
use crate::pagination::{PaginatedResponse, PaginationParams};
use crate::payouts::{PayoutCreateInput, PayoutFilter, PayoutStatus};

#[derive(Deserialize)]
pub struct ListPayoutsQuery {
    #[serde(rename = "organizationId")]
    pub organization_id: String,
    pub status: Option<PayoutStatus>,
    #[serde(rename = "affiliateId")]
    pub affiliate_id: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// List payouts for an organization
pub async fn list_payouts(
    State(db): State<DbState>,
    Query(params): Query<ListPayoutsQuery>,
) -> impl IntoResponse {
    info!("Listing payouts for org: {}", params.organization_id);

    let filter = PayoutFilter {
        status: params.status,
        affiliate_id: params.affiliate_id,
    };
    let defaults = PaginationParams::default();
    let pagination = PaginationParams {
        page: params.page.unwrap_or(defaults.page),
        limit: params.limit.unwrap_or(defaults.limit),
    };

    match db
        .payout_storage
        .list(&params.organization_id, &filter, &pagination)
        .await
    {
        Ok((payouts, total)) => {
            let response = PaginatedResponse::new(payouts, &pagination, total);
            (StatusCode::OK, ResponseJson(ApiResponse::success(response))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Get a single payout
pub async fn get_payout(State(db): State<DbState>, Path(id): Path<String>) -> impl IntoResponse {
    info!("Getting payout: {}", id);

    match db.payout_storage.get(&id).await {
        Ok(payout) => (StatusCode::OK, ResponseJson(ApiResponse::success(payout))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a payout request
pub async fn create_payout(
    State(db): State<DbState>,
    Json(mut input): Json<PayoutCreateInput>,
) -> impl IntoResponse {
    info!(
        "Creating payout of {} {} for affiliate {}",
        input.amount, input.currency, input.affiliate_id
    );

    if let Err(e) = validate_amount(input.amount) {
        return e.into_response();
    }
    input.currency = match validate_currency_code(&input.currency) {
        Ok(code) => code,
        Err(e) => return e.into_response(),
    };

    match db.payout_storage.create(input).await {
        Ok(payout) => (
            StatusCode::CREATED,
            ResponseJson(ApiResponse::success(payout)),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Request body for approving a payout
#[derive(Deserialize)]
pub struct ApprovePayoutRequest {
    #[serde(rename = "approvedBy")]
    pub approved_by: String,
}

/// Approve a pending payout
pub async fn approve_payout(
    State(db): State<DbState>,
    Path(id): Path<String>,
    Json(request): Json<ApprovePayoutRequest>,
) -> impl IntoResponse {
    info!("Approving payout: {}", id);

    match db.payout_storage.approve(&id, &request.approved_by).await {
        Ok(payout) => {
            if let Err(e) = db
                .audit_storage
                .record(
                    &payout.organization_id,
                    Some(&request.approved_by),
                    "approved",
                    "payout",
                    &payout.id,
                    None,
                )
                .await
            {
                warn!("Failed to record audit entry: {}", e);
            }
            (StatusCode::OK, ResponseJson(ApiResponse::success(payout))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Request body for rejecting a payout
#[derive(Deserialize)]
pub struct RejectPayoutRequest {
    pub reason: Option<String>,
}

/// Reject a pending payout
pub async fn reject_payout(
    State(db): State<DbState>,
    Path(id): Path<String>,
    Json(request): Json<RejectPayoutRequest>,
) -> impl IntoResponse {
    info!("Rejecting payout: {}", id);

    match db.payout_storage.reject(&id, request.reason.as_deref()).await {
        Ok(payout) => (StatusCode::OK, ResponseJson(ApiResponse::success(payout))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Request body for marking a payout paid
#[derive(Deserialize)]
pub struct MarkPaidRequest {
    pub reference: Option<String>,
}

/// Mark an approved payout paid
pub async fn mark_payout_paid(
    State(db): State<DbState>,
    Path(id): Path<String>,
    Json(request): Json<MarkPaidRequest>,
) -> impl IntoResponse {
    info!("Marking payout paid: {}", id);

    match db
        .payout_storage
        .mark_paid(&id, request.reference.as_deref())
        .await
    {
        Ok(payout) => (StatusCode::OK, ResponseJson(ApiResponse::success(payout))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a payout record
pub async fn delete_payout(State(db): State<DbState>, Path(id): Path<String>) -> impl IntoResponse {
    info!("Deleting payout: {}", id);

    match db.payout_storage.delete(&id).await {
        Ok(()) => (
            StatusCode::OK,
            ResponseJson(ApiResponse::success(serde_json::json!({
                "message": format!("Payout {} deleted successfully", id)
            }))),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
