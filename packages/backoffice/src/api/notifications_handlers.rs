// ABOUTME: HTTP request handlers for reading and acknowledging notifications

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson},
    Json,
};
use serde::Deserialize;
use tracing::info;

use super::response::ApiResponse;
use crate::db::DbState;
use crate::pagination::{PaginatedResponse, PaginationParams};

#[derive(Deserialize)]
pub struct ListNotificationsQuery {
    #[serde(rename = "organizationId")]
    pub organization_id: String,
    #[serde(rename = "recipientId")]
    pub recipient_id: String,
    #[serde(default, rename = "unreadOnly")]
    pub unread_only: bool,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// List a recipient's notifications, newest first
pub async fn list_notifications(
    State(db): State<DbState>,
    Query(params): Query<ListNotificationsQuery>,
) -> impl IntoResponse {
    info!(
        "Listing notifications for {} in org {}",
        params.recipient_id, params.organization_id
    );

    let defaults = PaginationParams::default();
    let pagination = PaginationParams {
        page: params.page.unwrap_or(defaults.page),
        limit: params.limit.unwrap_or(defaults.limit),
    };

    match db
        .notification_storage
        .list_for_recipient(
            &params.organization_id,
            &params.recipient_id,
            params.unread_only,
            &pagination,
        )
        .await
    {
        Ok((notifications, total)) => {
            let response = PaginatedResponse::new(notifications, &pagination, total);
            (StatusCode::OK, ResponseJson(ApiResponse::success(response))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Mark a notification read
pub async fn mark_notification_read(
    State(db): State<DbState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("Marking notification read: {}", id);

    match db.notification_storage.mark_read(&id).await {
        Ok(notification) => (
            StatusCode::OK,
            ResponseJson(ApiResponse::success(notification)),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Request body for marking all of a recipient's notifications read
#[derive(Deserialize)]
pub struct MarkAllReadRequest {
    #[serde(rename = "organizationId")]
    pub organization_id: String,
    #[serde(rename = "recipientId")]
    pub recipient_id: String,
}

/// Mark all of a recipient's notifications read
pub async fn mark_all_notifications_read(
    State(db): State<DbState>,
    Json(request): Json<MarkAllReadRequest>,
) -> impl IntoResponse {
    info!(
        "Marking all notifications read for {} in org {}",
        request.recipient_id, request.organization_id
    );

    match db
        .notification_storage
        .mark_all_read(&request.organization_id, &request.recipient_id)
        .await
    {
        Ok(updated) => (
            StatusCode::OK,
            ResponseJson(ApiResponse::success(serde_json::json!({ "updated": updated }))),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
