// ABOUTME: HTTP request handlers for reading the audit log

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson},
};
use serde::Deserialize;
use tracing::info;

use super::response::ApiResponse;
use crate::audit::AuditFilter;
use crate::db::DbState;
use crate::pagination::{PaginatedResponse, PaginationParams};

#[derive(Deserialize)]
pub struct ListAuditQuery {
    #[serde(rename = "organizationId")]
    pub organization_id: String,
    #[serde(rename = "entityType")]
    pub entity_type: Option<String>,
    #[serde(rename = "entityId")]
    pub entity_id: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// List audit entries, newest first
pub async fn list_audit_entries(
    State(db): State<DbState>,
    Query(params): Query<ListAuditQuery>,
) -> impl IntoResponse {
    info!("Listing audit entries for org: {}", params.organization_id);

    let filter = AuditFilter {
        entity_type: params.entity_type,
        entity_id: params.entity_id,
    };
    let defaults = PaginationParams::default();
    let pagination = PaginationParams {
        page: params.page.unwrap_or(defaults.page),
        limit: params.limit.unwrap_or(defaults.limit),
    };

    match db
        .audit_storage
        .list(&params.organization_id, &filter, &pagination)
        .await
    {
        Ok((entries, total)) => {
            let response = PaginatedResponse::new(entries, &pagination, total);
            (StatusCode::OK, ResponseJson(ApiResponse::success(response))).into_response()
        }
        Err(e) => e.into_response(),
    }
}
