// ABOUTME: HTTP request handlers for workflow rules, triggers and instances

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson},
    Json,
};
use serde::Deserialize;
use tracing::info;

use super::response::ApiResponse;
use super::validation::validate_required_name;
use crate::db::DbState;
use crate::pagination::{PaginatedResponse, PaginationParams};
use crate::storage::StorageError;
use crate::workflows::{
    InstanceStatus, TriggerInput, WorkflowRuleCreateInput, WorkflowRuleUpdateInput,
};

#[derive(Deserialize)]
pub struct ListRulesQuery {
    #[serde(rename = "organizationId")]
    pub organization_id: String,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// List workflow rules for an organization
pub async fn list_rules(
    State(db): State<DbState>,
    Query(params): Query<ListRulesQuery>,
) -> impl IntoResponse {
    info!("Listing workflow rules for org: {}", params.organization_id);

    let defaults = PaginationParams::default();
    let pagination = PaginationParams {
        page: params.page.unwrap_or(defaults.page),
        limit: params.limit.unwrap_or(defaults.limit),
    };

    match db
        .workflow_storage
        .list_rules(&params.organization_id, &pagination)
        .await
    {
        Ok((rules, total)) => {
            let response = PaginatedResponse::new(rules, &pagination, total);
            (StatusCode::OK, ResponseJson(ApiResponse::success(response))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Get a single workflow rule
pub async fn get_rule(State(db): State<DbState>, Path(id): Path<String>) -> impl IntoResponse {
    info!("Getting workflow rule: {}", id);

    match db.workflow_storage.get_rule(&id).await {
        Ok(rule) => (StatusCode::OK, ResponseJson(ApiResponse::success(rule))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a workflow rule
pub async fn create_rule(
    State(db): State<DbState>,
    Json(mut input): Json<WorkflowRuleCreateInput>,
) -> impl IntoResponse {
    info!("Creating workflow rule: {}", input.name);

    input.name = match validate_required_name(&input.name, "Rule name") {
        Ok(name) => name,
        Err(e) => return e.into_response(),
    };
    input.event = match validate_required_name(&input.event, "Event") {
        Ok(event) => event,
        Err(e) => return e.into_response(),
    };
    if input.actions.is_empty() {
        return StorageError::InvalidInput("A rule needs at least one action".to_string())
            .into_response();
    }
    if let Some(hours) = input.escalation_hours {
        if !hours.is_finite() || hours <= 0.0 {
            return StorageError::InvalidInput(
                "escalationHours must be a positive number".to_string(),
            )
            .into_response();
        }
    }

    match db.workflow_storage.create_rule(input).await {
        Ok(rule) => {
            (StatusCode::CREATED, ResponseJson(ApiResponse::success(rule))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Update a workflow rule
pub async fn update_rule(
    State(db): State<DbState>,
    Path(id): Path<String>,
    Json(updates): Json<WorkflowRuleUpdateInput>,
) -> impl IntoResponse {
    info!("Updating workflow rule: {}", id);

    match db.workflow_storage.update_rule(&id, updates).await {
        Ok(rule) => (StatusCode::OK, ResponseJson(ApiResponse::success(rule))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a workflow rule
pub async fn delete_rule(State(db): State<DbState>, Path(id): Path<String>) -> impl IntoResponse {
    info!("Deleting workflow rule: {}", id);

    match db.workflow_storage.delete_rule(&id).await {
        Ok(()) => (
            StatusCode::OK,
            ResponseJson(ApiResponse::success(serde_json::json!({
                "message": format!("Workflow rule {} deleted successfully", id)
            }))),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Trigger an event against the organization's rules.
/// Returns one instance per matched rule.
pub async fn trigger_event(
    State(db): State<DbState>,
    Json(input): Json<TriggerInput>,
) -> impl IntoResponse {
    info!(
        "Triggering workflow event '{}' for org {}",
        input.event, input.organization_id
    );

    match db.workflow_engine.trigger(input).await {
        Ok(instances) => {
            (StatusCode::OK, ResponseJson(ApiResponse::success(instances))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

#[derive(Deserialize)]
pub struct ListInstancesQuery {
    #[serde(rename = "organizationId")]
    pub organization_id: String,
    #[serde(rename = "ruleId")]
    pub rule_id: Option<String>,
    pub status: Option<InstanceStatus>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// List workflow instances
pub async fn list_instances(
    State(db): State<DbState>,
    Query(params): Query<ListInstancesQuery>,
) -> impl IntoResponse {
    info!("Listing workflow instances for org: {}", params.organization_id);

    let defaults = PaginationParams::default();
    let pagination = PaginationParams {
        page: params.page.unwrap_or(defaults.page),
        limit: params.limit.unwrap_or(defaults.limit),
    };

    match db
        .workflow_storage
        .list_instances(
            &params.organization_id,
            params.rule_id.as_deref(),
            params.status,
            &pagination,
        )
        .await
    {
        Ok((instances, total)) => {
            let response = PaginatedResponse::new(instances, &pagination, total);
            (StatusCode::OK, ResponseJson(ApiResponse::success(response))).into_response()
        }
        Err(e) => e.into_response(),
    }
}
