// ABOUTME: HTTP request handlers for survey operations
// ABOUTME: Survey lifecycle, response collection and summaries

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
use crate::surveys::{
    SurveyCreateInput, SurveyResponseInput, SurveyStatus, SurveyUpdateInput,
};

#[derive(Deserialize)]
pub struct ListSurveysQuery {
    #[serde(rename = "organizationId")]
    pub organization_id: String,
    pub status: Option<SurveyStatus>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// List surveys for an organization
pub async fn list_surveys(
    State(db): State<DbState>,
    Query(params): Query<ListSurveysQuery>,
) -> impl IntoResponse {
    info!("Listing surveys for org: {}", params.organization_id);

    let defaults = PaginationParams::default();
    let pagination = PaginationParams {
        page: params.page.unwrap_or(defaults.page),
        limit: params.limit.unwrap_or(defaults.limit),
    };

    match db
        .survey_storage
        .list(&params.organization_id, params.status, &pagination)
        .await
    {
        Ok((surveys, total)) => {
            let response = PaginatedResponse::new(surveys, &pagination, total);
            (StatusCode::OK, ResponseJson(ApiResponse::success(response))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Get a single survey
pub async fn get_survey(State(db): State<DbState>, Path(id): Path<String>) -> impl IntoResponse {
    info!("Getting survey: {}", id);

    match db.survey_storage.get(&id).await {
        Ok(survey) => (StatusCode::OK, ResponseJson(ApiResponse::success(survey))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a new survey
pub async fn create_survey(
    State(db): State<DbState>,
    Json(mut input): Json<SurveyCreateInput>,
) -> impl IntoResponse {
    info!("Creating survey: {}", input.title);

    input.title = match validate_required_name(&input.title, "Survey title") {
        Ok(title) => title,
        Err(e) => return e.into_response(),
    };
    if input.questions.is_empty() {
        return StorageError::InvalidInput("A survey needs at least one question".to_string())
            .into_response();
    }

    match db.survey_storage.create(input).await {
        Ok(survey) => (
            StatusCode::CREATED,
            ResponseJson(ApiResponse::success(survey)),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a survey
pub async fn update_survey(
    State(db): State<DbState>,
    Path(id): Path<String>,
    Json(updates): Json<SurveyUpdateInput>,
) -> impl IntoResponse {
    info!("Updating survey: {}", id);

    match db.survey_storage.update(&id, updates).await {
        Ok(survey) => (StatusCode::OK, ResponseJson(ApiResponse::success(survey))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Open a survey for responses
pub async fn open_survey(State(db): State<DbState>, Path(id): Path<String>) -> impl IntoResponse {
    info!("Opening survey: {}", id);

    match db.survey_storage.set_status(&id, SurveyStatus::Open).await {
        Ok(survey) => (StatusCode::OK, ResponseJson(ApiResponse::success(survey))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Close a survey
pub async fn close_survey(State(db): State<DbState>, Path(id): Path<String>) -> impl IntoResponse {
    info!("Closing survey: {}", id);

    match db.survey_storage.set_status(&id, SurveyStatus::Closed).await {
        Ok(survey) => (StatusCode::OK, ResponseJson(ApiResponse::success(survey))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a survey
pub async fn delete_survey(State(db): State<DbState>, Path(id): Path<String>) -> impl IntoResponse {
    info!("Deleting survey: {}", id);

    match db.survey_storage.delete(&id).await {
        Ok(()) => (
            StatusCode::OK,
            ResponseJson(ApiResponse::success(serde_json::json!({
                "message": format!("Survey {} deleted successfully", id)
            }))),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Submit a response to an open survey
pub async fn submit_survey_response(
    State(db): State<DbState>,
    Path(id): Path<String>,
    Json(input): Json<SurveyResponseInput>,
) -> impl IntoResponse {
    info!("Submitting response to survey: {}", id);

    match db.survey_storage.submit_response(&id, input).await {
        Ok(response) => (
            StatusCode::CREATED,
            ResponseJson(ApiResponse::success(response)),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

#[derive(Deserialize)]
pub struct ListResponsesQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// List responses collected for a survey
pub async fn list_survey_responses(
    State(db): State<DbState>,
    Path(id): Path<String>,
    Query(params): Query<ListResponsesQuery>,
) -> impl IntoResponse {
    info!("Listing responses for survey: {}", id);

    let defaults = PaginationParams::default();
    let pagination = PaginationParams {
        page: params.page.unwrap_or(defaults.page),
        limit: params.limit.unwrap_or(defaults.limit),
    };

    match db.survey_storage.list_responses(&id, &pagination).await {
        Ok((responses, total)) => {
            let response = PaginatedResponse::new(responses, &pagination, total);
            (StatusCode::OK, ResponseJson(ApiResponse::success(response))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Aggregate summary of a survey's responses
pub async fn survey_summary(
    State(db): State<DbState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("Summarizing survey: {}", id);

    match db.survey_storage.summary(&id).await {
        Ok(summary) => {
            (StatusCode::OK, ResponseJson(ApiResponse::success(summary))).into_response()
        }
        Err(e) => e.into_response(),
    }
}
