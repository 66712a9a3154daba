// ABOUTME: HTTP request handlers for job posting operations

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson},
    Json,
};
use serde::Deserialize;
use tracing::info;

use super::response::ApiResponse;
use super::validation::{validate_required_name, validate_required_text};
use crate::db::DbState;
use crate::jobs::{JobPostingCreateInput, JobPostingFilter, JobPostingStatus, JobPostingUpdateInput};
use crate::pagination::{PaginatedResponse, PaginationParams};

#[derive(Deserialize)]
pub struct ListJobsQuery {
    #[serde(rename = "organizationId")]
    pub organization_id: String,
    pub status: Option<JobPostingStatus>,
    pub department: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// List job postings for an organization
pub async fn list_jobs(
    State(db): State<DbState>,
    Query(params): Query<ListJobsQuery>,
) -> impl IntoResponse {
    info!("Listing job postings for org: {}", params.organization_id);

    let filter = JobPostingFilter {
        status: params.status,
        department: params.department,
    };
    let defaults = PaginationParams::default();
    let pagination = PaginationParams {
        page: params.page.unwrap_or(defaults.page),
        limit: params.limit.unwrap_or(defaults.limit),
    };

    match db
        .job_storage
        .list(&params.organization_id, &filter, &pagination)
        .await
    {
        Ok((postings, total)) => {
            let response = PaginatedResponse::new(postings, &pagination, total);
            (StatusCode::OK, ResponseJson(ApiResponse::success(response))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

#[derive(Deserialize)]
pub struct PublicListJobsQuery {
    #[serde(rename = "organizationId")]
    pub organization_id: String,
    pub department: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Public job board: only published postings
pub async fn list_open_jobs(
    State(db): State<DbState>,
    Query(params): Query<PublicListJobsQuery>,
) -> impl IntoResponse {
    info!("Listing open jobs for org: {}", params.organization_id);

    let filter = JobPostingFilter {
        status: Some(JobPostingStatus::Published),
        department: params.department,
    };
    let defaults = PaginationParams::default();
    let pagination = PaginationParams {
        page: params.page.unwrap_or(defaults.page),
        limit: params.limit.unwrap_or(defaults.limit),
    };

    match db
        .job_storage
        .list(&params.organization_id, &filter, &pagination)
        .await
    {
        Ok((postings, total)) => {
            let response = PaginatedResponse::new(postings, &pagination, total);
            (StatusCode::OK, ResponseJson(ApiResponse::success(response))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Get a single job posting
pub async fn get_job(State(db): State<DbState>, Path(id): Path<String>) -> impl IntoResponse {
    info!("Getting job posting: {}", id);

    match db.job_storage.get(&id).await {
        Ok(posting) => {
            (StatusCode::OK, ResponseJson(ApiResponse::success(posting))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Create a new job posting
pub async fn create_job(
    State(db): State<DbState>,
    Json(mut input): Json<JobPostingCreateInput>,
) -> impl IntoResponse {
    info!("Creating job posting: {}", input.title);

    input.title = match validate_required_name(&input.title, "Title") {
        Ok(title) => title,
        Err(e) => return e.into_response(),
    };
    input.description = match validate_required_text(&input.description, "Description") {
        Ok(description) => description,
        Err(e) => return e.into_response(),
    };

    match db.job_storage.create(input).await {
        Ok(posting) => (
            StatusCode::CREATED,
            ResponseJson(ApiResponse::success(posting)),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a job posting
pub async fn update_job(
    State(db): State<DbState>,
    Path(id): Path<String>,
    Json(updates): Json<JobPostingUpdateInput>,
) -> impl IntoResponse {
    info!("Updating job posting: {}", id);

    match db.job_storage.update(&id, updates).await {
        Ok(posting) => {
            (StatusCode::OK, ResponseJson(ApiResponse::success(posting))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Publish a draft posting
pub async fn publish_job(State(db): State<DbState>, Path(id): Path<String>) -> impl IntoResponse {
    info!("Publishing job posting: {}", id);

    match db.job_storage.publish(&id).await {
        Ok(posting) => {
            (StatusCode::OK, ResponseJson(ApiResponse::success(posting))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Close a published posting
pub async fn close_job(State(db): State<DbState>, Path(id): Path<String>) -> impl IntoResponse {
    info!("Closing job posting: {}", id);

    match db.job_storage.close(&id).await {
        Ok(posting) => {
            (StatusCode::OK, ResponseJson(ApiResponse::success(posting))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Delete a job posting
pub async fn delete_job(State(db): State<DbState>, Path(id): Path<String>) -> impl IntoResponse {
    info!("Deleting job posting: {}", id);

    match db.job_storage.delete(&id).await {
        Ok(()) => (
            StatusCode::OK,
            ResponseJson(ApiResponse::success(serde_json::json!({
                "message": format!("Job posting {} deleted successfully", id)
            }))),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
