// ABOUTME: HTTP request handlers for project operations
// ABOUTME: CRUD plus member assignment endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson},
    Json,
};
use serde::Deserialize;
use tracing::{error, info};

use super::response::ApiResponse;
use super::validation::validate_required_name;
use crate::db::DbState;
use crate::pagination::{PaginatedResponse, PaginationParams};
use crate::projects::{ProjectCreateInput, ProjectFilter, ProjectStatus, ProjectUpdateInput};

#[derive(Deserialize)]
pub struct ListProjectsQuery {
    #[serde(rename = "organizationId")]
    pub organization_id: String,
    pub status: Option<ProjectStatus>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// List projects for an organization
pub async fn list_projects(
    State(db): State<DbState>,
    Query(params): Query<ListProjectsQuery>,
) -> impl IntoResponse {
    info!("Listing projects for org: {}", params.organization_id);

    let filter = ProjectFilter {
        status: params.status,
        search: params.search,
    };
    let defaults = PaginationParams::default();
    let pagination = PaginationParams {
        page: params.page.unwrap_or(defaults.page),
        limit: params.limit.unwrap_or(defaults.limit),
    };

    match db
        .project_storage
        .list(&params.organization_id, &filter, &pagination)
        .await
    {
        Ok((projects, total)) => {
            let response = PaginatedResponse::new(projects, &pagination, total);
            (StatusCode::OK, ResponseJson(ApiResponse::success(response))).into_response()
        }
        Err(e) => {
            error!("Failed to list projects: {}", e);
            e.into_response()
        }
    }
}

/// Get a specific project by ID
pub async fn get_project(State(db): State<DbState>, Path(id): Path<String>) -> impl IntoResponse {
    info!("Getting project: {}", id);

    match db.project_storage.get(&id).await {
        Ok(project) => {
            (StatusCode::OK, ResponseJson(ApiResponse::success(project))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Create a new project
pub async fn create_project(
    State(db): State<DbState>,
    Json(mut input): Json<ProjectCreateInput>,
) -> impl IntoResponse {
    info!("Creating project: {}", input.name);

    input.name = match validate_required_name(&input.name, "Project name") {
        Ok(name) => name,
        Err(e) => return e.into_response(),
    };

    match db.project_storage.create(input).await {
        Ok(project) => {
            info!("Created project: {} (ID: {})", project.name, project.id);
            (
                StatusCode::CREATED,
                ResponseJson(ApiResponse::success(project)),
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to create project: {}", e);
            e.into_response()
        }
    }
}

/// Update an existing project
pub async fn update_project(
    State(db): State<DbState>,
    Path(id): Path<String>,
    Json(updates): Json<ProjectUpdateInput>,
) -> impl IntoResponse {
    info!("Updating project: {}", id);

    match db.project_storage.update(&id, updates).await {
        Ok(project) => {
            (StatusCode::OK, ResponseJson(ApiResponse::success(project))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Delete a project
pub async fn delete_project(
    State(db): State<DbState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("Deleting project: {}", id);

    match db.project_storage.delete(&id).await {
        Ok(()) => (
            StatusCode::OK,
            ResponseJson(ApiResponse::success(serde_json::json!({
                "message": format!("Project {} deleted successfully", id)
            }))),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Request body for assigning a project member
#[derive(Deserialize)]
pub struct AddMemberRequest {
    #[serde(rename = "employeeId")]
    pub employee_id: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "member".to_string()
}

/// Assign an employee to a project
pub async fn add_project_member(
    State(db): State<DbState>,
    Path(id): Path<String>,
    Json(request): Json<AddMemberRequest>,
) -> impl IntoResponse {
    info!("Adding member {} to project {}", request.employee_id, id);

    match db
        .project_storage
        .add_member(&id, &request.employee_id, &request.role)
        .await
    {
        Ok(members) => {
            (StatusCode::OK, ResponseJson(ApiResponse::success(members))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Remove an employee from a project
pub async fn remove_project_member(
    State(db): State<DbState>,
    Path((id, employee_id)): Path<(String, String)>,
) -> impl IntoResponse {
    info!("Removing member {} from project {}", employee_id, id);

    match db.project_storage.remove_member(&id, &employee_id).await {
        Ok(()) => (
            StatusCode::OK,
            ResponseJson(ApiResponse::success(serde_json::json!({
                "message": "Member removed"
            }))),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// List a project's members
pub async fn list_project_members(
    State(db): State<DbState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("Listing members of project {}", id);

    match db.project_storage.list_members(&id).await {
        Ok(members) => {
            (StatusCode::OK, ResponseJson(ApiResponse::success(members))).into_response()
        }
        Err(e) => e.into_response(),
    }
}
