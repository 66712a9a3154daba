// ABOUTME: HTTP request handlers for employee operations

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson},
    Json,
};
use serde::Deserialize;
use tracing::{info, warn};

use super::response::ApiResponse;
use super::validation::{validate_currency_code, validate_required_name};
use crate::db::DbState;
use crate::employees::{
    EmployeeCreateInput, EmployeeFilter, EmployeeStatus, EmployeeUpdateInput,
};
use crate::pagination::{PaginatedResponse, PaginationParams};

#[derive(Deserialize)]
pub struct ListEmployeesQuery {
    #[serde(rename = "organizationId")]
    pub organization_id: String,
    pub department: Option<String>,
    pub status: Option<EmployeeStatus>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// List employees for an organization
pub async fn list_employees(
    State(db): State<DbState>,
    Query(params): Query<ListEmployeesQuery>,
) -> impl IntoResponse {
    info!("Listing employees for org: {}", params.organization_id);

    let filter = EmployeeFilter {
        department: params.department,
        status: params.status,
    };
    let defaults = PaginationParams::default();
    let pagination = PaginationParams {
        page: params.page.unwrap_or(defaults.page),
        limit: params.limit.unwrap_or(defaults.limit),
    };

    match db
        .employee_storage
        .list(&params.organization_id, &filter, &pagination)
        .await
    {
        Ok((employees, total)) => {
            let response = PaginatedResponse::new(employees, &pagination, total);
            (StatusCode::OK, ResponseJson(ApiResponse::success(response))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Get a single employee
pub async fn get_employee(State(db): State<DbState>, Path(id): Path<String>) -> impl IntoResponse {
    info!("Getting employee: {}", id);

    match db.employee_storage.get(&id).await {
        Ok(employee) => {
            (StatusCode::OK, ResponseJson(ApiResponse::success(employee))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Create a new employee
pub async fn create_employee(
    State(db): State<DbState>,
    Json(mut input): Json<EmployeeCreateInput>,
) -> impl IntoResponse {
    info!(
        "Creating employee {} {} for org {}",
        input.first_name, input.last_name, input.organization_id
    );

    input.first_name = match validate_required_name(&input.first_name, "First name") {
        Ok(name) => name,
        Err(e) => return e.into_response(),
    };
    input.last_name = match validate_required_name(&input.last_name, "Last name") {
        Ok(name) => name,
        Err(e) => return e.into_response(),
    };
    input.email = match validate_required_name(&input.email, "Email") {
        Ok(email) => email,
        Err(e) => return e.into_response(),
    };
    if let Some(currency) = &input.currency {
        input.currency = match validate_currency_code(currency) {
            Ok(code) => Some(code),
            Err(e) => return e.into_response(),
        };
    }

    let organization_id = input.organization_id.clone();
    let actor = input.created_by.clone();

    match db.employee_storage.create(input).await {
        Ok(employee) => {
            if let Err(e) = db
                .audit_storage
                .record(
                    &organization_id,
                    actor.as_deref(),
                    "created",
                    "employee",
                    &employee.id,
                    None,
                )
                .await
            {
                warn!("Failed to record audit entry: {}", e);
            }
            (
                StatusCode::CREATED,
                ResponseJson(ApiResponse::success(employee)),
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Update an employee
pub async fn update_employee(
    State(db): State<DbState>,
    Path(id): Path<String>,
    Json(updates): Json<EmployeeUpdateInput>,
) -> impl IntoResponse {
    info!("Updating employee: {}", id);

    match db.employee_storage.update(&id, updates).await {
        Ok(employee) => {
            (StatusCode::OK, ResponseJson(ApiResponse::success(employee))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Request body for terminating an employee
#[derive(Deserialize)]
pub struct TerminateEmployeeRequest {
    #[serde(rename = "updatedBy")]
    pub updated_by: Option<String>,
}

/// Terminate an employee
pub async fn terminate_employee(
    State(db): State<DbState>,
    Path(id): Path<String>,
    Json(request): Json<TerminateEmployeeRequest>,
) -> impl IntoResponse {
    info!("Terminating employee: {}", id);

    match db
        .employee_storage
        .terminate(&id, request.updated_by.as_deref())
        .await
    {
        Ok(employee) => {
            if let Err(e) = db
                .audit_storage
                .record(
                    &employee.organization_id,
                    request.updated_by.as_deref(),
                    "terminated",
                    "employee",
                    &employee.id,
                    None,
                )
                .await
            {
                warn!("Failed to record audit entry: {}", e);
            }
            (StatusCode::OK, ResponseJson(ApiResponse::success(employee))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Delete an employee record
pub async fn delete_employee(
    State(db): State<DbState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("Deleting employee: {}", id);

    match db.employee_storage.delete(&id).await {
        Ok(()) => (
            StatusCode::OK,
            ResponseJson(ApiResponse::success(serde_json::json!({
                "message": format!("Employee {} deleted successfully", id)
            }))),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
