// ABOUTME: HTTP request handlers for feedback operations
// ABOUTME: Create/list/respond/status lifecycle with database integration

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson},
    Json,
};
use serde::Deserialize;
use tracing::{info, warn};

use super::response::ApiResponse;
use super::validation::{validate_rating, validate_required_text};
use crate::db::DbState;
use crate::feedback::{FeedbackCategory, FeedbackCreateInput, FeedbackFilter, FeedbackStatus};
use crate::pagination::{PaginatedResponse, PaginationParams};

#[derive(Deserialize)]
pub struct ListFeedbackQuery {
    #[serde(rename = "organizationId")]
    pub organization_id: String,
    pub status: Option<FeedbackStatus>,
    pub category: Option<FeedbackCategory>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

fn pagination(page: Option<i64>, limit: Option<i64>) -> PaginationParams {
    let defaults = PaginationParams::default();
    PaginationParams {
        page: page.unwrap_or(defaults.page),
        limit: limit.unwrap_or(defaults.limit),
    }
}

/// List feedback for an organization
pub async fn list_feedback(
    State(db): State<DbState>,
    Query(params): Query<ListFeedbackQuery>,
) -> impl IntoResponse {
    info!("Listing feedback for org: {}", params.organization_id);

    let filter = FeedbackFilter {
        status: params.status,
        category: params.category,
    };
    let pagination = pagination(params.page, params.limit);

    match db
        .feedback_storage
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

/// Get a single feedback entry
pub async fn get_feedback(
    State(db): State<DbState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("Getting feedback: {}", id);

    match db.feedback_storage.get(&id).await {
        Ok(feedback) => {
            (StatusCode::OK, ResponseJson(ApiResponse::success(feedback))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Create a new feedback entry
pub async fn create_feedback(
    State(db): State<DbState>,
    Json(mut input): Json<FeedbackCreateInput>,
) -> impl IntoResponse {
    info!("Creating feedback for org: {}", input.organization_id);

    input.subject = match validate_required_text(&input.subject, "Subject") {
        Ok(subject) => subject,
        Err(e) => return e.into_response(),
    };
    input.message = match validate_required_text(&input.message, "Message") {
        Ok(message) => message,
        Err(e) => return e.into_response(),
    };
    if let Err(e) = validate_rating(input.rating) {
        return e.into_response();
    }

    let organization_id = input.organization_id.clone();
    let actor = input.created_by.clone();

    match db.feedback_storage.create(input).await {
        Ok(feedback) => {
            if let Err(e) = db
                .audit_storage
                .record(
                    &organization_id,
                    actor.as_deref(),
                    "created",
                    "feedback",
                    &feedback.id,
                    None,
                )
                .await
            {
                warn!("Failed to record audit entry: {}", e);
            }
            (
                StatusCode::CREATED,
                ResponseJson(ApiResponse::success(feedback)),
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Request body for responding to feedback
#[derive(Deserialize)]
pub struct RespondFeedbackRequest {
    pub response: String,
    #[serde(rename = "respondedBy")]
    pub responded_by: String,
}

/// Record a response to a feedback entry
pub async fn respond_feedback(
    State(db): State<DbState>,
    Path(id): Path<String>,
    Json(request): Json<RespondFeedbackRequest>,
) -> impl IntoResponse {
    info!("Responding to feedback: {}", id);

    let response_text = match validate_required_text(&request.response, "Response") {
        Ok(text) => text,
        Err(e) => return e.into_response(),
    };

    match db
        .feedback_storage
        .respond(&id, &response_text, &request.responded_by)
        .await
    {
        Ok(feedback) => {
            if let Err(e) = db
                .audit_storage
                .record(
                    &feedback.organization_id,
                    Some(&request.responded_by),
                    "responded",
                    "feedback",
                    &feedback.id,
                    None,
                )
                .await
            {
                warn!("Failed to record audit entry: {}", e);
            }
            (StatusCode::OK, ResponseJson(ApiResponse::success(feedback))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Request body for updating feedback status
#[derive(Deserialize)]
pub struct UpdateFeedbackStatusRequest {
    pub status: FeedbackStatus,
    #[serde(rename = "updatedBy")]
    pub updated_by: Option<String>,
}

/// Move a feedback entry to a new status
pub async fn update_feedback_status(
    State(db): State<DbState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateFeedbackStatusRequest>,
) -> impl IntoResponse {
    info!("Updating feedback {} status", id);

    match db.feedback_storage.update_status(&id, request.status).await {
        Ok(feedback) => {
            if let Err(e) = db
                .audit_storage
                .record(
                    &feedback.organization_id,
                    request.updated_by.as_deref(),
                    "status-changed",
                    "feedback",
                    &feedback.id,
                    Some(serde_json::json!({ "status": request.status })),
                )
                .await
            {
                warn!("Failed to record audit entry: {}", e);
            }
            (StatusCode::OK, ResponseJson(ApiResponse::success(feedback))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Delete a feedback entry
pub async fn delete_feedback(
    State(db): State<DbState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("Deleting feedback: {}", id);

    match db.feedback_storage.delete(&id).await {
        Ok(()) => (
            StatusCode::OK,
            ResponseJson(ApiResponse::success(serde_json::json!({
                "message": format!("Feedback {} deleted successfully", id)
            }))),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::create_backoffice_router;
    use crate::test_utils::test_helpers::test_state;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_create_feedback_returns_201_with_defaults() {
        let (state, _blobs) = test_state().await;
        let app = create_backoffice_router(state);

        let request = Request::builder()
            .method("POST")
            .uri("/feedback")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({
                    "organizationId": "org-1",
                    "subject": "Coffee machine",
                    "message": "The fourth floor machine is broken again.",
                    "rating": 2
                })
                .to_string(),
            ))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "new");
        assert_eq!(body["data"]["hasResponse"], false);
    }

    #[tokio::test]
    async fn test_create_feedback_rejects_bad_rating() {
        let (state, _blobs) = test_state().await;
        let app = create_backoffice_router(state);

        let request = Request::builder()
            .method("POST")
            .uri("/feedback")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({
                    "organizationId": "org-1",
                    "subject": "s",
                    "message": "m",
                    "rating": 9
                })
                .to_string(),
            ))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_list_feedback_filters_by_status() {
        let (state, _blobs) = test_state().await;
        let app = create_backoffice_router(state.clone());

        for subject in ["One", "Two"] {
            let request = Request::builder()
                .method("POST")
                .uri("/feedback")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "organizationId": "org-1",
                        "subject": subject,
                        "message": "text"
                    })
                    .to_string(),
                ))
                .unwrap();
            app.clone().oneshot(request).await.unwrap();
        }

        let request = Request::builder()
            .method("GET")
            .uri("/feedback?organizationId=org-1&status=new")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["pagination"]["totalItems"], 2);

        // No resolved entries yet
        let request = Request::builder()
            .method("GET")
            .uri("/feedback?organizationId=org-1&status=resolved")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body["data"]["pagination"]["totalItems"], 0);
    }

    #[tokio::test]
    async fn test_get_missing_feedback_is_404() {
        let (state, _blobs) = test_state().await;
        let app = create_backoffice_router(state);

        let request = Request::builder()
            .method("GET")
            .uri("/feedback/fbk-missing")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
