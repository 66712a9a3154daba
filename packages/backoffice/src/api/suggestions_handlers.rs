// ABOUTME: HTTP request handlers for suggestion operations
// ABOUTME: CRUD plus the vote/unvote endpoints

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
use crate::pagination::{PaginatedResponse, PaginationParams};
use crate::suggestions::{
    SuggestionCreateInput, SuggestionFilter, SuggestionStatus, VoteType,
};

#[derive(Deserialize)]
pub struct ListSuggestionsQuery {
    #[serde(rename = "organizationId")]
    pub organization_id: String,
    pub status: Option<SuggestionStatus>,
    pub category: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// List suggestions for an organization
pub async fn list_suggestions(
    State(db): State<DbState>,
    Query(params): Query<ListSuggestionsQuery>,
) -> impl IntoResponse {
    info!("Listing suggestions for org: {}", params.organization_id);

    let filter = SuggestionFilter {
        status: params.status,
        category: params.category,
    };
    let defaults = PaginationParams::default();
    let pagination = PaginationParams {
        page: params.page.unwrap_or(defaults.page),
        limit: params.limit.unwrap_or(defaults.limit),
    };

    match db
        .suggestion_storage
        .list(&params.organization_id, &filter, &pagination)
        .await
    {
        Ok((suggestions, total)) => {
            let response = PaginatedResponse::new(suggestions, &pagination, total);
            (StatusCode::OK, ResponseJson(ApiResponse::success(response))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Get a single suggestion
pub async fn get_suggestion(
    State(db): State<DbState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("Getting suggestion: {}", id);

    match db.suggestion_storage.get(&id).await {
        Ok(suggestion) => {
            (StatusCode::OK, ResponseJson(ApiResponse::success(suggestion))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Create a new suggestion
pub async fn create_suggestion(
    State(db): State<DbState>,
    Json(mut input): Json<SuggestionCreateInput>,
) -> impl IntoResponse {
    info!("Creating suggestion: {}", input.title);

    input.title = match validate_required_name(&input.title, "Title") {
        Ok(title) => title,
        Err(e) => return e.into_response(),
    };
    input.description = match validate_required_text(&input.description, "Description") {
        Ok(description) => description,
        Err(e) => return e.into_response(),
    };

    match db.suggestion_storage.create(input).await {
        Ok(suggestion) => (
            StatusCode::CREATED,
            ResponseJson(ApiResponse::success(suggestion)),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Request body for voting on a suggestion
#[derive(Deserialize)]
pub struct VoteRequest {
    #[serde(rename = "voterId")]
    pub voter_id: String,
    pub vote: VoteType,
}

/// Cast a vote on a suggestion
pub async fn vote_suggestion(
    State(db): State<DbState>,
    Path(id): Path<String>,
    Json(request): Json<VoteRequest>,
) -> impl IntoResponse {
    info!("Vote {} on suggestion {} by {}", request.vote, id, request.voter_id);

    match db
        .suggestion_storage
        .vote(&id, &request.voter_id, request.vote)
        .await
    {
        Ok(suggestion) => {
            (StatusCode::OK, ResponseJson(ApiResponse::success(suggestion))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Request body for removing a vote
#[derive(Deserialize)]
pub struct UnvoteRequest {
    #[serde(rename = "voterId")]
    pub voter_id: String,
}

/// Remove a voter's vote from a suggestion
pub async fn unvote_suggestion(
    State(db): State<DbState>,
    Path(id): Path<String>,
    Json(request): Json<UnvoteRequest>,
) -> impl IntoResponse {
    info!("Removing vote on suggestion {} by {}", id, request.voter_id);

    match db.suggestion_storage.unvote(&id, &request.voter_id).await {
        Ok(suggestion) => {
            (StatusCode::OK, ResponseJson(ApiResponse::success(suggestion))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Request body for updating suggestion status
#[derive(Deserialize)]
pub struct UpdateSuggestionStatusRequest {
    pub status: SuggestionStatus,
}

/// Move a suggestion to a new status
pub async fn update_suggestion_status(
    State(db): State<DbState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateSuggestionStatusRequest>,
) -> impl IntoResponse {
    info!("Updating suggestion {} status", id);

    match db.suggestion_storage.update_status(&id, request.status).await {
        Ok(suggestion) => {
            (StatusCode::OK, ResponseJson(ApiResponse::success(suggestion))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Delete a suggestion
pub async fn delete_suggestion(
    State(db): State<DbState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("Deleting suggestion: {}", id);

    match db.suggestion_storage.delete(&id).await {
        Ok(()) => (
            StatusCode::OK,
            ResponseJson(ApiResponse::success(serde_json::json!({
                "message": format!("Suggestion {} deleted successfully", id)
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

    async fn create_suggestion(app: &axum::Router) -> String {
        let request = Request::builder()
            .method("POST")
            .uri("/suggestions")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({
                    "organizationId": "org-1",
                    "title": "Quiet rooms",
                    "description": "Add two bookable quiet rooms."
                })
                .to_string(),
            ))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        body["data"]["id"].as_str().unwrap().to_string()
    }

    fn vote_request(id: &str, vote: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/suggestions/{}/vote", id))
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({ "voterId": "voter-1", "vote": vote }).to_string(),
            ))
            .unwrap()
    }

    #[tokio::test]
    async fn test_double_vote_rejected_opposite_flips() {
        let (state, _blobs) = test_state().await;
        let app = create_backoffice_router(state);
        let id = create_suggestion(&app).await;

        // First vote counts
        let response = app.clone().oneshot(vote_request(&id, "up")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["upvotes"], 1);

        // Same vote again is a conflict
        let response = app.clone().oneshot(vote_request(&id, "up")).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        // Opposite vote flips the tally
        let response = app.clone().oneshot(vote_request(&id, "down")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["upvotes"], 0);
        assert_eq!(body["data"]["downvotes"], 1);
    }

    #[tokio::test]
    async fn test_create_requires_description() {
        let (state, _blobs) = test_state().await;
        let app = create_backoffice_router(state);

        let request = Request::builder()
            .method("POST")
            .uri("/suggestions")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({
                    "organizationId": "org-1",
                    "title": "No body",
                    "description": "   "
                })
                .to_string(),
            ))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
