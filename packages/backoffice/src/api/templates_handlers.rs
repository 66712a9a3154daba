// ABOUTME: HTTP request handlers for invoice and receipt templates
// ABOUTME: The template kind comes from the mounted route, not the body

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
use crate::templates::{TemplateCreateInput, TemplateKind, TemplateUpdateInput};

#[derive(Deserialize)]
pub struct ListTemplatesQuery {
    #[serde(rename = "organizationId")]
    pub organization_id: String,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

async fn list_templates(
    db: DbState,
    kind: TemplateKind,
    params: ListTemplatesQuery,
) -> axum::response::Response {
    info!("Listing {} templates for org: {}", kind, params.organization_id);

    let defaults = PaginationParams::default();
    let pagination = PaginationParams {
        page: params.page.unwrap_or(defaults.page),
        limit: params.limit.unwrap_or(defaults.limit),
    };

    match db
        .template_storage
        .list(&params.organization_id, kind, &pagination)
        .await
    {
        Ok((templates, total)) => {
            let response = PaginatedResponse::new(templates, &pagination, total);
            (StatusCode::OK, ResponseJson(ApiResponse::success(response))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// List invoice templates
pub async fn list_invoice_templates(
    State(db): State<DbState>,
    Query(params): Query<ListTemplatesQuery>,
) -> impl IntoResponse {
    list_templates(db, TemplateKind::Invoice, params).await
}

/// List receipt templates
pub async fn list_receipt_templates(
    State(db): State<DbState>,
    Query(params): Query<ListTemplatesQuery>,
) -> impl IntoResponse {
    list_templates(db, TemplateKind::Receipt, params).await
}

async fn create_template(
    db: DbState,
    kind: TemplateKind,
    mut input: TemplateCreateInput,
) -> axum::response::Response {
    info!("Creating {} template: {}", kind, input.name);

    input.name = match validate_required_name(&input.name, "Template name") {
        Ok(name) => name,
        Err(e) => return e.into_response(),
    };

    match db.template_storage.create(kind, input).await {
        Ok(template) => (
            StatusCode::CREATED,
            ResponseJson(ApiResponse::success(template)),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create an invoice template
pub async fn create_invoice_template(
    State(db): State<DbState>,
    Json(input): Json<TemplateCreateInput>,
) -> impl IntoResponse {
    create_template(db, TemplateKind::Invoice, input).await
}

/// Create a receipt template
pub async fn create_receipt_template(
    State(db): State<DbState>,
    Json(input): Json<TemplateCreateInput>,
) -> impl IntoResponse {
    create_template(db, TemplateKind::Receipt, input).await
}

/// Get a template by ID
pub async fn get_template(State(db): State<DbState>, Path(id): Path<String>) -> impl IntoResponse {
    info!("Getting template: {}", id);

    match db.template_storage.get(&id).await {
        Ok(template) => {
            (StatusCode::OK, ResponseJson(ApiResponse::success(template))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Update a template
pub async fn update_template(
    State(db): State<DbState>,
    Path(id): Path<String>,
    Json(updates): Json<TemplateUpdateInput>,
) -> impl IntoResponse {
    info!("Updating template: {}", id);

    match db.template_storage.update(&id, updates).await {
        Ok(template) => {
            (StatusCode::OK, ResponseJson(ApiResponse::success(template))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Make a template the default for its kind
pub async fn set_default_template(
    State(db): State<DbState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("Setting default template: {}", id);

    match db.template_storage.set_default(&id).await {
        Ok(template) => {
            (StatusCode::OK, ResponseJson(ApiResponse::success(template))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Delete a template
pub async fn delete_template(
    State(db): State<DbState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("Deleting template: {}", id);

    match db.template_storage.delete(&id).await {
        Ok(()) => (
            StatusCode::OK,
            ResponseJson(ApiResponse::success(serde_json::json!({
                "message": format!("Template {} deleted successfully", id)
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

    async fn create(app: &axum::Router, kind: &str, name: &str) -> serde_json::Value {
        let request = Request::builder()
            .method("POST")
            .uri(format!("/templates/{}", kind))
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({
                    "organizationId": "org-1",
                    "name": name,
                    "body": { "fields": ["date", "total"] }
                })
                .to_string(),
            ))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await
    }

    #[tokio::test]
    async fn test_set_default_swaps_previous() {
        let (state, _blobs) = test_state().await;
        let app = create_backoffice_router(state);

        let first = create(&app, "invoice", "Standard").await;
        let second = create(&app, "invoice", "Compact").await;
        assert_eq!(first["data"]["isDefault"], true);
        assert_eq!(second["data"]["isDefault"], false);

        let second_id = second["data"]["id"].as_str().unwrap();
        let request = Request::builder()
            .method("POST")
            .uri(format!("/templates/{}/set-default", second_id))
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let first_id = first["data"]["id"].as_str().unwrap();
        let request = Request::builder()
            .method("GET")
            .uri(format!("/templates/{}", first_id))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body["data"]["isDefault"], false);
    }

    #[tokio::test]
    async fn test_deleting_default_is_conflict() {
        let (state, _blobs) = test_state().await;
        let app = create_backoffice_router(state);

        let template = create(&app, "receipt", "Receipt A").await;
        let id = template["data"]["id"].as_str().unwrap();

        let request = Request::builder()
            .method("DELETE")
            .uri(format!("/templates/{}", id))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
