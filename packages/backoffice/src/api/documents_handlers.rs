// ABOUTME: HTTP request handlers for document management
// ABOUTME: Multipart upload stores the blob via FileStore, metadata in SQLite

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json as ResponseJson},
    Json,
};
use serde::Deserialize;
use tracing::{info, warn};

use super::response::ApiResponse;
use crate::db::DbState;
use crate::documents::{DocumentCategory, DocumentCreateInput, DocumentUpdateInput};
use crate::pagination::{PaginatedResponse, PaginationParams};
use crate::storage::{generate_id, StorageError};

#[derive(Deserialize)]
pub struct ListDocumentsQuery {
    #[serde(rename = "organizationId")]
    pub organization_id: String,
    pub category: Option<DocumentCategory>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// List document metadata for an organization
pub async fn list_documents(
    State(db): State<DbState>,
    Query(params): Query<ListDocumentsQuery>,
) -> impl IntoResponse {
    info!("Listing documents for org: {}", params.organization_id);

    let defaults = PaginationParams::default();
    let pagination = PaginationParams {
        page: params.page.unwrap_or(defaults.page),
        limit: params.limit.unwrap_or(defaults.limit),
    };

    match db
        .document_storage
        .list(&params.organization_id, params.category, &pagination)
        .await
    {
        Ok((documents, total)) => {
            let response = PaginatedResponse::new(documents, &pagination, total);
            (StatusCode::OK, ResponseJson(ApiResponse::success(response))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Get a document's metadata
pub async fn get_document(State(db): State<DbState>, Path(id): Path<String>) -> impl IntoResponse {
    info!("Getting document: {}", id);

    match db.document_storage.get(&id).await {
        Ok(document) => {
            (StatusCode::OK, ResponseJson(ApiResponse::success(document))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Upload a document: multipart fields plus a `file` part.
/// The blob goes to the file store, the metadata row to the database.
pub async fn upload_document(
    State(db): State<DbState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut organization_id = None;
    let mut name = None;
    let mut description = None;
    let mut category = DocumentCategory::default();
    let mut uploaded_by = None;
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut content_type = "application/octet-stream".to_string();
    let mut file_name = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return StorageError::InvalidInput(format!("Malformed multipart body: {}", e))
                    .into_response()
            }
        };

        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "organizationId" => match field.text().await {
                Ok(text) => organization_id = Some(text),
                Err(e) => {
                    return StorageError::InvalidInput(e.to_string()).into_response();
                }
            },
            "name" => match field.text().await {
                Ok(text) => name = Some(text),
                Err(e) => {
                    return StorageError::InvalidInput(e.to_string()).into_response();
                }
            },
            "description" => match field.text().await {
                Ok(text) => description = Some(text),
                Err(e) => {
                    return StorageError::InvalidInput(e.to_string()).into_response();
                }
            },
            "category" => match field.text().await {
                Ok(text) => {
                    category = match text.parse() {
                        Ok(parsed) => parsed,
                        Err(e) => return StorageError::InvalidInput(e).into_response(),
                    }
                }
                Err(e) => {
                    return StorageError::InvalidInput(e.to_string()).into_response();
                }
            },
            "uploadedBy" => match field.text().await {
                Ok(text) => uploaded_by = Some(text),
                Err(e) => {
                    return StorageError::InvalidInput(e.to_string()).into_response();
                }
            },
            "file" => {
                if let Some(ct) = field.content_type() {
                    content_type = ct.to_string();
                }
                file_name = field.file_name().map(String::from);
                match field.bytes().await {
                    Ok(bytes) => file_bytes = Some(bytes.to_vec()),
                    Err(e) => {
                        return StorageError::InvalidInput(format!("Failed to read file: {}", e))
                            .into_response()
                    }
                }
            }
            _ => {}
        }
    }

    let Some(organization_id) = organization_id else {
        return StorageError::InvalidInput("organizationId is required".to_string())
            .into_response();
    };
    let Some(bytes) = file_bytes else {
        return StorageError::InvalidInput("A file part is required".to_string()).into_response();
    };
    let name = match name.or(file_name) {
        Some(name) if !name.trim().is_empty() => name,
        _ => {
            return StorageError::InvalidInput("Document name is required".to_string())
                .into_response()
        }
    };

    info!("Uploading document '{}' for org {}", name, organization_id);

    let storage_key = generate_id("blob");
    if let Err(e) = db.file_store.put(&storage_key, &bytes).await {
        return StorageError::from(e).into_response();
    }

    let input = DocumentCreateInput {
        organization_id: organization_id.clone(),
        name,
        description,
        category,
        content_type,
        size_bytes: bytes.len() as i64,
        storage_key: storage_key.clone(),
        uploaded_by: uploaded_by.clone(),
    };

    match db.document_storage.create(input).await {
        Ok(document) => {
            if let Err(e) = db
                .audit_storage
                .record(
                    &organization_id,
                    uploaded_by.as_deref(),
                    "uploaded",
                    "document",
                    &document.id,
                    None,
                )
                .await
            {
                warn!("Failed to record audit entry: {}", e);
            }
            (
                StatusCode::CREATED,
                ResponseJson(ApiResponse::success(document)),
            )
                .into_response()
        }
        Err(e) => {
            // Metadata insert failed; drop the orphaned blob
            if let Err(cleanup) = db.file_store.delete(&storage_key).await {
                warn!("Failed to remove orphaned blob {}: {}", storage_key, cleanup);
            }
            e.into_response()
        }
    }
}

/// Download a document's bytes
pub async fn download_document(
    State(db): State<DbState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("Downloading document: {}", id);

    let document = match db.document_storage.get(&id).await {
        Ok(document) => document,
        Err(e) => return e.into_response(),
    };

    match db.file_store.get(&document.storage_key).await {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, document.content_type.clone()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", document.name),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => StorageError::from(e).into_response(),
    }
}

/// Update document metadata
pub async fn update_document(
    State(db): State<DbState>,
    Path(id): Path<String>,
    Json(updates): Json<DocumentUpdateInput>,
) -> impl IntoResponse {
    info!("Updating document: {}", id);

    match db.document_storage.update(&id, updates).await {
        Ok(document) => {
            (StatusCode::OK, ResponseJson(ApiResponse::success(document))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Delete a document: blob first, then the metadata row
pub async fn delete_document(
    State(db): State<DbState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("Deleting document: {}", id);

    let document = match db.document_storage.get(&id).await {
        Ok(document) => document,
        Err(e) => return e.into_response(),
    };

    if let Err(e) = db.file_store.delete(&document.storage_key).await {
        // A missing blob should not block metadata cleanup
        warn!("Blob {} could not be removed: {}", document.storage_key, e);
    }

    match db.document_storage.delete(&id).await {
        Ok(()) => (
            StatusCode::OK,
            ResponseJson(ApiResponse::success(serde_json::json!({
                "message": format!("Document {} deleted successfully", id)
            }))),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
