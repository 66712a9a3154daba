// ABOUTME: Document metadata storage layer using SQLite

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::types::{Document, DocumentCategory, DocumentCreateInput, DocumentUpdateInput};
use crate::pagination::PaginationParams;
use crate::storage::{generate_id, StorageError};

pub struct DocumentStorage {
    pool: SqlitePool,
}

impl DocumentStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: DocumentCreateInput) -> Result<Document, StorageError> {
        let id = generate_id("doc");
        let now = Utc::now();

        debug!("Creating document record: {} ({})", id, input.name);

        sqlx::query(
            r#"
            INSERT INTO documents (id, organization_id, name, description, category,
                                   content_type, size_bytes, storage_key, uploaded_by,
                                   created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&input.organization_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.category.to_string())
        .bind(&input.content_type)
        .bind(input.size_bytes)
        .bind(&input.storage_key)
        .bind(&input.uploaded_by)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(&id).await
    }

    pub async fn get(&self, id: &str) -> Result<Document, StorageError> {
        let row = sqlx::query("SELECT * FROM documents WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StorageError::NotFound("Document".to_string()))?;

        row_to_document(&row)
    }

    pub async fn list(
        &self,
        organization_id: &str,
        category: Option<DocumentCategory>,
        pagination: &PaginationParams,
    ) -> Result<(Vec<Document>, i64), StorageError> {
        let mut where_clause = String::from("WHERE organization_id = ?");
        if category.is_some() {
            where_clause.push_str(" AND category = ?");
        }

        let count_sql = format!("SELECT COUNT(*) FROM documents {}", where_clause);
        let mut count_query = sqlx::query_scalar(&count_sql).bind(organization_id);
        if let Some(category) = category {
            count_query = count_query.bind(category.to_string());
        }
        let total: i64 = count_query.fetch_one(&self.pool).await?;

        let (limit, offset) = pagination.validate();
        let list_sql = format!(
            "SELECT * FROM documents {} ORDER BY created_at DESC LIMIT ? OFFSET ?",
            where_clause
        );
        let mut list_query = sqlx::query(&list_sql).bind(organization_id);
        if let Some(category) = category {
            list_query = list_query.bind(category.to_string());
        }
        let rows = list_query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let documents = rows
            .iter()
            .map(row_to_document)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((documents, total))
    }

    pub async fn update(
        &self,
        id: &str,
        input: DocumentUpdateInput,
    ) -> Result<Document, StorageError> {
        debug!("Updating document: {}", id);

        let mut query_parts = Vec::new();
        if input.name.is_some() {
            query_parts.push("name = ?");
        }
        if input.description.is_some() {
            query_parts.push("description = ?");
        }
        if input.category.is_some() {
            query_parts.push("category = ?");
        }

        if query_parts.is_empty() {
            return self.get(id).await;
        }
        query_parts.push("updated_at = ?");

        let query_str = format!("UPDATE documents SET {} WHERE id = ?", query_parts.join(", "));
        let mut query = sqlx::query(&query_str);

        if let Some(name) = input.name {
            query = query.bind(name);
        }
        if let Some(description) = input.description {
            query = query.bind(description);
        }
        if let Some(category) = input.category {
            query = query.bind(category.to_string());
        }

        let result = query.bind(Utc::now()).bind(id).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound("Document".to_string()));
        }

        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), StorageError> {
        debug!("Deleting document record: {}", id);

        let result = sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound("Document".to_string()));
        }

        Ok(())
    }
}

fn row_to_document(row: &sqlx::sqlite::SqliteRow) -> Result<Document, StorageError> {
    let category: String = row.try_get("category")?;

    Ok(Document {
        id: row.try_get("id")?,
        organization_id: row.try_get("organization_id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        category: category.parse().map_err(StorageError::Database)?,
        content_type: row.try_get("content_type")?,
        size_bytes: row.try_get("size_bytes")?,
        storage_key: row.try_get("storage_key")?,
        uploaded_by: row.try_get("uploaded_by")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::connect_in_memory;

    #[tokio::test]
    async fn test_create_and_filter_by_category() {
        let pool = connect_in_memory().await.unwrap();
        let storage = DocumentStorage::new(pool);

        storage
            .create(DocumentCreateInput {
                organization_id: "org-1".to_string(),
                name: "Handbook.pdf".to_string(),
                description: None,
                category: DocumentCategory::Policy,
                content_type: "application/pdf".to_string(),
                size_bytes: 1024,
                storage_key: "key-1".to_string(),
                uploaded_by: Some("user-1".to_string()),
            })
            .await
            .unwrap();
        storage
            .create(DocumentCreateInput {
                organization_id: "org-1".to_string(),
                name: "Q3.xlsx".to_string(),
                description: None,
                category: DocumentCategory::Report,
                content_type: "application/vnd.ms-excel".to_string(),
                size_bytes: 2048,
                storage_key: "key-2".to_string(),
                uploaded_by: None,
            })
            .await
            .unwrap();

        let (docs, total) = storage
            .list("org-1", Some(DocumentCategory::Policy), &PaginationParams::default())
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(docs[0].name, "Handbook.pdf");
    }
}
