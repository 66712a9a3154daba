// ABOUTME: Audit log storage layer using SQLite

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::types::{AuditEntry, AuditFilter};
use crate::pagination::PaginationParams;
use crate::storage::{generate_id, StorageError};

pub struct AuditStorage {
    pool: SqlitePool,
}

impl AuditStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append an audit entry
    pub async fn record(
        &self,
        organization_id: &str,
        actor_id: Option<&str>,
        action: &str,
        entity_type: &str,
        entity_id: &str,
        details: Option<serde_json::Value>,
    ) -> Result<AuditEntry, StorageError> {
        let id = generate_id("aud");
        let now = Utc::now();

        debug!("Audit: {} {} {} by {:?}", action, entity_type, entity_id, actor_id);

        let details_json = match &details {
            Some(value) => Some(serde_json::to_string(value)?),
            None => None,
        };

        sqlx::query(
            r#"
            INSERT INTO audit_log (id, organization_id, actor_id, action, entity_type,
                                   entity_id, details, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(organization_id)
        .bind(actor_id)
        .bind(action)
        .bind(entity_type)
        .bind(entity_id)
        .bind(details_json)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(AuditEntry {
            id,
            organization_id: organization_id.to_string(),
            actor_id: actor_id.map(String::from),
            action: action.to_string(),
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            details,
            created_at: now,
        })
    }

    pub async fn list(
        &self,
        organization_id: &str,
        filter: &AuditFilter,
        pagination: &PaginationParams,
    ) -> Result<(Vec<AuditEntry>, i64), StorageError> {
        let mut where_clause = String::from("WHERE organization_id = ?");
        if filter.entity_type.is_some() {
            where_clause.push_str(" AND entity_type = ?");
        }
        if filter.entity_id.is_some() {
            where_clause.push_str(" AND entity_id = ?");
        }

        let count_sql = format!("SELECT COUNT(*) FROM audit_log {}", where_clause);
        let mut count_query = sqlx::query_scalar(&count_sql).bind(organization_id);
        if let Some(entity_type) = &filter.entity_type {
            count_query = count_query.bind(entity_type);
        }
        if let Some(entity_id) = &filter.entity_id {
            count_query = count_query.bind(entity_id);
        }
        let total: i64 = count_query.fetch_one(&self.pool).await?;

        let (limit, offset) = pagination.validate();
        let list_sql = format!(
            "SELECT * FROM audit_log {} ORDER BY created_at DESC LIMIT ? OFFSET ?",
            where_clause
        );
        let mut list_query = sqlx::query(&list_sql).bind(organization_id);
        if let Some(entity_type) = &filter.entity_type {
            list_query = list_query.bind(entity_type);
        }
        if let Some(entity_id) = &filter.entity_id {
            list_query = list_query.bind(entity_id);
        }
        let rows = list_query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let entries = rows.iter().map(row_to_entry).collect::<Result<Vec<_>, _>>()?;

        Ok((entries, total))
    }
}

fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> Result<AuditEntry, StorageError> {
    let details: Option<String> = row.try_get("details")?;

    Ok(AuditEntry {
        id: row.try_get("id")?,
        organization_id: row.try_get("organization_id")?,
        actor_id: row.try_get("actor_id")?,
        action: row.try_get("action")?,
        entity_type: row.try_get("entity_type")?,
        entity_id: row.try_get("entity_id")?,
        details: details.map(|d| serde_json::from_str(&d)).transpose()?,
        created_at: row.try_get("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::connect_in_memory;

    #[tokio::test]
    async fn test_record_and_filter() {
        let pool = connect_in_memory().await.unwrap();
        let storage = AuditStorage::new(pool);

        storage
            .record("org-1", Some("user-1"), "created", "feedback", "fbk-1", None)
            .await
            .unwrap();
        storage
            .record("org-1", Some("user-1"), "deleted", "project", "prj-1", None)
            .await
            .unwrap();

        let filter = AuditFilter {
            entity_type: Some("feedback".to_string()),
            entity_id: None,
        };
        let (entries, total) = storage
            .list("org-1", &filter, &PaginationParams::default())
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(entries[0].action, "created");
    }
}
