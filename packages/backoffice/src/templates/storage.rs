// ABOUTME: Billing template storage layer using SQLite
// ABOUTME: set_default swaps the org default inside one transaction

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::types::{Template, TemplateCreateInput, TemplateKind, TemplateUpdateInput};
use crate::pagination::PaginationParams;
use crate::storage::{generate_id, StorageError};

pub struct TemplateStorage {
    pool: SqlitePool,
}

impl TemplateStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a template. The first template of a kind becomes the default.
    pub async fn create(
        &self,
        kind: TemplateKind,
        input: TemplateCreateInput,
    ) -> Result<Template, StorageError> {
        let id = generate_id("tpl");
        let now = Utc::now();

        debug!("Creating {} template: {} ({})", kind, id, input.name);

        let existing: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM billing_templates WHERE organization_id = ? AND kind = ?",
        )
        .bind(&input.organization_id)
        .bind(kind.to_string())
        .fetch_one(&self.pool)
        .await?;

        let body = serde_json::to_string(&input.body)?;

        sqlx::query(
            r#"
            INSERT INTO billing_templates (id, organization_id, kind, name, body, is_default,
                                           created_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&input.organization_id)
        .bind(kind.to_string())
        .bind(&input.name)
        .bind(body)
        .bind(existing == 0)
        .bind(&input.created_by)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(&id).await
    }

    pub async fn get(&self, id: &str) -> Result<Template, StorageError> {
        let row = sqlx::query("SELECT * FROM billing_templates WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StorageError::NotFound("Template".to_string()))?;

        row_to_template(&row)
    }

    pub async fn list(
        &self,
        organization_id: &str,
        kind: TemplateKind,
        pagination: &PaginationParams,
    ) -> Result<(Vec<Template>, i64), StorageError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM billing_templates WHERE organization_id = ? AND kind = ?",
        )
        .bind(organization_id)
        .bind(kind.to_string())
        .fetch_one(&self.pool)
        .await?;

        let (limit, offset) = pagination.validate();
        let rows = sqlx::query(
            "SELECT * FROM billing_templates WHERE organization_id = ? AND kind = ? ORDER BY name LIMIT ? OFFSET ?",
        )
        .bind(organization_id)
        .bind(kind.to_string())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let templates = rows
            .iter()
            .map(row_to_template)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((templates, total))
    }

    pub async fn update(
        &self,
        id: &str,
        input: TemplateUpdateInput,
    ) -> Result<Template, StorageError> {
        debug!("Updating template: {}", id);

        let body_json = match &input.body {
            Some(body) => Some(serde_json::to_string(body)?),
            None => None,
        };

        let mut query_parts = Vec::new();
        if input.name.is_some() {
            query_parts.push("name = ?");
        }
        if body_json.is_some() {
            query_parts.push("body = ?");
        }

        if query_parts.is_empty() {
            return self.get(id).await;
        }
        query_parts.push("updated_at = ?");

        let query_str = format!(
            "UPDATE billing_templates SET {} WHERE id = ?",
            query_parts.join(", ")
        );
        let mut query = sqlx::query(&query_str);

        if let Some(name) = input.name {
            query = query.bind(name);
        }
        if let Some(body) = body_json {
            query = query.bind(body);
        }

        let result = query.bind(Utc::now()).bind(id).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound("Template".to_string()));
        }

        self.get(id).await
    }

    /// Make a template the default for its organization and kind.
    /// The previous default is cleared in the same transaction.
    pub async fn set_default(&self, id: &str) -> Result<Template, StorageError> {
        let template = self.get(id).await?;

        debug!("Setting default {} template: {}", template.kind, id);

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE billing_templates SET is_default = 0, updated_at = ? WHERE organization_id = ? AND kind = ? AND is_default = 1",
        )
        .bind(Utc::now())
        .bind(&template.organization_id)
        .bind(template.kind.to_string())
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE billing_templates SET is_default = 1, updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get(id).await
    }

    /// Delete a template; the current default cannot be deleted
    pub async fn delete(&self, id: &str) -> Result<(), StorageError> {
        let template = self.get(id).await?;

        if template.is_default {
            return Err(StorageError::Conflict(
                "The default template cannot be deleted; set another default first".to_string(),
            ));
        }

        debug!("Deleting template: {}", id);

        sqlx::query("DELETE FROM billing_templates WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

fn row_to_template(row: &sqlx::sqlite::SqliteRow) -> Result<Template, StorageError> {
    let kind: String = row.try_get("kind")?;
    let body: String = row.try_get("body")?;

    Ok(Template {
        id: row.try_get("id")?,
        organization_id: row.try_get("organization_id")?,
        kind: kind.parse().map_err(StorageError::Database)?,
        name: row.try_get("name")?,
        body: serde_json::from_str(&body)?,
        is_default: row.try_get("is_default")?,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::connect_in_memory;
    use serde_json::json;

    fn sample(org: &str, name: &str) -> TemplateCreateInput {
        TemplateCreateInput {
            organization_id: org.to_string(),
            name: name.to_string(),
            body: json!({ "header": name, "fields": ["date", "total"] }),
            created_by: None,
        }
    }

    #[tokio::test]
    async fn test_first_template_becomes_default() {
        let pool = connect_in_memory().await.unwrap();
        let storage = TemplateStorage::new(pool);

        let first = storage
            .create(TemplateKind::Invoice, sample("org-1", "Standard"))
            .await
            .unwrap();
        assert!(first.is_default);

        let second = storage
            .create(TemplateKind::Invoice, sample("org-1", "Compact"))
            .await
            .unwrap();
        assert!(!second.is_default);

        // Receipt templates have their own default
        let receipt = storage
            .create(TemplateKind::Receipt, sample("org-1", "Receipt A"))
            .await
            .unwrap();
        assert!(receipt.is_default);
    }

    #[tokio::test]
    async fn test_set_default_clears_previous() {
        let pool = connect_in_memory().await.unwrap();
        let storage = TemplateStorage::new(pool);

        let first = storage
            .create(TemplateKind::Invoice, sample("org-1", "Standard"))
            .await
            .unwrap();
        let second = storage
            .create(TemplateKind::Invoice, sample("org-1", "Compact"))
            .await
            .unwrap();

        let promoted = storage.set_default(&second.id).await.unwrap();
        assert!(promoted.is_default);

        let demoted = storage.get(&first.id).await.unwrap();
        assert!(!demoted.is_default);
    }

    #[tokio::test]
    async fn test_default_cannot_be_deleted() {
        let pool = connect_in_memory().await.unwrap();
        let storage = TemplateStorage::new(pool);

        let template = storage
            .create(TemplateKind::Receipt, sample("org-1", "Receipt A"))
            .await
            .unwrap();

        assert!(matches!(
            storage.delete(&template.id).await,
            Err(StorageError::Conflict(_))
        ));
    }
}
