// ABOUTME: Feedback storage layer using SQLite
// ABOUTME: Handles CRUD plus the respond/status transitions

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::types::{
    EmployeeRef, Feedback, FeedbackCreateInput, FeedbackFilter, FeedbackStatus,
};
use crate::pagination::PaginationParams;
use crate::storage::{generate_id, StorageError};

pub struct FeedbackStorage {
    pool: SqlitePool,
}

const SELECT_WITH_EMPLOYEE: &str = r#"
    SELECT f.*, e.first_name AS emp_first_name, e.last_name AS emp_last_name,
           e.department AS emp_department
    FROM feedback f
    LEFT JOIN employees e ON e.id = f.employee_id
"#;

impl FeedbackStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a feedback entry; new entries always start as `new` with no response
    pub async fn create(&self, input: FeedbackCreateInput) -> Result<Feedback, StorageError> {
        let id = generate_id("fbk");
        let now = Utc::now();

        debug!("Creating feedback: {} (org: {})", id, input.organization_id);

        if let Some(employee_id) = &input.employee_id {
            let exists: Option<String> =
                sqlx::query_scalar("SELECT id FROM employees WHERE id = ?")
                    .bind(employee_id)
                    .fetch_optional(&self.pool)
                    .await?;
            if exists.is_none() {
                return Err(StorageError::NotFound("Employee".to_string()));
            }
        }

        sqlx::query(
            r#"
            INSERT INTO feedback (id, organization_id, employee_id, subject, message,
                                  category, rating, anonymous, status, has_response,
                                  created_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'new', 0, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&input.organization_id)
        .bind(&input.employee_id)
        .bind(&input.subject)
        .bind(&input.message)
        .bind(input.category.to_string())
        .bind(input.rating)
        .bind(input.anonymous)
        .bind(&input.created_by)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(&id).await
    }

    /// Get a single feedback entry with its employee reference populated
    pub async fn get(&self, id: &str) -> Result<Feedback, StorageError> {
        let query = format!("{} WHERE f.id = ?", SELECT_WITH_EMPLOYEE);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StorageError::NotFound("Feedback".to_string()))?;

        row_to_feedback(&row)
    }

    /// List feedback for an organization, filtered and paginated
    pub async fn list(
        &self,
        organization_id: &str,
        filter: &FeedbackFilter,
        pagination: &PaginationParams,
    ) -> Result<(Vec<Feedback>, i64), StorageError> {
        let mut where_clause = String::from("WHERE f.organization_id = ?");
        if filter.status.is_some() {
            where_clause.push_str(" AND f.status = ?");
        }
        if filter.category.is_some() {
            where_clause.push_str(" AND f.category = ?");
        }

        let count_sql = format!("SELECT COUNT(*) FROM feedback f {}", where_clause);
        let mut count_query = sqlx::query_scalar(&count_sql).bind(organization_id);
        if let Some(status) = filter.status {
            count_query = count_query.bind(status.to_string());
        }
        if let Some(category) = filter.category {
            count_query = count_query.bind(category.to_string());
        }
        let total: i64 = count_query.fetch_one(&self.pool).await?;

        let (limit, offset) = pagination.validate();
        let list_sql = format!(
            "{} {} ORDER BY f.created_at DESC LIMIT ? OFFSET ?",
            SELECT_WITH_EMPLOYEE, where_clause
        );
        let mut list_query = sqlx::query(&list_sql).bind(organization_id);
        if let Some(status) = filter.status {
            list_query = list_query.bind(status.to_string());
        }
        if let Some(category) = filter.category {
            list_query = list_query.bind(category.to_string());
        }
        let rows = list_query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let entries = rows
            .iter()
            .map(row_to_feedback)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((entries, total))
    }

    /// Record a response; flips has_response and moves the entry to `responded`
    pub async fn respond(
        &self,
        id: &str,
        response: &str,
        responded_by: &str,
    ) -> Result<Feedback, StorageError> {
        debug!("Responding to feedback: {}", id);

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE feedback
            SET response = ?, responded_by = ?, responded_at = ?,
                has_response = 1, status = 'responded', updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(response)
        .bind(responded_by)
        .bind(now)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound("Feedback".to_string()));
        }

        self.get(id).await
    }

    /// Move a feedback entry to a new status
    pub async fn update_status(
        &self,
        id: &str,
        status: FeedbackStatus,
    ) -> Result<Feedback, StorageError> {
        debug!("Updating feedback {} status to {}", id, status);

        let result = sqlx::query("UPDATE feedback SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.to_string())
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound("Feedback".to_string()));
        }

        self.get(id).await
    }

    /// Delete a feedback entry permanently
    pub async fn delete(&self, id: &str) -> Result<(), StorageError> {
        debug!("Deleting feedback: {}", id);

        let result = sqlx::query("DELETE FROM feedback WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound("Feedback".to_string()));
        }

        Ok(())
    }
}

fn row_to_feedback(row: &sqlx::sqlite::SqliteRow) -> Result<Feedback, StorageError> {
    let employee_id: Option<String> = row.try_get("employee_id")?;
    let employee = match (&employee_id, row.try_get::<Option<String>, _>("emp_first_name")?) {
        (Some(id), Some(first_name)) => {
            let last_name: Option<String> = row.try_get("emp_last_name")?;
            Some(EmployeeRef {
                id: id.clone(),
                name: match last_name {
                    Some(last) => format!("{} {}", first_name, last),
                    None => first_name,
                },
                department: row.try_get("emp_department")?,
            })
        }
        _ => None,
    };

    let status: String = row.try_get("status")?;
    let category: String = row.try_get("category")?;

    Ok(Feedback {
        id: row.try_get("id")?,
        organization_id: row.try_get("organization_id")?,
        employee,
        subject: row.try_get("subject")?,
        message: row.try_get("message")?,
        category: category.parse().map_err(StorageError::Database)?,
        rating: row.try_get("rating")?,
        anonymous: row.try_get("anonymous")?,
        status: status.parse().map_err(StorageError::Database)?,
        has_response: row.try_get("has_response")?,
        response: row.try_get("response")?,
        responded_by: row.try_get("responded_by")?,
        responded_at: row.try_get::<Option<DateTime<Utc>>, _>("responded_at")?,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::connect_in_memory;

    fn sample_input(org: &str) -> FeedbackCreateInput {
        FeedbackCreateInput {
            organization_id: org.to_string(),
            employee_id: None,
            subject: "Desk lighting".to_string(),
            message: "The third floor could use warmer lighting.".to_string(),
            category: Default::default(),
            rating: Some(4),
            anonymous: false,
            created_by: Some("user-1".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_defaults_to_new_without_response() {
        let pool = connect_in_memory().await.unwrap();
        let storage = FeedbackStorage::new(pool);

        let feedback = storage.create(sample_input("org-1")).await.unwrap();
        assert_eq!(feedback.status, FeedbackStatus::New);
        assert!(!feedback.has_response);
        assert!(feedback.response.is_none());
        assert!(feedback.id.starts_with("fbk-"));
    }

    #[tokio::test]
    async fn test_list_filters_by_org_and_status() {
        let pool = connect_in_memory().await.unwrap();
        let storage = FeedbackStorage::new(pool);

        let a = storage.create(sample_input("org-1")).await.unwrap();
        storage.create(sample_input("org-1")).await.unwrap();
        storage.create(sample_input("org-2")).await.unwrap();

        storage
            .update_status(&a.id, FeedbackStatus::Resolved)
            .await
            .unwrap();

        let filter = FeedbackFilter {
            status: Some(FeedbackStatus::Resolved),
            category: None,
        };
        let (entries, total) = storage
            .list("org-1", &filter, &PaginationParams::default())
            .await
            .unwrap();

        assert_eq!(total, 1);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, a.id);

        let (all, total) = storage
            .list("org-1", &FeedbackFilter::default(), &PaginationParams::default())
            .await
            .unwrap();
        assert_eq!(total, 2);
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_respond_flips_state() {
        let pool = connect_in_memory().await.unwrap();
        let storage = FeedbackStorage::new(pool);

        let feedback = storage.create(sample_input("org-1")).await.unwrap();
        let responded = storage
            .respond(&feedback.id, "Thanks, facilities will follow up.", "mgr-1")
            .await
            .unwrap();

        assert!(responded.has_response);
        assert_eq!(responded.status, FeedbackStatus::Responded);
        assert_eq!(responded.responded_by.as_deref(), Some("mgr-1"));
        assert!(responded.responded_at.is_some());
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let pool = connect_in_memory().await.unwrap();
        let storage = FeedbackStorage::new(pool);

        assert!(matches!(
            storage.get("fbk-missing").await,
            Err(StorageError::NotFound(_))
        ));
    }
}
