// ABOUTME: Job posting storage layer using SQLite
// ABOUTME: Publish/close transitions are guarded by the current status

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::types::{
    JobPosting, JobPostingCreateInput, JobPostingFilter, JobPostingStatus, JobPostingUpdateInput,
};
use crate::pagination::PaginationParams;
use crate::storage::{generate_id, StorageError};

pub struct JobPostingStorage {
    pool: SqlitePool,
}

impl JobPostingStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: JobPostingCreateInput) -> Result<JobPosting, StorageError> {
        let id = generate_id("job");
        let now = Utc::now();

        debug!("Creating job posting: {} ({})", id, input.title);

        sqlx::query(
            r#"
            INSERT INTO job_postings (id, organization_id, title, description, department,
                                      location, employment_type, salary_min, salary_max, currency,
                                      status, closes_at, created_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'draft', ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&input.organization_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.department)
        .bind(&input.location)
        .bind(input.employment_type.to_string())
        .bind(input.salary_min)
        .bind(input.salary_max)
        .bind(&input.currency)
        .bind(input.closes_at)
        .bind(&input.created_by)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(&id).await
    }

    pub async fn get(&self, id: &str) -> Result<JobPosting, StorageError> {
        let row = sqlx::query("SELECT * FROM job_postings WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StorageError::NotFound("Job posting".to_string()))?;

        row_to_posting(&row)
    }

    pub async fn list(
        &self,
        organization_id: &str,
        filter: &JobPostingFilter,
        pagination: &PaginationParams,
    ) -> Result<(Vec<JobPosting>, i64), StorageError> {
        let mut where_clause = String::from("WHERE organization_id = ?");
        if filter.status.is_some() {
            where_clause.push_str(" AND status = ?");
        }
        if filter.department.is_some() {
            where_clause.push_str(" AND department = ?");
        }

        let count_sql = format!("SELECT COUNT(*) FROM job_postings {}", where_clause);
        let mut count_query = sqlx::query_scalar(&count_sql).bind(organization_id);
        if let Some(status) = filter.status {
            count_query = count_query.bind(status.to_string());
        }
        if let Some(department) = &filter.department {
            count_query = count_query.bind(department);
        }
        let total: i64 = count_query.fetch_one(&self.pool).await?;

        let (limit, offset) = pagination.validate();
        let list_sql = format!(
            "SELECT * FROM job_postings {} ORDER BY created_at DESC LIMIT ? OFFSET ?",
            where_clause
        );
        let mut list_query = sqlx::query(&list_sql).bind(organization_id);
        if let Some(status) = filter.status {
            list_query = list_query.bind(status.to_string());
        }
        if let Some(department) = &filter.department {
            list_query = list_query.bind(department);
        }
        let rows = list_query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let postings = rows
            .iter()
            .map(row_to_posting)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((postings, total))
    }

    pub async fn update(
        &self,
        id: &str,
        input: JobPostingUpdateInput,
    ) -> Result<JobPosting, StorageError> {
        debug!("Updating job posting: {}", id);

        let mut query_parts = Vec::new();
        if input.title.is_some() {
            query_parts.push("title = ?");
        }
        if input.description.is_some() {
            query_parts.push("description = ?");
        }
        if input.department.is_some() {
            query_parts.push("department = ?");
        }
        if input.location.is_some() {
            query_parts.push("location = ?");
        }
        if input.employment_type.is_some() {
            query_parts.push("employment_type = ?");
        }
        if input.salary_min.is_some() {
            query_parts.push("salary_min = ?");
        }
        if input.salary_max.is_some() {
            query_parts.push("salary_max = ?");
        }
        if input.currency.is_some() {
            query_parts.push("currency = ?");
        }
        if input.closes_at.is_some() {
            query_parts.push("closes_at = ?");
        }

        if query_parts.is_empty() {
            return self.get(id).await;
        }
        query_parts.push("updated_at = ?");

        let query_str = format!(
            "UPDATE job_postings SET {} WHERE id = ?",
            query_parts.join(", ")
        );
        let mut query = sqlx::query(&query_str);

        if let Some(title) = input.title {
            query = query.bind(title);
        }
        if let Some(description) = input.description {
            query = query.bind(description);
        }
        if let Some(department) = input.department {
            query = query.bind(department);
        }
        if let Some(location) = input.location {
            query = query.bind(location);
        }
        if let Some(employment_type) = input.employment_type {
            query = query.bind(employment_type.to_string());
        }
        if let Some(salary_min) = input.salary_min {
            query = query.bind(salary_min);
        }
        if let Some(salary_max) = input.salary_max {
            query = query.bind(salary_max);
        }
        if let Some(currency) = input.currency {
            query = query.bind(currency);
        }
        if let Some(closes_at) = input.closes_at {
            query = query.bind(closes_at);
        }

        let result = query.bind(Utc::now()).bind(id).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound("Job posting".to_string()));
        }

        self.get(id).await
    }

    /// Publish a draft posting, stamping published_at
    pub async fn publish(&self, id: &str) -> Result<JobPosting, StorageError> {
        let posting = self.get(id).await?;

        if posting.status != JobPostingStatus::Draft {
            return Err(StorageError::InvalidInput(format!(
                "Only draft postings can be published (current status: {})",
                posting.status
            )));
        }

        debug!("Publishing job posting: {}", id);

        let now = Utc::now();
        sqlx::query(
            "UPDATE job_postings SET status = 'published', published_at = ?, updated_at = ? WHERE id = ?",
        )
        .bind(now)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.get(id).await
    }

    /// Close a published posting
    pub async fn close(&self, id: &str) -> Result<JobPosting, StorageError> {
        let posting = self.get(id).await?;

        if posting.status != JobPostingStatus::Published {
            return Err(StorageError::InvalidInput(format!(
                "Only published postings can be closed (current status: {})",
                posting.status
            )));
        }

        debug!("Closing job posting: {}", id);

        sqlx::query("UPDATE job_postings SET status = 'closed', updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), StorageError> {
        debug!("Deleting job posting: {}", id);

        let result = sqlx::query("DELETE FROM job_postings WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound("Job posting".to_string()));
        }

        Ok(())
    }
}

fn row_to_posting(row: &sqlx::sqlite::SqliteRow) -> Result<JobPosting, StorageError> {
    let status: String = row.try_get("status")?;
    let employment_type: String = row.try_get("employment_type")?;

    Ok(JobPosting {
        id: row.try_get("id")?,
        organization_id: row.try_get("organization_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        department: row.try_get("department")?,
        location: row.try_get("location")?,
        employment_type: employment_type.parse().map_err(StorageError::Database)?,
        salary_min: row.try_get("salary_min")?,
        salary_max: row.try_get("salary_max")?,
        currency: row.try_get("currency")?,
        status: status.parse().map_err(StorageError::Database)?,
        published_at: row.try_get("published_at")?,
        closes_at: row.try_get("closes_at")?,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::connect_in_memory;

    fn sample(org: &str) -> JobPostingCreateInput {
        JobPostingCreateInput {
            organization_id: org.to_string(),
            title: "Backend Engineer".to_string(),
            description: "Build the back office.".to_string(),
            department: Some("Engineering".to_string()),
            location: Some("Remote".to_string()),
            employment_type: Default::default(),
            salary_min: Some(70_000.0),
            salary_max: Some(95_000.0),
            currency: Some("EUR".to_string()),
            closes_at: None,
            created_by: None,
        }
    }

    #[tokio::test]
    async fn test_publish_then_close() {
        let pool = connect_in_memory().await.unwrap();
        let storage = JobPostingStorage::new(pool);

        let posting = storage.create(sample("org-1")).await.unwrap();
        assert_eq!(posting.status, JobPostingStatus::Draft);

        let published = storage.publish(&posting.id).await.unwrap();
        assert_eq!(published.status, JobPostingStatus::Published);
        assert!(published.published_at.is_some());

        // Publishing twice is invalid
        assert!(matches!(
            storage.publish(&posting.id).await,
            Err(StorageError::InvalidInput(_))
        ));

        let closed = storage.close(&posting.id).await.unwrap();
        assert_eq!(closed.status, JobPostingStatus::Closed);
    }

    #[tokio::test]
    async fn test_close_requires_published() {
        let pool = connect_in_memory().await.unwrap();
        let storage = JobPostingStorage::new(pool);

        let posting = storage.create(sample("org-1")).await.unwrap();
        assert!(matches!(
            storage.close(&posting.id).await,
            Err(StorageError::InvalidInput(_))
        ));
    }
}
