// ABOUTME: Employee storage layer using SQLite
// ABOUTME: CRUD with per-organization unique emails and dynamic updates

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::types::{Employee, EmployeeCreateInput, EmployeeFilter, EmployeeUpdateInput};
use crate::pagination::PaginationParams;
use crate::storage::{generate_id, StorageError};

pub struct EmployeeStorage {
    pool: SqlitePool,
}

impl EmployeeStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: EmployeeCreateInput) -> Result<Employee, StorageError> {
        let id = generate_id("emp");
        let now = Utc::now();

        debug!(
            "Creating employee: {} ({} {})",
            id, input.first_name, input.last_name
        );

        let existing: Option<String> = sqlx::query_scalar(
            "SELECT id FROM employees WHERE organization_id = ? AND email = ?",
        )
        .bind(&input.organization_id)
        .bind(&input.email)
        .fetch_optional(&self.pool)
        .await?;

        if existing.is_some() {
            return Err(StorageError::Conflict(format!(
                "An employee with email {} already exists in this organization",
                input.email
            )));
        }

        sqlx::query(
            r#"
            INSERT INTO employees (id, organization_id, user_id, first_name, last_name, email,
                                   department, position, salary, currency, hire_date, status,
                                   created_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'active', ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&input.organization_id)
        .bind(&input.user_id)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.email)
        .bind(&input.department)
        .bind(&input.position)
        .bind(input.salary)
        .bind(&input.currency)
        .bind(input.hire_date)
        .bind(&input.created_by)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(&id).await
    }

    pub async fn get(&self, id: &str) -> Result<Employee, StorageError> {
        let row = sqlx::query("SELECT * FROM employees WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StorageError::NotFound("Employee".to_string()))?;

        row_to_employee(&row)
    }

    pub async fn list(
        &self,
        organization_id: &str,
        filter: &EmployeeFilter,
        pagination: &PaginationParams,
    ) -> Result<(Vec<Employee>, i64), StorageError> {
        let mut where_clause = String::from("WHERE organization_id = ?");
        if filter.department.is_some() {
            where_clause.push_str(" AND department = ?");
        }
        if filter.status.is_some() {
            where_clause.push_str(" AND status = ?");
        }

        let count_sql = format!("SELECT COUNT(*) FROM employees {}", where_clause);
        let mut count_query = sqlx::query_scalar(&count_sql).bind(organization_id);
        if let Some(department) = &filter.department {
            count_query = count_query.bind(department);
        }
        if let Some(status) = filter.status {
            count_query = count_query.bind(status.to_string());
        }
        let total: i64 = count_query.fetch_one(&self.pool).await?;

        let (limit, offset) = pagination.validate();
        let list_sql = format!(
            "SELECT * FROM employees {} ORDER BY last_name, first_name LIMIT ? OFFSET ?",
            where_clause
        );
        let mut list_query = sqlx::query(&list_sql).bind(organization_id);
        if let Some(department) = &filter.department {
            list_query = list_query.bind(department);
        }
        if let Some(status) = filter.status {
            list_query = list_query.bind(status.to_string());
        }
        let rows = list_query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let employees = rows
            .iter()
            .map(row_to_employee)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((employees, total))
    }

    pub async fn update(
        &self,
        id: &str,
        input: EmployeeUpdateInput,
    ) -> Result<Employee, StorageError> {
        debug!("Updating employee: {}", id);

        let mut query_parts = Vec::new();
        if input.first_name.is_some() {
            query_parts.push("first_name = ?");
        }
        if input.last_name.is_some() {
            query_parts.push("last_name = ?");
        }
        if input.email.is_some() {
            query_parts.push("email = ?");
        }
        if input.department.is_some() {
            query_parts.push("department = ?");
        }
        if input.position.is_some() {
            query_parts.push("position = ?");
        }
        if input.salary.is_some() {
            query_parts.push("salary = ?");
        }
        if input.currency.is_some() {
            query_parts.push("currency = ?");
        }
        if input.hire_date.is_some() {
            query_parts.push("hire_date = ?");
        }
        if input.status.is_some() {
            query_parts.push("status = ?");
        }
        if input.updated_by.is_some() {
            query_parts.push("updated_by = ?");
        }

        if query_parts.is_empty() {
            return self.get(id).await;
        }
        query_parts.push("updated_at = ?");

        let query_str = format!(
            "UPDATE employees SET {} WHERE id = ?",
            query_parts.join(", ")
        );
        let mut query = sqlx::query(&query_str);

        if let Some(first_name) = input.first_name {
            query = query.bind(first_name);
        }
        if let Some(last_name) = input.last_name {
            query = query.bind(last_name);
        }
        if let Some(email) = input.email {
            query = query.bind(email);
        }
        if let Some(department) = input.department {
            query = query.bind(department);
        }
        if let Some(position) = input.position {
            query = query.bind(position);
        }
        if let Some(salary) = input.salary {
            query = query.bind(salary);
        }
        if let Some(currency) = input.currency {
            query = query.bind(currency);
        }
        if let Some(hire_date) = input.hire_date {
            query = query.bind(hire_date);
        }
        if let Some(status) = input.status {
            query = query.bind(status.to_string());
        }
        if let Some(updated_by) = input.updated_by {
            query = query.bind(updated_by);
        }

        let result = query.bind(Utc::now()).bind(id).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound("Employee".to_string()));
        }

        self.get(id).await
    }

    /// Mark an employee terminated, stamping terminated_at
    pub async fn terminate(&self, id: &str, updated_by: Option<&str>) -> Result<Employee, StorageError> {
        debug!("Terminating employee: {}", id);

        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE employees SET status = 'terminated', terminated_at = ?, updated_by = ?, updated_at = ? WHERE id = ?",
        )
        .bind(now)
        .bind(updated_by)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound("Employee".to_string()));
        }

        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), StorageError> {
        debug!("Deleting employee: {}", id);

        let result = sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound("Employee".to_string()));
        }

        Ok(())
    }
}

fn row_to_employee(row: &sqlx::sqlite::SqliteRow) -> Result<Employee, StorageError> {
    let status: String = row.try_get("status")?;

    Ok(Employee {
        id: row.try_get("id")?,
        organization_id: row.try_get("organization_id")?,
        user_id: row.try_get("user_id")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get("email")?,
        department: row.try_get("department")?,
        position: row.try_get("position")?,
        salary: row.try_get("salary")?,
        currency: row.try_get("currency")?,
        hire_date: row.try_get("hire_date")?,
        status: status.parse().map_err(StorageError::Database)?,
        terminated_at: row.try_get("terminated_at")?,
        created_by: row.try_get("created_by")?,
        updated_by: row.try_get("updated_by")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::employees::types::EmployeeStatus;
    use crate::storage::connect_in_memory;

    fn sample(org: &str, email: &str) -> EmployeeCreateInput {
        EmployeeCreateInput {
            organization_id: org.to_string(),
            user_id: None,
            first_name: "Ada".to_string(),
            last_name: "Kovac".to_string(),
            email: email.to_string(),
            department: Some("Engineering".to_string()),
            position: Some("Developer".to_string()),
            salary: Some(90_000.0),
            currency: Some("EUR".to_string()),
            hire_date: None,
            created_by: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_in_org_is_conflict() {
        let pool = connect_in_memory().await.unwrap();
        let storage = EmployeeStorage::new(pool);

        storage.create(sample("org-1", "ada@example.com")).await.unwrap();
        let err = storage
            .create(sample("org-1", "ada@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));

        // Same email in a different organization is fine
        storage.create(sample("org-2", "ada@example.com")).await.unwrap();
    }

    #[tokio::test]
    async fn test_terminate_stamps_timestamp() {
        let pool = connect_in_memory().await.unwrap();
        let storage = EmployeeStorage::new(pool);

        let employee = storage.create(sample("org-1", "a@example.com")).await.unwrap();
        let terminated = storage.terminate(&employee.id, Some("hr-1")).await.unwrap();

        assert_eq!(terminated.status, EmployeeStatus::Terminated);
        assert!(terminated.terminated_at.is_some());
        assert_eq!(terminated.updated_by.as_deref(), Some("hr-1"));
    }

    #[tokio::test]
    async fn test_list_filters_by_department() {
        let pool = connect_in_memory().await.unwrap();
        let storage = EmployeeStorage::new(pool);

        storage.create(sample("org-1", "a@example.com")).await.unwrap();
        let mut other = sample("org-1", "b@example.com");
        other.department = Some("Sales".to_string());
        storage.create(other).await.unwrap();

        let filter = EmployeeFilter {
            department: Some("Sales".to_string()),
            status: None,
        };
        let (employees, total) = storage
            .list("org-1", &filter, &PaginationParams::default())
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(employees[0].department.as_deref(), Some("Sales"));
    }
}
