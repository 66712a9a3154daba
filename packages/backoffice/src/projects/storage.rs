// ABOUTME: Project storage layer using SQLite
// ABOUTME: CRUD with name search plus member assignment

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::types::{
    Project, ProjectCreateInput, ProjectFilter, ProjectMember, ProjectUpdateInput,
};
use crate::pagination::PaginationParams;
use crate::storage::{generate_id, StorageError};

pub struct ProjectStorage {
    pool: SqlitePool,
}

impl ProjectStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: ProjectCreateInput) -> Result<Project, StorageError> {
        let id = generate_id("prj");
        let now = Utc::now();

        debug!("Creating project: {} ({})", id, input.name);

        sqlx::query(
            r#"
            INSERT INTO projects (id, organization_id, name, description, status, priority,
                                  start_date, end_date, budget, currency, created_by,
                                  created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&input.organization_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.status.unwrap_or_default().to_string())
        .bind(input.priority.unwrap_or_default().to_string())
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(input.budget)
        .bind(&input.currency)
        .bind(&input.created_by)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(&id).await
    }

    pub async fn get(&self, id: &str) -> Result<Project, StorageError> {
        let row = sqlx::query("SELECT * FROM projects WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StorageError::NotFound("Project".to_string()))?;

        row_to_project(&row)
    }

    pub async fn list(
        &self,
        organization_id: &str,
        filter: &ProjectFilter,
        pagination: &PaginationParams,
    ) -> Result<(Vec<Project>, i64), StorageError> {
        let mut where_clause = String::from("WHERE organization_id = ?");
        if filter.status.is_some() {
            where_clause.push_str(" AND status = ?");
        }
        if filter.search.is_some() {
            where_clause.push_str(" AND name LIKE ?");
        }

        let count_sql = format!("SELECT COUNT(*) FROM projects {}", where_clause);
        let mut count_query = sqlx::query_scalar(&count_sql).bind(organization_id);
        if let Some(status) = filter.status {
            count_query = count_query.bind(status.to_string());
        }
        if let Some(search) = &filter.search {
            count_query = count_query.bind(format!("%{}%", search));
        }
        let total: i64 = count_query.fetch_one(&self.pool).await?;

        let (limit, offset) = pagination.validate();
        let list_sql = format!(
            "SELECT * FROM projects {} ORDER BY created_at DESC LIMIT ? OFFSET ?",
            where_clause
        );
        let mut list_query = sqlx::query(&list_sql).bind(organization_id);
        if let Some(status) = filter.status {
            list_query = list_query.bind(status.to_string());
        }
        if let Some(search) = &filter.search {
            list_query = list_query.bind(format!("%{}%", search));
        }
        let rows = list_query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let projects = rows
            .iter()
            .map(row_to_project)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((projects, total))
    }

    pub async fn update(
        &self,
        id: &str,
        input: ProjectUpdateInput,
    ) -> Result<Project, StorageError> {
        debug!("Updating project: {}", id);

        let mut query_parts = Vec::new();
        if input.name.is_some() {
            query_parts.push("name = ?");
        }
        if input.description.is_some() {
            query_parts.push("description = ?");
        }
        if input.status.is_some() {
            query_parts.push("status = ?");
        }
        if input.priority.is_some() {
            query_parts.push("priority = ?");
        }
        if input.start_date.is_some() {
            query_parts.push("start_date = ?");
        }
        if input.end_date.is_some() {
            query_parts.push("end_date = ?");
        }
        if input.budget.is_some() {
            query_parts.push("budget = ?");
        }
        if input.currency.is_some() {
            query_parts.push("currency = ?");
        }
        if input.updated_by.is_some() {
            query_parts.push("updated_by = ?");
        }

        if query_parts.is_empty() {
            return self.get(id).await;
        }
        query_parts.push("updated_at = ?");

        let query_str = format!("UPDATE projects SET {} WHERE id = ?", query_parts.join(", "));
        let mut query = sqlx::query(&query_str);

        if let Some(name) = input.name {
            query = query.bind(name);
        }
        if let Some(description) = input.description {
            query = query.bind(description);
        }
        if let Some(status) = input.status {
            query = query.bind(status.to_string());
        }
        if let Some(priority) = input.priority {
            query = query.bind(priority.to_string());
        }
        if let Some(start_date) = input.start_date {
            query = query.bind(start_date);
        }
        if let Some(end_date) = input.end_date {
            query = query.bind(end_date);
        }
        if let Some(budget) = input.budget {
            query = query.bind(budget);
        }
        if let Some(currency) = input.currency {
            query = query.bind(currency);
        }
        if let Some(updated_by) = input.updated_by {
            query = query.bind(updated_by);
        }

        let result = query.bind(Utc::now()).bind(id).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound("Project".to_string()));
        }

        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), StorageError> {
        debug!("Deleting project: {}", id);

        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound("Project".to_string()));
        }

        Ok(())
    }

    /// Assign an employee to a project
    pub async fn add_member(
        &self,
        project_id: &str,
        employee_id: &str,
        role: &str,
    ) -> Result<Vec<ProjectMember>, StorageError> {
        debug!("Adding member {} to project {}", employee_id, project_id);

        self.get(project_id).await?;

        let employee_exists: Option<String> =
            sqlx::query_scalar("SELECT id FROM employees WHERE id = ?")
                .bind(employee_id)
                .fetch_optional(&self.pool)
                .await?;
        if employee_exists.is_none() {
            return Err(StorageError::NotFound("Employee".to_string()));
        }

        let existing: Option<String> = sqlx::query_scalar(
            "SELECT role FROM project_members WHERE project_id = ? AND employee_id = ?",
        )
        .bind(project_id)
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await?;

        if existing.is_some() {
            return Err(StorageError::Conflict(format!(
                "Employee {} is already a member of this project",
                employee_id
            )));
        }

        sqlx::query(
            "INSERT INTO project_members (project_id, employee_id, role, added_at) VALUES (?, ?, ?, ?)",
        )
        .bind(project_id)
        .bind(employee_id)
        .bind(role)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.list_members(project_id).await
    }

    pub async fn remove_member(
        &self,
        project_id: &str,
        employee_id: &str,
    ) -> Result<(), StorageError> {
        debug!("Removing member {} from project {}", employee_id, project_id);

        let result = sqlx::query(
            "DELETE FROM project_members WHERE project_id = ? AND employee_id = ?",
        )
        .bind(project_id)
        .bind(employee_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound("Project member".to_string()));
        }

        Ok(())
    }

    /// List members with employee name and department populated
    pub async fn list_members(&self, project_id: &str) -> Result<Vec<ProjectMember>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT m.employee_id, m.role, m.added_at,
                   e.first_name, e.last_name, e.department
            FROM project_members m
            JOIN employees e ON e.id = m.employee_id
            WHERE m.project_id = ?
            ORDER BY m.added_at
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let first_name: String = row.try_get("first_name")?;
                let last_name: String = row.try_get("last_name")?;
                Ok(ProjectMember {
                    employee_id: row.try_get("employee_id")?,
                    name: format!("{} {}", first_name, last_name),
                    department: row.try_get("department")?,
                    role: row.try_get("role")?,
                    added_at: row.try_get("added_at")?,
                })
            })
            .collect()
    }
}

fn row_to_project(row: &sqlx::sqlite::SqliteRow) -> Result<Project, StorageError> {
    let status: String = row.try_get("status")?;
    let priority: String = row.try_get("priority")?;

    Ok(Project {
        id: row.try_get("id")?,
        organization_id: row.try_get("organization_id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        status: status.parse().map_err(StorageError::Database)?,
        priority: priority.parse().map_err(StorageError::Database)?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        budget: row.try_get("budget")?,
        currency: row.try_get("currency")?,
        created_by: row.try_get("created_by")?,
        updated_by: row.try_get("updated_by")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::employees::{EmployeeCreateInput, EmployeeStorage};
    use crate::projects::types::ProjectStatus;
    use crate::storage::connect_in_memory;

    fn sample(org: &str, name: &str) -> ProjectCreateInput {
        ProjectCreateInput {
            organization_id: org.to_string(),
            name: name.to_string(),
            description: None,
            status: None,
            priority: None,
            start_date: None,
            end_date: None,
            budget: Some(12_000.0),
            currency: Some("USD".to_string()),
            created_by: Some("user-1".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_defaults_to_planning() {
        let pool = connect_in_memory().await.unwrap();
        let storage = ProjectStorage::new(pool);

        let project = storage.create(sample("org-1", "Onboarding revamp")).await.unwrap();
        assert_eq!(project.status, ProjectStatus::Planning);
    }

    #[tokio::test]
    async fn test_search_matches_name() {
        let pool = connect_in_memory().await.unwrap();
        let storage = ProjectStorage::new(pool);

        storage.create(sample("org-1", "Website redesign")).await.unwrap();
        storage.create(sample("org-1", "Payroll migration")).await.unwrap();

        let filter = ProjectFilter {
            status: None,
            search: Some("redesign".to_string()),
        };
        let (projects, total) = storage
            .list("org-1", &filter, &PaginationParams::default())
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(projects[0].name, "Website redesign");
    }

    #[tokio::test]
    async fn test_member_assignment_roundtrip() {
        let pool = connect_in_memory().await.unwrap();
        let projects = ProjectStorage::new(pool.clone());
        let employees = EmployeeStorage::new(pool);

        let project = projects.create(sample("org-1", "Intranet")).await.unwrap();
        let employee = employees
            .create(EmployeeCreateInput {
                organization_id: "org-1".to_string(),
                user_id: None,
                first_name: "Jo".to_string(),
                last_name: "Lindt".to_string(),
                email: "jo@example.com".to_string(),
                department: Some("IT".to_string()),
                position: None,
                salary: None,
                currency: None,
                hire_date: None,
                created_by: None,
            })
            .await
            .unwrap();

        let members = projects
            .add_member(&project.id, &employee.id, "lead")
            .await
            .unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].name, "Jo Lindt");

        // Adding the same member again is a conflict
        assert!(matches!(
            projects.add_member(&project.id, &employee.id, "member").await,
            Err(StorageError::Conflict(_))
        ));

        projects.remove_member(&project.id, &employee.id).await.unwrap();
        assert!(projects.list_members(&project.id).await.unwrap().is_empty());
    }
}
