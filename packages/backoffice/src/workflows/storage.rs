// ABOUTME: Workflow rule and instance storage layer using SQLite
// ABOUTME: Conditions, actions and results are JSON text columns

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::types::{
    ActionResult, InstanceStatus, WorkflowInstance, WorkflowRule, WorkflowRuleCreateInput,
    WorkflowRuleUpdateInput,
};
use crate::pagination::PaginationParams;
use crate::storage::{generate_id, StorageError};

pub struct WorkflowStorage {
    pool: SqlitePool,
}

impl WorkflowStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_rule(
        &self,
        input: WorkflowRuleCreateInput,
    ) -> Result<WorkflowRule, StorageError> {
        let id = generate_id("wfr");
        let now = Utc::now();

        debug!("Creating workflow rule: {} ({})", id, input.name);

        let conditions = serde_json::to_string(&input.conditions)?;
        let actions = serde_json::to_string(&input.actions)?;

        sqlx::query(
            r#"
            INSERT INTO workflow_rules (id, organization_id, name, event, conditions, actions,
                                        enabled, escalation_hours, created_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&input.organization_id)
        .bind(&input.name)
        .bind(&input.event)
        .bind(conditions)
        .bind(actions)
        .bind(input.enabled)
        .bind(input.escalation_hours)
        .bind(&input.created_by)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_rule(&id).await
    }

    pub async fn get_rule(&self, id: &str) -> Result<WorkflowRule, StorageError> {
        let row = sqlx::query("SELECT * FROM workflow_rules WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StorageError::NotFound("Workflow rule".to_string()))?;

        row_to_rule(&row)
    }

    pub async fn list_rules(
        &self,
        organization_id: &str,
        pagination: &PaginationParams,
    ) -> Result<(Vec<WorkflowRule>, i64), StorageError> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM workflow_rules WHERE organization_id = ?")
                .bind(organization_id)
                .fetch_one(&self.pool)
                .await?;

        let (limit, offset) = pagination.validate();
        let rows = sqlx::query(
            "SELECT * FROM workflow_rules WHERE organization_id = ? ORDER BY created_at LIMIT ? OFFSET ?",
        )
        .bind(organization_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let rules = rows.iter().map(row_to_rule).collect::<Result<Vec<_>, _>>()?;

        Ok((rules, total))
    }

    /// Enabled rules registered for an event, in creation order
    pub async fn rules_for_event(
        &self,
        organization_id: &str,
        event: &str,
    ) -> Result<Vec<WorkflowRule>, StorageError> {
        let rows = sqlx::query(
            "SELECT * FROM workflow_rules WHERE organization_id = ? AND event = ? AND enabled = 1 ORDER BY created_at",
        )
        .bind(organization_id)
        .bind(event)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_rule).collect()
    }

    pub async fn update_rule(
        &self,
        id: &str,
        input: WorkflowRuleUpdateInput,
    ) -> Result<WorkflowRule, StorageError> {
        debug!("Updating workflow rule: {}", id);

        let conditions_json = match &input.conditions {
            Some(conditions) => Some(serde_json::to_string(conditions)?),
            None => None,
        };
        let actions_json = match &input.actions {
            Some(actions) => Some(serde_json::to_string(actions)?),
            None => None,
        };

        let mut query_parts = Vec::new();
        if input.name.is_some() {
            query_parts.push("name = ?");
        }
        if input.event.is_some() {
            query_parts.push("event = ?");
        }
        if conditions_json.is_some() {
            query_parts.push("conditions = ?");
        }
        if actions_json.is_some() {
            query_parts.push("actions = ?");
        }
        if input.enabled.is_some() {
            query_parts.push("enabled = ?");
        }
        if input.escalation_hours.is_some() {
            query_parts.push("escalation_hours = ?");
        }

        if query_parts.is_empty() {
            return self.get_rule(id).await;
        }
        query_parts.push("updated_at = ?");

        let query_str = format!(
            "UPDATE workflow_rules SET {} WHERE id = ?",
            query_parts.join(", ")
        );
        let mut query = sqlx::query(&query_str);

        if let Some(name) = input.name {
            query = query.bind(name);
        }
        if let Some(event) = input.event {
            query = query.bind(event);
        }
        if let Some(conditions) = conditions_json {
            query = query.bind(conditions);
        }
        if let Some(actions) = actions_json {
            query = query.bind(actions);
        }
        if let Some(enabled) = input.enabled {
            query = query.bind(enabled);
        }
        if let Some(escalation_hours) = input.escalation_hours {
            query = query.bind(escalation_hours);
        }

        let result = query.bind(Utc::now()).bind(id).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound("Workflow rule".to_string()));
        }

        self.get_rule(id).await
    }

    pub async fn delete_rule(&self, id: &str) -> Result<(), StorageError> {
        debug!("Deleting workflow rule: {}", id);

        let result = sqlx::query("DELETE FROM workflow_rules WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound("Workflow rule".to_string()));
        }

        Ok(())
    }

    /// Persist the execution record of a matched rule
    #[allow(clippy::too_many_arguments)]
    pub async fn record_instance(
        &self,
        rule_id: &str,
        organization_id: &str,
        event: &str,
        payload: &serde_json::Value,
        results: &[ActionResult],
        status: InstanceStatus,
        escalate_at: Option<DateTime<Utc>>,
        triggered_by: Option<&str>,
    ) -> Result<WorkflowInstance, StorageError> {
        let id = generate_id("wfi");
        let now = Utc::now();

        debug!("Recording workflow instance {} for rule {}", id, rule_id);

        sqlx::query(
            r#"
            INSERT INTO workflow_instances (id, rule_id, organization_id, event, payload,
                                            action_results, status, escalate_at, triggered_by,
                                            created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(rule_id)
        .bind(organization_id)
        .bind(event)
        .bind(serde_json::to_string(payload)?)
        .bind(serde_json::to_string(results)?)
        .bind(status.to_string())
        .bind(escalate_at)
        .bind(triggered_by)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(WorkflowInstance {
            id,
            rule_id: rule_id.to_string(),
            organization_id: organization_id.to_string(),
            event: event.to_string(),
            payload: payload.clone(),
            action_results: results.to_vec(),
            status,
            escalate_at,
            triggered_by: triggered_by.map(String::from),
            created_at: now,
        })
    }

    pub async fn list_instances(
        &self,
        organization_id: &str,
        rule_id: Option<&str>,
        status: Option<InstanceStatus>,
        pagination: &PaginationParams,
    ) -> Result<(Vec<WorkflowInstance>, i64), StorageError> {
        let mut where_clause = String::from("WHERE organization_id = ?");
        if rule_id.is_some() {
            where_clause.push_str(" AND rule_id = ?");
        }
        if status.is_some() {
            where_clause.push_str(" AND status = ?");
        }

        let count_sql = format!("SELECT COUNT(*) FROM workflow_instances {}", where_clause);
        let mut count_query = sqlx::query_scalar(&count_sql).bind(organization_id);
        if let Some(rule_id) = rule_id {
            count_query = count_query.bind(rule_id);
        }
        if let Some(status) = status {
            count_query = count_query.bind(status.to_string());
        }
        let total: i64 = count_query.fetch_one(&self.pool).await?;

        let (limit, offset) = pagination.validate();
        let list_sql = format!(
            "SELECT * FROM workflow_instances {} ORDER BY created_at DESC LIMIT ? OFFSET ?",
            where_clause
        );
        let mut list_query = sqlx::query(&list_sql).bind(organization_id);
        if let Some(rule_id) = rule_id {
            list_query = list_query.bind(rule_id);
        }
        if let Some(status) = status {
            list_query = list_query.bind(status.to_string());
        }
        let rows = list_query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let instances = rows
            .iter()
            .map(row_to_instance)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((instances, total))
    }
}

fn row_to_rule(row: &sqlx::sqlite::SqliteRow) -> Result<WorkflowRule, StorageError> {
    let conditions: String = row.try_get("conditions")?;
    let actions: String = row.try_get("actions")?;

    Ok(WorkflowRule {
        id: row.try_get("id")?,
        organization_id: row.try_get("organization_id")?,
        name: row.try_get("name")?,
        event: row.try_get("event")?,
        conditions: serde_json::from_str(&conditions)?,
        actions: serde_json::from_str(&actions)?,
        enabled: row.try_get("enabled")?,
        escalation_hours: row.try_get("escalation_hours")?,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_instance(row: &sqlx::sqlite::SqliteRow) -> Result<WorkflowInstance, StorageError> {
    let payload: String = row.try_get("payload")?;
    let results: String = row.try_get("action_results")?;
    let status: String = row.try_get("status")?;

    Ok(WorkflowInstance {
        id: row.try_get("id")?,
        rule_id: row.try_get("rule_id")?,
        organization_id: row.try_get("organization_id")?,
        event: row.try_get("event")?,
        payload: serde_json::from_str(&payload)?,
        action_results: serde_json::from_str(&results)?,
        status: status.parse().map_err(StorageError::Database)?,
        escalate_at: row.try_get("escalate_at")?,
        triggered_by: row.try_get("triggered_by")?,
        created_at: row.try_get("created_at")?,
    })
}
