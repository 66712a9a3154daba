// ABOUTME: Rule matching and sequential action execution
// ABOUTME: Conditions: "any" | {min,max} numeric range | exact literal match

use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use super::storage::WorkflowStorage;
use super::types::{
    ActionResult, ConditionValue, InstanceStatus, TriggerInput, WorkflowAction, WorkflowInstance,
    WorkflowRule,
};
use crate::audit::AuditStorage;
use crate::notifications::{NotificationKind, NotificationStorage};
use crate::storage::StorageError;

pub struct WorkflowEngine {
    storage: Arc<WorkflowStorage>,
    notifications: Arc<NotificationStorage>,
    audit: Arc<AuditStorage>,
}

impl WorkflowEngine {
    pub fn new(
        storage: Arc<WorkflowStorage>,
        notifications: Arc<NotificationStorage>,
        audit: Arc<AuditStorage>,
    ) -> Self {
        Self {
            storage,
            notifications,
            audit,
        }
    }

    /// Match an incoming event against the organization's enabled rules and
    /// run each matching rule's actions sequentially. One instance is
    /// persisted per matched rule.
    pub async fn trigger(&self, input: TriggerInput) -> Result<Vec<WorkflowInstance>, StorageError> {
        let rules = self
            .storage
            .rules_for_event(&input.organization_id, &input.event)
            .await?;

        info!(
            "Workflow trigger '{}' for {}: {} candidate rule(s)",
            input.event,
            input.organization_id,
            rules.len()
        );

        let payload = serde_json::json!({
            "data": input.data,
            "context": input.context,
        });

        let mut instances = Vec::new();
        for rule in rules {
            if !rule_matches(&rule, &input.data, &input.context) {
                continue;
            }

            info!("Rule {} matched event '{}'", rule.id, input.event);

            let mut results = Vec::new();
            let mut status = InstanceStatus::Completed;
            let mut escalate_at = None;

            for action in &rule.actions {
                match self.execute_action(&rule, action, &input).await {
                    Ok(result) => {
                        if matches!(action, WorkflowAction::RequireApproval { .. }) {
                            if let Some(hours) = rule.escalation_hours {
                                escalate_at = Some(
                                    Utc::now()
                                        + Duration::seconds((hours * 3600.0).round() as i64),
                                );
                            }
                        }
                        results.push(result);
                    }
                    Err(e) => {
                        warn!("Action {} of rule {} failed: {}", action.kind(), rule.id, e);
                        results.push(ActionResult {
                            action: action.kind().to_string(),
                            outcome: "failed".to_string(),
                            detail: Some(e.to_string()),
                        });
                        status = InstanceStatus::Failed;
                    }
                }
            }

            let instance = self
                .storage
                .record_instance(
                    &rule.id,
                    &input.organization_id,
                    &input.event,
                    &payload,
                    &results,
                    status,
                    escalate_at,
                    input.triggered_by.as_deref(),
                )
                .await?;
            instances.push(instance);
        }

        Ok(instances)
    }

    async fn execute_action(
        &self,
        rule: &WorkflowRule,
        action: &WorkflowAction,
        input: &TriggerInput,
    ) -> Result<ActionResult, StorageError> {
        match action {
            WorkflowAction::AutoApprove => Ok(ActionResult {
                action: "auto-approve".to_string(),
                outcome: "approved".to_string(),
                detail: None,
            }),
            WorkflowAction::RequireApproval { approver } => {
                self.notifications
                    .dispatch(
                        &input.organization_id,
                        approver,
                        NotificationKind::Approval,
                        &format!("Approval required: {}", rule.name),
                        &format!("Event '{}' requires your approval.", input.event),
                    )
                    .await?;
                Ok(ActionResult {
                    action: "require-approval".to_string(),
                    outcome: "approval-requested".to_string(),
                    detail: Some(format!("Approver: {}", approver)),
                })
            }
            WorkflowAction::SendReminder { recipient, message } => {
                let body = message
                    .clone()
                    .unwrap_or_else(|| format!("Reminder from rule '{}'.", rule.name));
                self.notifications
                    .dispatch(
                        &input.organization_id,
                        recipient,
                        NotificationKind::Reminder,
                        &format!("Reminder: {}", rule.name),
                        &body,
                    )
                    .await?;
                Ok(ActionResult {
                    action: "send-reminder".to_string(),
                    outcome: "reminder-sent".to_string(),
                    detail: Some(format!("Recipient: {}", recipient)),
                })
            }
            WorkflowAction::Notify { recipients, message } => {
                let body = message
                    .clone()
                    .unwrap_or_else(|| format!("Event '{}' occurred.", input.event));
                for recipient in recipients {
                    self.notifications
                        .dispatch(
                            &input.organization_id,
                            recipient,
                            NotificationKind::Workflow,
                            &rule.name,
                            &body,
                        )
                        .await?;
                }
                Ok(ActionResult {
                    action: "notify".to_string(),
                    outcome: "notified".to_string(),
                    detail: Some(format!("{} recipient(s)", recipients.len())),
                })
            }
            WorkflowAction::UpdateCompliance { requirement } => {
                self.audit
                    .record(
                        &input.organization_id,
                        input.triggered_by.as_deref(),
                        "compliance-updated",
                        "compliance",
                        requirement,
                        Some(serde_json::json!({ "event": input.event, "rule": rule.id })),
                    )
                    .await?;
                Ok(ActionResult {
                    action: "update-compliance".to_string(),
                    outcome: "recorded".to_string(),
                    detail: Some(format!("Requirement: {}", requirement)),
                })
            }
        }
    }
}

/// A rule matches when every condition key matches the event's data/context.
/// `"any"` always matches; a missing key fails the condition otherwise.
fn rule_matches(
    rule: &WorkflowRule,
    data: &HashMap<String, serde_json::Value>,
    context: &HashMap<String, serde_json::Value>,
) -> bool {
    rule.conditions.iter().all(|(key, condition)| {
        if condition.is_any() {
            return true;
        }

        let value = data.get(key).or_else(|| context.get(key));
        let Some(value) = value else {
            return false;
        };

        match condition {
            ConditionValue::Range { min, max } => {
                let Some(number) = value.as_f64() else {
                    return false;
                };
                min.map_or(true, |m| number >= m) && max.map_or(true, |m| number <= m)
            }
            ConditionValue::Literal(expected) => value == expected,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::PaginationParams;
    use crate::storage::connect_in_memory;
    use crate::workflows::types::WorkflowRuleCreateInput;
    use serde_json::json;

    fn engine_parts(
        pool: sqlx::SqlitePool,
    ) -> (Arc<WorkflowStorage>, Arc<NotificationStorage>, WorkflowEngine) {
        let storage = Arc::new(WorkflowStorage::new(pool.clone()));
        let notifications = Arc::new(NotificationStorage::new(pool.clone()));
        let audit = Arc::new(AuditStorage::new(pool));
        let engine = WorkflowEngine::new(storage.clone(), notifications.clone(), audit);
        (storage, notifications, engine)
    }

    fn rule(conditions: HashMap<String, ConditionValue>) -> WorkflowRule {
        WorkflowRule {
            id: "wfr-test".to_string(),
            organization_id: "org-1".to_string(),
            name: "Test rule".to_string(),
            event: "expense.submitted".to_string(),
            conditions,
            actions: vec![],
            enabled: true,
            escalation_hours: None,
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_any_condition_matches_without_value() {
        let conditions = HashMap::from([(
            "department".to_string(),
            ConditionValue::Literal(json!("any")),
        )]);
        assert!(rule_matches(&rule(conditions), &HashMap::new(), &HashMap::new()));
    }

    #[test]
    fn test_range_condition() {
        let conditions = HashMap::from([(
            "amount".to_string(),
            ConditionValue::Range {
                min: Some(100.0),
                max: Some(500.0),
            },
        )]);
        let r = rule(conditions);

        let data = HashMap::from([("amount".to_string(), json!(250))]);
        assert!(rule_matches(&r, &data, &HashMap::new()));

        let data = HashMap::from([("amount".to_string(), json!(750))]);
        assert!(!rule_matches(&r, &data, &HashMap::new()));

        // Non-numeric value never satisfies a range
        let data = HashMap::from([("amount".to_string(), json!("lots"))]);
        assert!(!rule_matches(&r, &data, &HashMap::new()));
    }

    #[test]
    fn test_exact_match_falls_back_to_context() {
        let conditions = HashMap::from([(
            "department".to_string(),
            ConditionValue::Literal(json!("Engineering")),
        )]);
        let r = rule(conditions);

        let context = HashMap::from([("department".to_string(), json!("Engineering"))]);
        assert!(rule_matches(&r, &HashMap::new(), &context));

        let context = HashMap::from([("department".to_string(), json!("Sales"))]);
        assert!(!rule_matches(&r, &HashMap::new(), &context));
    }

    #[test]
    fn test_missing_key_fails_non_any_condition() {
        let conditions = HashMap::from([(
            "amount".to_string(),
            ConditionValue::Range {
                min: Some(1.0),
                max: None,
            },
        )]);
        assert!(!rule_matches(&rule(conditions), &HashMap::new(), &HashMap::new()));
    }

    #[tokio::test]
    async fn test_trigger_persists_one_result_per_action() {
        let pool = connect_in_memory().await.unwrap();
        let (storage, notifications, engine) = engine_parts(pool);

        storage
            .create_rule(WorkflowRuleCreateInput {
                organization_id: "org-1".to_string(),
                name: "Large expense approval".to_string(),
                event: "expense.submitted".to_string(),
                conditions: HashMap::from([(
                    "amount".to_string(),
                    ConditionValue::Range {
                        min: Some(1000.0),
                        max: None,
                    },
                )]),
                actions: vec![
                    WorkflowAction::RequireApproval {
                        approver: "finance-lead".to_string(),
                    },
                    WorkflowAction::Notify {
                        recipients: vec!["submitter".to_string()],
                        message: None,
                    },
                ],
                enabled: true,
                escalation_hours: Some(24.0),
                created_by: None,
            })
            .await
            .unwrap();

        let instances = engine
            .trigger(TriggerInput {
                organization_id: "org-1".to_string(),
                event: "expense.submitted".to_string(),
                data: HashMap::from([("amount".to_string(), json!(2500))]),
                context: HashMap::new(),
                triggered_by: Some("user-1".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(instances.len(), 1);
        let instance = &instances[0];
        assert_eq!(instance.action_results.len(), 2);
        assert_eq!(instance.status, InstanceStatus::Completed);
        assert!(instance.escalate_at.is_some());

        // The approval notification went out
        let (approver_inbox, _) = notifications
            .list_for_recipient("org-1", "finance-lead", true, &PaginationParams::default())
            .await
            .unwrap();
        assert_eq!(approver_inbox.len(), 1);

        // The instance survives a fresh read from storage
        let (listed, total) = storage
            .list_instances("org-1", None, None, &PaginationParams::default())
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(listed[0].id, instance.id);
    }

    #[tokio::test]
    async fn test_non_matching_event_produces_no_instances() {
        let pool = connect_in_memory().await.unwrap();
        let (storage, _, engine) = engine_parts(pool);

        storage
            .create_rule(WorkflowRuleCreateInput {
                organization_id: "org-1".to_string(),
                name: "Small expense auto-approval".to_string(),
                event: "expense.submitted".to_string(),
                conditions: HashMap::from([(
                    "amount".to_string(),
                    ConditionValue::Range {
                        min: None,
                        max: Some(100.0),
                    },
                )]),
                actions: vec![WorkflowAction::AutoApprove],
                enabled: true,
                escalation_hours: None,
                created_by: None,
            })
            .await
            .unwrap();

        let instances = engine
            .trigger(TriggerInput {
                organization_id: "org-1".to_string(),
                event: "expense.submitted".to_string(),
                data: HashMap::from([("amount".to_string(), json!(250))]),
                context: HashMap::new(),
                triggered_by: None,
            })
            .await
            .unwrap();

        assert!(instances.is_empty());
    }
}
