// ABOUTME: Notification storage layer using SQLite

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::types::{Notification, NotificationKind};
use crate::pagination::PaginationParams;
use crate::storage::{generate_id, StorageError};

pub struct NotificationStorage {
    pool: SqlitePool,
}

impl NotificationStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Dispatch a notification to a recipient
    pub async fn dispatch(
        &self,
        organization_id: &str,
        recipient_id: &str,
        kind: NotificationKind,
        title: &str,
        body: &str,
    ) -> Result<Notification, StorageError> {
        let id = generate_id("ntf");
        let now = Utc::now();

        debug!("Notifying {} ({}): {}", recipient_id, kind, title);

        sqlx::query(
            r#"
            INSERT INTO notifications (id, organization_id, recipient_id, kind, title, body,
                                       read, created_at)
            VALUES (?, ?, ?, ?, ?, ?, 0, ?)
            "#,
        )
        .bind(&id)
        .bind(organization_id)
        .bind(recipient_id)
        .bind(kind.to_string())
        .bind(title)
        .bind(body)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Notification {
            id,
            organization_id: organization_id.to_string(),
            recipient_id: recipient_id.to_string(),
            kind,
            title: title.to_string(),
            body: body.to_string(),
            read: false,
            created_at: now,
        })
    }

    pub async fn list_for_recipient(
        &self,
        organization_id: &str,
        recipient_id: &str,
        unread_only: bool,
        pagination: &PaginationParams,
    ) -> Result<(Vec<Notification>, i64), StorageError> {
        let mut where_clause = String::from("WHERE organization_id = ? AND recipient_id = ?");
        if unread_only {
            where_clause.push_str(" AND read = 0");
        }

        let count_sql = format!("SELECT COUNT(*) FROM notifications {}", where_clause);
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(organization_id)
            .bind(recipient_id)
            .fetch_one(&self.pool)
            .await?;

        let (limit, offset) = pagination.validate();
        let list_sql = format!(
            "SELECT * FROM notifications {} ORDER BY created_at DESC LIMIT ? OFFSET ?",
            where_clause
        );
        let rows = sqlx::query(&list_sql)
            .bind(organization_id)
            .bind(recipient_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let notifications = rows
            .iter()
            .map(row_to_notification)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((notifications, total))
    }

    pub async fn mark_read(&self, id: &str) -> Result<Notification, StorageError> {
        let result = sqlx::query("UPDATE notifications SET read = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound("Notification".to_string()));
        }

        let row = sqlx::query("SELECT * FROM notifications WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        row_to_notification(&row)
    }

    /// Mark every notification for a recipient read; returns how many changed
    pub async fn mark_all_read(
        &self,
        organization_id: &str,
        recipient_id: &str,
    ) -> Result<u64, StorageError> {
        let result = sqlx::query(
            "UPDATE notifications SET read = 1 WHERE organization_id = ? AND recipient_id = ? AND read = 0",
        )
        .bind(organization_id)
        .bind(recipient_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

fn row_to_notification(row: &sqlx::sqlite::SqliteRow) -> Result<Notification, StorageError> {
    let kind: String = row.try_get("kind")?;

    Ok(Notification {
        id: row.try_get("id")?,
        organization_id: row.try_get("organization_id")?,
        recipient_id: row.try_get("recipient_id")?,
        kind: kind.parse().map_err(StorageError::Database)?,
        title: row.try_get("title")?,
        body: row.try_get("body")?,
        read: row.try_get("read")?,
        created_at: row.try_get("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::connect_in_memory;

    #[tokio::test]
    async fn test_dispatch_and_mark_read() {
        let pool = connect_in_memory().await.unwrap();
        let storage = NotificationStorage::new(pool);

        let n = storage
            .dispatch("org-1", "user-1", NotificationKind::Reminder, "Ping", "Body")
            .await
            .unwrap();
        assert!(!n.read);

        let (unread, total) = storage
            .list_for_recipient("org-1", "user-1", true, &PaginationParams::default())
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(unread.len(), 1);

        let read = storage.mark_read(&n.id).await.unwrap();
        assert!(read.read);

        let (unread, _) = storage
            .list_for_recipient("org-1", "user-1", true, &PaginationParams::default())
            .await
            .unwrap();
        assert!(unread.is_empty());
    }

    #[tokio::test]
    async fn test_mark_all_read_counts() {
        let pool = connect_in_memory().await.unwrap();
        let storage = NotificationStorage::new(pool);

        for i in 0..3 {
            storage
                .dispatch("org-1", "user-1", NotificationKind::System, "T", &format!("{}", i))
                .await
                .unwrap();
        }

        let changed = storage.mark_all_read("org-1", "user-1").await.unwrap();
        assert_eq!(changed, 3);
        assert_eq!(storage.mark_all_read("org-1", "user-1").await.unwrap(), 0);
    }
}
