// ABOUTME: Affiliate payout storage layer using SQLite
// ABOUTME: Transition guards: only pending can be approved/rejected, only approved paid

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::types::{Payout, PayoutCreateInput, PayoutFilter, PayoutStatus};
use crate::pagination::PaginationParams;
use crate::storage::{generate_id, StorageError};

pub struct PayoutStorage {
    pool: SqlitePool,
}

impl PayoutStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: PayoutCreateInput) -> Result<Payout, StorageError> {
        let id = generate_id("pay");
        let now = Utc::now();

        debug!(
            "Creating payout: {} ({} {} for {})",
            id, input.amount, input.currency, input.affiliate_id
        );

        sqlx::query(
            r#"
            INSERT INTO affiliate_payouts (id, organization_id, affiliate_id, amount, currency,
                                           period_start, period_end, status, notes,
                                           created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, 'pending', ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&input.organization_id)
        .bind(&input.affiliate_id)
        .bind(input.amount)
        .bind(&input.currency)
        .bind(input.period_start)
        .bind(input.period_end)
        .bind(&input.notes)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(&id).await
    }

    pub async fn get(&self, id: &str) -> Result<Payout, StorageError> {
        let row = sqlx::query("SELECT * FROM affiliate_payouts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StorageError::NotFound("Payout".to_string()))?;

        row_to_payout(&row)
    }

    pub async fn list(
        &self,
        organization_id: &str,
        filter: &PayoutFilter,
        pagination: &PaginationParams,
    ) -> Result<(Vec<Payout>, i64), StorageError> {
        let mut where_clause = String::from("WHERE organization_id = ?");
        if filter.status.is_some() {
            where_clause.push_str(" AND status = ?");
        }
        if filter.affiliate_id.is_some() {
            where_clause.push_str(" AND affiliate_id = ?");
        }

        let count_sql = format!("SELECT COUNT(*) FROM affiliate_payouts {}", where_clause);
        let mut count_query = sqlx::query_scalar(&count_sql).bind(organization_id);
        if let Some(status) = filter.status {
            count_query = count_query.bind(status.to_string());
        }
        if let Some(affiliate_id) = &filter.affiliate_id {
            count_query = count_query.bind(affiliate_id);
        }
        let total: i64 = count_query.fetch_one(&self.pool).await?;

        let (limit, offset) = pagination.validate();
        let list_sql = format!(
            "SELECT * FROM affiliate_payouts {} ORDER BY created_at DESC LIMIT ? OFFSET ?",
            where_clause
        );
        let mut list_query = sqlx::query(&list_sql).bind(organization_id);
        if let Some(status) = filter.status {
            list_query = list_query.bind(status.to_string());
        }
        if let Some(affiliate_id) = &filter.affiliate_id {
            list_query = list_query.bind(affiliate_id);
        }
        let rows = list_query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let payouts = rows
            .iter()
            .map(row_to_payout)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((payouts, total))
    }

    pub async fn approve(&self, id: &str, approved_by: &str) -> Result<Payout, StorageError> {
        let payout = self.get(id).await?;
        if payout.status != PayoutStatus::Pending {
            return Err(StorageError::InvalidInput(format!(
                "Only pending payouts can be approved (current status: {})",
                payout.status
            )));
        }

        debug!("Approving payout: {}", id);

        sqlx::query(
            "UPDATE affiliate_payouts SET status = 'approved', approved_by = ?, updated_at = ? WHERE id = ?",
        )
        .bind(approved_by)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.get(id).await
    }

    pub async fn reject(&self, id: &str, reason: Option<&str>) -> Result<Payout, StorageError> {
        let payout = self.get(id).await?;
        if payout.status != PayoutStatus::Pending {
            return Err(StorageError::InvalidInput(format!(
                "Only pending payouts can be rejected (current status: {})",
                payout.status
            )));
        }

        debug!("Rejecting payout: {}", id);

        sqlx::query(
            "UPDATE affiliate_payouts SET status = 'rejected', notes = COALESCE(?, notes), updated_at = ? WHERE id = ?",
        )
        .bind(reason)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.get(id).await
    }

    /// Mark an approved payout paid, stamping paid_at and the payment reference
    pub async fn mark_paid(&self, id: &str, reference: Option<&str>) -> Result<Payout, StorageError> {
        let payout = self.get(id).await?;
        if payout.status != PayoutStatus::Approved {
            return Err(StorageError::InvalidInput(format!(
                "Only approved payouts can be marked paid (current status: {})",
                payout.status
            )));
        }

        debug!("Marking payout paid: {}", id);

        let now = Utc::now();
        sqlx::query(
            "UPDATE affiliate_payouts SET status = 'paid', paid_at = ?, reference = ?, updated_at = ? WHERE id = ?",
        )
        .bind(now)
        .bind(reference)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), StorageError> {
        debug!("Deleting payout: {}", id);

        let result = sqlx::query("DELETE FROM affiliate_payouts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound("Payout".to_string()));
        }

        Ok(())
    }
}

fn row_to_payout(row: &sqlx::sqlite::SqliteRow) -> Result<Payout, StorageError> {
    let status: String = row.try_get("status")?;

    Ok(Payout {
        id: row.try_get("id")?,
        organization_id: row.try_get("organization_id")?,
        affiliate_id: row.try_get("affiliate_id")?,
        amount: row.try_get("amount")?,
        currency: row.try_get("currency")?,
        period_start: row.try_get("period_start")?,
        period_end: row.try_get("period_end")?,
        status: status.parse().map_err(StorageError::Database)?,
        approved_by: row.try_get("approved_by")?,
        paid_at: row.try_get("paid_at")?,
        reference: row.try_get("reference")?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::connect_in_memory;

    fn sample(org: &str, currency: &str, amount: f64) -> PayoutCreateInput {
        PayoutCreateInput {
            organization_id: org.to_string(),
            affiliate_id: "aff-1".to_string(),
            amount,
            currency: currency.to_string(),
            period_start: None,
            period_end: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_lifecycle_pending_approved_paid() {
        let pool = connect_in_memory().await.unwrap();
        let storage = PayoutStorage::new(pool);

        let payout = storage.create(sample("org-1", "EUR", 250.0)).await.unwrap();
        assert_eq!(payout.status, PayoutStatus::Pending);

        // Cannot pay a pending payout
        assert!(matches!(
            storage.mark_paid(&payout.id, None).await,
            Err(StorageError::InvalidInput(_))
        ));

        let approved = storage.approve(&payout.id, "finance-1").await.unwrap();
        assert_eq!(approved.status, PayoutStatus::Approved);
        assert_eq!(approved.approved_by.as_deref(), Some("finance-1"));

        let paid = storage.mark_paid(&payout.id, Some("wire-778")).await.unwrap();
        assert_eq!(paid.status, PayoutStatus::Paid);
        assert!(paid.paid_at.is_some());
        assert_eq!(paid.reference.as_deref(), Some("wire-778"));

        // Approving again is invalid
        assert!(matches!(
            storage.approve(&payout.id, "finance-1").await,
            Err(StorageError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_reject_records_reason() {
        let pool = connect_in_memory().await.unwrap();
        let storage = PayoutStorage::new(pool);

        let payout = storage.create(sample("org-1", "USD", 90.0)).await.unwrap();
        let rejected = storage
            .reject(&payout.id, Some("Duplicate request"))
            .await
            .unwrap();
        assert_eq!(rejected.status, PayoutStatus::Rejected);
        assert_eq!(rejected.notes.as_deref(), Some("Duplicate request"));
    }
}
