// ABOUTME: Aggregation pipelines behind the analytics endpoints
// ABOUTME: Each metric is one independent SQL query scoped by org and date range

use sqlx::{Row, SqlitePool};
use std::sync::Arc;
use tracing::debug;

use super::types::{
    CurrencyBreakdown, DateRange, FeedbackSummary, HeadcountEntry, HiringFunnel, PayoutTotals,
    ProjectStatusSummary, StatusCount, SuggestionEngagement, SurveyParticipationEntry,
};
use crate::currency::CurrencyConverter;
use crate::storage::StorageError;

pub struct AnalyticsService {
    pool: SqlitePool,
    converter: Arc<dyn CurrencyConverter>,
}

impl AnalyticsService {
    pub fn new(pool: SqlitePool, converter: Arc<dyn CurrencyConverter>) -> Self {
        Self { pool, converter }
    }

    pub async fn feedback_summary(
        &self,
        organization_id: &str,
        range: &DateRange,
    ) -> Result<FeedbackSummary, StorageError> {
        debug!("Feedback summary for {}", organization_id);

        let sql = format!(
            "SELECT status, COUNT(*) AS count FROM feedback WHERE organization_id = ?{} GROUP BY status",
            range_clause(range)
        );
        let by_status = self.status_counts(&sql, organization_id, range).await?;
        let total = by_status.iter().map(|s| s.count).sum();

        let sql = format!(
            "SELECT AVG(rating) AS avg_rating, AVG(has_response) AS response_rate
             FROM feedback WHERE organization_id = ?{}",
            range_clause(range)
        );
        let row = bind_range(sqlx::query(&sql).bind(organization_id), range)
            .fetch_one(&self.pool)
            .await?;

        Ok(FeedbackSummary {
            by_status,
            average_rating: row.try_get("avg_rating")?,
            response_rate: row.try_get::<Option<f64>, _>("response_rate")?.unwrap_or(0.0),
            total,
        })
    }

    pub async fn suggestion_engagement(
        &self,
        organization_id: &str,
        range: &DateRange,
    ) -> Result<SuggestionEngagement, StorageError> {
        debug!("Suggestion engagement for {}", organization_id);

        let sql = format!(
            "SELECT status, COUNT(*) AS count FROM suggestions WHERE organization_id = ?{} GROUP BY status",
            range_clause(range)
        );
        let by_status = self.status_counts(&sql, organization_id, range).await?;
        let total = by_status.iter().map(|s| s.count).sum();

        let sql = format!(
            "SELECT COALESCE(SUM(upvotes), 0) AS up, COALESCE(SUM(downvotes), 0) AS down
             FROM suggestions WHERE organization_id = ?{}",
            range_clause(range)
        );
        let row = bind_range(sqlx::query(&sql).bind(organization_id), range)
            .fetch_one(&self.pool)
            .await?;

        Ok(SuggestionEngagement {
            by_status,
            total_upvotes: row.try_get("up")?,
            total_downvotes: row.try_get("down")?,
            total,
        })
    }

    pub async fn survey_participation(
        &self,
        organization_id: &str,
        range: &DateRange,
    ) -> Result<Vec<SurveyParticipationEntry>, StorageError> {
        debug!("Survey participation for {}", organization_id);

        let sql = format!(
            "SELECT s.id, s.title, COUNT(r.id) AS responses
             FROM surveys s
             LEFT JOIN survey_responses r ON r.survey_id = s.id
             WHERE s.organization_id = ?{}
             GROUP BY s.id, s.title
             ORDER BY responses DESC",
            range_clause_for(range, "s.created_at")
        );
        let rows = bind_range(sqlx::query(&sql).bind(organization_id), range)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                Ok(SurveyParticipationEntry {
                    survey_id: row.try_get("id")?,
                    title: row.try_get("title")?,
                    responses: row.try_get("responses")?,
                })
            })
            .collect()
    }

    /// Active employees per department
    pub async fn headcount(
        &self,
        organization_id: &str,
    ) -> Result<Vec<HeadcountEntry>, StorageError> {
        debug!("Headcount for {}", organization_id);

        let rows = sqlx::query(
            "SELECT COALESCE(department, 'unassigned') AS department, COUNT(*) AS count
             FROM employees
             WHERE organization_id = ? AND status = 'active'
             GROUP BY department
             ORDER BY count DESC",
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(HeadcountEntry {
                    department: row.try_get("department")?,
                    count: row.try_get("count")?,
                })
            })
            .collect()
    }

    pub async fn project_status(
        &self,
        organization_id: &str,
        range: &DateRange,
        target_currency: &str,
    ) -> Result<ProjectStatusSummary, StorageError> {
        debug!("Project status summary for {}", organization_id);

        let sql = format!(
            "SELECT status, COUNT(*) AS count FROM projects WHERE organization_id = ?{} GROUP BY status",
            range_clause(range)
        );
        let by_status = self.status_counts(&sql, organization_id, range).await?;

        let sql = format!(
            "SELECT currency, SUM(budget) AS amount FROM projects
             WHERE organization_id = ? AND budget IS NOT NULL AND currency IS NOT NULL{}
             GROUP BY currency",
            range_clause(range)
        );
        let budget_by_currency = self
            .converted_sums(&sql, organization_id, range, target_currency)
            .await?;
        let total_budget = budget_by_currency.iter().map(|b| b.converted).sum();

        Ok(ProjectStatusSummary {
            by_status,
            budget_by_currency,
            total_budget,
            target_currency: target_currency.to_string(),
        })
    }

    pub async fn payout_totals(
        &self,
        organization_id: &str,
        range: &DateRange,
        target_currency: &str,
    ) -> Result<PayoutTotals, StorageError> {
        debug!("Payout totals for {}", organization_id);

        let sql = format!(
            "SELECT status, COUNT(*) AS count FROM affiliate_payouts WHERE organization_id = ?{} GROUP BY status",
            range_clause(range)
        );
        let by_status = self.status_counts(&sql, organization_id, range).await?;

        let sql = format!(
            "SELECT currency, SUM(amount) AS amount FROM affiliate_payouts
             WHERE organization_id = ?{}
             GROUP BY currency",
            range_clause(range)
        );
        let by_currency = self
            .converted_sums(&sql, organization_id, range, target_currency)
            .await?;
        let total = by_currency.iter().map(|b| b.converted).sum();

        Ok(PayoutTotals {
            by_status,
            by_currency,
            total,
            target_currency: target_currency.to_string(),
        })
    }

    pub async fn hiring_funnel(
        &self,
        organization_id: &str,
        range: &DateRange,
    ) -> Result<HiringFunnel, StorageError> {
        debug!("Hiring funnel for {}", organization_id);

        let sql = format!(
            "SELECT status, COUNT(*) AS count FROM job_postings WHERE organization_id = ?{} GROUP BY status",
            range_clause(range)
        );
        let by_status = self.status_counts(&sql, organization_id, range).await?;
        let total = by_status.iter().map(|s| s.count).sum();

        Ok(HiringFunnel { by_status, total })
    }

    async fn status_counts(
        &self,
        sql: &str,
        organization_id: &str,
        range: &DateRange,
    ) -> Result<Vec<StatusCount>, StorageError> {
        let rows = bind_range(sqlx::query(sql).bind(organization_id), range)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                Ok(StatusCount {
                    status: row.try_get("status")?,
                    count: row.try_get("count")?,
                })
            })
            .collect()
    }

    /// Run a currency/amount grouping query and convert each bucket
    async fn converted_sums(
        &self,
        sql: &str,
        organization_id: &str,
        range: &DateRange,
        target_currency: &str,
    ) -> Result<Vec<CurrencyBreakdown>, StorageError> {
        let rows = bind_range(sqlx::query(sql).bind(organization_id), range)
            .fetch_all(&self.pool)
            .await?;

        let mut breakdown = Vec::with_capacity(rows.len());
        for row in &rows {
            let currency: String = row.try_get("currency")?;
            let amount: f64 = row.try_get("amount")?;
            let converted = self
                .converter
                .convert(amount, &currency, target_currency)
                .await
                .map_err(|e| StorageError::Database(format!("Currency conversion failed: {}", e)))?;
            breakdown.push(CurrencyBreakdown {
                currency,
                amount,
                converted,
            });
        }

        Ok(breakdown)
    }
}

fn range_clause(range: &DateRange) -> String {
    range_clause_for(range, "created_at")
}

fn range_clause_for(range: &DateRange, column: &str) -> String {
    let mut clause = String::new();
    if range.from.is_some() {
        clause.push_str(&format!(" AND {} >= ?", column));
    }
    if range.to.is_some() {
        clause.push_str(&format!(" AND {} <= ?", column));
    }
    clause
}

fn bind_range<'q>(
    mut query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    range: &DateRange,
) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    if let Some(from) = range.from {
        query = query.bind(from);
    }
    if let Some(to) = range.to {
        query = query.bind(to);
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::FixedRateConverter;
    use crate::feedback::{FeedbackCreateInput, FeedbackStorage};
    use crate::payouts::{PayoutCreateInput, PayoutStorage};
    use crate::storage::connect_in_memory;

    async fn service(pool: sqlx::SqlitePool) -> AnalyticsService {
        let converter = Arc::new(
            FixedRateConverter::new()
                .with_rate("EUR", "USD", 1.10)
                .with_rate("GBP", "USD", 1.25),
        );
        AnalyticsService::new(pool, converter)
    }

    #[tokio::test]
    async fn test_feedback_summary_counts_and_rate() {
        let pool = connect_in_memory().await.unwrap();
        let feedback = FeedbackStorage::new(pool.clone());
        let analytics = service(pool).await;

        for rating in [3, 5] {
            feedback
                .create(FeedbackCreateInput {
                    organization_id: "org-1".to_string(),
                    employee_id: None,
                    subject: "s".to_string(),
                    message: "m".to_string(),
                    category: Default::default(),
                    rating: Some(rating),
                    anonymous: false,
                    created_by: None,
                })
                .await
                .unwrap();
        }
        let third = feedback
            .create(FeedbackCreateInput {
                organization_id: "org-1".to_string(),
                employee_id: None,
                subject: "s".to_string(),
                message: "m".to_string(),
                category: Default::default(),
                rating: None,
                anonymous: false,
                created_by: None,
            })
            .await
            .unwrap();
        feedback.respond(&third.id, "ok", "mgr").await.unwrap();

        let summary = analytics
            .feedback_summary("org-1", &DateRange::default())
            .await
            .unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.average_rating, Some(4.0));
        assert!((summary.response_rate - 1.0 / 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_payout_totals_convert_currencies() {
        let pool = connect_in_memory().await.unwrap();
        let payouts = PayoutStorage::new(pool.clone());
        let analytics = service(pool).await;

        for (currency, amount) in [("EUR", 100.0), ("GBP", 40.0), ("USD", 10.0)] {
            payouts
                .create(PayoutCreateInput {
                    organization_id: "org-1".to_string(),
                    affiliate_id: "aff-1".to_string(),
                    amount,
                    currency: currency.to_string(),
                    period_start: None,
                    period_end: None,
                    notes: None,
                })
                .await
                .unwrap();
        }

        let totals = analytics
            .payout_totals("org-1", &DateRange::default(), "USD")
            .await
            .unwrap();

        assert_eq!(totals.by_currency.len(), 3);
        // 100 EUR * 1.10 + 40 GBP * 1.25 + 10 USD = 170 USD
        assert!((totals.total - 170.0).abs() < 1e-9);
        assert_eq!(totals.target_currency, "USD");
    }
}
