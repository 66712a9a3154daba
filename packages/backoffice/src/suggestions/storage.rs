// ABOUTME: Suggestion storage layer using SQLite
// ABOUTME: CRUD plus vote bookkeeping with per-voter uniqueness

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::types::{
    Suggestion, SuggestionCreateInput, SuggestionFilter, SuggestionStatus, VoteType,
};
use crate::pagination::PaginationParams;
use crate::storage::{generate_id, StorageError};

pub struct SuggestionStorage {
    pool: SqlitePool,
}

impl SuggestionStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: SuggestionCreateInput) -> Result<Suggestion, StorageError> {
        let id = generate_id("sug");
        let now = Utc::now();

        debug!("Creating suggestion: {} ({})", id, input.title);

        sqlx::query(
            r#"
            INSERT INTO suggestions (id, organization_id, title, description, category,
                                     status, upvotes, downvotes, created_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, 'open', 0, 0, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&input.organization_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.category)
        .bind(&input.created_by)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(&id).await
    }

    pub async fn get(&self, id: &str) -> Result<Suggestion, StorageError> {
        let row = sqlx::query("SELECT * FROM suggestions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StorageError::NotFound("Suggestion".to_string()))?;

        row_to_suggestion(&row)
    }

    pub async fn list(
        &self,
        organization_id: &str,
        filter: &SuggestionFilter,
        pagination: &PaginationParams,
    ) -> Result<(Vec<Suggestion>, i64), StorageError> {
        let mut where_clause = String::from("WHERE organization_id = ?");
        if filter.status.is_some() {
            where_clause.push_str(" AND status = ?");
        }
        if filter.category.is_some() {
            where_clause.push_str(" AND category = ?");
        }

        let count_sql = format!("SELECT COUNT(*) FROM suggestions {}", where_clause);
        let mut count_query = sqlx::query_scalar(&count_sql).bind(organization_id);
        if let Some(status) = filter.status {
            count_query = count_query.bind(status.to_string());
        }
        if let Some(category) = &filter.category {
            count_query = count_query.bind(category);
        }
        let total: i64 = count_query.fetch_one(&self.pool).await?;

        let (limit, offset) = pagination.validate();
        let list_sql = format!(
            "SELECT * FROM suggestions {} ORDER BY created_at DESC LIMIT ? OFFSET ?",
            where_clause
        );
        let mut list_query = sqlx::query(&list_sql).bind(organization_id);
        if let Some(status) = filter.status {
            list_query = list_query.bind(status.to_string());
        }
        if let Some(category) = &filter.category {
            list_query = list_query.bind(category);
        }
        let rows = list_query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let suggestions = rows
            .iter()
            .map(row_to_suggestion)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((suggestions, total))
    }

    /// Cast a vote. A repeated identical vote is rejected; the opposite vote
    /// flips the voter's previous choice and adjusts both tallies.
    pub async fn vote(
        &self,
        id: &str,
        voter_id: &str,
        vote: VoteType,
    ) -> Result<Suggestion, StorageError> {
        debug!("Vote {} on suggestion {} by {}", vote, id, voter_id);

        // Ensure the suggestion exists before touching the votes table
        self.get(id).await?;

        let mut tx = self.pool.begin().await?;

        let existing: Option<String> = sqlx::query_scalar(
            "SELECT vote FROM suggestion_votes WHERE suggestion_id = ? AND voter_id = ?",
        )
        .bind(id)
        .bind(voter_id)
        .fetch_optional(&mut *tx)
        .await?;

        match existing.as_deref() {
            Some(previous) if previous == vote.to_string() => {
                return Err(StorageError::Conflict(format!(
                    "Voter {} already voted {} on this suggestion",
                    voter_id, vote
                )));
            }
            Some(_) => {
                // Flip: move the voter to the other side
                sqlx::query(
                    "UPDATE suggestion_votes SET vote = ?, created_at = ? WHERE suggestion_id = ? AND voter_id = ?",
                )
                .bind(vote.to_string())
                .bind(Utc::now())
                .bind(id)
                .bind(voter_id)
                .execute(&mut *tx)
                .await?;

                let tally_sql = match vote {
                    VoteType::Up => {
                        "UPDATE suggestions SET upvotes = upvotes + 1, downvotes = downvotes - 1, updated_at = ? WHERE id = ?"
                    }
                    VoteType::Down => {
                        "UPDATE suggestions SET downvotes = downvotes + 1, upvotes = upvotes - 1, updated_at = ? WHERE id = ?"
                    }
                };
                sqlx::query(tally_sql)
                    .bind(Utc::now())
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
            }
            None => {
                sqlx::query(
                    "INSERT INTO suggestion_votes (suggestion_id, voter_id, vote, created_at) VALUES (?, ?, ?, ?)",
                )
                .bind(id)
                .bind(voter_id)
                .bind(vote.to_string())
                .bind(Utc::now())
                .execute(&mut *tx)
                .await?;

                let tally_sql = match vote {
                    VoteType::Up => {
                        "UPDATE suggestions SET upvotes = upvotes + 1, updated_at = ? WHERE id = ?"
                    }
                    VoteType::Down => {
                        "UPDATE suggestions SET downvotes = downvotes + 1, updated_at = ? WHERE id = ?"
                    }
                };
                sqlx::query(tally_sql)
                    .bind(Utc::now())
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;

        self.get(id).await
    }

    /// Remove a voter's vote and decrement the matching tally
    pub async fn unvote(&self, id: &str, voter_id: &str) -> Result<Suggestion, StorageError> {
        debug!("Removing vote on suggestion {} by {}", id, voter_id);

        let mut tx = self.pool.begin().await?;

        let existing: Option<String> = sqlx::query_scalar(
            "SELECT vote FROM suggestion_votes WHERE suggestion_id = ? AND voter_id = ?",
        )
        .bind(id)
        .bind(voter_id)
        .fetch_optional(&mut *tx)
        .await?;

        let previous = existing.ok_or_else(|| StorageError::NotFound("Vote".to_string()))?;

        sqlx::query("DELETE FROM suggestion_votes WHERE suggestion_id = ? AND voter_id = ?")
            .bind(id)
            .bind(voter_id)
            .execute(&mut *tx)
            .await?;

        let tally_sql = if previous == "up" {
            "UPDATE suggestions SET upvotes = upvotes - 1, updated_at = ? WHERE id = ?"
        } else {
            "UPDATE suggestions SET downvotes = downvotes - 1, updated_at = ? WHERE id = ?"
        };
        sqlx::query(tally_sql)
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get(id).await
    }

    pub async fn update_status(
        &self,
        id: &str,
        status: SuggestionStatus,
    ) -> Result<Suggestion, StorageError> {
        debug!("Updating suggestion {} status to {}", id, status);

        let result = sqlx::query("UPDATE suggestions SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.to_string())
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound("Suggestion".to_string()));
        }

        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), StorageError> {
        debug!("Deleting suggestion: {}", id);

        let result = sqlx::query("DELETE FROM suggestions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound("Suggestion".to_string()));
        }

        Ok(())
    }
}

fn row_to_suggestion(row: &sqlx::sqlite::SqliteRow) -> Result<Suggestion, StorageError> {
    let status: String = row.try_get("status")?;

    Ok(Suggestion {
        id: row.try_get("id")?,
        organization_id: row.try_get("organization_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        category: row.try_get("category")?,
        status: status.parse().map_err(StorageError::Database)?,
        upvotes: row.try_get("upvotes")?,
        downvotes: row.try_get("downvotes")?,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::connect_in_memory;

    async fn storage_with_suggestion() -> (SuggestionStorage, Suggestion) {
        let pool = connect_in_memory().await.unwrap();
        let storage = SuggestionStorage::new(pool);
        let suggestion = storage
            .create(SuggestionCreateInput {
                organization_id: "org-1".to_string(),
                title: "Standing desks".to_string(),
                description: "Offer standing desks on request.".to_string(),
                category: "workplace".to_string(),
                created_by: Some("user-1".to_string()),
            })
            .await
            .unwrap();
        (storage, suggestion)
    }

    #[tokio::test]
    async fn test_first_vote_increments_one_side() {
        let (storage, suggestion) = storage_with_suggestion().await;

        let voted = storage
            .vote(&suggestion.id, "voter-1", VoteType::Up)
            .await
            .unwrap();
        assert_eq!(voted.upvotes, 1);
        assert_eq!(voted.downvotes, 0);
    }

    #[tokio::test]
    async fn test_repeated_vote_is_rejected_and_tallies_unchanged() {
        let (storage, suggestion) = storage_with_suggestion().await;

        storage
            .vote(&suggestion.id, "voter-1", VoteType::Up)
            .await
            .unwrap();
        let err = storage
            .vote(&suggestion.id, "voter-1", VoteType::Up)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));

        let current = storage.get(&suggestion.id).await.unwrap();
        assert_eq!(current.upvotes, 1);
        assert_eq!(current.downvotes, 0);
    }

    #[tokio::test]
    async fn test_opposite_vote_flips_tally() {
        let (storage, suggestion) = storage_with_suggestion().await;

        storage
            .vote(&suggestion.id, "voter-1", VoteType::Up)
            .await
            .unwrap();
        let flipped = storage
            .vote(&suggestion.id, "voter-1", VoteType::Down)
            .await
            .unwrap();

        assert_eq!(flipped.upvotes, 0);
        assert_eq!(flipped.downvotes, 1);
    }

    #[tokio::test]
    async fn test_unvote_restores_tally() {
        let (storage, suggestion) = storage_with_suggestion().await;

        storage
            .vote(&suggestion.id, "voter-1", VoteType::Down)
            .await
            .unwrap();
        let cleared = storage.unvote(&suggestion.id, "voter-1").await.unwrap();
        assert_eq!(cleared.downvotes, 0);

        assert!(matches!(
            storage.unvote(&suggestion.id, "voter-1").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_vote_on_missing_suggestion() {
        let (storage, _) = storage_with_suggestion().await;
        assert!(matches!(
            storage.vote("sug-missing", "voter-1", VoteType::Up).await,
            Err(StorageError::NotFound(_))
        ));
    }
}
