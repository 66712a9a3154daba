// ABOUTME: Survey storage layer using SQLite
// ABOUTME: Questions and answers stored as JSON text columns

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use tracing::debug;

use super::types::{
    QuestionKind, Survey, SurveyCreateInput, SurveyResponse, SurveyResponseInput, SurveyStatus,
    SurveySummary, SurveyUpdateInput,
};
use crate::pagination::PaginationParams;
use crate::storage::{generate_id, StorageError};

pub struct SurveyStorage {
    pool: SqlitePool,
}

impl SurveyStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: SurveyCreateInput) -> Result<Survey, StorageError> {
        let id = generate_id("svy");
        let now = Utc::now();

        debug!("Creating survey: {} ({})", id, input.title);

        let questions = serde_json::to_string(&input.questions)?;

        sqlx::query(
            r#"
            INSERT INTO surveys (id, organization_id, title, description, questions, status,
                                 anonymous, opens_at, closes_at, created_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, 'draft', ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&input.organization_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(questions)
        .bind(input.anonymous)
        .bind(input.opens_at)
        .bind(input.closes_at)
        .bind(&input.created_by)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(&id).await
    }

    pub async fn get(&self, id: &str) -> Result<Survey, StorageError> {
        let row = sqlx::query("SELECT * FROM surveys WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StorageError::NotFound("Survey".to_string()))?;

        row_to_survey(&row)
    }

    pub async fn list(
        &self,
        organization_id: &str,
        status: Option<SurveyStatus>,
        pagination: &PaginationParams,
    ) -> Result<(Vec<Survey>, i64), StorageError> {
        let mut where_clause = String::from("WHERE organization_id = ?");
        if status.is_some() {
            where_clause.push_str(" AND status = ?");
        }

        let count_sql = format!("SELECT COUNT(*) FROM surveys {}", where_clause);
        let mut count_query = sqlx::query_scalar(&count_sql).bind(organization_id);
        if let Some(status) = status {
            count_query = count_query.bind(status.to_string());
        }
        let total: i64 = count_query.fetch_one(&self.pool).await?;

        let (limit, offset) = pagination.validate();
        let list_sql = format!(
            "SELECT * FROM surveys {} ORDER BY created_at DESC LIMIT ? OFFSET ?",
            where_clause
        );
        let mut list_query = sqlx::query(&list_sql).bind(organization_id);
        if let Some(status) = status {
            list_query = list_query.bind(status.to_string());
        }
        let rows = list_query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let surveys = rows.iter().map(row_to_survey).collect::<Result<Vec<_>, _>>()?;

        Ok((surveys, total))
    }

    /// Update survey metadata. Question edits are rejected once responses exist.
    pub async fn update(&self, id: &str, input: SurveyUpdateInput) -> Result<Survey, StorageError> {
        debug!("Updating survey: {}", id);

        if input.questions.is_some() {
            let responses: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM survey_responses WHERE survey_id = ?")
                    .bind(id)
                    .fetch_one(&self.pool)
                    .await?;
            if responses > 0 {
                return Err(StorageError::Conflict(
                    "Survey questions cannot be changed after responses have been collected"
                        .to_string(),
                ));
            }
        }

        let questions_json = match &input.questions {
            Some(questions) => Some(serde_json::to_string(questions)?),
            None => None,
        };

        let mut query_parts = Vec::new();
        if input.title.is_some() {
            query_parts.push("title = ?");
        }
        if input.description.is_some() {
            query_parts.push("description = ?");
        }
        if questions_json.is_some() {
            query_parts.push("questions = ?");
        }
        if input.anonymous.is_some() {
            query_parts.push("anonymous = ?");
        }
        if input.opens_at.is_some() {
            query_parts.push("opens_at = ?");
        }
        if input.closes_at.is_some() {
            query_parts.push("closes_at = ?");
        }

        if query_parts.is_empty() {
            return self.get(id).await;
        }
        query_parts.push("updated_at = ?");

        let query_str = format!("UPDATE surveys SET {} WHERE id = ?", query_parts.join(", "));
        let mut query = sqlx::query(&query_str);

        if let Some(title) = input.title {
            query = query.bind(title);
        }
        if let Some(description) = input.description {
            query = query.bind(description);
        }
        if let Some(questions) = questions_json {
            query = query.bind(questions);
        }
        if let Some(anonymous) = input.anonymous {
            query = query.bind(anonymous);
        }
        if let Some(opens_at) = input.opens_at {
            query = query.bind(opens_at);
        }
        if let Some(closes_at) = input.closes_at {
            query = query.bind(closes_at);
        }

        let result = query.bind(Utc::now()).bind(id).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound("Survey".to_string()));
        }

        self.get(id).await
    }

    pub async fn set_status(&self, id: &str, status: SurveyStatus) -> Result<Survey, StorageError> {
        debug!("Setting survey {} status to {}", id, status);

        let result = sqlx::query("UPDATE surveys SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.to_string())
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound("Survey".to_string()));
        }

        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), StorageError> {
        debug!("Deleting survey: {}", id);

        let result = sqlx::query("DELETE FROM surveys WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound("Survey".to_string()));
        }

        Ok(())
    }

    /// Submit a response. Only open surveys accept responses; every required
    /// question must have an answer.
    pub async fn submit_response(
        &self,
        survey_id: &str,
        input: SurveyResponseInput,
    ) -> Result<SurveyResponse, StorageError> {
        let survey = self.get(survey_id).await?;

        if survey.status != SurveyStatus::Open {
            return Err(StorageError::InvalidInput(format!(
                "Survey is {} and does not accept responses",
                survey.status
            )));
        }

        for question in &survey.questions {
            if question.required && !input.answers.contains_key(&question.id) {
                return Err(StorageError::InvalidInput(format!(
                    "Missing answer for required question {}",
                    question.id
                )));
            }
        }

        let known: Vec<&str> = survey.questions.iter().map(|q| q.id.as_str()).collect();
        if let Some(unknown) = input.answers.keys().find(|k| !known.contains(&k.as_str())) {
            return Err(StorageError::InvalidInput(format!(
                "Answer references unknown question {}",
                unknown
            )));
        }

        let id = generate_id("svyr");
        let now = Utc::now();
        let answers = serde_json::to_string(&input.answers)?;

        debug!("Recording response {} for survey {}", id, survey_id);

        sqlx::query(
            "INSERT INTO survey_responses (id, survey_id, respondent_id, answers, submitted_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(survey_id)
        .bind(&input.respondent_id)
        .bind(answers)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(SurveyResponse {
            id,
            survey_id: survey_id.to_string(),
            respondent_id: input.respondent_id,
            answers: input.answers,
            submitted_at: now,
        })
    }

    pub async fn list_responses(
        &self,
        survey_id: &str,
        pagination: &PaginationParams,
    ) -> Result<(Vec<SurveyResponse>, i64), StorageError> {
        self.get(survey_id).await?;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM survey_responses WHERE survey_id = ?")
                .bind(survey_id)
                .fetch_one(&self.pool)
                .await?;

        let (limit, offset) = pagination.validate();
        let rows = sqlx::query(
            "SELECT * FROM survey_responses WHERE survey_id = ? ORDER BY submitted_at DESC LIMIT ? OFFSET ?",
        )
        .bind(survey_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let responses = rows
            .iter()
            .map(row_to_response)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((responses, total))
    }

    /// Aggregate responses: total count and per-question averages for rating questions
    pub async fn summary(&self, survey_id: &str) -> Result<SurveySummary, StorageError> {
        let survey = self.get(survey_id).await?;

        let rows = sqlx::query("SELECT answers FROM survey_responses WHERE survey_id = ?")
            .bind(survey_id)
            .fetch_all(&self.pool)
            .await?;

        let mut sums: HashMap<String, (f64, i64)> = HashMap::new();
        for row in &rows {
            let raw: String = row.try_get("answers")?;
            let answers: HashMap<String, serde_json::Value> = serde_json::from_str(&raw)?;
            for question in &survey.questions {
                if question.kind != QuestionKind::Rating {
                    continue;
                }
                if let Some(value) = answers.get(&question.id).and_then(|v| v.as_f64()) {
                    let entry = sums.entry(question.id.clone()).or_insert((0.0, 0));
                    entry.0 += value;
                    entry.1 += 1;
                }
            }
        }

        let rating_averages = sums
            .into_iter()
            .map(|(id, (sum, count))| (id, sum / count as f64))
            .collect();

        Ok(SurveySummary {
            survey_id: survey_id.to_string(),
            response_count: rows.len() as i64,
            rating_averages,
        })
    }
}

fn row_to_survey(row: &sqlx::sqlite::SqliteRow) -> Result<Survey, StorageError> {
    let status: String = row.try_get("status")?;
    let questions: String = row.try_get("questions")?;

    Ok(Survey {
        id: row.try_get("id")?,
        organization_id: row.try_get("organization_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        questions: serde_json::from_str(&questions)?,
        status: status.parse().map_err(StorageError::Database)?,
        anonymous: row.try_get("anonymous")?,
        opens_at: row.try_get("opens_at")?,
        closes_at: row.try_get("closes_at")?,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_response(row: &sqlx::sqlite::SqliteRow) -> Result<SurveyResponse, StorageError> {
    let answers: String = row.try_get("answers")?;

    Ok(SurveyResponse {
        id: row.try_get("id")?,
        survey_id: row.try_get("survey_id")?,
        respondent_id: row.try_get("respondent_id")?,
        answers: serde_json::from_str(&answers)?,
        submitted_at: row.try_get("submitted_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::connect_in_memory;
    use crate::surveys::types::SurveyQuestion;
    use serde_json::json;

    fn questions() -> Vec<SurveyQuestion> {
        vec![
            SurveyQuestion {
                id: "q1".to_string(),
                prompt: "How satisfied are you?".to_string(),
                kind: QuestionKind::Rating,
                options: vec![],
                required: true,
            },
            SurveyQuestion {
                id: "q2".to_string(),
                prompt: "Anything else?".to_string(),
                kind: QuestionKind::Text,
                options: vec![],
                required: false,
            },
        ]
    }

    async fn open_survey(storage: &SurveyStorage) -> Survey {
        let survey = storage
            .create(SurveyCreateInput {
                organization_id: "org-1".to_string(),
                title: "Quarterly pulse".to_string(),
                description: None,
                questions: questions(),
                anonymous: true,
                opens_at: None,
                closes_at: None,
                created_by: None,
            })
            .await
            .unwrap();
        storage.set_status(&survey.id, SurveyStatus::Open).await.unwrap()
    }

    #[tokio::test]
    async fn test_draft_survey_rejects_responses() {
        let pool = connect_in_memory().await.unwrap();
        let storage = SurveyStorage::new(pool);

        let survey = storage
            .create(SurveyCreateInput {
                organization_id: "org-1".to_string(),
                title: "Pulse".to_string(),
                description: None,
                questions: questions(),
                anonymous: false,
                opens_at: None,
                closes_at: None,
                created_by: None,
            })
            .await
            .unwrap();

        let err = storage
            .submit_response(
                &survey.id,
                SurveyResponseInput {
                    respondent_id: None,
                    answers: HashMap::from([("q1".to_string(), json!(4))]),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_required_question_must_be_answered() {
        let pool = connect_in_memory().await.unwrap();
        let storage = SurveyStorage::new(pool);
        let survey = open_survey(&storage).await;

        let err = storage
            .submit_response(
                &survey.id,
                SurveyResponseInput {
                    respondent_id: Some("emp-1".to_string()),
                    answers: HashMap::from([("q2".to_string(), json!("all good"))]),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_summary_averages_rating_questions() {
        let pool = connect_in_memory().await.unwrap();
        let storage = SurveyStorage::new(pool);
        let survey = open_survey(&storage).await;

        for rating in [3, 5] {
            storage
                .submit_response(
                    &survey.id,
                    SurveyResponseInput {
                        respondent_id: None,
                        answers: HashMap::from([("q1".to_string(), json!(rating))]),
                    },
                )
                .await
                .unwrap();
        }

        let summary = storage.summary(&survey.id).await.unwrap();
        assert_eq!(summary.response_count, 2);
        assert_eq!(summary.rating_averages.get("q1"), Some(&4.0));
    }

    #[tokio::test]
    async fn test_question_edit_locked_after_responses() {
        let pool = connect_in_memory().await.unwrap();
        let storage = SurveyStorage::new(pool);
        let survey = open_survey(&storage).await;

        storage
            .submit_response(
                &survey.id,
                SurveyResponseInput {
                    respondent_id: None,
                    answers: HashMap::from([("q1".to_string(), json!(2))]),
                },
            )
            .await
            .unwrap();

        let err = storage
            .update(
                &survey.id,
                SurveyUpdateInput {
                    questions: Some(vec![]),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));

        // Metadata updates are still allowed
        let updated = storage
            .update(
                &survey.id,
                SurveyUpdateInput {
                    title: Some("Quarterly pulse (renamed)".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Quarterly pulse (renamed)");
    }
}
