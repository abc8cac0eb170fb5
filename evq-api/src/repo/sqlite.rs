//! SQLite implementations of the storage ports

use super::{EventStore, NewAnswer, NewSubmission, QuestionCatalog, SubmissionStore, TierCatalog};
use chrono::Utc;
use evq_common::db::models::{AnswerRecord, Event, Question, Submission, Tier};
use evq_common::{Error, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Event rows in the shared database.
#[derive(Clone)]
pub struct SqliteEventStore {
    db: SqlitePool,
}

impl SqliteEventStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl EventStore for SqliteEventStore {
    async fn load(&self, event_id: &str) -> Result<Option<Event>> {
        let row = sqlx::query_as::<_, (String, String, Option<String>)>(
            "SELECT guid, name, tier FROM events WHERE guid = ?",
        )
        .bind(event_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(|(guid, name, tier)| Event { guid, name, tier }))
    }

    async fn set_tier(&self, event_id: &str, tier_id: &str) -> Result<()> {
        let result = sqlx::query("UPDATE events SET tier = ? WHERE guid = ?")
            .bind(tier_id)
            .bind(event_id)
            .execute(&self.db)
            .await?;

        // The event was loaded at the start of the request; a zero-row
        // update means it vanished underneath us.
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Event {}", event_id)));
        }
        Ok(())
    }
}

/// Question and tier catalogs in the shared database. Both collections are
/// small and admin-configured, so one type serves both ports.
#[derive(Clone)]
pub struct SqliteCatalog {
    db: SqlitePool,
}

impl SqliteCatalog {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl QuestionCatalog for SqliteCatalog {
    async fn list_questions(&self) -> Result<Vec<Question>> {
        let rows = sqlx::query_as::<_, (String, String, String)>(
            "SELECT id, label, tier FROM questions ORDER BY id",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, label, tier)| Question { id, label, tier })
            .collect())
    }
}

#[async_trait::async_trait]
impl TierCatalog for SqliteCatalog {
    async fn list_tiers(&self) -> Result<Vec<Tier>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT id, weight FROM tiers ORDER BY weight",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(|(id, weight)| Tier { id, weight }).collect())
    }
}

/// Answer and aggregate rows in the shared database.
#[derive(Clone)]
pub struct SqliteSubmissionStore {
    db: SqlitePool,
}

impl SqliteSubmissionStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl SubmissionStore for SqliteSubmissionStore {
    async fn create_answer(&self, answer: &NewAnswer) -> Result<String> {
        let guid = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO answers (guid, name, question, response, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&guid)
        .bind(&answer.name)
        .bind(&answer.question)
        .bind(answer.response as i64)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.db)
        .await?;

        Ok(guid)
    }

    async fn create_submission(&self, submission: &NewSubmission) -> Result<String> {
        let guid = Uuid::new_v4().to_string();
        let answer_ids = serde_json::to_string(&submission.answer_ids)
            .map_err(|e| Error::Internal(format!("Failed to encode answer ids: {}", e)))?;

        sqlx::query(
            "INSERT INTO submissions (guid, name, answer_ids, tier, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&guid)
        .bind(&submission.name)
        .bind(&answer_ids)
        .bind(&submission.tier)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.db)
        .await?;

        Ok(guid)
    }

    async fn submissions_for_event(&self, event_id: &str) -> Result<Vec<Submission>> {
        let rows = sqlx::query_as::<_, (String, String, String, String, String)>(
            "SELECT guid, name, answer_ids, tier, created_at FROM submissions
             WHERE name = ? ORDER BY created_at",
        )
        .bind(format!("qn_{}", event_id))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter()
            .map(|(guid, name, answer_ids, tier, created_at)| {
                let answer_ids: Vec<String> = serde_json::from_str(&answer_ids).map_err(|e| {
                    Error::Internal(format!("Corrupt answer id list on submission {}: {}", guid, e))
                })?;
                Ok(Submission {
                    guid,
                    name,
                    answer_ids,
                    tier,
                    created_at,
                })
            })
            .collect()
    }

    async fn load_answer(&self, guid: &str) -> Result<Option<AnswerRecord>> {
        let row = sqlx::query_as::<_, (String, String, String, i64, String)>(
            "SELECT guid, name, question, response, created_at FROM answers WHERE guid = ?",
        )
        .bind(guid)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(|(guid, name, question, response, created_at)| AnswerRecord {
            guid,
            name,
            question,
            response: response != 0,
            created_at,
        }))
    }
}
