//! Storage ports consumed by the submission flow.
//!
//! The orchestrator only sees these traits; the SQLite implementations
//! live in [`sqlite`]. Tests substitute recording fakes.

pub mod sqlite;

use evq_common::db::models::{AnswerRecord, Event, Question, Submission, Tier};
use evq_common::Result;

pub use sqlite::{SqliteCatalog, SqliteEventStore, SqliteSubmissionStore};

/// Event store port. Events are owned elsewhere; this flow reads one and
/// updates its tier.
#[async_trait::async_trait]
pub trait EventStore: Send + Sync {
    /// Load an event by identifier. `None` when it does not exist.
    async fn load(&self, event_id: &str) -> Result<Option<Event>>;

    /// Point the event at its resolved classification tier.
    async fn set_tier(&self, event_id: &str, tier_id: &str) -> Result<()>;
}

/// Question catalog port. Read-only, admin-configured.
#[async_trait::async_trait]
pub trait QuestionCatalog: Send + Sync {
    /// All configured questions in catalog order. The order fixes the
    /// ordering of validation errors and persisted answer records.
    async fn list_questions(&self) -> Result<Vec<Question>>;
}

/// Tier catalog port. Read-only, admin-configured.
#[async_trait::async_trait]
pub trait TierCatalog: Send + Sync {
    /// All configured tiers. Callers sort by weight themselves.
    async fn list_tiers(&self) -> Result<Vec<Tier>>;
}

/// Fields for one answer record, written once per question per submission.
#[derive(Debug, Clone)]
pub struct NewAnswer {
    /// `qn_<event>__<question_id>`
    pub name: String,
    /// The question label the response was given under
    pub question: String,
    pub response: bool,
}

/// Fields for the aggregate record created once per submission.
#[derive(Debug, Clone)]
pub struct NewSubmission {
    /// `qn_<event>`
    pub name: String,
    /// Answer record guids in catalog order
    pub answer_ids: Vec<String>,
    pub tier: String,
}

/// Submission store port. Each create is an independent write; there is no
/// cross-call transaction, so callers must report partial completion.
#[async_trait::async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Persist one answer record, returning its generated guid.
    async fn create_answer(&self, answer: &NewAnswer) -> Result<String>;

    /// Persist the submission aggregate, returning its generated guid.
    async fn create_submission(&self, submission: &NewSubmission) -> Result<String>;

    /// Load every aggregate recorded for an event, oldest first. Events
    /// accumulate one aggregate per submission; none is ever rewritten.
    async fn submissions_for_event(&self, event_id: &str) -> Result<Vec<Submission>>;

    /// Load one answer record by guid. `None` when it does not exist.
    async fn load_answer(&self, guid: &str) -> Result<Option<AnswerRecord>>;
}
