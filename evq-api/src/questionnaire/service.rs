//! Submission orchestration
//!
//! Sequences one questionnaire submission end-to-end: load event, validate,
//! classify, persist answers and aggregate, update the event tier. Each
//! terminal branch emits one structured log event. The persistence calls are
//! independent writes with no cross-call transaction, so a failure after
//! validation identifies the step that broke.

use super::classifier::classify;
use super::validator::{validate, ValidatedAnswer, ValidationError};
use crate::repo::{EventStore, NewAnswer, NewSubmission, QuestionCatalog, SubmissionStore, TierCatalog};
use evq_common::Error;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Persistence step that a submission can fail partway through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistStep {
    AnswerRecord,
    Aggregate,
    EventTier,
}

impl fmt::Display for PersistStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistStep::AnswerRecord => write!(f, "answer record creation"),
            PersistStep::Aggregate => write!(f, "submission aggregate creation"),
            PersistStep::EventTier => write!(f, "event tier update"),
        }
    }
}

/// Terminal failure of a submission. By the time it leaves the service this
/// is plain data; the HTTP layer maps it onto status codes and bodies.
#[derive(Debug)]
pub enum SubmitError {
    /// The event identifier resolves to nothing (no writes, no catalog reads)
    EventNotFound(String),
    /// The payload failed validation (no writes)
    Invalid(Vec<ValidationError>),
    /// A repository write failed after validation passed; earlier writes in
    /// the sequence may already have completed
    Persistence { step: PersistStep, source: Error },
    /// A catalog or event store read failed; never masked as not-found or
    /// validation failure
    Upstream(Error),
}

/// Successful submission acknowledgment.
#[derive(Debug, Clone)]
pub struct SubmitReceipt {
    pub submission_id: String,
    pub answer_ids: Vec<String>,
    pub tier: String,
}

/// Orchestrates questionnaire submissions over the four storage ports.
pub struct SubmissionService {
    events: Arc<dyn EventStore>,
    questions: Arc<dyn QuestionCatalog>,
    tiers: Arc<dyn TierCatalog>,
    store: Arc<dyn SubmissionStore>,
}

impl SubmissionService {
    pub fn new(
        events: Arc<dyn EventStore>,
        questions: Arc<dyn QuestionCatalog>,
        tiers: Arc<dyn TierCatalog>,
        store: Arc<dyn SubmissionStore>,
    ) -> Self {
        Self {
            events,
            questions,
            tiers,
            store,
        }
    }

    /// Process one submission for the given event.
    pub async fn submit(&self, event_id: &str, payload: &Value) -> Result<SubmitReceipt, SubmitError> {
        // Event first: an unknown event returns before any catalog read
        let event = self
            .events
            .load(event_id)
            .await
            .map_err(SubmitError::Upstream)?;
        if event.is_none() {
            error!(event_id, "Event does not exist");
            return Err(SubmitError::EventNotFound(event_id.to_string()));
        }

        // Read-only catalog snapshots for the rest of the request
        let questions = self
            .questions
            .list_questions()
            .await
            .map_err(SubmitError::Upstream)?;
        let tiers = self
            .tiers
            .list_tiers()
            .await
            .map_err(SubmitError::Upstream)?;

        let answers = match decode_and_validate(payload, &questions) {
            Ok(answers) => answers,
            Err(errors) => {
                error!(event_id, count = errors.len(), "Invalid questionnaire submission");
                return Err(SubmitError::Invalid(errors));
            }
        };

        let tier = classify(&answers, &tiers).ok_or_else(|| {
            SubmitError::Upstream(Error::Internal("No classification tiers configured".to_string()))
        })?;

        // One answer record per question, in catalog order
        let mut answer_ids = Vec::with_capacity(answers.len());
        for answer in &answers {
            let record = NewAnswer {
                name: format!("qn_{}__{}", event_id, answer.question.id),
                question: answer.question.label.clone(),
                response: answer.response,
            };
            let guid = self.store.create_answer(&record).await.map_err(|source| {
                warn!(event_id, question_id = %answer.question.id, "Answer record write failed");
                SubmitError::Persistence {
                    step: PersistStep::AnswerRecord,
                    source,
                }
            })?;
            answer_ids.push(guid);
        }

        // Aggregate referencing every answer record created above
        let aggregate = NewSubmission {
            name: format!("qn_{}", event_id),
            answer_ids: answer_ids.clone(),
            tier: tier.clone(),
        };
        let submission_id = self
            .store
            .create_submission(&aggregate)
            .await
            .map_err(|source| {
                warn!(event_id, "Submission aggregate write failed");
                SubmitError::Persistence {
                    step: PersistStep::Aggregate,
                    source,
                }
            })?;

        // Last side effect: point the event at its resolved tier
        self.events
            .set_tier(event_id, &tier)
            .await
            .map_err(|source| {
                warn!(event_id, %tier, "Event tier update failed after persistence");
                SubmitError::Persistence {
                    step: PersistStep::EventTier,
                    source,
                }
            })?;

        info!(event_id, %tier, submission_id = %submission_id, "Questionnaire submitted");
        Ok(SubmitReceipt {
            submission_id,
            answer_ids,
            tier,
        })
    }
}

/// Decode the raw body into the expected nested-object shape, then run the
/// per-question checks. A body that is not a JSON object is its own
/// validation failure rather than a panic deeper in.
fn decode_and_validate(
    payload: &Value,
    questions: &[evq_common::db::models::Question],
) -> Result<Vec<ValidatedAnswer>, Vec<ValidationError>> {
    let body = payload
        .as_object()
        .ok_or_else(|| vec![ValidationError::MalformedPayload])?;
    validate(body, questions)
}
