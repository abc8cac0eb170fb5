//! Database models

use serde::{Deserialize, Serialize};

/// A classification tier. Ordered by weight: ascending weight runs from the
/// highest-precedence tier down to the default (the highest weight).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tier {
    pub id: String,
    pub weight: i64,
}

/// A single yes/no questionnaire item, owned by exactly one tier.
///
/// `label` is the key the boolean answer is nested under in a submission
/// payload; `id` is the outer key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub label: String,
    pub tier: String,
}

/// An event record. The questionnaire flow only ever mutates `tier`;
/// event lifecycle is owned elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub guid: String,
    pub name: String,
    pub tier: Option<String>,
}

/// Persisted record of one answered question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub guid: String,
    /// Links the record to its event: `qn_<event>__<question_id>`
    pub name: String,
    /// The question label the response was given under
    pub question: String,
    pub response: bool,
    pub created_at: String,
}

/// Persisted aggregate tying one submission's answer records and the
/// resolved tier to an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub guid: String,
    /// Links the aggregate to its event: `qn_<event>`
    pub name: String,
    /// Answer record guids in catalog order
    pub answer_ids: Vec<String>,
    pub tier: String,
    pub created_at: String,
}
