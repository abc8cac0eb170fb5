//! Submission payload validation
//!
//! Checks an incoming answer payload against the configured question set.
//! All checks run for every question with no short-circuit, so one response
//! carries every problem in the submission.

use evq_common::db::models::Question;
use serde_json::{Map, Value};

/// One structured validation failure.
///
/// Rendered on the wire as `{"Invalid questionnaire submission": "<message>"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The request body was not a JSON object at all
    MalformedPayload,
    /// The question's identifier is not a key in the payload
    MissingQuestion { question_id: String },
    /// The nested object lacks the exact label key the catalog expects
    LabelMismatch {
        question_id: String,
        expected_label: String,
    },
    /// The label key is present but its value is not a boolean
    NotBoolean {
        question_id: String,
        expected_label: String,
    },
}

impl ValidationError {
    /// Human-readable message, matching the fixed wire templates.
    pub fn message(&self) -> String {
        match self {
            ValidationError::MalformedPayload => {
                "Expected the request body to be a JSON object.".to_string()
            }
            ValidationError::MissingQuestion { question_id } => {
                format!("Missing {}.", question_id)
            }
            ValidationError::LabelMismatch {
                question_id,
                expected_label,
            } => format!(
                "Expected {} to have an object keyed with '{}'.",
                question_id, expected_label
            ),
            ValidationError::NotBoolean {
                question_id,
                expected_label,
            } => format!(
                "Expected {} : {} to map to a boolean.",
                question_id, expected_label
            ),
        }
    }
}

/// A question paired with its validated boolean response.
#[derive(Debug, Clone)]
pub struct ValidatedAnswer {
    pub question: Question,
    pub response: bool,
}

/// Validate a decoded payload against the question catalog.
///
/// Per question, in catalog order:
/// 1. the question id must be a key in the payload,
/// 2. its value must be an object keyed with the exact configured label
///    (a missing or non-object value fails this check too, so an absent
///    question surfaces both errors),
/// 3. the label's value must be a boolean.
///
/// Extra keys at either level are tolerated. Returns the validated answers
/// in catalog order, or every accumulated error.
pub fn validate(
    payload: &Map<String, Value>,
    questions: &[Question],
) -> Result<Vec<ValidatedAnswer>, Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut answers = Vec::with_capacity(questions.len());

    for question in questions {
        let entry = payload.get(&question.id);
        if entry.is_none() {
            errors.push(ValidationError::MissingQuestion {
                question_id: question.id.clone(),
            });
        }

        let labeled = entry
            .and_then(|value| value.as_object())
            .and_then(|nested| nested.get(&question.label));

        match labeled {
            None => errors.push(ValidationError::LabelMismatch {
                question_id: question.id.clone(),
                expected_label: question.label.clone(),
            }),
            Some(value) => match value.as_bool() {
                None => errors.push(ValidationError::NotBoolean {
                    question_id: question.id.clone(),
                    expected_label: question.label.clone(),
                }),
                Some(response) => answers.push(ValidatedAnswer {
                    question: question.clone(),
                    response,
                }),
            },
        }
    }

    if errors.is_empty() {
        Ok(answers)
    } else {
        Err(errors)
    }
}
