//! Questionnaire submission core: validation, classification, and the
//! orchestrating service.

pub mod classifier;
pub mod service;
pub mod validator;

pub use classifier::classify;
pub use service::{PersistStep, SubmissionService, SubmitError, SubmitReceipt};
pub use validator::{validate, ValidatedAnswer, ValidationError};
