//! HTTP API handlers

pub mod health;
pub mod submit;

pub use health::health_routes;
pub use submit::submit_questionnaire;
