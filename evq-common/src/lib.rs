//! # EVQ Common Library
//!
//! Shared code for the event questionnaire service:
//! - Database initialization and row models
//! - Catalog file loading (tiers and questions)
//! - Configuration (root folder resolution)
//! - Common error type

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
