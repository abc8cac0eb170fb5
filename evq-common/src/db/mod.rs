//! Database access layer shared by the service and its tests

pub mod init;
pub mod models;

pub use init::{apply_catalog, init_database};
