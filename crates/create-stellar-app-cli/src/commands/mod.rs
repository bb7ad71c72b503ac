//! CLI command implementations for create-stellar-app.

pub mod create;
pub mod templates;
