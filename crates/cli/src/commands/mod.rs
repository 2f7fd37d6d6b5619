//! CLI command implementations.
//!
//! Each command renders its output to a `String`; `main` does the printing.

pub mod rates;
pub mod split;

use marketplace_core::CommissionError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Input rejected by the commission engine.
    #[error(transparent)]
    Commission(#[from] CommissionError),

    /// JSON rendering failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
