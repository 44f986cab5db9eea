//! CLI support for abap-js
//!
//! Provides programmatic access to the `abapjs` command for embedding in
//! other tools (build scripts, editors).

mod translate;

pub use translate::{TranslateOptions, TranslateResult, TranslateStats, execute_translate};

use std::io;

use crate::TranslateError;

/// Errors that can occur during CLI operations
#[derive(Debug)]
pub enum CliError {
    /// Lex, parse or generation failure
    Translate(TranslateError),
    /// Malformed signature file
    Json(serde_json::Error),
    /// IO error
    Io(io::Error),
    /// No input provided
    NoInput,
}

impl CliError {
    /// Machine-readable form of the error for `--json` output.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            CliError::Translate(e) => {
                let position = e.position();
                serde_json::json!({
                    "error": {
                        "category": e.category(),
                        "message": e.to_string(),
                        "line": position.line,
                        "column": position.column,
                    }
                })
            }
            other => serde_json::json!({
                "error": {
                    "category": "cli",
                    "message": other.to_string(),
                }
            }),
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Translate(e) => write!(f, "Translation failed: {}", e),
            CliError::Json(e) => write!(f, "Invalid signature file: {}", e),
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::NoInput => write!(
                f,
                "No input provided. Pass a FILE, use --source, or pipe ABAP to stdin."
            ),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Translate(e) => Some(e),
            CliError::Json(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::NoInput => None,
        }
    }
}

impl From<TranslateError> for CliError {
    fn from(e: TranslateError) -> Self {
        CliError::Translate(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}
