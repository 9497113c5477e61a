// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for report generation

use thiserror::Error;

/// Report result type
pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Error, Debug)]
pub enum ReportError {
    /// Template refers to a key the report data does not have
    #[error("Template key '{0}' has no value")]
    MissingKey(String),

    /// Malformed `%` directive
    #[error("Invalid template directive at byte {position}: {message}")]
    InvalidDirective { position: usize, message: String },

    /// Numeric directive applied to a text value
    #[error("Template key '{key}' is not a number (used with %{conversion})")]
    NotANumber { key: String, conversion: char },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON export error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReportError {
    /// Create an invalid directive error
    pub fn directive(position: usize, message: impl Into<String>) -> Self {
        ReportError::InvalidDirective {
            position,
            message: message.into(),
        }
    }
}
