// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the carbon engine

use ifc_carbon_model::{ElementCategory, ExtractError};
use thiserror::Error;

/// Carbon engine result type
pub type Result<T> = std::result::Result<T, CarbonError>;

/// Errors reading the reference material database
///
/// Line numbers are 1-based and count the header line.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Required column absent from the header
    #[error("Database has no '{0}' column")]
    MissingColumn(String),

    /// Database has no header line
    #[error("Database is empty")]
    Empty,

    /// Row shorter than the header requires
    #[error("Line {line}: expected at least {expected} fields, found {found}")]
    MissingField {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// Composite id not of the form `<prefix>-<class>-<variant>`
    #[error("Line {line}: malformed material id '{id}'")]
    InvalidId { line: usize, id: String },

    /// Numeric field that does not parse
    #[error("Line {line}: invalid number '{value}' in column '{column}'")]
    InvalidNumber {
        line: usize,
        column: String,
        value: String,
    },

    /// More than one row for a material name
    #[error("Material '{name}' appears more than once in the database (lines {first_line} and {line})")]
    DuplicateName {
        name: String,
        first_line: usize,
        line: usize,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DatabaseError {
    /// Create an invalid number error
    pub fn invalid_number(
        line: usize,
        column: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        DatabaseError::InvalidNumber {
            line,
            column: column.into(),
            value: value.into(),
        }
    }
}

/// Errors aborting a carbon assessment
#[derive(Error, Debug)]
pub enum CarbonError {
    /// A layer or composite whose material properties are unknown
    #[error("Element {element}: no material properties for '{material}'")]
    UnresolvedMaterial { element: String, material: String },

    /// Area given for a volumetric category or the other way round
    #[error("Element {element}: {category} needs {expected} extent")]
    ExtentMismatch {
        element: String,
        category: ElementCategory,
        expected: &'static str,
    },

    /// Negative or non-finite extent
    #[error("Element {element}: invalid extent {value}")]
    InvalidExtent { element: String, value: f64 },

    /// Negative or non-finite material layer thickness
    #[error("Element {element}: invalid thickness {value} for layer '{material}'")]
    InvalidThickness {
        element: String,
        material: String,
        value: f64,
    },

    /// No internal slab area to normalise by
    #[error("Building has no internal floor area (no internal slabs); carbon per area is undefined")]
    ZeroFloorArea,

    /// Configuration or export JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

impl CarbonError {
    /// Create an unresolved material error
    pub fn unresolved(element: impl Into<String>, material: impl Into<String>) -> Self {
        CarbonError::UnresolvedMaterial {
            element: element.into(),
            material: material.into(),
        }
    }
}
