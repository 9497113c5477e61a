// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for IFC parsing and element extraction

use thiserror::Error;

/// Result type alias for parser operations
pub type Result<T> = std::result::Result<T, ParseError>;

/// Errors that can occur during IFC parsing
#[derive(Error, Debug)]
pub enum ParseError {
    /// Invalid IFC file format
    #[error("Invalid IFC format: {0}")]
    InvalidFormat(String),
}

impl ParseError {
    /// Create a new format error
    pub fn format(msg: impl Into<String>) -> Self {
        ParseError::InvalidFormat(msg.into())
    }
}

/// Result type alias for element extraction
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

/// Building models the extractor refuses to interpret
///
/// All of these abort the run: a partially extracted building would produce
/// silently wrong totals.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The model contains more than one IfcBuilding
    #[error("Can not assess IFC files containing {0} IfcBuilding entities (exactly one is supported)")]
    MultipleBuildings(usize),

    /// The model contains no IfcBuilding
    #[error("IFC file contains no IfcBuilding")]
    NoBuilding,

    /// The model contains IfcRoof entities
    #[error("Can not assess IFC files containing IfcRoof ({0} found); export roofs as IfcSlab with PredefinedType ROOF")]
    UnsupportedRoof(usize),

    /// A required base quantity is missing
    #[error("Element {element} has no {quantity} in BaseQuantities")]
    MissingQuantity { element: String, quantity: String },

    /// A base quantity is negative or not a number
    #[error("Element {element} has invalid {quantity}: {value}")]
    InvalidQuantity {
        element: String,
        quantity: String,
        value: f64,
    },

    /// Underlying parse failure
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl ExtractError {
    /// Create a missing quantity error
    pub fn missing_quantity(element: impl Into<String>, quantity: impl Into<String>) -> Self {
        ExtractError::MissingQuantity {
            element: element.into(),
            quantity: quantity.into(),
        }
    }
}
