// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-Carbon Parser - STEP parser and building element extractor
//!
//! This crate reads IFC (STEP) files and implements the traits defined in
//! `ifc-carbon-model`. On top of the raw model it provides the element
//! extractor, which turns walls, slabs, roofs, doors, windows and stairs into
//! the [`BuildingModel`](ifc_carbon_model::BuildingModel) the carbon engine
//! consumes.
//!
//! # Features
//!
//! - **Tokenization** using `nom` combinators
//! - **SIMD-accelerated scanning** using `memchr`
//! - **Lazy entity decoding** - only parse entities when needed
//! - **Arc-based caching** - decoded entities are shared
//!
//! # Example
//!
//! ```ignore
//! use ifc_carbon_parser::{extract_building, StepParser};
//! use ifc_carbon_model::IfcParser;
//!
//! let model = StepParser::new().parse(ifc_content)?;
//! let building = extract_building(model.as_ref())?;
//! println!("{} elements", building.elements.len());
//! ```

mod extract;
mod materials;
mod model;
mod properties;
mod resolver;
mod scanner;
mod tokenizer;
mod units;

pub use extract::{
    extract_building, ElementExtractor, BASE_QUANTITIES, COMPONENT_QUANTITIES,
    ELEMENT_CARBON_PSET, MATERIAL_PROPERTIES_PSET,
};
pub use model::ParsedModel;
pub use scanner::EntityScanner;
pub use tokenizer::{decode_step_string, parse_entity, Token};

use ifc_carbon_model::{IfcModel, IfcParser, Result};
use std::sync::Arc;

/// Main STEP/IFC parser implementing `IfcParser` trait
#[derive(Clone, Debug)]
pub struct StepParser {
    /// Reject content that does not start with `ISO-10303-21`
    pub require_header: bool,
}

impl Default for StepParser {
    fn default() -> Self {
        Self::new()
    }
}

impl StepParser {
    /// Create a new parser with default settings
    pub fn new() -> Self {
        Self {
            require_header: true,
        }
    }

    /// Set whether the ISO-10303-21 header line is required
    pub fn with_require_header(mut self, required: bool) -> Self {
        self.require_header = required;
        self
    }
}

impl IfcParser for StepParser {
    fn parse(&self, content: &str) -> Result<Arc<dyn IfcModel>> {
        ParsedModel::parse(content, self.require_header).map(|m| Arc::new(m) as Arc<dyn IfcModel>)
    }
}

/// Quick parse function for simple use cases
pub fn parse(content: &str) -> Result<Arc<dyn IfcModel>> {
    StepParser::new().parse(content)
}
