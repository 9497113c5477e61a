// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-Carbon Model - Trait definitions and shared types
//!
//! This crate provides the abstractions shared by the IFC parser and the
//! carbon engine. Parser backends implement the model traits; the element
//! extractor produces a [`BuildingModel`] that the engine consumes without
//! knowing anything about STEP.
//!
//! # Architecture
//!
//! - [`IfcParser`] - Entry point for parsing IFC content
//! - [`IfcModel`] - Read-only access to a parsed IFC model
//! - [`EntityResolver`] - Entity lookup and reference resolution
//! - [`PropertyReader`] - Access to property sets and quantities
//! - [`MaterialReader`] - Layered material composition
//! - [`ElementSource`] / [`ElementRecord`] - Extractor to engine contract
//!
//! # Example
//!
//! ```ignore
//! use ifc_carbon_model::{IfcParser, IfcModel, EntityId};
//!
//! let parser: Box<dyn IfcParser> = get_parser();
//! let model = parser.parse(ifc_content)?;
//!
//! let resolver = model.resolver();
//! if let Some(entity) = resolver.get(EntityId(123)) {
//!     println!("Entity type: {:?}", entity.ifc_type);
//! }
//! ```

pub mod element;
pub mod error;
pub mod materials;
pub mod properties;
pub mod resolver;
pub mod traits;
pub mod types;

// Re-export all public types
pub use element::*;
pub use error::*;
pub use materials::*;
pub use properties::*;
pub use resolver::*;
pub use traits::*;
pub use types::*;
