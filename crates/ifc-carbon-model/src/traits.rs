// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core traits for IFC parsing
//!
//! These traits define the main abstractions for working with IFC data.

use crate::{EntityResolver, MaterialReader, ModelMetadata, PropertyReader, Result};
use std::sync::Arc;

/// Main parsing interface - entry point for parsing IFC content
///
/// Implementations of this trait provide the ability to parse IFC file content
/// and return a model that can be queried through various trait interfaces.
///
/// # Example
///
/// ```ignore
/// use ifc_carbon_model::{IfcParser, IfcModel};
///
/// let parser: Box<dyn IfcParser> = get_parser();
/// let model = parser.parse(ifc_content)?;
/// println!("Schema: {}", model.metadata().schema_version);
/// ```
pub trait IfcParser: Send + Sync {
    /// Parse IFC content and return a model
    ///
    /// # Arguments
    /// * `content` - The IFC file content as a string
    ///
    /// # Returns
    /// An `Arc<dyn IfcModel>` on success, or a `ParseError` on failure
    fn parse(&self, content: &str) -> Result<Arc<dyn IfcModel>>;
}

/// Core model interface - read-only access to a parsed IFC model
///
/// This trait provides access to the various aspects of an IFC model through
/// sub-traits that handle specific concerns (entity resolution, properties,
/// material composition).
///
/// The model is thread-safe (`Send + Sync`) so a parsed model can be shared
/// behind an `Arc`.
pub trait IfcModel: Send + Sync {
    /// Get entity resolver for entity lookups and reference resolution
    ///
    /// The resolver provides O(1) access to entities by ID and can resolve
    /// entity references found in attribute values.
    fn resolver(&self) -> &dyn EntityResolver;

    /// Get property reader for accessing property sets and quantities
    ///
    /// The property reader provides access to IfcPropertySet and IfcElementQuantity
    /// data associated with entities.
    fn properties(&self) -> &dyn PropertyReader;

    /// Get material reader for layered material composition
    fn materials(&self) -> &dyn MaterialReader;

    /// Get unit scale factor (file length units to meters)
    ///
    /// Common values:
    /// - 1.0 for meters
    /// - 0.001 for millimeters
    /// - 0.0254 for inches
    /// - 0.3048 for feet
    ///
    /// `None` when the file declares no length unit.
    fn unit_scale(&self) -> Option<f64>;

    /// Get file metadata (schema version, originating system, etc.)
    fn metadata(&self) -> &ModelMetadata;
}
