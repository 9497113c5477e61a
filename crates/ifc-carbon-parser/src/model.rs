// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ParsedModel - Main IFC model implementation

use crate::materials::MaterialReaderImpl;
use crate::properties::PropertyReaderImpl;
use crate::resolver::ResolverImpl;
use crate::scanner::{parse_header, EntityScanner};
use crate::units::extract_length_unit_scale;

use ifc_carbon_model::{
    EntityResolver, IfcModel, MaterialReader, ModelMetadata, ParseError, PropertyReader, Result,
};
use std::sync::Arc;

/// Parsed IFC model implementing the `IfcModel` trait
///
/// Provides access to entities, properties and material associations
/// through trait objects.
pub struct ParsedModel {
    resolver: Arc<ResolverImpl>,
    properties: Arc<PropertyReaderImpl>,
    materials: Arc<MaterialReaderImpl>,
    /// Length unit scale (file units to meters)
    unit_scale: Option<f64>,
    metadata: ModelMetadata,
}

impl ParsedModel {
    /// Parse IFC content and create a model
    pub fn parse(content: &str, require_header: bool) -> Result<Self> {
        if require_header && !content.trim_start().starts_with("ISO-10303-21") {
            return Err(ParseError::format("missing ISO-10303-21 header"));
        }
        if !content.contains("DATA;") {
            return Err(ParseError::format("missing DATA section"));
        }

        let (index, type_index) = EntityScanner::build_indices(content);
        log::debug!(
            "Indexed {} entities of {} types",
            index.len(),
            type_index.len()
        );

        let resolver = Arc::new(ResolverImpl::with_indices(
            content.to_string(),
            index,
            type_index,
        ));

        let unit_scale = extract_length_unit_scale(resolver.as_ref());
        let properties = Arc::new(PropertyReaderImpl::new(resolver.clone()));
        let materials = Arc::new(MaterialReaderImpl::new(resolver.clone()));

        let metadata = parse_header(content);

        Ok(Self {
            resolver,
            properties,
            materials,
            unit_scale,
            metadata,
        })
    }
}

impl IfcModel for ParsedModel {
    fn resolver(&self) -> &dyn EntityResolver {
        self.resolver.as_ref()
    }

    fn properties(&self) -> &dyn PropertyReader {
        self.properties.as_ref()
    }

    fn materials(&self) -> &dyn MaterialReader {
        self.materials.as_ref()
    }

    fn unit_scale(&self) -> Option<f64> {
        self.unit_scale
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}
