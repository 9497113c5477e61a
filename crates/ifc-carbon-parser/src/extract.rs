// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Building element extraction
//!
//! Walks a parsed model and produces the [`BuildingModel`] the carbon engine
//! works on. Only one building per file is supported, and roofs must be
//! exported as slabs whose type carries `PredefinedType = ROOF`.

use ifc_carbon_model::{
    BuildingModel, DecodedEntity, ElementCategory, ElementSource, Extent, ExtractError,
    ExtractResult, IfcModel, IfcType, LayerSpec, MaterialProperties, Property, QuantityType,
};
use std::sync::Arc;

/// Property set describing the materials of layered elements
pub const MATERIAL_PROPERTIES_PSET: &str = "Material Properties";
/// Property set carrying the carbon data of composite elements
pub const ELEMENT_CARBON_PSET: &str = "EC_Pset_EmbodiedCarbon";
/// Element quantity holding roof slab components
pub const COMPONENT_QUANTITIES: &str = "Component Quantities";
/// Element quantity holding extents
pub const BASE_QUANTITIES: &str = "BaseQuantities";

/// Entity types read per category, supertype first
const WALL_TYPES: &[IfcType] = &[
    IfcType::IfcWall,
    IfcType::IfcWallStandardCase,
    IfcType::IfcWallElementedCase,
];
const SLAB_TYPES: &[IfcType] = &[
    IfcType::IfcSlab,
    IfcType::IfcSlabStandardCase,
    IfcType::IfcSlabElementedCase,
];
const DOOR_TYPES: &[IfcType] = &[IfcType::IfcDoor, IfcType::IfcDoorStandardCase];
const WINDOW_TYPES: &[IfcType] = &[IfcType::IfcWindow, IfcType::IfcWindowStandardCase];
const STAIR_TYPES: &[IfcType] = &[IfcType::IfcStair];

const BUILDING_PSET: &str = "Pset_BuildingCommon";
const SKIN_THICKNESS: &str = "Skin Thickness";

/// Extracts building elements from a parsed IFC model
pub struct ElementExtractor<'m> {
    model: &'m dyn IfcModel,
    source_file: Option<String>,
}

impl<'m> ElementExtractor<'m> {
    pub fn new(model: &'m dyn IfcModel) -> Self {
        Self {
            model,
            source_file: None,
        }
    }

    /// Record the file name the model was read from
    pub fn with_source_file(mut self, name: impl Into<String>) -> Self {
        self.source_file = Some(name.into());
        self
    }

    /// Extract the building and all of its carbon-bearing elements
    pub fn extract(&self) -> ExtractResult<BuildingModel> {
        log::info!("Processing project");
        let metadata = self.model.metadata();
        log::debug!(
            "Schema {}, authored with {}",
            metadata.schema_version,
            metadata.originating_system.as_deref().unwrap_or("unknown software")
        );
        let building = self.single_building()?;

        let roofs = self.model.resolver().count_by_type(&IfcType::IfcRoof);
        if roofs > 0 {
            return Err(ExtractError::UnsupportedRoof(roofs));
        }

        let mut elements = Vec::new();

        log::info!("Processing walls");
        for wall in self.entities(WALL_TYPES) {
            elements.push(self.element(&wall, ElementCategory::Wall)?);
        }

        log::info!("Processing slabs and roofs");
        for slab in self.entities(SLAB_TYPES) {
            let category = if self.is_roof_slab(&slab) {
                ElementCategory::Roof
            } else {
                ElementCategory::Slab
            };
            elements.push(self.element(&slab, category)?);
        }

        for (types, category, label) in [
            (DOOR_TYPES, ElementCategory::Door, "doors"),
            (WINDOW_TYPES, ElementCategory::Window, "windows"),
            (STAIR_TYPES, ElementCategory::Stair, "stairs"),
        ] {
            log::info!("Processing {}", label);
            for entity in self.entities(types) {
                elements.push(self.element(&entity, category)?);
            }
        }

        let model = BuildingModel {
            identity: self.identity(&building),
            properties: self.building_properties(&building),
            source_file: self.source_file.clone(),
            length_unit_scale: self.model.unit_scale(),
            elements,
        };

        for category in ElementCategory::ALL {
            log::debug!("{} {} element(s)", model.count(category), category);
        }

        Ok(model)
    }

    fn single_building(&self) -> ExtractResult<Arc<DecodedEntity>> {
        let mut buildings = self
            .model
            .resolver()
            .entities_by_type(&IfcType::IfcBuilding);
        match buildings.len() {
            0 => Err(ExtractError::NoBuilding),
            1 => Ok(buildings.remove(0)),
            n => Err(ExtractError::MultipleBuildings(n)),
        }
    }

    /// Entities of the given types, in file order
    fn entities(&self, types: &[IfcType]) -> Vec<Arc<DecodedEntity>> {
        let mut entities: Vec<_> = types
            .iter()
            .flat_map(|t| self.model.resolver().entities_by_type(t))
            .collect();
        entities.sort_by_key(|e| e.id.0);
        entities
    }

    /// `"<Name> (<GlobalId>)"`, falling back to the entity type for unnamed elements
    fn identity(&self, entity: &DecodedEntity) -> String {
        let name = entity
            .get_string(2)
            .unwrap_or_else(|| entity.ifc_type.name());
        let guid = entity.get_string(0).unwrap_or("");
        format!("{} ({})", name, guid)
    }

    fn building_properties(&self, building: &DecodedEntity) -> Vec<(String, String)> {
        self.model
            .properties()
            .property_set(building.id, BUILDING_PSET)
            .map(|pset| {
                pset.properties
                    .into_iter()
                    .filter(|p| !p.is_complex())
                    .map(|p| (p.name, p.value))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Slab type PredefinedType (9), else the slab's own PredefinedType (8)
    fn is_roof_slab(&self, slab: &DecodedEntity) -> bool {
        let from_type = self
            .model
            .properties()
            .type_object(slab.id)
            .and_then(|id| self.model.resolver().get(id))
            .filter(|t| t.ifc_type == IfcType::IfcSlabType)
            .and_then(|t| t.get_enum(9).map(str::to_string));

        let predefined = from_type.or_else(|| slab.get_enum(8).map(str::to_string));
        predefined.as_deref() == Some("ROOF")
    }

    fn element(
        &self,
        entity: &DecodedEntity,
        category: ElementCategory,
    ) -> ExtractResult<ElementSource> {
        let identity = self.identity(entity);
        let is_external = self.is_external(entity, category);
        let extent = self.extent(entity, category, &identity)?;

        let source = if category.is_layered() {
            let layers = if category == ElementCategory::Roof {
                self.component_layers(entity, &identity)?
            } else {
                self.material_layers(entity)
            };
            if layers.is_empty() {
                log::warn!("{} {} has no material layers", category, identity);
            }
            let mut source = ElementSource::layered(category, identity, extent, layers);
            self.read_material_properties(entity, &mut source);
            source
        } else {
            let properties = self.composite_properties(entity);
            ElementSource::composite(category, identity, extent, properties)
        };

        log::debug!(
            "{} {}: external={} extent={:?}",
            category,
            source.identity,
            is_external,
            extent
        );

        Ok(source.external(is_external))
    }

    fn is_external(&self, entity: &DecodedEntity, category: ElementCategory) -> bool {
        self.model
            .properties()
            .property_set(entity.id, category.common_pset())
            .and_then(|pset| pset.get("IsExternal").and_then(Property::as_bool))
            .unwrap_or(false)
    }

    fn extent(
        &self,
        entity: &DecodedEntity,
        category: ElementCategory,
        identity: &str,
    ) -> ExtractResult<Extent> {
        let name = category.extent_quantity();
        let value = self
            .model
            .properties()
            .quantity_set(entity.id, BASE_QUANTITIES)
            .and_then(|qset| qset.get(name).map(|q| q.value))
            .ok_or_else(|| ExtractError::missing_quantity(identity, name))?;

        if !value.is_finite() || value < 0.0 {
            return Err(ExtractError::InvalidQuantity {
                element: identity.to_string(),
                quantity: name.to_string(),
                value,
            });
        }

        Ok(if category.is_layered() {
            Extent::Area(value)
        } else {
            Extent::Volume(value)
        })
    }

    fn material_layers(&self, entity: &DecodedEntity) -> Vec<LayerSpec> {
        self.model
            .materials()
            .material_layers(entity.id)
            .into_iter()
            .map(|layer| LayerSpec::new(layer.material, layer.thickness))
            .collect()
    }

    /// Roof slab layers from the `Component Quantities` element quantity
    ///
    /// Each physical complex quantity is one component; its `Skin Thickness`
    /// is the layer thickness. Slabs without component quantities fall back
    /// to their material layer set.
    fn component_layers(
        &self,
        entity: &DecodedEntity,
        identity: &str,
    ) -> ExtractResult<Vec<LayerSpec>> {
        let Some(components) = self
            .model
            .properties()
            .quantity_set(entity.id, COMPONENT_QUANTITIES)
        else {
            return Ok(self.material_layers(entity));
        };

        components
            .quantities
            .iter()
            .filter(|q| q.quantity_type == QuantityType::Complex)
            .map(|component| {
                let thickness = component
                    .component(SKIN_THICKNESS)
                    .map(|q| q.value)
                    .ok_or_else(|| {
                        ExtractError::missing_quantity(
                            identity,
                            format!("{} of component {}", SKIN_THICKNESS, component.name),
                        )
                    })?;
                Ok(LayerSpec::new(component.name.clone(), thickness))
            })
            .collect()
    }

    /// Read `Material Properties`: component -> material -> carbon data
    fn read_material_properties(&self, entity: &DecodedEntity, source: &mut ElementSource) {
        let Some(pset) = self
            .model
            .properties()
            .property_set(entity.id, MATERIAL_PROPERTIES_PSET)
        else {
            return;
        };

        for component in pset.properties.iter().filter(|p| p.is_complex()) {
            // Some exporters skip the component level
            if let Some(props) = carbon_data(component) {
                source.materials.push((component.name.clone(), props));
                continue;
            }
            for material in component.nested.iter().filter(|p| p.is_complex()) {
                source
                    .aliases
                    .push((component.name.clone(), material.name.clone()));
                match carbon_data(material) {
                    Some(props) => source.materials.push((material.name.clone(), props)),
                    None => log::debug!(
                        "Material {} of {} has no carbon data",
                        material.name,
                        source.identity
                    ),
                }
            }
        }
    }

    fn composite_properties(&self, entity: &DecodedEntity) -> Option<MaterialProperties> {
        let pset = self
            .model
            .properties()
            .property_set(entity.id, ELEMENT_CARBON_PSET)?;
        let embodied_carbon = pset.get("EmbodiedCarbon")?.as_f64()?;
        let density = pset.get("MassDensity")?.as_f64()?;
        Some(MaterialProperties::new(embodied_carbon, density))
    }
}

/// Carbon data held directly by a complex property
fn carbon_data(property: &Property) -> Option<MaterialProperties> {
    let embodied_carbon = property.get("Embodied Carbon")?.as_f64()?;
    let density = property.get("MassDensity")?.as_f64()?;
    Some(MaterialProperties::new(embodied_carbon, density))
}

/// Extract the building of a parsed model
pub fn extract_building(model: &dyn IfcModel) -> ExtractResult<BuildingModel> {
    ElementExtractor::new(model).extract()
}
