// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Building elements as handed from the extractor to the carbon engine
//!
//! [`ElementSource`] is what the extractor reads out of an IFC file: the
//! element's category, extent, material composition and the material
//! properties attached to it. The engine turns each source into an
//! [`ElementRecord`], which carries the computed carbon per material layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Element categories that contribute embodied carbon
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ElementCategory {
    Wall,
    Slab,
    Roof,
    Door,
    Window,
    Stair,
}

impl ElementCategory {
    /// All categories in processing order
    pub const ALL: [ElementCategory; 6] = [
        ElementCategory::Wall,
        ElementCategory::Slab,
        ElementCategory::Roof,
        ElementCategory::Door,
        ElementCategory::Window,
        ElementCategory::Stair,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ElementCategory::Wall => "Wall",
            ElementCategory::Slab => "Slab",
            ElementCategory::Roof => "Roof",
            ElementCategory::Door => "Door",
            ElementCategory::Window => "Window",
            ElementCategory::Stair => "Stair",
        }
    }

    /// Layered categories are computed per material layer from an area,
    /// the others as a single composite from a volume
    pub fn is_layered(&self) -> bool {
        matches!(
            self,
            ElementCategory::Wall | ElementCategory::Slab | ElementCategory::Roof
        )
    }

    /// BaseQuantities entry holding the element's extent
    pub fn extent_quantity(&self) -> &'static str {
        match self {
            ElementCategory::Wall => "NetSideArea",
            ElementCategory::Slab | ElementCategory::Roof => "NetArea",
            ElementCategory::Door | ElementCategory::Window => "Volume",
            ElementCategory::Stair => "NetVolume",
        }
    }

    /// Common property set carrying `IsExternal`
    pub fn common_pset(&self) -> &'static str {
        match self {
            ElementCategory::Wall => "Pset_WallCommon",
            ElementCategory::Slab | ElementCategory::Roof => "Pset_SlabCommon",
            ElementCategory::Door => "Pset_DoorCommon",
            ElementCategory::Window => "Pset_WindowCommon",
            ElementCategory::Stair => "Pset_StairCommon",
        }
    }

    /// Material name used for a composite element's single layer
    pub fn composite_label(&self) -> String {
        format!("{} Composite", self.name())
    }
}

impl fmt::Display for ElementCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Element extent in SI units
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Extent {
    /// Area in m²
    Area(f64),
    /// Volume in m³
    Volume(f64),
}

impl Extent {
    pub fn value(&self) -> f64 {
        match self {
            Extent::Area(v) | Extent::Volume(v) => *v,
        }
    }

    pub fn is_area(&self) -> bool {
        matches!(self, Extent::Area(_))
    }

    /// Finite and not negative
    pub fn is_valid(&self) -> bool {
        let v = self.value();
        v.is_finite() && v >= 0.0
    }

    /// Whether this extent has the kind the category is computed from
    pub fn fits(&self, category: ElementCategory) -> bool {
        self.is_area() == category.is_layered()
    }
}

/// Embodied carbon data of one material
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialProperties {
    /// kgCO₂e per kg
    pub embodied_carbon: f64,
    /// kg per m³
    pub density: f64,
}

impl MaterialProperties {
    pub fn new(embodied_carbon: f64, density: f64) -> Self {
        Self {
            embodied_carbon,
            density,
        }
    }

    /// kgCO₂e per m³
    pub fn carbon_per_volume(&self) -> f64 {
        self.embodied_carbon * self.density
    }
}

/// One layer of a layered element
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    /// Material or component name as found in the model
    pub name: String,
    /// Thickness in the model's thickness unit (millimetres by default)
    pub thickness: f64,
}

impl LayerSpec {
    pub fn new(name: impl Into<String>, thickness: f64) -> Self {
        Self {
            name: name.into(),
            thickness,
        }
    }
}

/// How an element's carbon is built up
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Composition {
    /// Ordered material layers (walls, slabs, roofs)
    Layers(Vec<LayerSpec>),
    /// Single composite material (doors, windows, stairs); `None` when the
    /// element carries no carbon properties
    Composite(Option<MaterialProperties>),
}

/// An element as extracted from the model, before any carbon is computed
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElementSource {
    pub category: ElementCategory,
    /// `"<Name> (<GlobalId>)"`
    pub identity: String,
    pub is_external: bool,
    pub extent: Extent,
    pub composition: Composition,
    /// Material name to carbon properties
    pub materials: Vec<(String, MaterialProperties)>,
    /// Component name to material name
    pub aliases: Vec<(String, String)>,
}

impl ElementSource {
    /// Create a layered element with no material data yet
    pub fn layered(
        category: ElementCategory,
        identity: impl Into<String>,
        extent: Extent,
        layers: Vec<LayerSpec>,
    ) -> Self {
        Self {
            category,
            identity: identity.into(),
            is_external: false,
            extent,
            composition: Composition::Layers(layers),
            materials: Vec::new(),
            aliases: Vec::new(),
        }
    }

    /// Create a composite element
    pub fn composite(
        category: ElementCategory,
        identity: impl Into<String>,
        extent: Extent,
        properties: Option<MaterialProperties>,
    ) -> Self {
        Self {
            category,
            identity: identity.into(),
            is_external: false,
            extent,
            composition: Composition::Composite(properties),
            materials: Vec::new(),
            aliases: Vec::new(),
        }
    }

    pub fn external(mut self, is_external: bool) -> Self {
        self.is_external = is_external;
        self
    }

    pub fn with_material(mut self, name: impl Into<String>, props: MaterialProperties) -> Self {
        self.materials.push((name.into(), props));
        self
    }

    pub fn with_alias(mut self, component: impl Into<String>, material: impl Into<String>) -> Self {
        self.aliases.push((component.into(), material.into()));
        self
    }

    /// Resolve a layer name to the material it stands for
    ///
    /// A name matching a material directly wins over a component alias.
    pub fn resolve(&self, layer: &str) -> Option<(&str, MaterialProperties)> {
        if let Some((name, props)) = self.materials.iter().find(|(name, _)| name == layer) {
            return Some((name.as_str(), *props));
        }
        let (_, material) = self.aliases.iter().find(|(component, _)| component == layer)?;
        self.materials
            .iter()
            .find(|(name, _)| name == material)
            .map(|(name, props)| (name.as_str(), *props))
    }
}

/// Carbon of one material within an element
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerCarbon {
    pub material: String,
    /// kgCO₂e
    pub carbon: f64,
}

/// An element with its carbon computed per material
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElementRecord {
    pub category: ElementCategory,
    pub identity: String,
    pub is_external: bool,
    pub extent: Extent,
    /// Composition order; one entry per distinct material name
    pub layers: Vec<LayerCarbon>,
}

impl ElementRecord {
    pub fn new(
        category: ElementCategory,
        identity: impl Into<String>,
        is_external: bool,
        extent: Extent,
    ) -> Self {
        Self {
            category,
            identity: identity.into(),
            is_external,
            extent,
            layers: Vec::new(),
        }
    }

    /// Add carbon for a material, accumulating onto an existing entry
    pub fn add_layer(&mut self, material: &str, carbon: f64) {
        match self.layers.iter_mut().find(|l| l.material == material) {
            Some(layer) => layer.carbon += carbon,
            None => self.layers.push(LayerCarbon {
                material: material.to_string(),
                carbon,
            }),
        }
    }

    pub fn total(&self) -> f64 {
        self.layers.iter().map(|l| l.carbon).sum()
    }
}

/// One building's worth of extracted elements
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildingModel {
    /// `"<Name> (<GlobalId>)"` of the IfcBuilding
    pub identity: String,
    /// Single values of Pset_BuildingCommon, in file order
    pub properties: Vec<(String, String)>,
    /// File name the model was read from, if known
    pub source_file: Option<String>,
    /// File length unit to metres; `None` when the file declares none
    pub length_unit_scale: Option<f64>,
    pub elements: Vec<ElementSource>,
}

impl BuildingModel {
    /// Count elements of a category
    pub fn count(&self, category: ElementCategory) -> usize {
        self.elements
            .iter()
            .filter(|e| e.category == category)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_direct_and_alias() {
        let source = ElementSource::layered(
            ElementCategory::Roof,
            "Roof (abc)",
            Extent::Area(10.0),
            vec![LayerSpec::new("Deck", 200.0)],
        )
        .with_material("Concrete", MaterialProperties::new(0.1, 2400.0))
        .with_alias("Deck", "Concrete");

        let (name, props) = source.resolve("Deck").unwrap();
        assert_eq!(name, "Concrete");
        assert_eq!(props.density, 2400.0);
        assert!(source.resolve("Concrete").is_some());
        assert!(source.resolve("Insulation").is_none());
    }

    #[test]
    fn test_extent_kind() {
        assert!(Extent::Area(1.0).fits(ElementCategory::Wall));
        assert!(!Extent::Area(1.0).fits(ElementCategory::Door));
        assert!(Extent::Volume(0.5).fits(ElementCategory::Stair));
        assert!(!Extent::Area(-1.0).is_valid());
        assert!(!Extent::Volume(f64::NAN).is_valid());
    }

    #[test]
    fn test_record_accumulates_same_material() {
        let mut record = ElementRecord::new(
            ElementCategory::Wall,
            "Wall (1)",
            false,
            Extent::Area(10.0),
        );
        record.add_layer("Brick", 100.0);
        record.add_layer("Plaster", 5.0);
        record.add_layer("Brick", 50.0);
        assert_eq!(record.layers.len(), 2);
        assert_eq!(record.layers[0].material, "Brick");
        assert_eq!(record.layers[0].carbon, 150.0);
        assert_eq!(record.total(), 155.0);
    }

    #[test]
    fn test_composite_label() {
        assert_eq!(ElementCategory::Door.composite_label(), "Door Composite");
        assert_eq!(ElementCategory::Roof.common_pset(), "Pset_SlabCommon");
    }
}
