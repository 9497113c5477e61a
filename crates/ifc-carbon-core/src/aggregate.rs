// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Carbon Aggregator
//!
//! Turns extracted elements into per-element carbon records and folds those
//! into material, element-bucket and building totals.
//!
//! Layered elements (walls, slabs, roofs):
//!
//! ```text
//! carbon = thickness / units_per_metre × area × embodied_carbon × density
//! ```
//!
//! Composite elements (doors, windows, stairs):
//!
//! ```text
//! carbon = embodied_carbon × density × volume
//! ```

use crate::config::{LengthUnit, NameMatching};
use crate::error::{CarbonError, Result};
use crate::totals::Tally;
use ifc_carbon_model::{
    BuildingModel, Composition, ElementCategory, ElementRecord, ElementSource,
};
use rustc_hash::FxHashMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// How layer thicknesses convert to metres
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct UnitConvention {
    pub thickness_units_per_metre: f64,
}

impl Default for UnitConvention {
    fn default() -> Self {
        Self::MILLIMETRES
    }
}

impl UnitConvention {
    pub const MILLIMETRES: Self = Self {
        thickness_units_per_metre: 1000.0,
    };

    pub fn from_unit(unit: LengthUnit) -> Self {
        Self {
            thickness_units_per_metre: unit.units_per_metre(),
        }
    }

    /// Convention for a file length unit given as metres per unit
    pub fn from_length_unit_scale(scale: f64) -> Option<Self> {
        (scale.is_finite() && scale > 0.0).then(|| Self {
            thickness_units_per_metre: 1.0 / scale,
        })
    }

    /// Derived from the model's length unit, millimetres if it declares none
    pub fn for_model(model: &BuildingModel) -> Self {
        model
            .length_unit_scale
            .and_then(Self::from_length_unit_scale)
            .unwrap_or_default()
    }
}

/// Element category split by the external flag
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementBucket {
    pub category: ElementCategory,
    pub is_external: bool,
}

impl ElementBucket {
    pub fn new(category: ElementCategory, is_external: bool) -> Self {
        Self {
            category,
            is_external,
        }
    }

    pub fn of(record: &ElementRecord) -> Self {
        Self::new(record.category, record.is_external)
    }
}

/// `Wall`, `ExternalWall`, ...
impl fmt::Display for ElementBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_external {
            f.write_str("External")?;
        }
        f.write_str(self.category.name())
    }
}

impl Serialize for ElementBucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Carbon totals at material, bucket and building level (kgCO₂e)
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AggregateTotals {
    pub material_counts: Tally<String>,
    pub element_counts: Tally<ElementBucket>,
    /// m² of internal slabs
    pub building_area_internal: f64,
    pub building_ec: f64,
    /// kgCO₂e per m² of internal floor area
    pub building_ec_per_area_internal: f64,
}

impl AggregateTotals {
    /// Fold element records into totals
    ///
    /// Fails with [`CarbonError::ZeroFloorArea`] when the records hold no
    /// internal slab area.
    pub fn from_records(records: &[ElementRecord]) -> Result<Self> {
        Self::with_floor_area(records, internal_floor_area(records))
    }

    /// Fold element records into totals normalised by a given floor area
    pub fn with_floor_area(records: &[ElementRecord], building_area_internal: f64) -> Result<Self> {
        if !(building_area_internal > 0.0) {
            return Err(CarbonError::ZeroFloorArea);
        }

        let mut material_counts = Tally::new();
        let mut element_counts = Tally::new();
        for record in records {
            for layer in &record.layers {
                material_counts.add(layer.material.clone(), layer.carbon);
                element_counts.add(ElementBucket::of(record), layer.carbon);
            }
        }

        let building_ec = element_counts.total();
        Ok(Self {
            material_counts,
            element_counts,
            building_area_internal,
            building_ec,
            building_ec_per_area_internal: building_ec / building_area_internal,
        })
    }
}

/// Summed extent of slabs not marked external
pub fn internal_floor_area(records: &[ElementRecord]) -> f64 {
    records
        .iter()
        .filter(|r| r.category == ElementCategory::Slab && !r.is_external)
        .map(|r| r.extent.value())
        .sum()
}

/// First-seen spelling of each material name
///
/// Names equal under the matching rule share one spelling, so `Brick` and
/// `brick` land in a single material total.
#[derive(Debug, Default)]
pub struct MaterialSpellings {
    matching: NameMatching,
    first: FxHashMap<String, String>,
}

impl MaterialSpellings {
    pub fn new(matching: NameMatching) -> Self {
        Self {
            matching,
            first: FxHashMap::default(),
        }
    }

    /// Spelling to record `name` under, registering it when unseen
    pub fn canonical(&mut self, name: &str) -> String {
        let key = self.matching.key(name);
        let spelling = self.first.entry(key).or_insert_with(|| name.to_string());
        if spelling.as_str() != name {
            log::debug!("Material '{}' counted as '{}'", name, spelling);
        }
        spelling.clone()
    }
}

/// Computes element carbon under a unit convention
#[derive(Clone, Copy, Debug, Default)]
pub struct Aggregator {
    units: UnitConvention,
    matching: NameMatching,
}

impl Aggregator {
    pub fn new(units: UnitConvention) -> Self {
        Self {
            units,
            matching: NameMatching::default(),
        }
    }

    /// Rule under which material names count as the same material
    pub fn with_name_matching(mut self, matching: NameMatching) -> Self {
        self.matching = matching;
        self
    }

    pub fn units(&self) -> UnitConvention {
        self.units
    }

    /// Compute the carbon of one element
    pub fn element_record(&self, source: &ElementSource) -> Result<ElementRecord> {
        self.record(source, &mut MaterialSpellings::new(self.matching))
    }

    fn record(
        &self,
        source: &ElementSource,
        spellings: &mut MaterialSpellings,
    ) -> Result<ElementRecord> {
        let extent = source.extent;
        if !extent.is_valid() {
            return Err(CarbonError::InvalidExtent {
                element: source.identity.clone(),
                value: extent.value(),
            });
        }
        if !extent.fits(source.category) {
            return Err(CarbonError::ExtentMismatch {
                element: source.identity.clone(),
                category: source.category,
                expected: if source.category.is_layered() {
                    "an area"
                } else {
                    "a volume"
                },
            });
        }

        let mut record = ElementRecord::new(
            source.category,
            source.identity.clone(),
            source.is_external,
            extent,
        );

        match &source.composition {
            Composition::Layers(layers) => {
                for layer in layers {
                    let (material, props) = source
                        .resolve(&layer.name)
                        .ok_or_else(|| CarbonError::unresolved(&source.identity, &layer.name))?;
                    if !layer.thickness.is_finite() || layer.thickness < 0.0 {
                        return Err(CarbonError::InvalidThickness {
                            element: source.identity.clone(),
                            material: material.to_string(),
                            value: layer.thickness,
                        });
                    }
                    let depth = layer.thickness / self.units.thickness_units_per_metre;
                    record.add_layer(
                        &spellings.canonical(material),
                        depth * extent.value() * props.carbon_per_volume(),
                    );
                }
            }
            Composition::Composite(props) => {
                let label = source.category.composite_label();
                let props = props
                    .as_ref()
                    .ok_or_else(|| CarbonError::unresolved(&source.identity, &label))?;
                record.add_layer(&spellings.canonical(&label), props.carbon_per_volume() * extent.value());
            }
        }

        log::debug!(
            "{} {}: {:.3} kgCO2e",
            source.category,
            source.identity,
            record.total()
        );
        Ok(record)
    }

    /// Compute the carbon of every element, in order
    ///
    /// Material names share their first-seen spelling across all elements.
    pub fn element_records(&self, sources: &[ElementSource]) -> Result<Vec<ElementRecord>> {
        let mut spellings = MaterialSpellings::new(self.matching);
        sources
            .iter()
            .map(|s| self.record(s, &mut spellings))
            .collect()
    }

    /// Compute records and fold them into totals
    pub fn aggregate(
        &self,
        sources: &[ElementSource],
    ) -> Result<(Vec<ElementRecord>, AggregateTotals)> {
        let records = self.element_records(sources)?;
        let totals = AggregateTotals::from_records(&records)?;
        Ok((records, totals))
    }
}
