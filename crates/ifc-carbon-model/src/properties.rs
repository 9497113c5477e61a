// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Property and quantity access for IFC entities

use crate::EntityId;
use serde::{Deserialize, Serialize};

/// A single property value with optional unit
///
/// Complex properties (IfcComplexProperty) carry their members in `nested`
/// and an empty `value`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Property name
    pub name: String,
    /// Property value as formatted string
    pub value: String,
    /// Unit of measurement (if applicable)
    pub unit: Option<String>,
    /// Member properties of a complex property
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<Property>,
}

impl Property {
    /// Create a new property
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            unit: None,
            nested: Vec::new(),
        }
    }

    /// Create a complex property holding other properties
    pub fn complex(name: impl Into<String>, nested: Vec<Property>) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
            unit: None,
            nested,
        }
    }

    /// Check if this is a complex property
    pub fn is_complex(&self) -> bool {
        !self.nested.is_empty()
    }

    /// Get a nested property by name
    pub fn get(&self, name: &str) -> Option<&Property> {
        self.nested.iter().find(|p| p.name == name)
    }

    /// Interpret the value as a boolean (`T`, `TRUE`, `F`, `FALSE`)
    pub fn as_bool(&self) -> Option<bool> {
        match self.value.trim().to_uppercase().as_str() {
            "T" | "TRUE" => Some(true),
            "F" | "FALSE" => Some(false),
            _ => None,
        }
    }

    /// Interpret the value as a number
    ///
    /// Authoring tools often export numeric material data as labels with a
    /// unit suffix, e.g. `"0.2 (kgCO₂/kg)"`. Anything from the first `(` on
    /// is ignored and a decimal comma is accepted.
    pub fn as_f64(&self) -> Option<f64> {
        let text = match self.value.find('(') {
            Some(pos) => &self.value[..pos],
            None => self.value.as_str(),
        };
        let text = text.trim().replace(',', ".");
        if text.is_empty() {
            return None;
        }
        text.parse().ok()
    }
}

/// A property set containing multiple properties
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertySet {
    /// Property set name (e.g., "Pset_WallCommon")
    pub name: String,
    /// Properties in this set
    pub properties: Vec<Property>,
}

impl PropertySet {
    /// Create a new property set
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
        }
    }

    /// Add a property to this set
    pub fn add(&mut self, property: Property) {
        self.properties.push(property);
    }

    /// Get a property by name
    pub fn get(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// Quantity types supported in IFC
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuantityType {
    /// Linear measurement (IfcQuantityLength)
    Length,
    /// Area measurement (IfcQuantityArea)
    Area,
    /// Volume measurement (IfcQuantityVolume)
    Volume,
    /// Count (IfcQuantityCount)
    Count,
    /// Weight/mass measurement (IfcQuantityWeight)
    Weight,
    /// Time measurement (IfcQuantityTime)
    Time,
    /// Group of quantities (IfcPhysicalComplexQuantity)
    Complex,
}

impl QuantityType {
    /// Get default unit for this quantity type
    pub fn default_unit(&self) -> &'static str {
        match self {
            QuantityType::Length => "m",
            QuantityType::Area => "m²",
            QuantityType::Volume => "m³",
            QuantityType::Count => "",
            QuantityType::Weight => "kg",
            QuantityType::Time => "s",
            QuantityType::Complex => "",
        }
    }
}

/// A quantity value with type and unit
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    /// Quantity name
    pub name: String,
    /// Numeric value (zero for complex quantities)
    pub value: f64,
    /// Unit of measurement
    pub unit: String,
    /// Type of quantity
    pub quantity_type: QuantityType,
    /// Member quantities of a physical complex quantity
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Quantity>,
}

impl Quantity {
    /// Create a new quantity
    pub fn new(name: impl Into<String>, value: f64, quantity_type: QuantityType) -> Self {
        Self {
            name: name.into(),
            value,
            unit: quantity_type.default_unit().to_string(),
            quantity_type,
            components: Vec::new(),
        }
    }

    /// Create a complex quantity grouping other quantities
    pub fn complex(name: impl Into<String>, components: Vec<Quantity>) -> Self {
        Self {
            name: name.into(),
            value: 0.0,
            unit: String::new(),
            quantity_type: QuantityType::Complex,
            components,
        }
    }

    /// Get a member quantity by name
    pub fn component(&self, name: &str) -> Option<&Quantity> {
        self.components.iter().find(|q| q.name == name)
    }

    /// Format the value with unit
    pub fn formatted(&self) -> String {
        if self.unit.is_empty() {
            format!("{}", self.value)
        } else {
            format!("{} {}", self.value, self.unit)
        }
    }
}

/// A named element quantity set (e.g., "BaseQuantities")
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuantitySet {
    /// Quantity set name
    pub name: String,
    /// Quantities in this set
    pub quantities: Vec<Quantity>,
}

impl QuantitySet {
    /// Get a quantity by name
    pub fn get(&self, name: &str) -> Option<&Quantity> {
        self.quantities.iter().find(|q| q.name == name)
    }
}

/// Property and quantity reader trait
///
/// Provides access to property sets and quantities associated with IFC entities.
/// Property sets come from IfcPropertySet entities linked via IfcRelDefinesByProperties.
/// Quantities come from IfcElementQuantity entities.
///
/// # Example
///
/// ```ignore
/// use ifc_carbon_model::{PropertyReader, EntityId};
///
/// fn is_external(props: &dyn PropertyReader, wall_id: EntityId) -> bool {
///     props
///         .property_set(wall_id, "Pset_WallCommon")
///         .and_then(|pset| pset.get("IsExternal").and_then(|p| p.as_bool()))
///         .unwrap_or(false)
/// }
/// ```
pub trait PropertyReader: Send + Sync {
    /// Get all property sets associated with an entity
    fn property_sets(&self, id: EntityId) -> Vec<PropertySet>;

    /// Get all element quantity sets associated with an entity
    fn quantity_sets(&self, id: EntityId) -> Vec<QuantitySet>;

    /// Get a property set by name
    fn property_set(&self, id: EntityId, name: &str) -> Option<PropertySet> {
        self.property_sets(id).into_iter().find(|pset| pset.name == name)
    }

    /// Get a quantity set by name
    fn quantity_set(&self, id: EntityId, name: &str) -> Option<QuantitySet> {
        self.quantity_sets(id).into_iter().find(|qset| qset.name == name)
    }

    /// Get all quantities associated with an entity, across quantity sets
    fn quantities(&self, id: EntityId) -> Vec<Quantity> {
        self.quantity_sets(id)
            .into_iter()
            .flat_map(|qset| qset.quantities)
            .collect()
    }

    /// Get the type object assigned through IfcRelDefinesByType
    fn type_object(&self, id: EntityId) -> Option<EntityId>;

    /// Get entity's GlobalId (GUID)
    fn global_id(&self, id: EntityId) -> Option<String>;

    /// Get entity's Name attribute
    fn name(&self, id: EntityId) -> Option<String>;
}
