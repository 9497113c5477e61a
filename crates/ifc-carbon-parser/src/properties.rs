// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! PropertyReader trait implementation

use ifc_carbon_model::{
    AttributeValue, DecodedEntity, EntityId, EntityResolver, IfcType, Property, PropertyReader,
    PropertySet, Quantity, QuantitySet, QuantityType,
};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Complex properties and quantities nest; anything deeper is malformed
const MAX_NESTING: usize = 8;

/// Property reader implementation
pub struct PropertyReaderImpl {
    /// Reference to resolver for entity lookups
    resolver: Arc<dyn EntityResolver>,
    /// Cache: entity ID -> property set IDs
    pset_cache: FxHashMap<u32, Vec<EntityId>>,
    /// Cache: entity ID -> quantity set IDs
    qset_cache: FxHashMap<u32, Vec<EntityId>>,
    /// Cache: entity ID -> type object ID
    type_cache: FxHashMap<u32, EntityId>,
}

impl PropertyReaderImpl {
    /// Create a new property reader
    pub fn new(resolver: Arc<dyn EntityResolver>) -> Self {
        let mut pset_cache: FxHashMap<u32, Vec<EntityId>> = FxHashMap::default();
        let mut qset_cache: FxHashMap<u32, Vec<EntityId>> = FxHashMap::default();
        let mut type_cache: FxHashMap<u32, EntityId> = FxHashMap::default();

        // IfcRelDefinesByProperties: RelatedObjects at 4, RelatingPropertyDefinition at 5
        for rel in resolver.entities_by_type(&IfcType::IfcRelDefinesByProperties) {
            let (Some(related_ids), Some(pset_id)) = (rel.get_refs(4), rel.get_ref(5)) else {
                continue;
            };

            if let Some(pset) = resolver.get(pset_id) {
                let cache = match pset.ifc_type {
                    IfcType::IfcPropertySet => &mut pset_cache,
                    IfcType::IfcElementQuantity => &mut qset_cache,
                    _ => continue,
                };

                for related_id in related_ids {
                    cache.entry(related_id.0).or_default().push(pset_id);
                }
            }
        }

        // IfcRelDefinesByType: RelatedObjects at 4, RelatingType at 5
        for rel in resolver.entities_by_type(&IfcType::IfcRelDefinesByType) {
            let (Some(related_ids), Some(type_id)) = (rel.get_refs(4), rel.get_ref(5)) else {
                continue;
            };
            for related_id in related_ids {
                type_cache.insert(related_id.0, type_id);
            }
        }

        Self {
            resolver,
            pset_cache,
            qset_cache,
            type_cache,
        }
    }

    /// Resolve a list of references and convert each with `convert`
    fn collect_refs<T>(
        &self,
        refs: Option<&[AttributeValue]>,
        mut convert: impl FnMut(&DecodedEntity) -> Option<T>,
    ) -> Vec<T> {
        refs.unwrap_or_default()
            .iter()
            .filter_map(|r| self.resolver.resolve_ref(r))
            .filter_map(|entity| convert(entity.as_ref()))
            .collect()
    }

    /// Extract properties from a property set entity (HasProperties at 4)
    fn extract_properties(&self, pset: &DecodedEntity) -> Vec<Property> {
        self.collect_refs(pset.get_list(4), |prop| {
            self.extract_single_property(prop, 0)
        })
    }

    /// Extract a single property from an IfcProperty entity
    fn extract_single_property(&self, prop: &DecodedEntity, depth: usize) -> Option<Property> {
        let name = prop.get_string(0)?.to_string();

        match prop.ifc_type {
            IfcType::IfcPropertySingleValue => {
                // NominalValue at 2, Unit at 3
                let value = self.format_value(prop.get(2)?);
                let unit = prop.get(3).and_then(|v| self.extract_unit(v));
                Some(Property {
                    name,
                    value,
                    unit,
                    nested: Vec::new(),
                })
            }
            IfcType::IfcPropertyEnumeratedValue | IfcType::IfcPropertyListValue => {
                // EnumerationValues / ListValues at 2
                let values = prop
                    .get_list(2)?
                    .iter()
                    .map(|v| self.format_value(v))
                    .collect::<Vec<_>>()
                    .join(", ");
                Some(Property::new(name, values))
            }
            IfcType::IfcPropertyBoundedValue => {
                // UpperBoundValue at 2, LowerBoundValue at 3
                let upper = prop.get(2).filter(|v| !v.is_null()).map(|v| self.format_value(v));
                let lower = prop.get(3).filter(|v| !v.is_null()).map(|v| self.format_value(v));
                let value = match (lower, upper) {
                    (Some(l), Some(u)) => format!("{} - {}", l, u),
                    (Some(l), None) => format!(">= {}", l),
                    (None, Some(u)) => format!("<= {}", u),
                    _ => return None,
                };
                Some(Property::new(name, value))
            }
            IfcType::IfcComplexProperty if depth < MAX_NESTING => {
                // UsageName at 2, HasProperties at 3
                let nested = self.collect_refs(prop.get_list(3), |member| {
                    self.extract_single_property(member, depth + 1)
                });
                Some(Property::complex(name, nested))
            }
            _ => None,
        }
    }

    /// Format an attribute value as a string
    ///
    /// Floats keep their shortest round-trip representation so numeric
    /// labels parse back to the same value.
    fn format_value(&self, attr: &AttributeValue) -> String {
        match attr {
            AttributeValue::String(s) => s.clone(),
            AttributeValue::Integer(i) => i.to_string(),
            AttributeValue::Float(f) => f.to_string(),
            AttributeValue::Bool(b) => b.to_string(),
            AttributeValue::Enum(e) => e.clone(),
            AttributeValue::TypedValue(_, args) if !args.is_empty() => self.format_value(&args[0]),
            AttributeValue::Null => String::new(),
            _ => format!("{:?}", attr),
        }
    }

    /// Extract unit from a unit reference
    fn extract_unit(&self, attr: &AttributeValue) -> Option<String> {
        let unit = self.resolver.resolve_ref(attr)?;

        match unit.ifc_type {
            IfcType::IfcSIUnit => {
                let prefix = unit.get_enum(2).unwrap_or("");
                let name = unit.get_enum(3)?;
                let prefix_str = match prefix {
                    "MILLI" => "m",
                    "CENTI" => "c",
                    "KILO" => "k",
                    _ => "",
                };
                let unit_str = match name {
                    "METRE" => "m",
                    "SQUARE_METRE" => "m²",
                    "CUBIC_METRE" => "m³",
                    "GRAM" => "g",
                    "SECOND" => "s",
                    _ => name,
                };
                Some(format!("{}{}", prefix_str, unit_str))
            }
            // Name at 2
            IfcType::IfcConversionBasedUnit => unit.get_string(2).map(|s| s.to_string()),
            _ => None,
        }
    }

    /// Extract quantities from an element quantity entity (Quantities at 5)
    fn extract_quantities(&self, qset: &DecodedEntity) -> Vec<Quantity> {
        self.collect_refs(qset.get_list(5), |qty| {
            self.extract_single_quantity(qty, 0)
        })
    }

    /// Extract a single quantity from an IfcPhysicalQuantity entity
    fn extract_single_quantity(&self, qty: &DecodedEntity, depth: usize) -> Option<Quantity> {
        let name = qty.get_string(0)?.to_string();

        // Simple quantities hold their value at 3
        let (value, quantity_type) = match qty.ifc_type {
            IfcType::IfcQuantityLength => (qty.get_float(3)?, QuantityType::Length),
            IfcType::IfcQuantityArea => (qty.get_float(3)?, QuantityType::Area),
            IfcType::IfcQuantityVolume => (qty.get_float(3)?, QuantityType::Volume),
            IfcType::IfcQuantityCount => (qty.get_float(3)?, QuantityType::Count),
            IfcType::IfcQuantityWeight => (qty.get_float(3)?, QuantityType::Weight),
            IfcType::IfcQuantityTime => (qty.get_float(3)?, QuantityType::Time),
            IfcType::IfcPhysicalComplexQuantity if depth < MAX_NESTING => {
                // HasQuantities at 2
                let components = self.collect_refs(qty.get_list(2), |member| {
                    self.extract_single_quantity(member, depth + 1)
                });
                return Some(Quantity::complex(name, components));
            }
            _ => return None,
        };

        Some(Quantity::new(name, value, quantity_type))
    }
}

impl PropertyReader for PropertyReaderImpl {
    fn property_sets(&self, id: EntityId) -> Vec<PropertySet> {
        let Some(pset_ids) = self.pset_cache.get(&id.0) else {
            return Vec::new();
        };

        pset_ids
            .iter()
            .filter_map(|pset_id| self.resolver.get(*pset_id))
            .filter_map(|pset| {
                // Name at 2
                let name = pset.get_string(2).unwrap_or("Unknown").to_string();
                let properties = self.extract_properties(&pset);
                (!properties.is_empty()).then_some(PropertySet { name, properties })
            })
            .collect()
    }

    fn quantity_sets(&self, id: EntityId) -> Vec<QuantitySet> {
        let Some(qset_ids) = self.qset_cache.get(&id.0) else {
            return Vec::new();
        };

        qset_ids
            .iter()
            .filter_map(|qset_id| self.resolver.get(*qset_id))
            .map(|qset| QuantitySet {
                name: qset.get_string(2).unwrap_or("Unknown").to_string(),
                quantities: self.extract_quantities(&qset),
            })
            .collect()
    }

    fn type_object(&self, id: EntityId) -> Option<EntityId> {
        self.type_cache.get(&id.0).copied()
    }

    fn global_id(&self, id: EntityId) -> Option<String> {
        let entity = self.resolver.get(id)?;
        // GlobalId is at index 0 for rooted entities
        entity.get_string(0).map(|s| s.to_string())
    }

    fn name(&self, id: EntityId) -> Option<String> {
        let entity = self.resolver.get(id)?;
        // Name is at index 2 for rooted entities
        entity.get_string(2).map(|s| s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::ResolverImpl;
    use approx::assert_relative_eq;

    const TEST_IFC: &str = r#"ISO-10303-21;
HEADER;
FILE_SCHEMA(('IFC2X3'));
ENDSEC;
DATA;
#10=IFCSLAB('slab-guid',$,'Roof Slab',$,$,$,$,$,.FLOOR.);
#11=IFCSLABTYPE('type-guid',$,'Roof Type',$,$,$,$,$,$,.ROOF.);
#12=IFCRELDEFINESBYTYPE('rel1',$,$,$,(#10),#11);
#20=IFCPROPERTYSINGLEVALUE('IsExternal',$,IFCBOOLEAN(.T.),$);
#21=IFCPROPERTYSET('pset1',$,'Pset_SlabCommon',$,(#20));
#22=IFCRELDEFINESBYPROPERTIES('rel2',$,$,$,(#10),#21);
#30=IFCPROPERTYSINGLEVALUE('Embodied Carbon',$,IFCLABEL('0.159 (kgCO\X2\2082\X0\/kg)'),$);
#31=IFCPROPERTYSINGLEVALUE('MassDensity',$,IFCMASSDENSITYMEASURE(2400.5),$);
#32=IFCCOMPLEXPROPERTY('Concrete',$,'Material',(#30,#31));
#33=IFCCOMPLEXPROPERTY('Deck',$,'Component',(#32));
#34=IFCPROPERTYSET('pset2',$,'Material Properties',$,(#33));
#35=IFCRELDEFINESBYPROPERTIES('rel3',$,$,$,(#10),#34);
#40=IFCQUANTITYAREA('NetArea',$,$,48.25);
#41=IFCQUANTITYLENGTH('Skin Thickness',$,$,200.0);
#42=IFCPHYSICALCOMPLEXQUANTITY('Deck',$,(#41),'Layer',$,$);
#43=IFCELEMENTQUANTITY('q1',$,'BaseQuantities',$,$,(#40));
#44=IFCELEMENTQUANTITY('q2',$,'Component Quantities',$,$,(#42));
#45=IFCRELDEFINESBYPROPERTIES('rel4',$,$,$,(#10),#43);
#46=IFCRELDEFINESBYPROPERTIES('rel5',$,$,$,(#10),#44);
ENDSEC;
END-ISO-10303-21;
"#;

    fn reader() -> PropertyReaderImpl {
        let resolver = Arc::new(ResolverImpl::new(TEST_IFC.to_string()));
        PropertyReaderImpl::new(resolver)
    }

    #[test]
    fn test_single_value_boolean() {
        let props = reader();
        let pset = props.property_set(EntityId(10), "Pset_SlabCommon").unwrap();
        assert_eq!(pset.get("IsExternal").unwrap().as_bool(), Some(true));
    }

    #[test]
    fn test_complex_properties_nest() {
        let props = reader();
        let pset = props
            .property_set(EntityId(10), "Material Properties")
            .unwrap();

        let deck = pset.get("Deck").unwrap();
        let concrete = deck.get("Concrete").unwrap();
        let ec = concrete.get("Embodied Carbon").unwrap();
        assert_eq!(ec.value, "0.159 (kgCO₂/kg)");
        assert_relative_eq!(ec.as_f64().unwrap(), 0.159);
        assert_relative_eq!(concrete.get("MassDensity").unwrap().as_f64().unwrap(), 2400.5);
    }

    #[test]
    fn test_quantity_sets() {
        let props = reader();
        let base = props.quantity_set(EntityId(10), "BaseQuantities").unwrap();
        assert_relative_eq!(base.get("NetArea").unwrap().value, 48.25);

        let components = props
            .quantity_set(EntityId(10), "Component Quantities")
            .unwrap();
        let deck = components.get("Deck").unwrap();
        assert_eq!(deck.quantity_type, QuantityType::Complex);
        assert_relative_eq!(deck.component("Skin Thickness").unwrap().value, 200.0);

        assert_eq!(props.quantities(EntityId(10)).len(), 2);
    }

    #[test]
    fn test_type_object_and_names() {
        let props = reader();
        assert_eq!(props.type_object(EntityId(10)), Some(EntityId(11)));
        assert_eq!(props.type_object(EntityId(11)), None);
        assert_eq!(props.name(EntityId(10)).as_deref(), Some("Roof Slab"));
        assert_eq!(props.global_id(EntityId(10)).as_deref(), Some("slab-guid"));
    }
}
