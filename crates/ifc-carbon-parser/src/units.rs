// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Length unit extraction from IFC files

use ifc_carbon_model::{AttributeValue, DecodedEntity, EntityResolver, IfcType};

/// Extract the length unit scale (file units to metres)
///
/// Reads the unit assignment of the IfcProject (UnitsInContext at 8), or the
/// first IfcUnitAssignment when the project has none. Returns `None` if the
/// file declares no length unit.
pub fn extract_length_unit_scale(resolver: &dyn EntityResolver) -> Option<f64> {
    let from_project = resolver
        .entities_by_type(&IfcType::IfcProject)
        .first()
        .and_then(|project| project.get(8).and_then(|units| resolver.resolve_ref(units)));

    let assignment = match from_project {
        Some(assignment) => assignment,
        None => resolver
            .entities_by_type(&IfcType::IfcUnitAssignment)
            .into_iter()
            .next()?,
    };

    // Units list at 0
    resolver
        .resolve_ref_list(assignment.get(0)?)
        .iter()
        .find_map(|unit| length_unit_scale(unit, resolver))
}

/// Scale of a unit entity if it is a length unit
fn length_unit_scale(unit: &DecodedEntity, resolver: &dyn EntityResolver) -> Option<f64> {
    match unit.ifc_type {
        IfcType::IfcSIUnit => si_unit_scale(unit),
        IfcType::IfcConversionBasedUnit => conversion_unit_scale(unit, resolver),
        _ => None,
    }
}

/// IFCSIUNIT(*, UnitType, Prefix, Name)
fn si_unit_scale(unit: &DecodedEntity) -> Option<f64> {
    if unit.get_enum(1)? != "LENGTHUNIT" || unit.get_enum(3)? != "METRE" {
        return None;
    }

    let prefix = match unit.get(2) {
        Some(AttributeValue::Enum(p)) => si_prefix(p),
        _ => 1.0,
    };

    Some(prefix)
}

fn si_prefix(prefix: &str) -> f64 {
    match prefix {
        "EXA" => 1e18,
        "PETA" => 1e15,
        "TERA" => 1e12,
        "GIGA" => 1e9,
        "MEGA" => 1e6,
        "KILO" => 1e3,
        "HECTO" => 1e2,
        "DECA" => 1e1,
        "DECI" => 1e-1,
        "CENTI" => 1e-2,
        "MILLI" => 1e-3,
        "MICRO" => 1e-6,
        "NANO" => 1e-9,
        "PICO" => 1e-12,
        "FEMTO" => 1e-15,
        "ATTO" => 1e-18,
        _ => 1.0,
    }
}

/// IFCCONVERSIONBASEDUNIT(Dimensions, UnitType, Name, ConversionFactor)
fn conversion_unit_scale(unit: &DecodedEntity, resolver: &dyn EntityResolver) -> Option<f64> {
    if unit.get_enum(1)? != "LENGTHUNIT" {
        return None;
    }

    // IFCMEASUREWITHUNIT(ValueComponent, UnitComponent)
    let factor = resolver.get(unit.get_ref(3)?)?;
    if factor.ifc_type != IfcType::IfcMeasureWithUnit {
        return None;
    }

    let value = factor.get_float(0)?;
    let base_scale = factor
        .get_ref(1)
        .and_then(|id| resolver.get(id))
        .and_then(|base| length_unit_scale(&base, resolver))
        .unwrap_or(1.0);

    Some(value * base_scale)
}
