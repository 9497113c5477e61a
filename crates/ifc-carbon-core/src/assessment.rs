// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Full assessment of one building: aggregate, search replacements, project

use crate::aggregate::{AggregateTotals, Aggregator, UnitConvention};
use crate::config::CarbonConfig;
use crate::database::{MaterialDatabase, MaterialRecord};
use crate::error::Result;
use crate::projector::Projector;
use crate::replacement::{ReplacementFinder, ReplacementSearch};
use ifc_carbon_model::{BuildingModel, ElementRecord};
use serde::Serialize;

/// A material with a lower-carbon alternative, for presentation
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReplacementCandidate {
    pub material: String,
    /// kgCO₂e of the material across the building
    pub actual_carbon: f64,
    /// kgCO₂e after substitution
    pub potential_carbon: f64,
    /// The material's own database row
    pub original: MaterialRecord,
    /// Class rows at the minimum carbon per volume
    pub alternatives: Vec<MaterialRecord>,
}

/// Building-level scalars
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BuildingSummary {
    pub identity: String,
    pub properties: Vec<(String, String)>,
    pub source_file: Option<String>,
    pub building_area_internal: f64,
    pub building_ec: f64,
    pub building_ec_per_area_internal: f64,
    pub potential_building_ec: f64,
    pub potential_building_ec_per_area_internal: f64,
    pub potential_saving: f64,
}

/// Everything one run produces
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CarbonAssessment {
    pub summary: BuildingSummary,
    pub units: UnitConvention,
    pub actual: AggregateTotals,
    pub potential: AggregateTotals,
    /// Ordered by descending actual material carbon
    pub replacements: Vec<ReplacementCandidate>,
    /// Materials with no database row
    pub unmatched: Vec<String>,
    pub elements: Vec<ElementRecord>,
}

impl CarbonAssessment {
    /// Serialize as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Assess a building against a material database
pub fn assess(
    model: &BuildingModel,
    database: &MaterialDatabase,
    config: &CarbonConfig,
) -> Result<CarbonAssessment> {
    let units = config
        .thickness_unit
        .map(UnitConvention::from_unit)
        .unwrap_or_else(|| UnitConvention::for_model(model));
    log::info!(
        "Computing carbon of {} elements ({} thickness units per metre)",
        model.elements.len(),
        units.thickness_units_per_metre
    );

    let (records, actual) = Aggregator::new(units)
        .with_name_matching(config.name_matching)
        .aggregate(&model.elements)?;

    log::info!("Searching replacements");
    let materials = actual.material_counts.keys().map(String::as_str);
    let search = ReplacementFinder::new(database)
        .with_tolerance(config.tolerance)
        .search(materials);

    let potential = Projector::new(&search).project(&records, &actual)?;
    let replacements = candidates(&actual, &potential, &search);

    let summary = BuildingSummary {
        identity: model.identity.clone(),
        properties: model.properties.clone(),
        source_file: model.source_file.clone(),
        building_area_internal: actual.building_area_internal,
        building_ec: actual.building_ec,
        building_ec_per_area_internal: actual.building_ec_per_area_internal,
        potential_building_ec: potential.building_ec,
        potential_building_ec_per_area_internal: potential.building_ec_per_area_internal,
        potential_saving: actual.building_ec - potential.building_ec,
    };
    log::info!(
        "Building {}: {:.0} kgCO2e, potential {:.0} kgCO2e",
        summary.identity,
        summary.building_ec,
        summary.potential_building_ec
    );

    Ok(CarbonAssessment {
        summary,
        units,
        actual,
        potential,
        replacements,
        unmatched: search.unmatched,
        elements: records,
    })
}

fn candidates(
    actual: &AggregateTotals,
    potential: &AggregateTotals,
    search: &ReplacementSearch,
) -> Vec<ReplacementCandidate> {
    actual
        .material_counts
        .ranked()
        .into_iter()
        .filter_map(|(material, carbon)| {
            let found = search.get(material).filter(|m| m.has_replacement())?;
            Some(ReplacementCandidate {
                material: material.clone(),
                actual_carbon: carbon,
                potential_carbon: potential
                    .material_counts
                    .get(material.as_str())
                    .unwrap_or(carbon),
                original: found.record.clone(),
                alternatives: found.alternatives.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatabaseFormat, NameMatching};
    use crate::error::CarbonError;
    use approx::assert_relative_eq;
    use ifc_carbon_model::{ElementCategory, ElementSource, Extent, LayerSpec, MaterialProperties};

    const DATABASE: &str = "ID;Name;EmbodiedCarbon(kgCO2e/kg);Density
EC-BR-01;Brick;0,2;1800
EC-BR-02;Reclaimed Brick;0,05;1800
EC-CO-01;Concrete;0,1;2400
EC-CO-02;GGBS Concrete;0,075;2400
";

    fn model() -> BuildingModel {
        let concrete = MaterialProperties::new(0.1, 2400.0);
        BuildingModel {
            identity: "House (b1)".to_string(),
            properties: vec![("YearOfConstruction".to_string(), "2021".to_string())],
            source_file: Some("house.ifc".to_string()),
            length_unit_scale: Some(0.001),
            elements: vec![
                ElementSource::layered(
                    ElementCategory::Wall,
                    "Wall (1)",
                    Extent::Area(10.0),
                    vec![LayerSpec::new("Brick", 100.0)],
                )
                .with_material("Brick", MaterialProperties::new(0.2, 1800.0)),
                ElementSource::layered(
                    ElementCategory::Slab,
                    "Floor (2)",
                    Extent::Area(50.0),
                    vec![LayerSpec::new("Concrete", 200.0)],
                )
                .with_material("Concrete", concrete),
                ElementSource::composite(
                    ElementCategory::Door,
                    "Door (3)",
                    Extent::Volume(0.1),
                    Some(MaterialProperties::new(1.5, 600.0)),
                ),
            ],
        }
    }

    fn database() -> MaterialDatabase {
        MaterialDatabase::parse(DATABASE, &DatabaseFormat::default(), NameMatching::default()).unwrap()
    }

    #[test]
    fn test_assessment_summary() {
        let assessment = assess(&model(), &database(), &CarbonConfig::default()).unwrap();
        let summary = &assessment.summary;

        // Brick 360, Concrete 2400, door 90
        assert_relative_eq!(summary.building_ec, 2850.0, max_relative = 1e-12);
        assert_relative_eq!(summary.building_area_internal, 50.0);
        assert_relative_eq!(summary.building_ec_per_area_internal, 57.0, max_relative = 1e-12);
        // Brick 90, Concrete 1800, door 90
        assert_relative_eq!(summary.potential_building_ec, 1980.0, max_relative = 1e-12);
        assert_relative_eq!(summary.potential_saving, 870.0, max_relative = 1e-9);
        assert_eq!(assessment.unmatched, vec!["Door Composite"]);
    }

    #[test]
    fn test_candidates_by_descending_carbon() {
        let assessment = assess(&model(), &database(), &CarbonConfig::default()).unwrap();
        let materials: Vec<_> = assessment
            .replacements
            .iter()
            .map(|c| c.material.as_str())
            .collect();
        assert_eq!(materials, vec!["Concrete", "Brick"]);

        let concrete = &assessment.replacements[0];
        assert_eq!(concrete.original.name, "Concrete");
        assert_eq!(concrete.alternatives[0].name, "GGBS Concrete");
        assert_relative_eq!(concrete.potential_carbon, 1800.0, max_relative = 1e-12);
    }

    #[test]
    fn test_unlisted_composite_label_keeps_actual_carbon() {
        let assessment = assess(&model(), &database(), &CarbonConfig::default()).unwrap();
        assert!(assessment.unmatched.iter().any(|m| m == "Door Composite"));
        assert_eq!(
            assessment.potential.material_counts.get("Door Composite"),
            assessment.actual.material_counts.get("Door Composite")
        );
    }

    #[test]
    fn test_composite_label_replacement() {
        let content = format!("{}EC-DO-01;Door Composite;1,5;600\nEC-DO-02;Timber Door Composite;0,5;600\n", DATABASE);
        let database =
            MaterialDatabase::parse(&content, &DatabaseFormat::default(), NameMatching::default()).unwrap();
        let assessment = assess(&model(), &database, &CarbonConfig::default()).unwrap();

        assert!(assessment.unmatched.is_empty());
        assert_relative_eq!(
            assessment.potential.material_counts.get("Door Composite").unwrap(),
            30.0,
            max_relative = 1e-12
        );
        let door = assessment
            .replacements
            .iter()
            .find(|c| c.material == "Door Composite")
            .unwrap();
        assert_eq!(door.alternatives[0].name, "Timber Door Composite");
    }

    #[test]
    fn test_case_variants_form_one_candidate() {
        let mut model = model();
        model.elements.push(
            ElementSource::layered(
                ElementCategory::Wall,
                "Garden Wall (4)",
                Extent::Area(10.0),
                vec![LayerSpec::new("BRICK", 100.0)],
            )
            .with_material("BRICK", MaterialProperties::new(0.2, 1800.0)),
        );
        let assessment = assess(&model, &database(), &CarbonConfig::default()).unwrap();

        let bricks: Vec<_> = assessment
            .replacements
            .iter()
            .filter(|c| c.material.eq_ignore_ascii_case("brick"))
            .collect();
        assert_eq!(bricks.len(), 1);
        assert_eq!(bricks[0].material, "Brick");
        assert_relative_eq!(bricks[0].actual_carbon, 720.0, max_relative = 1e-12);
        assert_relative_eq!(bricks[0].potential_carbon, 180.0, max_relative = 1e-12);
    }

    #[test]
    fn test_thickness_unit_override() {
        let config = CarbonConfig::default().with_thickness_unit(crate::config::LengthUnit::Centimetre);
        let assessment = assess(&model(), &database(), &config).unwrap();
        assert_relative_eq!(
            assessment.actual.material_counts.get("Brick").unwrap(),
            3600.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_zero_floor_area_aborts() {
        let mut model = model();
        model.elements.retain(|e| e.category != ElementCategory::Slab);
        assert!(matches!(
            assess(&model, &database(), &CarbonConfig::default()),
            Err(CarbonError::ZeroFloorArea)
        ));
    }

    #[test]
    fn test_json_export() {
        let assessment = assess(&model(), &database(), &CarbonConfig::default()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&assessment.to_json().unwrap()).unwrap();
        assert_eq!(json["summary"]["identity"], "House (b1)");
        assert!(json["actual"]["element_counts"]["Slab"].is_number());
        assert_eq!(json["replacements"][0]["original"]["id"]["class"], "CO");
    }
}
