// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-Carbon Report - Report data, Markdown and JSON output
//!
//! Builds the key/value [`ReportData`] for a [`CarbonAssessment`] and renders
//! it through a `%(key)s` template. A Markdown template ships with the crate;
//! a custom one can be supplied.
//!
//! # Example
//!
//! ```ignore
//! use ifc_carbon_report::ReportGenerator;
//!
//! let markdown = ReportGenerator::new().render(&assessment)?;
//! std::fs::write("report.md", markdown)?;
//! ```

pub mod data;
pub mod error;
pub mod labels;
pub mod markdown;
pub mod template;

pub use data::{ReportData, ReportValue, TOOL_VERSION};
pub use error::{ReportError, Result};
pub use labels::{benchmark_band, benchmark_rating, bucket_label, BenchmarkBand, BENCHMARK_BANDS};
pub use markdown::Table;

use ifc_carbon_core::CarbonAssessment;
use std::path::Path;

/// Built-in Markdown report template
pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/report_template.md");

/// Renders assessments through a template
#[derive(Clone, Debug)]
pub struct ReportGenerator {
    template: String,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator {
    /// Generator using the built-in template
    pub fn new() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }

    pub fn with_template(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Generator using a template file
    pub fn from_template_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::with_template(std::fs::read_to_string(path)?))
    }

    /// Render the report for an assessment
    pub fn render(&self, assessment: &CarbonAssessment) -> Result<String> {
        let data = ReportData::from_assessment(assessment);
        log::debug!("Rendering report with {} values", data.len());
        template::render(&self.template, &data)
    }
}

/// The full assessment as pretty-printed JSON
pub fn to_json(assessment: &CarbonAssessment) -> Result<String> {
    Ok(serde_json::to_string_pretty(assessment)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifc_carbon_core::{assess, CarbonConfig, MaterialDatabase, NameMatching};
    use ifc_carbon_model::{
        BuildingModel, ElementCategory, ElementSource, Extent, LayerSpec, MaterialProperties,
    };

    const DATABASE: &str = "ID;Name;EmbodiedCarbon(kgCO2e/kg);Density
EC-BR-01;Brick;0,2;1800
EC-BR-02;Reclaimed Brick;0,05;1800
EC-BR-03;Lime Brick;0,1;900
EC-CO-01;Concrete;0,1;2400
";

    fn assessment() -> CarbonAssessment {
        let model = BuildingModel {
            identity: "Terrace (b1)".to_string(),
            properties: vec![("YearOfConstruction".to_string(), "2024".to_string())],
            source_file: Some("terrace.ifc".to_string()),
            length_unit_scale: None,
            elements: vec![
                ElementSource::layered(
                    ElementCategory::Wall,
                    "Wall (1)",
                    Extent::Area(10.0),
                    vec![LayerSpec::new("Brick", 100.0)],
                )
                .with_material("Brick", MaterialProperties::new(0.2, 1800.0))
                .external(true),
                ElementSource::layered(
                    ElementCategory::Slab,
                    "Floor (2)",
                    Extent::Area(50.0),
                    vec![LayerSpec::new("Concrete", 200.0), LayerSpec::new("Cork", 10.0)],
                )
                .with_material("Concrete", MaterialProperties::new(0.1, 2400.0))
                .with_material("Cork", MaterialProperties::new(0.2, 120.0)),
            ],
        };
        let config = CarbonConfig::default();
        let db = MaterialDatabase::parse(DATABASE, &config.database, NameMatching::CaseInsensitive).unwrap();
        assess(&model, &db, &config).unwrap()
    }

    #[test]
    fn test_default_template_renders() {
        let report = ReportGenerator::new().render(&assessment()).unwrap();

        assert!(report.contains("**Building:** Terrace (b1)"));
        assert!(report.contains("**Model:** terrace.ifc"));
        assert!(report.contains("| Embodied carbon | 2772 kgCO₂ |"));
        assert!(report.contains("#### 1. Brick: 360 kgCO₂ / 90 kgCO₂"));
        assert!(report.contains("| EC-BR-01 | Brick | 360.00 |"));
        assert!(report.contains("| EC-BR-02 | Reclaimed Brick | 90.00 |"));
        assert!(report.contains("| EC-BR-03 | Lime Brick | 90.00 |"));
        assert!(report.contains("| External Walls | 360 |"));
        assert!(report.contains("| Upper Floors | 2412 |"));
        assert!(report.contains("- Cork"));
        assert!(!report.contains("%("));
    }

    #[test]
    fn test_report_data_keys() {
        let data = ReportData::from_assessment(&assessment());
        for key in [
            "YearOfConstruction",
            "BuildingAreaInternal",
            "BuildingEC",
            "BuildingECPerAreaInternal",
            "BuildingPotentialEC",
            "BuildingPotentialECPerAreaInternal",
            "BuildingPotentialSaving",
            "IFCFilename",
            "ToolVersion",
            "ECReplacements",
            "MaterialTable",
            "ElementTable",
            "BenchmarkTable",
        ] {
            assert!(data.get(key).is_some(), "missing {}", key);
        }
    }

    #[test]
    fn test_custom_template() {
        let generator = ReportGenerator::with_template("%(YearOfConstruction)s: %(BuildingEC).0f");
        assert_eq!(generator.render(&assessment()).unwrap(), "2024: 2772");

        let broken = ReportGenerator::with_template("%(Nope)s");
        assert!(matches!(
            broken.render(&assessment()),
            Err(ReportError::MissingKey(_))
        ));
    }

    #[test]
    fn test_json_export() {
        let json = to_json(&assessment()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["unmatched"][0], "Cork");
        assert_eq!(value["actual"]["element_counts"]["ExternalWall"], 360.0);
    }
}
