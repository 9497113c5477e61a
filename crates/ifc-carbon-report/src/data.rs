// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Key/value data a report template is rendered against

use crate::labels::benchmark_rating;
use crate::markdown;
use ifc_carbon_core::CarbonAssessment;
use serde::Serialize;
use std::fmt;

/// Version written into reports
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A template value
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReportValue {
    Text(String),
    Number(f64),
}

impl ReportValue {
    /// Numeric value; text that parses as a number counts
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ReportValue::Number(n) => Some(*n),
            ReportValue::Text(t) => t.trim().parse().ok(),
        }
    }
}

impl fmt::Display for ReportValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportValue::Text(t) => f.write_str(t),
            ReportValue::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Ordered report data; a later insert replaces an earlier value
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ReportData {
    entries: Vec<(String, ReportValue)>,
}

impl ReportData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: ReportValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn insert_text(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.insert(key, ReportValue::Text(value.into()));
    }

    pub fn insert_number(&mut self, key: impl Into<String>, value: f64) {
        self.insert(key, ReportValue::Number(value));
    }

    pub fn get(&self, key: &str) -> Option<&ReportValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ReportValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Collect everything the built-in template uses
    ///
    /// Building properties come first so computed values win on a name clash.
    pub fn from_assessment(assessment: &CarbonAssessment) -> Self {
        let summary = &assessment.summary;
        let mut data = Self::new();

        for (name, value) in &summary.properties {
            data.insert_text(name.as_str(), value.as_str());
        }

        data.insert_text("BuildingName", summary.identity.as_str());
        data.insert_number("BuildingAreaInternal", summary.building_area_internal);
        data.insert_number("BuildingEC", summary.building_ec);
        data.insert_number(
            "BuildingECPerAreaInternal",
            summary.building_ec_per_area_internal,
        );
        data.insert_number("BuildingPotentialEC", summary.potential_building_ec);
        data.insert_number(
            "BuildingPotentialECPerAreaInternal",
            summary.potential_building_ec_per_area_internal,
        );
        data.insert_number("BuildingPotentialSaving", summary.potential_saving);
        data.insert_text(
            "IFCFilename",
            summary.source_file.clone().unwrap_or_default(),
        );
        data.insert_text("ToolVersion", TOOL_VERSION);

        data.insert_text("ECReplacements", markdown::replacement_section(assessment));
        data.insert_text("UnmatchedMaterials", markdown::unmatched_list(assessment));
        data.insert_text("MaterialTable", markdown::material_table(assessment).render());
        data.insert_text("ElementTable", markdown::element_table(assessment).render());
        data.insert_text("BenchmarkTable", markdown::benchmark_table(assessment).render());
        data.insert_text(
            "BenchmarkRating",
            benchmark_rating(summary.building_ec_per_area_internal),
        );

        data
    }
}
