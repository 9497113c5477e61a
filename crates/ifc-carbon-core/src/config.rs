// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Assessment configuration

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default tolerance when comparing carbon per volume against a class minimum
pub const COMPARISON_TOLERANCE: f64 = 1e-5;

/// How material names from the model are matched against the database
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameMatching {
    /// Trimmed names must match exactly
    Exact,
    /// Trimmed names match ignoring case; the original case is kept for display
    #[default]
    CaseInsensitive,
}

impl NameMatching {
    /// Lookup key for a name
    pub fn key(&self, name: &str) -> String {
        match self {
            NameMatching::Exact => name.trim().to_string(),
            NameMatching::CaseInsensitive => name.trim().to_lowercase(),
        }
    }
}

/// Unit of material layer thicknesses
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthUnit {
    Millimetre,
    Centimetre,
    Metre,
    Inch,
    Foot,
}

impl LengthUnit {
    /// How many of this unit make a metre
    pub fn units_per_metre(&self) -> f64 {
        match self {
            LengthUnit::Millimetre => 1000.0,
            LengthUnit::Centimetre => 100.0,
            LengthUnit::Metre => 1.0,
            LengthUnit::Inch => 1.0 / 0.0254,
            LengthUnit::Foot => 1.0 / 0.3048,
        }
    }
}

/// Layout of the reference material database
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseFormat {
    pub delimiter: char,
    pub id_column: String,
    pub name_column: String,
    pub carbon_column: String,
    pub density_column: String,
    /// Fixed first token of every composite id
    pub id_prefix: String,
}

impl Default for DatabaseFormat {
    fn default() -> Self {
        Self {
            delimiter: ';',
            id_column: "ID".to_string(),
            name_column: "Name".to_string(),
            carbon_column: "EmbodiedCarbon(kgCO2e/kg)".to_string(),
            density_column: "Density".to_string(),
            id_prefix: "EC".to_string(),
        }
    }
}

impl DatabaseFormat {
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = prefix.into();
        self
    }
}

/// Carbon assessment configuration
///
/// Every field has a default, so a JSON file only needs the values it
/// changes:
///
/// ```json
/// { "name_matching": "exact", "tolerance": 0.001 }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarbonConfig {
    pub name_matching: NameMatching,
    pub tolerance: f64,
    /// Overrides the thickness unit derived from the model
    pub thickness_unit: Option<LengthUnit>,
    pub database: DatabaseFormat,
}

impl Default for CarbonConfig {
    fn default() -> Self {
        Self {
            name_matching: NameMatching::default(),
            tolerance: COMPARISON_TOLERANCE,
            thickness_unit: None,
            database: DatabaseFormat::default(),
        }
    }
}

impl CarbonConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn with_name_matching(mut self, matching: NameMatching) -> Self {
        self.name_matching = matching;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_thickness_unit(mut self, unit: LengthUnit) -> Self {
        self.thickness_unit = Some(unit);
        self
    }

    pub fn with_database_format(mut self, format: DatabaseFormat) -> Self {
        self.database = format;
        self
    }
}
