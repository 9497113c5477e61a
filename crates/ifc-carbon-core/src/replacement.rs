// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Replacement Finder
//!
//! For every material, look up its database row and scan the rows of the
//! same class for the lowest carbon per volume. A material has a genuine
//! replacement only when that minimum lies more than the tolerance below its
//! own value; all rows sharing the minimum are kept.

use crate::config::COMPARISON_TOLERANCE;
use crate::database::{MaterialDatabase, MaterialRecord};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

/// Outcome of the search for one material found in the database
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MaterialMatch {
    /// Material name as used in the model
    pub material: String,
    /// The material's own database row
    pub record: MaterialRecord,
    /// Class minimum carbon per volume, when below the material's own
    pub floor_per_volume: Option<f64>,
    /// Every class row at the minimum; empty when already optimal
    pub alternatives: Vec<MaterialRecord>,
}

impl MaterialMatch {
    pub fn has_replacement(&self) -> bool {
        self.floor_per_volume.is_some()
    }

    /// Factor the material's carbon scales by when replaced
    pub fn ratio(&self) -> f64 {
        match self.floor_per_volume {
            Some(floor) => floor / self.record.carbon_per_volume(),
            None => 1.0,
        }
    }
}

/// Search results for a set of materials
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ReplacementSearch {
    /// Materials found in the database, in search order
    pub matches: Vec<MaterialMatch>,
    /// Materials with no database row
    pub unmatched: Vec<String>,
    #[serde(skip)]
    index: FxHashMap<String, usize>,
}

impl ReplacementSearch {
    fn push(&mut self, found: MaterialMatch) {
        self.index.insert(found.material.clone(), self.matches.len());
        self.matches.push(found);
    }

    pub fn get(&self, material: &str) -> Option<&MaterialMatch> {
        self.index.get(material).map(|&idx| &self.matches[idx])
    }

    /// Achievable carbon per volume; `None` when unmatched or already optimal
    pub fn min_ec_per_volume(&self, material: &str) -> Option<f64> {
        self.get(material)?.floor_per_volume
    }

    /// Lowest-carbon rows of the material's class; `None` without a genuine alternative
    pub fn replacements(&self, material: &str) -> Option<&[MaterialRecord]> {
        self.get(material)
            .filter(|m| m.has_replacement())
            .map(|m| m.alternatives.as_slice())
    }

    /// Factor a material's carbon scales by under substitution
    pub fn ratio(&self, material: &str) -> f64 {
        self.get(material).map_or(1.0, MaterialMatch::ratio)
    }

    pub fn is_unmatched(&self, material: &str) -> bool {
        self.unmatched.iter().any(|m| m == material)
    }
}

/// Finds lowest-carbon substitutes in a material database
pub struct ReplacementFinder<'db> {
    database: &'db MaterialDatabase,
    tolerance: f64,
}

impl<'db> ReplacementFinder<'db> {
    pub fn new(database: &'db MaterialDatabase) -> Self {
        Self {
            database,
            tolerance: COMPARISON_TOLERANCE,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Search replacements for distinct materials, keeping first-seen order
    pub fn search<'a>(&self, materials: impl IntoIterator<Item = &'a str>) -> ReplacementSearch {
        let mut search = ReplacementSearch::default();
        let mut seen = FxHashSet::default();

        for material in materials {
            if !seen.insert(material) {
                continue;
            }
            match self.database.find(material) {
                Some(record) => search.push(self.find(material, record)),
                None => {
                    log::warn!(
                        "Material '{}' not found in database; assuming no replacement",
                        material
                    );
                    search.unmatched.push(material.to_string());
                }
            }
        }

        search
    }

    fn find(&self, material: &str, record: &MaterialRecord) -> MaterialMatch {
        let own = record.carbon_per_volume();
        let class = &record.id.class;
        let minimum = self.database.class_minimum(class).unwrap_or(own);

        // A zero own value cannot be scaled down
        let floor_per_volume = (own > 0.0 && minimum < own - self.tolerance).then_some(minimum);

        let alternatives = match floor_per_volume {
            Some(floor) => self
                .database
                .class_members(class)
                .filter(|r| r.carbon_per_volume() == floor)
                .cloned()
                .collect(),
            None => Vec::new(),
        };

        match floor_per_volume {
            Some(floor) => log::debug!(
                "{}: {:.3} -> {:.3} kgCO2e/m3 ({} alternative(s) in class {})",
                material,
                own,
                floor,
                alternatives.len(),
                class
            ),
            None => log::debug!("{}: already lowest in class {}", material, class),
        }

        MaterialMatch {
            material: material.to_string(),
            record: record.clone(),
            floor_per_volume,
            alternatives,
        }
    }
}
