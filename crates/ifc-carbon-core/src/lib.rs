// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-Carbon Core - Embodied-carbon aggregation and material replacement
//!
//! Consumes the [`BuildingModel`](ifc_carbon_model::BuildingModel) produced by
//! the element extractor and computes:
//!
//! - **Aggregates** - carbon per element, material, element bucket and
//!   building, normalised by internal floor area ([`Aggregator`])
//! - **Replacements** - the lowest-carbon rows of each material's class in a
//!   reference database ([`ReplacementFinder`])
//! - **Potential totals** - the aggregates after substitution ([`Projector`])
//!
//! # Example
//!
//! ```ignore
//! use ifc_carbon_core::{assess, CarbonConfig, MaterialDatabase};
//!
//! let config = CarbonConfig::default();
//! let database = MaterialDatabase::load("materials.csv", &config.database, config.name_matching)?;
//! let assessment = assess(&building, &database, &config)?;
//! println!("{:.0} kgCO2e/m2", assessment.summary.building_ec_per_area_internal);
//! ```

pub mod aggregate;
pub mod assessment;
pub mod config;
pub mod database;
pub mod error;
pub mod projector;
pub mod replacement;
pub mod totals;

pub use aggregate::{
    internal_floor_area, AggregateTotals, Aggregator, ElementBucket, MaterialSpellings,
    UnitConvention,
};
pub use assessment::{assess, BuildingSummary, CarbonAssessment, ReplacementCandidate};
pub use config::{CarbonConfig, DatabaseFormat, LengthUnit, NameMatching, COMPARISON_TOLERANCE};
pub use database::{EcCode, MaterialDatabase, MaterialRecord};
pub use error::{CarbonError, DatabaseError, Result};
pub use projector::Projector;
pub use replacement::{MaterialMatch, ReplacementFinder, ReplacementSearch};
pub use totals::Tally;
