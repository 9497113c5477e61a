// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Potential-Savings Projector
//!
//! Re-derives the totals as if every material were swapped for its lowest
//! carbon alternative. Each layer scales by `floor / own` carbon per volume;
//! materials without a replacement keep their actual value.

use crate::aggregate::AggregateTotals;
use crate::error::Result;
use crate::replacement::ReplacementSearch;
use ifc_carbon_model::ElementRecord;

pub struct Projector<'s> {
    search: &'s ReplacementSearch,
}

impl<'s> Projector<'s> {
    pub fn new(search: &'s ReplacementSearch) -> Self {
        Self { search }
    }

    /// Element records with every layer scaled to its replacement
    pub fn project_records(&self, records: &[ElementRecord]) -> Vec<ElementRecord> {
        records
            .iter()
            .map(|record| {
                let mut projected = record.clone();
                for layer in &mut projected.layers {
                    layer.carbon *= self.search.ratio(&layer.material);
                }
                projected
            })
            .collect()
    }

    /// Potential totals over the same internal floor area as the actual ones
    pub fn project(
        &self,
        records: &[ElementRecord],
        actual: &AggregateTotals,
    ) -> Result<AggregateTotals> {
        AggregateTotals::with_floor_area(
            &self.project_records(records),
            actual.building_area_internal,
        )
    }
}
