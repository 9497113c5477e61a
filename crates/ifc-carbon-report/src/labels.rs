// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Display labels and benchmark bands

use ifc_carbon_core::ElementBucket;
use ifc_carbon_model::ElementCategory;
use serde::Serialize;

/// Report label of an element bucket
pub fn bucket_label(bucket: &ElementBucket) -> String {
    use ElementCategory::*;

    let fixed = match (bucket.category, bucket.is_external) {
        (Slab, true) => "Substructure",
        (Wall, true) => "External Walls",
        (Slab, false) => "Upper Floors",
        (Wall, false) => "Internal Walls",
        (Roof, true) => "Roof",
        (Door, true) => "External Doors",
        (Window, false) => "Windows",
        (Stair, false) => "Stairs",
        (Door, false) => "Internal Doors",
        (category, external) => {
            let prefix = if external { "External" } else { "Internal" };
            return format!("{} {}", prefix, plural(category));
        }
    };
    fixed.to_string()
}

fn plural(category: ElementCategory) -> &'static str {
    match category {
        ElementCategory::Wall => "Walls",
        ElementCategory::Slab => "Slabs",
        ElementCategory::Roof => "Roof",
        ElementCategory::Door => "Doors",
        ElementCategory::Window => "Windows",
        ElementCategory::Stair => "Stairs",
    }
}

/// A LETI embodied-carbon benchmark value in kgCO₂/m²
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BenchmarkBand {
    /// Empty for the intermediate steps between labelled bands
    pub label: &'static str,
    pub value: f64,
}

/// Current practice and 2030 targets, highest first
pub const BENCHMARK_BANDS: [BenchmarkBand; 12] = [
    BenchmarkBand { label: "Current (Max)", value: 367.50 },
    BenchmarkBand { label: "", value: 338.10 },
    BenchmarkBand { label: "", value: 289.80 },
    BenchmarkBand { label: "Current (Avg)", value: 275.10 },
    BenchmarkBand { label: "", value: 231.00 },
    BenchmarkBand { label: "", value: 215.25 },
    BenchmarkBand { label: "Current (Min)", value: 210.00 },
    BenchmarkBand { label: "2030 (Max)", value: 178.50 },
    BenchmarkBand { label: "", value: 157.50 },
    BenchmarkBand { label: "2030 (Avg)", value: 110.25 },
    BenchmarkBand { label: "", value: 63.00 },
    BenchmarkBand { label: "2030 (Min)", value: 42.00 },
];

/// The lowest band a carbon-per-area value still falls under
///
/// `None` when the value exceeds every band.
pub fn benchmark_band(value: f64) -> Option<&'static BenchmarkBand> {
    BENCHMARK_BANDS.iter().rev().find(|band| value <= band.value)
}

/// One-line description of where a value sits among the bands
pub fn benchmark_rating(value: f64) -> String {
    match benchmark_band(value) {
        None => format!(
            "{:.0} kgCO₂/m² exceeds the current maximum of {:.2} kgCO₂/m²",
            value, BENCHMARK_BANDS[0].value
        ),
        Some(band) if band.label.is_empty() => {
            format!("{:.0} kgCO₂/m² is within {:.2} kgCO₂/m²", value, band.value)
        }
        Some(band) => format!(
            "{:.0} kgCO₂/m² is within {} ({:.2} kgCO₂/m²)",
            value, band.label, band.value
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_labels() {
        let label = |category, external| bucket_label(&ElementBucket::new(category, external));
        assert_eq!(label(ElementCategory::Slab, true), "Substructure");
        assert_eq!(label(ElementCategory::Slab, false), "Upper Floors");
        assert_eq!(label(ElementCategory::Roof, true), "Roof");
        assert_eq!(label(ElementCategory::Door, false), "Internal Doors");
    }

    #[test]
    fn test_generated_labels() {
        let label = |category, external| bucket_label(&ElementBucket::new(category, external));
        assert_eq!(label(ElementCategory::Window, true), "External Windows");
        assert_eq!(label(ElementCategory::Roof, false), "Internal Roof");
        assert_eq!(label(ElementCategory::Stair, true), "External Stairs");
    }

    #[test]
    fn test_benchmark_band() {
        assert_eq!(benchmark_band(400.0), None);
        assert_eq!(benchmark_band(367.5).unwrap().label, "Current (Max)");
        assert_eq!(benchmark_band(76.2).unwrap().value, 110.25);
        assert_eq!(benchmark_band(10.0).unwrap().label, "2030 (Min)");
    }

    #[test]
    fn test_benchmark_rating() {
        assert_eq!(
            benchmark_rating(76.2),
            "76 kgCO₂/m² is within 2030 (Avg) (110.25 kgCO₂/m²)"
        );
        assert!(benchmark_rating(500.0).contains("exceeds"));
    }
}
