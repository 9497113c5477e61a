// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Markdown tables and sections built from an assessment

use crate::labels::{bucket_label, BENCHMARK_BANDS};
use ifc_carbon_core::{CarbonAssessment, MaterialRecord};

/// A Markdown pipe table
#[derive(Clone, Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    /// `true` for right-aligned (numeric) columns
    numeric: Vec<bool>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(mut self, header: impl Into<String>) -> Self {
        self.headers.push(header.into());
        self.numeric.push(false);
        self
    }

    pub fn numeric_column(mut self, header: impl Into<String>) -> Self {
        self.headers.push(header.into());
        self.numeric.push(true);
        self
    }

    /// Append a row; missing cells render empty and extra cells are dropped
    pub fn row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row: Vec<String> = cells.into_iter().map(Into::into).collect();
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        fn line(cells: &[String]) -> String {
            format!("| {} |\n", cells.join(" | "))
        }

        let mut out = String::new();

        out.push_str(&line(&self.headers));
        let rule: Vec<String> = self
            .numeric
            .iter()
            .map(|&n| (if n { "---:" } else { ":---" }).to_string())
            .collect();
        out.push_str(&line(&rule));
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(|c| c.replace('|', "\\|")).collect();
            out.push_str(&line(&cells));
        }
        out
    }
}

/// Materials by descending actual carbon, with their potential
pub fn material_table(assessment: &CarbonAssessment) -> Table {
    let mut table = Table::new()
        .column("Material")
        .numeric_column("kgCO₂")
        .numeric_column("Potential kgCO₂");

    for (material, carbon) in assessment.actual.material_counts.ranked() {
        let potential = assessment
            .potential
            .material_counts
            .get(material.as_str())
            .unwrap_or(carbon);
        table.row([
            material.clone(),
            format!("{:.0}", carbon),
            format!("{:.0}", potential),
        ]);
    }
    table
}

/// Element buckets by descending carbon, under their report labels
pub fn element_table(assessment: &CarbonAssessment) -> Table {
    let mut table = Table::new()
        .column("Element")
        .numeric_column("kgCO₂")
        .numeric_column("Share");

    let total = assessment.actual.building_ec;
    for (bucket, carbon) in assessment.actual.element_counts.ranked() {
        let share = if total > 0.0 { carbon / total * 100.0 } else { 0.0 };
        table.row([
            bucket_label(bucket),
            format!("{:.0}", carbon),
            format!("{:.1} %", share),
        ]);
    }
    table
}

/// Benchmark bands with the building inserted at its position
pub fn benchmark_table(assessment: &CarbonAssessment) -> Table {
    let mut table = Table::new()
        .column("Benchmark")
        .numeric_column("kgCO₂/m²");

    let value = assessment.summary.building_ec_per_area_internal;
    let building = [
        format!("**{}**", assessment.summary.identity),
        format!("**{:.2}**", value),
    ];
    let mut placed = false;
    for band in &BENCHMARK_BANDS {
        if !placed && value > band.value {
            table.row(building.clone());
            placed = true;
        }
        table.row([band.label.to_string(), format!("{:.2}", band.value)]);
    }
    if !placed {
        table.row(building);
    }
    table
}

/// Numbered replacement headings, each followed by the original row and
/// every tied alternative
pub fn replacement_section(assessment: &CarbonAssessment) -> String {
    if assessment.replacements.is_empty() {
        return "No lower-carbon replacements were found in the database.\n".to_string();
    }

    let mut out = String::new();
    for (n, candidate) in assessment.replacements.iter().enumerate() {
        out.push_str(&format!(
            "\n#### {}. {}: {:.0} kgCO₂ / {:.0} kgCO₂\n\n",
            n + 1,
            candidate.material,
            candidate.actual_carbon,
            candidate.potential_carbon
        ));

        let mut table = Table::new()
            .column("ID")
            .column("Name")
            .numeric_column("EC per volume");
        for record in std::iter::once(&candidate.original).chain(&candidate.alternatives) {
            table.row(record_cells(record));
        }
        out.push_str(&table.render());
    }
    out
}

fn record_cells(record: &MaterialRecord) -> [String; 3] {
    [
        record.id.to_string(),
        record.name.clone(),
        format!("{:.2}", record.carbon_per_volume()),
    ]
}

/// Materials with no database entry, as a bullet list
pub fn unmatched_list(assessment: &CarbonAssessment) -> String {
    if assessment.unmatched.is_empty() {
        return "All materials were found in the database.\n".to_string();
    }
    assessment
        .unmatched
        .iter()
        .map(|m| format!("- {}\n", m))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_render() {
        let mut table = Table::new().column("Name").numeric_column("Value");
        table.row(["Brick | Clay", "360"]);
        table.row(["Plaster"]);
        assert_eq!(
            table.render(),
            "| Name | Value |\n| :--- | ---: |\n| Brick \\| Clay | 360 |\n| Plaster |  |\n"
        );
        assert_eq!(table.len(), 2);
    }
}
