// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reference material database
//!
//! A delimited table with one row per material:
//!
//! ```text
//! ID;Name;EmbodiedCarbon(kgCO2e/kg);Density
//! EC-BR-01;Common Brick;0,213;1800
//! ```
//!
//! The id is `<prefix>-<class>-<variant>`; rows sharing a class are the
//! candidate substitutes for each other. Names are unique under the
//! configured [`NameMatching`].

use crate::config::{DatabaseFormat, NameMatching};
use crate::error::DatabaseError;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Composite material id, e.g. `EC-BR-01`
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EcCode {
    pub prefix: String,
    /// Material class token
    pub class: String,
    pub variant: String,
}

impl EcCode {
    /// Parse `<prefix>-<class>-<variant>` with the expected prefix
    pub fn parse(id: &str, expected_prefix: &str) -> Option<Self> {
        let mut parts = id.trim().split('-');
        let (prefix, class, variant) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() || prefix != expected_prefix {
            return None;
        }
        if class.is_empty() || variant.is_empty() {
            return None;
        }
        Some(Self {
            prefix: prefix.to_string(),
            class: class.to_string(),
            variant: variant.to_string(),
        })
    }
}

impl fmt::Display for EcCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.prefix, self.class, self.variant)
    }
}

/// One database row
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialRecord {
    pub id: EcCode,
    /// Trimmed material name
    pub name: String,
    /// kgCO₂e per kg
    pub embodied_carbon_per_mass: f64,
    /// kg per m³
    pub density: f64,
}

impl MaterialRecord {
    pub fn new(
        id: EcCode,
        name: impl Into<String>,
        embodied_carbon_per_mass: f64,
        density: f64,
    ) -> Self {
        Self {
            id,
            name: name.into().trim().to_string(),
            embodied_carbon_per_mass,
            density,
        }
    }

    /// kgCO₂e per m³, the ranking key for substitutes
    pub fn carbon_per_volume(&self) -> f64 {
        self.embodied_carbon_per_mass * self.density
    }
}

/// Column positions resolved from the header
struct Columns {
    id: usize,
    name: usize,
    carbon: usize,
    density: usize,
}

impl Columns {
    fn resolve(header: &[String], format: &DatabaseFormat) -> Result<Self, DatabaseError> {
        let find = |column: &str| {
            header
                .iter()
                .position(|h| h.eq_ignore_ascii_case(column))
                .ok_or_else(|| DatabaseError::MissingColumn(column.to_string()))
        };
        Ok(Self {
            id: find(&format.id_column)?,
            name: find(&format.name_column)?,
            carbon: find(&format.carbon_column)?,
            density: find(&format.density_column)?,
        })
    }

    fn width(&self) -> usize {
        self.id.max(self.name).max(self.carbon).max(self.density) + 1
    }
}

/// The reference material database, read-only once loaded
#[derive(Clone, Debug)]
pub struct MaterialDatabase {
    records: Vec<MaterialRecord>,
    matching: NameMatching,
    by_name: FxHashMap<String, usize>,
    by_class: FxHashMap<String, Vec<usize>>,
}

impl MaterialDatabase {
    /// Build a database from records, rejecting duplicate names
    pub fn from_records(
        records: Vec<MaterialRecord>,
        matching: NameMatching,
    ) -> Result<Self, DatabaseError> {
        let mut by_name: FxHashMap<String, usize> = FxHashMap::default();
        let mut by_class: FxHashMap<String, Vec<usize>> = FxHashMap::default();

        for (idx, record) in records.iter().enumerate() {
            if let Some(first) = by_name.insert(matching.key(&record.name), idx) {
                // Header is line 1
                return Err(DatabaseError::DuplicateName {
                    name: record.name.clone(),
                    first_line: first + 2,
                    line: idx + 2,
                });
            }
            by_class.entry(record.id.class.clone()).or_default().push(idx);
        }

        Ok(Self {
            records,
            matching,
            by_name,
            by_class,
        })
    }

    /// Parse delimited database content
    pub fn parse(
        content: &str,
        format: &DatabaseFormat,
        matching: NameMatching,
    ) -> Result<Self, DatabaseError> {
        let mut lines = content
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line))
            .filter(|(_, line)| !line.trim().is_empty());

        let (_, header) = lines.next().ok_or(DatabaseError::Empty)?;
        let header = split_fields(header.trim_start_matches('\u{feff}'), format.delimiter);
        let columns = Columns::resolve(&header, format)?;

        let mut records = Vec::new();
        for (line, text) in lines {
            let fields = split_fields(text, format.delimiter);
            if fields.len() < columns.width() {
                return Err(DatabaseError::MissingField {
                    line,
                    expected: columns.width(),
                    found: fields.len(),
                });
            }

            let id = EcCode::parse(&fields[columns.id], &format.id_prefix).ok_or_else(|| {
                DatabaseError::InvalidId {
                    line,
                    id: fields[columns.id].clone(),
                }
            })?;
            let carbon = parse_number(&fields[columns.carbon])
                .ok_or_else(|| {
                    DatabaseError::invalid_number(
                        line,
                        &format.carbon_column,
                        &fields[columns.carbon],
                    )
                })?;
            let density = parse_number(&fields[columns.density])
                .ok_or_else(|| {
                    DatabaseError::invalid_number(
                        line,
                        &format.density_column,
                        &fields[columns.density],
                    )
                })?;

            records.push(MaterialRecord::new(id, &fields[columns.name], carbon, density));
        }

        let database = Self::from_records(records, matching)?;
        log::info!(
            "Loaded {} materials in {} classes",
            database.len(),
            database.by_class.len()
        );
        Ok(database)
    }

    /// Load a database file
    pub fn load(
        path: impl AsRef<Path>,
        format: &DatabaseFormat,
        matching: NameMatching,
    ) -> Result<Self, DatabaseError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, format, matching)
    }

    pub fn records(&self) -> &[MaterialRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn name_matching(&self) -> NameMatching {
        self.matching
    }

    /// The row for a material name
    pub fn find(&self, name: &str) -> Option<&MaterialRecord> {
        self.by_name
            .get(&self.matching.key(name))
            .map(|&idx| &self.records[idx])
    }

    /// All rows of a class, in database order
    pub fn class_members<'a>(
        &'a self,
        class: &str,
    ) -> impl Iterator<Item = &'a MaterialRecord> + 'a {
        self.by_class
            .get(class)
            .into_iter()
            .flatten()
            .map(move |&idx| &self.records[idx])
    }

    /// Lowest carbon per volume within a class
    pub fn class_minimum(&self, class: &str) -> Option<f64> {
        self.class_members(class)
            .map(MaterialRecord::carbon_per_volume)
            .reduce(f64::min)
    }
}

/// Split a line on the delimiter, honouring double quotes
fn split_fields(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            c if c == delimiter && !quoted => fields.push(std::mem::take(&mut field)),
            c => field.push(c),
        }
    }
    fields.push(field);

    fields.into_iter().map(|f| f.trim().to_string()).collect()
}

/// Parse a number, accepting a decimal comma
fn parse_number(text: &str) -> Option<f64> {
    let normalized = text.trim().replace(',', ".");
    lexical_core::parse::<f64>(normalized.as_bytes()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DATABASE: &str = "ID;Name;EmbodiedCarbon(kgCO2e/kg);Density
EC-BR-01;Common Brick ;0,2;1800
EC-BR-02;Reclaimed Brick;0,05;1800
EC-CO-01;\"Concrete; C30/37\";0.1;2400
EC-CO-02;GGBS Concrete;0.075;2400

EC-CO-03;Geopolymer Concrete;0.09;2000
";

    fn database() -> MaterialDatabase {
        MaterialDatabase::parse(DATABASE, &DatabaseFormat::default(), NameMatching::default()).unwrap()
    }

    #[test]
    fn test_parse_rows() {
        let db = database();
        assert_eq!(db.len(), 5);

        let brick = db.find("Common Brick").unwrap();
        assert_eq!(brick.name, "Common Brick");
        assert_eq!(brick.id.class, "BR");
        assert_eq!(brick.id.to_string(), "EC-BR-01");
        assert_relative_eq!(brick.embodied_carbon_per_mass, 0.2);
        assert_relative_eq!(brick.carbon_per_volume(), 360.0);

        assert!(db.find("Concrete; C30/37").is_some());
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let db = database();
        assert_eq!(db.find("  common BRICK").unwrap().name, "Common Brick");

        let exact = MaterialDatabase::parse(DATABASE, &DatabaseFormat::default(), NameMatching::Exact).unwrap();
        assert!(exact.find("common brick").is_none());
        assert!(exact.find("Common Brick").is_some());
    }

    #[test]
    fn test_class_minimum_and_members() {
        let db = database();
        assert_relative_eq!(db.class_minimum("CO").unwrap(), 180.0);
        assert_relative_eq!(db.class_minimum("BR").unwrap(), 90.0);
        assert_eq!(db.class_members("CO").count(), 3);
        assert!(db.class_minimum("TI").is_none());
    }

    #[test]
    fn test_duplicate_name_is_fatal() {
        let content = "ID;Name;EmbodiedCarbon(kgCO2e/kg);Density\nEC-BR-01;Brick;0.2;1800\nEC-BR-02;Brick;0.1;1800\n";
        match MaterialDatabase::parse(content, &DatabaseFormat::default(), NameMatching::Exact) {
            Err(DatabaseError::DuplicateName { name, first_line, line }) => {
                assert_eq!(name, "Brick");
                assert_eq!(first_line, 2);
                assert_eq!(line, 3);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_differing_in_case() {
        let content = "ID;Name;EmbodiedCarbon(kgCO2e/kg);Density\nEC-BR-01;Brick;0.2;1800\nEC-BR-02;BRICK;0.1;1800\n";
        let format = DatabaseFormat::default();
        assert!(MaterialDatabase::parse(content, &format, NameMatching::CaseInsensitive).is_err());
        assert!(MaterialDatabase::parse(content, &format, NameMatching::Exact).is_ok());
    }

    #[test]
    fn test_malformed_rows() {
        let format = DatabaseFormat::default();
        let header = "ID;Name;EmbodiedCarbon(kgCO2e/kg);Density\n";

        let bad_id = format!("{}BR-01;Brick;0.2;1800\n", header);
        assert!(matches!(
            MaterialDatabase::parse(&bad_id, &format, NameMatching::Exact),
            Err(DatabaseError::InvalidId { line: 2, .. })
        ));

        let bad_number = format!("{}EC-BR-01;Brick;n/a;1800\n", header);
        assert!(matches!(
            MaterialDatabase::parse(&bad_number, &format, NameMatching::Exact),
            Err(DatabaseError::InvalidNumber { line: 2, .. })
        ));

        let short = format!("{}EC-BR-01;Brick\n", header);
        assert!(matches!(
            MaterialDatabase::parse(&short, &format, NameMatching::Exact),
            Err(DatabaseError::MissingField { found: 2, .. })
        ));

        assert!(matches!(
            MaterialDatabase::parse("ID;Name\n", &format, NameMatching::Exact),
            Err(DatabaseError::MissingColumn(_))
        ));
        assert!(matches!(
            MaterialDatabase::parse("\n\n", &format, NameMatching::Exact),
            Err(DatabaseError::Empty)
        ));
    }

    #[test]
    fn test_ec_code() {
        assert!(EcCode::parse("EC-BR-01", "EC").is_some());
        assert!(EcCode::parse("XX-BR-01", "EC").is_none());
        assert!(EcCode::parse("EC-BR", "EC").is_none());
        assert!(EcCode::parse("EC-BR-01-A", "EC").is_none());
        assert!(EcCode::parse("EC--01", "EC").is_none());
    }
}
