// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fast entity scanner using SIMD-accelerated byte searching
//!
//! Scans IFC files to discover entities without full parsing.

use crate::tokenizer::parse_arguments;
use ifc_carbon_model::{AttributeValue, EntityId, IfcType, ModelMetadata};
use memchr::memchr;
use rustc_hash::FxHashMap;

/// Entity index mapping ID to byte offsets
pub type EntityIndex = FxHashMap<u32, (usize, usize)>;

/// Type index mapping entity type to IDs in file order
pub type TypeIndex = FxHashMap<IfcType, Vec<EntityId>>;

/// Fast entity scanner for IFC files
///
/// Uses memchr for SIMD-accelerated scanning to quickly find entity
/// boundaries without full parsing.
pub struct EntityScanner<'a> {
    content: &'a str,
    pos: usize,
}

impl<'a> EntityScanner<'a> {
    /// Create a new scanner positioned after the `DATA;` marker
    pub fn new(content: &'a str) -> Self {
        let pos = content.find("DATA;").map(|p| p + 5).unwrap_or(0);
        Self { content, pos }
    }

    /// Scan to find the next entity
    ///
    /// Returns (id, type_name, start_byte, end_byte)
    pub fn next_entity(&mut self) -> Option<(u32, &'a str, usize, usize)> {
        let bytes = self.content.as_bytes();

        while self.pos < bytes.len() {
            let hash_pos = memchr(b'#', &bytes[self.pos..])?;
            self.pos += hash_pos;

            // Entity definitions start a line; other '#' are references
            let is_entity_start = self.pos == 0
                || matches!(bytes[self.pos - 1], b'\n' | b'\r' | b';' | b' ' | b'\t');

            if !is_entity_start {
                self.pos += 1;
                continue;
            }

            let start = self.pos;
            self.pos += 1;
            let id_start = self.pos;

            while self.pos < bytes.len() && bytes[self.pos].is_ascii_digit() {
                self.pos += 1;
            }

            if self.pos == id_start {
                continue;
            }

            let id: u32 = match self.content[id_start..self.pos].parse() {
                Ok(id) => id,
                Err(_) => continue,
            };

            self.skip_blanks();
            if self.pos >= bytes.len() || bytes[self.pos] != b'=' {
                continue;
            }
            self.pos += 1;
            self.skip_blanks();

            let type_start = self.pos;
            while self.pos < bytes.len()
                && (bytes[self.pos].is_ascii_alphanumeric() || bytes[self.pos] == b'_')
            {
                self.pos += 1;
            }

            if self.pos == type_start {
                continue;
            }

            let type_name = &self.content[type_start..self.pos];
            let end = self.find_entity_end()?;

            return Some((id, type_name, start, end));
        }

        None
    }

    fn skip_blanks(&mut self) {
        let bytes = self.content.as_bytes();
        while self.pos < bytes.len() && (bytes[self.pos] == b' ' || bytes[self.pos] == b'\t') {
            self.pos += 1;
        }
    }

    /// Find the end of an entity (semicolon), handling quoted strings
    fn find_entity_end(&mut self) -> Option<usize> {
        let bytes = self.content.as_bytes();
        let mut in_string = false;

        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'\'' => {
                    if in_string && self.pos + 1 < bytes.len() && bytes[self.pos + 1] == b'\'' {
                        self.pos += 2;
                        continue;
                    }
                    in_string = !in_string;
                }
                b';' if !in_string => {
                    self.pos += 1;
                    return Some(self.pos);
                }
                _ => {}
            }
            self.pos += 1;
        }

        None
    }

    /// Build the offset index and the type index in one pass
    pub fn build_indices(content: &'a str) -> (EntityIndex, TypeIndex) {
        let mut scanner = Self::new(content);
        let mut index = EntityIndex::default();
        let mut types = TypeIndex::default();

        while let Some((id, type_name, start, end)) = scanner.next_entity() {
            index.insert(id, (start, end));
            types
                .entry(IfcType::parse(type_name))
                .or_default()
                .push(EntityId(id));
        }

        (index, types)
    }

    /// Build an index of all entities (ID -> byte offsets)
    pub fn build_index(content: &'a str) -> EntityIndex {
        Self::build_indices(content).0
    }
}

/// Read the `HEADER` section into model metadata
///
/// Header records share the entity attribute syntax, so they go through the
/// same tokenizer. Records that are missing or malformed leave their fields
/// empty.
pub fn parse_header(content: &str) -> ModelMetadata {
    let start = content.find("HEADER;").unwrap_or(0);
    let end = content[start..]
        .find("ENDSEC;")
        .map_or(content.len(), |p| start + p);
    let header = &content[start..end];

    let mut metadata = ModelMetadata::default();

    // FILE_SCHEMA(('IFC2X3'))
    if let Some(args) = header_record(header, "FILE_SCHEMA") {
        metadata.schema_version = first_text(args.first()).unwrap_or_default();
    }

    // FILE_DESCRIPTION(('ViewDefinition [...]'),'2;1')
    if let Some(args) = header_record(header, "FILE_DESCRIPTION") {
        let lines: Vec<&str> = texts(args.first()).collect();
        if !lines.is_empty() {
            metadata.file_description = Some(lines.join(" "));
        }
    }

    // FILE_NAME(name, timestamp, (author), (organization), preprocessor, system, authorization)
    if let Some(args) = header_record(header, "FILE_NAME") {
        metadata.file_name = text(args.first());
        metadata.timestamp = text(args.get(1));
        metadata.author = first_text(args.get(2));
        metadata.organization = first_text(args.get(3));
        metadata.preprocessor_version = text(args.get(4));
        metadata.originating_system = text(args.get(5));
    }

    metadata
}

fn header_record(header: &str, record: &str) -> Option<Vec<AttributeValue>> {
    let at = header.find(record)? + record.len();
    match parse_arguments(&header[at..]) {
        Ok(args) => Some(args),
        Err(e) => {
            log::debug!("Ignoring malformed {} header: {}", record, e);
            None
        }
    }
}

fn text(value: Option<&AttributeValue>) -> Option<String> {
    value
        .and_then(AttributeValue::as_string)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Non-empty strings of a list value
fn texts(value: Option<&AttributeValue>) -> impl Iterator<Item = &str> {
    value
        .and_then(AttributeValue::as_list)
        .unwrap_or_default()
        .iter()
        .filter_map(AttributeValue::as_string)
        .filter(|s| !s.is_empty())
}

fn first_text(value: Option<&AttributeValue>) -> Option<String> {
    texts(value).next().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_IFC: &str = r#"ISO-10303-21;
HEADER;
FILE_DESCRIPTION(('ViewDefinition [CoordinationView]'),'2;1');
FILE_NAME('house.ifc','2024-01-01T00:00:00',('Author'),('Org'),'Preprocessor','App','');
FILE_SCHEMA(('IFC2X3'));
ENDSEC;
DATA;
#1=IFCPROJECT('guid',$,'Project',$,$,$,$,$,#2);
#2=IFCUNITASSIGNMENT((#3));
#3=IFCSIUNIT(*,.LENGTHUNIT.,.MILLI.,.METRE.);
#4=IFCWALL('guid',$,'Wall; with semicolon',$,$,#5,#6,$);
#5=IFCWALL('guid2',$,'It''s a wall',$,$,$,$,$);
ENDSEC;
END-ISO-10303-21;
"#;

    #[test]
    fn test_scanner_finds_entities() {
        let mut scanner = EntityScanner::new(TEST_IFC);
        let mut entities = Vec::new();

        while let Some((id, type_name, _, _)) = scanner.next_entity() {
            entities.push((id, type_name.to_string()));
        }

        assert_eq!(entities.len(), 5);
        assert_eq!(entities[0], (1, "IFCPROJECT".to_string()));
        assert_eq!(entities[3], (4, "IFCWALL".to_string()));
    }

    #[test]
    fn test_build_indices() {
        let (index, types) = EntityScanner::build_indices(TEST_IFC);
        assert_eq!(index.len(), 5);
        assert!(index.contains_key(&1));

        let walls = types.get(&IfcType::IfcWall).unwrap();
        assert_eq!(walls, &vec![EntityId(4), EntityId(5)]);
    }

    #[test]
    fn test_semicolon_inside_string() {
        let index = EntityScanner::build_index(TEST_IFC);
        let (start, end) = index[&4];
        assert!(TEST_IFC[start..end].ends_with("#6,$);"));
    }

    #[test]
    fn test_parse_header() {
        let info = parse_header(TEST_IFC);
        assert_eq!(info.schema_version, "IFC2X3");
        assert_eq!(info.file_name.as_deref(), Some("house.ifc"));
        assert_eq!(info.timestamp.as_deref(), Some("2024-01-01T00:00:00"));
        assert_eq!(info.author.as_deref(), Some("Author"));
        assert_eq!(info.organization.as_deref(), Some("Org"));
        assert_eq!(info.originating_system.as_deref(), Some("App"));
        assert_eq!(
            info.file_description.as_deref(),
            Some("ViewDefinition [CoordinationView]")
        );
    }

    #[test]
    fn test_partial_header() {
        let info = parse_header("HEADER;\nFILE_NAME($,$,(''),(),$,'App',$);\nENDSEC;");
        assert_eq!(info.schema_version, "");
        assert_eq!(info.file_name, None);
        assert_eq!(info.author, None);
        assert_eq!(info.originating_system.as_deref(), Some("App"));
    }
}
