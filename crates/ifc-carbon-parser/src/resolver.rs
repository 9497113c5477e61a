// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! EntityResolver trait implementation

use crate::scanner::{EntityIndex, EntityScanner, TypeIndex};
use crate::tokenizer::parse_entity_at;
use ifc_carbon_model::{DecodedEntity, EntityId, EntityResolver, IfcType};
use rustc_hash::FxHashMap;
use std::sync::{Arc, RwLock};

/// Thread-safe entity resolver with lazy decoding
///
/// Entities are decoded from the raw content on first access and cached.
pub struct ResolverImpl {
    /// Raw IFC content (owned for thread safety)
    content: String,
    /// Entity ID -> (start, end) byte offsets
    index: EntityIndex,
    /// Decoded entity cache
    cache: RwLock<FxHashMap<u32, Arc<DecodedEntity>>>,
    /// Type -> entity IDs, in file order
    type_index: TypeIndex,
}

impl ResolverImpl {
    /// Create a resolver, scanning the content for entities
    pub fn new(content: String) -> Self {
        let (index, type_index) = EntityScanner::build_indices(&content);
        Self::with_indices(content, index, type_index)
    }

    /// Create resolver with pre-built indices
    pub fn with_indices(content: String, index: EntityIndex, type_index: TypeIndex) -> Self {
        Self {
            content,
            index,
            cache: RwLock::new(FxHashMap::default()),
            type_index,
        }
    }

    /// Get raw content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Decode and cache an entity
    fn decode_and_cache(&self, id: u32) -> Option<Arc<DecodedEntity>> {
        {
            let cache = self.cache.read().ok()?;
            if let Some(cached) = cache.get(&id) {
                return Some(Arc::clone(cached));
            }
        }

        let (start, end) = self.index.get(&id)?;

        let entity = match parse_entity_at(&self.content, *start, *end) {
            Ok(entity) => entity,
            Err(e) => {
                log::debug!("Skipping undecodable entity #{}: {}", id, e);
                return None;
            }
        };
        let arc = Arc::new(entity);

        if let Ok(mut cache) = self.cache.write() {
            cache.insert(id, Arc::clone(&arc));
        }

        Some(arc)
    }
}

impl EntityResolver for ResolverImpl {
    fn get(&self, id: EntityId) -> Option<Arc<DecodedEntity>> {
        self.decode_and_cache(id.0)
    }

    fn entities_by_type(&self, ifc_type: &IfcType) -> Vec<Arc<DecodedEntity>> {
        self.type_index
            .get(ifc_type)
            .map(|ids| ids.iter().filter_map(|id| self.get(*id)).collect())
            .unwrap_or_default()
    }

    fn count_by_type(&self, ifc_type: &IfcType) -> usize {
        self.type_index.get(ifc_type).map(|v| v.len()).unwrap_or(0)
    }

    fn entity_count(&self) -> usize {
        self.index.len()
    }
}
