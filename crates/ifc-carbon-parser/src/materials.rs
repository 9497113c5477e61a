// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MaterialReader trait implementation

use ifc_carbon_model::{
    DecodedEntity, EntityId, EntityResolver, IfcType, MaterialLayer, MaterialReader,
};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Material reader backed by IfcRelAssociatesMaterial
pub struct MaterialReaderImpl {
    resolver: Arc<dyn EntityResolver>,
    /// Cache: entity ID -> associated material definitions
    associations: FxHashMap<u32, Vec<EntityId>>,
}

impl MaterialReaderImpl {
    pub fn new(resolver: Arc<dyn EntityResolver>) -> Self {
        let mut associations: FxHashMap<u32, Vec<EntityId>> = FxHashMap::default();

        // RelatedObjects at 4, RelatingMaterial at 5
        for rel in resolver.entities_by_type(&IfcType::IfcRelAssociatesMaterial) {
            let (Some(related_ids), Some(material_id)) = (rel.get_refs(4), rel.get_ref(5)) else {
                continue;
            };
            for related_id in related_ids {
                associations.entry(related_id.0).or_default().push(material_id);
            }
        }

        Self {
            resolver,
            associations,
        }
    }

    fn associated(&self, id: EntityId) -> impl Iterator<Item = Arc<DecodedEntity>> + '_ {
        self.associations
            .get(&id.0)
            .into_iter()
            .flatten()
            .filter_map(|material_id| self.resolver.get(*material_id))
    }

    /// The layer set behind a usage or a layer set itself
    fn layer_set(&self, definition: &DecodedEntity) -> Option<Arc<DecodedEntity>> {
        match definition.ifc_type {
            // ForLayerSet at 0
            IfcType::IfcMaterialLayerSetUsage => self
                .resolver
                .get(definition.get_ref(0)?)
                .filter(|set| set.ifc_type == IfcType::IfcMaterialLayerSet),
            IfcType::IfcMaterialLayerSet => self.resolver.get(definition.id),
            _ => None,
        }
    }

    /// IfcMaterialLayer(Material, LayerThickness, ...)
    fn layer(&self, layer: &DecodedEntity) -> Option<MaterialLayer> {
        if layer.ifc_type != IfcType::IfcMaterialLayer {
            return None;
        }
        let material = self.material_name(layer.get_ref(0)?)?;
        let thickness = layer.get_float(1)?;
        Some(MaterialLayer::new(material, thickness))
    }

    /// IfcMaterial Name at 0
    fn material_name(&self, id: EntityId) -> Option<String> {
        let material = self.resolver.get(id)?;
        (material.ifc_type == IfcType::IfcMaterial)
            .then(|| material.get_string(0).map(str::to_string))
            .flatten()
    }
}

impl MaterialReader for MaterialReaderImpl {
    fn material_layers(&self, id: EntityId) -> Vec<MaterialLayer> {
        let Some(set) = self.associated(id).find_map(|def| self.layer_set(&def)) else {
            return Vec::new();
        };

        // MaterialLayers at 0
        set.get_refs(0)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|layer_id| self.resolver.get(layer_id))
            .filter_map(|layer| {
                let parsed = self.layer(&layer);
                if parsed.is_none() {
                    log::debug!("Skipping malformed material layer {}", layer.id);
                }
                parsed
            })
            .collect()
    }

    fn material_names(&self, id: EntityId) -> Vec<String> {
        let mut names = Vec::new();
        for definition in self.associated(id) {
            match definition.ifc_type {
                IfcType::IfcMaterial => names.extend(self.material_name(definition.id)),
                // Materials at 0
                IfcType::IfcMaterialList => names.extend(
                    definition
                        .get_refs(0)
                        .unwrap_or_default()
                        .into_iter()
                        .filter_map(|m| self.material_name(m)),
                ),
                _ => {
                    if let Some(set) = self.layer_set(&definition) {
                        names.extend(
                            set.get_refs(0)
                                .unwrap_or_default()
                                .into_iter()
                                .filter_map(|l| self.resolver.get(l))
                                .filter_map(|l| self.layer(&l))
                                .map(|l| l.material),
                        );
                    }
                }
            }
        }
        names
    }
}
