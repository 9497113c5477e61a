// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Material association access

use crate::EntityId;
use serde::{Deserialize, Serialize};

/// One layer of a layered material set, in file length units
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialLayer {
    /// Name of the layer's IfcMaterial
    pub material: String,
    /// LayerThickness as written in the file
    pub thickness: f64,
}

impl MaterialLayer {
    pub fn new(material: impl Into<String>, thickness: f64) -> Self {
        Self {
            material: material.into(),
            thickness,
        }
    }
}

/// Material reader trait
///
/// Follows IfcRelAssociatesMaterial from an element to its material
/// definition. Layer order is the order of the layer set.
pub trait MaterialReader: Send + Sync {
    /// Get the material layers associated with an entity
    ///
    /// Accepts both IfcMaterialLayerSetUsage and a directly associated
    /// IfcMaterialLayerSet. Elements without a layer set yield an empty list.
    fn material_layers(&self, id: EntityId) -> Vec<MaterialLayer>;

    /// Get the names of all materials associated with an entity
    fn material_names(&self, id: EntityId) -> Vec<String>;
}
