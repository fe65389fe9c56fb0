// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::registry::{find_registration, registrations};
use crate::ecs::{EcsError, World};
use ember_core::ecs::EntityId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A serialized scene.
///
/// ```json
/// {
///   "Entities": [
///     {
///       "Id": 281474976710657,
///       "Parent": null,
///       "Components": { "Transform": { "Position": [0.0, 1.0, 0.0] } }
///     }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SceneDocument {
    /// Entities in capture order. Parents may appear after their children.
    #[serde(default)]
    pub entities: Vec<EntityRecord>,
}

/// One entity of a [`SceneDocument`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EntityRecord {
    /// Document-local id, only meaningful for `Parent` references.
    pub id: u64,
    /// Document-local id of the parent; `None` attaches to the scene root.
    #[serde(default)]
    pub parent: Option<u64>,
    /// Serialized components keyed by registered name.
    #[serde(default)]
    pub components: Map<String, Value>,
}

impl SceneDocument {
    /// Parses a document from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, EcsError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Writes the document as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, EcsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Snapshots every flushed entity of `world`.
    ///
    /// `root` (the scene graph root, if any) is left out and its children are
    /// recorded without a parent. Components without a registration are
    /// skipped.
    pub fn capture(world: &World, root: Option<EntityId>) -> Self {
        let entities = world
            .entities()
            .filter(|id| Some(*id) != root)
            .map(|id| {
                let components = registrations()
                    .filter_map(|r| Some((r.name.to_owned(), r.capture(world, id)?)))
                    .collect();
                EntityRecord {
                    id: id.to_bits(),
                    parent: world
                        .parent_of(id)
                        .filter(|parent| Some(*parent) != root)
                        .map(EntityId::to_bits),
                    components,
                }
            })
            .collect::<Vec<_>>();
        log::debug!("Captured {} entities into a scene document.", entities.len());
        Self { entities }
    }

    /// Creates the document's entities in `world` and restores hierarchy
    /// links. Returns the mapping from document ids to the new entities.
    ///
    /// Entities become visible to Cores at the next flush; parentless
    /// transforms are then adopted by the scene graph root. On error every
    /// entity created so far is queued for destruction.
    pub fn instantiate(&self, world: &mut World) -> Result<HashMap<u64, EntityId>, EcsError> {
        let mut created = HashMap::with_capacity(self.entities.len());
        match self.instantiate_into(world, &mut created) {
            Ok(()) => {
                log::info!("Instantiated {} entities from a scene document.", created.len());
                Ok(created)
            }
            Err(error) => {
                log::error!("Scene document rejected: {error}");
                for id in created.into_values() {
                    // Freshly created ids are live; this cannot fail.
                    let _ = world.destroy_entity(id);
                }
                Err(error)
            }
        }
    }

    fn instantiate_into(
        &self,
        world: &mut World,
        created: &mut HashMap<u64, EntityId>,
    ) -> Result<(), EcsError> {
        for record in &self.entities {
            let id = world.create_entity();
            created.insert(record.id, id);
            for (name, value) in &record.components {
                let registration = find_registration(name)
                    .ok_or_else(|| EcsError::UnknownComponent(name.clone()))?;
                registration.restore(world, id, value)?;
            }
        }

        for record in &self.entities {
            let Some(parent) = record.parent else {
                continue;
            };
            let (Some(&child), Some(&parent_id)) = (created.get(&record.id), created.get(&parent)) else {
                log::warn!(
                    "Entity {} references unknown parent {parent}; attaching it to the root.",
                    record.id
                );
                continue;
            };
            world.set_parent(child, parent_id)?;
        }
        Ok(())
    }
}
