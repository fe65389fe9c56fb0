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

//! Non-owning, validated references to entities.

use crate::ecs::{EcsError, EntityMut, EntityRef, World};
use ember_core::ecs::EntityId;
use std::sync::{Arc, Weak};

/// Liveness token owned by a `World` for the duration of one scene.
///
/// The world replaces its anchor on every scene unload and drops it with
/// itself, which is how handles learn that their world is gone.
#[derive(Debug)]
pub(crate) struct WorldAnchor {
    pub(crate) scene_serial: u64,
}

/// A copyable reference to an entity that is safe to keep across frames.
///
/// A handle does not keep the entity alive. Every resolution re-validates it:
///
/// - [`EcsError::WorldTornDown`] when the owning world, or the scene the
///   handle was created in, no longer exists;
/// - [`EcsError::StaleHandle`] when the slot has been recycled or the handle
///   is resolved against a different world.
#[derive(Debug, Clone)]
pub struct EntityHandle {
    id: EntityId,
    anchor: Weak<WorldAnchor>,
}

impl EntityHandle {
    pub(crate) fn new(id: EntityId, anchor: &Arc<WorldAnchor>) -> Self {
        Self {
            id,
            anchor: Arc::downgrade(anchor),
        }
    }

    /// Returns the id the handle was created for, without validating it.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Validates the handle against `world` and returns the live id.
    pub fn resolve(&self, world: &World) -> Result<EntityId, EcsError> {
        let anchor = self
            .anchor
            .upgrade()
            .ok_or(EcsError::WorldTornDown { entity: self.id })?;

        if !Arc::ptr_eq(&anchor, world.anchor()) {
            return Err(EcsError::StaleHandle { entity: self.id });
        }
        if !world.is_alive(self.id) {
            return Err(EcsError::StaleHandle { entity: self.id });
        }
        Ok(self.id)
    }

    /// Resolves the handle to a read accessor.
    pub fn get<'w>(&self, world: &'w World) -> Result<EntityRef<'w>, EcsError> {
        let id = self.resolve(world)?;
        world.entity(id)
    }

    /// Resolves the handle to a write accessor.
    pub fn get_mut<'w>(&self, world: &'w mut World) -> Result<EntityMut<'w>, EcsError> {
        let id = self.resolve(world)?;
        world.entity_mut(id)
    }

    /// Returns `true` if the handle currently resolves against `world`.
    #[must_use]
    pub fn is_valid(&self, world: &World) -> bool {
        self.resolve(world).is_ok()
    }
}

impl PartialEq for EntityHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && Weak::ptr_eq(&self.anchor, &other.anchor)
    }
}

impl Eq for EntityHandle {}
