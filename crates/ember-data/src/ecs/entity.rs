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

//! Typed accessors bound to a single live entity.

use crate::ecs::{Component, EcsError, EntityHandle, World};
use ember_core::ecs::EntityId;

#[cold]
#[track_caller]
fn missing_component<T: Component>(entity: EntityId) -> ! {
    let error = EcsError::MissingComponent {
        entity,
        component: T::NAME,
    };
    log::error!("{error}");
    panic!("{error}");
}

/// Read access to one live entity.
///
/// Obtained from [`World::entity`] or [`EntityHandle::get`]. The accessor
/// borrows the world, so the entity cannot be destroyed while it is held.
#[derive(Clone, Copy)]
pub struct EntityRef<'w> {
    world: &'w World,
    id: EntityId,
}

impl<'w> EntityRef<'w> {
    pub(crate) fn new(world: &'w World, id: EntityId) -> Self {
        Self { world, id }
    }

    /// The entity's id.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the entity's `T`.
    ///
    /// # Panics
    ///
    /// Panics with a diagnostic naming the entity and the type if the entity
    /// has no `T`. Use [`try_get_component`](Self::try_get_component) when
    /// absence is expected.
    #[track_caller]
    pub fn get_component<T: Component>(&self) -> &'w T {
        self.try_get_component::<T>()
            .unwrap_or_else(|| missing_component::<T>(self.id))
    }

    /// Returns the entity's `T`, or `None`.
    #[must_use]
    pub fn try_get_component<T: Component>(&self) -> Option<&'w T> {
        self.world.storage::<T>()?.get(self.id)
    }

    /// Returns `true` if the entity has a `T`.
    #[must_use]
    pub fn has_component<T: Component>(&self) -> bool {
        self.try_get_component::<T>().is_some()
    }

    /// Names of every component attached to the entity, in type-index order.
    #[must_use]
    pub fn get_all_components(&self) -> Vec<&'static str> {
        self.world.component_names(self.id)
    }

    /// Returns `true` until the next flush makes the entity visible to Cores.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.world.is_pending(self.id)
    }

    /// Creates a handle to this entity.
    #[must_use]
    pub fn handle(&self) -> EntityHandle {
        self.world.handle(self.id)
    }
}

impl std::fmt::Debug for EntityRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityRef")
            .field("id", &self.id)
            .field("components", &self.get_all_components())
            .finish()
    }
}

/// Write access to one live entity.
pub struct EntityMut<'w> {
    world: &'w mut World,
    id: EntityId,
}

impl<'w> EntityMut<'w> {
    pub(crate) fn new(world: &'w mut World, id: EntityId) -> Self {
        Self { world, id }
    }

    /// The entity's id.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Attaches `value` and returns a reference to the stored component.
    ///
    /// Fails with [`EcsError::DuplicateComponent`] if the entity already has a
    /// `T`; in that case nothing changes.
    pub fn add_component<T: Component>(&mut self, value: T) -> Result<&mut T, EcsError> {
        self.world.add_component(self.id, value)
    }

    /// Builder-style variant of [`add_component`](Self::add_component).
    pub fn with<T: Component>(mut self, value: T) -> Result<Self, EcsError> {
        self.world.add_component(self.id, value)?;
        Ok(self)
    }

    /// Returns the entity's `T`.
    ///
    /// # Panics
    ///
    /// Panics if the entity has no `T`.
    #[track_caller]
    pub fn get_component<T: Component>(&self) -> &T {
        self.try_get_component::<T>()
            .unwrap_or_else(|| missing_component::<T>(self.id))
    }

    /// Returns the entity's `T` mutably.
    ///
    /// # Panics
    ///
    /// Panics if the entity has no `T`.
    #[track_caller]
    pub fn get_component_mut<T: Component>(&mut self) -> &mut T {
        let id = self.id;
        match self.world.storage_mut::<T>().and_then(|s| s.get_mut(id)) {
            Some(component) => component,
            None => missing_component::<T>(id),
        }
    }

    /// Returns the entity's `T`, or `None`.
    #[must_use]
    pub fn try_get_component<T: Component>(&self) -> Option<&T> {
        self.world.storage::<T>()?.get(self.id)
    }

    /// Returns the entity's `T` mutably, or `None`.
    pub fn try_get_component_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.world.storage_mut::<T>()?.get_mut(self.id)
    }

    /// Returns `true` if the entity has a `T`.
    #[must_use]
    pub fn has_component<T: Component>(&self) -> bool {
        self.try_get_component::<T>().is_some()
    }

    /// Queues removal of the entity's `T` for the next flush.
    pub fn remove_component<T: Component>(&mut self) -> Result<(), EcsError> {
        self.world.remove_component::<T>(self.id)
    }

    /// Queues destruction of the entity for the next flush.
    pub fn destroy(self) -> Result<(), EcsError> {
        self.world.destroy_entity(self.id)
    }

    /// Names of every component attached to the entity.
    #[must_use]
    pub fn get_all_components(&self) -> Vec<&'static str> {
        self.world.component_names(self.id)
    }

    /// Creates a handle to this entity.
    #[must_use]
    pub fn handle(&self) -> EntityHandle {
        self.world.handle(self.id)
    }

    /// Borrows a read accessor for the same entity.
    #[must_use]
    pub fn as_entity_ref(&self) -> EntityRef<'_> {
        EntityRef::new(self.world, self.id)
    }
}
