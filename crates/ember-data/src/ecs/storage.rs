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

//! Per-type component storage.

use crate::ecs::{Component, EcsError};
use ember_core::ecs::EntityId;
use std::any::Any;

/// Dense storage for every component of type `T`, keyed by entity slot.
///
/// Implemented as a sparse set: `sparse[slot]` points into the packed
/// `dense`/`owners` columns. Add, lookup and removal are O(1); removal
/// swap-removes the last element into the hole.
///
/// Lookups compare the full [`EntityId`], so an id whose slot has since been
/// recycled never resolves to the new occupant's component.
pub struct ComponentStorage<T: Component> {
    sparse: Vec<Option<u32>>,
    dense: Vec<T>,
    owners: Vec<EntityId>,
}

impl<T: Component> ComponentStorage<T> {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self {
            sparse: Vec::new(),
            dense: Vec::new(),
            owners: Vec::new(),
        }
    }

    /// Stores `value` for `entity`.
    ///
    /// Fails with [`EcsError::DuplicateComponent`] if the slot already holds a
    /// `T`; the stored value is left untouched and `value` is dropped.
    pub fn insert(&mut self, entity: EntityId, value: T) -> Result<&mut T, EcsError> {
        if self.contains(entity) {
            return Err(EcsError::DuplicateComponent {
                entity,
                component: T::NAME,
            });
        }

        let slot = entity.slot();
        if let Some(Some(index)) = self.sparse.get(slot).copied() {
            // The World clears storages on destroy, so a leftover from an
            // older generation means a bookkeeping bug upstream.
            let stale = self.owners[index as usize];
            log::warn!(
                "Evicting stale `{}` of {} before inserting for {}",
                T::NAME,
                stale,
                entity
            );
            self.remove(stale);
        }

        if slot >= self.sparse.len() {
            self.sparse.resize(slot + 1, None);
        }
        let index = self.dense.len();
        self.sparse[slot] = Some(index as u32);
        self.dense.push(value);
        self.owners.push(entity);
        Ok(&mut self.dense[index])
    }

    /// Returns the component of `entity`, if any.
    #[must_use]
    pub fn get(&self, entity: EntityId) -> Option<&T> {
        self.dense_index(entity).map(|i| &self.dense[i])
    }

    /// Returns the component of `entity` mutably, if any.
    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut T> {
        self.dense_index(entity).map(|i| &mut self.dense[i])
    }

    /// Returns `true` if `entity` holds a `T`.
    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.dense_index(entity).is_some()
    }

    /// Removes and returns the component of `entity`. No-op if absent.
    pub fn remove(&mut self, entity: EntityId) -> Option<T> {
        let index = self.dense_index(entity)?;
        self.sparse[entity.slot()] = None;

        let value = self.dense.swap_remove(index);
        self.owners.swap_remove(index);

        // Re-point the element that was moved into the hole.
        if let Some(&moved) = self.owners.get(index) {
            self.sparse[moved.slot()] = Some(index as u32);
        }
        Some(value)
    }

    /// Returns the number of stored components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// Returns `true` if no component is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Iterates over `(owner, component)` pairs.
    ///
    /// Every call starts a fresh pass. Order is storage order, which changes
    /// when components are removed.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> + '_ {
        self.owners.iter().copied().zip(self.dense.iter())
    }

    /// Iterates mutably over `(owner, component)` pairs.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> + '_ {
        self.owners.iter().copied().zip(self.dense.iter_mut())
    }

    /// Iterates over the owners.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.owners.iter().copied()
    }

    fn dense_index(&self, entity: EntityId) -> Option<usize> {
        let index = (*self.sparse.get(entity.slot())?)? as usize;
        (self.owners[index] == entity).then_some(index)
    }
}

impl<T: Component> Default for ComponentStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased view over a [`ComponentStorage`], used by the `World` to
/// manage components without knowing their concrete type.
pub(crate) trait AnyStorage: Send + Sync {
    fn type_name(&self) -> &'static str;
    fn contains(&self, entity: EntityId) -> bool;
    fn remove_erased(&mut self, entity: EntityId) -> bool;
    fn len(&self) -> usize;
    fn clear(&mut self);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> AnyStorage for ComponentStorage<T> {
    fn type_name(&self) -> &'static str {
        T::NAME
    }

    fn contains(&self, entity: EntityId) -> bool {
        ComponentStorage::contains(self, entity)
    }

    fn remove_erased(&mut self, entity: EntityId) -> bool {
        self.remove(entity).is_some()
    }

    fn len(&self) -> usize {
        self.dense.len()
    }

    fn clear(&mut self) {
        self.sparse.clear();
        self.dense.clear();
        self.owners.clear();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
