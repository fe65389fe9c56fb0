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

//! Internal entity slot table and id recycling.

use crate::ecs::TypeSet;
use ember_core::ecs::EntityId;

/// Lifecycle of an entity slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotState {
    /// Not in use; the slot index sits in the free list.
    Free,
    /// Created this frame; invisible to Cores until the next flush.
    Pending,
    /// Flushed and visible to Cores.
    Alive,
}

/// One entry of the slot table.
#[derive(Debug, Clone)]
pub(crate) struct Slot {
    /// The id currently (or last) issued for this slot.
    pub(crate) id: EntityId,
    pub(crate) state: SlotState,
    /// Component type indices attached to the entity.
    pub(crate) types: TypeSet,
}

/// Internal manager for entity slots.
///
/// Slots are never shrunk. Destroyed slots go to a free list and are handed
/// out again with a bumped generation, so ids minted before the recycle stop
/// matching.
#[derive(Debug, Default)]
pub(crate) struct EntityStore {
    slots: Vec<Slot>,
    free: Vec<usize>,
}

impl EntityStore {
    /// Creates a new, empty store.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Allocates a new or recycled id in the `Pending` state.
    pub(crate) fn allocate(&mut self) -> EntityId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.id = slot.id.next_generation();
            slot.state = SlotState::Pending;
            slot.types.clear();
            slot.id
        } else {
            let id = EntityId::new(self.slots.len() as u64, 1);
            self.slots.push(Slot {
                id,
                state: SlotState::Pending,
                types: TypeSet::new(),
            });
            id
        }
    }

    /// Returns the slot of a live (pending or alive) entity.
    pub(crate) fn get(&self, id: EntityId) -> Option<&Slot> {
        self.slots
            .get(id.slot())
            .filter(|slot| slot.id == id && slot.state != SlotState::Free)
    }

    /// Returns the slot of a live (pending or alive) entity mutably.
    pub(crate) fn get_mut(&mut self, id: EntityId) -> Option<&mut Slot> {
        self.slots
            .get_mut(id.slot())
            .filter(|slot| slot.id == id && slot.state != SlotState::Free)
    }

    /// Returns `true` if `id` refers to a pending or alive entity.
    pub(crate) fn is_live(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Returns the id currently issued for a slot index, whatever its state.
    pub(crate) fn current_id(&self, slot: usize) -> Option<EntityId> {
        self.slots.get(slot).map(|s| s.id)
    }

    /// Returns the slot to the free list.
    pub(crate) fn release(&mut self, id: EntityId) -> bool {
        match self.get_mut(id) {
            Some(slot) => {
                slot.state = SlotState::Free;
                slot.types.clear();
                self.free.push(id.slot());
                true
            }
            None => false,
        }
    }

    /// Releases every slot, keeping generations so old ids stay stale.
    pub(crate) fn release_all(&mut self) {
        self.free.clear();
        for (index, slot) in self.slots.iter_mut().enumerate().rev() {
            slot.state = SlotState::Free;
            slot.types.clear();
            self.free.push(index);
        }
    }

    /// Iterates over entities in the `Alive` state, in slot order.
    pub(crate) fn alive(&self) -> impl Iterator<Item = &Slot> + '_ {
        self.slots.iter().filter(|s| s.state == SlotState::Alive)
    }

    /// Returns the number of pending or alive entities.
    pub(crate) fn live_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Returns the total number of slots ever allocated.
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_start_at_generation_one() {
        let mut store = EntityStore::new();
        let first = store.allocate();
        assert_eq!(first.index(), 0);
        assert_eq!(first.generation(), 1);
        assert!(!first.is_null());
    }

    #[test]
    fn recycled_slot_bumps_generation() {
        let mut store = EntityStore::new();
        let a = store.allocate();
        assert!(store.release(a));
        let b = store.allocate();

        assert_eq!(a.index(), b.index());
        assert_eq!(b.generation(), a.generation() + 1);
        assert!(!store.is_live(a));
        assert!(store.is_live(b));
        assert!(!store.release(a), "releasing a stale id is rejected");
    }

    #[test]
    fn release_all_keeps_generations() {
        let mut store = EntityStore::new();
        let ids: Vec<_> = (0..3).map(|_| store.allocate()).collect();
        store.release_all();
        assert_eq!(store.live_count(), 0);

        let again: Vec<_> = (0..3).map(|_| store.allocate()).collect();
        // Slots are reused in ascending order after a full release.
        for (old, new) in ids.iter().zip(again.iter()) {
            assert_eq!(old.index(), new.index());
            assert_ne!(old, new);
        }
    }
}
