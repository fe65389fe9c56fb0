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

//! Defines the packed entity identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

const INDEX_BITS: u32 = 48;
const INDEX_MASK: u64 = (1 << INDEX_BITS) - 1;

/// A unique identifier for an entity in the world.
///
/// The id packs a slot index in the low 48 bits and a generation counter in
/// the high 16 bits. When an entity is destroyed its slot can be recycled for
/// a new entity, but the generation is bumped first, so an old `EntityId`
/// pointing at the recycled slot compares unequal to the new occupant.
///
/// Generation 0 is reserved for [`EntityId::NULL`]; live entities always
/// carry a generation of 1 or more, so the first slot never aliases null.
///
/// Detection is opt-in: holding an `EntityId` does not keep anything alive,
/// callers compare ids (or go through an `EntityHandle`) before trusting them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// The null id: index 0, generation 0.
    pub const NULL: EntityId = EntityId(0);

    /// Largest slot index representable in the packed layout.
    pub const MAX_INDEX: u64 = INDEX_MASK;

    /// Packs a slot index and a generation into an id.
    ///
    /// Index bits above the 48-bit range are discarded.
    #[must_use]
    pub const fn new(index: u64, generation: u16) -> Self {
        Self(((generation as u64) << INDEX_BITS) | (index & INDEX_MASK))
    }

    /// Returns the slot index.
    #[must_use]
    pub const fn index(self) -> u64 {
        self.0 & INDEX_MASK
    }

    /// Returns the slot index as a `usize`, for indexing slot tables.
    #[must_use]
    pub const fn slot(self) -> usize {
        self.index() as usize
    }

    /// Returns the generation counter.
    #[must_use]
    pub const fn generation(self) -> u16 {
        (self.0 >> INDEX_BITS) as u16
    }

    /// Returns the raw packed value.
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        self.0
    }

    /// Rebuilds an id from a raw packed value.
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Returns `true` if both the index and the generation are zero.
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Returns the id the same slot gets after one more recycle.
    ///
    /// Wrapping skips generation 0.
    #[must_use]
    pub const fn next_generation(self) -> Self {
        let next = self.generation().wrapping_add(1);
        Self::new(self.index(), if next == 0 { 1 } else { next })
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({}v{})", self.index(), self.generation())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index(), self.generation())
    }
}
