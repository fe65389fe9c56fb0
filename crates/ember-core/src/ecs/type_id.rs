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

//! Process-wide registry of small, dense type indices.
//!
//! Each *family* (components, resources, ...) owns an independent counter.
//! The first time a type is requested within a family it receives the next
//! free index; every later request returns the cached value. Indices are only
//! meaningful for the lifetime of the process and are never persisted.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{OnceLock, PoisonError, RwLock};

/// A numbering space for type indices.
///
/// Implemented by zero-sized marker types. Two families never share numbers:
/// the first component type and the first resource type both receive index 0.
pub trait TypeFamily: 'static {
    /// Human readable family name, used in diagnostics.
    const NAME: &'static str;
}

/// The family of ECS component types.
#[derive(Debug, Clone, Copy)]
pub struct ComponentFamily;

impl TypeFamily for ComponentFamily {
    const NAME: &'static str = "component";
}

/// The family of world-global resource types.
#[derive(Debug, Clone, Copy)]
pub struct ResourceFamily;

impl TypeFamily for ResourceFamily {
    const NAME: &'static str = "resource";
}

#[derive(Default)]
struct Registry {
    indices: HashMap<(TypeId, TypeId), usize>,
    counters: HashMap<TypeId, usize>,
}

fn registry() -> &'static RwLock<Registry> {
    static REGISTRY: OnceLock<RwLock<Registry>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(Registry::default()))
}

/// Returns the dense index of `T` within the family `F`.
///
/// Safe to call from any thread. The fast path only takes a read lock.
pub fn type_index<F: TypeFamily, T: 'static>() -> usize {
    let key = (TypeId::of::<F>(), TypeId::of::<T>());

    {
        let registry = registry().read().unwrap_or_else(PoisonError::into_inner);
        if let Some(&index) = registry.indices.get(&key) {
            return index;
        }
    }

    let mut registry = registry().write().unwrap_or_else(PoisonError::into_inner);
    // Another thread may have registered the type between the two locks.
    if let Some(&index) = registry.indices.get(&key) {
        return index;
    }

    let counter = registry.counters.entry(key.0).or_insert(0);
    let index = *counter;
    *counter += 1;
    registry.indices.insert(key, index);

    log::trace!(
        "Registered {} type '{}' with index {}",
        F::NAME,
        std::any::type_name::<T>(),
        index
    );
    index
}

/// Returns how many types have been assigned an index in the family `F`.
pub fn registered_count<F: TypeFamily>() -> usize {
    registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .counters
        .get(&TypeId::of::<F>())
        .copied()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    // Families private to these tests, so parallel tests in other modules
    // registering real component types cannot shift the expected numbers.
    struct AlphaFamily;
    impl TypeFamily for AlphaFamily {
        const NAME: &'static str = "alpha";
    }

    struct BetaFamily;
    impl TypeFamily for BetaFamily {
        const NAME: &'static str = "beta";
    }

    struct ThreadedFamily;
    impl TypeFamily for ThreadedFamily {
        const NAME: &'static str = "threaded";
    }

    struct A;
    struct B;
    struct C;

    #[test]
    fn indices_are_stable_and_distinct() {
        let a = type_index::<AlphaFamily, A>();
        let b = type_index::<AlphaFamily, B>();
        assert_ne!(a, b);
        assert_eq!(type_index::<AlphaFamily, A>(), a);
        assert_eq!(type_index::<AlphaFamily, B>(), b);
    }

    #[test]
    fn families_number_independently() {
        let first = type_index::<BetaFamily, C>();
        assert_eq!(first, 0, "first type of a fresh family starts at zero");
        assert_eq!(registered_count::<BetaFamily>(), 1);
        // C may already be known to AlphaFamily or not; its beta index is unaffected.
        let _ = type_index::<AlphaFamily, C>();
        assert_eq!(type_index::<BetaFamily, C>(), 0);
    }

    #[test]
    fn concurrent_registration_hands_out_one_index() {
        struct Shared;
        let handles: Vec<_> = (0..8)
            .map(|_| thread::spawn(type_index::<ThreadedFamily, Shared>))
            .collect();
        let indices: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(indices.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(registered_count::<ThreadedFamily>(), 1);
    }
}
