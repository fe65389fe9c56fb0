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

//! World-global singletons ("resources") keyed by resource type index.

use ember_core::ecs::{type_index, ResourceFamily};
use std::any::Any;

/// A marker trait for world-global data such as a Core's output buffer.
pub trait Resource: Any + Send + Sync {}

impl<T: Any + Send + Sync> Resource for T {}

/// Type-indexed storage of at most one value per resource type.
///
/// Resources use the resource type family, so their indices never collide
/// with component indices.
#[derive(Default)]
pub struct Resources {
    entries: Vec<Option<Box<dyn Any + Send + Sync>>>,
}

impl Resources {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a resource, returning the previous value of that type.
    pub fn insert<R: Resource>(&mut self, value: R) -> Option<R> {
        let index = type_index::<ResourceFamily, R>();
        if index >= self.entries.len() {
            self.entries.resize_with(index + 1, || None);
        }
        self.entries[index]
            .replace(Box::new(value))
            .and_then(|old| old.downcast::<R>().ok())
            .map(|boxed| *boxed)
    }

    /// Returns the resource of type `R`, if present.
    pub fn get<R: Resource>(&self) -> Option<&R> {
        self.entries
            .get(type_index::<ResourceFamily, R>())?
            .as_ref()?
            .downcast_ref::<R>()
    }

    /// Returns the resource of type `R` mutably, if present.
    pub fn get_mut<R: Resource>(&mut self) -> Option<&mut R> {
        self.entries
            .get_mut(type_index::<ResourceFamily, R>())?
            .as_mut()?
            .downcast_mut::<R>()
    }

    /// Removes and returns the resource of type `R`.
    pub fn remove<R: Resource>(&mut self) -> Option<R> {
        self.entries
            .get_mut(type_index::<ResourceFamily, R>())?
            .take()?
            .downcast::<R>()
            .ok()
            .map(|boxed| *boxed)
    }

    /// Returns `true` if a resource of type `R` is present.
    pub fn contains<R: Resource>(&self) -> bool {
        self.get::<R>().is_some()
    }

    /// Returns the number of stored resources.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    /// Returns `true` if no resource is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct FrameCount(u64);

    #[derive(Debug, PartialEq)]
    struct Gravity(f32);

    #[test]
    fn insert_get_replace_remove() {
        let mut resources = Resources::new();
        assert_eq!(resources.insert(FrameCount(1)), None);
        assert_eq!(resources.insert(Gravity(-9.8)), None);

        assert_eq!(resources.get::<FrameCount>(), Some(&FrameCount(1)));
        resources.get_mut::<FrameCount>().unwrap().0 += 1;
        assert_eq!(resources.insert(FrameCount(10)), Some(FrameCount(2)));

        assert_eq!(resources.len(), 2);
        assert_eq!(resources.remove::<Gravity>(), Some(Gravity(-9.8)));
        assert!(!resources.contains::<Gravity>());
        assert_eq!(resources.remove::<Gravity>(), None);
    }
}
