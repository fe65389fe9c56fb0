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

use crate::ecs::{component_index, Component, TypeSet};

/// A declarative "requires these, excludes those" predicate over an entity's
/// component types.
///
/// Built once, usually when a Core is registered, and compared against each
/// entity's [`TypeSet`]:
///
/// ```rust,ignore
/// let filter = ComponentFilter::new()
///     .requires::<Transform>()
///     .requires::<Model>()
///     .excludes::<Camera>();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentFilter {
    required: TypeSet,
    excluded: TypeSet,
}

impl ComponentFilter {
    /// Creates a filter that matches every entity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `T` to the required set.
    #[must_use]
    pub fn requires<T: Component>(mut self) -> Self {
        self.required.insert(component_index::<T>());
        self
    }

    /// Adds `T` to the excluded set.
    #[must_use]
    pub fn excludes<T: Component>(mut self) -> Self {
        self.excluded.insert(component_index::<T>());
        self
    }

    /// Returns `true` iff every required type is in `types` and no excluded
    /// type is.
    #[must_use]
    pub fn matches(&self, types: &TypeSet) -> bool {
        self.required.is_subset(types) && self.excluded.is_disjoint(types)
    }

    /// The required type indices.
    #[must_use]
    pub fn required(&self) -> &TypeSet {
        &self.required
    }

    /// The excluded type indices.
    #[must_use]
    pub fn excluded(&self) -> &TypeSet {
        &self.excluded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Component;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[derive(Component)]
    struct A;
    #[derive(Component)]
    struct B;
    #[derive(Component)]
    struct C;

    #[test]
    fn builder_accumulates_types() {
        let filter = ComponentFilter::new().requires::<A>().requires::<B>().excludes::<C>();
        assert!(filter.required().contains(component_index::<A>()));
        assert!(filter.required().contains(component_index::<B>()));
        assert!(filter.excluded().contains(component_index::<C>()));
        assert_eq!(filter.required().len(), 2);
    }

    #[test]
    fn matches_requires_and_excludes() {
        let filter = ComponentFilter::new().requires::<A>().excludes::<C>();
        let a = component_index::<A>();
        let b = component_index::<B>();
        let c = component_index::<C>();

        assert!(filter.matches(&[a].into_iter().collect()));
        assert!(filter.matches(&[a, b].into_iter().collect()));
        assert!(!filter.matches(&[b].into_iter().collect()));
        assert!(!filter.matches(&[a, c].into_iter().collect()));
        assert!(ComponentFilter::new().matches(&TypeSet::new()));
    }

    #[test]
    fn filters_compare_by_content() {
        let left = ComponentFilter::new().requires::<A>().requires::<B>();
        let right = ComponentFilter::new().requires::<B>().requires::<A>();
        assert_eq!(left, right);
        assert_ne!(left, ComponentFilter::new().requires::<A>());
    }

    #[test]
    fn matches_agrees_with_set_definition_on_random_sets() {
        // Raw indices are enough here: the filter only sees TypeSets.
        let mut rng = StdRng::seed_from_u64(0x5EED);
        for _ in 0..2_000 {
            let universe = rng.gen_range(1..160);
            let pick = |rng: &mut StdRng, p: f64| -> Vec<usize> {
                (0..universe).filter(|_| rng.gen_bool(p)).collect()
            };
            let required = pick(&mut rng, 0.05);
            let excluded = pick(&mut rng, 0.05);
            let entity = pick(&mut rng, 0.5);

            let filter = ComponentFilter {
                required: required.iter().copied().collect(),
                excluded: excluded.iter().copied().collect(),
            };
            let types: TypeSet = entity.iter().copied().collect();

            let expected = required.iter().all(|r| entity.contains(r))
                && excluded.iter().all(|x| !entity.contains(x));
            assert_eq!(
                filter.matches(&types),
                expected,
                "required={required:?} excluded={excluded:?} entity={entity:?}"
            );
        }
    }
}
