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

//! Parent/child operations on the [`Transform`] hierarchy.
//!
//! Links are stored on both ends (the child's `parent`, the parent's ordered
//! `children`), so every operation that touches two nodes lives here on the
//! [`World`] rather than on the component.

use crate::ecs::{EcsError, Transform, World};
use ember_core::ecs::EntityId;
use ember_core::math::Vec3;

impl World {
    /// Makes `parent` the parent of `child`.
    ///
    /// - No-op if `parent` already is the parent.
    /// - Fails with [`EcsError::HierarchyCycle`] if `parent` is `child` or one
    ///   of its descendants.
    /// - The child is removed from its old parent's children before being
    ///   appended to the new parent's, and is marked dirty.
    pub fn set_parent(&mut self, child: EntityId, parent: EntityId) -> Result<(), EcsError> {
        let old_parent = self.get_component::<Transform>(child)?.parent();
        self.get_component::<Transform>(parent)?;

        if old_parent == Some(parent) {
            return Ok(());
        }
        if child == parent || self.is_ancestor_of(child, parent) {
            log::error!("Rejected re-parenting {child} under {parent}: cycle.");
            return Err(EcsError::HierarchyCycle { child, parent });
        }

        if let Some(old) = old_parent {
            if let Some(transform) = self.try_get_component_mut::<Transform>(old) {
                transform.remove_child_link(child);
            }
        }
        self.get_component_mut::<Transform>(parent)?.push_child(child);
        self.get_component_mut::<Transform>(child)?
            .set_parent_link(Some(parent));
        log::trace!("{child} re-parented from {old_parent:?} to {parent}.");
        Ok(())
    }

    /// Detaches `child` from `parent`.
    ///
    /// Returns `false` if `child` was not a child of `parent`.
    pub fn remove_child(&mut self, parent: EntityId, child: EntityId) -> Result<bool, EcsError> {
        let removed = self
            .get_component_mut::<Transform>(parent)?
            .remove_child_link(child);
        if let Some(transform) = self.try_get_component_mut::<Transform>(child) {
            if transform.parent() == Some(parent) {
                transform.set_parent_link(None);
            }
        }
        Ok(removed)
    }

    /// The parent of `entity`, if it has a `Transform` and a parent.
    #[must_use]
    pub fn parent_of(&self, entity: EntityId) -> Option<EntityId> {
        self.try_get_component::<Transform>(entity)?.parent()
    }

    /// The children of `entity` in insertion order; empty without a `Transform`.
    #[must_use]
    pub fn children_of(&self, entity: EntityId) -> &[EntityId] {
        self.try_get_component::<Transform>(entity)
            .map(Transform::children)
            .unwrap_or(&[])
    }

    /// The first direct child of `parent` named `name`.
    #[must_use]
    pub fn child_by_name(&self, parent: EntityId, name: &str) -> Option<EntityId> {
        self.children_of(parent).iter().copied().find(|child| {
            self.try_get_component::<Transform>(*child)
                .is_some_and(|t| t.name() == name)
        })
    }

    /// Every descendant of `entity`, depth-first in child order, excluding
    /// `entity` itself.
    #[must_use]
    pub fn descendants_of(&self, entity: EntityId) -> Vec<EntityId> {
        let mut out = Vec::new();
        let mut stack: Vec<EntityId> = self.children_of(entity).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children_of(node).iter().rev().copied());
        }
        out
    }

    /// Returns `true` if `ancestor` is on the parent chain of `entity`.
    #[must_use]
    pub fn is_ancestor_of(&self, ancestor: EntityId, entity: EntityId) -> bool {
        let mut cursor = self.parent_of(entity);
        // Bounded walk: a chain can't be longer than the number of entities.
        for _ in 0..=self.entity_count() {
            match cursor {
                Some(node) if node == ancestor => return true,
                Some(node) => cursor = self.parent_of(node),
                None => return false,
            }
        }
        false
    }

    /// Marks `entity` and every descendant dirty.
    pub fn mark_subtree_dirty(&mut self, entity: EntityId) -> Result<(), EcsError> {
        self.get_component_mut::<Transform>(entity)?.mark_dirty();
        for node in self.descendants_of(entity) {
            if let Some(transform) = self.try_get_component_mut::<Transform>(node) {
                transform.mark_dirty();
            }
        }
        Ok(())
    }

    /// Moves `entity` so that its world position becomes `position`.
    ///
    /// Uses the parent's world matrix from the last scene graph pass.
    pub fn set_world_position(&mut self, entity: EntityId, position: Vec3) -> Result<(), EcsError> {
        let local = match self.parent_of(entity) {
            Some(parent) => self
                .get_component::<Transform>(parent)?
                .world_matrix()
                .inverse()
                .transform_point3(position),
            None => position,
        };
        self.get_component_mut::<Transform>(entity)?.set_position(local);
        Ok(())
    }

    /// Queues `entity` and its whole `Transform` subtree for destruction.
    ///
    /// Fails without queueing anything if `entity` is not live. Descendants
    /// that are no longer live are skipped.
    pub fn destroy_recursive(&mut self, entity: EntityId) -> Result<(), EcsError> {
        let descendants: Vec<EntityId> = self
            .descendants_of(entity)
            .into_iter()
            .filter(|node| self.is_alive(*node))
            .collect();
        self.destroy_entity(entity)?;
        for node in descendants {
            self.destroy_entity(node)?;
        }
        log::debug!("Queued {entity} and its subtree for destruction.");
        Ok(())
    }

    /// Cuts every hierarchy link of `entity` before its `Transform` goes away.
    ///
    /// Returns the children left without a parent, marked dirty.
    pub(crate) fn unlink_transform(&mut self, entity: EntityId) -> Vec<EntityId> {
        let Some(transform) = self.try_get_component::<Transform>(entity) else {
            return Vec::new();
        };
        let parent = transform.parent();
        let children = transform.children().to_vec();

        if let Some(parent) = parent {
            if let Some(transform) = self.try_get_component_mut::<Transform>(parent) {
                transform.remove_child_link(entity);
            }
        }

        let mut orphans = Vec::new();
        for child in children {
            if let Some(transform) = self.try_get_component_mut::<Transform>(child) {
                if transform.parent() == Some(entity) {
                    transform.set_parent_link(None);
                    orphans.push(child);
                }
            }
        }
        if let Some(transform) = self.try_get_component_mut::<Transform>(entity) {
            transform.clear_links();
        }
        orphans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::math::Mat4;

    fn node(world: &mut World, name: &str) -> EntityId {
        let id = world.create_entity();
        world.add_component(id, Transform::new(name)).unwrap();
        id
    }

    #[test]
    fn set_parent_links_both_ends() {
        let mut world = World::new();
        let a = node(&mut world, "a");
        let b = node(&mut world, "b");

        world.set_parent(b, a).unwrap();

        assert_eq!(world.parent_of(b), Some(a));
        assert_eq!(world.children_of(a), &[b]);
        assert!(world.get_component::<Transform>(b).unwrap().is_dirty());
    }

    #[test]
    fn reparenting_moves_the_child() {
        let mut world = World::new();
        let a = node(&mut world, "a");
        let b = node(&mut world, "b");
        let c = node(&mut world, "c");

        world.set_parent(c, a).unwrap();
        world.set_parent(c, b).unwrap();

        assert!(world.children_of(a).is_empty(), "old parent must forget the child");
        assert_eq!(world.children_of(b), &[c]);

        // Same parent again is a no-op and does not duplicate the link.
        world.set_parent(c, b).unwrap();
        assert_eq!(world.children_of(b), &[c]);
    }

    #[test]
    fn cycles_are_rejected() {
        let mut world = World::new();
        let a = node(&mut world, "a");
        let b = node(&mut world, "b");
        let c = node(&mut world, "c");
        world.set_parent(b, a).unwrap();
        world.set_parent(c, b).unwrap();

        assert!(matches!(
            world.set_parent(a, c),
            Err(EcsError::HierarchyCycle { .. })
        ));
        assert!(matches!(
            world.set_parent(a, a),
            Err(EcsError::HierarchyCycle { .. })
        ));
        assert_eq!(world.parent_of(a), None, "a failed re-parent changes nothing");
    }

    #[test]
    fn descendants_are_depth_first_in_child_order() {
        let mut world = World::new();
        let root = node(&mut world, "root");
        let a = node(&mut world, "a");
        let a1 = node(&mut world, "a1");
        let b = node(&mut world, "b");
        world.set_parent(a, root).unwrap();
        world.set_parent(b, root).unwrap();
        world.set_parent(a1, a).unwrap();

        assert_eq!(world.descendants_of(root), vec![a, a1, b]);
        assert_eq!(world.child_by_name(root, "b"), Some(b));
        assert_eq!(world.child_by_name(root, "a1"), None, "only direct children are searched");
    }

    #[test]
    fn remove_child_clears_the_parent_link() {
        let mut world = World::new();
        let a = node(&mut world, "a");
        let b = node(&mut world, "b");
        world.set_parent(b, a).unwrap();

        assert!(world.remove_child(a, b).unwrap());
        assert_eq!(world.parent_of(b), None);
        assert!(!world.remove_child(a, b).unwrap());
    }

    #[test]
    fn mark_subtree_dirty_reaches_every_descendant() {
        let mut world = World::new();
        let a = node(&mut world, "a");
        let b = node(&mut world, "b");
        let c = node(&mut world, "c");
        world.set_parent(b, a).unwrap();
        world.set_parent(c, b).unwrap();
        for id in [a, b, c] {
            world
                .get_component_mut::<Transform>(id)
                .unwrap()
                .apply_world_matrix(Mat4::IDENTITY);
        }

        world.mark_subtree_dirty(b).unwrap();

        assert!(!world.get_component::<Transform>(a).unwrap().is_dirty());
        assert!(world.get_component::<Transform>(b).unwrap().is_dirty());
        assert!(world.get_component::<Transform>(c).unwrap().is_dirty());
    }

    #[test]
    fn set_world_position_is_parent_relative() {
        let mut world = World::new();
        let parent = node(&mut world, "parent");
        let child = node(&mut world, "child");
        world.set_parent(child, parent).unwrap();
        world
            .get_component_mut::<Transform>(parent)
            .unwrap()
            .apply_world_matrix(Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0)));

        world.set_world_position(child, Vec3::new(12.0, 1.0, 0.0)).unwrap();

        let local = world.get_component::<Transform>(child).unwrap().position();
        assert_eq!(local, Vec3::new(2.0, 1.0, 0.0));
    }

    #[test]
    fn destroy_recursive_queues_the_subtree() {
        let mut world = World::new();
        let a = node(&mut world, "a");
        let b = node(&mut world, "b");
        let c = node(&mut world, "c");
        let other = node(&mut world, "other");
        world.set_parent(b, a).unwrap();
        world.set_parent(c, b).unwrap();
        world.simulate();

        world.destroy_recursive(a).unwrap();
        world.simulate();

        for id in [a, b, c] {
            assert!(!world.is_alive(id), "{id} should be destroyed");
        }
        assert!(world.is_alive(other));
    }

    #[test]
    fn destroy_recursive_skips_stale_descendants() {
        let mut world = World::new();
        let a = node(&mut world, "a");
        let b = node(&mut world, "b");
        let stale = world.create_entity();
        world.destroy_entity(stale).unwrap();
        world.simulate();
        // A dangling link left behind by a raw edit of the children list.
        world
            .get_component_mut::<Transform>(a)
            .unwrap()
            .push_child(stale);
        world.set_parent(b, a).unwrap();

        world.destroy_recursive(a).unwrap();

        assert!(world.is_pending_destroy(a));
        assert!(world.is_pending_destroy(b), "live descendants after the stale one are queued");
    }

    #[test]
    fn destroy_recursive_of_a_dead_entity_queues_nothing() {
        let mut world = World::new();
        let a = node(&mut world, "a");
        world.destroy_entity(a).unwrap();
        world.simulate();

        assert!(matches!(
            world.destroy_recursive(a),
            Err(EcsError::InvalidEntity { .. })
        ));
        assert_eq!(world.pending_count(), 0);
    }

    #[test]
    fn pending_child_destroyed_before_flush_leaves_no_link() {
        let mut world = World::new();
        let parent = node(&mut world, "parent");
        world.simulate();
        let child = node(&mut world, "child");
        let grandchild = node(&mut world, "grandchild");
        world.set_parent(child, parent).unwrap();
        world.set_parent(grandchild, child).unwrap();

        world.destroy_entity(child).unwrap();
        world.simulate();

        assert!(!world.is_alive(child));
        assert!(world.children_of(parent).is_empty());
        assert!(world.descendants_of(parent).is_empty());
        assert_eq!(world.parent_of(grandchild), None);
        assert_eq!(world.take_orphaned_transforms(), vec![grandchild]);
    }

    #[test]
    fn removing_a_transform_without_cores_unlinks_it() {
        let mut world = World::new();
        let a = node(&mut world, "a");
        let b = node(&mut world, "b");
        let c = node(&mut world, "c");
        world.set_parent(b, a).unwrap();
        world.set_parent(c, b).unwrap();
        world.simulate();

        world.remove_component::<Transform>(b).unwrap();
        world.simulate();

        assert!(world.is_alive(b));
        assert!(world.children_of(a).is_empty());
        assert_eq!(world.parent_of(c), None);
    }

    #[test]
    fn cloned_transforms_carry_no_links() {
        let mut world = World::new();
        let parent = node(&mut world, "parent");
        let child = node(&mut world, "child");
        world.set_parent(child, parent).unwrap();

        let copy = world.get_component::<Transform>(child).unwrap().clone();
        let twin = world.spawn().with(copy).unwrap().id();

        assert_eq!(world.parent_of(twin), None);
        assert_eq!(world.children_of(parent), &[child]);
        let twin_transform = world.get_component::<Transform>(twin).unwrap();
        assert!(twin_transform.children().is_empty());
        assert!(twin_transform.is_dirty());
        assert_eq!(twin_transform.name(), "child");
    }
}
