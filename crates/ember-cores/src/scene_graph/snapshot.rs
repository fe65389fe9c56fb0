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

//! An immutable copy of the transform hierarchy, shareable with workers.

use ember_core::ecs::EntityId;
use ember_core::math::Mat4;
use ember_data::ecs::{Transform, World};

/// One node of the snapshot.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) entity: EntityId,
    pub(crate) local: Mat4,
    /// World matrix from the previous pass, used when the node is clean.
    pub(crate) world: Mat4,
    pub(crate) dirty: bool,
    pub(crate) children: Vec<usize>,
}

/// The hierarchy below the root, flattened; index 0 is the root.
#[derive(Debug, Default)]
pub(crate) struct Snapshot {
    pub(crate) nodes: Vec<Node>,
}

impl Snapshot {
    /// Copies the hierarchy reachable from `root`.
    ///
    /// Children without a `Transform` are skipped, as is any node reached a
    /// second time.
    pub(crate) fn capture(world: &World, root: EntityId) -> Self {
        let mut nodes = Vec::new();
        let Some(transform) = world.try_get_component::<Transform>(root) else {
            return Self { nodes };
        };
        nodes.push(Self::node(root, transform));

        let mut seen = std::collections::HashSet::from([root]);
        let mut cursor = 0;
        while cursor < nodes.len() {
            let entity = nodes[cursor].entity;
            for &child in world.children_of(entity) {
                if !seen.insert(child) {
                    log::warn!("Transform {child} is linked twice in the hierarchy; skipped.");
                    continue;
                }
                let Some(transform) = world.try_get_component::<Transform>(child) else {
                    continue;
                };
                let index = nodes.len();
                nodes.push(Self::node(child, transform));
                nodes[cursor].children.push(index);
            }
            cursor += 1;
        }
        Self { nodes }
    }

    fn node(entity: EntityId, transform: &Transform) -> Node {
        Node {
            entity,
            local: transform.local_matrix(),
            world: transform.world_matrix(),
            dirty: transform.is_dirty(),
            children: Vec::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Resolves one node: recomputes `parent_world * local` when the node is
    /// dirty or its parent was recomputed, otherwise keeps the previous world
    /// matrix. Returns the node's world matrix and whether it was recomputed.
    pub(crate) fn resolve(&self, index: usize, parent_world: Mat4, parent_recomputed: bool) -> (Mat4, bool) {
        let node = &self.nodes[index];
        if node.dirty || parent_recomputed {
            (parent_world * node.local, true)
        } else {
            (node.world, false)
        }
    }

    /// Walks the subtree rooted at `index` sequentially and returns the
    /// recomputed `(node, world matrix)` pairs.
    pub(crate) fn walk_subtree(
        &self,
        index: usize,
        parent_world: Mat4,
        parent_recomputed: bool,
    ) -> Vec<(usize, Mat4)> {
        let mut out = Vec::new();
        let mut stack = vec![(index, parent_world, parent_recomputed)];
        while let Some((index, parent_world, parent_recomputed)) = stack.pop() {
            let (world, recomputed) = self.resolve(index, parent_world, parent_recomputed);
            if recomputed {
                out.push((index, world));
            }
            for &child in &self.nodes[index].children {
                stack.push((child, world, recomputed));
            }
        }
        out
    }
}
