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

//! The scene graph: ownership of the scene root and world-matrix propagation.

mod snapshot;

use ember_core::ecs::EntityId;
use ember_core::jobs::{join_all, JobHandle, JobQueue};
use ember_core::math::Mat4;
use ember_data::ecs::{ComponentFilter, Core, CoreError, Transform, World};
use snapshot::Snapshot;
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

/// Name of the root node created for every scene.
pub const ROOT_NAME: &str = "Root";

/// Configuration of the [`SceneGraphCore`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneGraphConfig {
    /// A node with more children than this hands each child subtree to the
    /// job queue.
    pub branch_threshold: usize,
    /// Deadline for joining the jobs of one pass. `None` waits forever.
    pub join_timeout: Option<Duration>,
}

impl Default for SceneGraphConfig {
    fn default() -> Self {
        Self {
            branch_threshold: 5,
            join_timeout: Some(Duration::from_secs(2)),
        }
    }
}

/// Counters of the last [`SceneGraphCore`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneGraphStats {
    /// Nodes reachable from the root.
    pub nodes: usize,
    /// Nodes whose world matrix was recomputed.
    pub recomputed: usize,
    /// Subtrees handed to the job queue.
    pub jobs: usize,
}

/// Maintains the `Transform` hierarchy and computes world matrices.
///
/// Every scene gets a root entity named [`ROOT_NAME`]. Parentless transforms
/// are adopted by the root when they become visible, and the children of a
/// removed transform are handed back to the root, including those the World
/// detached from a parent no Core ever saw.
///
/// Each `update` walks the tree from the root. A node is recomputed as
/// `parent_world * local` when it is dirty or its parent was recomputed. The
/// walk reads an immutable snapshot of the hierarchy; when a node has more
/// than `branch_threshold` children and the queue has workers, each child
/// subtree becomes one job once the node's own matrix is final. All jobs are
/// joined before any matrix is written back, on the calling thread.
pub struct SceneGraphCore {
    config: SceneGraphConfig,
    jobs: Arc<JobQueue>,
    root: EntityId,
    last_pass: SceneGraphStats,
}

impl SceneGraphCore {
    /// Creates the Core. The root is created on registration.
    pub fn new(jobs: Arc<JobQueue>, config: SceneGraphConfig) -> Self {
        Self {
            config,
            jobs,
            root: EntityId::NULL,
            last_pass: SceneGraphStats::default(),
        }
    }

    /// The root entity of the current scene, `EntityId::NULL` while no scene
    /// is loaded.
    #[must_use]
    pub fn root(&self) -> EntityId {
        self.root
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> SceneGraphConfig {
        self.config
    }

    /// Counters of the most recent pass.
    #[must_use]
    pub fn last_pass(&self) -> SceneGraphStats {
        self.last_pass
    }

    fn create_root(&mut self, world: &mut World) -> Result<(), CoreError> {
        let root = world.create_entity();
        world.add_component(root, Transform::new(ROOT_NAME))?;
        self.root = root;
        log::debug!("Scene root created as {root}.");
        Ok(())
    }

    fn fan_out(&self, snapshot: &Arc<Snapshot>) -> Result<(Vec<(usize, Mat4)>, usize), CoreError> {
        let mut results = Vec::new();
        let mut handles: Vec<JobHandle<Vec<(usize, Mat4)>>> = Vec::new();
        let parallel = self.jobs.is_parallel();

        let mut stack = vec![(0usize, Mat4::IDENTITY, false)];
        while let Some((index, parent_world, parent_recomputed)) = stack.pop() {
            let (matrix, recomputed) = snapshot.resolve(index, parent_world, parent_recomputed);
            if recomputed {
                results.push((index, matrix));
            }

            let children = &snapshot.nodes[index].children;
            if parallel && children.len() > self.config.branch_threshold {
                for &child in children {
                    let snapshot = Arc::clone(snapshot);
                    handles.push(
                        self.jobs
                            .submit(move || snapshot.walk_subtree(child, matrix, recomputed)),
                    );
                }
            } else {
                stack.extend(children.iter().map(|&child| (child, matrix, recomputed)));
            }
        }

        let jobs = handles.len();
        for batch in join_all(handles, self.config.join_timeout)? {
            results.extend(batch);
        }
        Ok((results, jobs))
    }
}

impl Core for SceneGraphCore {
    fn name(&self) -> &'static str {
        "SceneGraphCore"
    }

    fn filter(&self) -> ComponentFilter {
        ComponentFilter::new().requires::<Transform>()
    }

    fn init(&mut self, world: &mut World) -> Result<(), CoreError> {
        log::info!(
            "SceneGraphCore: {} workers, branch threshold {}.",
            self.jobs.worker_count(),
            self.config.branch_threshold
        );
        self.create_root(world)
    }

    fn on_entity_added(&mut self, world: &mut World, entity: EntityId) {
        if entity == self.root || self.root.is_null() || world.parent_of(entity).is_some() {
            return;
        }
        if let Err(e) = world.set_parent(entity, self.root) {
            log::error!("SceneGraphCore: could not attach {entity} to the root: {e}");
        }
    }

    fn on_entity_removed(&mut self, world: &mut World, entity: EntityId) {
        if entity == self.root {
            log::warn!("SceneGraphCore: the scene root {entity} was removed; creating a new one.");
            if let Err(e) = self.create_root(world) {
                log::error!("SceneGraphCore: could not recreate the root: {e}");
                self.root = EntityId::NULL;
            }
        }

        if let Some(parent) = world.parent_of(entity) {
            if let Err(e) = world.remove_child(parent, entity) {
                log::debug!("SceneGraphCore: parent of {entity} already gone: {e}");
            }
        }

        let orphans = world.children_of(entity).to_vec();
        for child in orphans {
            let result = if self.root.is_null() {
                world.remove_child(entity, child).map(|_| ())
            } else {
                world.set_parent(child, self.root)
            };
            if let Err(e) = result {
                log::error!("SceneGraphCore: could not re-parent {child}: {e}");
            }
        }
    }

    fn update(&mut self, world: &mut World, _dt: f32) -> Result<(), CoreError> {
        if self.root.is_null() {
            return Ok(());
        }
        for orphan in world.take_orphaned_transforms() {
            if orphan != self.root {
                world.set_parent(orphan, self.root)?;
            }
        }

        let snapshot = Arc::new(Snapshot::capture(world, self.root));
        if snapshot.is_empty() {
            self.last_pass = SceneGraphStats::default();
            return Ok(());
        }

        let (results, jobs) = self.fan_out(&snapshot)?;

        for &(index, matrix) in &results {
            let entity = snapshot.nodes[index].entity;
            if let Some(transform) = world.try_get_component_mut::<Transform>(entity) {
                transform.apply_world_matrix(matrix);
            }
        }

        self.last_pass = SceneGraphStats {
            nodes: snapshot.len(),
            recomputed: results.len(),
            jobs,
        };
        log::trace!("SceneGraphCore pass: {:?}", self.last_pass);
        Ok(())
    }

    fn on_scene_unloaded(&mut self) {
        self.root = EntityId::NULL;
        self.last_pass = SceneGraphStats::default();
    }

    fn on_scene_loaded(&mut self, world: &mut World) -> Result<(), CoreError> {
        self.create_root(world)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl std::fmt::Debug for SceneGraphCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneGraphCore")
            .field("config", &self.config)
            .field("root", &self.root)
            .field("workers", &self.jobs.worker_count())
            .field("last_pass", &self.last_pass)
            .finish()
    }
}
