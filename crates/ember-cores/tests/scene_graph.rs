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

use approx::assert_abs_diff_eq;
use ember_core::ecs::EntityId;
use ember_core::jobs::{JobQueue, JobQueueConfig};
use ember_core::math::{quat_from_euler_degrees, Mat4, Vec3};
use ember_cores::{SceneGraphConfig, SceneGraphCore};
use ember_data::ecs::{EcsError, Transform, World};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{mpsc, Arc};
use std::time::Duration;

fn world_with(jobs: JobQueue, config: SceneGraphConfig) -> World {
    let mut world = World::new();
    world
        .add_core(SceneGraphCore::new(Arc::new(jobs), config))
        .unwrap();
    world
}

fn inline_world() -> World {
    world_with(JobQueue::inline(), SceneGraphConfig::default())
}

fn spawn(world: &mut World, transform: Transform) -> EntityId {
    world.spawn().with(transform).unwrap().id()
}

fn root(world: &World) -> EntityId {
    world.get_core::<SceneGraphCore>().unwrap().root()
}

fn frame(world: &mut World) {
    world.simulate();
    world.update_cores(1.0 / 60.0).unwrap();
}

fn world_matrix(world: &World, id: EntityId) -> Mat4 {
    world.get_component::<Transform>(id).unwrap().world_matrix()
}

#[test]
fn child_world_matrix_composes_with_parent() {
    // --- 1. ARRANGE ---
    let mut world = inline_world();
    let parent = spawn(
        &mut world,
        Transform::new("parent").with_position(Vec3::new(10.0, 0.0, 0.0)),
    );
    let child = spawn(
        &mut world,
        Transform::new("child").with_position(Vec3::new(0.0, 2.0, 0.0)),
    );
    world.set_parent(child, parent).unwrap();

    // --- 2. ACT ---
    frame(&mut world);

    // --- 3. ASSERT ---
    assert_abs_diff_eq!(
        world_matrix(&world, child),
        Mat4::from_translation(Vec3::new(10.0, 2.0, 0.0)),
        epsilon = 1e-6
    );
    assert!(!world.get_component::<Transform>(child).unwrap().is_dirty());
}

#[test]
fn rotation_and_scale_of_the_parent_apply_to_children() {
    let mut world = inline_world();
    let parent = spawn(
        &mut world,
        Transform::new("parent")
            .with_rotation(quat_from_euler_degrees(Vec3::new(0.0, 90.0, 0.0)))
            .with_scale(Vec3::splat(2.0)),
    );
    let child = spawn(&mut world, Transform::new("child").with_position(Vec3::X));
    world.set_parent(child, parent).unwrap();

    frame(&mut world);

    // +X rotated 90 degrees about +Y lands on -Z, then doubled.
    let position = world.get_component::<Transform>(child).unwrap().world_position();
    assert_abs_diff_eq!(position, Vec3::new(0.0, 0.0, -2.0), epsilon = 1e-5);
}

#[test]
fn parentless_transforms_are_adopted_by_the_root() {
    let mut world = inline_world();
    let id = spawn(&mut world, Transform::new("orphan"));
    world.simulate();

    let root = root(&world);
    assert_eq!(world.get_component::<Transform>(root).unwrap().name(), "Root");
    assert_eq!(world.parent_of(id), Some(root));
    assert_eq!(world.parent_of(root), None, "the root has no parent");
}

#[test]
fn destroyed_nodes_hand_their_children_to_the_root() {
    let mut world = inline_world();
    let a = spawn(&mut world, Transform::new("a"));
    let b = spawn(&mut world, Transform::new("b"));
    let c = spawn(&mut world, Transform::new("c"));
    world.set_parent(b, a).unwrap();
    world.set_parent(c, b).unwrap();
    frame(&mut world);

    world.destroy_entity(b).unwrap();
    frame(&mut world);

    let root = root(&world);
    assert_eq!(world.parent_of(c), Some(root));
    assert!(world.children_of(a).is_empty());
    assert!(world.children_of(root).contains(&c));
    assert!(!world.children_of(root).contains(&b));
}

#[test]
fn removing_a_transform_detaches_the_node() {
    let mut world = inline_world();
    let a = spawn(&mut world, Transform::new("a"));
    let b = spawn(&mut world, Transform::new("b"));
    world.set_parent(b, a).unwrap();
    frame(&mut world);

    world.remove_component::<Transform>(a).unwrap();
    frame(&mut world);

    let root = root(&world);
    assert!(world.is_alive(a));
    assert_eq!(world.parent_of(b), Some(root));
    assert!(!world.children_of(root).contains(&a));
}

#[test]
fn only_dirty_branches_are_recomputed() {
    // --- 1. ARRANGE ---
    let mut world = inline_world();
    let left = spawn(&mut world, Transform::new("left"));
    let left_child = spawn(&mut world, Transform::new("left child"));
    let right = spawn(&mut world, Transform::new("right"));
    world.set_parent(left_child, left).unwrap();
    frame(&mut world);
    let first = world.get_core::<SceneGraphCore>().unwrap().last_pass();
    assert_eq!(first.nodes, 4);
    assert_eq!(first.recomputed, 4, "the first pass computes every node");

    // --- 2. ACT ---
    world
        .get_component_mut::<Transform>(left)
        .unwrap()
        .set_position(Vec3::new(0.0, 3.0, 0.0));
    frame(&mut world);

    // --- 3. ASSERT ---
    let second = world.get_core::<SceneGraphCore>().unwrap().last_pass();
    assert_eq!(second.recomputed, 2, "left and its child only");
    assert_abs_diff_eq!(
        world.get_component::<Transform>(left_child).unwrap().world_position(),
        Vec3::new(0.0, 3.0, 0.0)
    );
    assert_eq!(world_matrix(&world, right), Mat4::IDENTITY);

    frame(&mut world);
    assert_eq!(
        world.get_core::<SceneGraphCore>().unwrap().last_pass().recomputed,
        0,
        "a clean tree does no work"
    );
}

/// Builds the same random tree in `world` for a given seed.
fn random_tree(world: &mut World, seed: u64, count: usize) -> Vec<EntityId> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut ids: Vec<EntityId> = Vec::with_capacity(count);
    for i in 0..count {
        let transform = Transform::new(format!("node {i}"))
            .with_position(Vec3::new(
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
            ))
            .with_rotation(quat_from_euler_degrees(Vec3::new(
                rng.gen_range(-180.0..180.0),
                rng.gen_range(-180.0..180.0),
                rng.gen_range(-180.0..180.0),
            )))
            .with_scale(Vec3::splat(rng.gen_range(0.5..1.5)));
        let id = spawn(world, transform);
        // Shallow, wide trees: parents are picked among the first nodes.
        if i > 0 && rng.gen_bool(0.8) {
            let parent = ids[rng.gen_range(0..ids.len().min(12))];
            world.set_parent(id, parent).unwrap();
        }
        ids.push(id);
    }
    ids
}

#[test]
fn parallel_pass_matches_the_sequential_pass() {
    // --- 1. ARRANGE ---
    let mut sequential = inline_world();
    let mut parallel = world_with(
        JobQueue::new(JobQueueConfig {
            workers: 4,
            ..JobQueueConfig::default()
        }),
        SceneGraphConfig {
            branch_threshold: 2,
            ..SceneGraphConfig::default()
        },
    );
    let seq_ids = random_tree(&mut sequential, 0xC0FFEE, 300);
    let par_ids = random_tree(&mut parallel, 0xC0FFEE, 300);

    // --- 2. ACT ---
    frame(&mut sequential);
    frame(&mut parallel);

    // --- 3. ASSERT ---
    let stats = parallel.get_core::<SceneGraphCore>().unwrap().last_pass();
    assert!(stats.jobs > 0, "wide nodes should have been handed to workers");
    assert_eq!(stats.recomputed, stats.nodes);

    for (s, p) in seq_ids.iter().zip(&par_ids) {
        assert_abs_diff_eq!(
            world_matrix(&sequential, *s),
            world_matrix(&parallel, *p),
            epsilon = 1e-4
        );
        assert!(!parallel.get_component::<Transform>(*p).unwrap().is_dirty());
    }
}

#[test]
fn scene_reload_creates_a_fresh_root() {
    let mut world = inline_world();
    spawn(&mut world, Transform::new("a"));
    frame(&mut world);
    let old_root = root(&world);

    world.load_scene().unwrap();
    frame(&mut world);

    let new_root = root(&world);
    assert_ne!(new_root, old_root);
    assert!(world.is_alive(new_root));
    assert_eq!(world.entity_count(), 1, "only the new root survives the reload");
}

#[test]
fn deep_chain_world_matrices_are_products_of_local_matrices() {
    // --- 1. ARRANGE ---
    let mut world = inline_world();
    let mut chain: Vec<EntityId> = Vec::new();
    for i in 0..16 {
        let link = Transform::new(format!("link {i}"))
            .with_position(Vec3::new(1.0, 0.5, 0.0))
            .with_rotation(quat_from_euler_degrees(Vec3::new(5.0, 15.0, -10.0)))
            .with_scale(Vec3::splat(1.05));
        let id = spawn(&mut world, link);
        if let Some(&parent) = chain.last() {
            world.set_parent(id, parent).unwrap();
        }
        chain.push(id);
    }
    frame(&mut world);

    // --- 2. ACT: dirty the head of the chain only ---
    world
        .get_component_mut::<Transform>(chain[0])
        .unwrap()
        .set_position(Vec3::new(-3.0, 2.0, 7.0));
    frame(&mut world);

    // --- 3. ASSERT ---
    let pass = world.get_core::<SceneGraphCore>().unwrap().last_pass();
    assert_eq!(pass.recomputed, chain.len(), "the whole chain follows its head");

    let mut expected = world
        .get_component::<Transform>(root(&world))
        .unwrap()
        .local_matrix();
    for id in &chain {
        let transform = world.get_component::<Transform>(*id).unwrap();
        expected *= transform.local_matrix();
        assert_abs_diff_eq!(transform.world_matrix(), expected, epsilon = 1e-4);
        assert!(!transform.is_dirty());
    }
}

#[test]
fn a_pass_that_misses_its_join_deadline_fails_the_core() {
    // --- 1. ARRANGE ---
    let jobs = Arc::new(JobQueue::new(JobQueueConfig {
        workers: 1,
        ..JobQueueConfig::default()
    }));
    let mut world = World::new();
    world
        .add_core(SceneGraphCore::new(
            Arc::clone(&jobs),
            SceneGraphConfig {
                branch_threshold: 0,
                join_timeout: Some(Duration::from_millis(20)),
            },
        ))
        .unwrap();
    let node = spawn(&mut world, Transform::new("a").with_position(Vec3::X));
    spawn(&mut world, Transform::new("b"));
    world.simulate();

    // Keep the only worker busy so the subtree jobs queue behind it.
    let (release, gate) = mpsc::channel::<()>();
    let blocker = jobs.submit(move || {
        let _ = gate.recv();
    });

    // --- 2. ACT ---
    let error = world.update_cores(1.0 / 60.0).unwrap_err();

    // --- 3. ASSERT ---
    match error {
        EcsError::CoreFailed { core, source } => {
            assert_eq!(core, "SceneGraphCore");
            assert!(source.to_string().contains("did not complete"), "{source}");
        }
        other => panic!("expected a core failure, got {other}"),
    }
    assert!(
        world.get_component::<Transform>(node).unwrap().is_dirty(),
        "nothing is written back from a failed pass"
    );

    release.send(()).unwrap();
    blocker.join().unwrap();
}

#[test]
fn pending_child_destroyed_before_its_first_flush_is_unlinked() {
    // --- 1. ARRANGE ---
    let mut world = inline_world();
    let parent = spawn(&mut world, Transform::new("parent"));
    frame(&mut world);
    let child = spawn(&mut world, Transform::new("child"));
    let grandchild = spawn(
        &mut world,
        Transform::new("grandchild").with_position(Vec3::Y),
    );
    world.set_parent(child, parent).unwrap();
    world.set_parent(grandchild, child).unwrap();

    // --- 2. ACT ---
    world.destroy_entity(child).unwrap();
    frame(&mut world);

    // --- 3. ASSERT ---
    let root = root(&world);
    assert!(!world.is_alive(child));
    assert!(world.children_of(parent).is_empty());
    assert!(!world.descendants_of(root).contains(&child));
    assert_eq!(world.parent_of(grandchild), Some(root));
    let transform = world.get_component::<Transform>(grandchild).unwrap();
    assert!(!transform.is_dirty());
    assert_abs_diff_eq!(transform.world_position(), Vec3::Y);
}

#[test]
fn a_cloned_transform_is_adopted_like_a_new_one() {
    let mut world = inline_world();
    let parent = spawn(&mut world, Transform::new("parent"));
    let original = spawn(&mut world, Transform::new("original"));
    world.set_parent(original, parent).unwrap();
    frame(&mut world);

    let copy = world.get_component::<Transform>(original).unwrap().clone();
    let twin = spawn(&mut world, copy);
    frame(&mut world);

    let root = root(&world);
    assert_eq!(world.parent_of(twin), Some(root));
    assert_eq!(world.children_of(parent), &[original]);
    assert!(!world.get_component::<Transform>(twin).unwrap().is_dirty());
}
