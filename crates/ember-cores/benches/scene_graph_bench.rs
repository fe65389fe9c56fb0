use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ember_core::jobs::{JobQueue, JobQueueConfig};
use ember_core::math::Vec3;
use ember_cores::{SceneGraphConfig, SceneGraphCore};
use ember_data::ecs::{EntityId, Transform, World};
use std::sync::Arc;

/// A root with `branches` children, each carrying a chain of `depth` nodes.
fn build(jobs: JobQueue, branches: usize, depth: usize) -> (World, Vec<EntityId>) {
    let mut world = World::default();
    world
        .add_core(SceneGraphCore::new(
            Arc::new(jobs),
            SceneGraphConfig::default(),
        ))
        .unwrap();

    let mut heads = Vec::with_capacity(branches);
    for b in 0..branches {
        let head = world
            .spawn()
            .with(Transform::new("branch").with_position(Vec3::new(b as f32, 0.0, 0.0)))
            .unwrap()
            .id();
        let mut parent = head;
        for _ in 0..depth {
            let node = world
                .spawn()
                .with(Transform::new("node").with_position(Vec3::Y))
                .unwrap()
                .id();
            world.set_parent(node, parent).unwrap();
            parent = node;
        }
        heads.push(head);
    }
    world.simulate();
    (world, heads)
}

fn bench_scene_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("Scene Graph");

    for workers in [0, 4] {
        let jobs = JobQueue::new(JobQueueConfig {
            workers,
            ..JobQueueConfig::default()
        });
        let (mut world, heads) = build(jobs, 64, 100);

        group.bench_with_input(
            BenchmarkId::new("Full recompute (64 x 100)", workers),
            &workers,
            |b, _| {
                b.iter(|| {
                    // Dirty every branch head so the whole tree is recomputed.
                    for head in &heads {
                        world
                            .get_component_mut::<Transform>(*head)
                            .unwrap()
                            .mark_dirty();
                    }
                    world.update_cores(1.0 / 60.0).unwrap();
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("Clean tree (64 x 100)", workers),
            &workers,
            |b, _| b.iter(|| world.update_cores(1.0 / 60.0).unwrap()),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_scene_graph);
criterion_main!(benches);
