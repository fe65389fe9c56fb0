use criterion::{criterion_group, criterion_main, Criterion};
use ember_data::ecs::{Component, ComponentFilter, World};
use std::hint::black_box;

#[derive(Component, Debug, Clone, Copy, Default)]
struct Position(u32);

#[derive(Component, Debug, Clone, Copy, Default)]
struct RenderTag;

#[derive(Component, Debug, Clone, Copy, Default)]
struct Hidden;

fn populated_world() -> World {
    let mut world = World::default();
    // Setup 10,000 entities, half of them renderable, a tenth hidden.
    for i in 0..10_000 {
        let id = world.create_entity();
        world.add_component(id, Position(i)).unwrap();
        if i % 2 == 0 {
            world.add_component(id, RenderTag).unwrap();
        }
        if i % 10 == 0 {
            world.add_component(id, Hidden).unwrap();
        }
    }
    world.simulate();
    world
}

fn bench_filters(c: &mut Criterion) {
    let world = populated_world();
    let visible = ComponentFilter::new()
        .requires::<Position>()
        .requires::<RenderTag>()
        .excludes::<Hidden>();
    let all = ComponentFilter::new().requires::<Position>();

    let mut group = c.benchmark_group("ECS Filters");

    group.bench_function("Full scan (Position & RenderTag, !Hidden)", |b| {
        b.iter(|| black_box(world.get_entities(&visible).count()));
    });

    group.bench_function("Full scan (Position)", |b| {
        b.iter(|| black_box(world.get_entities(&all).count()));
    });

    group.bench_function("Storage iteration (Position)", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for (_, pos) in world.iter_components::<Position>() {
                sum += u64::from(pos.0);
            }
            black_box(sum)
        });
    });

    group.finish();
}

fn bench_flush(c: &mut Criterion) {
    c.bench_function("Create + flush 1,000 entities", |b| {
        b.iter(|| {
            let mut world = World::default();
            for i in 0..1_000 {
                let id = world.create_entity();
                world.add_component(id, Position(i)).unwrap();
            }
            black_box(world.simulate())
        });
    });
}

criterion_group!(benches, bench_filters, bench_flush);
criterion_main!(benches);
