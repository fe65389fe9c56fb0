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

// Ember Engine Sandbox
// Headless orbit demo: a sun, planets on rotating pivots and their moons.
// Usage: sandbox [path/to/Engine.json]

use anyhow::{Context, Result};
use ember_sdk::prelude::*;

const FRAMES: u64 = 600;
const PLANETS: usize = 8;

struct Orbit {
    pivot: EntityId,
    speed: f32,
    angle: f32,
}

#[derive(Default)]
struct OrbitDemo {
    orbits: Vec<Orbit>,
    moons: Vec<EntityId>,
    first_planet: Option<EntityId>,
}

impl OrbitDemo {
    fn spawn(
        engine: &mut Engine,
        transform: Transform,
        model: Option<&str>,
        parent: Option<EntityId>,
    ) -> Result<EntityId> {
        let world = engine.world_mut();
        let mut entity = world.spawn().with(transform)?;
        if let Some(path) = model {
            entity = entity.with(Model::new(path))?;
        }
        let id = entity.id();
        if let Some(parent) = parent {
            world.set_parent(id, parent)?;
        }
        Ok(id)
    }
}

impl Game for OrbitDemo {
    fn on_initialize(&mut self, engine: &mut Engine) -> Result<()> {
        let sun = Self::spawn(
            engine,
            Transform::new("Sun").with_scale(Vec3::splat(4.0)),
            Some("Assets/Models/Sun.fbx"),
            None,
        )?;

        for i in 0..PLANETS {
            let pivot = Self::spawn(engine, Transform::new(format!("Pivot {i}")), None, None)?;
            let distance = 10.0 + 6.0 * i as f32;
            let planet = Self::spawn(
                engine,
                Transform::new(format!("Planet {i}")).with_position(Vec3::new(distance, 0.0, 0.0)),
                Some("Assets/Models/Planet.fbx"),
                Some(pivot),
            )?;
            self.first_planet.get_or_insert(planet);

            for m in 0..i % 3 {
                let moon = Self::spawn(
                    engine,
                    Transform::new(format!("Moon {i}.{m}"))
                        .with_position(Vec3::new(0.0, 0.0, 2.0 + m as f32))
                        .with_scale(Vec3::splat(0.25)),
                    Some("Assets/Models/Moon.fbx"),
                    Some(planet),
                )?;
                self.moons.push(moon);
            }

            self.orbits.push(Orbit {
                pivot,
                speed: 40.0 / (i as f32 + 1.0),
                angle: 0.0,
            });
        }

        let camera = Self::spawn(
            engine,
            Transform::new("Main Camera").with_position(Vec3::new(0.0, 60.0, -80.0)),
            None,
            None,
        )?;
        engine.world_mut().add_component(camera, Camera::default())?;
        if let Some(transform) = engine.world_mut().try_get_component_mut::<Transform>(camera) {
            transform.look_at(Vec3::new(0.0, -60.0, 80.0));
        }

        log::info!(
            "Sandbox scene: sun {sun}, {} planets, {} moons.",
            self.orbits.len(),
            self.moons.len()
        );
        Ok(())
    }

    fn on_event(&mut self, _engine: &mut Engine, event: &SceneEvent) {
        log::info!("Scene event: {event:?}");
    }

    fn on_update(&mut self, engine: &mut Engine, dt: f32) -> Result<()> {
        for orbit in &mut self.orbits {
            orbit.angle = (orbit.angle + orbit.speed * dt) % 360.0;
            engine
                .world_mut()
                .get_component_mut::<Transform>(orbit.pivot)?
                .set_rotation(Quat::from_rotation_y(orbit.angle.to_radians()));
        }

        if engine.frame() == FRAMES / 2 {
            if let Some(moon) = self.moons.pop() {
                engine.destroy_entity(moon)?;
            }
        }
        Ok(())
    }

    fn on_render(&mut self, engine: &Engine) {
        if engine.frame() % 120 != 0 {
            return;
        }
        let commands = engine.render_queue().map_or(0, RenderQueue::len);
        let planet = self
            .first_planet
            .and_then(|id| engine.world().try_get_component::<Transform>(id))
            .map(Transform::world_position);
        log::info!(
            "Frame {}: {commands} render commands, first planet at {planet:?}.",
            engine.frame()
        );
    }

    fn on_end(&mut self, engine: &mut Engine) {
        let path = std::env::temp_dir().join("ember_sandbox_scene.json");
        match engine.save_scene(&path) {
            Ok(()) => log::info!("Final scene written to {}.", path.display()),
            Err(e) => log::warn!("Could not save the final scene: {e:#}"),
        }
    }
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load(&path).with_context(|| format!("loading {path}"))?,
        None => EngineConfig {
            title: "Ember Sandbox".to_string(),
            ..EngineConfig::default()
        },
    };

    let mut engine = Engine::new(config)?;
    let mut game = OrbitDemo::default();
    let frames = engine.run(&mut game, Some(FRAMES))?;
    log::info!("Sandbox finished after {frames} frames.");
    Ok(())
}
