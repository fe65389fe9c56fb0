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

//! The engine context object.

use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::event::SceneEvent;
use crate::game::Game;
use crate::scheduler::{FramePhase, FrameReport};
use anyhow::{Context, Result};
use ember_core::ecs::EntityId;
use ember_core::event::EventBus;
use ember_core::jobs::JobQueue;
use ember_cores::{CameraCore, RenderCore, RenderQueue, SceneGraphCore, ViewState};
use ember_data::ecs::{Core, World};
use ember_data::scene::SceneDocument;
use std::any::TypeId;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Owns everything a running game needs: the [`World`], the job queue, the
/// clock, the configuration and the scene event bus.
///
/// Three Cores are registered on construction, in this order:
/// [`SceneGraphCore`], [`CameraCore`] and [`RenderCore`]. Cores added later
/// with [`add_core`](Self::add_core) update first each frame, so the
/// transforms they move are propagated and extracted in the same frame.
pub struct Engine {
    config: EngineConfig,
    world: World,
    jobs: Arc<JobQueue>,
    clock: Box<dyn Clock>,
    events: EventBus<SceneEvent>,
    frame: u64,
    exit_requested: bool,
}

impl Engine {
    /// Builds an engine from a validated configuration.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate().context("invalid engine configuration")?;
        log::info!(
            "Starting '{}' ({}x{}, {} fps).",
            config.title,
            config.window.width,
            config.window.height,
            config.fps
        );

        let jobs = Arc::new(JobQueue::new(config.job_queue_config()));
        let mut world = World::new();
        world
            .add_core(SceneGraphCore::new(Arc::clone(&jobs), config.scene_graph_config()))
            .context("failed to register the scene graph")?;
        world
            .add_core(CameraCore::new(config.aspect_ratio()))
            .context("failed to register the camera core")?;
        world
            .add_core(RenderCore::new())
            .context("failed to register the render core")?;

        Ok(Self {
            config,
            world,
            jobs,
            clock: Box::new(SystemClock::new()),
            events: EventBus::new(),
            frame: 0,
            exit_requested: false,
        })
    }

    /// Replaces the delta-time source.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The World.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The World, mutably.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The job queue shared with the scene graph.
    pub fn jobs(&self) -> &Arc<JobQueue> {
        &self.jobs
    }

    /// The scene event bus. Producers may clone its sender.
    pub fn events(&self) -> &EventBus<SceneEvent> {
        &self.events
    }

    /// Number of frames ticked so far.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Registers an additional Core.
    pub fn add_core<C: Core>(&mut self, core: C) -> Result<()> {
        let name = core.name();
        self.world
            .add_core(core)
            .with_context(|| format!("failed to register core '{name}'"))
    }

    /// The scene graph root of the current scene, `EntityId::NULL` while no
    /// scene is loaded.
    #[must_use]
    pub fn scene_root(&self) -> EntityId {
        self.world
            .get_core::<SceneGraphCore>()
            .map_or(EntityId::NULL, SceneGraphCore::root)
    }

    /// The view published by the camera Core during the last frame.
    pub fn view_state(&self) -> Option<&ViewState> {
        self.world.resource::<ViewState>()
    }

    /// The render commands of the last frame.
    pub fn render_queue(&self) -> Option<&RenderQueue> {
        self.world.resource::<RenderQueue>()
    }

    /// Updates the output size and the camera aspect ratio.
    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.config.window.width = width;
        self.config.window.height = height;
        let aspect = self.config.aspect_ratio();
        if let Some(camera) = self.world.get_core_mut::<CameraCore>() {
            camera.set_aspect_ratio(aspect);
        }
        log::debug!("Window resized to {width}x{height}.");
    }

    // --- Scenes ---

    /// Drops the current scene.
    pub fn unload_scene(&mut self) {
        if self.world.is_loaded() {
            self.world.unload_scene();
            self.events.publish(SceneEvent::Unloaded);
        }
    }

    /// Replaces the current scene with an empty one.
    pub fn load_scene(&mut self) -> Result<()> {
        self.unload_scene();
        self.world.load_scene().context("failed to load a new scene")?;
        self.events.publish(SceneEvent::Loaded {
            root: self.scene_root(),
            entities: 0,
        });
        Ok(())
    }

    /// Replaces the current scene with the content of `document`.
    ///
    /// The new entities become visible to Cores at the next frame's flush.
    /// Returns the mapping from document ids to the new entities.
    pub fn load_scene_document(&mut self, document: &SceneDocument) -> Result<HashMap<u64, EntityId>> {
        self.unload_scene();
        self.world.load_scene().context("failed to load a new scene")?;
        let created = document
            .instantiate(&mut self.world)
            .context("failed to instantiate the scene document")?;
        self.events.publish(SceneEvent::Loaded {
            root: self.scene_root(),
            entities: created.len(),
        });
        Ok(created)
    }

    /// Reads a scene document from disk and loads it.
    pub fn load_scene_file(&mut self, path: impl AsRef<Path>) -> Result<HashMap<u64, EntityId>> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scene file {}", path.display()))?;
        let document = SceneDocument::from_json_str(&text)
            .with_context(|| format!("failed to parse scene file {}", path.display()))?;
        log::info!("Loading scene from {}.", path.display());
        self.load_scene_document(&document)
    }

    /// Captures the flushed entities of the current scene, without the root.
    #[must_use]
    pub fn capture_scene(&self) -> SceneDocument {
        let root = self.scene_root();
        SceneDocument::capture(&self.world, (!root.is_null()).then_some(root))
    }

    /// Writes the current scene to disk.
    pub fn save_scene(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = self.capture_scene().to_json_string()?;
        std::fs::write(path, text)
            .with_context(|| format!("failed to write scene file {}", path.display()))?;
        log::info!("Scene saved to {}.", path.display());
        Ok(())
    }

    /// Queues `entity` for destruction and announces it on the event bus.
    pub fn destroy_entity(&mut self, entity: EntityId) -> Result<()> {
        self.world.destroy_entity(entity)?;
        self.events.publish(SceneEvent::EntityDestroyed(entity));
        Ok(())
    }

    // --- Frame loop ---

    /// Asks [`run`](Self::run) to stop after the current frame.
    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    /// Whether an exit was requested.
    #[must_use]
    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// Runs one frame with the given delta time.
    ///
    /// Phases, in order: pending scene events are delivered to the game, the
    /// World flushes, the game and the added Cores update, the scene graph
    /// and camera Cores run, then the render queue is rebuilt. A failing Core
    /// aborts the frame.
    pub fn tick(&mut self, game: &mut dyn Game, dt: f32) -> Result<FrameReport> {
        self.frame += 1;
        let mut report = FrameReport::new(self.frame, dt);

        let start = Instant::now();
        for event in self.events.drain() {
            game.on_event(self, &event);
        }
        report.record(FramePhase::Poll, start.elapsed());

        let start = Instant::now();
        report.flush = self.world.simulate();
        report.record(FramePhase::Simulate, start.elapsed());

        let start = Instant::now();
        game.on_update(self, dt).context("game update failed")?;
        self.world
            .update_cores_except(dt, &built_in_cores())
            .and_then(|()| self.world.update_core::<SceneGraphCore>(dt))
            .and_then(|()| self.world.update_core::<CameraCore>(dt))
            .with_context(|| format!("frame {} aborted", self.frame))?;
        report.record(FramePhase::Update, start.elapsed());

        let start = Instant::now();
        self.world
            .update_core::<RenderCore>(dt)
            .with_context(|| format!("frame {} aborted", self.frame))?;
        report.render_commands = self.render_queue().map_or(0, RenderQueue::len);
        game.on_render(self);
        report.record(FramePhase::Render, start.elapsed());

        log::trace!("{report:?}");
        Ok(report)
    }

    /// Drives `game` until it requests an exit, a frame fails, or
    /// `frame_limit` frames have run. Returns the number of frames run.
    ///
    /// Time is accumulated from the clock; a frame runs once at least
    /// `1 / fps` has passed and receives the whole accumulated time as its
    /// delta. The remainder below one step carries over.
    pub fn run(&mut self, game: &mut dyn Game, frame_limit: Option<u64>) -> Result<u64> {
        game.on_initialize(self).context("game initialization failed")?;
        game.on_start(self).context("game start failed")?;

        let result = self.run_frames(game, frame_limit);
        game.on_end(self);

        match &result {
            Ok(frames) => log::info!("Frame loop stopped after {frames} frames."),
            Err(e) => log::error!("Frame loop failed: {e:#}"),
        }
        result
    }

    fn run_frames(&mut self, game: &mut dyn Game, frame_limit: Option<u64>) -> Result<u64> {
        let step = self.config.frame_duration();
        let mut accumulated = Duration::ZERO;
        let mut frames = 0;
        self.exit_requested = false;
        self.clock.reset();

        while !self.exit_requested && !matches!(frame_limit, Some(limit) if frames >= limit) {
            accumulated += self.clock.delta();
            if accumulated < step {
                std::thread::sleep(step - accumulated);
                continue;
            }
            self.tick(game, accumulated.as_secs_f32())?;
            frames += 1;
            accumulated = carry_over(accumulated, step);
        }
        Ok(frames)
    }
}

/// Cores the engine schedules itself, in stage order.
fn built_in_cores() -> [TypeId; 3] {
    [
        TypeId::of::<SceneGraphCore>(),
        TypeId::of::<CameraCore>(),
        TypeId::of::<RenderCore>(),
    ]
}

/// `accumulated` modulo `step`.
fn carry_over(accumulated: Duration, step: Duration) -> Duration {
    let step_nanos = step.as_nanos().max(1);
    let rest = accumulated.as_nanos() % step_nanos;
    Duration::from_nanos(u64::try_from(rest).unwrap_or(0))
}

impl Drop for Engine {
    fn drop(&mut self) {
        log::info!(
            "Engine shutting down after {} frames ({} workers).",
            self.frame,
            self.jobs.worker_count()
        );
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("world", &self.world)
            .field("frame", &self.frame)
            .field("exit_requested", &self.exit_requested)
            .finish_non_exhaustive()
    }
}
