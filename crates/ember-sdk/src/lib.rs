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

//! The public-facing Software Development Kit (SDK) for the Ember engine.
//!
//! A game implements [`Game`], builds an [`Engine`] from an [`EngineConfig`]
//! and hands itself to [`Engine::run`]. The engine owns the ECS `World`, the
//! job queue and the built-in Cores; there is no global state.

#![warn(missing_docs)]

pub mod clock;
pub mod config;
mod engine;
mod event;
mod game;
pub mod scheduler;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, EngineConfig, JobsConfig, WindowConfig};
pub use engine::Engine;
pub use event::SceneEvent;
pub use game::Game;
pub use scheduler::{FramePhase, FrameReport};

/// Everything a game usually needs, in one import.
pub mod prelude {
    pub use crate::{Engine, EngineConfig, FramePhase, Game, SceneEvent};
    pub use ember_core::ecs::EntityId;
    pub use ember_core::math::{Mat4, Quat, Vec3, Vec4};
    pub use ember_cores::{RenderQueue, SceneGraphCore, ViewState};
    pub use ember_data::ecs::{
        Camera, Component, ComponentFilter, Core, CoreError, Model, Transform, World,
    };
    pub use ember_data::scene::SceneDocument;
}
