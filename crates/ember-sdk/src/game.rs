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

use crate::{Engine, SceneEvent};
use anyhow::Result;

/// The game-side hooks driven by [`Engine::run`].
///
/// Every hook receives the engine, so a game can spawn entities, load scenes
/// or [`request_exit`](Engine::request_exit) from anywhere.
pub trait Game {
    /// Called once, before the first frame.
    fn on_initialize(&mut self, _engine: &mut Engine) -> Result<()> {
        Ok(())
    }

    /// Called once after `on_initialize`, right before the loop starts.
    fn on_start(&mut self, _engine: &mut Engine) -> Result<()> {
        Ok(())
    }

    /// Receives the scene events published since the previous frame.
    fn on_event(&mut self, _engine: &mut Engine, _event: &SceneEvent) {}

    /// Per-frame game logic, after the flush and before the Cores update.
    fn on_update(&mut self, engine: &mut Engine, dt: f32) -> Result<()>;

    /// Called once the frame's render queue is built.
    fn on_render(&mut self, _engine: &Engine) {}

    /// Called once when the loop stops, whatever the reason.
    fn on_end(&mut self, _engine: &mut Engine) {}
}
