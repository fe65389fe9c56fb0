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

//! Extraction of render commands from the `World`.

use ember_core::ecs::EntityId;
use ember_core::math::Mat4;
use ember_data::ecs::{ComponentFilter, Core, CoreError, Model, Transform, World};
use std::any::Any;

/// A flat description of one model to draw this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderCommand {
    /// The entity the command was extracted from.
    pub entity: EntityId,
    /// Asset path of the model.
    pub model_path: String,
    /// The entity's world matrix after this frame's scene graph pass.
    pub world_matrix: Mat4,
}

/// The commands of the current frame, published as a World resource.
///
/// A renderer consumes it after the Update phase; it is rebuilt every frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderQueue {
    /// Commands ordered by entity id.
    pub commands: Vec<RenderCommand>,
    /// Frame counter of the last rebuild.
    pub frame: u64,
}

impl RenderQueue {
    /// Number of commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if nothing is to be drawn.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Rebuilds the [`RenderQueue`] from every entity with a `Transform` and a
/// `Model`.
#[derive(Debug, Default)]
pub struct RenderCore {
    frame: u64,
}

impl RenderCore {
    /// Creates the Core.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Core for RenderCore {
    fn name(&self) -> &'static str {
        "RenderCore"
    }

    fn filter(&self) -> ComponentFilter {
        ComponentFilter::new()
            .requires::<Transform>()
            .requires::<Model>()
    }

    fn init(&mut self, world: &mut World) -> Result<(), CoreError> {
        world.insert_resource(RenderQueue::default());
        Ok(())
    }

    fn update(&mut self, world: &mut World, _dt: f32) -> Result<(), CoreError> {
        self.frame += 1;

        let mut commands = Vec::new();
        for entity in world.core_entities::<Self>() {
            let transform = world.get_component::<Transform>(entity)?;
            let model = world.get_component::<Model>(entity)?;
            commands.push(RenderCommand {
                entity,
                model_path: model.path.clone(),
                world_matrix: transform.world_matrix(),
            });
        }

        log::trace!("RenderCore: {} commands for frame {}.", commands.len(), self.frame);
        world.insert_resource(RenderQueue {
            commands,
            frame: self.frame,
        });
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
