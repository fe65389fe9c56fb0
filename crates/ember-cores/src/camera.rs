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

//! Camera selection.

use ember_core::ecs::EntityId;
use ember_core::math::{Mat4, Vec3, Vec4};
use ember_data::ecs::{Camera, ComponentFilter, Core, CoreError, Transform, World};
use std::any::Any;

/// The view the frame is rendered through, published as a World resource.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    /// The camera entity.
    pub camera: EntityId,
    /// World-to-view matrix.
    pub view: Mat4,
    /// View-to-clip matrix.
    pub projection: Mat4,
    /// Camera position in world space.
    pub position: Vec3,
    /// Clear color of the camera.
    pub clear_color: Vec4,
}

/// Picks the current camera each frame and publishes its [`ViewState`].
///
/// The current camera is the first one (by entity id) flagged `is_current`,
/// or the first camera when none is flagged. Without any camera the resource
/// is removed.
#[derive(Debug)]
pub struct CameraCore {
    aspect_ratio: f32,
    current: Option<EntityId>,
}

impl CameraCore {
    /// Creates the Core for a viewport of the given aspect ratio.
    pub fn new(aspect_ratio: f32) -> Self {
        Self {
            aspect_ratio,
            current: None,
        }
    }

    /// Updates the viewport aspect ratio, e.g. after a resize.
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }

    /// The camera selected by the last update.
    #[must_use]
    pub fn current(&self) -> Option<EntityId> {
        self.current
    }

    fn select(world: &World, cameras: &[EntityId]) -> Option<EntityId> {
        cameras
            .iter()
            .copied()
            .find(|id| {
                world
                    .try_get_component::<Camera>(*id)
                    .is_some_and(|camera| camera.is_current)
            })
            .or_else(|| cameras.first().copied())
    }
}

impl Default for CameraCore {
    fn default() -> Self {
        Self::new(16.0 / 9.0)
    }
}

impl Core for CameraCore {
    fn name(&self) -> &'static str {
        "CameraCore"
    }

    fn filter(&self) -> ComponentFilter {
        ComponentFilter::new()
            .requires::<Camera>()
            .requires::<Transform>()
    }

    fn update(&mut self, world: &mut World, _dt: f32) -> Result<(), CoreError> {
        let cameras = world.core_entities::<Self>();
        let selected = Self::select(world, &cameras);
        if selected != self.current {
            log::debug!("CameraCore: current camera is now {selected:?}.");
            self.current = selected;
        }

        let Some(entity) = selected else {
            world.remove_resource::<ViewState>();
            return Ok(());
        };
        let camera = *world.get_component::<Camera>(entity)?;
        let transform = world.get_component::<Transform>(entity)?;
        let view = ViewState {
            camera: entity,
            view: Camera::view_matrix(transform.world_matrix()),
            projection: camera.projection_matrix(self.aspect_ratio),
            position: transform.world_position(),
            clear_color: camera.clear_color,
        };
        world.insert_resource(view);
        Ok(())
    }

    fn on_scene_unloaded(&mut self) {
        self.current = None;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera(world: &mut World, name: &str, is_current: bool) -> EntityId {
        world
            .spawn()
            .with(Transform::new(name))
            .unwrap()
            .with(Camera {
                is_current,
                ..Camera::default()
            })
            .unwrap()
            .id()
    }

    #[test]
    fn flagged_camera_wins_over_creation_order() {
        let mut world = World::new();
        world.add_core(CameraCore::default()).unwrap();
        let _first = camera(&mut world, "first", false);
        let flagged = camera(&mut world, "flagged", true);
        world.simulate();

        world.update_cores(0.0).unwrap();

        assert_eq!(world.resource::<ViewState>().unwrap().camera, flagged);
        assert_eq!(world.get_core::<CameraCore>().unwrap().current(), Some(flagged));
    }

    #[test]
    fn first_camera_is_the_fallback() {
        let mut world = World::new();
        world.add_core(CameraCore::default()).unwrap();
        let first = camera(&mut world, "first", false);
        let _second = camera(&mut world, "second", false);
        world.simulate();

        world.update_cores(0.0).unwrap();

        assert_eq!(world.resource::<ViewState>().unwrap().camera, first);
    }

    #[test]
    fn view_state_is_removed_without_cameras() {
        let mut world = World::new();
        world.add_core(CameraCore::default()).unwrap();
        let only = camera(&mut world, "only", true);
        world.simulate();
        world.update_cores(0.0).unwrap();
        assert!(world.resource::<ViewState>().is_some());

        world.destroy_entity(only).unwrap();
        world.simulate();
        world.update_cores(0.0).unwrap();

        assert!(world.resource::<ViewState>().is_none());
    }
}
