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

//! The interface of per-frame engine logic units ("Cores").

use crate::ecs::{ComponentFilter, CoreError, World};
use ember_core::ecs::EntityId;
use std::any::Any;

/// A unit of per-frame logic bound to a [`ComponentFilter`].
///
/// Cores are registered once with [`World::add_core`] and live for the whole
/// process, across scene loads. The World tracks, per Core, the set of
/// entities that currently match its filter and calls
/// [`on_entity_added`](Self::on_entity_added) /
/// [`on_entity_removed`](Self::on_entity_removed) on every transition.
///
/// While one of its methods runs, a Core is detached from the World, which is
/// why every callback can take `&mut World`. Structural changes made from a
/// callback (creating or destroying entities, removing components) go through
/// the World's pending queues like any other.
pub trait Core: Send + 'static {
    /// A stable, human readable name used in logs and errors.
    fn name(&self) -> &'static str;

    /// The filter selecting this Core's entities. Read once, at registration.
    fn filter(&self) -> ComponentFilter;

    /// Called once after registration, before the first `update` and before
    /// the Core is told about existing entities.
    fn init(&mut self, _world: &mut World) -> Result<(), CoreError> {
        Ok(())
    }

    /// Called when an entity starts matching the filter.
    fn on_entity_added(&mut self, _world: &mut World, _entity: EntityId) {}

    /// Called when an entity stops matching the filter (a required component
    /// is being removed, an excluded one was added, or the entity is being
    /// destroyed). Its components are still readable.
    fn on_entity_removed(&mut self, _world: &mut World, _entity: EntityId) {}

    /// Per-frame work. Returning `Err` is fatal for the frame loop.
    fn update(&mut self, world: &mut World, dt: f32) -> Result<(), CoreError>;

    /// Called after the World dropped every entity of the current scene.
    fn on_scene_unloaded(&mut self) {}

    /// Called when a new scene becomes active.
    fn on_scene_loaded(&mut self, _world: &mut World) -> Result<(), CoreError> {
        Ok(())
    }

    /// Allows downcasting to the concrete Core type.
    fn as_any(&self) -> &dyn Any;

    /// Allows mutable downcasting to the concrete Core type.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
