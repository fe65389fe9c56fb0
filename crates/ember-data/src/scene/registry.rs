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

use crate::ecs::{Camera, EcsError, Model, SerializableComponent, Transform, World};
use ember_core::ecs::EntityId;
use serde_json::Value;

/// Name-keyed, type-erased serialization entry points of one component type.
///
/// Instances are collected at link time with `inventory`.
#[derive(Debug)]
pub struct ComponentRegistration {
    /// The component's registered name, as used in scene documents.
    pub name: &'static str,
    restore: fn(&mut World, EntityId, &Value) -> Result<(), EcsError>,
    capture: fn(&World, EntityId) -> Option<Value>,
}

impl ComponentRegistration {
    /// Builds the registration of `T`.
    pub const fn of<T: SerializableComponent>() -> Self {
        Self {
            name: T::NAME,
            restore: restore::<T>,
            capture: capture::<T>,
        }
    }

    /// Builds a default `T` from `value` and attaches it to `entity`.
    ///
    /// Leaves no component behind on failure.
    pub fn restore(&self, world: &mut World, entity: EntityId, value: &Value) -> Result<(), EcsError> {
        (self.restore)(world, entity, value)
    }

    /// Serializes `entity`'s component, if it has one.
    pub fn capture(&self, world: &World, entity: EntityId) -> Option<Value> {
        (self.capture)(world, entity)
    }
}

fn restore<T: SerializableComponent>(
    world: &mut World,
    entity: EntityId,
    value: &Value,
) -> Result<(), EcsError> {
    let mut component = T::default();
    component.on_deserialize(value)?;
    world.add_component(entity, component)?;
    Ok(())
}

fn capture<T: SerializableComponent>(world: &World, entity: EntityId) -> Option<Value> {
    world
        .try_get_component::<T>(entity)
        .map(T::on_serialize)
}

inventory::collect!(ComponentRegistration);

inventory::submit! { ComponentRegistration::of::<Transform>() }
inventory::submit! { ComponentRegistration::of::<Camera>() }
inventory::submit! { ComponentRegistration::of::<Model>() }

/// Every registered component, in unspecified order.
pub fn registrations() -> impl Iterator<Item = &'static ComponentRegistration> {
    inventory::iter::<ComponentRegistration>.into_iter()
}

/// Looks a registration up by component name.
pub fn find_registration(name: &str) -> Option<&'static ComponentRegistration> {
    registrations().find(|r| r.name == name)
}
