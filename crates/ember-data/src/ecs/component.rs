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

use crate::ecs::EcsError;
use ember_core::ecs::{type_index, ComponentFamily};

/// A marker trait for types that can be attached to entities.
///
/// `'static` keeps borrowed data out of component storage, and `Send + Sync`
/// lets the scene graph hand read-only snapshots to worker threads.
/// Implement it with `#[derive(Component)]`.
pub trait Component: 'static + Send + Sync {
    /// Name under which the component is registered and serialized.
    const NAME: &'static str;
}

/// Returns the dense component type index of `T`.
#[inline]
pub fn component_index<T: Component>() -> usize {
    type_index::<ComponentFamily, T>()
}

/// Serialization hooks for components stored in scene documents.
///
/// The contract is that building a default value, adding it to an entity and
/// then calling [`on_deserialize`](Self::on_deserialize) yields a component
/// indistinguishable from one built live.
pub trait SerializableComponent: Component + Default {
    /// Writes the component's persistent state.
    fn on_serialize(&self) -> serde_json::Value;

    /// Restores the component's persistent state. Keys missing from `value`
    /// keep their current (default) value.
    fn on_deserialize(&mut self, value: &serde_json::Value) -> Result<(), EcsError>;
}
