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

//! Ember's sparse-set Entity-Component-System.
//!
//! Entities are generational ids ([`EntityId`]). Each component type lives in
//! its own [`ComponentStorage`], and every entity records the set of types it
//! holds in a [`TypeSet`]. [`Core`]s subscribe to entities through a
//! [`ComponentFilter`] and are notified by the [`World`] whenever an entity
//! starts or stops matching.
//!
//! The primary entry point is the [`World`] struct.

mod component;
mod components;
mod core;
mod entity;
mod entity_store;
mod error;
mod filter;
mod handle;
mod resources;
mod storage;
mod type_set;
mod world;

pub use self::core::Core;
pub use component::{component_index, Component, SerializableComponent};
pub use components::*;
pub use ember_core::ecs::EntityId;
pub use ember_macros::Component;
pub use entity::{EntityMut, EntityRef};
pub use error::{CoreError, EcsError};
pub use filter::ComponentFilter;
pub use handle::EntityHandle;
pub use resources::{Resource, Resources};
pub use storage::ComponentStorage;
pub use type_set::TypeSet;
pub use world::{FlushStats, World, WorldState};
