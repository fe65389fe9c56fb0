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

//! Error types of the data layer.

use ember_core::ecs::EntityId;
use thiserror::Error;

/// Errors raised by the `World`, its storages and the transform hierarchy.
///
/// Every contract violation names the entity (id, slot and generation) and
/// the component type involved.
#[derive(Debug, Error)]
pub enum EcsError {
    /// The entity already holds a component of this type.
    #[error("entity {entity} (slot {}, generation {}) already has a `{component}` component", .entity.index(), .entity.generation())]
    DuplicateComponent {
        /// The entity the add was attempted on.
        entity: EntityId,
        /// The component type name.
        component: &'static str,
    },

    /// The entity does not hold a component of this type.
    #[error("entity {entity} (slot {}, generation {}) has no `{component}` component", .entity.index(), .entity.generation())]
    MissingComponent {
        /// The entity that was queried.
        entity: EntityId,
        /// The requested component type name.
        component: &'static str,
    },

    /// The id does not refer to a live entity (destroyed, recycled or never created).
    #[error("entity {entity} (slot {}, generation {}) is not alive", .entity.index(), .entity.generation())]
    InvalidEntity {
        /// The offending id.
        entity: EntityId,
    },

    /// The handle's generation no longer matches its slot, or the handle was
    /// minted by a different scene or world.
    #[error("stale handle for entity {entity} (slot {}, generation {})", .entity.index(), .entity.generation())]
    StaleHandle {
        /// The id stored in the handle.
        entity: EntityId,
    },

    /// The world the handle points to has been dropped.
    #[error("the world owning entity {entity} has been torn down")]
    WorldTornDown {
        /// The id stored in the handle.
        entity: EntityId,
    },

    /// Re-parenting would create a cycle in the transform hierarchy.
    #[error("setting the parent of {child} to {parent} would create a cycle")]
    HierarchyCycle {
        /// The node being re-parented.
        child: EntityId,
        /// The requested parent.
        parent: EntityId,
    },

    /// A component could not be restored from its serialized form.
    #[error("failed to deserialize `{component}`: {reason}")]
    Deserialize {
        /// The component type name.
        component: &'static str,
        /// What went wrong.
        reason: String,
    },

    /// A scene document references a component name nobody registered.
    #[error("unknown component `{0}` in scene document")]
    UnknownComponent(String),

    /// A Core returned an error from `update`. This is fatal for the frame loop.
    #[error("core `{core}` failed: {source}")]
    CoreFailed {
        /// Name of the failing Core.
        core: &'static str,
        /// The Core's error.
        #[source]
        source: CoreError,
    },

    /// A Core failed during `init`.
    #[error("core `{core}` failed to initialize: {source}")]
    CoreInit {
        /// Name of the failing Core.
        core: &'static str,
        /// The Core's error.
        #[source]
        source: CoreError,
    },

    /// JSON (de)serialization of a scene document failed.
    #[error("scene document error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The error type Cores return from `init` and `update`.
///
/// It wraps any error so Cores in other crates can surface their own types.
pub type CoreError = Box<dyn std::error::Error + Send + Sync + 'static>;
