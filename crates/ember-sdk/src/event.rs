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

//! Scene lifecycle notifications.

use ember_core::ecs::EntityId;

/// Published on the engine's event bus and delivered to the game during the
/// [`Poll`](crate::FramePhase::Poll) phase of the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneEvent {
    /// A new scene became active.
    Loaded {
        /// The scene graph root of the new scene.
        root: EntityId,
        /// Entities instantiated from a scene document, zero for an empty scene.
        entities: usize,
    },
    /// The previous scene was dropped.
    Unloaded,
    /// An entity was queued for destruction through the engine.
    EntityDestroyed(EntityId),
}
