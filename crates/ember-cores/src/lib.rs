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

//! # Ember Cores
//!
//! The engine's built-in [`Core`](ember_data::ecs::Core)s, registered in this
//! order by the SDK so that each frame computes world matrices, then picks
//! the view, then extracts render commands:
//!
//! 1. [`SceneGraphCore`]: owns the scene root and propagates `Transform`
//!    world matrices, fanning wide branches out to the job queue.
//! 2. [`CameraCore`]: selects the current camera and publishes a
//!    [`ViewState`] resource.
//! 3. [`RenderCore`]: fills the [`RenderQueue`] resource.

#![warn(missing_docs)]

pub mod camera;
pub mod render;
pub mod scene_graph;

pub use camera::{CameraCore, ViewState};
pub use render::{RenderCommand, RenderCore, RenderQueue};
pub use scene_graph::{SceneGraphConfig, SceneGraphCore, SceneGraphStats};
