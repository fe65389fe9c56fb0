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

//! # Ember Core
//!
//! Foundational crate containing the identity types, type registries and
//! concurrency primitives that every other Ember crate builds on.
//!
//! Nothing in here knows about components or worlds: entity ids are plain
//! packed integers, the type-id registry hands out small indices per family,
//! and the job queue runs closures.

#![warn(missing_docs)]

pub mod ecs;
pub mod event;
pub mod jobs;
pub mod math;

pub use event::EventBus;
pub use jobs::{JobError, JobHandle, JobQueue, JobQueueConfig};
