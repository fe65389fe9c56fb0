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

//! A small fork-join job queue.
//!
//! The queue owns a fixed number of worker threads fed through a
//! `crossbeam-channel`. Callers submit closures, keep the returned
//! [`JobHandle`]s and block on them (or on [`join_all`]) before moving to the
//! next frame stage. There is no background work that outlives a join.

mod queue;

pub use queue::{join_all, JobHandle, JobQueue, JobQueueConfig};

use thiserror::Error;

/// Errors reported when joining a job.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    /// The job panicked; the payload message is captured when it is a string.
    #[error("job panicked: {0}")]
    Panicked(String),
    /// The worker dropped the job without running it (queue shut down).
    #[error("job was dropped before completion")]
    Disconnected,
    /// The join deadline elapsed before the job completed.
    #[error("job did not complete within {0:?}")]
    TimedOut(std::time::Duration),
}
