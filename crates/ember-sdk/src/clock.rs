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

//! Delta-time sources for the frame loop.

use std::time::{Duration, Instant};

/// A source of elapsed time between frames.
pub trait Clock: Send {
    /// Restarts the measurement from now.
    fn reset(&mut self);

    /// Time elapsed since the previous call (or since `reset`).
    fn delta(&mut self) -> Duration;
}

/// The monotonic wall clock.
#[derive(Debug)]
pub struct SystemClock {
    last: Instant,
}

impl SystemClock {
    /// Creates a clock starting now.
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn reset(&mut self) {
        self.last = Instant::now();
    }

    fn delta(&mut self) -> Duration {
        let now = Instant::now();
        let delta = now.duration_since(self.last);
        self.last = now;
        delta
    }
}

/// A clock that advances by a fixed step on every call. Used by tests and
/// deterministic headless runs.
#[derive(Debug, Clone, Copy)]
pub struct ManualClock {
    step: Duration,
}

impl ManualClock {
    /// Creates a clock reporting `step` per call.
    pub fn new(step: Duration) -> Self {
        Self { step }
    }

    /// Changes the reported step.
    pub fn set_step(&mut self, step: Duration) {
        self.step = step;
    }
}

impl Clock for ManualClock {
    fn reset(&mut self) {}

    fn delta(&mut self) -> Duration {
        self.step
    }
}
