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

//! The fixed phase order of one frame.

use ember_data::ecs::FlushStats;
use std::fmt;
use std::time::Duration;

/// One stage of a frame. [`Engine::tick`](crate::Engine::tick) runs them in
/// the order of [`FramePhase::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramePhase {
    /// Scene events are delivered to the game.
    Poll,
    /// The World flushes its pending structural changes.
    Simulate,
    /// Game logic, then every Core except the render Core; the scene graph
    /// pass happens here.
    Update,
    /// Render commands are extracted from the final world matrices.
    Render,
}

impl FramePhase {
    /// Every phase, in execution order.
    pub const ALL: [FramePhase; 4] = [
        FramePhase::Poll,
        FramePhase::Simulate,
        FramePhase::Update,
        FramePhase::Render,
    ];

    /// Position of the phase in [`ALL`](Self::ALL).
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for FramePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FramePhase::Poll => "Poll",
            FramePhase::Simulate => "Simulate",
            FramePhase::Update => "Update",
            FramePhase::Render => "Render",
        };
        f.write_str(name)
    }
}

/// What happened during one [`Engine::tick`](crate::Engine::tick).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameReport {
    /// Frame number, starting at 1.
    pub frame: u64,
    /// The delta time passed to the game and the Cores, in seconds.
    pub dt: f32,
    /// Counters of the Simulate phase.
    pub flush: FlushStats,
    /// Number of render commands produced.
    pub render_commands: usize,
    timings: [Duration; 4],
}

impl FrameReport {
    pub(crate) fn new(frame: u64, dt: f32) -> Self {
        Self {
            frame,
            dt,
            ..Self::default()
        }
    }

    pub(crate) fn record(&mut self, phase: FramePhase, elapsed: Duration) {
        self.timings[phase.index()] = elapsed;
    }

    /// Wall time spent in `phase`.
    #[must_use]
    pub fn timing(&self, phase: FramePhase) -> Duration {
        self.timings[phase.index()]
    }

    /// Wall time of the whole frame.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.timings.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_run_flush_before_update_before_render() {
        let order: Vec<_> = FramePhase::ALL.iter().map(|p| p.to_string()).collect();
        assert_eq!(order, ["Poll", "Simulate", "Update", "Render"]);
        for (i, phase) in FramePhase::ALL.iter().enumerate() {
            assert_eq!(phase.index(), i);
        }
    }

    #[test]
    fn report_sums_phase_timings() {
        let mut report = FrameReport::new(1, 0.5);
        report.record(FramePhase::Simulate, Duration::from_millis(2));
        report.record(FramePhase::Render, Duration::from_millis(3));

        assert_eq!(report.timing(FramePhase::Simulate), Duration::from_millis(2));
        assert_eq!(report.timing(FramePhase::Poll), Duration::ZERO);
        assert_eq!(report.total(), Duration::from_millis(5));
    }
}
