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

//! Engine configuration, loaded from a JSON file.
//!
//! ```json
//! {
//!   "Window": { "Width": 1280, "Height": 720 },
//!   "Title": "Ember",
//!   "Fps": 144,
//!   "Jobs": { "Workers": 4, "BranchThreshold": 5, "JoinTimeoutMs": 2000 }
//! }
//! ```
//!
//! Every key is optional and falls back to its default.

use ember_core::jobs::JobQueueConfig;
use ember_cores::SceneGraphConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading an [`EngineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {path:?}: {source}")]
    Io {
        /// The file that was read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The text is not a valid configuration document.
    #[error("invalid config document: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of range.
    #[error("invalid config value `{key}`: {reason}")]
    Invalid {
        /// The offending key.
        key: &'static str,
        /// Why it was rejected.
        reason: &'static str,
    },
}

/// Size of the output surface. Only the aspect ratio is used headlessly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct WindowConfig {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Job queue and scene graph parallelism settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct JobsConfig {
    /// Worker thread count. `None` uses the machine's parallelism minus one;
    /// zero runs every job inline.
    pub workers: Option<usize>,
    /// See [`SceneGraphConfig::branch_threshold`].
    pub branch_threshold: usize,
    /// Join deadline for one scene graph pass, in milliseconds. `None` waits
    /// forever.
    pub join_timeout_ms: Option<u64>,
}

impl Default for JobsConfig {
    fn default() -> Self {
        let scene_graph = SceneGraphConfig::default();
        Self {
            workers: None,
            branch_threshold: scene_graph.branch_threshold,
            join_timeout_ms: scene_graph
                .join_timeout
                .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
        }
    }
}

/// Top-level engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct EngineConfig {
    /// Output surface size.
    pub window: WindowConfig,
    /// Application title, used in logs.
    pub title: String,
    /// Target simulation rate of [`Engine::run`](crate::Engine::run).
    pub fps: u32,
    /// Parallelism settings.
    pub jobs: JobsConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            title: "Ember".to_string(),
            fps: 144,
            jobs: JobsConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Reads and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;
        log::info!("Engine config loaded from {}.", path.display());
        Ok(config)
    }

    /// Parses and validates a configuration document.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fps == 0 {
            return Err(ConfigError::Invalid {
                key: "Fps",
                reason: "must be greater than zero",
            });
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid {
                key: "Window",
                reason: "width and height must be greater than zero",
            });
        }
        Ok(())
    }

    /// Duration of one simulation step at the target rate.
    #[must_use]
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.fps.max(1)))
    }

    /// Width over height of the output surface.
    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        self.window.width.max(1) as f32 / self.window.height.max(1) as f32
    }

    /// The job queue settings.
    #[must_use]
    pub fn job_queue_config(&self) -> JobQueueConfig {
        let mut config = JobQueueConfig::default();
        if let Some(workers) = self.jobs.workers {
            config.workers = workers;
        }
        config
    }

    /// The scene graph settings.
    #[must_use]
    pub fn scene_graph_config(&self) -> SceneGraphConfig {
        SceneGraphConfig {
            branch_threshold: self.jobs.branch_threshold,
            join_timeout: self.jobs.join_timeout_ms.map(Duration::from_millis),
        }
    }
}
