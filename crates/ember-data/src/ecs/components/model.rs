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

use super::{expect_object, read_field};
use crate::ecs::{Component, EcsError, SerializableComponent};

/// A renderable model, referenced by an asset path.
///
/// The path is opaque to the data layer; loading and GPU upload happen
/// outside of the ECS.
#[derive(Debug, Clone, Default, PartialEq, Eq, Component)]
pub struct Model {
    /// Asset path of the model.
    pub path: String,
}

impl Model {
    /// Creates a model referencing `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl SerializableComponent for Model {
    fn on_serialize(&self) -> serde_json::Value {
        serde_json::json!({ "ModelPath": self.path })
    }

    fn on_deserialize(&mut self, value: &serde_json::Value) -> Result<(), EcsError> {
        expect_object(Self::NAME, value)?;
        if let Some(path) = read_field(Self::NAME, value, "ModelPath")? {
            self.path = path;
        }
        Ok(())
    }
}
