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

//! The built-in components of the engine.

mod camera;
mod model;
mod transform;

pub use camera::*;
pub use model::*;
pub use transform::*;

use crate::ecs::EcsError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Reads an optional field of a serialized component.
///
/// Returns `Ok(None)` when the key is absent and an [`EcsError::Deserialize`]
/// naming the component and key when the value has the wrong shape.
pub(crate) fn read_field<T: DeserializeOwned>(
    component: &'static str,
    value: &Value,
    key: &str,
) -> Result<Option<T>, EcsError> {
    value
        .get(key)
        .map(|field| {
            T::deserialize(field).map_err(|e| EcsError::Deserialize {
                component,
                reason: format!("`{key}`: {e}"),
            })
        })
        .transpose()
}

/// Fails unless `value` is a JSON object.
pub(crate) fn expect_object(component: &'static str, value: &Value) -> Result<(), EcsError> {
    if value.is_object() {
        Ok(())
    } else {
        Err(EcsError::Deserialize {
            component,
            reason: format!("expected an object, found `{value}`"),
        })
    }
}
