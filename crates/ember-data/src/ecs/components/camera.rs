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
use ember_core::math::{Mat4, Vec4};

/// A perspective camera. Its pose comes from the entity's `Transform`.
///
/// The engine renders through the *current* camera: the first one flagged
/// with `is_current`, or the first camera found when none is flagged.
#[derive(Debug, Clone, Copy, PartialEq, Component)]
pub struct Camera {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Distance to the near clipping plane. Should be a small positive value.
    pub z_near: f32,
    /// Distance to the far clipping plane. Must be larger than `z_near`.
    pub z_far: f32,
    /// RGBA clear color.
    pub clear_color: Vec4,
    /// Whether this camera should be the one the engine renders through.
    pub is_current: bool,
}

impl Camera {
    /// A perspective camera with the given vertical field of view.
    pub fn perspective(fov_degrees: f32, z_near: f32, z_far: f32) -> Self {
        Self {
            fov_degrees,
            z_near,
            z_far,
            ..Self::default()
        }
    }

    /// Left-handed perspective projection for a viewport of the given
    /// aspect ratio (width / height).
    pub fn projection_matrix(&self, aspect_ratio: f32) -> Mat4 {
        let aspect = if aspect_ratio > 0.0 { aspect_ratio } else { 1.0 };
        Mat4::perspective_lh(self.fov_degrees.to_radians(), aspect, self.z_near, self.z_far)
    }

    /// The view matrix of a camera whose node has the given world matrix.
    pub fn view_matrix(world: Mat4) -> Mat4 {
        world.inverse()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            z_near: 0.1,
            z_far: 1000.0,
            clear_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            is_current: false,
        }
    }
}

impl SerializableComponent for Camera {
    fn on_serialize(&self) -> serde_json::Value {
        serde_json::json!({
            "FieldOfView": self.fov_degrees,
            "Near": self.z_near,
            "Far": self.z_far,
            "ClearColor": self.clear_color,
            "IsCurrent": self.is_current,
        })
    }

    fn on_deserialize(&mut self, value: &serde_json::Value) -> Result<(), EcsError> {
        expect_object(Self::NAME, value)?;
        if let Some(fov) = read_field(Self::NAME, value, "FieldOfView")? {
            self.fov_degrees = fov;
        }
        if let Some(near) = read_field(Self::NAME, value, "Near")? {
            self.z_near = near;
        }
        if let Some(far) = read_field(Self::NAME, value, "Far")? {
            self.z_far = far;
        }
        if let Some(color) = read_field(Self::NAME, value, "ClearColor")? {
            self.clear_color = color;
        }
        if let Some(current) = read_field(Self::NAME, value, "IsCurrent")? {
            self.is_current = current;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ember_core::math::Vec3;

    #[test]
    fn view_matrix_inverts_the_camera_pose() {
        let world = Mat4::from_translation(Vec3::new(0.0, 2.0, -5.0));
        let view = Camera::view_matrix(world);
        let origin = view.transform_point3(Vec3::new(0.0, 2.0, -5.0));
        assert_abs_diff_eq!(origin, Vec3::ZERO, epsilon = 1e-6);
    }

    #[test]
    fn degenerate_aspect_falls_back_to_square() {
        let camera = Camera::default();
        assert_eq!(camera.projection_matrix(0.0), camera.projection_matrix(1.0));
    }

    #[test]
    fn serialized_camera_restores_into_default() {
        let live = Camera {
            is_current: true,
            clear_color: Vec4::new(0.1, 0.2, 0.3, 1.0),
            ..Camera::perspective(60.0, 0.5, 200.0)
        };
        let mut restored = Camera::default();
        restored.on_deserialize(&live.on_serialize()).unwrap();
        assert_eq!(restored, live);
    }
}
