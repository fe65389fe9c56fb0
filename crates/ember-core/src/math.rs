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

//! Math types used across the engine.
//!
//! Ember uses `glam`'s column-major, column-vector conventions: a point is
//! transformed by `matrix * point`, so a child's world matrix is
//! `parent_world * local`.

pub use glam::{EulerRot, Mat3, Mat4, Quat, Vec2, Vec3, Vec4};

/// Euler order used for the degree-based rotation accessors (pitch, yaw, roll).
pub const EULER_ORDER: EulerRot = EulerRot::XYZ;

/// Builds a local matrix from translation, rotation and scale (`T * R * S`).
#[inline]
#[must_use]
pub fn local_matrix(position: Vec3, rotation: Quat, scale: Vec3) -> Mat4 {
    Mat4::from_scale_rotation_translation(scale, rotation, position)
}

/// Converts Euler angles in degrees to a quaternion using [`EULER_ORDER`].
#[must_use]
pub fn quat_from_euler_degrees(degrees: Vec3) -> Quat {
    Quat::from_euler(
        EULER_ORDER,
        degrees.x.to_radians(),
        degrees.y.to_radians(),
        degrees.z.to_radians(),
    )
}

/// Converts a quaternion to Euler angles in degrees using [`EULER_ORDER`].
#[must_use]
pub fn quat_to_euler_degrees(rotation: Quat) -> Vec3 {
    let (x, y, z) = rotation.to_euler(EULER_ORDER);
    Vec3::new(x.to_degrees(), y.to_degrees(), z.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn local_matrix_is_translate_rotate_scale() {
        let position = Vec3::new(1.0, 2.0, 3.0);
        let rotation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let scale = Vec3::splat(2.0);

        let expected = Mat4::from_translation(position)
            * Mat4::from_quat(rotation)
            * Mat4::from_scale(scale);
        assert_abs_diff_eq!(local_matrix(position, rotation, scale), expected, epsilon = 1e-5);
    }

    #[test]
    fn euler_degree_conversion_round_trips() {
        let degrees = Vec3::new(10.0, 45.0, -30.0);
        let back = quat_to_euler_degrees(quat_from_euler_degrees(degrees));
        assert_abs_diff_eq!(back, degrees, epsilon = 1e-3);
    }
}
