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
use ember_core::ecs::EntityId;
use ember_core::math::{self, Mat3, Mat4, Quat, Vec3};

/// A node of the scene graph: a local position, rotation and scale relative
/// to its parent, plus the world matrix computed by the scene graph pass.
///
/// Every setter marks the node dirty. The world matrix is only authoritative
/// after the scene graph has run for the current frame.
///
/// Parent and children links are maintained by the hierarchy operations on
/// the `World` (see [`crate::hierarchy`]), never directly. A clone carries
/// the local state and name only: it starts detached and dirty.
#[derive(Debug, PartialEq, Component)]
pub struct Transform {
    name: String,
    position: Vec3,
    rotation: Quat,
    scale: Vec3,
    world: Mat4,
    dirty: bool,
    parent: Option<EntityId>,
    children: Vec<EntityId>,
}

impl Transform {
    /// Creates an identity transform with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder-style [`set_position`](Self::set_position).
    #[must_use]
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.set_position(position);
        self
    }

    /// Builder-style [`set_rotation`](Self::set_rotation).
    #[must_use]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.set_rotation(rotation);
        self
    }

    /// Builder-style [`set_scale`](Self::set_scale).
    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.set_scale(scale);
        self
    }

    /// The node's name. Names are not unique.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the node.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Local position.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Sets the local position.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.dirty = true;
    }

    /// Moves the node by `offset` in parent space. A zero offset is ignored.
    pub fn translate(&mut self, offset: Vec3) {
        if offset == Vec3::ZERO {
            return;
        }
        self.set_position(self.position + offset);
    }

    /// Local rotation.
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Sets the local rotation.
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation.normalize();
        self.dirty = true;
    }

    /// Local rotation as XYZ Euler angles in degrees.
    pub fn rotation_euler(&self) -> Vec3 {
        math::quat_to_euler_degrees(self.rotation)
    }

    /// Sets the local rotation from XYZ Euler angles in degrees.
    pub fn set_rotation_euler(&mut self, degrees: Vec3) {
        self.set_rotation(math::quat_from_euler_degrees(degrees));
    }

    /// Local scale.
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Sets the local scale. An all-zero scale is ignored.
    pub fn set_scale(&mut self, scale: Vec3) {
        if scale == Vec3::ZERO {
            return;
        }
        self.scale = scale;
        self.dirty = true;
    }

    /// Sets the same scale on every axis. An unchanged value is ignored.
    pub fn set_uniform_scale(&mut self, scale: f32) {
        if self.scale == Vec3::splat(scale) {
            return;
        }
        self.scale = Vec3::splat(scale);
        self.dirty = true;
    }

    /// Restores identity position, rotation and scale.
    pub fn reset(&mut self) {
        self.position = Vec3::ZERO;
        self.rotation = Quat::IDENTITY;
        self.scale = Vec3::ONE;
        self.dirty = true;
    }

    /// Rotates the node so its front axis (+Z) points along `direction`, in
    /// parent space, keeping +Y as the up reference. A zero direction is
    /// ignored.
    pub fn look_at(&mut self, direction: Vec3) {
        let Some(front) = direction.try_normalize() else {
            return;
        };
        let right = Vec3::Y
            .cross(front)
            .try_normalize()
            .unwrap_or(Vec3::X);
        let up = front.cross(right);
        self.set_rotation(Quat::from_mat3(&Mat3::from_cols(right, up, front)));
    }

    /// The local matrix `T * R * S`.
    pub fn local_matrix(&self) -> Mat4 {
        math::local_matrix(self.position, self.rotation, self.scale)
    }

    /// The world matrix computed by the last scene graph pass.
    pub fn world_matrix(&self) -> Mat4 {
        self.world
    }

    /// Translation part of the world matrix.
    pub fn world_position(&self) -> Vec3 {
        self.world.w_axis.truncate()
    }

    /// Unit +Z axis of the world matrix.
    pub fn front(&self) -> Vec3 {
        self.world.z_axis.truncate().normalize_or_zero()
    }

    /// Unit +Y axis of the world matrix.
    pub fn up(&self) -> Vec3 {
        self.world.y_axis.truncate().normalize_or_zero()
    }

    /// Unit +X axis of the world matrix.
    pub fn right(&self) -> Vec3 {
        self.world.x_axis.truncate().normalize_or_zero()
    }

    /// Returns `true` if the local state changed since the world matrix was
    /// last computed.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Forces recomputation at the next scene graph pass.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Stores a freshly computed world matrix and clears the dirty flag.
    ///
    /// Called by the scene graph pass on the main thread.
    pub fn apply_world_matrix(&mut self, world: Mat4) {
        self.world = world;
        self.dirty = false;
    }

    /// The parent node, `None` for the root or a detached node.
    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    /// Children in insertion order.
    pub fn children(&self) -> &[EntityId] {
        &self.children
    }

    pub(crate) fn set_parent_link(&mut self, parent: Option<EntityId>) {
        self.parent = parent;
        self.dirty = true;
    }

    pub(crate) fn push_child(&mut self, child: EntityId) {
        if !self.children.contains(&child) {
            self.children.push(child);
        }
    }

    pub(crate) fn remove_child_link(&mut self, child: EntityId) -> bool {
        let before = self.children.len();
        self.children.retain(|c| *c != child);
        before != self.children.len()
    }

    pub(crate) fn clear_links(&mut self) {
        self.parent = None;
        self.children.clear();
    }
}

impl Clone for Transform {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            position: self.position,
            rotation: self.rotation,
            scale: self.scale,
            world: self.world,
            dirty: true,
            parent: None,
            children: Vec::new(),
        }
    }
}

impl Default for Transform {
    /// An unnamed identity transform, dirty so its first pass computes it.
    fn default() -> Self {
        Self {
            name: String::new(),
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            world: Mat4::IDENTITY,
            dirty: true,
            parent: None,
            children: Vec::new(),
        }
    }
}

impl SerializableComponent for Transform {
    fn on_serialize(&self) -> serde_json::Value {
        serde_json::json!({
            "Name": self.name,
            "Position": self.position,
            "Rotation": self.rotation_euler(),
            "Scale": self.scale,
        })
    }

    fn on_deserialize(&mut self, value: &serde_json::Value) -> Result<(), EcsError> {
        expect_object(Self::NAME, value)?;
        if let Some(name) = read_field::<String>(Self::NAME, value, "Name")? {
            self.set_name(name);
        }
        if let Some(position) = read_field::<Vec3>(Self::NAME, value, "Position")? {
            self.set_position(position);
        }
        if let Some(degrees) = read_field::<Vec3>(Self::NAME, value, "Rotation")? {
            self.set_rotation_euler(degrees);
        }
        if let Some(scale) = read_field::<Vec3>(Self::NAME, value, "Scale")? {
            self.set_scale(scale);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn setters_mark_dirty_and_pass_clears_it() {
        let mut t = Transform::new("Node");
        t.apply_world_matrix(Mat4::IDENTITY);
        assert!(!t.is_dirty());

        t.set_position(Vec3::new(1.0, 2.0, 3.0));
        assert!(t.is_dirty(), "set_position must mark the node dirty");

        t.apply_world_matrix(t.local_matrix());
        assert!(!t.is_dirty());
        assert_eq!(t.world_position(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn ignored_updates_leave_the_node_clean() {
        let mut t = Transform::new("Node");
        t.apply_world_matrix(Mat4::IDENTITY);

        t.set_scale(Vec3::ZERO);
        t.set_uniform_scale(1.0);
        t.translate(Vec3::ZERO);

        assert!(!t.is_dirty(), "no-op updates must not dirty the node");
        assert_eq!(t.scale(), Vec3::ONE);
    }

    #[test]
    fn clones_are_detached_and_dirty() {
        let mut t = Transform::new("Node").with_position(Vec3::X);
        t.set_parent_link(Some(EntityId::new(1, 1)));
        t.push_child(EntityId::new(2, 1));
        t.apply_world_matrix(t.local_matrix());

        let copy = t.clone();

        assert_eq!(copy.parent(), None);
        assert!(copy.children().is_empty());
        assert!(copy.is_dirty());
        assert_eq!(copy.local_matrix(), t.local_matrix());
    }

    #[test]
    fn translate_accumulates() {
        let mut t = Transform::default();
        t.translate(Vec3::X);
        t.translate(Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(t.position(), Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn reset_restores_identity() {
        let mut t = Transform::new("Node")
            .with_position(Vec3::splat(4.0))
            .with_rotation(Quat::from_rotation_y(1.0))
            .with_scale(Vec3::splat(2.0));
        t.reset();
        assert_eq!(t.local_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn euler_accessors_use_degrees() {
        let mut t = Transform::default();
        t.set_rotation_euler(Vec3::new(0.0, 90.0, 0.0));
        assert_abs_diff_eq!(t.rotation_euler(), Vec3::new(0.0, 90.0, 0.0), epsilon = 1e-3);
    }

    #[test]
    fn look_at_points_front_along_direction() {
        let mut t = Transform::default();
        t.look_at(Vec3::new(3.0, 0.0, 0.0));
        t.apply_world_matrix(t.local_matrix());

        assert_abs_diff_eq!(t.front(), Vec3::X, epsilon = 1e-5);
        assert_abs_diff_eq!(t.up(), Vec3::Y, epsilon = 1e-5);

        // Straight up falls back to a fixed right axis instead of NaNs.
        t.look_at(Vec3::Y);
        t.apply_world_matrix(t.local_matrix());
        assert_abs_diff_eq!(t.front(), Vec3::Y, epsilon = 1e-5);
        assert!(t.right().is_finite());
    }

    #[test]
    fn basis_vectors_are_normalized() {
        let mut t = Transform::default().with_scale(Vec3::splat(3.0));
        t.apply_world_matrix(t.local_matrix());
        assert_abs_diff_eq!(t.right(), Vec3::X);
        assert_abs_diff_eq!(t.up(), Vec3::Y);
        assert_abs_diff_eq!(t.front(), Vec3::Z);
    }

    #[test]
    fn deserialized_default_matches_live_built() {
        let live = Transform::new("Crate")
            .with_position(Vec3::new(1.0, -2.0, 3.5))
            .with_rotation(math::quat_from_euler_degrees(Vec3::new(10.0, 20.0, 30.0)))
            .with_scale(Vec3::new(1.0, 2.0, 1.0));

        let mut restored = Transform::default();
        restored.on_deserialize(&live.on_serialize()).unwrap();

        assert_eq!(restored.name(), "Crate");
        assert_eq!(restored.position(), live.position());
        assert_eq!(restored.scale(), live.scale());
        assert_abs_diff_eq!(restored.local_matrix(), live.local_matrix(), epsilon = 1e-4);
        assert!(restored.is_dirty());
    }

    #[test]
    fn missing_scale_keeps_default() {
        let mut t = Transform::default();
        t.on_deserialize(&serde_json::json!({ "Position": [1.0, 0.0, 0.0], "Rotation": [0.0, 0.0, 0.0] }))
            .unwrap();
        assert_eq!(t.scale(), Vec3::ONE);
        assert_eq!(t.position(), Vec3::X);
    }

    #[test]
    fn malformed_fields_are_rejected() {
        let mut t = Transform::default();
        let err = t
            .on_deserialize(&serde_json::json!({ "Position": "up" }))
            .unwrap_err();
        assert!(matches!(err, EcsError::Deserialize { component: "Transform", .. }));

        let err = t.on_deserialize(&serde_json::json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, EcsError::Deserialize { .. }));
    }
}
