//! Unit components

use glam::{Quat, Vec3};
use hecs::Entity;

use crate::ai::{StateMachine, UnitBehavior};

/// Position and facing of a unit on the battlefield
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in world space
    pub position: Vec3,
    /// Rotation as a quaternion
    pub rotation: Quat,
}

impl Transform {
    /// Create a transform with just a position
    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Turn about the vertical axis to face a point.
    ///
    /// Height differences are ignored; facing the own position is a no-op.
    pub fn face(&mut self, point: Vec3) {
        let to_point = point - self.position;
        let flat = Vec3::new(to_point.x, 0.0, to_point.z);
        if flat.length_squared() <= f32::EPSILON {
            return;
        }
        self.rotation = Quat::from_rotation_y(f32::atan2(-flat.x, -flat.z));
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

/// Name component for debugging
#[derive(Debug, Clone)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// Side a unit fights for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Team(pub u8);

/// Non-owning handle to the unit being engaged.
///
/// The referenced unit may be destroyed at any time; readers must treat a
/// dangling handle exactly like no target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Target(pub Option<Entity>);

/// Behavior state machine of a unit
#[derive(Debug, Default)]
pub struct Brain(pub StateMachine<UnitBehavior>);

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_heading(transform: &Transform, expected: Vec3) {
        let heading = transform.rotation * Vec3::NEG_Z;
        assert!((heading - expected).length() < 1e-5, "{heading} != {expected}");
    }

    #[test]
    fn test_default_faces_negative_z() {
        assert_heading(&Transform::default(), Vec3::NEG_Z);
    }

    #[test]
    fn test_face_point() {
        let mut transform = Transform::from_position(Vec3::new(1.0, 0.0, 1.0));

        transform.face(Vec3::new(5.0, 0.0, 1.0));
        assert_heading(&transform, Vec3::X);

        transform.face(Vec3::new(1.0, 3.0, 4.0));
        assert_heading(&transform, Vec3::Z);
    }

    #[test]
    fn test_face_own_position_keeps_rotation() {
        let mut transform = Transform::from_position(Vec3::ONE);
        transform.face(Vec3::new(1.0, 0.0, -4.0));
        let before = transform.rotation;

        transform.face(Vec3::new(1.0, 7.0, 1.0));

        assert_eq!(transform.rotation, before);
    }
}
