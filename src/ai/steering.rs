//! Kinematic steering for waypoint following
//!
//! Each behavior returns the velocity an agent should move at this step.
//! Agents follow straight segments between waypoints, so there is no
//! momentum to carry them around corners into blocked cells.

use glam::Vec3;

/// Trait for steering behaviors
pub trait SteeringBehavior {
    /// Desired velocity for an agent at `position`
    fn calculate(&self, position: Vec3) -> Vec3;
}

/// Seek behavior - full speed toward an intermediate waypoint
#[derive(Debug, Clone, Copy)]
pub struct Seek {
    /// Target position
    pub target: Vec3,
    /// Maximum speed
    pub max_speed: f32,
}

impl Seek {
    /// Create a new seek behavior
    #[must_use]
    pub fn new(target: Vec3, max_speed: f32) -> Self {
        Self { target, max_speed }
    }
}

impl SteeringBehavior for Seek {
    fn calculate(&self, position: Vec3) -> Vec3 {
        (self.target - position).normalize_or_zero() * self.max_speed
    }
}

/// Arrive behavior - move toward the final waypoint and slow down
#[derive(Debug, Clone, Copy)]
pub struct Arrive {
    /// Target position
    pub target: Vec3,
    /// Maximum speed
    pub max_speed: f32,
    /// Seconds in which the agent aims to close the remaining gap
    pub time_to_target: f32,
    /// Distance considered arrived
    pub target_radius: f32,
}

impl Arrive {
    /// Create a new arrive behavior
    #[must_use]
    pub fn new(target: Vec3, max_speed: f32) -> Self {
        Self {
            target,
            max_speed,
            time_to_target: 0.25,
            target_radius: 0.05,
        }
    }

    /// Set the arrival radius
    #[must_use]
    pub fn with_radius(mut self, target_radius: f32) -> Self {
        self.target_radius = target_radius;
        self
    }
}

impl SteeringBehavior for Arrive {
    fn calculate(&self, position: Vec3) -> Vec3 {
        let to_target = self.target - position;
        let distance = to_target.length();

        if distance < self.target_radius {
            return Vec3::ZERO;
        }

        let speed = (distance / self.time_to_target).min(self.max_speed);
        to_target.normalize_or_zero() * speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seek_full_speed() {
        let seek = Seek::new(Vec3::new(10.0, 0.0, 0.0), 5.0);
        let velocity = seek.calculate(Vec3::ZERO);

        assert!(velocity.x > 0.0);
        assert!((velocity.length() - 5.0).abs() < 0.01);
    }

    #[test]
    fn test_seek_at_target_is_zero() {
        let seek = Seek::new(Vec3::ONE, 5.0);

        assert_eq!(seek.calculate(Vec3::ONE), Vec3::ZERO);
    }

    #[test]
    fn test_arrive_slows_near_target() {
        let far = Arrive::new(Vec3::new(10.0, 0.0, 0.0), 4.0);
        let near = Arrive::new(Vec3::new(0.5, 0.0, 0.0), 4.0);

        assert!((far.calculate(Vec3::ZERO).length() - 4.0).abs() < 0.01);
        assert!((near.calculate(Vec3::ZERO).length() - 2.0).abs() < 0.01);
    }

    #[test]
    fn test_arrive_stops_inside_radius() {
        let arrive = Arrive::new(Vec3::new(0.01, 0.0, 0.0), 4.0);

        assert_eq!(arrive.calculate(Vec3::ZERO), Vec3::ZERO);
    }
}
