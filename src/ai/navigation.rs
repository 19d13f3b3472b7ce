//! Navigation agent
//!
//! A concrete [`Navigation`] capability: plans over an optional shared
//! [`Grid`] with A* and follows the waypoints with steering. Without a grid
//! every path is a straight line.
//!
//! A destination request is not planned immediately. The path stays pending
//! until the next [`NavAgent::update`], which mirrors how engine navigation
//! agents report `path pending` for at least one frame after an order.

use std::sync::Arc;

use glam::Vec3;
use smallvec::smallvec;

use super::behavior::Navigation;
use super::pathfinding::{Grid, Waypoints, find_path, path_length};
use super::steering::{Arrive, Seek, SteeringBehavior};

/// Distance at which the final waypoint snaps as reached
const ARRIVE_TOLERANCE: f32 = 0.05;

/// Path-following movement agent owned by a single unit
#[derive(Debug, Clone)]
pub struct NavAgent {
    /// Maximum speed in world units per second
    pub speed: f32,
    /// Arrival tolerance reported through `stopping_distance()`
    stopping_distance: f32,
    /// Walkability grid shared with other agents
    grid: Option<Arc<Grid>>,
    destination: Option<Vec3>,
    path: Waypoints,
    /// Position seen at the last update
    position: Vec3,
    velocity: Vec3,
    stopped: bool,
    pending: bool,
    unreachable: bool,
}

impl NavAgent {
    /// Create an agent at `position`
    #[must_use]
    pub fn new(position: Vec3, speed: f32, stopping_distance: f32) -> Self {
        Self {
            speed,
            stopping_distance,
            grid: None,
            destination: None,
            path: Waypoints::new(),
            position,
            velocity: Vec3::ZERO,
            stopped: false,
            pending: false,
            unreachable: false,
        }
    }

    /// Plan paths over a shared grid
    #[must_use]
    pub fn with_grid(mut self, grid: Arc<Grid>) -> Self {
        self.grid = Some(grid);
        self
    }

    /// Current velocity
    #[must_use]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Advance the agent by `dt` seconds, moving `position` along the path.
    pub fn update(&mut self, position: &mut Vec3, dt: f32) {
        self.position = *position;

        if self.pending {
            self.plan();
        }

        if self.stopped || dt <= 0.0 {
            return;
        }

        let Some(&waypoint) = self.path.first() else {
            self.velocity = Vec3::ZERO;
            return;
        };

        let to_waypoint = waypoint - *position;
        self.velocity = if self.path.len() == 1 {
            Arrive::new(waypoint, self.speed)
                .with_radius(ARRIVE_TOLERANCE)
                .calculate(*position)
        } else {
            Seek::new(waypoint, self.speed).calculate(*position)
        };

        let step = self.velocity * dt;
        if self.velocity == Vec3::ZERO || step.length() >= to_waypoint.length() {
            self.reach_waypoint(position, waypoint);
        } else {
            *position += step;
            self.position = *position;
        }
    }

    fn reach_waypoint(&mut self, position: &mut Vec3, waypoint: Vec3) {
        *position = waypoint;
        self.position = waypoint;
        self.path.remove(0);
        if self.path.is_empty() {
            self.velocity = Vec3::ZERO;
        }
    }

    fn plan(&mut self) {
        self.pending = false;
        self.unreachable = false;

        let Some(destination) = self.destination else {
            self.path.clear();
            return;
        };

        let planned = match &self.grid {
            None => Some(smallvec![destination]),
            Some(grid) => find_path(grid, self.position, destination),
        };

        match planned {
            Some(path) => self.path = path,
            None => {
                log::debug!("no path from {} to {destination}", self.position);
                self.unreachable = true;
                self.path.clear();
            }
        }
    }
}

impl Navigation for NavAgent {
    fn set_destination(&mut self, destination: Vec3) {
        self.destination = Some(destination);
        self.pending = true;
    }

    fn set_stopped(&mut self, stopped: bool) {
        self.stopped = stopped;
        if stopped {
            self.velocity = Vec3::ZERO;
        }
    }

    fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn is_path_pending(&self) -> bool {
        self.pending
    }

    fn remaining_distance(&self) -> f32 {
        let Some(destination) = self.destination else {
            return 0.0;
        };

        if self.pending || self.unreachable {
            return self.position.distance(destination);
        }
        path_length(self.position, &self.path)
    }

    fn stopping_distance(&self) -> f32 {
        self.stopping_distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(agent: &mut NavAgent, position: &mut Vec3, steps: usize) {
        for _ in 0..steps {
            agent.update(position, 0.1);
        }
    }

    #[test]
    fn test_path_pending_until_update() {
        let mut agent = NavAgent::new(Vec3::ZERO, 5.0, 0.5);
        let mut position = Vec3::ZERO;

        agent.set_destination(Vec3::new(10.0, 0.0, 0.0));
        assert!(agent.is_path_pending());
        assert_eq!(agent.remaining_distance(), 10.0);

        agent.update(&mut position, 0.1);
        assert!(!agent.is_path_pending());
        assert!(position.x > 0.0);
    }

    #[test]
    fn test_straight_line_arrival() {
        let mut agent = NavAgent::new(Vec3::ZERO, 5.0, 0.5);
        let mut position = Vec3::ZERO;
        let goal = Vec3::new(10.0, 0.0, 0.0);

        agent.set_destination(goal);
        run(&mut agent, &mut position, 100);

        assert_eq!(position, goal);
        assert_eq!(agent.remaining_distance(), 0.0);
        assert_eq!(agent.velocity(), Vec3::ZERO);
    }

    #[test]
    fn test_speed_is_capped() {
        let mut agent = NavAgent::new(Vec3::ZERO, 5.0, 0.5);
        let mut position = Vec3::ZERO;

        agent.set_destination(Vec3::new(100.0, 0.0, 0.0));
        run(&mut agent, &mut position, 20);

        assert!(position.x <= 10.0 + 1e-3);
        assert!(agent.velocity().length() <= 5.0 + 1e-3);
    }

    #[test]
    fn test_stopped_agent_does_not_move() {
        let mut agent = NavAgent::new(Vec3::ZERO, 5.0, 0.5);
        let mut position = Vec3::ZERO;

        agent.set_destination(Vec3::new(10.0, 0.0, 0.0));
        agent.set_stopped(true);
        run(&mut agent, &mut position, 10);

        assert_eq!(position, Vec3::ZERO);
        assert!(agent.is_stopped());

        agent.set_stopped(false);
        run(&mut agent, &mut position, 1);
        assert!(position.x > 0.0);
    }

    #[test]
    fn test_grid_path_avoids_wall() {
        let mut grid = Grid::new(10, 10, 1.0);
        for z in 0..8 {
            grid.set_walkable((5, z), false);
        }
        let start = Vec3::new(2.5, 0.0, 2.5);
        let goal = Vec3::new(8.5, 0.0, 2.5);
        let mut agent = NavAgent::new(start, 5.0, 0.5).with_grid(Arc::new(grid.clone()));
        let mut position = start;

        agent.set_destination(goal);
        agent.update(&mut position, 0.0);
        assert!(agent.remaining_distance() > start.distance(goal));

        for _ in 0..400 {
            agent.update(&mut position, 0.05);
            let cell = grid.cell_at(position).expect("stays on grid");
            assert!(grid.is_walkable(cell));
        }

        assert_eq!(position, goal);
    }

    #[test]
    fn test_unreachable_destination_never_completes() {
        let mut grid = Grid::new(5, 5, 1.0);
        grid.set_walkable((4, 4), false);
        let mut agent = NavAgent::new(Vec3::ZERO, 5.0, 0.5).with_grid(Arc::new(grid));
        let mut position = Vec3::new(0.5, 0.0, 0.5);

        agent.set_destination(Vec3::new(4.5, 0.0, 4.5));
        run(&mut agent, &mut position, 50);

        assert!(!agent.is_path_pending());
        assert_eq!(agent.remaining_distance(), position.distance(Vec3::new(4.5, 0.0, 4.5)));
        assert!(agent.remaining_distance() > agent.stopping_distance());
        assert_eq!(position, Vec3::new(0.5, 0.0, 0.5));
    }
}
