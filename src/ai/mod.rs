//! AI and navigation module
//!
//! Provides the unit behavior state machine, the navigation agent it drives,
//! and the pathfinding and steering the agent is built from.

mod behavior;
mod fsm;
mod navigation;
mod pathfinding;
mod steering;

pub use behavior::{Combatant, Navigation, UnitBehavior, UnitContext};
pub use fsm::{Named, State, StateChange, StateMachine, Transition};
pub use navigation::NavAgent;
pub use pathfinding::{Cell, Grid, Waypoints, find_path, path_length};
pub use steering::{Arrive, Seek, SteeringBehavior};
