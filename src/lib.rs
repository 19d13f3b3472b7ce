//! Behavior state machines for real-time combat units
//!
//! This crate provides:
//! - A generic finite state machine with enter/execute/exit lifecycle
//! - Idle, Move, Chase and Attack unit behaviors with attack cooldowns
//! - Grid pathfinding and steering behind a navigation seam
//! - A headless skirmish simulation on top of the hecs ECS

pub mod ai;
pub mod combat;
pub mod core;
pub mod ecs;

// Re-exports for convenience
pub use glam;
pub use hecs;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::ai::{
        Combatant, Grid, NavAgent, Named, Navigation, State, StateChange, StateMachine,
        Transition, UnitBehavior, UnitContext,
    };
    pub use crate::combat::{CombatResolver, FlatDamage, Health, UnitStats};
    pub use crate::core::{
        Clock, SimClock, Simulation, SimulationConfig, SkirmishConfig, UnitEvent, UnitSpawn,
    };
    pub use crate::ecs::{Name, Target, Team, Transform, World};
    pub use glam::{Vec2, Vec3};
    pub use hecs::Entity;
}
