//! Core simulation module
//!
//! Contains the simulation controller, its clock, event queue and
//! configuration

mod config;
mod events;
mod simulation;
mod time;

pub use config::{ConfigError, GridConfig, SkirmishConfig, UnitSpawn};
pub use events::{Cue, EventQueue, UnitEvent};
pub use simulation::{Simulation, SimulationConfig, SimulationError};
pub use time::{Clock, SimClock};
