//! Combat module
//!
//! Unit stats, hit points and the damage-resolution hook used when an
//! attack fires.

mod health;
mod resolver;
mod stats;

pub use health::Health;
pub use resolver::{AttackIntent, CombatResolver, FlatDamage};
pub use stats::{StatsError, UnitStats};
