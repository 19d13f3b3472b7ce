//! Combat unit behavior states
//!
//! The four mutually exclusive behaviors a unit can be in, driven by the
//! generic [`StateMachine`](super::StateMachine). Each behavior reads the unit
//! and its navigation agent through a [`UnitContext`] handed in on every call.
//!
//! | From   | Trigger                                   | To     |
//! |--------|-------------------------------------------|--------|
//! | Idle   | target acquired (pushed by a controller)  | Chase  |
//! | Move   | no path pending and within stopping range | Idle   |
//! | Chase  | target lost                               | Idle   |
//! | Chase  | distance <= attack range                  | Attack |
//! | Attack | target lost                               | Idle   |
//! | Attack | distance > attack range                   | Chase  |
//!
//! Move is only ever entered from outside (a move order).

use glam::Vec3;

use super::fsm::{Named, State, Transition};
use crate::core::Clock;

/// Slack when comparing the clock against a cooldown mark
const FIRE_EPSILON: f64 = 1e-6;

// ============================================================================
// Collaborator seams
// ============================================================================

/// Movement service a unit drives by destination requests.
///
/// Path computation is owned by the implementor; states only issue orders and
/// poll for completion.
pub trait Navigation {
    /// Request a path to `destination`
    fn set_destination(&mut self, destination: Vec3);

    /// Halt (`true`) or resume (`false`) movement
    fn set_stopped(&mut self, stopped: bool);

    /// Whether movement is halted
    fn is_stopped(&self) -> bool;

    /// Whether a requested path has not been computed yet
    fn is_path_pending(&self) -> bool;

    /// Distance left along the current path
    fn remaining_distance(&self) -> f32;

    /// Tolerance within which the destination counts as reached
    fn stopping_distance(&self) -> f32;
}

/// The unit a behavior acts on.
pub trait Combatant {
    /// Current world position
    fn position(&self) -> Vec3;

    /// Position of the current target.
    ///
    /// `None` when there is no target and when the target no longer exists.
    fn current_target(&self) -> Option<Vec3>;

    /// Maximum distance at which an attack may fire
    fn attack_range(&self) -> f32;

    /// Seconds between attacks
    fn attack_rate(&self) -> f32;

    /// Attack the current target
    fn perform_attack(&mut self);

    /// Turn to face a world position
    fn face(&mut self, point: Vec3);

    /// Presentation cue when a move order starts
    fn play_move_cue(&mut self) {}

    /// Presentation cue when the unit goes idle
    fn play_idle_cue(&mut self) {}
}

/// Everything a behavior may touch during one call.
pub struct UnitContext<'a> {
    /// The unit being driven
    pub unit: &'a mut dyn Combatant,
    /// Its navigation agent
    pub nav: &'a mut dyn Navigation,
    /// Simulation clock
    pub clock: &'a dyn Clock,
}

impl<'a> UnitContext<'a> {
    /// Bundle the collaborators of a single unit
    pub fn new(
        unit: &'a mut dyn Combatant,
        nav: &'a mut dyn Navigation,
        clock: &'a dyn Clock,
    ) -> Self {
        Self { unit, nav, clock }
    }

    /// Current target position and its distance from the unit
    fn target(&self) -> Option<(Vec3, f32)> {
        let target = self.unit.current_target()?;
        Some((target, self.unit.position().distance(target)))
    }
}

// ============================================================================
// Behaviors
// ============================================================================

/// Behavior of a single combat unit.
///
/// A fresh value is created for every transition, so per-state data (the
/// move destination, the attack cooldown) never leaks between activations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnitBehavior {
    /// Resting; waits for an order or target.
    Idle,
    /// Walking to a fixed point.
    Move {
        /// Destination captured when the order was given
        destination: Vec3,
    },
    /// Pursuing the current target.
    Chase,
    /// Firing at the current target.
    Attack {
        /// Scheduled time of the next attack
        next_fire_time: f64,
    },
}

impl UnitBehavior {
    /// Idle behavior
    #[must_use]
    pub const fn idle() -> Self {
        Self::Idle
    }

    /// Move to `destination`
    #[must_use]
    pub const fn move_to(destination: Vec3) -> Self {
        Self::Move { destination }
    }

    /// Chase the current target
    #[must_use]
    pub const fn chase() -> Self {
        Self::Chase
    }

    /// Attack the current target.
    ///
    /// The cooldown timer is reset to the enter time, so the first eligible
    /// tick fires.
    #[must_use]
    pub const fn attack() -> Self {
        Self::Attack {
            next_fire_time: 0.0,
        }
    }

    fn execute_move(ctx: &mut UnitContext<'_>) -> Transition<Self> {
        let nav = &*ctx.nav;
        if !nav.is_path_pending() && nav.remaining_distance() <= nav.stopping_distance() {
            return Transition::To(Self::idle());
        }
        Transition::None
    }

    fn execute_chase(ctx: &mut UnitContext<'_>) -> Transition<Self> {
        let Some((target, distance)) = ctx.target() else {
            return Transition::To(Self::idle());
        };

        if distance <= ctx.unit.attack_range() {
            return Transition::To(Self::attack());
        }

        // Target may be moving: re-path toward where it is now.
        ctx.nav.set_destination(target);
        Transition::None
    }

    fn execute_attack(next_fire_time: &mut f64, ctx: &mut UnitContext<'_>) -> Transition<Self> {
        let Some((target, distance)) = ctx.target() else {
            return Transition::To(Self::idle());
        };

        ctx.unit.face(target);

        if distance > ctx.unit.attack_range() {
            return Transition::To(Self::chase());
        }

        let now = ctx.clock.now();
        if now + FIRE_EPSILON >= *next_fire_time {
            ctx.unit.perform_attack();
            // Marks stay on the enter time's grid; a tick that lands late
            // does not push every later attack back.
            let rate = f64::from(ctx.unit.attack_rate());
            *next_fire_time = (*next_fire_time + rate).max(now);
            log::trace!("attack fired at {now:.3}, next at {next_fire_time:.3}");
        }

        Transition::None
    }
}

impl Default for UnitBehavior {
    fn default() -> Self {
        Self::idle()
    }
}

impl Named for UnitBehavior {
    fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Move { .. } => "Move",
            Self::Chase => "Chase",
            Self::Attack { .. } => "Attack",
        }
    }
}

impl<'a> State<UnitContext<'a>> for UnitBehavior {
    fn enter(&mut self, ctx: &mut UnitContext<'a>) {
        match self {
            Self::Idle => ctx.unit.play_idle_cue(),
            Self::Move { destination } => {
                ctx.nav.set_stopped(false);
                ctx.nav.set_destination(*destination);
                ctx.unit.play_move_cue();
            }
            Self::Chase => ctx.nav.set_stopped(false),
            Self::Attack { next_fire_time } => {
                ctx.nav.set_stopped(true);
                *next_fire_time = ctx.clock.now();
            }
        }
    }

    fn execute(&mut self, ctx: &mut UnitContext<'a>) -> Transition<Self> {
        match self {
            // Target acquisition is pushed in by the owning controller.
            Self::Idle => Transition::None,
            Self::Move { .. } => Self::execute_move(ctx),
            Self::Chase => Self::execute_chase(ctx),
            Self::Attack { next_fire_time } => Self::execute_attack(next_fire_time, ctx),
        }
    }

    fn exit(&mut self, ctx: &mut UnitContext<'a>) {
        match self {
            Self::Move { .. } | Self::Chase => ctx.nav.set_stopped(true),
            // Attack already halted navigation on enter.
            Self::Idle | Self::Attack { .. } => {}
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
