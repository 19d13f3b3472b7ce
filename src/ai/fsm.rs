//! Finite State Machine engine for unit behavior
//!
//! Holds exactly one active state and drives its enter/execute/exit lifecycle.
//! States are stored inline (usually a small enum), so a transition never
//! allocates.
//!
//! # Design Principles
//!
//! - **Ordered transitions**: the old state fully exits before the new one enters
//! - **Context injection**: states receive their collaborators through `Ctx`
//!   on every call instead of reaching for global state
//! - **Debuggability**: states have names for logging and notifications
//!
//! # Example
//!
//! ```ignore
//! let mut fsm = StateMachine::spawn(&mut ctx, UnitBehavior::idle());
//!
//! // An order arrives from a controller
//! fsm.change_state(&mut ctx, UnitBehavior::chase());
//!
//! // Each simulation step
//! if let Some(change) = fsm.tick(&mut ctx) {
//!     log::debug!("{} -> {}", change.from, change.to);
//! }
//! ```

use std::fmt;

// ============================================================================
// State Trait
// ============================================================================

/// Debug name of a state, independent of the context it runs in.
pub trait Named {
    /// State name for debugging and notifications.
    fn name(&self) -> &'static str;
}

/// A state in the finite state machine.
///
/// The lifecycle is:
///
/// 1. `enter()` - Called once when this state becomes active
/// 2. `execute()` - Called each tick while active
/// 3. `exit()` - Called once when another state replaces this one
pub trait State<Ctx>: Named + fmt::Debug + Sized {
    /// Called when entering this state.
    fn enter(&mut self, _ctx: &mut Ctx) {}

    /// Called each tick while in this state.
    ///
    /// Returns a `Transition` to stay or to request a replacement state.
    fn execute(&mut self, ctx: &mut Ctx) -> Transition<Self>;

    /// Called when leaving this state.
    fn exit(&mut self, _ctx: &mut Ctx) {}
}

// ============================================================================
// Transition
// ============================================================================

/// A state transition decision returned from `State::execute()`.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition<S> {
    /// Stay in the current state.
    None,
    /// Replace the current state with a fresh one.
    To(S),
}

/// Record of a transition performed during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    /// Name of the state that was exited
    pub from: &'static str,
    /// Name of the state that was entered
    pub to: &'static str,
}

// ============================================================================
// State Machine
// ============================================================================

/// A finite state machine owning at most one active state.
///
/// No history is kept; only the current state is observable.
pub struct StateMachine<S> {
    /// Current active state (None until the first transition)
    current: Option<S>,
    /// Number of transitions performed
    transitions: u64,
}

impl<S> StateMachine<S> {
    /// Create an empty state machine with no active state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: None,
            transitions: 0,
        }
    }

    /// Create a state machine and immediately enter `initial`.
    pub fn spawn<Ctx>(ctx: &mut Ctx, initial: S) -> Self
    where
        S: State<Ctx>,
    {
        let mut fsm = Self::new();
        fsm.change_state(ctx, initial);
        fsm
    }

    /// Transition to `next`.
    ///
    /// Exits the active state (if any), swaps in `next`, then enters it.
    /// Changing to the same kind of state is not a no-op: both hooks still run.
    pub fn change_state<Ctx>(&mut self, ctx: &mut Ctx, next: S)
    where
        S: State<Ctx>,
    {
        if let Some(old) = self.current.as_mut() {
            old.exit(ctx);
        }

        let state = self.current.insert(next);
        state.enter(ctx);
        self.transitions += 1;
    }

    /// Run one simulation step.
    ///
    /// Executes the active state and performs any transition it requests
    /// before returning. A machine with no active state does nothing.
    pub fn tick<Ctx>(&mut self, ctx: &mut Ctx) -> Option<StateChange>
    where
        S: State<Ctx>,
    {
        let state = self.current.as_mut()?;
        let from = state.name();

        match state.execute(ctx) {
            Transition::None => None,
            Transition::To(next) => {
                let to = next.name();
                self.change_state(ctx, next);
                Some(StateChange { from, to })
            }
        }
    }

    /// Get the active state, if any
    #[must_use]
    pub fn current(&self) -> Option<&S> {
        self.current.as_ref()
    }

    /// Number of transitions performed since creation
    #[must_use]
    pub fn transition_count(&self) -> u64 {
        self.transitions
    }
}

impl<S: Named> StateMachine<S> {
    /// Get the name of the current state ("None" before the first transition).
    #[must_use]
    pub fn current_state_name(&self) -> &'static str {
        self.current.as_ref().map_or("None", Named::name)
    }

    /// Check if the FSM is in a state with the given name.
    #[must_use]
    pub fn is_in_state(&self, name: &str) -> bool {
        self.current.as_ref().is_some_and(|s| s.name() == name)
    }
}

impl<S> Default for StateMachine<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: fmt::Debug> fmt::Debug for StateMachine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("current", &self.current)
            .field("transitions", &self.transitions)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Lifecycle log shared by the test states
    #[derive(Debug, Default)]
    struct Log {
        calls: Vec<String>,
        advance: bool,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Light {
        Red,
        Green,
    }

    impl Named for Light {
        fn name(&self) -> &'static str {
            match self {
                Light::Red => "Red",
                Light::Green => "Green",
            }
        }
    }

    impl State<Log> for Light {
        fn enter(&mut self, ctx: &mut Log) {
            ctx.calls.push(format!("enter {}", self.name()));
        }

        fn execute(&mut self, ctx: &mut Log) -> Transition<Self> {
            ctx.calls.push(format!("execute {}", self.name()));
            match self {
                Light::Red if ctx.advance => Transition::To(Light::Green),
                _ => Transition::None,
            }
        }

        fn exit(&mut self, ctx: &mut Log) {
            ctx.calls.push(format!("exit {}", self.name()));
        }
    }

    #[test]
    fn test_tick_without_state_is_noop() {
        let mut fsm: StateMachine<Light> = StateMachine::new();
        let mut log = Log::default();

        assert!(fsm.tick(&mut log).is_none());
        assert!(log.calls.is_empty());
        assert_eq!(fsm.current_state_name(), "None");
    }

    #[test]
    fn test_spawn_enters_initial_state() {
        let mut log = Log::default();
        let fsm = StateMachine::spawn(&mut log, Light::Red);

        assert_eq!(log.calls, vec!["enter Red"]);
        assert!(fsm.is_in_state("Red"));
        assert_eq!(fsm.transition_count(), 1);
    }

    #[test]
    fn test_exit_runs_before_enter() {
        let mut log = Log::default();
        let mut fsm = StateMachine::spawn(&mut log, Light::Red);

        fsm.change_state(&mut log, Light::Green);

        assert_eq!(log.calls, vec!["enter Red", "exit Red", "enter Green"]);
        assert_eq!(fsm.current(), Some(&Light::Green));
    }

    #[test]
    fn test_same_state_change_is_not_idempotent() {
        let mut log = Log::default();
        let mut fsm = StateMachine::spawn(&mut log, Light::Red);
        log.calls.clear();

        fsm.change_state(&mut log, Light::Red);

        assert_eq!(log.calls, vec!["exit Red", "enter Red"]);
        assert_eq!(fsm.transition_count(), 2);
    }

    #[test]
    fn test_tick_performs_requested_transition() {
        let mut log = Log::default();
        let mut fsm = StateMachine::spawn(&mut log, Light::Red);
        log.calls.clear();

        assert!(fsm.tick(&mut log).is_none());

        log.advance = true;
        let change = fsm.tick(&mut log);

        assert_eq!(
            change,
            Some(StateChange {
                from: "Red",
                to: "Green"
            })
        );
        assert_eq!(
            log.calls,
            vec![
                "execute Red",
                "execute Red",
                "exit Red",
                "enter Green"
            ]
        );
        assert!(fsm.is_in_state("Green"));
    }
}
