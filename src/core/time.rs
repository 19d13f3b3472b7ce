//! Simulation time
//!
//! Monotonic, fixed-step clock. Never reads the wall clock, so a simulation
//! replays identically regardless of how fast frames are produced.
//!
//! Elapsed time is accumulated in `f64` so steps such as `1/30` do not drift.

/// Source of the current simulation time in seconds.
pub trait Clock {
    /// Current simulation time
    fn now(&self) -> f64;
}

/// Fixed-step simulation clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimClock {
    /// Seconds elapsed since the simulation started
    elapsed: f64,
    /// Seconds advanced per step
    fixed_dt: f32,
    /// Number of steps taken
    frame: u64,
}

impl SimClock {
    /// Create a clock at time zero advancing `fixed_dt` seconds per step
    #[must_use]
    pub fn new(fixed_dt: f32) -> Self {
        Self {
            elapsed: 0.0,
            fixed_dt,
            frame: 0,
        }
    }

    /// Advance by one fixed step
    pub fn step(&mut self) {
        self.advance(self.fixed_dt);
    }

    /// Advance by an arbitrary non-negative amount
    pub fn advance(&mut self, dt: f32) {
        self.elapsed += f64::from(dt.max(0.0));
        self.frame += 1;
    }

    /// Seconds per fixed step
    #[must_use]
    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    /// Number of steps taken so far
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(1.0 / 60.0)
    }
}

impl Clock for SimClock {
    fn now(&self) -> f64 {
        self.elapsed
    }
}
