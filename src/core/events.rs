//! Unit event queue
//!
//! Double-buffered queue carrying what happened to units during a simulation
//! step: behavior changes, orders, presentation cues, attacks and deaths.
//! Consumers (logging, audio, UI) read the previous step's events without
//! being coupled to the behavior code that produced them.
//!
//! # Example
//!
//! ```ignore
//! sim.step();
//! for event in sim.events().iter() {
//!     if let UnitEvent::StateChanged { entity, to, .. } = event {
//!         log::info!("{entity:?} is now {to}");
//!     }
//! }
//! ```

use std::collections::VecDeque;

use glam::Vec3;
use hecs::Entity;

// ============================================================================
// Event Types
// ============================================================================

/// Presentation cue requested by a behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Unit went idle
    Idle,
    /// Unit acknowledged a move order
    Move,
}

/// Something that happened to a unit.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum UnitEvent {
    // -------------------------------------------------------------------------
    // Behavior Events
    // -------------------------------------------------------------------------
    /// A unit's behavior state changed.
    StateChanged {
        /// The unit
        entity: Entity,
        /// State exited ("None" for a freshly spawned unit)
        from: &'static str,
        /// State entered
        to: &'static str,
    },

    /// A unit was ordered to move.
    MoveOrdered {
        /// The unit
        entity: Entity,
        /// Requested destination
        destination: Vec3,
    },

    /// A behavior asked for an audio/visual cue.
    CuePlayed {
        /// The unit
        entity: Entity,
        /// Which cue
        cue: Cue,
    },

    // -------------------------------------------------------------------------
    // Combat Events
    // -------------------------------------------------------------------------
    /// An attack fired.
    AttackPerformed {
        /// Unit that fired
        attacker: Entity,
        /// Unit fired at
        target: Entity,
    },

    /// A unit took damage.
    UnitDamaged {
        /// The damaged unit
        entity: Entity,
        /// Amount of damage dealt
        amount: f32,
        /// Unit that dealt the damage
        source: Entity,
    },

    /// A unit was destroyed.
    UnitDestroyed {
        /// The destroyed unit
        entity: Entity,
        /// Unit that landed the final hit
        destroyer: Entity,
    },
}

// ============================================================================
// Event Queue
// ============================================================================

/// Double-buffered event queue.
///
/// Events pushed during a step become readable after the next `swap()`, and
/// stay readable until the swap after that.
#[derive(Debug)]
pub struct EventQueue<E = UnitEvent> {
    /// Events being written this step
    pending: VecDeque<E>,
    /// Events from the last completed step
    processing: VecDeque<E>,
}

impl<E> EventQueue<E> {
    /// Default initial capacity for event queues.
    const DEFAULT_CAPACITY: usize = 64;

    /// Create a new event queue with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: VecDeque::with_capacity(Self::DEFAULT_CAPACITY),
            processing: VecDeque::with_capacity(Self::DEFAULT_CAPACITY),
        }
    }

    /// Push an event; it becomes visible after the next `swap()`.
    #[inline]
    pub fn push(&mut self, event: E) {
        self.pending.push_back(event);
    }

    /// Publish pending events and discard the previously published ones.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.pending, &mut self.processing);
        self.pending.clear();
    }

    /// Iterate over published events.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.processing.iter()
    }

    /// Take ownership of the published events.
    #[inline]
    pub fn drain(&mut self) -> impl Iterator<Item = E> + '_ {
        self.processing.drain(..)
    }
}

impl<E> Default for EventQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_entity() -> Entity {
        let mut world = hecs::World::new();
        world.spawn(())
    }

    #[test]
    fn test_events_visible_after_swap() {
        let entity = test_entity();
        let mut queue = EventQueue::new();

        queue.push(UnitEvent::CuePlayed {
            entity,
            cue: Cue::Move,
        });
        assert_eq!(queue.iter().count(), 0, "Events should not be visible before swap");

        queue.swap();
        assert_eq!(queue.iter().count(), 1);
        assert!(matches!(
            queue.iter().next(),
            Some(UnitEvent::CuePlayed { cue: Cue::Move, .. })
        ));
    }

    #[test]
    fn test_double_buffer_isolation() {
        let entity = test_entity();
        let mut queue = EventQueue::new();

        queue.push(UnitEvent::StateChanged {
            entity,
            from: "Idle",
            to: "Chase",
        });
        queue.swap();

        queue.push(UnitEvent::StateChanged {
            entity,
            from: "Chase",
            to: "Attack",
        });

        let events: Vec<_> = queue.iter().collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], UnitEvent::StateChanged { to: "Chase", .. }));

        queue.swap();
        let events: Vec<_> = queue.iter().collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], UnitEvent::StateChanged { to: "Attack", .. }));
    }

    #[test]
    fn test_drain_consumes_events() {
        let mut queue: EventQueue<u32> = EventQueue::new();
        queue.push(1);
        queue.push(2);
        queue.swap();

        let drained: Vec<_> = queue.drain().collect();

        assert_eq!(drained, vec![1, 2]);
        assert_eq!(queue.iter().count(), 0);
    }

    #[test]
    fn test_swap_discards_unread_events() {
        let mut queue: EventQueue<u32> = EventQueue::new();
        queue.push(1);
        queue.swap();
        queue.swap();

        assert_eq!(queue.iter().count(), 0);
    }
}
