//! Headless skirmish simulation
//!
//! Owns the unit registry and acts as the controller for every unit's
//! behavior state machine: it issues orders, pushes target acquisition into
//! idle units, and runs the per-step passes.
//!
//! Each [`Simulation::step`] runs, in order:
//!
//! 1. **Clock** - advance by one fixed step
//! 2. **Acquisition** - idle units with a target (or, with auto-acquire, an
//!    enemy in sight) are pushed into Chase
//! 3. **Behavior** - tick every unit's state machine
//! 4. **Movement** - advance every navigation agent
//! 5. **Combat** - resolve the attacks fired this step, remove the dead
//!
//! Units only read each other's positions during the behavior pass; all
//! damage is applied afterwards, so tick order never changes the outcome.

use std::sync::Arc;

use glam::Vec3;
use hecs::Entity;

use super::config::{SkirmishConfig, UnitSpawn};
use super::events::{Cue, EventQueue, UnitEvent};
use super::time::{Clock, SimClock};
use crate::ai::{
    Combatant, Grid, NavAgent, Named, StateChange, StateMachine, UnitBehavior, UnitContext,
};
use crate::combat::{AttackIntent, CombatResolver, FlatDamage, Health, StatsError, UnitStats};
use crate::ecs::{Brain, Name, Target, Team, Transform, World};

// ============================================================================
// Configuration
// ============================================================================

/// Simulation configuration
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Seconds per step
    pub fixed_dt: f32,
    /// Whether idle units engage enemies in sight on their own
    pub auto_acquire: bool,
    /// Walkability grid shared by every navigation agent
    pub grid: Option<Grid>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 30.0,
            auto_acquire: true,
            grid: None,
        }
    }
}

impl SimulationConfig {
    /// Set the fixed time step
    #[must_use]
    pub fn with_fixed_dt(mut self, fixed_dt: f32) -> Self {
        self.fixed_dt = fixed_dt;
        self
    }

    /// Enable or disable automatic target acquisition
    #[must_use]
    pub fn with_auto_acquire(mut self, auto_acquire: bool) -> Self {
        self.auto_acquire = auto_acquire;
        self
    }

    /// Plan movement over a grid
    #[must_use]
    pub fn with_grid(mut self, grid: Grid) -> Self {
        self.grid = Some(grid);
        self
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors returned by simulation commands
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// The entity is not a living unit
    NoSuchUnit(Entity),
    /// A unit cannot target the given entity
    InvalidTarget {
        /// Unit given the order
        unit: Entity,
        /// Rejected target
        target: Entity,
    },
    /// A spawn index in an attack order does not exist
    UnknownSpawn(usize),
    /// Unit stats failed validation
    InvalidStats(StatsError),
}

impl std::fmt::Display for SimulationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSuchUnit(entity) => write!(f, "no such unit: {entity:?}"),
            Self::InvalidTarget { unit, target } => {
                write!(f, "unit {unit:?} cannot target {target:?}")
            }
            Self::UnknownSpawn(index) => write!(f, "no spawn at index {index}"),
            Self::InvalidStats(e) => write!(f, "invalid unit stats: {e}"),
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidStats(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StatsError> for SimulationError {
    fn from(e: StatsError) -> Self {
        Self::InvalidStats(e)
    }
}

// ============================================================================
// Unit view
// ============================================================================

/// One unit's components, exposed to its behavior state.
struct UnitView<'a> {
    entity: Entity,
    transform: &'a mut Transform,
    stats: &'a UnitStats,
    /// Resolved target handle and its position this step
    target: Option<(Entity, Vec3)>,
    attacks: &'a mut Vec<AttackIntent>,
    events: &'a mut EventQueue,
}

impl Combatant for UnitView<'_> {
    fn position(&self) -> Vec3 {
        self.transform.position
    }

    fn current_target(&self) -> Option<Vec3> {
        self.target.map(|(_, position)| position)
    }

    fn attack_range(&self) -> f32 {
        self.stats.attack_range
    }

    fn attack_rate(&self) -> f32 {
        self.stats.attack_rate
    }

    fn perform_attack(&mut self) {
        if let Some((target, _)) = self.target {
            self.attacks.push(AttackIntent {
                attacker: self.entity,
                target,
            });
            self.events.push(UnitEvent::AttackPerformed {
                attacker: self.entity,
                target,
            });
        }
    }

    fn face(&mut self, point: Vec3) {
        self.transform.face(point);
    }

    fn play_move_cue(&mut self) {
        self.events.push(UnitEvent::CuePlayed {
            entity: self.entity,
            cue: Cue::Move,
        });
    }

    fn play_idle_cue(&mut self) {
        self.events.push(UnitEvent::CuePlayed {
            entity: self.entity,
            cue: Cue::Idle,
        });
    }
}

// ============================================================================
// Simulation
// ============================================================================

/// A running skirmish
pub struct Simulation<R: CombatResolver = FlatDamage> {
    world: World,
    clock: SimClock,
    events: EventQueue,
    resolver: R,
    grid: Option<Arc<Grid>>,
    auto_acquire: bool,
    /// Attacks fired during the current behavior pass
    attacks: Vec<AttackIntent>,
}

impl Simulation<FlatDamage> {
    /// Create an empty simulation using flat damage
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        Self::with_resolver(config, FlatDamage)
    }

    /// Build a simulation from a skirmish description, spawning its units and
    /// issuing their initial attack orders.
    ///
    /// # Errors
    ///
    /// Returns an error if a unit has invalid stats or an attack order names
    /// a missing spawn or the unit itself
    pub fn from_config(config: &SkirmishConfig) -> Result<Self, SimulationError> {
        let mut sim_config = SimulationConfig::default()
            .with_fixed_dt(config.fixed_dt)
            .with_auto_acquire(config.auto_acquire);
        if let Some(grid) = &config.grid {
            sim_config = sim_config.with_grid(grid.build());
        }

        let mut sim = Self::new(sim_config);
        let entities = config
            .units
            .iter()
            .map(|spawn| sim.spawn_unit(spawn))
            .collect::<Result<Vec<_>, _>>()?;

        for (index, spawn) in config.units.iter().enumerate() {
            if let Some(target_index) = spawn.attack {
                let target = *entities
                    .get(target_index)
                    .ok_or(SimulationError::UnknownSpawn(target_index))?;
                sim.order_attack(entities[index], target)?;
            }
        }

        log::info!(
            "Skirmish '{}' ready with {} units",
            config.name,
            entities.len()
        );
        Ok(sim)
    }
}

impl<R: CombatResolver> Simulation<R> {
    /// Create an empty simulation with a custom damage resolver
    pub fn with_resolver(config: SimulationConfig, resolver: R) -> Self {
        Self {
            world: World::new(),
            clock: SimClock::new(config.fixed_dt),
            events: EventQueue::new(),
            resolver,
            grid: config.grid.map(Arc::new),
            auto_acquire: config.auto_acquire,
            attacks: Vec::new(),
        }
    }

    // ------------------------------------------------------------------------
    // Spawning and orders
    // ------------------------------------------------------------------------

    /// Spawn a unit; it starts Idle.
    ///
    /// # Errors
    ///
    /// Returns an error if the unit's stats are invalid
    pub fn spawn_unit(&mut self, spawn: &UnitSpawn) -> Result<Entity, SimulationError> {
        spawn.stats.validate()?;

        let mut nav = NavAgent::new(
            spawn.position,
            spawn.stats.move_speed,
            spawn.stats.stopping_distance,
        );
        if let Some(grid) = &self.grid {
            nav = nav.with_grid(Arc::clone(grid));
        }

        let entity = self.world.spawn((
            Name::new(spawn.name.clone()),
            Team(spawn.team),
            Transform::from_position(spawn.position),
            spawn.stats,
            Health::new(spawn.stats.max_health),
            Target(None),
            nav,
            Brain(StateMachine::new()),
        ));

        self.transition(entity, UnitBehavior::idle())?;
        log::info!("Spawned {} (team {}) as {entity:?}", spawn.name, spawn.team);
        Ok(entity)
    }

    /// Order a unit to walk to `destination`, dropping its target.
    ///
    /// # Errors
    ///
    /// Returns an error if the unit does not exist
    pub fn order_move(&mut self, unit: Entity, destination: Vec3) -> Result<(), SimulationError> {
        self.set_target(unit, None)?;
        self.transition(unit, UnitBehavior::move_to(destination))?;
        self.events.push(UnitEvent::MoveOrdered {
            entity: unit,
            destination,
        });
        log::debug!("{unit:?} ordered to move to {destination}");
        Ok(())
    }

    /// Order a unit to engage `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if either unit does not exist or the unit targets itself
    pub fn order_attack(&mut self, unit: Entity, target: Entity) -> Result<(), SimulationError> {
        if unit == target || self.world.living_position(target).is_none() {
            log::warn!("Rejected attack order: {unit:?} -> {target:?}");
            return Err(SimulationError::InvalidTarget { unit, target });
        }

        self.set_target(unit, Some(target))?;
        self.transition(unit, UnitBehavior::chase())?;
        log::debug!("{unit:?} ordered to attack {target:?}");
        Ok(())
    }

    /// Stop a unit: drop its target and go Idle.
    ///
    /// # Errors
    ///
    /// Returns an error if the unit does not exist
    pub fn stop(&mut self, unit: Entity) -> Result<(), SimulationError> {
        self.set_target(unit, None)?;
        self.transition(unit, UnitBehavior::idle())
    }

    fn set_target(&mut self, unit: Entity, target: Option<Entity>) -> Result<(), SimulationError> {
        let mut handle = self
            .world
            .get_mut::<Target>(unit)
            .map_err(|_| SimulationError::NoSuchUnit(unit))?;
        handle.0 = target;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Stepping
    // ------------------------------------------------------------------------

    /// Run one simulation step.
    ///
    /// Afterwards `events()` holds everything that happened during this step
    /// and any orders issued since the previous one.
    pub fn step(&mut self) {
        self.clock.step();

        self.acquire_targets();

        let units: Vec<Entity> = self.world.query::<&Brain>().iter().map(|(e, _)| e).collect();
        for entity in units {
            if let Ok(Some(change)) = self.drive(entity, |fsm, ctx| fsm.tick(ctx)) {
                self.notify(entity, change);
            }
        }

        self.move_units();
        self.resolve_attacks();

        self.events.swap();
    }

    /// Step until one team remains or `max_frames` steps have run.
    ///
    /// Returns the number of steps taken.
    pub fn run(&mut self, max_frames: u64) -> u64 {
        for frame in 0..max_frames {
            if self.winner().is_some() {
                return frame;
            }
            self.step();
        }
        max_frames
    }

    /// Push idle units into Chase.
    ///
    /// A still-valid target is always re-engaged. With auto-acquire on, a
    /// targetless idle unit picks the nearest living enemy within its sight.
    fn acquire_targets(&mut self) {
        let mut engagements = Vec::new();
        let mut stale = Vec::new();

        for (entity, (brain, transform, team, stats, target)) in self
            .world
            .query::<(&Brain, &Transform, &Team, &UnitStats, &Target)>()
            .iter()
        {
            if !brain.0.is_in_state("Idle") {
                continue;
            }

            let existing = target.0.filter(|&t| self.world.living_position(t).is_some());
            let chosen = existing.or_else(|| {
                self.auto_acquire
                    .then(|| self.nearest_enemy(transform.position, *team, stats.sight_range))
                    .flatten()
            });

            match chosen {
                Some(chosen) => engagements.push((entity, chosen)),
                None if target.0.is_some() => stale.push(entity),
                None => {}
            }
        }

        for entity in stale {
            let _ = self.set_target(entity, None);
        }

        for (entity, target) in engagements {
            if self.set_target(entity, Some(target)).is_ok() {
                log::debug!("{entity:?} acquired {target:?}");
                let _ = self.transition(entity, UnitBehavior::chase());
            }
        }
    }

    fn nearest_enemy(&self, from: Vec3, team: Team, sight_range: f32) -> Option<Entity> {
        self.world
            .query::<(&Transform, &Team, &Health)>()
            .iter()
            .filter(|(_, (_, other, health))| **other != team && !health.is_dead())
            .map(|(entity, (transform, _, _))| (entity, from.distance(transform.position)))
            .filter(|&(_, distance)| distance <= sight_range)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(entity, _)| entity)
    }

    fn move_units(&mut self) {
        let dt = self.clock.fixed_dt();
        for (_, (transform, nav)) in self.world.query_mut::<(&mut Transform, &mut NavAgent)>() {
            nav.update(&mut transform.position, dt);

            let velocity = nav.velocity();
            if velocity != Vec3::ZERO {
                let ahead = transform.position + velocity;
                transform.face(ahead);
            }
        }
    }

    fn resolve_attacks(&mut self) {
        let mut destroyed = Vec::new();

        for intent in std::mem::take(&mut self.attacks) {
            let Some((attacker_stats, defender_stats)) = self.combat_stats(&intent) else {
                continue;
            };
            let damage = self
                .resolver
                .resolve(&intent, &attacker_stats, &defender_stats);

            let killed = match self.world.get_mut::<Health>(intent.target) {
                Ok(mut health) if !health.is_dead() => health.apply_damage(damage),
                _ => continue,
            };

            self.events.push(UnitEvent::UnitDamaged {
                entity: intent.target,
                amount: damage,
                source: intent.attacker,
            });

            if killed {
                self.events.push(UnitEvent::UnitDestroyed {
                    entity: intent.target,
                    destroyer: intent.attacker,
                });
                destroyed.push(intent.target);
            }
        }

        for entity in destroyed {
            let name = self
                .world
                .get::<Name>(entity)
                .map(|n| n.0.clone())
                .unwrap_or_default();
            if self.world.despawn(entity).is_ok() {
                log::info!("{name} ({entity:?}) destroyed");
            }
        }
    }

    fn combat_stats(&self, intent: &AttackIntent) -> Option<(UnitStats, UnitStats)> {
        let attacker = *self.world.get::<UnitStats>(intent.attacker).ok()?;
        let defender = *self.world.get::<UnitStats>(intent.target).ok()?;
        Some((attacker, defender))
    }

    // ------------------------------------------------------------------------
    // State machine plumbing
    // ------------------------------------------------------------------------

    /// Change a unit's behavior, emitting a state-change notification.
    fn transition(&mut self, entity: Entity, next: UnitBehavior) -> Result<(), SimulationError> {
        let change = self.drive(entity, |fsm, ctx| {
            let from = fsm.current_state_name();
            let to = next.name();
            fsm.change_state(ctx, next);
            StateChange { from, to }
        })?;
        self.notify(entity, change);
        Ok(())
    }

    /// Run `f` against a unit's state machine with its context assembled.
    fn drive<T, F>(&mut self, entity: Entity, f: F) -> Result<T, SimulationError>
    where
        F: FnOnce(&mut StateMachine<UnitBehavior>, &mut UnitContext<'_>) -> T,
    {
        let target = self
            .world
            .get::<Target>(entity)
            .ok()
            .and_then(|t| t.0)
            .and_then(|t| self.world.living_position(t).map(|position| (t, position)));

        let (transform, stats, nav, brain) = self
            .world
            .inner
            .query_one_mut::<(&mut Transform, &UnitStats, &mut NavAgent, &mut Brain)>(entity)
            .map_err(|_| SimulationError::NoSuchUnit(entity))?;

        let mut unit = UnitView {
            entity,
            transform,
            stats,
            target,
            attacks: &mut self.attacks,
            events: &mut self.events,
        };
        let mut ctx = UnitContext::new(&mut unit, nav, &self.clock);
        Ok(f(&mut brain.0, &mut ctx))
    }

    fn notify(&mut self, entity: Entity, change: StateChange) {
        log::debug!("{entity:?}: {} -> {}", change.from, change.to);
        self.events.push(UnitEvent::StateChanged {
            entity,
            from: change.from,
            to: change.to,
        });
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Events published by the last step
    #[must_use]
    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    /// Take the events published by the last step
    pub fn drain_events(&mut self) -> impl Iterator<Item = UnitEvent> + '_ {
        self.events.drain()
    }

    /// Current simulation time in seconds
    #[must_use]
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Number of steps run
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.clock.frame()
    }

    /// The unit registry
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Number of units still alive
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.world.query::<&Brain>().iter().count()
    }

    /// Name of a unit's active behavior
    #[must_use]
    pub fn behavior(&self, unit: Entity) -> Option<&'static str> {
        self.world
            .get::<Brain>(unit)
            .ok()
            .map(|brain| brain.0.current_state_name())
    }

    /// A unit's position
    #[must_use]
    pub fn position(&self, unit: Entity) -> Option<Vec3> {
        self.world.get::<Transform>(unit).ok().map(|t| t.position)
    }

    /// A unit's remaining hit points
    #[must_use]
    pub fn health(&self, unit: Entity) -> Option<f32> {
        self.world.get::<Health>(unit).ok().map(|h| h.current)
    }

    /// A unit's target handle (which may be dangling)
    #[must_use]
    pub fn target(&self, unit: Entity) -> Option<Entity> {
        self.world.get::<Target>(unit).ok().and_then(|t| t.0)
    }

    /// The only team with living units, if exactly one remains
    #[must_use]
    pub fn winner(&self) -> Option<Team> {
        let mut teams = self.world.query::<&Team>();
        let mut iter = teams.iter().map(|(_, team)| *team);
        let first = iter.next()?;
        iter.all(|team| team == first).then_some(first)
    }
}

// ============================================================================
// Tests
// ============================================================================
