//! Damage resolution hook
//!
//! Behavior states only decide *when* an attack fires. How much damage it
//! deals is up to a [`CombatResolver`], swapped in by the simulation owner.

use hecs::Entity;

use super::UnitStats;

/// An attack fired during a frame, resolved after every unit has ticked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackIntent {
    /// Unit that fired
    pub attacker: Entity,
    /// Unit that was fired at
    pub target: Entity,
}

/// Computes the damage an attack deals
pub trait CombatResolver {
    /// Damage dealt by `attacker` to `defender`
    fn resolve(
        &mut self,
        intent: &AttackIntent,
        attacker: &UnitStats,
        defender: &UnitStats,
    ) -> f32;
}

/// Deals the attacker's `damage` stat unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatDamage;

impl CombatResolver for FlatDamage {
    fn resolve(
        &mut self,
        _intent: &AttackIntent,
        attacker: &UnitStats,
        _defender: &UnitStats,
    ) -> f32 {
        attacker.damage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_damage_uses_attacker_stat() {
        let mut world = hecs::World::new();
        let intent = AttackIntent {
            attacker: world.spawn(()),
            target: world.spawn(()),
        };
        let attacker = UnitStats::default().with_damage(12.5);
        let defender = UnitStats::default().with_damage(99.0);

        let damage = FlatDamage.resolve(&intent, &attacker, &defender);

        assert_eq!(damage, 12.5);
    }
}
