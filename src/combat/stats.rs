//! Unit combat statistics

use serde::{Deserialize, Serialize};

/// Per-unit statistics consumed by the behavior states and combat resolution.
///
/// # Example RON
///
/// ```ron
/// UnitStats(
///     max_health: 120.0,
///     damage: 15.0,
///     attack_range: 6.0,
///     attack_rate: 1.5,
///     move_speed: 3.5,
///     stopping_distance: 0.1,
///     sight_range: 20.0,
/// )
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitStats {
    /// Maximum hit points
    pub max_health: f32,
    /// Damage dealt per attack
    pub damage: f32,
    /// Maximum distance at which an attack may fire
    pub attack_range: f32,
    /// Seconds between attacks
    pub attack_rate: f32,
    /// Movement speed in world units per second
    pub move_speed: f32,
    /// Tolerance within which a move order counts as complete
    pub stopping_distance: f32,
    /// Radius in which enemies are noticed when idle
    pub sight_range: f32,
}

impl Default for UnitStats {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            damage: 10.0,
            attack_range: 2.0,
            attack_rate: 1.0,
            move_speed: 3.5,
            stopping_distance: 0.1,
            sight_range: 15.0,
        }
    }
}

impl UnitStats {
    /// Set attack range and rate
    #[must_use]
    pub fn with_attack(mut self, range: f32, rate: f32) -> Self {
        self.attack_range = range;
        self.attack_rate = rate;
        self
    }

    /// Set damage per attack
    #[must_use]
    pub fn with_damage(mut self, damage: f32) -> Self {
        self.damage = damage;
        self
    }

    /// Set maximum hit points
    #[must_use]
    pub fn with_health(mut self, max_health: f32) -> Self {
        self.max_health = max_health;
        self
    }

    /// Set movement speed
    #[must_use]
    pub fn with_speed(mut self, move_speed: f32) -> Self {
        self.move_speed = move_speed;
        self
    }

    /// Set sight range
    #[must_use]
    pub fn with_sight(mut self, sight_range: f32) -> Self {
        self.sight_range = sight_range;
        self
    }

    /// Check the stats can drive a unit.
    ///
    /// # Errors
    ///
    /// Returns an error if range, rate, health or speed are not positive, or
    /// if damage, stopping distance or sight range are negative.
    pub fn validate(&self) -> Result<(), StatsError> {
        let positive = [
            ("attack_range", self.attack_range),
            ("attack_rate", self.attack_rate),
            ("max_health", self.max_health),
            ("move_speed", self.move_speed),
        ];
        for (stat, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(StatsError::NotPositive { stat, value });
            }
        }

        let non_negative = [
            ("damage", self.damage),
            ("stopping_distance", self.stopping_distance),
            ("sight_range", self.sight_range),
        ];
        for (stat, value) in non_negative {
            if !(value >= 0.0) {
                return Err(StatsError::Negative { stat, value });
            }
        }

        Ok(())
    }
}

/// Errors from invalid unit statistics
#[derive(Debug, Clone, PartialEq)]
pub enum StatsError {
    /// A stat that must be strictly positive was not
    NotPositive {
        /// Stat name
        stat: &'static str,
        /// Rejected value
        value: f32,
    },
    /// A stat that must not be negative was
    Negative {
        /// Stat name
        stat: &'static str,
        /// Rejected value
        value: f32,
    },
}

impl std::fmt::Display for StatsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotPositive { stat, value } => write!(f, "{stat} must be positive, got {value}"),
            Self::Negative { stat, value } => write!(f, "{stat} must not be negative, got {value}"),
        }
    }
}

impl std::error::Error for StatsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_stats_are_valid() {
        assert!(UnitStats::default().validate().is_ok());
    }

    #[test]
    fn test_zero_attack_rate_rejected() {
        let stats = UnitStats::default().with_attack(5.0, 0.0);

        assert_eq!(
            stats.validate(),
            Err(StatsError::NotPositive {
                stat: "attack_rate",
                value: 0.0
            })
        );
    }

    #[test]
    fn test_nan_range_rejected() {
        let stats = UnitStats::default().with_attack(f32::NAN, 1.0);

        assert!(matches!(
            stats.validate(),
            Err(StatsError::NotPositive {
                stat: "attack_range",
                ..
            })
        ));
    }

    #[test]
    fn test_negative_damage_rejected() {
        let stats = UnitStats::default().with_damage(-1.0);

        let err = stats.validate().unwrap_err();
        assert_eq!(err.to_string(), "damage must not be negative, got -1");
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let stats: UnitStats = ron::from_str("(attack_range: 8.0)").unwrap();

        assert_eq!(stats.attack_range, 8.0);
        assert_eq!(stats.attack_rate, UnitStats::default().attack_rate);
    }
}
