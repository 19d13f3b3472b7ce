//! Hit points component

/// Current and maximum hit points of a unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Health {
    /// Remaining hit points
    pub current: f32,
    /// Hit points at full health
    pub max: f32,
}

impl Health {
    /// Full health
    #[must_use]
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    /// Subtract `amount` (negative amounts are ignored).
    ///
    /// Returns `true` if this hit killed the unit.
    pub fn apply_damage(&mut self, amount: f32) -> bool {
        if self.is_dead() {
            return false;
        }
        self.current = (self.current - amount.max(0.0)).max(0.0);
        self.is_dead()
    }

    /// Whether hit points are exhausted
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_and_death() {
        let mut health = Health::new(30.0);

        assert!(!health.apply_damage(10.0));
        assert_eq!(health.current, 20.0);
        assert!(health.apply_damage(25.0));
        assert_eq!(health.current, 0.0);
        assert!(health.is_dead());
    }

    #[test]
    fn test_dead_unit_is_not_killed_twice() {
        let mut health = Health::new(5.0);
        assert!(health.apply_damage(5.0));

        assert!(!health.apply_damage(5.0));
    }

    #[test]
    fn test_negative_damage_ignored() {
        let mut health = Health::new(10.0);
        health.apply_damage(-4.0);

        assert_eq!(health.current, health.max);
    }
}
