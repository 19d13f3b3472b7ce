//! Unit registry wrapper around hecs

use glam::Vec3;
use hecs::Entity;

use super::Transform;
use crate::combat::Health;

/// Registry of every unit on the battlefield.
///
/// Entities double as the weak handles units use to reference each other.
pub struct World {
    /// The underlying hecs world
    pub inner: hecs::World,
}

impl World {
    /// Create a new empty world
    pub fn new() -> Self {
        Self {
            inner: hecs::World::new(),
        }
    }

    /// Spawn an entity with the given components
    pub fn spawn(&mut self, components: impl hecs::DynamicBundle) -> Entity {
        self.inner.spawn(components)
    }

    /// Despawn an entity
    pub fn despawn(&mut self, entity: Entity) -> Result<(), hecs::NoSuchEntity> {
        self.inner.despawn(entity)
    }

    /// Get a reference to a component
    pub fn get<T: hecs::Component>(
        &self,
        entity: Entity,
    ) -> Result<hecs::Ref<'_, T>, hecs::ComponentError> {
        self.inner.get::<&T>(entity)
    }

    /// Get a mutable reference to a component
    pub fn get_mut<T: hecs::Component>(
        &mut self,
        entity: Entity,
    ) -> Result<hecs::RefMut<'_, T>, hecs::ComponentError> {
        self.inner.get::<&mut T>(entity)
    }

    /// Check if an entity exists
    pub fn contains(&self, entity: Entity) -> bool {
        self.inner.contains(entity)
    }

    /// Position of a unit that exists and is not dead.
    ///
    /// This is how a weak target handle is dereferenced: missing and dead
    /// units both yield `None`.
    pub fn living_position(&self, entity: Entity) -> Option<Vec3> {
        let alive = self
            .get::<Health>(entity)
            .is_ok_and(|health| !health.is_dead());
        if !alive {
            return None;
        }
        self.get::<Transform>(entity).ok().map(|t| t.position)
    }

    /// Query for entities with specific components
    pub fn query<Q: hecs::Query>(&self) -> hecs::QueryBorrow<'_, Q> {
        self.inner.query::<Q>()
    }

    /// Query for entities with specific components (mutable)
    pub fn query_mut<Q: hecs::Query>(&mut self) -> hecs::QueryMut<'_, Q> {
        self.inner.query_mut::<Q>()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_living_position() {
        let mut world = World::new();
        let alive = world.spawn((Transform::from_position(Vec3::X), Health::new(10.0)));
        let dead = world.spawn((Transform::from_position(Vec3::Y), Health::new(10.0)));
        world.get_mut::<Health>(dead).unwrap().apply_damage(10.0);

        assert_eq!(world.living_position(alive), Some(Vec3::X));
        assert_eq!(world.living_position(dead), None);
    }

    #[test]
    fn test_despawned_handle_resolves_to_none() {
        let mut world = World::new();
        let unit = world.spawn((Transform::default(), Health::new(10.0)));
        world.despawn(unit).unwrap();

        assert!(!world.contains(unit));
        assert_eq!(world.living_position(unit), None);
    }
}
