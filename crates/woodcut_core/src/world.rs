//! World container for entities
//!
//! The World owns every entity and the physics simulation their bodies live in.

use slotmap::{new_key_type, SlotMap};
use woodcut_physics::{BodyKey, PhysicsConfig, PhysicsWorld, RigidBody};
use crate::Entity;

new_key_type! {
    /// Generational key to an entity in the world
    ///
    /// A sliced log is despawned; keys to it resolve to `None` afterwards.
    pub struct EntityKey;
}

/// The woodyard: entities plus their physics
pub struct World {
    entities: SlotMap<EntityKey, Entity>,
    physics: PhysicsWorld,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Create a new empty world with default physics
    pub fn new() -> Self {
        Self::with_physics(PhysicsConfig::default())
    }

    /// Create a world with custom physics configuration
    pub fn with_physics(config: PhysicsConfig) -> Self {
        Self {
            entities: SlotMap::with_key(),
            physics: PhysicsWorld::with_config(config),
        }
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.physics
    }

    /// Add an entity to the world, returning its key
    pub fn add_entity(&mut self, entity: Entity) -> EntityKey {
        self.entities.insert(entity)
    }

    /// Add a body to the physics world and an entity linked to it
    ///
    /// The entity's transform is taken from the body.
    pub fn spawn(&mut self, mut entity: Entity, body: RigidBody) -> EntityKey {
        entity.transform.position = body.position;
        entity.transform.rotation = body.rotation;
        let body_key = self.physics.add_body(body);
        entity.physics_body = Some(body_key);
        self.entities.insert(entity)
    }

    /// Remove an entity and its physics body
    pub fn despawn(&mut self, key: EntityKey) -> Option<Entity> {
        let entity = self.entities.remove(key)?;
        if let Some(body) = entity.physics_body {
            self.physics.remove_body(body);
        }
        Some(entity)
    }

    /// Get a reference to an entity by key
    pub fn get_entity(&self, key: EntityKey) -> Option<&Entity> {
        self.entities.get(key)
    }

    /// Get a mutable reference to an entity by key
    pub fn get_entity_mut(&mut self, key: EntityKey) -> Option<&mut Entity> {
        self.entities.get_mut(key)
    }

    /// Whether the key still refers to a live entity
    pub fn contains(&self, key: EntityKey) -> bool {
        self.entities.contains_key(key)
    }

    /// The entity owning a physics body
    pub fn entity_for_body(&self, body: BodyKey) -> Option<EntityKey> {
        self.entities
            .iter()
            .find(|(_, e)| e.physics_body == Some(body))
            .map(|(k, _)| k)
    }

    /// The physics body of an entity, if both exist
    pub fn body_of(&self, key: EntityKey) -> Option<&RigidBody> {
        let body = self.entities.get(key)?.physics_body?;
        self.physics.get_body(body)
    }

    /// Mutable physics body of an entity
    pub fn body_of_mut(&mut self, key: EntityKey) -> Option<&mut RigidBody> {
        let body = self.entities.get(key)?.physics_body?;
        self.physics.get_body_mut(body)
    }

    /// Find the first entity with a name
    pub fn find_by_name(&self, name: &str) -> Option<EntityKey> {
        self.entities
            .iter()
            .find(|(_, e)| e.name.as_deref() == Some(name))
            .map(|(k, _)| k)
    }

    /// Keys of every entity carrying a tag
    pub fn tagged(&self, tag: &str) -> Vec<EntityKey> {
        self.entities
            .iter()
            .filter(|(_, e)| e.has_tag(tag))
            .map(|(k, _)| k)
            .collect()
    }

    /// Number of entities carrying a tag
    pub fn count_tagged(&self, tag: &str) -> usize {
        self.entities.values().filter(|e| e.has_tag(tag)).count()
    }

    /// Get the number of entities
    #[inline]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Check if the world is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterate over keys and entities
    pub fn iter(&self) -> impl Iterator<Item = (EntityKey, &Entity)> {
        self.entities.iter()
    }

    /// Update the world by stepping physics and syncing entity transforms
    pub fn update(&mut self, dt: f32) {
        if dt > 0.0 {
            self.physics.step(dt);
        }
        self.sync_transforms();
    }

    /// Copy body poses onto their entities
    pub fn sync_transforms(&mut self) {
        for entity in self.entities.values_mut() {
            if let Some(body) = entity.physics_body.and_then(|k| self.physics.get_body(k)) {
                entity.transform.position = body.position;
                entity.transform.rotation = body.rotation;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Transform, WOOD_TAG};
    use woodcut_math::Vec3;

    fn log_body(y: f32) -> RigidBody {
        RigidBody::new_box(Vec3::new(0.0, y, 0.0), Vec3::new(0.15, 0.5, 0.15))
    }

    #[test]
    fn test_spawn_links_body() {
        let mut world = World::new();
        let key = world.spawn(Entity::new(Transform::identity()).with_tag(WOOD_TAG), log_body(3.0));

        let entity = world.get_entity(key).unwrap();
        let body = entity.physics_body.unwrap();
        assert_eq!(entity.transform.position, Vec3::new(0.0, 3.0, 0.0));
        assert_eq!(world.entity_for_body(body), Some(key));
        assert_eq!(world.count_tagged(WOOD_TAG), 1);
    }

    #[test]
    fn test_despawn_removes_body() {
        let mut world = World::new();
        let key = world.spawn(Entity::new(Transform::identity()), log_body(0.0));
        let body = world.get_entity(key).unwrap().physics_body.unwrap();

        assert!(world.despawn(key).is_some());
        assert!(!world.contains(key));
        assert!(world.physics().get_body(body).is_none());
        assert!(world.despawn(key).is_none());
    }

    #[test]
    fn test_update_syncs_transforms() {
        let mut world = World::new();
        let key = world.spawn(Entity::new(Transform::identity()), log_body(5.0));
        world.update(0.1);
        assert!(world.get_entity(key).unwrap().transform.position.y < 5.0);
    }

    #[test]
    fn test_find_by_name() {
        let mut world = World::new();
        let key = world.add_entity(Entity::new(Transform::identity()).with_name("axe"));
        assert_eq!(world.find_by_name("axe"), Some(key));
        assert!(world.find_by_name("saw").is_none());
    }
}
