//! Scene serialization
//!
//! Scenes are RON files listing the logs, the axe and the props of a woodyard,
//! plus physics settings, the player spawn and the wood collection zone.

use serde::{Serialize, Deserialize};
use std::path::Path;
use std::fs;
use std::io;

use woodcut_math::{Aabb, Vec3};
use woodcut_physics::{PhysicsConfig, PhysicsMaterial, StaticCollider};

use crate::entity::EntityTemplate;
use crate::World;

/// A serializable scene containing entity templates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    /// Scene name (for display/debugging)
    pub name: String,
    /// Entity templates in this scene
    pub entities: Vec<EntityTemplate>,
    /// Gravity for physics (negative = downward)
    #[serde(default)]
    pub gravity: Option<f32>,
    /// Height of the ground plane
    #[serde(default)]
    pub floor_y: Option<f32>,
    /// Player spawn position
    #[serde(default)]
    pub player_spawn: Option<Vec3>,
    /// Area where collected wood is counted
    #[serde(default)]
    pub wood_zone: Option<Aabb>,
}

impl Scene {
    /// Create a new empty scene
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entities: Vec::new(),
            gravity: None,
            floor_y: None,
            player_spawn: None,
            wood_zone: None,
        }
    }

    /// Load a scene from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SceneLoadError> {
        let contents = fs::read_to_string(path)?;
        Self::from_ron(&contents)
    }

    /// Parse a scene from RON text
    pub fn from_ron(contents: &str) -> Result<Self, SceneLoadError> {
        Ok(ron::from_str(contents)?)
    }

    /// Save a scene to a RON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SceneSaveError> {
        let pretty = ron::ser::PrettyConfig::new()
            .struct_names(true)
            .enumerate_arrays(false);
        let contents = ron::ser::to_string_pretty(self, pretty)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Add an entity template to this scene
    pub fn add_entity(&mut self, entity: EntityTemplate) {
        self.entities.push(entity);
    }

    /// Set the gravity for this scene
    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = Some(gravity);
        self
    }

    /// Set the ground height
    pub fn with_floor(mut self, floor_y: f32) -> Self {
        self.floor_y = Some(floor_y);
        self
    }

    /// Set the player spawn position
    pub fn with_player_spawn(mut self, position: Vec3) -> Self {
        self.player_spawn = Some(position);
        self
    }

    /// Set the wood collection zone
    pub fn with_wood_zone(mut self, zone: Aabb) -> Self {
        self.wood_zone = Some(zone);
        self
    }

    /// Build a world populated with this scene's entities
    pub fn instantiate(&self) -> World {
        let config = match self.gravity {
            Some(g) => PhysicsConfig::new(g),
            None => PhysicsConfig::default(),
        };
        let mut world = World::with_physics(config);
        if let Some(floor_y) = self.floor_y {
            world
                .physics_mut()
                .add_static_collider(StaticCollider::floor(floor_y, PhysicsMaterial::GROUND));
        }
        for template in &self.entities {
            world.spawn(template.to_entity(), template.to_body());
        }
        log::info!("Instantiated scene '{}' with {} entities", self.name, world.entity_count());
        world
    }
}

/// Error loading a scene
#[derive(Debug)]
pub enum SceneLoadError {
    /// IO error (file not found, permission denied, etc.)
    Io(io::Error),
    /// Parse error (invalid RON syntax)
    Parse(ron::error::SpannedError),
}

impl From<io::Error> for SceneLoadError {
    fn from(e: io::Error) -> Self {
        SceneLoadError::Io(e)
    }
}

impl From<ron::error::SpannedError> for SceneLoadError {
    fn from(e: ron::error::SpannedError) -> Self {
        SceneLoadError::Parse(e)
    }
}

impl std::fmt::Display for SceneLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneLoadError::Io(e) => write!(f, "IO error: {}", e),
            SceneLoadError::Parse(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for SceneLoadError {}

/// Error saving a scene
#[derive(Debug)]
pub enum SceneSaveError {
    /// IO error (permission denied, disk full, etc.)
    Io(io::Error),
    /// Serialization error
    Serialize(ron::Error),
}

impl From<io::Error> for SceneSaveError {
    fn from(e: io::Error) -> Self {
        SceneSaveError::Io(e)
    }
}

impl From<ron::Error> for SceneSaveError {
    fn from(e: ron::Error) -> Self {
        SceneSaveError::Serialize(e)
    }
}

impl std::fmt::Display for SceneSaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneSaveError::Io(e) => write!(f, "IO error: {}", e),
            SceneSaveError::Serialize(e) => write!(f, "Serialize error: {}", e),
        }
    }
}

impl std::error::Error for SceneSaveError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityKind;
    use crate::{Transform, AXE_TAG, WOOD_TAG};

    const YARD: &str = r#"
Scene(
    name: "Yard",
    floor_y: Some(0.0),
    player_spawn: Some((x: 0.0, y: 1.7, z: 3.0)),
    entities: [
        (
            name: Some("log"),
            kind: wood,
            transform: (position: (x: 0.0, y: 0.5, z: 0.0)),
            half_extents: (x: 0.15, y: 0.5, z: 0.15),
        ),
        (
            name: Some("axe"),
            kind: axe,
            transform: (position: (x: 1.0, y: 1.0, z: 0.0)),
            half_extents: (x: 0.05, y: 0.4, z: 0.05),
            placed: true,
        ),
    ],
)
"#;

    #[test]
    fn test_parse_scene() {
        let scene = Scene::from_ron(YARD).unwrap();
        assert_eq!(scene.name, "Yard");
        assert_eq!(scene.entities.len(), 2);
        assert_eq!(scene.entities[0].kind, EntityKind::Wood);
        assert!(scene.entities[1].placed);
        assert_eq!(scene.player_spawn, Some(Vec3::new(0.0, 1.7, 3.0)));
        assert!(scene.gravity.is_none());
    }

    #[test]
    fn test_instantiate_scene() {
        let world = Scene::from_ron(YARD).unwrap().instantiate();
        assert_eq!(world.entity_count(), 2);
        assert_eq!(world.count_tagged(WOOD_TAG), 1);
        assert_eq!(world.count_tagged(AXE_TAG), 1);
        assert_eq!(world.physics().body_count(), 2);
        assert_eq!(world.physics().static_colliders().len(), 1);
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(Scene::from_ron("Scene(name: "), Err(SceneLoadError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = Scene::load("/nonexistent/yard.ron");
        assert!(matches!(result, Err(SceneLoadError::Io(_))));
    }

    #[test]
    fn test_save_and_reload() {
        let mut scene = Scene::new("Saved").with_floor(0.0);
        scene.add_entity(EntityTemplate::new(
            EntityKind::Wood,
            Transform::from_position(Vec3::new(0.0, 0.5, 0.0)),
            Vec3::new(0.15, 0.5, 0.15),
        ));

        let path = std::env::temp_dir().join(format!("woodcut_scene_{}.ron", std::process::id()));
        scene.save(&path).unwrap();
        let loaded = Scene::load(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(loaded.name, "Saved");
        assert_eq!(loaded.entities.len(), 1);
        assert_eq!(loaded.floor_y, Some(0.0));
    }
}
