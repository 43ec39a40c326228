//! Entities and entity templates
//!
//! An Entity is an object in the woodyard: a log, a chopped piece, the axe.

use std::collections::HashSet;
use serde::{Serialize, Deserialize};
use woodcut_math::{Aabb, Vec3};
use woodcut_mesh::{MaterialId, Mesh};
use woodcut_physics::{BodyKey, BodyLocks, BodyType, CollisionFilter, PhysicsMaterial, RigidBody};
use crate::Transform;

/// Tag carried by every choppable object and every piece cut from one
pub const WOOD_TAG: &str = "Wood";

/// Tag carried by the axe
pub const AXE_TAG: &str = "Axe";

/// An entity in the world
///
/// Each entity has:
/// - An optional name (for lookup by name)
/// - Tags (the `"Wood"` tag makes it choppable)
/// - A transform synced from its physics body
/// - An optional mesh (required for slicing)
/// - An optional physics body key (links to PhysicsWorld)
#[derive(Clone, Debug, Default)]
pub struct Entity {
    /// Optional name for this entity (for lookup)
    pub name: Option<String>,
    /// Tags for categorization
    pub tags: HashSet<String>,
    /// The entity's transform in world space
    pub transform: Transform,
    /// Geometry in local space
    pub mesh: Option<Mesh>,
    /// Optional physics body key (links to PhysicsWorld)
    pub physics_body: Option<BodyKey>,
}

impl Entity {
    /// Create an entity with a transform and no mesh
    pub fn new(transform: Transform) -> Self {
        Self {
            transform,
            ..Self::default()
        }
    }

    /// Set the name of this entity (for lookup)
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a tag to this entity
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Add multiple tags to this entity
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        for tag in tags {
            self.tags.insert(tag.into());
        }
        self
    }

    /// Attach a mesh
    pub fn with_mesh(mut self, mesh: Mesh) -> Self {
        self.mesh = Some(mesh);
        self
    }

    /// Attach a physics body to this entity
    pub fn with_physics_body(mut self, key: BodyKey) -> Self {
        self.physics_body = Some(key);
        self
    }

    /// Check if this entity has a specific tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Whether this entity can be chopped
    pub fn is_wood(&self) -> bool {
        self.has_tag(WOOD_TAG)
    }

    /// World-space bounds of the mesh, `None` without a mesh
    pub fn world_bounds(&self) -> Option<Aabb> {
        let mesh = self.mesh.as_ref()?;
        if mesh.is_empty() {
            return None;
        }
        Aabb::from_points(mesh.vertices().iter().map(|v| self.transform.transform_point(*v)))
    }
}

/// Which prefab-like role a template plays
///
/// Decides the collision filter and physics material of the spawned body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Choppable log
    #[default]
    Wood,
    /// The axe
    Axe,
    /// Chopping block, stump or other static prop
    Prop,
}

/// A serializable entity template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityTemplate {
    /// Optional name for this entity (for lookup)
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub kind: EntityKind,
    /// Extra tags; the kind's own tag is always added
    #[serde(default)]
    pub tags: Vec<String>,
    /// The entity's transform in world space
    pub transform: Transform,
    /// Half-size of the box mesh and collider
    pub half_extents: Vec3,
    #[serde(default)]
    pub body_type: BodyType,
    #[serde(default = "default_mass")]
    pub mass: f32,
    /// Spawn with every axis locked (the axe resting on its block)
    #[serde(default)]
    pub placed: bool,
    /// Leave out the mesh (the entity cannot be sliced)
    #[serde(default)]
    pub no_mesh: bool,
}

fn default_mass() -> f32 {
    1.0
}

impl EntityTemplate {
    /// Create a template for a box of the given kind
    pub fn new(kind: EntityKind, transform: Transform, half_extents: Vec3) -> Self {
        Self {
            name: None,
            kind,
            tags: Vec::new(),
            transform,
            half_extents,
            body_type: BodyType::Dynamic,
            mass: default_mass(),
            placed: false,
            no_mesh: false,
        }
    }

    /// Set the name of this template
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a tag to this template
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Set the body type
    pub fn with_body_type(mut self, body_type: BodyType) -> Self {
        self.body_type = body_type;
        self
    }

    /// Spawn with a placement constraint
    pub fn placed(mut self) -> Self {
        self.placed = true;
        self
    }

    /// Spawn without a mesh
    pub fn without_mesh(mut self) -> Self {
        self.no_mesh = true;
        self
    }

    /// Convert this template to an Entity (without a physics body)
    pub fn to_entity(&self) -> Entity {
        let (tag, material) = match self.kind {
            EntityKind::Wood => (Some(WOOD_TAG), MaterialId::BARK),
            EntityKind::Axe => (Some(AXE_TAG), MaterialId::STEEL),
            EntityKind::Prop => (None, MaterialId::BARK),
        };
        let mut entity = Entity::new(self.transform).with_tags(self.tags.iter().cloned());
        if let Some(tag) = tag {
            entity = entity.with_tag(tag);
        }
        if let Some(ref name) = self.name {
            entity = entity.with_name(name.clone());
        }
        if !self.no_mesh {
            entity = entity.with_mesh(Mesh::cuboid(self.half_extents, material));
        }
        entity
    }

    /// The rigid body this template spawns with
    pub fn to_body(&self) -> RigidBody {
        let (filter, material) = match self.kind {
            EntityKind::Wood => (CollisionFilter::wood(), PhysicsMaterial::WOOD),
            EntityKind::Axe => (CollisionFilter::axe(), PhysicsMaterial::STEEL),
            EntityKind::Prop => (CollisionFilter::static_world(), PhysicsMaterial::WOOD),
        };
        let mut body = RigidBody::new_box(self.transform.position, self.half_extents)
            .with_rotation(self.transform.rotation)
            .with_mass(self.mass)
            .with_body_type(self.body_type)
            .with_filter(filter)
            .with_material(material);
        if self.placed {
            body = body.with_locks(BodyLocks::ALL);
        }
        body
    }
}
