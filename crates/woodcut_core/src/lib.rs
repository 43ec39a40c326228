//! Gameplay core for the woodcutter
//!
//! This crate turns host input and physics events into woodcutting:
//!
//! - [`Entity`] / [`World`] - Tagged objects with meshes and physics bodies
//! - [`Scene`] - Loadable/saveable woodyard layout
//! - [`AxeGrip`] - Two hands engaging, stabilizing and releasing the axe
//! - [`InteractionDetector`] - What the player is looking at
//! - [`ImpactGate`] - Debounced chop sound, effect and hit-stop
//! - [`Slicer`] - Splitting wood hit hard enough from above
//! - [`PresentationController`] - Aim mode, cursor and crosshair state
//! - [`WoodCounter`], [`AxeRespawnWatchdog`], [`VolumeSettings`]
//! - [`ChopSession`] - The per-tick driver wiring all of the above

mod audio;
mod counter;
mod effects;
mod entity;
mod grip;
mod impact;
mod interaction;
mod presentation;
mod respawn;
mod scene;
mod session;
mod slicer;
mod timer;
mod transform;
mod world;

pub use audio::{
    AudioChannel, AudioSink, MemorySettingsStore, NullAudio, SettingsError, SettingsStore,
    TomlSettingsStore, VolumeSettings, DEFAULT_VOLUME,
};
pub use counter::WoodCounter;
pub use effects::{EffectSpawner, NullEffects};
pub use entity::{Entity, EntityKind, EntityTemplate, AXE_TAG, WOOD_TAG};
pub use grip::{AxeGrip, ConstraintMode, GripConfig, GripInput, Hand, HandAttachment, HandState};
pub use impact::{ImpactConfig, ImpactGate, ImpactGateState, ImpactResponse};
pub use interaction::{InteractionConfig, InteractionDetector, InteractionReport, InteractionTarget, Viewpoint};
pub use presentation::{AimMode, CursorIcon, CursorPresenter, PresentationController, CROSSHAIR_LIMIT};
pub use respawn::{AxeRespawnWatchdog, RespawnConfig};
pub use scene::{Scene, SceneLoadError, SceneSaveError};
pub use session::{ChopReport, ChopSession, FrameInput, SessionConfig, SessionError, TickReport};
pub use slicer::{SliceConfig, SliceError, SliceEvent, SliceGuard, SliceOutcome, SliceRejection, Slicer};
pub use timer::{Countdown, SimClock};
pub use transform::Transform;
pub use world::{EntityKey, World};

// Re-export commonly used types from the lower crates
pub use woodcut_math::{Aabb, Axis, Plane, Quat, Vec3};
pub use woodcut_mesh::{MaterialId, Mesh, MeshCutter, PlaneCutter, SlicedHull};
pub use woodcut_physics::{
    BodyKey, BodyLocks, BodyType, CollisionEvent, CollisionLayer, PhysicsConfig, PhysicsWorld, PlayerBody,
    RigidBody, StaticCollider,
};
