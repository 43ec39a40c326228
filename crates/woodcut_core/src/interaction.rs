//! What the player is looking at

use serde::{Serialize, Deserialize};
use woodcut_math::Vec3;
use woodcut_physics::{CollisionLayer, Ray};

use crate::presentation::CursorPresenter;
use crate::world::{EntityKey, World};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Length of the view probe
    pub interaction_distance: f32,
    /// Wood only counts as a target this close
    pub pickup_range: f32,
    /// Clear the impact cooldown when a different log comes into view
    pub reset_gate_on_new_target: bool,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            interaction_distance: 5.0,
            pickup_range: 3.0,
            reset_gate_on_new_target: true,
        }
    }
}

/// Camera position and facing
#[derive(Clone, Copy, Debug)]
pub struct Viewpoint {
    pub position: Vec3,
    pub forward: Vec3,
}

impl Viewpoint {
    pub fn new(position: Vec3, forward: Vec3) -> Self {
        Self {
            position,
            forward: forward.normalized(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionTarget {
    Axe(EntityKey),
    Wood(EntityKey),
}

impl InteractionTarget {
    pub fn entity(self) -> EntityKey {
        match self {
            InteractionTarget::Axe(k) | InteractionTarget::Wood(k) => k,
        }
    }
}

/// Result of one probe
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InteractionReport {
    pub target: Option<InteractionTarget>,
    /// A log other than the last acquired one came into view
    pub new_wood_target: bool,
}

impl InteractionReport {
    pub fn looking_at_interactable(&self) -> bool {
        self.target.is_some()
    }
}

/// Per-tick view probe against the axe and wood layers
#[derive(Clone, Debug, Default)]
pub struct InteractionDetector {
    config: InteractionConfig,
    current: Option<InteractionTarget>,
    /// Last wood entity acquired; survives ticks that hit nothing or the axe
    last_wood: Option<EntityKey>,
}

impl InteractionDetector {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            config,
            current: None,
            last_wood: None,
        }
    }

    #[inline]
    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    /// Target found by the last probe
    #[inline]
    pub fn current(&self) -> Option<InteractionTarget> {
        self.current
    }

    /// Wood entity most recently acquired, whether or not it is still in view
    #[inline]
    pub fn last_wood(&self) -> Option<EntityKey> {
        self.last_wood
    }

    /// Probe from the viewpoint and report to the presenter
    ///
    /// The axe is a target only while it is not held. Wood is a target only
    /// within `pickup_range`. Losing sight of a log and finding the same log
    /// again does not make it a new target.
    pub fn update(
        &mut self,
        world: &World,
        view: &Viewpoint,
        axe: EntityKey,
        axe_held: bool,
        presenter: &mut dyn CursorPresenter,
    ) -> InteractionReport {
        let target = self.probe(world, view, axe, axe_held);

        let mut new_wood_target = false;
        if let Some(InteractionTarget::Wood(key)) = target {
            if self.last_wood != Some(key) {
                log::debug!("Acquired new wood target {:?}", key);
                self.last_wood = Some(key);
                new_wood_target = true;
            }
        }
        self.current = target;

        presenter.set_looking_at_interactable(target.is_some());
        InteractionReport { target, new_wood_target }
    }

    fn probe(&self, world: &World, view: &Viewpoint, axe: EntityKey, axe_held: bool) -> Option<InteractionTarget> {
        let ray = Ray::new(view.position, view.forward);
        let hit = world
            .physics()
            .raycast(&ray, self.config.interaction_distance, CollisionLayer::INTERACTABLE)?;
        let key = world.entity_for_body(hit.body)?;

        if key == axe {
            return (!axe_held).then_some(InteractionTarget::Axe(key));
        }
        let entity = world.get_entity(key)?;
        (entity.is_wood() && hit.distance <= self.config.pickup_range).then_some(InteractionTarget::Wood(key))
    }
}
