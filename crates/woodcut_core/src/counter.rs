//! Collected-wood counter

use std::collections::HashSet;

use woodcut_math::Aabb;

use crate::world::{EntityKey, World};

/// Counts distinct wood entities inside a zone
///
/// Pieces entering increment the count; leaving or being destroyed
/// decrements it.
#[derive(Clone, Debug)]
pub struct WoodCounter {
    zone: Aabb,
    inside: HashSet<EntityKey>,
}

impl WoodCounter {
    pub fn new(zone: Aabb) -> Self {
        Self {
            zone,
            inside: HashSet::new(),
        }
    }

    #[inline]
    pub fn zone(&self) -> &Aabb {
        &self.zone
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.inside.len()
    }

    pub fn contains(&self, key: EntityKey) -> bool {
        self.inside.contains(&key)
    }

    /// Re-scan the world; returns the new count
    pub fn update(&mut self, world: &World) -> usize {
        let now: HashSet<EntityKey> = world
            .iter()
            .filter(|(_, e)| e.is_wood())
            .filter(|(_, e)| {
                let center = e.world_bounds().map_or(e.transform.position, |b| b.center());
                self.zone.contains(center)
            })
            .map(|(k, _)| k)
            .collect();

        for key in now.difference(&self.inside) {
            log::debug!("Wood {:?} entered the collection zone", key);
        }
        for key in self.inside.difference(&now) {
            log::debug!("Wood {:?} left the collection zone", key);
        }
        if now.len() != self.inside.len() {
            log::info!("Wood collected: {}", now.len());
        }

        self.inside = now;
        self.inside.len()
    }
}
