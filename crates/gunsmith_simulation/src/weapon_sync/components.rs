//! Weapon ECS components

use bevy::prelude::*;

use crate::config::WeaponConfig;
use crate::weapon::{NetRole, WeaponAssembly};

/// Сетевой id оружия: authority и её proxies делят один и тот же
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub struct WeaponNetId(pub u64);

/// Оружие на entity
///
/// `published_revision` - последняя revision, ушедшая в `SnapshotPublished`.
#[derive(Component, Debug, Clone)]
pub struct Weapon {
    pub assembly: WeaponAssembly,
    pub published_revision: u64,
}

impl Weapon {
    pub fn new(role: NetRole, config: WeaponConfig) -> Self {
        Self {
            assembly: WeaponAssembly::new(role, config),
            published_revision: 0,
        }
    }

    pub fn authority(config: WeaponConfig) -> Self {
        Self::new(NetRole::Authority, config)
    }

    pub fn proxy(config: WeaponConfig) -> Self {
        Self::new(NetRole::Proxy, config)
    }

    /// Есть ли изменения, ещё не опубликованные observers
    pub fn needs_publish(&self) -> bool {
        self.assembly.is_authority() && self.assembly.revision() != self.published_revision
    }
}
