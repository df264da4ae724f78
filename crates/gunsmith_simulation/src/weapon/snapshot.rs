//! WeaponSnapshot - минимальное реплицируемое состояние
//!
//! Authority публикует snapshot после каждого изменения (revision++),
//! observers применяют его как есть и ничего не пересчитывают.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::ReloadStage;

#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect, Serialize, Deserialize)]
pub struct WeaponSnapshot {
    /// Монотонный номер изменения на authority
    pub revision: u64,
    pub ammo_count: usize,
    pub reload_stage: ReloadStage,
    pub magazine_attached: bool,
    pub durability: f32,
}

impl WeaponSnapshot {
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::to_string(self)
    }
}

/// Состояние оружия глазами observer'а
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservedWeapon {
    latest: Option<WeaponSnapshot>,
}

impl ObservedWeapon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Применить snapshot. `false` если он не новее текущего
    pub fn apply(&mut self, snapshot: WeaponSnapshot) -> bool {
        if self.latest.is_some_and(|current| snapshot.revision <= current.revision) {
            return false;
        }
        self.latest = Some(snapshot);
        true
    }

    pub fn latest(&self) -> Option<&WeaponSnapshot> {
        self.latest.as_ref()
    }

    /// Последний snapshot или пустое состояние
    pub fn view(&self) -> WeaponSnapshot {
        self.latest.unwrap_or_default()
    }
}
