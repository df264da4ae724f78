//! Weapon sync events
//!
//! # Architecture
//!
//! **Intents:**
//! - `WeaponIntentEvent` → локальный запрос к конкретной entity
//! - `ForwardedIntent` → запрос proxy, адресованный authority по `WeaponNetId`
//!
//! **Replication:**
//! - `SnapshotPublished` → состояние authority для observers
//!
//! **Outbox:**
//! - `WeaponGraphBuilt` → сборка завершена (host синхронизирует meshes)
//! - `WeaponFired` → выстрел (для VFX/audio/projectiles)
//! - `WeaponStateChanged` → любое применённое изменение

use bevy::prelude::*;

use super::WeaponNetId;
use crate::ammo::BulletType;
use crate::attachment::NodeId;
use crate::weapon::{WeaponEvent, WeaponIntent, WeaponSnapshot};

// ============================================================================
// Intents
// ============================================================================

/// Запрос на изменение оружия на entity
#[derive(Event, Clone, Debug)]
pub struct WeaponIntentEvent {
    pub entity: Entity,
    pub intent: WeaponIntent,
}

/// Intent proxy, отправленный authority
#[derive(Event, Clone, Debug)]
pub struct ForwardedIntent {
    pub net_id: WeaponNetId,
    pub intent: WeaponIntent,
}

// ============================================================================
// Replication
// ============================================================================

#[derive(Event, Clone, Copy, Debug)]
pub struct SnapshotPublished {
    pub net_id: WeaponNetId,
    pub snapshot: WeaponSnapshot,
}

// ============================================================================
// Outbox
// ============================================================================

/// Граф собран: `nodes` в порядке регистрации (корни первыми)
#[derive(Event, Clone, Debug)]
pub struct WeaponGraphBuilt {
    pub entity: Entity,
    pub nodes: Vec<NodeId>,
}

/// Оружие выстрелило (pellets > 1 для дробовика)
#[derive(Event, Clone, Debug)]
pub struct WeaponFired {
    pub entity: Entity,
    pub rounds: Vec<BulletType>,
}

#[derive(Event, Clone, Debug)]
pub struct WeaponStateChanged {
    pub entity: Entity,
    pub change: WeaponEvent,
}
