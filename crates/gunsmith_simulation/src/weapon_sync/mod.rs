//! Weapon sync - ECS обвязка над `WeaponAssembly`
//!
//! # Architecture
//!
//! **Events → Systems flow:**
//! - Input/AI шлёт `WeaponIntentEvent` конкретной entity
//! - Authority применяет сразу, proxy копит intent в `pending`
//! - `forward_proxy_intents` превращает pending в `ForwardedIntent` (транспорт)
//! - Authority с тем же `WeaponNetId` применяет forwarded intent
//! - `publish_snapshots` → `SnapshotPublished` → proxies применяют как есть
//!
//! Outbox `WeaponAssembly` превращается в `WeaponGraphBuilt` / `WeaponFired` /
//! `WeaponStateChanged`.

use bevy::prelude::*;

pub mod components;
pub mod events;
pub mod systems;

// Re-exports
pub use components::*;
pub use events::*;
pub use systems::*;

/// Weapon plugin (intent → authority → snapshot)
pub struct WeaponPlugin;

impl Plugin for WeaponPlugin {
    fn build(&self, app: &mut App) {
        app
            // Events
            .add_event::<WeaponIntentEvent>()
            .add_event::<ForwardedIntent>()
            .add_event::<SnapshotPublished>()
            .add_event::<WeaponGraphBuilt>()
            .add_event::<WeaponFired>()
            .add_event::<WeaponStateChanged>()
            // Порядок важен: snapshot за тот же кадр доходит до proxy
            .add_systems(
                Update,
                (
                    process_weapon_intents,
                    forward_proxy_intents,
                    apply_forwarded_intents,
                    emit_weapon_events,
                    publish_snapshots,
                    apply_snapshots,
                )
                    .chain(),
            );
    }
}
