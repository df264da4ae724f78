//! GUNSMITH Simulation Core
//!
//! Модульное оружие на Bevy 0.16 (headless ECS)
//!
//! # Слои
//! - `attachment` - шаблоны частей, arena, rail slots, сборка дерева
//! - `ammo` - патроны, магазины, патронник
//! - `weapon` - стрельба, staged reload, durability, статы, authority
//! - `weapon_sync` - ECS plugin: intents, forwarding, snapshots
//!
//! Host (движок) отдаёт sockets и overlap через `SocketQuery` / `OverlapQuery`.

use bevy::prelude::*;

// Публичные модули
pub mod ammo;
pub mod attachment;
pub mod config;
pub mod error;
pub mod logger;
pub mod weapon;
pub mod weapon_sync;

// Re-export базовых типов для удобства
pub use ammo::{BulletType, Magazine, MagazineType};
pub use attachment::{
    AttachmentCategory, AttachmentGraph, AttachmentTemplate, AttachmentTemplates, BuildContext, MeshSockets, NodeId,
    StaticObstacles, TemplateId,
};
pub use config::WeaponConfig;
pub use error::{AssemblyError, RejectReason};
pub use logger::*;
pub use weapon::{
    DurabilityMode, FireController, IntentOutcome, NetRole, ReloadStage, WeaponAssembly, WeaponEvent, WeaponIntent,
    WeaponSnapshot, WeaponStat, WeaponStats,
};
pub use weapon_sync::{Weapon, WeaponNetId, WeaponPlugin};

/// Главный plugin (ресурсы по умолчанию + weapon systems)
///
/// Ресурсы вставляются только если host не положил свои заранее.
pub struct GunsmithPlugin;

impl Plugin for GunsmithPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WeaponConfig>()
            .init_resource::<AttachmentTemplates>()
            .init_resource::<StaticObstacles>();

        if !app.world().contains_resource::<MeshSockets>() {
            app.insert_resource(MeshSockets::rifle());
        }

        app.add_plugins(WeaponPlugin);
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app() -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins);

    app
}
