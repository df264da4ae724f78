//! Ammo domain - патроны, магазины, патронник
//!
//! # Архитектура
//!
//! **AmmoBuffer** - кольцевой буфер фиксированной ёмкости (FIFO).
//! **Magazine** - AmmoBuffer + модель магазина (ёмкость из `MagazineType`).
//! **ChamberState** - патрон(ы) в патроннике (несколько = дробь).
//!
//! Магазин - значение: он переезжает между оружием и caller'ом при reload.

pub mod buffer;
pub mod chamber;
pub mod magazine;

#[cfg(test)]
mod buffer_tests;

pub use buffer::*;
pub use chamber::*;
pub use magazine::*;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

// ============================================================================
// BulletType
// ============================================================================

/// Тип патрона (закрытый набор, `None` = пусто/нет патрона)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub enum BulletType {
    /// Sentinel: патрона нет
    #[default]
    None,
    /// Стандартный FMJ (ball)
    StandardFmj,
    /// Бронебойный (black tip)
    ArmorPiercing,
    /// Экспансивный (hollow / soft point)
    HollowPointSp,
    /// Трассер (green tip)
    Tracer,
    /// Дозвуковой, под глушитель
    Subsonic,
    /// Охотничий JSP
    HuntingJsp,
}

impl BulletType {
    pub fn is_valid(self) -> bool {
        self != BulletType::None
    }

    /// Имя для логов/UI
    pub fn display_name(self) -> &'static str {
        match self {
            BulletType::None => "None (Empty)",
            BulletType::StandardFmj => "Standard FMJ (Ball)",
            BulletType::ArmorPiercing => "Armor Piercing (Black Tip)",
            BulletType::HollowPointSp => "Hollow/Soft Point",
            BulletType::Tracer => "Tracer (Green Tip)",
            BulletType::Subsonic => "Subsonic",
            BulletType::HuntingJsp => "Jacketed Soft Point",
        }
    }
}

// ============================================================================
// MagazineType
// ============================================================================

/// Модель магазина (7.62x39) - определяет ёмкость
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum MagazineType {
    // Полимерные 30-зарядные
    MagpulMoe30,
    MagpulM3Reinforced30,
    ArsenalWaffle30,
    XTechMag47_30,
    UsPalmAk30R30,
    ProMagStandard30,
    // Уменьшенные
    MagpulMoe10,
    MagpulMoe20,
    ProMagStandard20,
    // Увеличенные коробчатые
    ArsenalWaffle40,
    ProMagStandard40,
    AtiSchmeisserS60,
    // Барабаны
    ProMagDrum50,
    KciDrum75,
    ChineseDrum75,
    // Стальные surplus
    SurplusSteel30,
    SurplusSteelRpk40,
}

impl MagazineType {
    /// Ёмкость модели (патронов)
    pub fn capacity(self) -> usize {
        match self {
            MagazineType::MagpulMoe10 => 10,
            MagazineType::MagpulMoe20 | MagazineType::ProMagStandard20 => 20,
            MagazineType::MagpulMoe30
            | MagazineType::MagpulM3Reinforced30
            | MagazineType::ArsenalWaffle30
            | MagazineType::XTechMag47_30
            | MagazineType::UsPalmAk30R30
            | MagazineType::ProMagStandard30
            | MagazineType::SurplusSteel30 => 30,
            MagazineType::ArsenalWaffle40
            | MagazineType::ProMagStandard40
            | MagazineType::SurplusSteelRpk40 => 40,
            MagazineType::ProMagDrum50 => 50,
            MagazineType::AtiSchmeisserS60 => 60,
            MagazineType::KciDrum75 | MagazineType::ChineseDrum75 => 75,
        }
    }
}
