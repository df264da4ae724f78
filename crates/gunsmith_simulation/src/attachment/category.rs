//! Attachment categories + canonical socket names

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Категория части оружия (закрытый enum).
///
/// Socket на parent mesh выводится из категории детерминированно:
/// имя socket'а == имя варианта.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum AttachmentCategory {
    // === Ствольная коробка ===
    MonolithicReceiver,
    UpperReceiver,
    LowerReceiver,

    // === Пистолет ===
    PistolSlide,
    PistolFrame,

    // === Прицелы ===
    Optic,
    IronSights,

    // === Ствол и дульные устройства ===
    Barrel,
    MuzzleDevice,
    Suppressor,
    GasBlock,

    // === Подствольное / тактическое ===
    Underbarrel,
    Foregrip,
    TacticalDevice,
    Laser,
    Flashlight,

    // === Механика ===
    Trigger,
    FiringControlGroup,
    ActionReturnSpringAssembly,
    BufferTube,
    ChargingHandle,
    BoltCarrierGroup,

    // === Приклад / рукоятки ===
    Stock,
    HandGrip,
    PistolGripInsert,
    RecoilPad,

    // === Магазин ===
    Magazine,

    // === Планки и крепления ===
    Rail,
    RailCover,
    Mount,
    OpticMount,

    // === Мелочь ===
    EjectionPortCover,
    Charm,
}

impl AttachmentCategory {
    /// Все категории (порядок объявления)
    pub const ALL: [AttachmentCategory; 33] = [
        AttachmentCategory::MonolithicReceiver,
        AttachmentCategory::UpperReceiver,
        AttachmentCategory::LowerReceiver,
        AttachmentCategory::PistolSlide,
        AttachmentCategory::PistolFrame,
        AttachmentCategory::Optic,
        AttachmentCategory::IronSights,
        AttachmentCategory::Barrel,
        AttachmentCategory::MuzzleDevice,
        AttachmentCategory::Suppressor,
        AttachmentCategory::GasBlock,
        AttachmentCategory::Underbarrel,
        AttachmentCategory::Foregrip,
        AttachmentCategory::TacticalDevice,
        AttachmentCategory::Laser,
        AttachmentCategory::Flashlight,
        AttachmentCategory::Trigger,
        AttachmentCategory::FiringControlGroup,
        AttachmentCategory::ActionReturnSpringAssembly,
        AttachmentCategory::BufferTube,
        AttachmentCategory::ChargingHandle,
        AttachmentCategory::BoltCarrierGroup,
        AttachmentCategory::Stock,
        AttachmentCategory::HandGrip,
        AttachmentCategory::PistolGripInsert,
        AttachmentCategory::RecoilPad,
        AttachmentCategory::Magazine,
        AttachmentCategory::Rail,
        AttachmentCategory::RailCover,
        AttachmentCategory::Mount,
        AttachmentCategory::OpticMount,
        AttachmentCategory::EjectionPortCover,
        AttachmentCategory::Charm,
    ];

    /// Canonical socket name (pure, детерминированно)
    pub fn socket_name(self) -> &'static str {
        match self {
            AttachmentCategory::MonolithicReceiver => "MonolithicReceiver",
            AttachmentCategory::UpperReceiver => "UpperReceiver",
            AttachmentCategory::LowerReceiver => "LowerReceiver",
            AttachmentCategory::PistolSlide => "PistolSlide",
            AttachmentCategory::PistolFrame => "PistolFrame",
            AttachmentCategory::Optic => "Optic",
            AttachmentCategory::IronSights => "IronSights",
            AttachmentCategory::Barrel => "Barrel",
            AttachmentCategory::MuzzleDevice => "MuzzleDevice",
            AttachmentCategory::Suppressor => "Suppressor",
            AttachmentCategory::GasBlock => "GasBlock",
            AttachmentCategory::Underbarrel => "Underbarrel",
            AttachmentCategory::Foregrip => "Foregrip",
            AttachmentCategory::TacticalDevice => "TacticalDevice",
            AttachmentCategory::Laser => "Laser",
            AttachmentCategory::Flashlight => "Flashlight",
            AttachmentCategory::Trigger => "Trigger",
            AttachmentCategory::FiringControlGroup => "FiringControlGroup",
            AttachmentCategory::ActionReturnSpringAssembly => "ActionReturnSpringAssembly",
            AttachmentCategory::BufferTube => "BufferTube",
            AttachmentCategory::ChargingHandle => "ChargingHandle",
            AttachmentCategory::BoltCarrierGroup => "BoltCarrierGroup",
            AttachmentCategory::Stock => "Stock",
            AttachmentCategory::HandGrip => "HandGrip",
            AttachmentCategory::PistolGripInsert => "PistolGripInsert",
            AttachmentCategory::RecoilPad => "RecoilPad",
            AttachmentCategory::Magazine => "Magazine",
            AttachmentCategory::Rail => "Rail",
            AttachmentCategory::RailCover => "RailCover",
            AttachmentCategory::Mount => "Mount",
            AttachmentCategory::OpticMount => "OpticMount",
            AttachmentCategory::EjectionPortCover => "EjectionPortCover",
            AttachmentCategory::Charm => "Charm",
        }
    }

    /// Категории, которые держат патроны (индексатор ищет первый такой узел)
    pub fn is_magazine_like(self) -> bool {
        matches!(self, AttachmentCategory::Magazine)
    }

    /// Категории с патронником
    pub fn is_barrel_like(self) -> bool {
        matches!(self, AttachmentCategory::Barrel)
    }
}
