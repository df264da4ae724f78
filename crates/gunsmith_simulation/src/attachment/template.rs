//! Attachment templates - статические blueprint'ы частей
//!
//! # Архитектура
//!
//! **AttachmentTemplate** - immutable описание части (категория, mesh, rail
//! параметры, durability, модификаторы, child links).
//! **AttachmentTemplates** - lookup table (resource), hardcoded default набор
//! или RON документ.
//! **TemplateLookup** - seam для хоста: граф не знает, откуда шаблоны.

use std::collections::HashMap;
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{AttachmentCategory, RailPath};
use crate::ammo::MagazineType;
use crate::config::ConfigError;
use crate::weapon::{StatModifier, WeaponStat};

// ============================================================================
// Ids / handles
// ============================================================================

/// Template identifier (unique string ID)
///
/// # Examples
/// - "ar_upper"
/// - "barrel_16in"
/// - "pmag_30"
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect, Serialize, Deserialize)]
pub struct TemplateId(pub String);

impl From<&str> for TemplateId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for TemplateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque mesh handle (хост знает, какие sockets у mesh'а)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub struct MeshHandle(pub u32);

// ============================================================================
// Template parts
// ============================================================================

/// Планка: параметры SlotAllocator'а
#[derive(Clone, Debug, PartialEq, Reflect, Serialize, Deserialize)]
pub struct RailTemplate {
    pub num_slots: i32,
    pub slot_spacing: f32,
    pub path: RailPath,
}

impl RailTemplate {
    /// Прямая планка: `num_slots` слотов через `slot_spacing`
    pub fn straight(num_slots: i32, slot_spacing: f32) -> Self {
        Self {
            num_slots,
            slot_spacing,
            path: RailPath::straight(num_slots.max(0) as f32 * slot_spacing),
        }
    }
}

/// Поведение части помимо общего (rail / патронник / магазин)
#[derive(Clone, Debug, PartialEq, Default, Reflect, Serialize, Deserialize)]
pub enum PartKind {
    #[default]
    Generic,
    Rail(RailTemplate),
    /// Ствол: сколько "пуль" даёт одна гильза (дробь > 1)
    Barrel { pellets_per_shell: u8 },
    /// Магазин: модель (None → ёмкость из `WeaponConfig`)
    Magazine { magazine_type: Option<MagazineType> },
}

/// Исходящая связь parent → children (шаблонная часть ChildLink)
#[derive(Clone, Debug, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct ChildLinkTemplate {
    pub children: Vec<TemplateId>,
    /// Смещение относительно socket'а parent'а
    pub offset: Transform,
    /// Желаемый стартовый слот на rail parent'е
    pub start_slot: i32,
}

impl Default for ChildLinkTemplate {
    fn default() -> Self {
        Self {
            children: Vec::new(),
            offset: Transform::IDENTITY,
            start_slot: 0,
        }
    }
}

impl ChildLinkTemplate {
    pub fn to(children: &[&str]) -> Self {
        Self {
            children: children.iter().map(|id| TemplateId::from(*id)).collect(),
            ..Default::default()
        }
    }
}

// ============================================================================
// AttachmentTemplate
// ============================================================================

/// Static attachment blueprint
#[derive(Clone, Debug, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachmentTemplate {
    pub id: TemplateId,
    pub name: String,
    pub category: AttachmentCategory,
    pub mesh: MeshHandle,

    // === Rail placement ===
    /// Сколько слотов занимает на планке
    pub size: i32,
    pub start_slot: i32,
    /// Ставится через sweep по планке (иначе обычный socket)
    pub use_rail: bool,

    // === Stats ===
    pub durability: f32,
    pub modifiers: Vec<StatModifier>,
    /// Half extents для overlap-теста
    pub bounds: Vec3,

    pub links: Vec<ChildLinkTemplate>,
    pub kind: PartKind,
    /// Abstract шаблон не спавнится (только база для других)
    pub is_abstract: bool,
}

impl Default for AttachmentTemplate {
    fn default() -> Self {
        Self {
            id: TemplateId(String::new()),
            name: String::new(),
            category: AttachmentCategory::Charm,
            mesh: MeshHandle(0),
            size: 1,
            start_slot: 0,
            use_rail: false,
            durability: 100.0,
            modifiers: Vec::new(),
            bounds: Vec3::splat(0.5),
            links: Vec::new(),
            kind: PartKind::Generic,
            is_abstract: false,
        }
    }
}

impl AttachmentTemplate {
    pub fn new(id: &str, name: &str, category: AttachmentCategory, mesh: u32) -> Self {
        Self {
            id: id.into(),
            name: name.to_string(),
            category,
            mesh: MeshHandle(mesh),
            ..Default::default()
        }
    }

    pub fn with_links(mut self, links: Vec<ChildLinkTemplate>) -> Self {
        self.links = links;
        self
    }

    pub fn with_kind(mut self, kind: PartKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn on_rail(mut self, size: i32) -> Self {
        self.use_rail = true;
        self.size = size;
        self
    }

    pub fn with_durability(mut self, durability: f32) -> Self {
        self.durability = durability;
        self
    }

    pub fn with_modifier(mut self, modifier: StatModifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn with_bounds(mut self, half_extents: Vec3) -> Self {
        self.bounds = half_extents;
        self
    }
}

// ============================================================================
// Lookup
// ============================================================================

/// Внешняя таблица шаблонов
pub trait TemplateLookup {
    fn template(&self, id: &TemplateId) -> Option<&AttachmentTemplate>;
}

/// Templates lookup table (resource)
#[derive(Resource, Clone, Debug)]
pub struct AttachmentTemplates {
    templates: HashMap<TemplateId, AttachmentTemplate>,
}

impl AttachmentTemplates {
    pub fn new() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    pub fn get(&self, id: &TemplateId) -> Option<&AttachmentTemplate> {
        self.templates.get(id)
    }

    pub fn add(&mut self, template: AttachmentTemplate) {
        self.templates.insert(template.id.clone(), template);
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn all_ids(&self) -> Vec<&TemplateId> {
        self.templates.keys().collect()
    }

    /// RON документ: список `AttachmentTemplate`
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let list: Vec<AttachmentTemplate> =
            ron::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let mut templates = Self::new();
        for template in list {
            if template.id.0.is_empty() {
                return Err(ConfigError::Invalid {
                    field: "id",
                    reason: format!("template `{}` has an empty id", template.name),
                });
            }
            templates.add(template);
        }
        Ok(templates)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_ron_str(&source)
    }

    /// Корни default винтовки
    pub fn rifle_roots() -> Vec<TemplateId> {
        vec!["ar_upper".into(), "ar_lower".into()]
    }
}

impl TemplateLookup for AttachmentTemplates {
    fn template(&self, id: &TemplateId) -> Option<&AttachmentTemplate> {
        self.get(id)
    }
}

/// Mesh handles default набора (совпадают с `MeshSockets::default()`)
pub mod meshes {
    pub const UPPER: u32 = 1;
    pub const LOWER: u32 = 2;
    pub const BARREL: u32 = 3;
    pub const TOP_RAIL: u32 = 4;
    pub const RED_DOT: u32 = 5;
    pub const LASER: u32 = 6;
    pub const MAGAZINE: u32 = 7;
    pub const STOCK: u32 = 8;
    pub const GRIP: u32 = 9;
    pub const FLASH_HIDER: u32 = 10;
    pub const CHARGING_HANDLE: u32 = 11;
    pub const SHOTGUN_BARREL: u32 = 12;
    pub const SUPPRESSOR: u32 = 13;
}

impl Default for AttachmentTemplates {
    /// Hardcoded набор: AR-платформа (upper + lower)
    fn default() -> Self {
        use AttachmentCategory as C;

        let mut defs = Self::new();

        // === RECEIVERS ===

        defs.add(
            AttachmentTemplate::new("ar_upper", "AR Upper Receiver", C::UpperReceiver, meshes::UPPER)
                .with_durability(95.0)
                .with_links(vec![
                    ChildLinkTemplate::to(&["barrel_16in"]),
                    ChildLinkTemplate::to(&["top_rail"]),
                    ChildLinkTemplate::to(&["charging_handle"]),
                ]),
        );

        defs.add(
            AttachmentTemplate::new("ar_lower", "AR Lower Receiver", C::LowerReceiver, meshes::LOWER)
                .with_durability(90.0)
                .with_links(vec![
                    ChildLinkTemplate::to(&["pmag_30"]),
                    ChildLinkTemplate::to(&["stock_carbine"]),
                    ChildLinkTemplate::to(&["grip_a2"]),
                ]),
        );

        // === BARRELS ===

        defs.add(
            AttachmentTemplate::new("barrel_16in", "16\" Barrel", C::Barrel, meshes::BARREL)
                .with_kind(PartKind::Barrel { pellets_per_shell: 1 })
                .with_durability(85.0)
                .with_modifier(StatModifier::flat(WeaponStat::MuzzleVelocity, 15.0))
                .with_links(vec![ChildLinkTemplate::to(&["flash_hider"])]),
        );

        defs.add(
            AttachmentTemplate::new("barrel_shotgun", "12ga Barrel", C::Barrel, meshes::SHOTGUN_BARREL)
                .with_kind(PartKind::Barrel { pellets_per_shell: 8 })
                .with_modifier(StatModifier::override_with(WeaponStat::Range, 50.0)),
        );

        // === MUZZLE ===

        defs.add(
            AttachmentTemplate::new("flash_hider", "A2 Flash Hider", C::MuzzleDevice, meshes::FLASH_HIDER)
                .with_modifier(StatModifier::percentage(WeaponStat::VerticalRecoil, 0.95)),
        );

        defs.add(
            AttachmentTemplate::new("suppressor", "Suppressor", C::Suppressor, meshes::SUPPRESSOR)
                .with_modifier(StatModifier::percentage(WeaponStat::VerticalRecoil, 0.85))
                .with_modifier(StatModifier::flat(WeaponStat::Weight, 0.4)),
        );

        // === RAIL + RAIL-MOUNTED ===

        defs.add(
            AttachmentTemplate::new("top_rail", "Top Picatinny Rail", C::Rail, meshes::TOP_RAIL)
                .with_kind(PartKind::Rail(RailTemplate::straight(15, 10.0)))
                .with_links(vec![
                    ChildLinkTemplate::to(&["red_dot"]),
                    ChildLinkTemplate::to(&["laser_box"]),
                ]),
        );

        defs.add(
            AttachmentTemplate::new("red_dot", "Red Dot Sight", C::Optic, meshes::RED_DOT)
                .on_rail(3)
                .with_durability(70.0)
                .with_bounds(Vec3::new(2.0, 2.0, 12.0))
                .with_modifier(StatModifier::flat(WeaponStat::Ergonomics, -2.0)),
        );

        defs.add(
            AttachmentTemplate::new("laser_box", "Laser Aiming Module", C::Laser, meshes::LASER)
                .on_rail(2)
                .with_durability(80.0)
                .with_bounds(Vec3::new(2.0, 2.0, 8.0))
                .with_modifier(StatModifier::percentage(WeaponStat::Accuracy, 0.9)),
        );

        // === FURNITURE ===

        defs.add(
            AttachmentTemplate::new("pmag_30", "PMAG 30", C::Magazine, meshes::MAGAZINE)
                .with_kind(PartKind::Magazine {
                    magazine_type: Some(MagazineType::MagpulMoe30),
                })
                .with_modifier(StatModifier::flat(WeaponStat::Weight, 0.45)),
        );

        defs.add(
            AttachmentTemplate::new("stock_carbine", "Carbine Stock", C::Stock, meshes::STOCK)
                .with_modifier(StatModifier::flat(WeaponStat::Ergonomics, 6.0))
                .with_modifier(StatModifier::percentage(WeaponStat::HorizontalRecoil, 0.9)),
        );

        defs.add(
            AttachmentTemplate::new("grip_a2", "A2 Grip", C::HandGrip, meshes::GRIP)
                .with_modifier(StatModifier::flat(WeaponStat::Ergonomics, 3.0)),
        );

        defs.add(AttachmentTemplate::new(
            "charging_handle",
            "Charging Handle",
            C::ChargingHandle,
            meshes::CHARGING_HANDLE,
        ));

        defs
    }
}
