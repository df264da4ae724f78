//! Weapon configuration (RON)
//!
//! Все числовые константы сборки/стрельбы живут здесь, а не размазаны по коду.
//! Загружается один раз при старте (или берётся `Default`).

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ammo::BulletType;
use crate::weapon::DurabilityMode;

/// Нижняя граница durability (оружие и части)
pub const MIN_DURABILITY: f32 = 0.0;
/// Верхняя граница durability
pub const MAX_DURABILITY: f32 = 100.0;
/// Ширина occupancy mask (один u64)
pub const RAIL_MASK_WIDTH: i32 = 64;

/// Ошибки загрузки конфигов и таблиц шаблонов
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse RON: {0}")]
    Parse(String),

    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Глобальные параметры оружия (resource)
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    /// Ёмкость магазина, если шаблон не задаёт `MagazineType`
    pub magazine_capacity: usize,
    /// Чем заряжается магазин при установке из графа
    pub preload_bullet: BulletType,
    /// Износ за выстрел
    pub durability_per_shot: f32,
    /// Режим агрегации, когда caller не указал свой
    pub default_durability_mode: DurabilityMode,
    /// Шаг sweep'а вдоль rail path (world units)
    pub rail_sweep_step: f32,
    /// Раздувание bounds кандидата для overlap-теста ("почти касается" = пересекается)
    pub overlap_inflation: f32,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            magazine_capacity: 30,
            preload_bullet: BulletType::StandardFmj,
            durability_per_shot: 0.5,
            default_durability_mode: DurabilityMode::Average,
            rail_sweep_step: 2.5,
            overlap_inflation: 1.2,
        }
    }
}

impl WeaponConfig {
    /// Распарсить из RON строки
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Прочитать RON файл
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_ron_str(&source)
    }

    /// Проверить инварианты (sweep обязан двигаться вперёд, иначе не завершится)
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.magazine_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "magazine_capacity",
                reason: "must be > 0".into(),
            });
        }
        if !(self.rail_sweep_step > 0.0) {
            return Err(ConfigError::Invalid {
                field: "rail_sweep_step",
                reason: format!("must be > 0, got {}", self.rail_sweep_step),
            });
        }
        if !(self.durability_per_shot >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "durability_per_shot",
                reason: format!("must be >= 0, got {}", self.durability_per_shot),
            });
        }
        if !(self.overlap_inflation > 0.0) {
            return Err(ConfigError::Invalid {
                field: "overlap_inflation",
                reason: format!("must be > 0, got {}", self.overlap_inflation),
            });
        }
        Ok(())
    }
}
