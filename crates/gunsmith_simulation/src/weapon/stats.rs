//! Weapon stats + модификаторы от частей
//!
//! Порядок применения фиксирован: все Flat, затем все Percentage,
//! затем Override (последний побеждает). Порядок частей на результат
//! влияет только для Override.

use std::collections::BTreeMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Стат оружия, на который может влиять часть
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Reflect, Serialize, Deserialize)]
pub enum WeaponStat {
    // === Recoil ===
    VerticalRecoil,
    HorizontalRecoil,
    CameraRecoil,

    // === Handling ===
    Ergonomics,
    Weight,

    // === Ballistics ===
    Accuracy,
    MuzzleVelocity,
    Range,
    RoundsPerMinute,

    // === Spread ===
    Convergence,
    Dispersion,
}

/// Как модификатор применяется к стату
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub enum StatModType {
    /// `value` прибавляется
    Flat,
    /// Множитель (0.85 = -15%)
    Percentage,
    /// Полная замена
    Override,
}

#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub struct StatModifier {
    pub stat: WeaponStat,
    pub mode: StatModType,
    pub value: f32,
}

impl StatModifier {
    pub fn flat(stat: WeaponStat, value: f32) -> Self {
        Self { stat, mode: StatModType::Flat, value }
    }

    pub fn percentage(stat: WeaponStat, value: f32) -> Self {
        Self { stat, mode: StatModType::Percentage, value }
    }

    pub fn override_with(stat: WeaponStat, value: f32) -> Self {
        Self { stat, mode: StatModType::Override, value }
    }
}

/// Набор статов оружия (отсутствующий стат == 0.0)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeaponStats {
    values: BTreeMap<WeaponStat, f32>,
}

impl WeaponStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder
    pub fn with(mut self, stat: WeaponStat, value: f32) -> Self {
        self.values.insert(stat, value);
        self
    }

    pub fn get(&self, stat: WeaponStat) -> f32 {
        self.values.get(&stat).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, stat: WeaponStat, value: f32) {
        self.values.insert(stat, value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (WeaponStat, f32)> + '_ {
        self.values.iter().map(|(stat, value)| (*stat, *value))
    }

    /// Базовые статы штурмовой винтовки
    pub fn rifle_base() -> Self {
        Self::new()
            .with(WeaponStat::VerticalRecoil, 120.0)
            .with(WeaponStat::HorizontalRecoil, 300.0)
            .with(WeaponStat::CameraRecoil, 5.0)
            .with(WeaponStat::Ergonomics, 40.0)
            .with(WeaponStat::Weight, 2.8)
            .with(WeaponStat::Accuracy, 3.5)
            .with(WeaponStat::MuzzleVelocity, 715.0)
            .with(WeaponStat::Range, 400.0)
            .with(WeaponStat::RoundsPerMinute, 600.0)
            .with(WeaponStat::Convergence, 1.0)
            .with(WeaponStat::Dispersion, 5.0)
    }

    /// Применить модификаторы к `base`
    pub fn aggregate<'a>(base: &WeaponStats, modifiers: impl IntoIterator<Item = &'a StatModifier>) -> WeaponStats {
        let modifiers: Vec<&StatModifier> = modifiers.into_iter().collect();
        let mut result = base.clone();

        for modifier in modifiers.iter().filter(|m| m.mode == StatModType::Flat) {
            let value = result.get(modifier.stat) + modifier.value;
            result.set(modifier.stat, value);
        }

        for modifier in modifiers.iter().filter(|m| m.mode == StatModType::Percentage) {
            let value = result.get(modifier.stat) * modifier.value;
            result.set(modifier.stat, value);
        }

        for modifier in modifiers.iter().filter(|m| m.mode == StatModType::Override) {
            result.set(modifier.stat, modifier.value);
        }

        result
    }
}
