//! FireController - выстрел, досылание, staged reload
//!
//! # Состояние
//!
//! - `chamber: Option<ChamberState>` - None = ствола нет (отличается от пустого патронника)
//! - `magazine: Option<Magazine>` - присоединённый магазин (значение, не ссылка)
//! - `reload_stage` - шаг staged reload
//! - `durability` - рабочая durability оружия [0, 100]
//!
//! # Reload flow
//!
//! ```text
//! None ──begin──▶ RemoveMagazine ──▶ InsertMagazine ──▶ RackHandle ──▶ None
//!        (нет магазина: сразу InsertMagazine)   └── патрон в патроннике ──▶ None
//! ```

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::durability::clamp_durability;
use crate::ammo::{BulletType, ChamberState, Magazine};
use crate::config::{WeaponConfig, MAX_DURABILITY};
use crate::error::AssemblyError;
use crate::logger::{log, log_warning};

/// Шаг staged reload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect, Serialize, Deserialize)]
pub enum ReloadStage {
    #[default]
    None,
    RemoveMagazine,
    InsertMagazine,
    RackHandle,
}

/// Результат одного шага reload
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StageOutcome {
    pub next: ReloadStage,
    /// Магазин, который сняли с оружия (отдаётся caller'у)
    pub ejected: Option<Magazine>,
    /// Новый магазин, переданный не на том шаге (возвращается нетронутым)
    pub unused: Option<Magazine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FireController {
    chamber: Option<ChamberState>,
    pellets_per_shell: u8,
    magazine: Option<Magazine>,
    reload_stage: ReloadStage,
    durability: f32,
    durability_per_shot: f32,
}

impl Default for FireController {
    fn default() -> Self {
        Self::new(&WeaponConfig::default())
    }
}

impl FireController {
    pub fn new(config: &WeaponConfig) -> Self {
        Self {
            chamber: None,
            pellets_per_shell: 1,
            magazine: None,
            reload_stage: ReloadStage::None,
            durability: MAX_DURABILITY,
            durability_per_shot: config.durability_per_shot,
        }
    }

    // ========================================================================
    // Barrel / chamber
    // ========================================================================

    /// Поставить ствол (патронник пуст, если ствола не было)
    pub fn install_barrel(&mut self, pellets_per_shell: u8) {
        self.pellets_per_shell = pellets_per_shell.max(1);
        if self.chamber.is_none() {
            self.chamber = Some(ChamberState::new());
        }
    }

    /// Снять ствол, вернуть патроны из патронника
    pub fn remove_barrel(&mut self) -> Vec<BulletType> {
        self.chamber
            .take()
            .map(|mut chamber| chamber.take_rounds())
            .unwrap_or_default()
    }

    pub fn has_barrel(&self) -> bool {
        self.chamber.is_some()
    }

    pub fn chamber(&self) -> Option<&ChamberState> {
        self.chamber.as_ref()
    }

    pub fn is_chambered(&self) -> bool {
        self.chamber.as_ref().is_some_and(ChamberState::has_round)
    }

    pub fn pellets_per_shell(&self) -> u8 {
        self.pellets_per_shell
    }

    // ========================================================================
    // Magazine
    // ========================================================================

    pub fn magazine(&self) -> Option<&Magazine> {
        self.magazine.as_ref()
    }

    pub fn magazine_mut(&mut self) -> Option<&mut Magazine> {
        self.magazine.as_mut()
    }

    pub fn is_magazine_attached(&self) -> bool {
        self.magazine.is_some()
    }

    /// Патроны в магазине (0 без магазина)
    pub fn ammo_count(&self) -> usize {
        self.magazine.as_ref().map_or(0, Magazine::ammo_count)
    }

    /// Заменить магазин (None = снять). Возвращает предыдущий
    pub fn reload_magazine(&mut self, magazine: Option<Magazine>) -> Option<Magazine> {
        let previous = std::mem::replace(&mut self.magazine, magazine);
        log(&format!(
            "Magazine {} (ammo={})",
            if self.magazine.is_some() { "attached" } else { "detached" },
            self.ammo_count()
        ));
        previous
    }

    // ========================================================================
    // Durability
    // ========================================================================

    pub fn durability(&self) -> f32 {
        self.durability
    }

    pub fn set_durability(&mut self, value: f32) {
        self.durability = clamp_durability(value);
    }

    pub fn modify_durability(&mut self, delta: f32) -> f32 {
        self.set_durability(self.durability + delta);
        self.durability
    }

    // ========================================================================
    // Fire
    // ========================================================================

    /// Выстрел. Пустой Vec = dry fire (durability не трогаем)
    pub fn fire(&mut self) -> Vec<BulletType> {
        if self.is_chambered() || self.try_chamber_from_magazine() {
            return self.discharge();
        }

        log("Dry fire: nothing chambered");
        Vec::new()
    }

    fn discharge(&mut self) -> Vec<BulletType> {
        let rounds = self
            .chamber
            .as_mut()
            .map(ChamberState::take_rounds)
            .unwrap_or_default();

        self.try_chamber_from_magazine();
        self.modify_durability(-self.durability_per_shot);

        log(&format!(
            "Fired {} round(s), ammo={}, durability={:.1}",
            rounds.len(),
            self.ammo_count(),
            self.durability
        ));
        rounds
    }

    /// Дослать патрон из магазина. `true` если в патроннике что-то есть
    pub fn try_chamber_from_magazine(&mut self) -> bool {
        match self.chamber_from_magazine() {
            Ok(()) => true,
            Err(error) => {
                log(&format!("Chambering skipped: {}", error));
                false
            }
        }
    }

    fn chamber_from_magazine(&mut self) -> Result<(), AssemblyError> {
        let pellets = self.pellets_per_shell as usize;
        let chamber = self
            .chamber
            .as_mut()
            .ok_or(AssemblyError::MissingCollaborator("barrel"))?;
        if chamber.has_round() {
            return Ok(());
        }

        let magazine = self
            .magazine
            .as_mut()
            .ok_or(AssemblyError::MissingCollaborator("magazine"))?;
        if magazine.is_empty() {
            return Err(AssemblyError::BufferEmpty);
        }
        let bullet = magazine.remove_bullet().ok_or(AssemblyError::BufferEmpty)?;

        chamber.set_rounds(std::iter::repeat(bullet).take(pellets));
        Ok(())
    }

    // ========================================================================
    // Staged reload
    // ========================================================================

    pub fn reload_stage(&self) -> ReloadStage {
        self.reload_stage
    }

    /// Первый шаг: магазин есть → снять, нет → вставить
    pub fn begin_staged_reload(&mut self) -> ReloadStage {
        let next = if self.is_magazine_attached() {
            ReloadStage::RemoveMagazine
        } else {
            ReloadStage::InsertMagazine
        };

        log(&format!(
            "Begin reload: chambered={}, magazine={} → {:?}",
            self.is_chambered(),
            self.is_magazine_attached(),
            next
        ));
        self.reload_stage = next;
        next
    }

    /// Выполнить `stage`, перейти к следующему
    pub fn process_stage(&mut self, stage: ReloadStage, new_magazine: Option<Magazine>) -> StageOutcome {
        let mut outcome = StageOutcome::default();

        match stage {
            ReloadStage::RemoveMagazine => {
                outcome.ejected = self.reload_magazine(None);
                outcome.unused = new_magazine;
                outcome.next = ReloadStage::InsertMagazine;
            }
            ReloadStage::InsertMagazine => {
                if let Some(magazine) = new_magazine {
                    outcome.ejected = self.reload_magazine(Some(magazine));
                }
                outcome.next = if self.is_chambered() {
                    ReloadStage::None
                } else {
                    ReloadStage::RackHandle
                };
            }
            ReloadStage::RackHandle => {
                if !self.try_chamber_from_magazine() {
                    log_warning("Rack handle: failed to chamber a round, reload finished empty");
                }
                outcome.unused = new_magazine;
                outcome.next = ReloadStage::None;
            }
            ReloadStage::None => {
                outcome.unused = new_magazine;
                outcome.next = ReloadStage::None;
            }
        }

        log(&format!("Reload stage {:?} → {:?}", stage, outcome.next));
        self.reload_stage = outcome.next;
        outcome
    }

    /// Сбросить reload без побочных эффектов
    pub fn cancel_reload(&mut self) {
        if self.reload_stage != ReloadStage::None {
            log(&format!("Reload cancelled at {:?}", self.reload_stage));
        }
        self.reload_stage = ReloadStage::None;
    }
}
