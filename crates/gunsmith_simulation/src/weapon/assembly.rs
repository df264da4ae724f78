//! WeaponAssembly - фасад: граф частей + FireController + authority
//!
//! # Authority
//!
//! Мутирует только `NetRole::Authority`. Proxy кладёт `WeaponIntent` в
//! очередь (`drain_pending`), транспорт доставляет его authority, тот
//! применяет через `submit`. Результат proxy видит только через
//! `WeaponSnapshot` (`apply_snapshot`).
//!
//! # Events
//!
//! Каждое применённое изменение кладёт `WeaponEvent` в outbox
//! (`drain_events`) и увеличивает `revision`.

use bevy::prelude::*;

use super::durability::aggregate_durability;
use super::{
    DurabilityMode, FireController, ObservedWeapon, ReloadStage, StageOutcome, WeaponSnapshot, WeaponStats,
};
use crate::ammo::{BulletType, Magazine};
use crate::attachment::{AttachmentGraph, BuildContext, GraphBuilt, NodeId, NodeKind, TemplateId};
use crate::config::WeaponConfig;
use crate::error::AssemblyError;
use crate::logger::{log, log_warning};

/// Кто владеет состоянием оружия
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum NetRole {
    #[default]
    Authority,
    Proxy,
}

/// Запрос на изменение (proxy → authority)
#[derive(Debug, Clone, PartialEq)]
pub enum WeaponIntent {
    Build { roots: Vec<TemplateId> },
    Clear,
    Fire,
    ReloadMagazine(Option<Magazine>),
    BeginReload,
    ProcessReloadStage { stage: ReloadStage, magazine: Option<Magazine> },
    CancelReload,
    ModifyDurability(f32),
}

/// Результат `submit`
#[derive(Debug, Clone, PartialEq)]
pub enum IntentOutcome {
    /// Proxy: запрос ушёл authority
    Pending,
    Built(GraphBuilt),
    Cleared(usize),
    Fired(Vec<BulletType>),
    /// Предыдущий магазин
    MagazineSwapped(Option<Magazine>),
    ReloadBegun(ReloadStage),
    Stage(StageOutcome),
    Cancelled,
    Durability(f32),
}

/// Что изменилось (outbox)
#[derive(Debug, Clone, PartialEq)]
pub enum WeaponEvent {
    GraphBuilt(Vec<NodeId>),
    GraphCleared,
    Fired(Vec<BulletType>),
    ReloadStageChanged(ReloadStage),
    MagazineChanged { attached: bool },
    DurabilityChanged(f32),
}

#[derive(Debug, Clone)]
pub struct WeaponAssembly {
    role: NetRole,
    config: WeaponConfig,
    graph: AttachmentGraph,
    fire: FireController,
    revision: u64,
    pending: Vec<WeaponIntent>,
    events: Vec<WeaponEvent>,
    observed: ObservedWeapon,
}

impl WeaponAssembly {
    pub fn new(role: NetRole, config: WeaponConfig) -> Self {
        Self {
            role,
            fire: FireController::new(&config),
            config,
            graph: AttachmentGraph::new(),
            revision: 0,
            pending: Vec::new(),
            events: Vec::new(),
            observed: ObservedWeapon::new(),
        }
    }

    pub fn authority(config: WeaponConfig) -> Self {
        Self::new(NetRole::Authority, config)
    }

    pub fn proxy(config: WeaponConfig) -> Self {
        Self::new(NetRole::Proxy, config)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn role(&self) -> NetRole {
        self.role
    }

    pub fn is_authority(&self) -> bool {
        self.role == NetRole::Authority
    }

    pub fn config(&self) -> &WeaponConfig {
        &self.config
    }

    pub fn graph(&self) -> &AttachmentGraph {
        &self.graph
    }

    pub fn fire_controller(&self) -> &FireController {
        &self.fire
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn spawned(&self) -> &[NodeId] {
        self.graph.spawned()
    }

    /// Aggregate durability частей (None → режим из конфига). 0 без частей
    pub fn durability(&self, mode: Option<DurabilityMode>) -> f32 {
        let mode = mode.unwrap_or(self.config.default_durability_mode);
        aggregate_durability(self.graph.spawned_nodes().map(|node| node.durability), mode)
    }

    /// Рабочая durability оружия (падает при стрельбе)
    pub fn weapon_durability(&self) -> f32 {
        self.fire.durability()
    }

    /// Base stats + модификаторы смонтированных частей
    pub fn stats(&self, base: &WeaponStats) -> WeaponStats {
        WeaponStats::aggregate(base, self.graph.modifiers())
    }

    /// Состояние для репликации (только authority)
    pub fn snapshot(&self) -> WeaponSnapshot {
        WeaponSnapshot {
            revision: self.revision,
            ammo_count: self.fire.ammo_count(),
            reload_stage: self.fire.reload_stage(),
            magazine_attached: self.fire.is_magazine_attached(),
            durability: self.fire.durability(),
        }
    }

    /// Authority: своё состояние; proxy: последний полученный snapshot
    pub fn view(&self) -> WeaponSnapshot {
        match self.role {
            NetRole::Authority => self.snapshot(),
            NetRole::Proxy => self.observed.view(),
        }
    }

    /// Proxy: применить snapshot от authority. `false` для stale / на authority
    pub fn apply_snapshot(&mut self, snapshot: WeaponSnapshot) -> bool {
        if self.is_authority() {
            log_warning("apply_snapshot ignored: authority owns the state");
            return false;
        }
        self.observed.apply(snapshot)
    }

    pub fn drain_events(&mut self) -> Vec<WeaponEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn drain_pending(&mut self) -> Vec<WeaponIntent> {
        std::mem::take(&mut self.pending)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    // ========================================================================
    // Intent dispatch
    // ========================================================================

    /// Применить (authority) или поставить в очередь (proxy)
    pub fn submit(&mut self, intent: WeaponIntent, ctx: &BuildContext) -> IntentOutcome {
        if !self.is_authority() {
            self.forward(intent);
            return IntentOutcome::Pending;
        }

        match intent {
            WeaponIntent::Build { roots } => IntentOutcome::Built(self.apply_build(&roots, ctx)),
            WeaponIntent::Clear => IntentOutcome::Cleared(self.apply_clear()),
            WeaponIntent::Fire => IntentOutcome::Fired(self.apply_fire()),
            WeaponIntent::ReloadMagazine(magazine) => {
                IntentOutcome::MagazineSwapped(self.apply_reload_magazine(magazine))
            }
            WeaponIntent::BeginReload => IntentOutcome::ReloadBegun(self.apply_begin_reload()),
            WeaponIntent::ProcessReloadStage { stage, magazine } => {
                IntentOutcome::Stage(self.apply_process_stage(stage, magazine))
            }
            WeaponIntent::CancelReload => {
                self.apply_cancel_reload();
                IntentOutcome::Cancelled
            }
            WeaponIntent::ModifyDurability(delta) => IntentOutcome::Durability(self.apply_modify_durability(delta)),
        }
    }

    fn forward(&mut self, intent: WeaponIntent) {
        log(&format!("{}: {:?}", AssemblyError::AuthorityViolation, intent));
        self.pending.push(intent);
    }

    // ========================================================================
    // Convenience API (gated)
    // ========================================================================

    /// None на proxy (запрос ушёл authority)
    pub fn build(&mut self, roots: &[TemplateId], ctx: &BuildContext) -> Option<GraphBuilt> {
        if !self.is_authority() {
            self.forward(WeaponIntent::Build { roots: roots.to_vec() });
            return None;
        }
        Some(self.apply_build(roots, ctx))
    }

    /// Connected стратегия. Handles узлов локальны → на proxy не форвардится
    pub fn build_connected(&mut self, roots: &[NodeId], ctx: &BuildContext) -> Option<GraphBuilt> {
        if !self.is_authority() {
            log_warning(&format!("build_connected refused: {}", AssemblyError::AuthorityViolation));
            return None;
        }
        let built = self.graph.build_connected(roots, ctx);
        self.after_build(&built);
        Some(built)
    }

    /// Доступ к графу для ручной сборки (`instantiate` / `connect`)
    pub fn graph_mut(&mut self) -> Option<&mut AttachmentGraph> {
        if !self.is_authority() {
            return None;
        }
        Some(&mut self.graph)
    }

    pub fn clear(&mut self) -> usize {
        if !self.is_authority() {
            self.forward(WeaponIntent::Clear);
            return 0;
        }
        self.apply_clear()
    }

    pub fn fire(&mut self) -> Vec<BulletType> {
        if !self.is_authority() {
            self.forward(WeaponIntent::Fire);
            return Vec::new();
        }
        self.apply_fire()
    }

    pub fn reload_magazine(&mut self, magazine: Option<Magazine>) -> Option<Magazine> {
        if !self.is_authority() {
            self.forward(WeaponIntent::ReloadMagazine(magazine));
            return None;
        }
        self.apply_reload_magazine(magazine)
    }

    pub fn begin_staged_reload(&mut self) -> Option<ReloadStage> {
        if !self.is_authority() {
            self.forward(WeaponIntent::BeginReload);
            return None;
        }
        Some(self.apply_begin_reload())
    }

    pub fn process_stage(&mut self, stage: ReloadStage, magazine: Option<Magazine>) -> Option<StageOutcome> {
        if !self.is_authority() {
            self.forward(WeaponIntent::ProcessReloadStage { stage, magazine });
            return None;
        }
        Some(self.apply_process_stage(stage, magazine))
    }

    pub fn cancel_reload(&mut self) {
        if !self.is_authority() {
            self.forward(WeaponIntent::CancelReload);
            return;
        }
        self.apply_cancel_reload();
    }

    pub fn modify_durability(&mut self, delta: f32) -> Option<f32> {
        if !self.is_authority() {
            self.forward(WeaponIntent::ModifyDurability(delta));
            return None;
        }
        Some(self.apply_modify_durability(delta))
    }

    // ========================================================================
    // Authority-side mutations
    // ========================================================================

    fn apply_build(&mut self, roots: &[TemplateId], ctx: &BuildContext) -> GraphBuilt {
        let built = self.graph.build(roots, ctx);
        self.after_build(&built);
        built
    }

    fn after_build(&mut self, built: &GraphBuilt) {
        self.index_weapon_state();

        if !built.nodes.is_empty() {
            let seeded = self.durability(None);
            self.fire.set_durability(seeded);
        }

        self.push_event(WeaponEvent::GraphBuilt(built.nodes.clone()));
    }

    /// Первый ствол / магазин среди смонтированных частей
    fn index_weapon_state(&mut self) {
        let mut barrel = None;
        let mut magazine = None;

        for node in self.graph.spawned_nodes() {
            match node.kind {
                NodeKind::Barrel { pellets_per_shell } if barrel.is_none() => barrel = Some(pellets_per_shell),
                NodeKind::Magazine { magazine_type } if magazine.is_none() => magazine = Some(magazine_type),
                _ if barrel.is_none() && node.category.is_barrel_like() => barrel = Some(1),
                _ if magazine.is_none() && node.category.is_magazine_like() => magazine = Some(None),
                _ => {}
            }
        }

        match barrel {
            Some(pellets) => self.fire.install_barrel(pellets),
            None => {
                let lost = self.fire.remove_barrel();
                if !lost.is_empty() {
                    log_warning(&format!("No barrel after build: {} chambered round(s) dropped", lost.len()));
                }
            }
        }

        if let Some(magazine_type) = magazine {
            if !self.fire.is_magazine_attached() {
                let mut loaded = match magazine_type {
                    Some(magazine_type) => Magazine::new(magazine_type),
                    None => Magazine::with_capacity(self.config.magazine_capacity),
                };
                loaded.fill(self.config.preload_bullet);
                self.fire.reload_magazine(Some(loaded));
            }
        }
    }

    fn apply_clear(&mut self) -> usize {
        let detached = self.graph.clear();
        self.fire.remove_barrel();
        self.push_event(WeaponEvent::GraphCleared);
        detached
    }

    fn apply_fire(&mut self) -> Vec<BulletType> {
        let rounds = self.fire.fire();
        if !rounds.is_empty() {
            self.push_event(WeaponEvent::Fired(rounds.clone()));
        }
        rounds
    }

    fn apply_reload_magazine(&mut self, magazine: Option<Magazine>) -> Option<Magazine> {
        let previous = self.fire.reload_magazine(magazine);
        self.push_event(WeaponEvent::MagazineChanged {
            attached: self.fire.is_magazine_attached(),
        });
        previous
    }

    fn apply_begin_reload(&mut self) -> ReloadStage {
        let stage = self.fire.begin_staged_reload();
        self.push_event(WeaponEvent::ReloadStageChanged(stage));
        stage
    }

    fn apply_process_stage(&mut self, stage: ReloadStage, magazine: Option<Magazine>) -> StageOutcome {
        let attached_before = self.fire.is_magazine_attached();
        let outcome = self.fire.process_stage(stage, magazine);

        if self.fire.is_magazine_attached() != attached_before || outcome.ejected.is_some() {
            self.push_event(WeaponEvent::MagazineChanged {
                attached: self.fire.is_magazine_attached(),
            });
        }
        self.push_event(WeaponEvent::ReloadStageChanged(outcome.next));
        outcome
    }

    fn apply_cancel_reload(&mut self) {
        self.fire.cancel_reload();
        self.push_event(WeaponEvent::ReloadStageChanged(ReloadStage::None));
    }

    fn apply_modify_durability(&mut self, delta: f32) -> f32 {
        let value = self.fire.modify_durability(delta);
        self.push_event(WeaponEvent::DurabilityChanged(value));
        value
    }

    fn push_event(&mut self, event: WeaponEvent) {
        self.revision += 1;
        self.events.push(event);
    }
}
