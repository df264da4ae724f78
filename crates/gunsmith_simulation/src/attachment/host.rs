//! Host seams: sockets, 3D overlap, контекст сборки
//!
//! Граф не знает ни про mesh'и, ни про физику. Хост отвечает на два вопроса:
//! есть ли socket на mesh'е и пересекается ли кандидат с чем-то в мире.
//! Default реализации (resources) покрывают headless сборку и тесты.

use std::collections::HashMap;

use bevy::math::bounding::{Aabb3d, IntersectsVolume};
use bevy::prelude::*;

use super::{meshes, MeshHandle, NodeId, TemplateLookup};
use crate::config::WeaponConfig;

// ============================================================================
// Traits
// ============================================================================

/// Socket'ы mesh'а
pub trait SocketQuery {
    /// Transform socket'а относительно mesh'а, None если socket'а нет
    fn socket_transform(&self, mesh: MeshHandle, socket: &str) -> Option<Transform>;

    fn has_socket(&self, mesh: MeshHandle, socket: &str) -> bool {
        self.socket_transform(mesh, socket).is_some()
    }
}

/// 3D overlap предикат (weapon space)
pub trait OverlapQuery {
    /// `true` если кандидат с `half_extents` пересекается с чем-то, кроме `ignore`
    fn overlaps(&self, candidate: &Transform, half_extents: Vec3, ignore: &[NodeId]) -> bool;
}

/// Всё, что нужно графу на время одного build
pub struct BuildContext<'a> {
    pub templates: &'a dyn TemplateLookup,
    pub sockets: &'a dyn SocketQuery,
    pub overlap: &'a dyn OverlapQuery,
    pub config: &'a WeaponConfig,
}

impl<'a> BuildContext<'a> {
    pub fn new(
        templates: &'a dyn TemplateLookup,
        sockets: &'a dyn SocketQuery,
        overlap: &'a dyn OverlapQuery,
        config: &'a WeaponConfig,
    ) -> Self {
        Self {
            templates,
            sockets,
            overlap,
            config,
        }
    }
}

// ============================================================================
// MeshSockets
// ============================================================================

/// Таблица socket'ов по mesh handle (resource)
#[derive(Resource, Debug, Clone, Default)]
pub struct MeshSockets {
    sockets: HashMap<MeshHandle, HashMap<String, Transform>>,
}

impl MeshSockets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, mesh: MeshHandle, socket: &str, transform: Transform) {
        self.sockets
            .entry(mesh)
            .or_default()
            .insert(socket.to_string(), transform);
    }

    /// Builder
    pub fn with(mut self, mesh: u32, socket: &str, translation: Vec3) -> Self {
        self.insert(MeshHandle(mesh), socket, Transform::from_translation(translation));
        self
    }

    /// Socket'ы mesh'ей default AR набора
    pub fn rifle() -> Self {
        Self::new()
            // Upper
            .with(meshes::UPPER, "Barrel", Vec3::new(0.0, 0.0, 30.0))
            .with(meshes::UPPER, "Rail", Vec3::new(0.0, 4.0, -10.0))
            .with(meshes::UPPER, "ChargingHandle", Vec3::new(0.0, 2.0, -18.0))
            // Lower
            .with(meshes::LOWER, "Magazine", Vec3::new(0.0, -6.0, 2.0))
            .with(meshes::LOWER, "Stock", Vec3::new(0.0, 0.0, -25.0))
            .with(meshes::LOWER, "HandGrip", Vec3::new(0.0, -5.0, -8.0))
            // Barrels
            .with(meshes::BARREL, "MuzzleDevice", Vec3::new(0.0, 0.0, 40.0))
            .with(meshes::BARREL, "Suppressor", Vec3::new(0.0, 0.0, 40.0))
            .with(meshes::SHOTGUN_BARREL, "MuzzleDevice", Vec3::new(0.0, 0.0, 45.0))
            // Rail: y socket'а задаёт высоту всех rail-кандидатов
            .with(meshes::TOP_RAIL, "Optic", Vec3::new(0.0, 1.5, 0.0))
            .with(meshes::TOP_RAIL, "Laser", Vec3::new(0.0, 1.5, 0.0))
    }
}

impl SocketQuery for MeshSockets {
    fn socket_transform(&self, mesh: MeshHandle, socket: &str) -> Option<Transform> {
        self.sockets.get(&mesh)?.get(socket).copied()
    }
}

// ============================================================================
// StaticObstacles
// ============================================================================

/// Axis-aligned препятствие (weapon space)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    /// Узел, которому принадлежит препятствие (для ignore-set)
    pub owner: Option<NodeId>,
    pub center: Vec3,
    pub half_extents: Vec3,
}

/// Набор AABB препятствий (resource). Пустой = ничего не пересекается
#[derive(Resource, Debug, Clone, Default)]
pub struct StaticObstacles {
    obstacles: Vec<Obstacle>,
}

impl StaticObstacles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    pub fn with_box(mut self, center: Vec3, half_extents: Vec3) -> Self {
        self.add(Obstacle {
            owner: None,
            center,
            half_extents,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }
}

impl OverlapQuery for StaticObstacles {
    fn overlaps(&self, candidate: &Transform, half_extents: Vec3, ignore: &[NodeId]) -> bool {
        self.obstacles
            .iter()
            .filter(|obstacle| obstacle.owner.is_none_or(|owner| !ignore.contains(&owner)))
            .any(|obstacle| {
                boxes_intersect(candidate.translation, half_extents, obstacle.center, obstacle.half_extents)
            })
    }
}

/// AABB пересечение (касание считается пересечением)
pub fn boxes_intersect(a_center: Vec3, a_half: Vec3, b_center: Vec3, b_half: Vec3) -> bool {
    Aabb3d::new(a_center, a_half).intersects(&Aabb3d::new(b_center, b_half))
}
