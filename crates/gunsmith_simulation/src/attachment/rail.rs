//! Rail - occupancy bitmask + путь вдоль планки
//!
//! # Инвариант
//!
//! Бит `i` в `occupancy` выставлен ⇔ диапазон `[start, start+size)` какого-то
//! смонтированного узла покрывает слот `i`. Диапазоны не пересекаются.

use std::collections::BTreeMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::NodeId;
use crate::config::RAIL_MASK_WIDTH;

// ============================================================================
// Mask helpers
// ============================================================================

/// Непрерывная маска из `size` бит, сдвинутая на `start`.
///
/// - `size <= 0` → 0
/// - `size >= 64` → все единицы
/// - сдвиг за пределы слова → 0 (такой диапазон всё равно out of bounds)
pub fn make_mask(start: i32, size: i32) -> u64 {
    if size <= 0 {
        return 0;
    }
    if size >= RAIL_MASK_WIDTH {
        return u64::MAX;
    }
    if start < 0 {
        return 0;
    }

    let run = (1u64 << size) - 1;
    run.checked_shl(start as u32).unwrap_or(0)
}

/// Занятый диапазон слотов
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub struct SlotRange {
    pub start: i32,
    pub size: i32,
}

impl SlotRange {
    pub fn new(start: i32, size: i32) -> Self {
        Self { start, size }
    }

    pub fn mask(&self) -> u64 {
        make_mask(self.start, self.size)
    }
}

// ============================================================================
// RailPath
// ============================================================================

/// Ломаная вдоль планки, параметризованная расстоянием от начала.
///
/// Forward каждого сегмента = направление сегмента; up = +Y.
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
pub struct RailPath {
    points: Vec<Vec3>,
}

impl RailPath {
    pub fn new(points: Vec<Vec3>) -> Self {
        Self { points }
    }

    /// Прямая планка вдоль +Z
    pub fn straight(length: f32) -> Self {
        Self::new(vec![Vec3::ZERO, Vec3::new(0.0, 0.0, length.max(0.0))])
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn length(&self) -> f32 {
        self.points.windows(2).map(|pair| pair[0].distance(pair[1])).sum()
    }

    /// Точка на расстоянии `distance` (clamp к концам)
    pub fn location_at(&self, distance: f32) -> Vec3 {
        self.sample(distance).0
    }

    /// Transform на расстоянии `distance`, смотрит вдоль сегмента
    pub fn transform_at(&self, distance: f32) -> Transform {
        let (location, direction) = self.sample(distance);
        let mut transform = Transform::from_translation(location);
        if direction.length_squared() > f32::EPSILON {
            transform.look_to(direction, Vec3::Y);
        }
        transform
    }

    fn sample(&self, distance: f32) -> (Vec3, Vec3) {
        let Some(first) = self.points.first().copied() else {
            return (Vec3::ZERO, Vec3::ZERO);
        };

        let mut remaining = distance.max(0.0);
        let mut last_direction = Vec3::ZERO;

        for pair in self.points.windows(2) {
            let segment = pair[1] - pair[0];
            let segment_length = segment.length();
            if segment_length <= f32::EPSILON {
                continue;
            }
            last_direction = segment / segment_length;

            if remaining <= segment_length {
                return (pair[0] + last_direction * remaining, last_direction);
            }
            remaining -= segment_length;
        }

        let end = self.points.last().copied().unwrap_or(first);
        (end, last_direction)
    }
}

// ============================================================================
// SlotAllocator
// ============================================================================

/// Результат sweep-поиска
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotCandidate {
    pub slot: i32,
    pub distance: f32,
    pub transform: Transform,
}

/// Occupancy tracker одной планки (≤ 64 слота)
#[derive(Debug, Clone, PartialEq)]
pub struct SlotAllocator {
    num_slots: i32,
    slot_spacing: f32,
    path: RailPath,
    occupancy: u64,
    mounted: BTreeMap<NodeId, SlotRange>,
}

impl SlotAllocator {
    /// `num_slots` обрезается до [0, 64]
    pub fn new(num_slots: i32, slot_spacing: f32, path: RailPath) -> Self {
        Self {
            num_slots: num_slots.clamp(0, RAIL_MASK_WIDTH),
            slot_spacing,
            path,
            occupancy: 0,
            mounted: BTreeMap::new(),
        }
    }

    pub fn num_slots(&self) -> i32 {
        self.num_slots
    }

    pub fn slot_spacing(&self) -> f32 {
        self.slot_spacing
    }

    pub fn path(&self) -> &RailPath {
        &self.path
    }

    pub fn occupancy(&self) -> u64 {
        self.occupancy
    }

    pub fn is_mounted(&self, node: NodeId) -> bool {
        self.mounted.contains_key(&node)
    }

    pub fn range_of(&self, node: NodeId) -> Option<SlotRange> {
        self.mounted.get(&node).copied()
    }

    pub fn mounted(&self) -> impl Iterator<Item = (NodeId, SlotRange)> + '_ {
        self.mounted.iter().map(|(node, range)| (*node, *range))
    }

    pub fn can_place(&self, start: i32, size: i32) -> bool {
        if self.num_slots <= 0 {
            return false;
        }
        if start < 0 || start.saturating_add(size) > self.num_slots {
            return false;
        }
        self.occupancy & make_mask(start, size) == 0
    }

    /// `false` без изменений, если диапазон занят / вне планки / узел уже стоит
    pub fn place(&mut self, node: NodeId, range: SlotRange) -> bool {
        if self.mounted.contains_key(&node) || !self.can_place(range.start, range.size) {
            return false;
        }
        self.occupancy |= range.mask();
        self.mounted.insert(node, range);
        true
    }

    /// No-op для отсутствующего узла
    pub fn remove(&mut self, node: NodeId) {
        if let Some(range) = self.mounted.remove(&node) {
            self.occupancy &= !range.mask();
        }
    }

    /// Снять всё
    pub fn reset(&mut self) {
        self.occupancy = 0;
        self.mounted.clear();
    }

    /// Transform слота; индекс clamp'ится к [0, num_slots-1]
    pub fn slot_transform(&self, index: i32) -> Transform {
        let clamped = if self.num_slots > 0 {
            index.clamp(0, self.num_slots - 1)
        } else {
            0
        };
        self.path.transform_at(clamped as f32 * self.slot_spacing)
    }

    /// Ближайший слот к расстоянию вдоль path
    pub fn slot_from_distance(&self, distance: f32) -> i32 {
        if self.num_slots <= 0 || self.slot_spacing <= 0.0 {
            return 0;
        }
        let slot = (distance / self.slot_spacing).round() as i32;
        slot.clamp(0, self.num_slots - 1)
    }

    /// Sweep вдоль path с шагом `step`: первый слот, который в пределах
    /// планки, свободен и проходит `accept` (socket + 3D overlap у caller'а).
    ///
    /// Расстояние sweep'а только выбирает слот; `transform` кандидата
    /// (и то, что видит `accept`) всегда `slot_transform(slot)`, так что
    /// позиция части совпадает с её битами в occupancy.
    ///
    /// Кандидатов не больше `floor(length / step) + 1`.
    pub fn find_slot(
        &self,
        size: i32,
        step: f32,
        mut accept: impl FnMut(i32, &Transform) -> bool,
    ) -> Option<SlotCandidate> {
        if !(step > 0.0) {
            return None;
        }

        let length = self.path.length();
        let steps = (length / step).floor() as i32;

        for i in 0..=steps.max(0) {
            let distance = i as f32 * step;
            let slot = self.slot_from_distance(distance);
            if !self.can_place(slot, size) {
                continue;
            }

            let transform = self.slot_transform(slot);
            if accept(slot, &transform) {
                return Some(SlotCandidate { slot, distance, transform });
            }
        }

        None
    }
}
