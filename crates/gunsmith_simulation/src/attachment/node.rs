//! AttachmentNode + arena
//!
//! Узлы живут в arena и адресуются `NodeId` (index + generation).
//! Parent владеет детьми через `ChildLink::instances`; обратная связь
//! хранится отдельным side-index'ом в графе, не в узле.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{
    AttachmentCategory, AttachmentTemplate, ChildLinkTemplate, MeshHandle, PartKind, SlotAllocator, SlotRange,
    TemplateId,
};
use crate::ammo::MagazineType;
use crate::weapon::StatModifier;

// ============================================================================
// NodeId
// ============================================================================

/// Stable handle узла. Generation отсекает stale handle после destroy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect, Serialize, Deserialize)]
pub struct NodeId {
    pub index: u32,
    pub generation: u32,
}

// ============================================================================
// Node parts
// ============================================================================

/// Capability узла
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Generic,
    Rail(SlotAllocator),
    Barrel { pellets_per_shell: u8 },
    Magazine { magazine_type: Option<MagazineType> },
}

impl NodeKind {
    fn from_template(kind: &PartKind) -> Self {
        match kind {
            PartKind::Generic => NodeKind::Generic,
            PartKind::Rail(rail) => {
                NodeKind::Rail(SlotAllocator::new(rail.num_slots, rail.slot_spacing, rail.path.clone()))
            }
            PartKind::Barrel { pellets_per_shell } => NodeKind::Barrel {
                pellets_per_shell: (*pellets_per_shell).max(1),
            },
            PartKind::Magazine { magazine_type } => NodeKind::Magazine {
                magazine_type: *magazine_type,
            },
        }
    }
}

/// Куда узел смонтирован
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mount {
    /// Корень: mount point оружия, identity offset
    WeaponRoot,
    /// Socket parent mesh'а (+ offset link'а)
    Socket { parent: NodeId, socket: &'static str },
    /// Слот(ы) на планке parent'а
    Rail { parent: NodeId, range: SlotRange },
}

impl Mount {
    pub fn parent(&self) -> Option<NodeId> {
        match self {
            Mount::WeaponRoot => None,
            Mount::Socket { parent, .. } | Mount::Rail { parent, .. } => Some(*parent),
        }
    }
}

/// Исходящая связь + живые экземпляры детей
#[derive(Debug, Clone, PartialEq)]
pub struct ChildLink {
    pub children: Vec<TemplateId>,
    pub offset: Transform,
    pub start_slot: i32,
    /// Пусто до build
    pub instances: Vec<NodeId>,
}

impl ChildLink {
    pub fn from_template(link: &ChildLinkTemplate) -> Self {
        Self {
            children: link.children.clone(),
            offset: link.offset,
            start_slot: link.start_slot,
            instances: Vec::new(),
        }
    }

    /// Связь без шаблонов: экземпляры подключаются вручную (`connect`)
    pub fn manual(offset: Transform) -> Self {
        Self {
            children: Vec::new(),
            offset,
            start_slot: 0,
            instances: Vec::new(),
        }
    }
}

// ============================================================================
// AttachmentNode
// ============================================================================

/// Runtime экземпляр части
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentNode {
    pub template: TemplateId,
    pub category: AttachmentCategory,
    pub mesh: MeshHandle,
    pub size: i32,
    /// Слот на планке (после rail placement - фактический)
    pub start_position: i32,
    pub use_rail: bool,
    /// Mutable, стартует с шаблонной
    pub durability: f32,
    pub modifiers: Vec<StatModifier>,
    pub bounds: Vec3,
    pub links: Vec<ChildLink>,
    pub kind: NodeKind,

    /// None пока не смонтирован
    pub mount: Option<Mount>,
    /// Относительно parent'а (или mount point'а оружия)
    pub local_transform: Transform,
}

impl AttachmentNode {
    pub fn from_template(template: &AttachmentTemplate) -> Self {
        Self {
            template: template.id.clone(),
            category: template.category,
            mesh: template.mesh,
            size: template.size,
            start_position: template.start_slot,
            use_rail: template.use_rail,
            durability: template.durability,
            modifiers: template.modifiers.clone(),
            bounds: template.bounds,
            links: template.links.iter().map(ChildLink::from_template).collect(),
            kind: NodeKind::from_template(&template.kind),
            mount: None,
            local_transform: Transform::IDENTITY,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.mount.is_some()
    }

    pub fn rail(&self) -> Option<&SlotAllocator> {
        match &self.kind {
            NodeKind::Rail(allocator) => Some(allocator),
            _ => None,
        }
    }

    pub fn rail_mut(&mut self) -> Option<&mut SlotAllocator> {
        match &mut self.kind {
            NodeKind::Rail(allocator) => Some(allocator),
            _ => None,
        }
    }

    /// Все живые дети по всем links
    pub fn child_instances(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.links.iter().flat_map(|link| link.instances.iter().copied())
    }
}

// ============================================================================
// NodeArena
// ============================================================================

#[derive(Debug, Clone, Default)]
struct ArenaSlot {
    generation: u32,
    node: Option<AttachmentNode>,
}

/// Хранилище узлов с переиспользованием индексов
#[derive(Debug, Clone, Default)]
pub struct NodeArena {
    slots: Vec<ArenaSlot>,
    free: Vec<u32>,
    len: usize,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: AttachmentNode) -> NodeId {
        self.len += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(ArenaSlot {
            generation: 0,
            node: Some(node),
        });
        NodeId { index, generation: 0 }
    }

    pub fn get(&self, id: NodeId) -> Option<&AttachmentNode> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut AttachmentNode> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Destroy: generation++ → старые handle больше не резолвятся
    pub fn remove(&mut self, id: NodeId) -> Option<AttachmentNode> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Some(node)
    }

    pub fn clear(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.node.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
            }
        }
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.node.as_ref().map(|_| NodeId {
                index: index as u32,
                generation: slot.generation,
            })
        })
    }
}
