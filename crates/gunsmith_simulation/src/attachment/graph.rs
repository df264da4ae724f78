//! AttachmentGraph - дерево частей: spawn / attach / detach / destroy
//!
//! # Архитектура
//!
//! - Узлы в `NodeArena`, parent владеет детьми через `ChildLink::instances`
//! - `parents` - side-index для обратного lookup (child → parent)
//! - `spawned` - зарегистрированные (смонтированные) узлы в порядке BFS
//!
//! # Стратегии сборки
//!
//! - `build(root_templates)` - clear + spawn из шаблонов по ходу BFS
//! - `build_connected(root_nodes)` - граф уже собран через `instantiate` +
//!   `connect`, BFS только монтирует
//!
//! Обе идут через один placement pipeline. Плохая ветка не прерывает build:
//! узел, который не встал, уничтожается вместе с поддеревом, соседи
//! продолжают собираться.

use std::collections::{HashMap, HashSet, VecDeque};

use bevy::prelude::*;

use super::{
    boxes_intersect, AttachmentCategory, AttachmentNode, BuildContext, ChildLink, Mount, NodeArena, NodeId, SlotRange,
    TemplateId, TemplateLookup,
};
use crate::error::{AssemblyError, RejectReason};
use crate::logger::{log, log_warning};
use crate::weapon::StatModifier;

/// Итог build: зарегистрированные узлы в порядке обхода
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GraphBuilt {
    pub nodes: Vec<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct AttachmentGraph {
    arena: NodeArena,
    roots: Vec<NodeId>,
    spawned: Vec<NodeId>,
    spawned_set: HashSet<NodeId>,
    parents: HashMap<NodeId, NodeId>,
}

impl AttachmentGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn node(&self, id: NodeId) -> Option<&AttachmentNode> {
        self.arena.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut AttachmentNode> {
        self.arena.get_mut(id)
    }

    /// Зарегистрированные узлы (BFS порядок)
    pub fn spawned(&self) -> &[NodeId] {
        &self.spawned
    }

    pub fn spawned_nodes(&self) -> impl Iterator<Item = &AttachmentNode> + '_ {
        self.spawned.iter().filter_map(|id| self.arena.get(*id))
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn is_registered(&self, id: NodeId) -> bool {
        self.spawned_set.contains(&id)
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(&id).copied()
    }

    /// Сколько узлов живёт в arena (включая не смонтированные)
    pub fn live_nodes(&self) -> usize {
        self.arena.len()
    }

    /// Модификаторы всех зарегистрированных частей
    pub fn modifiers(&self) -> impl Iterator<Item = &StatModifier> + '_ {
        self.spawned_nodes().flat_map(|node| node.modifiers.iter())
    }

    /// Transform узла в пространстве оружия (композиция вверх по parents)
    pub fn world_transform(&self, id: NodeId) -> Option<Transform> {
        let mut transform = self.arena.get(id)?.local_transform;
        let mut current = id;

        // Лимит шагов = число узлов: цикл в parents не повесит нас
        for _ in 0..self.arena.len() {
            let Some(parent) = self.parents.get(&current).copied() else {
                break;
            };
            let parent_node = self.arena.get(parent)?;
            transform = parent_node.local_transform.mul_transform(transform);
            current = parent;
        }

        Some(transform)
    }

    /// DFS от корней, первый зарегистрированный узел категории
    pub fn find_by_category(&self, category: AttachmentCategory) -> Option<NodeId> {
        let mut visited = HashSet::new();
        self.roots
            .iter()
            .find_map(|root| self.find_in_subtree(*root, category, &mut visited))
    }

    fn find_in_subtree(
        &self,
        id: NodeId,
        category: AttachmentCategory,
        visited: &mut HashSet<NodeId>,
    ) -> Option<NodeId> {
        if !visited.insert(id) || !self.spawned_set.contains(&id) {
            return None;
        }
        let node = self.arena.get(id)?;
        if node.category == category {
            return Some(id);
        }
        node.child_instances()
            .find_map(|child| self.find_in_subtree(child, category, visited))
    }

    // ========================================================================
    // Manual wiring (connected strategy)
    // ========================================================================

    /// Создать узел из шаблона, не монтируя
    pub fn instantiate(&mut self, template: &TemplateId, templates: &dyn TemplateLookup) -> Option<NodeId> {
        self.spawn(template, templates)
    }

    /// Добавить пустую связь к узлу, вернуть её индекс
    pub fn add_link(&mut self, parent: NodeId, offset: Transform) -> Option<usize> {
        let node = self.arena.get_mut(parent)?;
        node.links.push(ChildLink::manual(offset));
        Some(node.links.len() - 1)
    }

    /// Подключить готовый узел в link parent'а
    pub fn connect(&mut self, parent: NodeId, link_index: usize, child: NodeId) -> bool {
        if parent == child || !self.arena.contains(child) {
            return false;
        }
        let Some(link) = self
            .arena
            .get_mut(parent)
            .and_then(|node| node.links.get_mut(link_index))
        else {
            return false;
        };
        if !link.instances.contains(&child) {
            link.instances.push(child);
        }
        true
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Spawn-from-templates стратегия
    pub fn build(&mut self, root_templates: &[TemplateId], ctx: &BuildContext) -> GraphBuilt {
        self.clear();

        let mut queue = VecDeque::new();
        let mut visited = HashSet::new();

        for template in root_templates {
            if let Some(root) = self.spawn(template, ctx.templates) {
                self.mount_root(root);
                visited.insert(root);
                queue.push_back(root);
            }
        }

        self.run_pipeline(queue, visited, ctx);
        self.finish_build()
    }

    /// Traverse-connected стратегия: узлы уже созданы и связаны
    pub fn build_connected(&mut self, root_nodes: &[NodeId], ctx: &BuildContext) -> GraphBuilt {
        self.reset_registration();

        let mut queue = VecDeque::new();
        let mut visited = HashSet::new();

        for root in root_nodes {
            if !self.arena.contains(*root) {
                log_warning(&format!("build_connected: root {:?} does not exist, skipped", root));
                continue;
            }
            if !visited.insert(*root) {
                continue;
            }
            self.mount_root(*root);
            queue.push_back(*root);
        }

        self.run_pipeline(queue, visited, ctx);
        self.finish_build()
    }

    fn finish_build(&self) -> GraphBuilt {
        log(&format!(
            "AttachmentGraph built: {} nodes ({} roots)",
            self.spawned.len(),
            self.roots.len()
        ));
        GraphBuilt {
            nodes: self.spawned.clone(),
        }
    }

    fn mount_root(&mut self, root: NodeId) {
        if let Some(node) = self.arena.get_mut(root) {
            node.mount = Some(Mount::WeaponRoot);
            node.local_transform = Transform::IDENTITY;
        }
        self.roots.push(root);
        self.register(root);
    }

    /// BFS: spawn детей link'а, placement, регистрация
    fn run_pipeline(&mut self, mut queue: VecDeque<NodeId>, mut visited: HashSet<NodeId>, ctx: &BuildContext) {
        while let Some(current) = queue.pop_front() {
            let link_count = match self.arena.get(current) {
                Some(node) => node.links.len(),
                None => continue,
            };

            for link_index in 0..link_count {
                self.spawn_link_children(current, link_index, ctx.templates);

                let instances = self
                    .arena
                    .get(current)
                    .and_then(|node| node.links.get(link_index))
                    .map(|link| link.instances.clone())
                    .unwrap_or_default();

                let mut kept = Vec::with_capacity(instances.len());

                for child in instances {
                    // Второй владелец / цикл: связь рвётся, узел остаётся у первого
                    if visited.contains(&child) {
                        log_warning(&format!(
                            "AttachmentGraph: {:?} already reached, link from {:?} dropped",
                            child, current
                        ));
                        continue;
                    }

                    match self.attach_child(current, link_index, child, ctx) {
                        Ok(()) => {
                            visited.insert(child);
                            self.parents.insert(child, current);
                            self.register(child);
                            queue.push_back(child);
                            kept.push(child);
                        }
                        Err(reason) => {
                            let error = AssemblyError::PlacementRejected { node: child, reason };
                            log_warning(&format!("AttachmentGraph: {}", error));
                            self.destroy_subtree(child);
                        }
                    }
                }

                if let Some(link) = self
                    .arena
                    .get_mut(current)
                    .and_then(|node| node.links.get_mut(link_index))
                {
                    link.instances = kept;
                }
            }
        }
    }

    fn spawn_link_children(&mut self, parent: NodeId, link_index: usize, templates: &dyn TemplateLookup) {
        let (children, start_slot) = match self.arena.get(parent).and_then(|node| node.links.get(link_index)) {
            Some(link) if link.instances.is_empty() => (link.children.clone(), link.start_slot),
            _ => return,
        };

        let mut spawned = Vec::with_capacity(children.len());
        for template in &children {
            if let Some(child) = self.spawn(template, templates) {
                if start_slot != 0 {
                    if let Some(node) = self.arena.get_mut(child) {
                        node.start_position = start_slot;
                    }
                }
                spawned.push(child);
            }
        }

        if let Some(link) = self
            .arena
            .get_mut(parent)
            .and_then(|node| node.links.get_mut(link_index))
        {
            link.instances = spawned;
        }
    }

    fn spawn(&mut self, template_id: &TemplateId, templates: &dyn TemplateLookup) -> Option<NodeId> {
        let Some(template) = templates.template(template_id) else {
            log_warning(&format!(
                "AttachmentGraph: {}",
                AssemblyError::InvalidTemplate(template_id.to_string())
            ));
            return None;
        };

        if template.is_abstract {
            log_warning(&format!(
                "AttachmentGraph: {} (abstract)",
                AssemblyError::InvalidTemplate(template_id.to_string())
            ));
            return None;
        }

        Some(self.arena.insert(AttachmentNode::from_template(template)))
    }

    fn register(&mut self, id: NodeId) {
        if self.spawned_set.insert(id) {
            self.spawned.push(id);
        }
    }

    // ========================================================================
    // Placement
    // ========================================================================

    fn attach_child(
        &mut self,
        parent: NodeId,
        link_index: usize,
        child: NodeId,
        ctx: &BuildContext,
    ) -> Result<(), RejectReason> {
        let parent_node = self.arena.get(parent).ok_or(RejectReason::ParentMissing)?;
        let child_node = self.arena.get(child).ok_or(RejectReason::NodeMissing)?;

        let socket = child_node.category.socket_name();
        let socket_transform = ctx.sockets.socket_transform(parent_node.mesh, socket);
        let offset = parent_node
            .links
            .get(link_index)
            .map(|link| link.offset)
            .unwrap_or(Transform::IDENTITY);

        let (mount, local_transform) = match parent_node.rail() {
            Some(allocator) if child_node.use_rail => {
                let socket_transform = socket_transform.ok_or(RejectReason::MissingSocket(socket))?;
                let parent_world = self.world_transform(parent).unwrap_or_default();
                let half_extents = child_node.bounds * ctx.config.overlap_inflation;
                let size = child_node.size;
                let ignore = [parent, child];

                // Уже смонтированные на этой планке части тоже препятствия
                let siblings: Vec<(Vec3, Vec3)> = allocator
                    .mounted()
                    .filter(|(sibling, _)| !ignore.contains(sibling))
                    .filter_map(|(sibling, _)| {
                        let node = self.arena.get(sibling)?;
                        let world = self.world_transform(sibling)?;
                        Some((world.translation, node.bounds * ctx.config.overlap_inflation))
                    })
                    .collect();

                // Высота кандидата всегда по socket'у планки
                let on_socket_height = |transform: &Transform| {
                    let mut local = *transform;
                    local.translation.y = socket_transform.translation.y;
                    local
                };

                let candidate = allocator
                    .find_slot(size, ctx.config.rail_sweep_step, |_, transform| {
                        let world = parent_world.mul_transform(on_socket_height(transform));
                        let hits_sibling = siblings.iter().any(|(center, half)| {
                            boxes_intersect(world.translation, half_extents, *center, *half)
                        });
                        !hits_sibling && !ctx.overlap.overlaps(&world, half_extents, &ignore)
                    })
                    .ok_or(RejectReason::RailExhausted)?;

                (
                    Mount::Rail {
                        parent,
                        range: SlotRange::new(candidate.slot, size),
                    },
                    on_socket_height(&candidate.transform),
                )
            }
            _ => {
                let socket_transform = socket_transform.ok_or(RejectReason::MissingSocket(socket))?;
                (Mount::Socket { parent, socket }, socket_transform.mul_transform(offset))
            }
        };

        if let Mount::Rail { range, .. } = mount {
            let placed = self
                .arena
                .get_mut(parent)
                .and_then(|node| node.rail_mut())
                .is_some_and(|allocator| allocator.place(child, range));
            if !placed {
                return Err(RejectReason::RailExhausted);
            }
        }

        let node = self.arena.get_mut(child).ok_or(RejectReason::NodeMissing)?;
        node.mount = Some(mount);
        node.local_transform = local_transform;
        if let Mount::Rail { range, .. } = mount {
            node.start_position = range.start;
        }

        Ok(())
    }

    // ========================================================================
    // Teardown
    // ========================================================================

    /// Снять узел с parent'а (rail слоты освобождаются)
    fn detach(&mut self, id: NodeId) {
        let Some(mount) = self.arena.get(id).and_then(|node| node.mount) else {
            self.parents.remove(&id);
            return;
        };

        if let Mount::Rail { parent, .. } = mount {
            if let Some(allocator) = self.arena.get_mut(parent).and_then(|node| node.rail_mut()) {
                allocator.remove(id);
            }
        }

        if let Some(node) = self.arena.get_mut(id) {
            node.mount = None;
        }
        self.parents.remove(&id);
    }

    /// Destroy узла и всех его потомков (не выполненный placement)
    fn destroy_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        let mut seen = HashSet::new();

        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            // Смонтированный узел принадлежит другой ветке
            if current != id && self.spawned_set.contains(&current) {
                continue;
            }
            self.detach(current);
            if let Some(node) = self.arena.remove(current) {
                stack.extend(node.child_instances());
            }
            if self.spawned_set.remove(&current) {
                self.spawned.retain(|spawned| *spawned != current);
            }
        }
    }

    /// Children-first порядок по всем корням и зарегистрированным узлам
    fn post_order(&self) -> Vec<NodeId> {
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        for id in self.roots.iter().chain(self.spawned.iter()) {
            self.collect_post_order(*id, &mut visited, &mut order);
        }
        order
    }

    fn collect_post_order(&self, id: NodeId, visited: &mut HashSet<NodeId>, order: &mut Vec<NodeId>) {
        if !visited.insert(id) {
            return;
        }
        let Some(node) = self.arena.get(id) else {
            return;
        };
        for child in node.child_instances() {
            self.collect_post_order(child, visited, order);
        }
        order.push(id);
    }

    /// Detach всех (дети первыми) + destroy. Идемпотентно.
    ///
    /// Возвращает число снятых узлов.
    pub fn clear(&mut self) -> usize {
        let order = self.post_order();
        for id in &order {
            self.detach(*id);
        }

        let destroyed = self.arena.len();
        self.arena.clear();
        self.roots.clear();
        self.spawned.clear();
        self.spawned_set.clear();
        self.parents.clear();

        if destroyed > 0 {
            log(&format!(
                "AttachmentGraph cleared: {} detached, {} destroyed",
                order.len(),
                destroyed
            ));
        }
        order.len()
    }

    /// Connected стратегия: узлы остаются, монтирование сбрасывается
    fn reset_registration(&mut self) {
        let ids: Vec<NodeId> = self.arena.ids().collect();
        for id in ids {
            if let Some(node) = self.arena.get_mut(id) {
                node.mount = None;
                node.local_transform = Transform::IDENTITY;
                if let Some(allocator) = node.rail_mut() {
                    allocator.reset();
                }
            }
        }
        self.roots.clear();
        self.spawned.clear();
        self.spawned_set.clear();
        self.parents.clear();
    }
}
