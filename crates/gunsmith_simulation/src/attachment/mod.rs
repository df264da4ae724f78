//! Attachment domain - части оружия и их сборка в дерево
//!
//! # Архитектура
//!
//! **AttachmentTemplate** - статический blueprint (`AttachmentTemplates` resource).
//! **AttachmentNode** - runtime экземпляр в arena, адрес = `NodeId`.
//! **SlotAllocator** - occupancy bitmask планки (≤ 64 слота).
//! **AttachmentGraph** - BFS сборка, placement, teardown.
//!
//! Sockets и 3D overlap - host seams (`SocketQuery`, `OverlapQuery`).

pub mod category;
pub mod graph;
pub mod host;
pub mod node;
pub mod rail;
pub mod template;

#[cfg(test)]
mod rail_tests;

pub use category::*;
pub use graph::*;
pub use host::*;
pub use node::*;
pub use rail::*;
pub use template::*;
