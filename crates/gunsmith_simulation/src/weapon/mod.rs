//! Weapon domain - стрельба, reload, durability, статы, authority
//!
//! # Архитектура
//!
//! **FireController** - патронник + магазин + staged reload FSM.
//! **WeaponAssembly** - фасад над `AttachmentGraph` и `FireController`,
//! authority gate и outbox событий.
//! **WeaponSnapshot** - то, что реплицируется observers.

pub mod assembly;
pub mod durability;
pub mod fire;
pub mod snapshot;
pub mod stats;

#[cfg(test)]
mod assembly_tests;
#[cfg(test)]
mod fire_tests;

pub use assembly::*;
pub use durability::*;
pub use fire::*;
pub use snapshot::*;
pub use stats::*;
