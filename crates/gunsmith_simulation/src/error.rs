//! Error taxonomy сборки и стрельбы
//!
//! Все ошибки НЕ фатальны: наружу core отдаёт bool / Option / пустой Vec,
//! а эти типы нужны для логов и внутренних `Result` (placement pipeline).

use thiserror::Error;

use crate::attachment::NodeId;

/// Почему часть не встала на parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("parent has no `{0}` socket")]
    MissingSocket(&'static str),

    #[error("no rail slot passed bounds/occupancy/socket/overlap checks")]
    RailExhausted,

    #[error("parent node no longer exists")]
    ParentMissing,

    #[error("node no longer exists")]
    NodeMissing,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssemblyError {
    #[error("placement rejected for {node:?}: {reason}")]
    PlacementRejected { node: NodeId, reason: RejectReason },

    #[error("ammo buffer is full")]
    BufferFull,

    #[error("ammo buffer is empty")]
    BufferEmpty,

    #[error("invalid template `{0}`")]
    InvalidTemplate(String),

    #[error("mutation requested on a non-authoritative weapon (forwarded to authority)")]
    AuthorityViolation,

    #[error("missing collaborator: {0}")]
    MissingCollaborator(&'static str),
}
