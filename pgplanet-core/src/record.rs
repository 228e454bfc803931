//! Per-record problems that drop a record without failing the run.

use thiserror::Error;

use crate::{EntityError, EntityKind};

/// Why a record, or one of its references, was dropped.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordError {
    /// A required attribute is missing or does not parse.
    #[error("{kind} record is missing a valid {attribute:?} attribute")]
    Malformed {
        kind: EntityKind,
        attribute: &'static str,
    },
    /// An identifier is outside the configured bounds.
    #[error(transparent)]
    InvalidIdentifier(#[from] EntityError),
    /// A reference names an entity that is not stored.
    #[error("{kind} {id} references missing {target_kind} {target}")]
    Dangling {
        kind: EntityKind,
        id: u64,
        target_kind: EntityKind,
        target: i64,
    },
    /// An edge collapses onto a single canonical point.
    #[error("segment {id} connects point {point} to itself")]
    SelfLoop { id: u64, point: u64 },
}

impl RecordError {
    /// Whether the problem is a reference to an absent entity.
    #[must_use]
    pub const fn is_dangling(&self) -> bool {
        matches!(self, Self::Dangling { .. })
    }
}
