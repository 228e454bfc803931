//! Identifier-indexed storage for points and edges.
//!
//! The [`EntityStore`] trait hides the backing layout so the state machine and
//! the dedup engine do not care whether identifiers are dense or sparse. Both
//! implementations enforce the configured identifier bounds and grow on
//! demand, so memory tracks the highest identifier actually seen rather than
//! the configured maximum.

use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::{Edge, EntityKind, Point};

mod dense;
mod sparse;

pub use dense::DenseStore;
pub use sparse::SparseStore;

/// Exclusive upper bounds for point and edge identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdBounds {
    pub max_point: u64,
    pub max_edge: u64,
}

impl IdBounds {
    /// Bound for the given entity kind. Shapes are never stored and are
    /// only checked for positivity.
    #[must_use]
    pub const fn max_for(&self, kind: EntityKind) -> u64 {
        match kind {
            EntityKind::Point => self.max_point,
            EntityKind::Edge => self.max_edge,
            EntityKind::Shape => u64::MAX,
        }
    }

    /// Validate a raw identifier against the bound for `kind`.
    ///
    /// # Examples
    /// ```
    /// use pgplanet_core::{EntityKind, store::IdBounds};
    ///
    /// let bounds = IdBounds { max_point: 100, max_edge: 100 };
    /// assert_eq!(bounds.validate(EntityKind::Point, 5), Ok(5));
    /// assert!(bounds.validate(EntityKind::Point, 0).is_err());
    /// assert!(bounds.validate(EntityKind::Point, 100).is_err());
    /// assert!(bounds.validate(EntityKind::Edge, -3).is_err());
    /// ```
    pub fn validate(&self, kind: EntityKind, raw: i64) -> Result<u64, EntityError> {
        let max = self.max_for(kind);
        match u64::try_from(raw) {
            Ok(id) if id > 0 && id < max => Ok(id),
            _ => Err(EntityError::InvalidIdentifier { kind, id: raw, max }),
        }
    }
}

/// Errors raised by entity storage.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EntityError {
    /// The identifier is zero, negative or not below the configured maximum.
    #[error("{kind} id {id} is outside the supported range 1..{max}")]
    InvalidIdentifier { kind: EntityKind, id: i64, max: u64 },
    /// Growing the backing storage failed.
    #[error("failed to reserve storage for {requested} {kind} slots")]
    ResourceExhausted { kind: EntityKind, requested: usize },
}

/// Backing layout selected for an [`EntityStore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum StorageKind {
    /// Vectors indexed directly by identifier. Best for dense planet extracts.
    #[default]
    Dense,
    /// Hash maps keyed by identifier. Best for small or scattered inputs.
    Sparse,
}

impl StorageKind {
    /// Build an empty store of this kind.
    #[must_use]
    pub fn build(self, bounds: IdBounds) -> Box<dyn EntityStore> {
        match self {
            Self::Dense => Box::new(DenseStore::new(bounds)),
            Self::Sparse => Box::new(SparseStore::new(bounds)),
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dense => f.write_str("dense"),
            Self::Sparse => f.write_str("sparse"),
        }
    }
}

/// Error returned when parsing an unknown [`StorageKind`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown storage kind {0:?} (expected \"dense\" or \"sparse\")")]
pub struct ParseStorageKindError(String);

impl FromStr for StorageKind {
    type Err = ParseStorageKindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dense" => Ok(Self::Dense),
            "sparse" => Ok(Self::Sparse),
            _ => Err(ParseStorageKindError(value.to_owned())),
        }
    }
}

/// Identifier-indexed access to points and edges.
///
/// `put_*` overwrites any existing entry at the same identifier; the input
/// may legitimately redefine an id. Lookups outside the configured bounds
/// return `None`.
pub trait EntityStore {
    /// Fetch the point stored under `id`.
    fn get_point(&self, id: u64) -> Option<Point>;

    /// Store `point` under `id`.
    fn put_point(&mut self, id: u64, point: Point) -> Result<(), EntityError>;

    /// Fetch the edge stored under `id`.
    fn get_edge(&self, id: u64) -> Option<Edge>;

    /// Store `edge` under `id`.
    fn put_edge(&mut self, id: u64, edge: Edge) -> Result<(), EntityError>;

    /// Bounds enforced by this store.
    fn bounds(&self) -> IdBounds;
}

fn check_slot(bounds: IdBounds, kind: EntityKind, id: u64) -> Result<u64, EntityError> {
    let raw = i64::try_from(id).unwrap_or(i64::MAX);
    bounds.validate(kind, raw)
}

#[cfg(test)]
mod tests;
