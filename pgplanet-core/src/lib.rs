//! Core entity model for the pgplanet converter.
//!
//! Responsibilities:
//! - Hold points and edges by identifier ([`EntityStore`]).
//! - Canonicalize duplicate points, edges and shapes ([`DedupEngine`]).
//! - Provide per-record scratch storage ([`AttributeList`]).
//! - Define the compiled-in export schema and the geometry builder contract.
//!
//! Boundaries:
//! - No I/O. Tokenizing input and writing SQL live in `pgplanet-data`.
//!
//! Invariants:
//! - No global mutable state; every run owns its store, dedup sets and
//!   counters.

pub mod attributes;
pub mod cancel;
pub mod dedup;
pub mod entity;
pub mod geometry;
pub mod options;
pub mod record;
pub mod schema;
pub mod stats;
pub mod store;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use attributes::AttributeList;
pub use cancel::CancelFlag;
pub use dedup::{CanonicalSet, DedupEngine};
pub use entity::{Edge, EntityKind, Point};
pub use geometry::GeometryBuilder;
pub use options::{ConversionOptions, TableName};
pub use record::RecordError;
pub use schema::{AttributeTuple, EXPORT_COLUMNS, ExportColumn};
pub use stats::{EntityCounts, RunStats};
pub use store::{EntityError, EntityStore, IdBounds, StorageKind};
