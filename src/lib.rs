//! Facade crate for the pgplanet OSM-to-PostGIS converter.
//!
//! This crate re-exports the core entity model and the streaming converter so
//! callers can depend on a single package.

#![forbid(unsafe_code)]

pub use pgplanet_core::{
    AttributeList, AttributeTuple, CancelFlag, CanonicalSet, ConversionOptions, DedupEngine, Edge,
    EntityCounts, EntityError, EntityKind, EntityStore, ExportColumn, GeometryBuilder, IdBounds,
    Point, RecordError, RunStats, StorageKind, TableName, EXPORT_COLUMNS,
};

pub use pgplanet_data::{ConvertError, Converter, RunOutcome, RunReport, SegmentAssembler, convert};
