//! Streaming element-assembly state machine.
//!
//! [`Converter`] consumes element start/end events, populates the entity
//! store, runs canonicalization, assembles shapes through a
//! [`GeometryBuilder`] and writes rows through the [`SqlSink`]. Per-record
//! problems are logged, counted in [`RunStats`] and never abort the run;
//! only read, write and allocation failures are fatal.

use std::io::Write;

use log::{debug, info, warn};
use pgplanet_core::{
    AttributeList, AttributeTuple, ConversionOptions, DedupEngine, Edge, EntityError, EntityKind,
    EntityStore, GeometryBuilder, IdBounds, Point, RecordError, RunStats,
    attributes::Insertion, schema::normalise_tag_key,
};

use crate::{ConvertError, SegmentAssembler, emit::SqlSink, wkt};

const PROGRESS_TARGET: &str = "pgplanet::progress";
const POINT_PROGRESS_INTERVAL: u64 = 10_000;
const EDGE_PROGRESS_INTERVAL: u64 = 10_000;
const SHAPE_PROGRESS_INTERVAL: u64 = 1_000;

/// Which record the converter is inside.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum State {
    #[default]
    TopLevel,
    InPoint,
    InEdge,
    InShape,
}

impl State {
    const fn record(self) -> Option<EntityKind> {
        match self {
            Self::TopLevel => None,
            Self::InPoint => Some(EntityKind::Point),
            Self::InEdge => Some(EntityKind::Edge),
            Self::InShape => Some(EntityKind::Shape),
        }
    }

    const fn entered_by(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Point => Self::InPoint,
            EntityKind::Edge => Self::InEdge,
            EntityKind::Shape => Self::InShape,
        }
    }
}

/// Element vocabulary understood by the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Element {
    Container,
    Record(EntityKind),
    Tag,
    ChildRef,
}

impl Element {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "osm" => Some(Self::Container),
            "node" => Some(Self::Record(EntityKind::Point)),
            "segment" => Some(Self::Record(EntityKind::Edge)),
            "way" => Some(Self::Record(EntityKind::Shape)),
            "tag" => Some(Self::Tag),
            "seg" => Some(Self::ChildRef),
            _ => None,
        }
    }
}

/// Single-pass converter from element events to SQL rows.
///
/// The converter owns every piece of run state: the entity store, the
/// canonicalization sets, the three per-record attribute lists, the
/// geometry builder and the output sink. Nothing is shared between runs.
pub struct Converter<W: Write, G = SegmentAssembler> {
    state: State,
    /// Records opened inside another record whose contents are skipped.
    ignored_records: usize,
    keys: AttributeList,
    tags: AttributeList,
    segs: AttributeList,
    store: Box<dyn EntityStore>,
    dedup: DedupEngine,
    stats: RunStats,
    builder: G,
    sink: SqlSink<W>,
}

impl<W: Write> Converter<W> {
    /// Build a converter using the default [`SegmentAssembler`].
    pub fn new(writer: W, options: &ConversionOptions) -> Self {
        Self::with_builder(writer, options, SegmentAssembler::default())
    }
}

impl<W: Write, G: GeometryBuilder> Converter<W, G> {
    /// Build a converter around a custom geometry builder.
    pub fn with_builder(writer: W, options: &ConversionOptions, builder: G) -> Self {
        Self {
            state: State::TopLevel,
            ignored_records: 0,
            keys: AttributeList::default(),
            tags: AttributeList::default(),
            segs: AttributeList::default(),
            store: options.storage.build(options.bounds),
            dedup: DedupEngine::new(options.suppress_duplicates),
            stats: RunStats::default(),
            builder,
            sink: SqlSink::new(writer, options.table_name.clone()),
        }
    }

    /// Current record state.
    #[must_use]
    pub const fn state(&self) -> State {
        self.state
    }

    /// Counters accumulated so far.
    #[must_use]
    pub const fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Read-only access to the entity store.
    #[must_use]
    pub fn store(&self) -> &dyn EntityStore {
        self.store.as_ref()
    }

    /// Read-only access to the geometry builder.
    #[must_use]
    pub const fn builder(&self) -> &G {
        &self.builder
    }

    /// Write the script preamble.
    ///
    /// # Errors
    /// Returns [`ConvertError::Write`] when the sink fails.
    pub fn begin(&mut self) -> Result<(), ConvertError> {
        self.sink.write_preamble().map_err(ConvertError::write)
    }

    /// Commit, write the postamble and flush.
    ///
    /// # Errors
    /// Returns [`ConvertError::Write`] when the sink fails; buffered output
    /// is discarded in that case.
    pub fn finish(mut self) -> Result<(RunStats, W), ConvertError> {
        if let Err(source) = self.sink.write_postamble() {
            self.sink.abandon();
            return Err(ConvertError::write(source));
        }
        let writer = self.sink.finish().map_err(ConvertError::write)?;
        Ok((self.stats, writer))
    }

    /// Stop without writing anything still buffered.
    pub fn abandon(self) -> (RunStats, W) {
        (self.stats, self.sink.abandon())
    }

    /// Handle an element start.
    ///
    /// # Errors
    /// Returns a fatal [`ConvertError`]; per-record problems are absorbed.
    pub fn start_element(
        &mut self,
        name: &str,
        attributes: &AttributeList,
    ) -> Result<(), ConvertError> {
        let element = Element::parse(name);
        if self.ignored_records > 0 {
            if matches!(element, Some(Element::Record(_))) {
                self.ignored_records += 1;
            }
            debug!("Skipping <{name}> inside an ignored record");
            return Ok(());
        }
        let outcome = match element {
            Some(Element::Container) => Ok(()),
            Some(Element::Record(kind)) => {
                if self.state != State::TopLevel {
                    warn!("Ignoring <{name}> nested inside another record");
                    self.ignored_records = 1;
                    return Ok(());
                }
                self.state = State::entered_by(kind);
                match kind {
                    EntityKind::Point => self.start_point(attributes),
                    EntityKind::Edge => {
                        self.dedup.seal_points();
                        self.start_edge(attributes)
                    }
                    EntityKind::Shape => self.start_shape(attributes),
                }
            }
            Some(Element::Tag) => self.add_tag(attributes),
            Some(Element::ChildRef) => self.add_child_ref(attributes),
            None => {
                warn!("Unknown element name: {name}");
                Ok(())
            }
        };
        self.absorb(outcome)
    }

    /// Handle an element end.
    ///
    /// # Errors
    /// Returns a fatal [`ConvertError`]; per-record problems are absorbed.
    pub fn end_element(&mut self, name: &str) -> Result<(), ConvertError> {
        let element = Element::parse(name);
        if self.ignored_records > 0 {
            if matches!(element, Some(Element::Record(_))) {
                self.ignored_records -= 1;
            }
            return Ok(());
        }
        match element {
            Some(Element::Record(kind)) if State::entered_by(kind) == self.state => {
                self.state = State::TopLevel;
                match kind {
                    EntityKind::Point => self.end_point(),
                    EntityKind::Edge => {
                        self.tags.clear();
                        Ok(())
                    }
                    EntityKind::Shape => self.end_shape(),
                }
            }
            Some(_) => Ok(()),
            None => {
                debug!("Unknown element name at end: {name}");
                Ok(())
            }
        }
    }

    fn absorb(&mut self, outcome: Result<(), RecordError>) -> Result<(), ConvertError> {
        match outcome {
            Ok(()) => Ok(()),
            Err(RecordError::InvalidIdentifier(EntityError::ResourceExhausted {
                kind,
                requested,
            })) => Err(ConvertError::ResourceExhausted { kind, requested }),
            Err(problem) => {
                if problem.is_dangling() {
                    self.stats.dangling_refs += 1;
                } else if matches!(problem, RecordError::SelfLoop { .. }) {
                    self.stats.self_loops += 1;
                } else {
                    self.stats.malformed_records += 1;
                }
                warn!("Dropped: {problem}");
                Ok(())
            }
        }
    }

    fn start_point(&mut self, attributes: &AttributeList) -> Result<(), RecordError> {
        let kind = EntityKind::Point;
        let raw_id = required::<i64>(attributes, kind, "id")?;
        let lon = coordinate(attributes, "lon")?;
        let lat = coordinate(attributes, "lat")?;
        let id = self.bounds().validate(kind, raw_id)?;

        let counts = self.stats.counts_mut(kind);
        counts.total += 1;
        if counts.total % POINT_PROGRESS_INTERVAL == 0 {
            info!(target: PROGRESS_TARGET, "Processing: Node({}k)", counts.total / 1000);
        }

        let mut point = Point::new(id, lon, lat);
        point.id = self.dedup.canonical_point(&point);
        if point.id == id {
            debug!("NODE({id}) {lon} {lat}");
        } else {
            self.stats.points.duplicates += 1;
            debug!("NODE({id}) {lon} {lat} - dupe {}", point.id);
        }
        self.store.put_point(id, point)?;
        self.keys.push("id", id.to_string());
        Ok(())
    }

    fn start_edge(&mut self, attributes: &AttributeList) -> Result<(), RecordError> {
        let kind = EntityKind::Edge;
        let raw_id = required::<i64>(attributes, kind, "id")?;
        let raw_from = required::<i64>(attributes, kind, "from")?;
        let raw_to = required::<i64>(attributes, kind, "to")?;
        let id = self.bounds().validate(kind, raw_id)?;

        let counts = self.stats.counts_mut(kind);
        counts.total += 1;
        if counts.total % EDGE_PROGRESS_INTERVAL == 0 {
            info!(target: PROGRESS_TARGET, "Processing: Segment({}k)", counts.total / 1000);
        }

        let from = self.resolve_point(id, raw_from)?;
        let to = self.resolve_point(id, raw_to)?;
        if from == to {
            return Err(RecordError::SelfLoop { id, point: from });
        }

        let canonical = self.dedup.canonical_edge(id, from, to);
        if canonical == id {
            self.stats.edges.emitted += 1;
            debug!("SEGMENT({id}) {from}, {to}");
        } else {
            self.stats.edges.duplicates += 1;
            debug!("SEGMENT({id}) {from}, {to} - dupe {canonical}");
        }
        self.store.put_edge(
            id,
            Edge {
                id: canonical,
                from,
                to,
            },
        )?;
        Ok(())
    }

    /// Canonical identifier of the point an edge endpoint names.
    fn resolve_point(&self, edge: u64, raw: i64) -> Result<u64, RecordError> {
        self.bounds()
            .validate(EntityKind::Point, raw)
            .ok()
            .and_then(|id| self.store.get_point(id))
            .map(|point| point.id)
            .ok_or(RecordError::Dangling {
                kind: EntityKind::Edge,
                id: edge,
                target_kind: EntityKind::Point,
                target: raw,
            })
    }

    fn start_shape(&mut self, attributes: &AttributeList) -> Result<(), RecordError> {
        let kind = EntityKind::Shape;
        let raw_id = required::<i64>(attributes, kind, "id")?;
        let id = self.bounds().validate(kind, raw_id)?;

        let counts = self.stats.counts_mut(kind);
        counts.total += 1;
        if counts.total % SHAPE_PROGRESS_INTERVAL == 0 {
            info!(target: PROGRESS_TARGET, "Processing: Way({}k)", counts.total / 1000);
        }
        debug!("WAY({id})");
        self.keys.push("id", id.to_string());
        Ok(())
    }

    fn add_tag(&mut self, attributes: &AttributeList) -> Result<(), RecordError> {
        let Some(kind) = self.state.record() else {
            debug!("Ignoring <tag> outside a record");
            return Ok(());
        };
        let (Some(key), Some(value)) = (attributes.get("k"), attributes.get("v")) else {
            self.stats.malformed_tags += 1;
            warn!("Skipping <tag> without k and v inside <{}>", kind.element_name());
            return Ok(());
        };
        let key = normalise_tag_key(key);
        debug!("\t{key} = {value}");
        self.tags.push(key, value);
        Ok(())
    }

    fn add_child_ref(&mut self, attributes: &AttributeList) -> Result<(), RecordError> {
        if self.state != State::InShape {
            debug!("Ignoring <seg> outside a way");
            return Ok(());
        }
        let shape = self
            .keys
            .get("id")
            .and_then(|id| id.parse().ok())
            .unwrap_or_default();
        let raw = attributes.get("id").unwrap_or_default();
        let edge = raw
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|id| self.bounds().validate(EntityKind::Edge, id).ok())
            .and_then(|id| self.store.get_edge(id))
            .ok_or_else(|| RecordError::Dangling {
                kind: EntityKind::Shape,
                id: shape,
                target_kind: EntityKind::Edge,
                target: raw.trim().parse().unwrap_or_default(),
            })?;
        if self.segs.push_unique("id", &edge.id.to_string()) == Insertion::Duplicate {
            self.stats.duplicate_child_refs += 1;
            debug!("Way {shape} with duplicate segment id {}", edge.id);
        }
        Ok(())
    }

    fn end_point(&mut self) -> Result<(), ConvertError> {
        let result = self.emit_point();
        self.keys.clear();
        self.tags.clear();
        result
    }

    fn emit_point(&mut self) -> Result<(), ConvertError> {
        let Some(id) = self.captured_id() else {
            debug!("Node ID not in keys");
            return Ok(());
        };
        let Some(point) = self.store.get_point(id) else {
            debug!("Node {id} is no longer stored");
            return Ok(());
        };
        let tuple = AttributeTuple::from_tags(&self.tags);
        if tuple.is_empty() {
            return Ok(());
        }
        self.sink
            .write_row(id, &tuple, &wkt::point(point.location))
            .map_err(ConvertError::write)?;
        self.stats.points.emitted += 1;
        Ok(())
    }

    fn end_shape(&mut self) -> Result<(), ConvertError> {
        let result = self.emit_shape();
        self.keys.clear();
        self.tags.clear();
        self.segs.clear();
        result
    }

    fn emit_shape(&mut self) -> Result<(), ConvertError> {
        let Some(id) = self.captured_id() else {
            debug!("WAY ID not in keys");
            return Ok(());
        };
        if self.segs.is_empty() {
            debug!("WAY({id}) has no segments");
            return Ok(());
        }
        let tuple = AttributeTuple::from_tags(&self.tags);
        if tuple.is_empty() {
            return Ok(());
        }

        for value in self.segs.values("id") {
            let Some(edge) = value.parse().ok().and_then(|edge| self.store.get_edge(edge)) else {
                continue;
            };
            match (self.store.get_point(edge.from), self.store.get_point(edge.to)) {
                (Some(from), Some(to)) => self.builder.add_segment(from.location, to.location),
                _ => debug!("WAY({id}) segment {} lost an endpoint", edge.id),
            }
        }

        let produced = self.builder.build_geometry(tuple.polygon());
        let attributes = tuple.canonical_text();
        let mut non_empty = 0_usize;
        for index in 0..produced {
            let wkt = self.builder.get_wkt(index);
            if wkt.is_empty() {
                continue;
            }
            if let Some(original) = self.dedup.duplicate_shape(id, wkt, &attributes) {
                debug!("WAY({id}) - duplicate of {original}");
                self.stats.shapes.duplicates += 1;
                non_empty += 1;
                continue;
            }
            if let Err(source) = self.sink.write_row(id, &tuple, wkt) {
                self.builder.clear_wkts();
                return Err(ConvertError::write(source));
            }
            self.stats.shapes.emitted += 1;
            non_empty += 1;
        }
        self.builder.clear_wkts();
        if non_empty == 0 {
            self.stats.empty_geometries += 1;
            debug!("WAY({id}) produced no geometry");
        }
        Ok(())
    }

    fn captured_id(&self) -> Option<u64> {
        self.keys.get("id").and_then(|id| id.parse().ok())
    }

    fn bounds(&self) -> IdBounds {
        self.store.bounds()
    }
}

fn required<T: std::str::FromStr>(
    attributes: &AttributeList,
    kind: EntityKind,
    attribute: &'static str,
) -> Result<T, RecordError> {
    attributes
        .get(attribute)
        .and_then(|value| value.trim().parse().ok())
        .ok_or(RecordError::Malformed { kind, attribute })
}

fn coordinate(attributes: &AttributeList, attribute: &'static str) -> Result<f64, RecordError> {
    required::<f64>(attributes, EntityKind::Point, attribute)
        .and_then(|value| {
            if value.is_finite() {
                Ok(value)
            } else {
                Err(RecordError::Malformed {
                    kind: EntityKind::Point,
                    attribute,
                })
            }
        })
}
