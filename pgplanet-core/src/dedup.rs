//! Canonicalization of duplicate points, edges and shapes.
//!
//! Each scheme is an ordered set keyed by a scheme-specific key. Inserting a
//! key either registers the caller as the representative or returns the
//! representative registered earlier. Arrival order decides which entity
//! represents a class, so identical input always yields identical output.

use std::{
    cmp::Ordering,
    collections::{BTreeMap, btree_map::Entry},
};

use log::debug;

use crate::Point;

/// Ordered set that maps each distinct key to the first value seen for it.
///
/// # Examples
/// ```
/// use pgplanet_core::CanonicalSet;
///
/// let mut set = CanonicalSet::default();
/// assert_eq!(set.insert_or_find((1, 2), 10), None);
/// assert_eq!(set.insert_or_find((1, 2), 11), Some(&10));
/// assert_eq!(set.insert_or_find((2, 1), 12), None);
/// assert_eq!(set.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct CanonicalSet<K, V> {
    entries: BTreeMap<K, V>,
    sealed: bool,
}

impl<K, V> Default for CanonicalSet<K, V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            sealed: false,
        }
    }
}

impl<K: Ord, V> CanonicalSet<K, V> {
    /// Insert `key` with `value`, or return the value already registered
    /// for an equal key. The existing value is never replaced.
    pub fn insert_or_find(&mut self, key: K, value: V) -> Option<&V> {
        match self.entries.entry(key) {
            Entry::Occupied(entry) => Some(&*entry.into_mut()),
            Entry::Vacant(entry) => {
                entry.insert(value);
                None
            }
        }
    }

    /// Look up the representative for `key` without inserting.
    #[must_use]
    pub fn find(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    /// Mark the end of a bulk insert burst.
    ///
    /// The B-tree stays balanced on every insert, so sealing only records
    /// that further inserts are unexpected. Inserting after sealing still
    /// works.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    /// Whether [`seal`](Self::seal) has been called.
    #[must_use]
    pub const fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no keys have been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Position key ordering by longitude, then latitude.
///
/// `-0.0` and `0.0` compare equal. Callers reject non-finite coordinates
/// before building keys.
#[derive(Debug, Clone, Copy)]
pub struct PositionKey {
    lon: f64,
    lat: f64,
}

impl PositionKey {
    /// Build the key for a point's coordinates.
    #[must_use]
    pub fn of(point: &Point) -> Self {
        Self {
            lon: normalise_zero(point.lon()),
            lat: normalise_zero(point.lat()),
        }
    }
}

fn normalise_zero(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value }
}

impl PartialEq for PositionKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PositionKey {}

impl PartialOrd for PositionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PositionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.lon
            .total_cmp(&other.lon)
            .then_with(|| self.lat.total_cmp(&other.lat))
    }
}

/// Shape key ordering by geometry text, then serialized attributes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ShapeKey {
    pub wkt: String,
    pub attributes: String,
}

/// The three canonicalization schemes behind one switch.
///
/// When disabled every entity is its own representative and no keys are
/// retained.
#[derive(Debug, Clone, Default)]
pub struct DedupEngine {
    enabled: bool,
    points: CanonicalSet<PositionKey, u64>,
    edges: CanonicalSet<(u64, u64), u64>,
    shapes: CanonicalSet<ShapeKey, u64>,
}

impl DedupEngine {
    /// Create an engine; `enabled` mirrors `suppress_duplicates`.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }

    /// Whether canonicalization is active.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Return the representative identifier for `point`.
    ///
    /// # Examples
    /// ```
    /// use pgplanet_core::{DedupEngine, Point};
    ///
    /// let mut dedup = DedupEngine::new(true);
    /// assert_eq!(dedup.canonical_point(&Point::new(1, 10.0, 20.0)), 1);
    /// assert_eq!(dedup.canonical_point(&Point::new(2, 10.0, 20.0)), 1);
    /// assert_eq!(dedup.canonical_point(&Point::new(3, 10.0, 21.0)), 3);
    /// ```
    pub fn canonical_point(&mut self, point: &Point) -> u64 {
        if !self.enabled {
            return point.id;
        }
        self.points
            .insert_or_find(PositionKey::of(point), point.id)
            .copied()
            .unwrap_or(point.id)
    }

    /// Return the representative identifier for the directed edge
    /// `from -> to`.
    pub fn canonical_edge(&mut self, id: u64, from: u64, to: u64) -> u64 {
        if !self.enabled {
            return id;
        }
        self.edges
            .insert_or_find((from, to), id)
            .copied()
            .unwrap_or(id)
    }

    /// Register a produced shape; returns the id of an earlier identical
    /// shape when one exists.
    pub fn duplicate_shape(&mut self, id: u64, wkt: &str, attributes: &str) -> Option<u64> {
        if !self.enabled {
            return None;
        }
        let key = ShapeKey {
            wkt: wkt.to_owned(),
            attributes: attributes.to_owned(),
        };
        self.shapes.insert_or_find(key, id).copied()
    }

    /// Close the point scheme once edges start arriving.
    pub fn seal_points(&mut self) {
        if self.points.is_sealed() {
            return;
        }
        self.points.seal();
        debug!(
            "Sealed point canonicalization with {} distinct positions",
            self.points.len()
        );
    }

    /// Whether the point scheme has been sealed.
    #[must_use]
    pub const fn points_sealed(&self) -> bool {
        self.points.is_sealed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, -0.0, true)]
    #[case(1.5, 1.5, true)]
    #[case(1.5, 1.500_000_000_000_000_2, false)]
    fn position_equality(#[case] left: f64, #[case] right: f64, #[case] equal: bool) {
        let a = PositionKey::of(&Point::new(1, left, 5.0));
        let b = PositionKey::of(&Point::new(2, right, 5.0));
        assert_eq!(a == b, equal);
    }

    #[rstest]
    fn positions_order_by_longitude_first() {
        let west = PositionKey::of(&Point::new(1, -1.0, 80.0));
        let east = PositionKey::of(&Point::new(2, 1.0, -80.0));
        assert!(west < east);
    }

    #[rstest]
    fn disabled_engine_passes_everything_through() {
        let mut dedup = DedupEngine::new(false);
        assert_eq!(dedup.canonical_point(&Point::new(1, 0.0, 0.0)), 1);
        assert_eq!(dedup.canonical_point(&Point::new(2, 0.0, 0.0)), 2);
        assert_eq!(dedup.canonical_edge(9, 1, 2), 9);
        assert_eq!(dedup.canonical_edge(10, 1, 2), 10);
        assert_eq!(dedup.duplicate_shape(3, "POINT(0 0)", "x"), None);
        assert_eq!(dedup.duplicate_shape(4, "POINT(0 0)", "x"), None);
        assert!(dedup.points.is_empty(), "disabled engine retains nothing");
    }

    #[rstest]
    fn edges_are_direction_sensitive() {
        let mut dedup = DedupEngine::new(true);
        assert_eq!(dedup.canonical_edge(1, 10, 20), 1);
        assert_eq!(dedup.canonical_edge(2, 20, 10), 2);
        assert_eq!(dedup.canonical_edge(3, 10, 20), 1);
    }

    #[rstest]
    fn shapes_compare_geometry_and_attributes() {
        let mut dedup = DedupEngine::new(true);
        let wkt = "LINESTRING(0 0,1 1)";
        assert_eq!(dedup.duplicate_shape(1, wkt, "\"name\"=A"), None);
        assert_eq!(dedup.duplicate_shape(2, wkt, "\"name\"=B"), None);
        assert_eq!(dedup.duplicate_shape(3, wkt, "\"name\"=A"), Some(1));
        assert_eq!(
            dedup.duplicate_shape(4, "LINESTRING(0 0,2 2)", "\"name\"=A"),
            None
        );
    }

    #[rstest]
    fn sealing_keeps_lookups_working() {
        let mut dedup = DedupEngine::new(true);
        dedup.canonical_point(&Point::new(1, 3.0, 4.0));
        dedup.seal_points();
        assert!(dedup.points_sealed());
        assert_eq!(dedup.canonical_point(&Point::new(8, 3.0, 4.0)), 1);
    }
}
