//! Point and edge entities held by the [`EntityStore`](crate::EntityStore).

use std::fmt;

use geo::Coord;

/// A stored point.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`. The `id` is
/// the canonical identifier: equal to the slot the point is stored under
/// unless deduplication rewrote it to an earlier point at the same position.
/// An `id` of zero marks an empty slot.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub id: u64,
    pub location: Coord<f64>,
}

impl Point {
    /// Construct a point from its identifier and longitude/latitude.
    ///
    /// # Examples
    /// ```
    /// use pgplanet_core::Point;
    ///
    /// let point = Point::new(1, 10.0, 20.0);
    /// assert_eq!(point.lon(), 10.0);
    /// assert_eq!(point.lat(), 20.0);
    /// ```
    #[must_use]
    pub const fn new(id: u64, lon: f64, lat: f64) -> Self {
        Self {
            id,
            location: Coord { x: lon, y: lat },
        }
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn lon(&self) -> f64 {
        self.location.x
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.location.y
    }

    pub(crate) const fn is_present(&self) -> bool {
        self.id != 0
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0, 0.0, 0.0)
    }
}

/// A stored edge between two canonical point identifiers.
///
/// `from` never equals `to`; self-loops are rejected before storage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    pub id: u64,
    pub from: u64,
    pub to: u64,
}

impl Edge {
    pub(crate) const fn is_present(&self) -> bool {
        self.id != 0
    }
}

/// The three record kinds carried by the input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EntityKind {
    Point,
    Edge,
    Shape,
}

impl EntityKind {
    /// Element name used for this kind in OSM XML.
    #[must_use]
    pub const fn element_name(self) -> &'static str {
        match self {
            Self::Point => "node",
            Self::Edge => "segment",
            Self::Shape => "way",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element_name())
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn points_serialize_with_their_coordinates() {
        let json = serde_json::to_value(Point::new(7, 10.5, -3.25)).expect("serialize point");
        assert_eq!(json["id"], 7);
        assert_eq!(json["location"]["x"], 10.5);
        assert_eq!(json["location"]["y"], -3.25);
        let back: Point = serde_json::from_value(json).expect("deserialize point");
        assert_eq!(back, Point::new(7, 10.5, -3.25));
    }
}
