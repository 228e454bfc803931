//! Contract for the service that assembles edges into output geometries.

use geo::Coord;

/// Assembles a shape's edges into one or more serialized geometries.
///
/// The state machine feeds every resolved edge of a shape through
/// [`add_segment`](Self::add_segment), calls
/// [`build_geometry`](Self::build_geometry) once, reads each produced entry
/// with [`get_wkt`](Self::get_wkt) and finally releases them with
/// [`clear_wkts`](Self::clear_wkts) before the next shape.
pub trait GeometryBuilder {
    /// Accumulate one edge into the pending shape.
    fn add_segment(&mut self, from: Coord<f64>, to: Coord<f64>);

    /// Assemble the pending edges and return the number of produced
    /// geometries. Returns zero when assembly yields nothing.
    fn build_geometry(&mut self, polygon_hint: bool) -> usize;

    /// Serialized geometry at `index`; empty for degenerate or skipped
    /// results. Callers must skip empty strings.
    fn get_wkt(&self, index: usize) -> &str;

    /// Release all produced geometries.
    fn clear_wkts(&mut self);
}
