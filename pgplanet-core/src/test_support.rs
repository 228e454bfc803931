//! Test doubles shared by unit and behaviour tests.

use geo::Coord;

use crate::GeometryBuilder;

/// [`GeometryBuilder`] that records its inputs and replays canned output.
///
/// Every call to `build_geometry` produces a copy of the configured WKT
/// strings regardless of the segments supplied.
#[derive(Debug, Clone, Default)]
pub struct RecordingBuilder {
    canned: Vec<String>,
    produced: Vec<String>,
    pending: Vec<(Coord<f64>, Coord<f64>)>,
    /// Segments passed to each `build_geometry` call.
    pub builds: Vec<Vec<(Coord<f64>, Coord<f64>)>>,
    /// Polygon hints passed to each `build_geometry` call.
    pub hints: Vec<bool>,
    /// Number of `clear_wkts` calls.
    pub clears: usize,
}

impl RecordingBuilder {
    /// Replay `wkts` from every build.
    #[must_use]
    pub fn with_output<I, S>(wkts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            canned: wkts.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

impl GeometryBuilder for RecordingBuilder {
    fn add_segment(&mut self, from: Coord<f64>, to: Coord<f64>) {
        self.pending.push((from, to));
    }

    fn build_geometry(&mut self, polygon_hint: bool) -> usize {
        self.builds.push(std::mem::take(&mut self.pending));
        self.hints.push(polygon_hint);
        self.produced = self.canned.clone();
        self.produced.len()
    }

    fn get_wkt(&self, index: usize) -> &str {
        self.produced.get(index).map_or("", String::as_str)
    }

    fn clear_wkts(&mut self) {
        self.produced.clear();
        self.clears += 1;
    }
}
