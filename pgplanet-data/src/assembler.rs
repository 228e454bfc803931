//! Default [`GeometryBuilder`]: chains edges into lines and rings.

use std::collections::VecDeque;

use geo::{Area, Coord, Line, LineString, Polygon};
use log::debug;
use pgplanet_core::GeometryBuilder;

use crate::wkt;

/// Assembles the edges of one shape into WKT geometries.
///
/// Edges sharing an endpoint are chained into maximal polylines in input
/// order: each chain grows forward from its tail, then backward from its
/// head. A closed chain of at least four coordinates becomes a polygon when
/// the caller hints that the shape is an area; any other chain becomes a
/// line string. Rings that enclose no area yield an empty entry.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use pgplanet_core::GeometryBuilder;
/// use pgplanet_data::SegmentAssembler;
///
/// let mut builder = SegmentAssembler::default();
/// builder.add_segment(Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 0.0 });
/// builder.add_segment(Coord { x: 1.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 });
/// assert_eq!(builder.build_geometry(false), 1);
/// assert_eq!(builder.get_wkt(0), "LINESTRING(0 0,1 0,1 1)");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SegmentAssembler {
    pending: Vec<Line<f64>>,
    wkts: Vec<String>,
}

impl SegmentAssembler {
    fn chains(&mut self) -> Vec<Vec<Coord<f64>>> {
        let mut unused: Vec<Option<Line<f64>>> = self.pending.drain(..).map(Some).collect();
        let mut chains = Vec::new();
        for index in 0..unused.len() {
            let Some(first) = unused.get_mut(index).and_then(Option::take) else {
                continue;
            };
            let mut chain = VecDeque::from([first.start, first.end]);
            while let Some(next) = chain.back().and_then(|&tail| take_adjacent(&mut unused, tail)) {
                chain.push_back(next);
            }
            while let Some(prev) = chain.front().and_then(|&head| take_adjacent(&mut unused, head))
            {
                chain.push_front(prev);
            }
            chains.push(Vec::from(chain));
        }
        chains
    }

    fn render(coords: Vec<Coord<f64>>, polygon_hint: bool) -> String {
        let closed = coords.len() >= 4 && coords.first() == coords.last();
        let line = LineString::from(coords);
        if !(polygon_hint && closed) {
            return wkt::line_string(&line);
        }
        let polygon = Polygon::new(line, Vec::new());
        if polygon.unsigned_area() > 0.0 {
            wkt::polygon(&polygon)
        } else {
            debug!("Skipping ring without area");
            String::new()
        }
    }
}

/// Remove the first unused edge touching `at` and return its far endpoint.
fn take_adjacent(unused: &mut [Option<Line<f64>>], at: Coord<f64>) -> Option<Coord<f64>> {
    unused.iter_mut().find_map(|slot| {
        let line = (*slot)?;
        let far = if line.start == at {
            line.end
        } else if line.end == at {
            line.start
        } else {
            return None;
        };
        *slot = None;
        Some(far)
    })
}

impl GeometryBuilder for SegmentAssembler {
    fn add_segment(&mut self, from: Coord<f64>, to: Coord<f64>) {
        self.pending.push(Line::new(from, to));
    }

    fn build_geometry(&mut self, polygon_hint: bool) -> usize {
        let chains = self.chains();
        self.wkts = chains
            .into_iter()
            .map(|coords| Self::render(coords, polygon_hint))
            .collect();
        self.wkts.len()
    }

    fn get_wkt(&self, index: usize) -> &str {
        self.wkts.get(index).map_or("", String::as_str)
    }

    fn clear_wkts(&mut self) {
        self.wkts.clear();
    }
}
