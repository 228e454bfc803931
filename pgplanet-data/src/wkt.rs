//! Well-known text serialization of `geo` geometries.
//!
//! Coordinates use Rust's shortest round-trip float formatting, so whole
//! numbers print without a fractional part (`POINT(10 20)`).

use std::fmt::Write as _;

use geo::{Coord, LineString, Polygon};

/// `POINT(x y)`.
#[must_use]
pub fn point(coord: Coord<f64>) -> String {
    format!("POINT({} {})", coord.x, coord.y)
}

/// `LINESTRING(x y,x y,...)`.
#[must_use]
pub fn line_string(line: &LineString<f64>) -> String {
    let mut out = String::from("LINESTRING(");
    push_coords(&mut out, line);
    out.push(')');
    out
}

/// `POLYGON((exterior),(interior),...)`.
#[must_use]
pub fn polygon(polygon: &Polygon<f64>) -> String {
    let mut out = String::from("POLYGON(");
    for (index, ring) in std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .enumerate()
    {
        if index > 0 {
            out.push(',');
        }
        out.push('(');
        push_coords(&mut out, ring);
        out.push(')');
    }
    out.push(')');
    out
}

fn push_coords(out: &mut String, line: &LineString<f64>) {
    for (index, coord) in line.coords().enumerate() {
        if index > 0 {
            out.push(',');
        }
        // Writing to a String cannot fail.
        let _ = write!(out, "{} {}", coord.x, coord.y);
    }
}
