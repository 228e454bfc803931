//! Hash-map-backed store for scattered identifiers.

use std::collections::HashMap;

use super::{EntityError, EntityStore, IdBounds, check_slot};
use crate::{Edge, EntityKind, Point};

/// Sparse [`EntityStore`] keyed by identifier.
#[derive(Debug, Clone)]
pub struct SparseStore {
    bounds: IdBounds,
    points: HashMap<u64, Point>,
    edges: HashMap<u64, Edge>,
}

impl SparseStore {
    /// Create an empty store enforcing `bounds`.
    #[must_use]
    pub fn new(bounds: IdBounds) -> Self {
        Self {
            bounds,
            points: HashMap::new(),
            edges: HashMap::new(),
        }
    }
}

impl EntityStore for SparseStore {
    fn get_point(&self, id: u64) -> Option<Point> {
        self.points
            .get(&id)
            .filter(|point| point.is_present())
            .copied()
    }

    fn put_point(&mut self, id: u64, point: Point) -> Result<(), EntityError> {
        let id = check_slot(self.bounds, EntityKind::Point, id)?;
        self.points
            .try_reserve(1)
            .map_err(|_| EntityError::ResourceExhausted {
                kind: EntityKind::Point,
                requested: self.points.len().saturating_add(1),
            })?;
        self.points.insert(id, point);
        Ok(())
    }

    fn get_edge(&self, id: u64) -> Option<Edge> {
        self.edges
            .get(&id)
            .filter(|edge| edge.is_present())
            .copied()
    }

    fn put_edge(&mut self, id: u64, edge: Edge) -> Result<(), EntityError> {
        let id = check_slot(self.bounds, EntityKind::Edge, id)?;
        self.edges
            .try_reserve(1)
            .map_err(|_| EntityError::ResourceExhausted {
                kind: EntityKind::Edge,
                requested: self.edges.len().saturating_add(1),
            })?;
        self.edges.insert(id, edge);
        Ok(())
    }

    fn bounds(&self) -> IdBounds {
        self.bounds
    }
}
