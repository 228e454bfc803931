//! Vector-backed store indexed directly by identifier.

use super::{EntityError, EntityStore, IdBounds, check_slot};
use crate::{Edge, EntityKind, Point};

/// Dense [`EntityStore`] whose slots are addressed by raw identifier.
///
/// Slots are allocated lazily up to the highest identifier seen, doubling
/// the capacity on growth but never beyond the configured bound.
#[derive(Debug, Clone)]
pub struct DenseStore {
    bounds: IdBounds,
    points: Vec<Point>,
    edges: Vec<Edge>,
}

impl DenseStore {
    /// Create an empty store enforcing `bounds`.
    #[must_use]
    pub const fn new(bounds: IdBounds) -> Self {
        Self {
            bounds,
            points: Vec::new(),
            edges: Vec::new(),
        }
    }
}

fn ensure_slot<T: Default + Clone>(
    slots: &mut Vec<T>,
    kind: EntityKind,
    index: usize,
    limit: u64,
) -> Result<(), EntityError> {
    if index < slots.len() {
        return Ok(());
    }
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    let target = index
        .saturating_add(1)
        .max(slots.len().saturating_mul(2))
        .min(limit)
        .max(index.saturating_add(1));
    let additional = target - slots.len();
    slots
        .try_reserve_exact(additional)
        .map_err(|_| EntityError::ResourceExhausted {
            kind,
            requested: target,
        })?;
    slots.resize(target, T::default());
    Ok(())
}

fn slot_index(kind: EntityKind, id: u64) -> Result<usize, EntityError> {
    usize::try_from(id).map_err(|_| EntityError::ResourceExhausted {
        kind,
        requested: usize::MAX,
    })
}

impl EntityStore for DenseStore {
    fn get_point(&self, id: u64) -> Option<Point> {
        let index = usize::try_from(id).ok()?;
        self.points
            .get(index)
            .filter(|point| point.is_present())
            .copied()
    }

    fn put_point(&mut self, id: u64, point: Point) -> Result<(), EntityError> {
        let id = check_slot(self.bounds, EntityKind::Point, id)?;
        let index = slot_index(EntityKind::Point, id)?;
        ensure_slot(&mut self.points, EntityKind::Point, index, self.bounds.max_point)?;
        if let Some(slot) = self.points.get_mut(index) {
            *slot = point;
        }
        Ok(())
    }

    fn get_edge(&self, id: u64) -> Option<Edge> {
        let index = usize::try_from(id).ok()?;
        self.edges
            .get(index)
            .filter(|edge| edge.is_present())
            .copied()
    }

    fn put_edge(&mut self, id: u64, edge: Edge) -> Result<(), EntityError> {
        let id = check_slot(self.bounds, EntityKind::Edge, id)?;
        let index = slot_index(EntityKind::Edge, id)?;
        ensure_slot(&mut self.edges, EntityKind::Edge, index, self.bounds.max_edge)?;
        if let Some(slot) = self.edges.get_mut(index) {
            *slot = edge;
        }
        Ok(())
    }

    fn bounds(&self) -> IdBounds {
        self.bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const BOUNDS: IdBounds = IdBounds {
        max_point: 1_000,
        max_edge: 500,
    };

    #[rstest]
    fn point_slots_grow_geometrically() {
        let mut store = DenseStore::new(BOUNDS);
        store.put_point(3, Point::new(3, 0.0, 0.0)).expect("store");
        store.put_point(5, Point::new(5, 0.0, 0.0)).expect("store");
        assert_eq!(store.points.len(), 8, "capacity doubles from four slots");
        store
            .put_point(900, Point::new(900, 0.0, 0.0))
            .expect("store");
        assert_eq!(store.points.len(), 901);
    }

    #[rstest]
    fn edge_slots_stop_at_the_bound() {
        let mut store = DenseStore::new(BOUNDS);
        store.put_edge(300, Edge { id: 300, from: 1, to: 2 }).expect("store");
        store.put_edge(301, Edge { id: 301, from: 1, to: 2 }).expect("store");
        assert_eq!(store.edges.len(), 500, "growth is capped at max_edge");
        assert_eq!(store.get_edge(301), Some(Edge { id: 301, from: 1, to: 2 }));
    }
}
