//! Run statistics and the end-of-run summary.

use log::info;

use crate::EntityKind;

/// Output counters for one entity kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityCounts {
    /// Rows emitted (points, shapes) or unique entities stored (edges).
    pub emitted: u64,
    /// Entities folded into an earlier equivalent.
    pub duplicates: u64,
    /// Records seen in the input.
    pub total: u64,
}

impl EntityCounts {
    /// Share of duplicates among all records, in percent.
    #[must_use]
    pub fn duplicate_percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        100.0 * self.duplicates as f64 / self.total as f64
    }
}

/// Counters accumulated over a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunStats {
    pub points: EntityCounts,
    pub edges: EntityCounts,
    pub shapes: EntityCounts,
    /// Child references repeated within the same shape.
    pub duplicate_child_refs: u64,
    /// Edges or child references pointing at absent entities.
    pub dangling_refs: u64,
    /// Records dropped for missing, unparsable or out-of-range attributes.
    pub malformed_records: u64,
    /// Tags without a key or value; the enclosing record is still kept.
    pub malformed_tags: u64,
    /// Edges whose canonical endpoints coincide.
    pub self_loops: u64,
    /// Exportable shapes that produced no geometry.
    pub empty_geometries: u64,
}

impl RunStats {
    /// Counters for `kind`.
    #[must_use]
    pub const fn counts(&self, kind: EntityKind) -> &EntityCounts {
        match kind {
            EntityKind::Point => &self.points,
            EntityKind::Edge => &self.edges,
            EntityKind::Shape => &self.shapes,
        }
    }

    /// Mutable counters for `kind`.
    pub fn counts_mut(&mut self, kind: EntityKind) -> &mut EntityCounts {
        match kind {
            EntityKind::Point => &mut self.points,
            EntityKind::Edge => &mut self.edges,
            EntityKind::Shape => &mut self.shapes,
        }
    }

    /// Log the end-of-run summary.
    pub fn log_summary(&self) {
        for (label, kind) in [
            ("Node", EntityKind::Point),
            ("Segment", EntityKind::Edge),
            ("Way", EntityKind::Shape),
        ] {
            let counts = self.counts(kind);
            if counts.total == 0 {
                continue;
            }
            info!(
                "{label} stats: out({}), dupe({}) ({:.1}%), total({})",
                counts.emitted,
                counts.duplicates,
                counts.duplicate_percentage(),
                counts.total
            );
        }
        info!(
            "Way stats: duplicate segments in ways {}",
            self.duplicate_child_refs
        );
        info!(
            "Dropped: malformed({}), dangling references({}), self-loops({}), empty geometries({}), incomplete tags({})",
            self.malformed_records,
            self.dangling_refs,
            self.self_loops,
            self.empty_geometries,
            self.malformed_tags
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0, 0.0)]
    #[case(4, 1, 25.0)]
    #[case(3, 3, 100.0)]
    fn duplicate_percentage(#[case] total: u64, #[case] duplicates: u64, #[case] expected: f64) {
        let counts = EntityCounts {
            emitted: 0,
            duplicates,
            total,
        };
        assert!((counts.duplicate_percentage() - expected).abs() < f64::EPSILON);
    }

    #[rstest]
    fn counts_mut_targets_the_requested_kind() {
        let mut stats = RunStats::default();
        stats.counts_mut(EntityKind::Edge).total += 2;
        assert_eq!(stats.edges.total, 2);
        assert_eq!(stats.points.total, 0);
    }
}
