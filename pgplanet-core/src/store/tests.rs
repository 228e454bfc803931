//! Unit tests covering both entity store layouts.

use super::*;
use rstest::rstest;

const BOUNDS: IdBounds = IdBounds {
    max_point: 1_000,
    max_edge: 500,
};

#[rstest]
#[case(StorageKind::Dense)]
#[case(StorageKind::Sparse)]
fn stores_and_fetches_points(#[case] kind: StorageKind) {
    let mut store = kind.build(BOUNDS);
    store
        .put_point(42, Point::new(42, 10.0, 20.0))
        .expect("store point");

    assert_eq!(store.get_point(42), Some(Point::new(42, 10.0, 20.0)));
    assert_eq!(store.get_point(41), None, "neighbouring slot stays empty");
    assert_eq!(store.get_point(999), None, "unallocated slot is absent");
}

#[rstest]
#[case(StorageKind::Dense)]
#[case(StorageKind::Sparse)]
fn redefinition_overwrites_slot(#[case] kind: StorageKind) {
    let mut store = kind.build(BOUNDS);
    store
        .put_point(7, Point::new(7, 1.0, 1.0))
        .expect("first write");
    store
        .put_point(7, Point::new(3, 2.0, 2.0))
        .expect("second write");

    let point = store.get_point(7).expect("point present");
    assert_eq!(point.id, 3, "canonical id follows the last write");
    assert_eq!(point.lon(), 2.0);
}

#[rstest]
#[case(StorageKind::Dense, 0)]
#[case(StorageKind::Dense, 1_000)]
#[case(StorageKind::Sparse, 0)]
#[case(StorageKind::Sparse, 5_000)]
fn rejects_out_of_range_point_ids(#[case] kind: StorageKind, #[case] id: u64) {
    let mut store = kind.build(BOUNDS);
    let err = store
        .put_point(id, Point::new(id, 0.0, 0.0))
        .expect_err("id outside bounds");
    assert!(matches!(
        err,
        EntityError::InvalidIdentifier {
            kind: EntityKind::Point,
            max: 1_000,
            ..
        }
    ));
}

#[rstest]
#[case(StorageKind::Dense)]
#[case(StorageKind::Sparse)]
fn edges_use_their_own_bound(#[case] kind: StorageKind) {
    let mut store = kind.build(BOUNDS);
    let edge = Edge {
        id: 499,
        from: 1,
        to: 2,
    };
    store.put_edge(499, edge).expect("edge within bound");
    assert_eq!(store.get_edge(499), Some(edge));

    let err = store
        .put_edge(
            500,
            Edge {
                id: 500,
                from: 1,
                to: 2,
            },
        )
        .expect_err("edge at the bound");
    assert!(matches!(err, EntityError::InvalidIdentifier { .. }));
}

#[rstest]
#[case("dense", StorageKind::Dense)]
#[case(" Sparse ", StorageKind::Sparse)]
fn parses_storage_kind(#[case] raw: &str, #[case] expected: StorageKind) {
    assert_eq!(raw.parse::<StorageKind>(), Ok(expected));
}

#[rstest]
fn rejects_unknown_storage_kind() {
    assert!("mmap".parse::<StorageKind>().is_err());
}
