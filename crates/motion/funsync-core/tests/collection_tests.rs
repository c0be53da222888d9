use funsync_core::keyframes::{Keyframe, KeyframeCollection, KeyframeCollectionBuilder};
use funsync_core::InterpolationKind;

fn approx(a: f64, b: f64, eps: f64) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn collection(points: &[(f64, f64)]) -> KeyframeCollection {
    KeyframeCollection::from_points(points.iter().copied(), false)
}

/// it should keep the collection sorted for any insertion order
#[test]
fn add_in_arbitrary_order_stays_sorted() {
    let scrambled = [3.0, 0.5, 2.0, 0.5, 7.25, 1.0, 0.0, 4.5, 2.0];
    let mut builder = KeyframeCollectionBuilder::new();
    for (i, &p) in scrambled.iter().enumerate() {
        builder.add(Keyframe::new(p, i as f64 / 10.0));
    }
    let built = builder.build();
    let mut last = f64::NEG_INFINITY;
    for k in built.iter() {
        assert!(k.position >= last, "unsorted at position {}", k.position);
        last = k.position;
    }
    assert_eq!(built.len(), scrambled.len());
}

/// it should keep equal-position keyframes in insertion order
#[test]
fn tie_insertion_is_stable() {
    let mut builder = KeyframeCollectionBuilder::new();
    builder.add(Keyframe::new(1.0, 0.1));
    builder.add(Keyframe::new(1.0, 0.2));
    builder.add(Keyframe::new(0.0, 0.0));
    builder.add(Keyframe::new(1.0, 0.3));
    let built = builder.build();
    let values: Vec<f64> = built.iter().map(|k| k.value).collect();
    assert_eq!(values, vec![0.0, 0.1, 0.2, 0.3]);
}

#[test]
fn search_boundaries() {
    let c = collection(&[(1.0, 0.0), (2.0, 0.5), (3.0, 1.0)]);
    assert_eq!(c.search_index_after(-1.0), 0);
    assert_eq!(c.search_index_after(0.99), 0);
    assert_eq!(c.search_index_after(2.0), 1); // exact match
    assert_eq!(c.search_index_after(10.0), c.len());
    assert_eq!(c.search_index_before(0.5), -1);
    assert_eq!(c.search_index_before(2.5), 1);
}

/// it should produce the same index as a fresh binary search for any
/// monotone query sequence
#[test]
fn advance_matches_binary_search() {
    let c = collection(&[
        (0.0, 0.0),
        (0.5, 0.3),
        (1.0, 0.8),
        (2.0, 0.2),
        (3.5, 0.9),
        (3.5, 0.7),
        (7.0, 0.1),
    ]);
    let mut cursor = -1i64;
    let mut q = -0.5;
    while q < 8.0 {
        cursor = c.advance_index(cursor, q);
        assert_eq!(
            cursor,
            c.search_index_before(q),
            "divergence at query {q}"
        );
        q += 0.093;
    }
}

#[test]
fn end_to_end_linear_example() {
    let c = collection(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]);
    assert_eq!(c.search_index_after(-1.0), 0);

    let i = c.search_index_before(0.5);
    approx(c.interpolate(i as usize, 0.5, InterpolationKind::Linear), 0.5, 1e-12);

    let i = c.search_index_before(1.5);
    approx(c.interpolate(i as usize, 1.5, InterpolationKind::Linear), 0.5, 1e-12);
}

#[test]
fn gap_detection_and_skip() {
    let c = collection(&[(0.0, 0.5), (0.0005, 0.5001)]);
    assert!(c.is_gap(0));

    let c = collection(&[(0.0, 0.0), (0.0002, 0.0001), (0.0004, 0.5), (1.0, 1.0)]);
    assert!(c.is_gap(0));
    assert_eq!(c.skip_gap(0), 2);
    assert!(!c.is_gap(2));
    // Out-of-range segments are not gaps.
    assert!(!c.is_gap(10));
}

#[test]
fn segment_duration_out_of_range_is_negative() {
    let c = collection(&[(0.0, 0.0), (0.25, 1.0)]);
    approx(c.segment_duration(0), 0.25, 1e-12);
    assert_eq!(c.segment_duration(1), -1.0);
    assert_eq!(c.segment_duration(99), -1.0);
}

/// it should force linear interpolation on raw collections
#[test]
fn raw_collections_interpolate_linearly() {
    let points = [(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)];
    let smooth = KeyframeCollection::from_points(points, false);
    let raw = KeyframeCollection::from_points(points, true);

    approx(raw.interpolate(0, 0.5, InterpolationKind::Pchip), 0.5, 1e-12);
    // The smooth collection actually honors the Pchip request.
    let curved = smooth.interpolate(0, 0.5, InterpolationKind::Pchip);
    assert!((curved - 0.5).abs() > 1e-6);
}
