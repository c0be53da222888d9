use funsync_core::keyframes::KeyframeCollection;
use funsync_core::InterpolationKind;

fn approx(a: f64, b: f64, eps: f64) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

const POINTS: [(f64, f64); 5] = [
    (0.0, 0.1),
    (0.7, 0.9),
    (1.3, 0.2),
    (2.0, 0.6),
    (2.9, 0.4),
];

/// it should reproduce every keyframe's value exactly at its own position
#[test]
fn continuity_at_knots() {
    let c = KeyframeCollection::from_points(POINTS, false);
    for kind in [
        InterpolationKind::Linear,
        InterpolationKind::Pchip,
        InterpolationKind::Makima,
    ] {
        for i in 0..c.len() - 1 {
            let left = c.get(i).unwrap();
            let right = c.get(i + 1).unwrap();
            approx(c.interpolate(i, left.position, kind), left.value, 1e-9);
            approx(c.interpolate(i, right.position, kind), right.value, 1e-9);
        }
    }
}

#[test]
fn step_holds_left_value_across_segment() {
    let c = KeyframeCollection::from_points(POINTS, false);
    approx(c.interpolate(0, 0.0, InterpolationKind::Step), 0.1, 1e-12);
    approx(
        c.interpolate(0, 0.7 - 1e-9, InterpolationKind::Step),
        0.1,
        1e-12,
    );
}

/// it should never overshoot local extrema (no ringing on fast transitions)
#[test]
fn pchip_is_monotone_within_monotone_data() {
    let c = KeyframeCollection::from_points([(0.0, 0.0), (1.0, 0.1), (2.0, 0.9), (3.0, 1.0)], false);
    for i in 0..c.len() - 1 {
        let left = c.get(i).unwrap();
        let right = c.get(i + 1).unwrap();
        let (lo, hi) = (
            left.value.min(right.value),
            left.value.max(right.value),
        );
        for step in 0..=100 {
            let p = left.position + (right.position - left.position) * step as f64 / 100.0;
            let v = c.interpolate(i, p, InterpolationKind::Pchip);
            assert!(
                (lo - 1e-9..=hi + 1e-9).contains(&v),
                "overshoot at {p}: {v} outside [{lo}, {hi}]"
            );
        }
    }
}

/// it should reduce to a flat line on flat regions
#[test]
fn makima_stays_flat_on_flat_data() {
    let c = KeyframeCollection::from_points(
        [(0.0, 0.5), (1.0, 0.5), (2.0, 0.5), (3.0, 0.5), (4.0, 0.5), (5.0, 0.5)],
        false,
    );
    for i in 0..c.len() - 1 {
        for step in 0..=20 {
            let p = i as f64 + step as f64 / 20.0;
            approx(c.interpolate(i, p, InterpolationKind::Makima), 0.5, 1e-12);
        }
    }
}

/// it should synthesize boundary neighbors instead of failing on short
/// collections
#[test]
fn boundary_extrapolation_on_two_points() {
    let c = KeyframeCollection::from_points([(0.0, 0.0), (1.0, 1.0)], false);
    for kind in [
        InterpolationKind::Linear,
        InterpolationKind::Pchip,
        InterpolationKind::Makima,
    ] {
        approx(c.interpolate(0, 0.0, kind), 0.0, 1e-9);
        approx(c.interpolate(0, 1.0, kind), 1.0, 1e-9);
        // Reflected neighbors make the two-point case exactly linear.
        approx(c.interpolate(0, 0.25, kind), 0.25, 1e-9);
    }
}
