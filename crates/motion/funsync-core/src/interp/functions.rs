//! Pure interpolation functions over keyframe coordinates.
//!
//! All functions return an unclamped value; callers clamp to [0,1] as needed.
//! Windows are ordered by position; degenerate (zero-width) segments fall back
//! to the left value.

use crate::keyframes::Keyframe;

/// Linear interpolation of scalars.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Step interpolation: the left keyframe's value holds across the segment.
#[inline]
pub fn step(k0: Keyframe) -> f64 {
    k0.value
}

/// Two-point linear interpolation at `position` between `k0` and `k1`.
#[inline]
pub fn linear(k0: Keyframe, k1: Keyframe, position: f64) -> f64 {
    let h = k1.position - k0.position;
    if h <= f64::EPSILON {
        return k0.value;
    }
    lerp(k0.value, k1.value, (position - k0.position) / h)
}

#[inline]
fn slope(a: Keyframe, b: Keyframe) -> f64 {
    let h = b.position - a.position;
    if h.abs() <= f64::EPSILON {
        0.0
    } else {
        (b.value - a.value) / h
    }
}

/// Cubic Hermite basis evaluation on `[k0, k1]` with endpoint tangents.
#[inline]
fn hermite(k0: Keyframe, k1: Keyframe, m0: f64, m1: f64, position: f64) -> f64 {
    let h = k1.position - k0.position;
    if h <= f64::EPSILON {
        return k0.value;
    }
    let t = (position - k0.position) / h;
    let t2 = t * t;
    let t3 = t2 * t;
    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + t;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;
    h00 * k0.value + h10 * h * m0 + h01 * k1.value + h11 * h * m1
}

/// Fritsch–Carlson tangent at the shared knot of two adjacent segments.
/// Returns 0 at local extrema (sign change or flat), otherwise a weighted
/// harmonic mean of the adjacent slopes. Guarantees monotone segments never
/// overshoot.
#[inline]
fn pchip_tangent(h_prev: f64, h_next: f64, d_prev: f64, d_next: f64) -> f64 {
    if d_prev * d_next <= 0.0 {
        return 0.0;
    }
    let w1 = 2.0 * h_next + h_prev;
    let w2 = h_next + 2.0 * h_prev;
    let m = (w1 + w2) / (w1 / d_prev + w2 / d_next);
    if m.is_finite() {
        m
    } else {
        0.0
    }
}

/// Monotone cubic Hermite interpolation (PCHIP) over the segment
/// `[window[1], window[2]]`; `window[0]`/`window[3]` are the outer neighbors.
pub fn pchip(window: [Keyframe; 4], position: f64) -> f64 {
    let [km1, k0, k1, k2] = window;
    let h_prev = k0.position - km1.position;
    let h = k1.position - k0.position;
    let h_next = k2.position - k1.position;
    let d_prev = slope(km1, k0);
    let d = slope(k0, k1);
    let d_next = slope(k1, k2);

    let m0 = pchip_tangent(h_prev, h, d_prev, d);
    let m1 = pchip_tangent(h, h_next, d, d_next);
    hermite(k0, k1, m0, m1, position)
}

/// Modified Akima weight: slope-difference magnitude plus half the slope-sum
/// magnitude. The second term is the "modified" part that keeps nearly-equal
/// slopes from producing wild tangents.
#[inline]
fn makima_weight(da: f64, db: f64) -> f64 {
    (da - db).abs() + (da + db).abs() / 2.0
}

#[inline]
fn makima_tangent(d_mm: f64, d_m: f64, d: f64, d_p: f64) -> f64 {
    let w1 = makima_weight(d_p, d);
    let w2 = makima_weight(d_m, d_mm);
    let denom = w1 + w2;
    if denom <= f64::EPSILON {
        // All four slopes equal (typically a flat region): reduce to linear.
        return d;
    }
    (w1 * d_m + w2 * d) / denom
}

/// Modified Akima interpolation over the segment `[window[2], window[3]]`;
/// the remaining four entries are the two outer neighbors on each side.
pub fn makima(window: [Keyframe; 6], position: f64) -> f64 {
    let [km2, km1, k0, k1, k2, k3] = window;
    let d_mm = slope(km2, km1);
    let d_m = slope(km1, k0);
    let d = slope(k0, k1);
    let d_p = slope(k1, k2);
    let d_pp = slope(k2, k3);

    let m0 = makima_tangent(d_mm, d_m, d, d_p);
    let m1 = makima_tangent(d_m, d, d_p, d_pp);
    hermite(k0, k1, m0, m1, position)
}
