//! Deterministic 2D coherent noise (OpenSimplex style) for randomizer
//! dithering.
//!
//! The permutation table is a pure function of the seed (fixed LCG shuffle),
//! so the same `RandomizerSeed` reproduces the same dither sequence across
//! restarts. No process-global RNG is involved.

const STRETCH_2D: f64 = -0.211_324_865_405_187; // (1 / sqrt(2 + 1) - 1) / 2
const SQUISH_2D: f64 = 0.366_025_403_784_439; // (sqrt(2 + 1) - 1) / 2
const NORM_2D: f64 = 47.0;

const LCG_MUL: i64 = 6_364_136_223_846_793_005;
const LCG_ADD: i64 = 1_442_695_040_888_963_407;

/// Gradient pairs for the eight lattice directions.
const GRADIENTS_2D: [i8; 16] = [5, 2, 2, 5, -5, 2, -2, 5, 5, -2, 2, -5, -5, -2, -2, -5];

/// Seeded 2D coherent-noise source. Construction builds a 256-entry
/// permutation table; evaluation is read-only and thread-safe.
#[derive(Clone, Debug)]
pub struct NoiseGenerator {
    perm: [i16; 256],
    seed: i64,
}

impl NoiseGenerator {
    pub fn new(seed: i64) -> Self {
        let mut source = [0i16; 256];
        for (i, v) in source.iter_mut().enumerate() {
            *v = i as i16;
        }

        let mut state = seed;
        for _ in 0..3 {
            state = state.wrapping_mul(LCG_MUL).wrapping_add(LCG_ADD);
        }

        let mut perm = [0i16; 256];
        for i in (0..256usize).rev() {
            state = state.wrapping_mul(LCG_MUL).wrapping_add(LCG_ADD);
            let mut r = ((state.wrapping_add(31)) % (i as i64 + 1)) as i32;
            if r < 0 {
                r += i as i32 + 1;
            }
            perm[i] = source[r as usize];
            source[r as usize] = source[i];
        }

        Self { perm, seed }
    }

    /// Seed this generator was constructed with.
    #[inline]
    pub fn seed(&self) -> i64 {
        self.seed
    }

    #[inline]
    fn extrapolate(&self, xsb: i64, ysb: i64, dx: f64, dy: f64) -> f64 {
        let px = self.perm[(xsb & 0xFF) as usize] as i64;
        let index = (self.perm[((px + ysb) & 0xFF) as usize] & 0x0E) as usize;
        GRADIENTS_2D[index] as f64 * dx + GRADIENTS_2D[index + 1] as f64 * dy
    }

    /// Evaluate 2D noise at `(x, y)`. Output is in [-1, 1].
    pub fn calculate_2d(&self, x: f64, y: f64) -> f64 {
        // Place input on the stretched grid.
        let stretch_offset = (x + y) * STRETCH_2D;
        let xs = x + stretch_offset;
        let ys = y + stretch_offset;

        // Rhombus origin on the squished grid.
        let xsb = xs.floor() as i64;
        let ysb = ys.floor() as i64;

        let squish_offset = (xsb + ysb) as f64 * SQUISH_2D;
        let xb = xsb as f64 + squish_offset;
        let yb = ysb as f64 + squish_offset;

        // Position relative to the rhombus origin.
        let xins = xs - xsb as f64;
        let yins = ys - ysb as f64;
        let in_sum = xins + yins;

        let dx0 = x - xb;
        let dy0 = y - yb;

        let mut value = 0.0;

        // Contribution (1, 0).
        let dx1 = dx0 - 1.0 - SQUISH_2D;
        let dy1 = dy0 - SQUISH_2D;
        let mut attn1 = 2.0 - dx1 * dx1 - dy1 * dy1;
        if attn1 > 0.0 {
            attn1 *= attn1;
            value += attn1 * attn1 * self.extrapolate(xsb + 1, ysb, dx1, dy1);
        }

        // Contribution (0, 1).
        let dx2 = dx0 - SQUISH_2D;
        let dy2 = dy0 - 1.0 - SQUISH_2D;
        let mut attn2 = 2.0 - dx2 * dx2 - dy2 * dy2;
        if attn2 > 0.0 {
            attn2 *= attn2;
            value += attn2 * attn2 * self.extrapolate(xsb, ysb + 1, dx2, dy2);
        }

        let (xsv_ext, ysv_ext, dx_ext, dy_ext);
        if in_sum <= 1.0 {
            // Inside the triangle (2-simplex) at (0, 0).
            let zins = 1.0 - in_sum;
            if zins > xins || zins > yins {
                // (0, 0) is one of the closest two triangular vertices.
                if xins > yins {
                    xsv_ext = xsb + 1;
                    ysv_ext = ysb - 1;
                    dx_ext = dx0 - 1.0;
                    dy_ext = dy0 + 1.0;
                } else {
                    xsv_ext = xsb - 1;
                    ysv_ext = ysb + 1;
                    dx_ext = dx0 + 1.0;
                    dy_ext = dy0 - 1.0;
                }
            } else {
                // (1, 0) and (0, 1) are the closest two vertices.
                xsv_ext = xsb + 1;
                ysv_ext = ysb + 1;
                dx_ext = dx0 - 1.0 - 2.0 * SQUISH_2D;
                dy_ext = dy0 - 1.0 - 2.0 * SQUISH_2D;
            }
        } else {
            // Inside the triangle (2-simplex) at (1, 1).
            let zins = 2.0 - in_sum;
            if zins < xins || zins < yins {
                // (0, 0) is one of the closest two triangular vertices.
                if xins > yins {
                    xsv_ext = xsb + 2;
                    ysv_ext = ysb;
                    dx_ext = dx0 - 2.0 - 2.0 * SQUISH_2D;
                    dy_ext = dy0 - 2.0 * SQUISH_2D;
                } else {
                    xsv_ext = xsb;
                    ysv_ext = ysb + 2;
                    dx_ext = dx0 - 2.0 * SQUISH_2D;
                    dy_ext = dy0 - 2.0 - 2.0 * SQUISH_2D;
                }
            } else {
                // (1, 0) and (0, 1) are the closest two vertices.
                xsv_ext = xsb;
                ysv_ext = ysb;
                dx_ext = dx0;
                dy_ext = dy0;
            }
        }

        let (xsb, ysb, dx0, dy0) = if in_sum <= 1.0 {
            (xsb, ysb, dx0, dy0)
        } else {
            (
                xsb + 1,
                ysb + 1,
                dx0 - 1.0 - 2.0 * SQUISH_2D,
                dy0 - 1.0 - 2.0 * SQUISH_2D,
            )
        };

        // Contribution (0, 0) or (1, 1).
        let mut attn0 = 2.0 - dx0 * dx0 - dy0 * dy0;
        if attn0 > 0.0 {
            attn0 *= attn0;
            value += attn0 * attn0 * self.extrapolate(xsb, ysb, dx0, dy0);
        }

        // Extra vertex.
        let mut attn_ext = 2.0 - dx_ext * dx_ext - dy_ext * dy_ext;
        if attn_ext > 0.0 {
            attn_ext *= attn_ext;
            value += attn_ext * attn_ext * self.extrapolate(xsv_ext, ysv_ext, dx_ext, dy_ext);
        }

        value / NORM_2D
    }

    /// Noise remapped to [0, 1], as consumed by the randomizer blend.
    #[inline]
    pub fn calculate_2d_01(&self, x: f64, y: f64) -> f64 {
        (self.calculate_2d(x, y) + 1.0) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let a = NoiseGenerator::new(1337);
        let b = NoiseGenerator::new(1337);
        for i in 0..256 {
            let x = i as f64 * 0.173;
            assert_eq!(a.calculate_2d(x, 2.0), b.calculate_2d(x, 2.0));
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let a = NoiseGenerator::new(1);
        let b = NoiseGenerator::new(2);
        let diverged = (0..64).any(|i| {
            let x = i as f64 * 0.379;
            a.calculate_2d(x, 0.0) != b.calculate_2d(x, 0.0)
        });
        assert!(diverged);
    }

    #[test]
    fn output_stays_in_unit_interval() {
        let noise = NoiseGenerator::new(-42);
        for i in 0..2048 {
            let x = i as f64 * 0.0917;
            let v = noise.calculate_2d(x, x * 0.37);
            assert!((-1.0..=1.0).contains(&v), "out of range: {v}");
            let v01 = noise.calculate_2d_01(x, x * 0.37);
            assert!((0.0..=1.0).contains(&v01));
        }
    }
}
