//! The escape-time half of the Mandelbrot: how long a point survives
//! being squared and shifted before it runs off towards infinity, and
//! a continuous refinement of that count for smooth gradients.

use num::Complex;

/// The iteration cap for a point that never escapes.
pub const MAX_ITERATIONS: usize = 1000;

/// Squared magnitude past which an orbit is known to escape.
pub const ESCAPE_RADIUS_SQR: f64 = 4.0;

const D4: f64 = 1.0 / 4.0;
const D16: f64 = D4 / 4.0;

/// The fate of a single point of the complex plane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Escape {
    /// The point stayed bounded for the whole iteration budget, or
    /// it lies in a region known never to escape.
    Interior,
    /// The orbit left the escape radius.  `z` is the first orbit value
    /// outside it, and `iterations` the number of steps it took.
    Escaped {
        /// Steps taken before the orbit left the escape radius.
        iterations: usize,
        /// The orbit value at escape.
        z: Complex<f64>,
    },
}

/// True when the point sits inside the main cardioid or the period-2
/// bulb.  Both are closed-form, and every point inside them is in the
/// Mandelbrot set, so the iteration can be skipped entirely.
pub fn in_main_bulbs(point: Complex<f64>) -> bool {
    let y2 = point.im * point.im;
    let shifted = point.re - D4;
    let q = shifted * shifted + y2;
    if q * (q + shifted) < D4 * y2 {
        return true;
    }
    let bulb = point.re + 1.0;
    bulb * bulb + y2 < D16
}

/// This is our classic iterator function.  It stops at the first
/// orbit value whose squared magnitude reaches the escape radius, or
/// when `limit` iterations have been spent.  Running out of budget on
/// the very step that escapes still counts as interior.
pub fn escape_time(point: Complex<f64>, limit: usize) -> Escape {
    if in_main_bulbs(point) {
        return Escape::Interior;
    }
    let mut z: Complex<f64> = Complex { re: 0.0, im: 0.0 };
    let mut iterations = 0;
    while z.norm_sqr() < ESCAPE_RADIUS_SQR && iterations < limit {
        z = z * z + point;
        iterations += 1;
    }
    if iterations >= limit {
        Escape::Interior
    } else {
        Escape::Escaped { iterations, z }
    }
}

/// The continuous iteration count.  It drops the integer banding of
/// the raw count by measuring how far past the escape radius the
/// orbit landed.  Points that blow out immediately can come back
/// negative.
pub fn smooth_value(iterations: usize, z: Complex<f64>) -> f64 {
    let ln2 = 2.0_f64.ln();
    let zn = z.norm_sqr().sqrt();
    let nu = (zn.ln() / ln2).ln() / ln2;
    (iterations + 1) as f64 - nu
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cardioid_and_bulb_points_are_interior() {
        for p in &[
            Complex::new(0.0, 0.0),
            Complex::new(-0.7, 0.0),
            Complex::new(0.2, 0.1),
            Complex::new(-1.0, 0.0),
            Complex::new(-1.1, 0.1),
        ] {
            assert!(in_main_bulbs(*p), "{:?} should be in a bulb", p);
            assert_eq!(escape_time(*p, MAX_ITERATIONS), Escape::Interior);
        }
    }

    #[test]
    fn outside_points_are_not_in_bulbs() {
        assert!(!in_main_bulbs(Complex::new(0.5, 0.0)));
        assert!(!in_main_bulbs(Complex::new(-2.0, 1.0)));
        assert!(!in_main_bulbs(Complex::new(-0.75, 0.0)));
    }

    #[test]
    fn far_points_escape_quickly() {
        match escape_time(Complex::new(2.0, 2.0), MAX_ITERATIONS) {
            Escape::Escaped { iterations, z } => {
                assert_eq!(iterations, 1);
                assert_eq!(z, Complex::new(2.0, 2.0));
            }
            Escape::Interior => panic!("(2, 2) escapes on the first step"),
        }
    }

    #[test]
    fn escape_counts_stay_under_the_cap() {
        let c = Complex::new(0.4, 0.6);
        match escape_time(c, MAX_ITERATIONS) {
            Escape::Escaped { iterations, z } => {
                assert!(iterations < MAX_ITERATIONS);
                assert!(z.norm_sqr() >= ESCAPE_RADIUS_SQR);
            }
            Escape::Interior => panic!("0.4+0.6i is outside the set"),
        }
    }

    #[test]
    fn bounded_points_outside_the_bulbs_hit_the_cap() {
        // Every real point in [-2, 1/4] stays bounded.
        let c = Complex::new(-1.75, 0.0);
        assert!(!in_main_bulbs(c));
        assert_eq!(escape_time(c, MAX_ITERATIONS), Escape::Interior);
    }

    #[test]
    fn a_small_limit_reports_interior() {
        let c = Complex::new(0.4, 0.6);
        assert_eq!(escape_time(c, 2), Escape::Interior);
    }

    #[test]
    fn smooth_value_goes_negative_for_huge_escapes() {
        let v = smooth_value(1, Complex::new(100.0, 0.0));
        assert!(v < 0.0);
        assert!((v - (2.0 - (100.0_f64.log2()).log2())).abs() < 1e-12);
    }
}
