//! Deterministic sample objects for tests, benches, demos and the CLI.
//!
//! Every constructor returns raw `(position, unit outward normal)` pairs so
//! callers can combine shapes (`translated`) before building a `TargetObject`.

use std::f64::consts::PI;

use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::object::OrientedPoint;

/// Four mid-edge samples of an axis-aligned square in the `z = 0` plane,
/// ordered `+x, +y, −x, −y`, with outward normals.
pub fn square(half: f64) -> Vec<OrientedPoint> {
    [
        Vector3::x(),
        Vector3::y(),
        -Vector3::x(),
        -Vector3::y(),
    ]
    .into_iter()
    .map(|n| (n * half, n))
    .collect()
}

/// `n` quasi-uniform samples on a sphere of radius `r` (golden spiral).
pub fn fibonacci_sphere(n: usize, r: f64) -> Vec<OrientedPoint> {
    let golden = PI * (3.0 - 5f64.sqrt());
    (0..n)
        .map(|i| {
            let z = 1.0 - 2.0 * (i as f64 + 0.5) / n as f64;
            let ring = (1.0 - z * z).max(0.0).sqrt();
            let phi = golden * i as f64;
            let dir = Vector3::new(ring * phi.cos(), ring * phi.sin(), z);
            (dir * r, dir)
        })
        .collect()
}

/// Fibonacci sphere with directions perturbed by up to `jitter` per axis
/// (before renormalization). Replayable from `seed`.
pub fn jittered_sphere(n: usize, r: f64, jitter: f64, seed: u64) -> Vec<OrientedPoint> {
    let mut rng = StdRng::seed_from_u64(seed);
    let amp = jitter.abs();
    fibonacci_sphere(n, 1.0)
        .into_iter()
        .map(|(_, dir)| {
            if amp == 0.0 {
                return (dir * r, dir);
            }
            let noise = Vector3::new(
                rng.gen_range(-amp..=amp),
                rng.gen_range(-amp..=amp),
                rng.gen_range(-amp..=amp),
            );
            let moved = dir + noise;
            let dir = if moved.norm() > 1e-9 {
                moved.normalize()
            } else {
                dir
            };
            (dir * r, dir)
        })
        .collect()
}

/// Surface of the cube `[-half, half]^3`: an `nx × nx` grid of cell centres
/// on each face (`6·nx²` samples) with face normals.
pub fn box_surface(nx: usize, half: f64) -> Vec<OrientedPoint> {
    let step = 2.0 * half / nx.max(1) as f64;
    let coord = |k: usize| -half + (k as f64 + 0.5) * step;
    let mut out = Vec::with_capacity(6 * nx * nx);
    for axis in 0..3 {
        for sign in [1.0, -1.0] {
            let mut normal = Vector3::zeros();
            normal[axis] = sign;
            let (u, v) = ((axis + 1) % 3, (axis + 2) % 3);
            for a in 0..nx {
                for b in 0..nx {
                    let mut p = Vector3::zeros();
                    p[axis] = sign * half;
                    p[u] = coord(a);
                    p[v] = coord(b);
                    out.push((p, normal));
                }
            }
        }
    }
    out
}

/// Shift every sample by `offset`; normals are unchanged.
pub fn translated(points: &[OrientedPoint], offset: Vector3<f64>) -> Vec<OrientedPoint> {
    points.iter().map(|&(p, n)| (p + offset, n)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_is_ordered_and_outward() {
        let s = square(2.0);
        assert_eq!(s.len(), 4);
        assert_eq!(s[0].0, Vector3::new(2.0, 0.0, 0.0));
        assert_eq!(s[3].0, Vector3::new(0.0, -2.0, 0.0));
        for (p, n) in s {
            assert!((p.normalize() - n).norm() < 1e-12);
        }
    }

    #[test]
    fn sphere_samples_lie_on_the_sphere() {
        for (p, n) in fibonacci_sphere(50, 3.0) {
            assert!((p.norm() - 3.0).abs() < 1e-12);
            assert!((n.norm() - 1.0).abs() < 1e-12);
        }
        for (p, _) in jittered_sphere(50, 3.0, 0.1, 7) {
            assert!((p.norm() - 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn jitter_is_replayable() {
        assert_eq!(jittered_sphere(20, 1.0, 0.2, 11), jittered_sphere(20, 1.0, 0.2, 11));
        assert_ne!(jittered_sphere(20, 1.0, 0.2, 11), jittered_sphere(20, 1.0, 0.2, 12));
        assert_eq!(jittered_sphere(20, 1.0, 0.0, 3), fibonacci_sphere(20, 1.0));
    }

    #[test]
    fn box_surface_covers_six_faces() {
        let pts = box_surface(3, 1.0);
        assert_eq!(pts.len(), 54);
        for (p, n) in pts {
            assert!((p.dot(&n) - 1.0).abs() < 1e-12);
            assert!(p.amax() <= 1.0 + 1e-12);
        }
    }

    #[test]
    fn translation_keeps_normals() {
        let moved = translated(&square(1.0), Vector3::new(5.0, 0.0, 0.0));
        assert_eq!(moved[2].0, Vector3::new(4.0, 0.0, 0.0));
        assert_eq!(moved[2].1, -Vector3::x());
    }
}
