//! Facet enumeration of the wrench polytope (6D, explicit).
//!
//! Algorithm
//! - Merge near-duplicate points; reject sets that do not linearly span R^6
//!   (the origin cannot be interior then).
//! - For every 6-subset, find the hyperplane through it (Gram–Schmidt on the
//!   five difference vectors, normal = residual of the best coordinate axis).
//! - A hyperplane is a facet iff all points lie on one side. Orient it so the
//!   points satisfy `n·w <= c`; the origin is inside iff every `c > 0`.
//!
//! Complexity: O(C(N, 6) · N) per evaluation, where N is the deduplicated
//! cone-edge count (6 per soft finger with 4 facets). Two or three fingers
//! (12 or 18 points) evaluate in milliseconds; four (24 points, ~135k
//! subsets) take on the order of 100 ms, and five or more are impractical.
//! Zone probing and region growth evaluate once per visited sample, so with
//! four fingers keep zones small (`max_displacement`, `zone_fraction`) or
//! lower `FrictionModel::facets`. Only `OriginOutside` exits early.

use std::collections::HashSet;
use std::ops::ControlFlow;

use nalgebra::{Matrix6, Vector6};

use crate::cfg::{DEDUP_EPS, FACET_GRID, FEAS_EPS, RANK_EPS, SPAN_EPS};

pub const WRENCH_DIM: usize = 6;

/// Closed half-space `n · w <= c` in wrench space (`n` unit length).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hs6 {
    pub n: Vector6<f64>,
    pub c: f64,
}

impl Hs6 {
    #[inline]
    pub fn new(n: Vector6<f64>, c: f64) -> Self {
        Self { n, c }
    }
    #[inline]
    pub fn satisfies(&self, w: &Vector6<f64>) -> bool {
        self.n.dot(w) <= self.c + FEAS_EPS
    }
}

/// Result of scanning the hull of a wrench point set.
#[derive(Clone, Debug)]
pub(crate) enum HullScan {
    /// Too few points, no full linear span, or a flat hull.
    Degenerate,
    /// A facet passes through or in front of the origin (`offset <= eps`).
    OriginOutside { offset: f64 },
    /// Origin strictly interior; `radius` = smallest facet offset.
    Interior { facets: Vec<Hs6>, radius: f64 },
}

/// Spherical quality of the hull of `points` (0 unless origin is interior).
pub fn spherical_quality(points: &[Vector6<f64>]) -> f64 {
    match scan_hull(points, false) {
        HullScan::Interior { radius, .. } => radius,
        _ => 0.0,
    }
}

/// Enumerate facets; `keep_facets = false` only tracks the smallest offset.
pub(crate) fn scan_hull(points: &[Vector6<f64>], keep_facets: bool) -> HullScan {
    let pts = dedup_points(points);
    if pts.len() <= WRENCH_DIM || !spans_wrench_space(&pts) {
        return HullScan::Degenerate;
    }
    let mut facets = Vec::new();
    let mut seen: HashSet<[i64; WRENCH_DIM + 1]> = HashSet::new();
    let mut radius = f64::INFINITY;
    let mut verdict = None;
    for_each_combination(pts.len(), WRENCH_DIM, |idx| {
        let Some(n) = hyperplane_normal(&pts, idx) else {
            return ControlFlow::Continue(());
        };
        let c = n.dot(&pts[idx[0]]);
        let mut above = false;
        let mut below = false;
        for p in &pts {
            let d = n.dot(p) - c;
            if d > FEAS_EPS {
                above = true;
            } else if d < -FEAS_EPS {
                below = true;
            }
            if above && below {
                return ControlFlow::Continue(());
            }
        }
        if !above && !below {
            // every point on one hyperplane: the hull has no interior
            verdict = Some(HullScan::Degenerate);
            return ControlFlow::Break(());
        }
        let (n, c) = if above { (-n, -c) } else { (n, c) };
        if c <= FEAS_EPS {
            verdict = Some(HullScan::OriginOutside { offset: c });
            return ControlFlow::Break(());
        }
        radius = radius.min(c);
        if keep_facets && seen.insert(quantize(&n, c)) {
            facets.push(Hs6::new(n, c));
        }
        ControlFlow::Continue(())
    });
    if let Some(v) = verdict {
        return v;
    }
    if radius.is_finite() {
        HullScan::Interior { facets, radius }
    } else {
        HullScan::Degenerate
    }
}

/// Unit normal of the affine hyperplane through `pts[idx]`, if they are
/// affinely independent.
fn hyperplane_normal(pts: &[Vector6<f64>], idx: &[usize]) -> Option<Vector6<f64>> {
    let base = pts[idx[0]];
    let mut basis: Vec<Vector6<f64>> = Vec::with_capacity(WRENCH_DIM - 1);
    for &i in &idx[1..] {
        let mut v = pts[i] - base;
        for b in &basis {
            v -= b * b.dot(&v);
        }
        let norm = v.norm();
        if norm < SPAN_EPS {
            return None;
        }
        basis.push(v / norm);
    }
    // The complement is one-dimensional; take the axis with the largest residual.
    let mut best: Option<Vector6<f64>> = None;
    let mut best_norm = 0.0;
    for axis in 0..WRENCH_DIM {
        let mut r = Vector6::zeros();
        r[axis] = 1.0;
        for b in &basis {
            r -= b * b.dot(&r);
        }
        let norm = r.norm();
        if norm > best_norm {
            best_norm = norm;
            best = Some(r);
        }
    }
    let r = best?;
    if best_norm < SPAN_EPS {
        return None;
    }
    Some(r / best_norm)
}

fn spans_wrench_space(pts: &[Vector6<f64>]) -> bool {
    let gram = pts
        .iter()
        .fold(Matrix6::zeros(), |acc: Matrix6<f64>, p| acc + p * p.transpose());
    gram.rank(RANK_EPS * pts.len() as f64) == WRENCH_DIM
}

fn dedup_points(points: &[Vector6<f64>]) -> Vec<Vector6<f64>> {
    let mut out: Vec<Vector6<f64>> = Vec::with_capacity(points.len());
    for p in points {
        if out.iter().all(|q| (q - p).norm() > DEDUP_EPS) {
            out.push(*p);
        }
    }
    out
}

fn quantize(n: &Vector6<f64>, c: f64) -> [i64; WRENCH_DIM + 1] {
    let mut key = [0i64; WRENCH_DIM + 1];
    for (k, x) in n.iter().enumerate() {
        key[k] = (x / FACET_GRID).round() as i64;
    }
    key[WRENCH_DIM] = (c / FACET_GRID).round() as i64;
    key
}

/// Visit all k-subsets of `0..n` in lexicographic order.
fn for_each_combination<F>(n: usize, k: usize, mut visit: F)
where
    F: FnMut(&[usize]) -> ControlFlow<()>,
{
    if k == 0 || k > n {
        return;
    }
    let mut idxs: Vec<usize> = (0..k).collect();
    loop {
        if visit(&idxs).is_break() {
            return;
        }
        let mut i = k;
        while i > 0 && idxs[i - 1] == i - 1 + n - k {
            i -= 1;
        }
        if i == 0 {
            return;
        }
        idxs[i - 1] += 1;
        for j in i..k {
            idxs[j] = idxs[j - 1] + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cross_polytope() -> Vec<Vector6<f64>> {
        let mut pts = Vec::new();
        for axis in 0..WRENCH_DIM {
            let mut e = Vector6::zeros();
            e[axis] = 1.0;
            pts.push(e);
            pts.push(-e);
        }
        pts
    }

    #[test]
    fn combinations_are_counted_and_ordered() {
        let mut seen = Vec::new();
        for_each_combination(5, 3, |c| {
            seen.push(c.to_vec());
            ControlFlow::Continue(())
        });
        assert_eq!(seen.len(), 10);
        assert_eq!(seen.first().unwrap(), &vec![0, 1, 2]);
        assert_eq!(seen.last().unwrap(), &vec![2, 3, 4]);
    }

    #[test]
    fn cross_polytope_has_64_facets_and_inscribed_radius() {
        match scan_hull(&cross_polytope(), true) {
            HullScan::Interior { facets, radius } => {
                assert_eq!(facets.len(), 64);
                assert!((radius - 1.0 / 6f64.sqrt()).abs() < 1e-9);
                for p in cross_polytope() {
                    assert!(facets.iter().all(|h| h.satisfies(&p)));
                }
            }
            other => panic!("expected interior origin, got {other:?}"),
        }
    }

    #[test]
    fn shifted_polytope_reports_origin_outside() {
        let shift = Vector6::new(2.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        let pts: Vec<_> = cross_polytope().into_iter().map(|p| p + shift).collect();
        match scan_hull(&pts, false) {
            HullScan::OriginOutside { offset } => assert!(offset <= FEAS_EPS),
            other => panic!("expected OriginOutside, got {other:?}"),
        }
        assert_eq!(spherical_quality(&pts), 0.0);
    }

    #[test]
    fn flat_or_low_rank_sets_are_degenerate() {
        // five axes only: no span of the sixth direction
        let pts: Vec<_> = cross_polytope().into_iter().take(10).collect();
        assert!(matches!(scan_hull(&pts, false), HullScan::Degenerate));
        // a flat set off the origin: all points have w_0 = 1
        let flat: Vec<_> = cross_polytope()
            .into_iter()
            .map(|mut p| {
                p[0] = 1.0;
                p
            })
            .collect();
        assert!(matches!(scan_hull(&flat, false), HullScan::Degenerate));
    }
}
