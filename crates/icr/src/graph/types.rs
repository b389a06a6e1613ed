//! Data types for the surface graph and its distance matrices.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use nalgebra::DMatrix;

use crate::error::IcrError;
use crate::object::{SurfaceSample, TargetObject};

/// Weight of the edge between two samples already known to be neighbors.
pub trait EdgeMetric: Send + Sync {
    fn weight(&self, a: &SurfaceSample, b: &SurfaceSample) -> f64;
}

/// Plain Euclidean distance.
#[derive(Clone, Copy, Debug, Default)]
pub struct Euclidean;

impl EdgeMetric for Euclidean {
    #[inline]
    fn weight(&self, a: &SurfaceSample, b: &SurfaceSample) -> f64 {
        (a.position - b.position).norm()
    }
}

/// Curvature-aware weight `d · (1 + gain · (1 − n_a·n_b))`.
///
/// Paths across sharp edges of the surface get longer than paths along
/// flat patches of the same Euclidean length.
#[derive(Clone, Copy, Debug)]
pub struct NormalDeviation {
    pub gain: f64,
}

impl EdgeMetric for NormalDeviation {
    fn weight(&self, a: &SurfaceSample, b: &SurfaceSample) -> f64 {
        let d = (a.position - b.position).norm();
        d * (1.0 + self.gain * (1.0 - a.normal.dot(&b.normal)))
    }
}

/// Undirected proximity graph over one object's samples.
#[derive(Clone, Debug)]
pub struct SurfaceGraph {
    pub(super) object: Arc<TargetObject>,
    pub(super) radius: f64,
    pub(super) adj: Vec<Vec<(usize, f64)>>, // (neighbor, weight), sorted by neighbor
    pub(super) edge_count: usize,
}

impl SurfaceGraph {
    #[inline]
    pub fn object(&self) -> &Arc<TargetObject> {
        &self.object
    }
    #[inline]
    pub fn len(&self) -> usize {
        self.adj.len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.adj.is_empty()
    }
    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }
    /// Number of undirected edges.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }
    #[inline]
    pub fn neighbors(&self, index: usize) -> &[(usize, f64)] {
        self.adj.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn weight(&self, a: usize, b: usize) -> Option<f64> {
        let row = self.adj.get(a)?;
        row.binary_search_by_key(&b, |&(j, _)| j)
            .ok()
            .map(|k| row[k].1)
    }
}

/// Dense geodesic distances over a sample subset.
#[derive(Clone, Debug)]
pub struct DistanceMatrix {
    pub(super) indices: Vec<usize>,
    pub(super) slot: HashMap<usize, usize>,
    pub(super) d: DMatrix<f64>,
}

impl DistanceMatrix {
    /// Subset sample indices in ascending order.
    #[inline]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }
    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
    #[inline]
    pub fn contains(&self, sample: usize) -> bool {
        self.slot.contains_key(&sample)
    }

    /// Raw entry; `None` if either sample is outside the subset, `INFINITY`
    /// if both are inside but disconnected.
    pub fn get(&self, a: usize, b: usize) -> Option<f64> {
        let (&i, &j) = (self.slot.get(&a)?, self.slot.get(&b)?);
        Some(self.d[(i, j)])
    }

    /// Finite geodesic distance or the reason there is none.
    pub fn distance(&self, a: usize, b: usize) -> Result<f64, IcrError> {
        match self.get(a, b) {
            None => Err(IcrError::invalid(format!(
                "samples {a} and {b} are not both in the distance subset"
            ))),
            Some(d) if d.is_finite() => Ok(d),
            Some(_) => Err(IcrError::DisconnectedGraph { from: a, to: b }),
        }
    }

    /// `(sample, distance)` for every subset member as seen from `origin`.
    pub fn row(&self, origin: usize) -> Vec<(usize, f64)> {
        let Some(&i) = self.slot.get(&origin) else {
            return Vec::new();
        };
        self.indices
            .iter()
            .enumerate()
            .map(|(j, &s)| (s, self.d[(i, j)]))
            .collect()
    }
}

/// Heap entry keyed by `(distance, sample index)`; wrap in `Reverse` for a
/// min-heap.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Frontier {
    pub(crate) dist: f64,
    pub(crate) index: usize,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist
            .total_cmp(&other.dist)
            .then(self.index.cmp(&other.index))
    }
}
