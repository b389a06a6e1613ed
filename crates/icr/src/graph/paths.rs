//! Floyd–Warshall over induced subgraphs, plus single-source walks and
//! reachability helpers.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, VecDeque};

use nalgebra::DMatrix;

use super::types::{DistanceMatrix, Frontier, SurfaceGraph};
use crate::error::IcrError;

impl SurfaceGraph {
    /// All-pairs geodesic distances over the subgraph induced by `subset`.
    ///
    /// Duplicates are ignored and the result is ordered by sample index, so
    /// the output depends only on the edge set and the subset's contents.
    pub fn shortest_paths(&self, subset: &[usize]) -> Result<DistanceMatrix, IcrError> {
        let mut indices = subset.to_vec();
        indices.sort_unstable();
        indices.dedup();
        if let Some(&bad) = indices.iter().find(|&&s| s >= self.len()) {
            return Err(IcrError::invalid(format!(
                "sample {bad} out of range (object has {} samples)",
                self.len()
            )));
        }
        let slot: HashMap<usize, usize> =
            indices.iter().enumerate().map(|(k, &s)| (s, k)).collect();
        let m = indices.len();
        let mut d = DMatrix::from_element(m, m, f64::INFINITY);
        for (a, &s) in indices.iter().enumerate() {
            d[(a, a)] = 0.0;
            for &(t, w) in &self.adj[s] {
                if let Some(&b) = slot.get(&t) {
                    d[(a, b)] = d[(a, b)].min(w);
                }
            }
        }
        // Update the upper triangle and mirror; keeps the matrix exactly symmetric.
        for k in 0..m {
            for i in 0..m {
                let dik = d[(i, k)];
                if !dik.is_finite() {
                    continue;
                }
                for j in (i + 1)..m {
                    let cand = dik + d[(k, j)];
                    if cand < d[(i, j)] {
                        d[(i, j)] = cand;
                        d[(j, i)] = cand;
                    }
                }
            }
        }
        Ok(DistanceMatrix { indices, slot, d })
    }

    /// Lazy Dijkstra from `start`: yields `(sample, distance)` in ascending
    /// `(distance, index)` order, never leaving the Euclidean ball of radius
    /// `limit` around `start`. Callers stop pulling once they have seen
    /// enough, so only the explored neighborhood is ever touched.
    pub fn geodesic_walk(&self, start: usize, limit: Option<f64>) -> GeodesicWalk<'_> {
        let mut heap = BinaryHeap::new();
        if start < self.len() {
            heap.push(Reverse(Frontier {
                dist: 0.0,
                index: start,
            }));
        }
        GeodesicWalk {
            graph: self,
            start,
            limit,
            heap,
            settled: HashMap::new(),
        }
    }

    /// Connected component containing `start`, ascending.
    pub fn component(&self, start: usize) -> Vec<usize> {
        self.reachable_within(start, None)
    }

    /// Samples reachable from `start` along edges without leaving the
    /// Euclidean ball of radius `limit` around it (ascending).
    pub fn reachable_within(&self, start: usize, limit: Option<f64>) -> Vec<usize> {
        let samples = self.object.samples();
        let Some(origin) = samples.get(start).map(|s| s.position) else {
            return Vec::new();
        };
        let inside = |i: usize| match limit {
            Some(r) => (samples[i].position - origin).norm() <= r,
            None => true,
        };
        let mut seen = vec![false; self.len()];
        let mut queue = VecDeque::from([start]);
        seen[start] = true;
        let mut out = Vec::new();
        while let Some(i) = queue.pop_front() {
            out.push(i);
            for &(j, _) in &self.adj[i] {
                if !seen[j] && inside(j) {
                    seen[j] = true;
                    queue.push_back(j);
                }
            }
        }
        out.sort_unstable();
        out
    }
}

/// Iterator returned by [`SurfaceGraph::geodesic_walk`].
pub struct GeodesicWalk<'a> {
    graph: &'a SurfaceGraph,
    start: usize,
    limit: Option<f64>,
    heap: BinaryHeap<Reverse<Frontier>>,
    settled: HashMap<usize, f64>,
}

impl GeodesicWalk<'_> {
    /// Samples settled so far.
    #[inline]
    pub fn settled(&self) -> usize {
        self.settled.len()
    }

    fn inside(&self, sample: usize) -> bool {
        let samples = self.graph.object.samples();
        match self.limit {
            Some(r) => (samples[sample].position - samples[self.start].position).norm() <= r,
            None => true,
        }
    }
}

impl Iterator for GeodesicWalk<'_> {
    type Item = (usize, f64);

    fn next(&mut self) -> Option<(usize, f64)> {
        while let Some(Reverse(Frontier { dist, index })) = self.heap.pop() {
            if self.settled.contains_key(&index) {
                continue;
            }
            self.settled.insert(index, dist);
            let graph = self.graph;
            for &(j, w) in &graph.adj[index] {
                if !self.settled.contains_key(&j) && self.inside(j) {
                    self.heap.push(Reverse(Frontier {
                        dist: dist + w,
                        index: j,
                    }));
                }
            }
            return Some((index, dist));
        }
        None
    }
}
