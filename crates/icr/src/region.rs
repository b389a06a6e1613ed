//! Contact regions and frontier-based region growth.
//!
//! Growth for one finger:
//! - start at the contact sample; pop the frontier in ascending
//!   `(geodesic distance, sample index)` order;
//! - relocate the finger to the candidate (others fixed) and admit it iff the
//!   quality is `> 0` and `>= threshold`;
//! - push zone neighbors of admitted samples only, so every region is a
//!   connected subgraph that contains no sample outside the zone.
//!
//! A sample is evaluated at most once: its quality does not depend on the
//! path that reached it, so a rejection is final.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};

use serde::{Deserialize, Serialize};

use crate::graph::{Frontier, SurfaceGraph};
use crate::grasp::{FingerId, Grasp};
use crate::wrench::{FrictionTable, WrenchEvaluator};
use crate::zone::{SearchZone, SearchZones};

/// Independent contact region of one finger (samples in admission order).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRegion {
    pub finger: FingerId,
    pub samples: Vec<usize>,
}

impl ContactRegion {
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
    pub fn contains(&self, sample: usize) -> bool {
        self.samples.contains(&sample)
    }
}

/// All regions of one grasp on one object; the unit of persistence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSet {
    pub object: String,
    pub grasp_key: String,
    pub regions: Vec<ContactRegion>,
}

impl RegionSet {
    pub fn region(&self, finger: &FingerId) -> Option<&ContactRegion> {
        self.regions.iter().find(|r| &r.finger == finger)
    }
    /// Total admitted samples over all fingers.
    pub fn sample_count(&self) -> usize {
        self.regions.iter().map(ContactRegion::len).sum()
    }
}

/// Grows regions for one grasp against a resolved quality threshold.
pub struct RegionGrower<'a> {
    graph: &'a SurfaceGraph,
    grasp: &'a Grasp,
    friction: &'a FrictionTable,
    evaluator: WrenchEvaluator,
    threshold: f64,
}

impl<'a> RegionGrower<'a> {
    pub fn new(
        graph: &'a SurfaceGraph,
        grasp: &'a Grasp,
        friction: &'a FrictionTable,
        threshold: f64,
    ) -> Self {
        Self {
            graph,
            grasp,
            friction,
            evaluator: WrenchEvaluator::for_object(graph.object()),
            threshold,
        }
    }

    fn admits(&self, zone: &SearchZone, sample: usize) -> bool {
        let q = zone.probed_quality(sample).unwrap_or_else(|| {
            let contacts = self.grasp.contact_points(
                self.graph.object(),
                self.friction,
                Some((zone.finger(), sample)),
            );
            self.evaluator.quality(&contacts)
        });
        let ok = q > 0.0 && q >= self.threshold;
        tracing::trace!(finger = %zone.finger(), sample, quality = q, admitted = ok, "candidate");
        ok
    }

    pub fn grow(&self, zone: &SearchZone) -> ContactRegion {
        let mut samples = Vec::new();
        let mut queued: HashSet<usize> = HashSet::new();
        let mut frontier = BinaryHeap::new();
        if zone.contains(zone.origin()) {
            queued.insert(zone.origin());
            frontier.push(Reverse(Frontier {
                dist: 0.0,
                index: zone.origin(),
            }));
        }
        while let Some(Reverse(Frontier { index, .. })) = frontier.pop() {
            if !self.admits(zone, index) {
                continue;
            }
            samples.push(index);
            for &(next, _) in self.graph.neighbors(index) {
                let Some(dist) = zone.distance(next) else {
                    continue;
                };
                if queued.insert(next) {
                    frontier.push(Reverse(Frontier { dist, index: next }));
                }
            }
        }
        tracing::debug!(
            finger = %zone.finger(),
            admitted = samples.len(),
            evaluated = queued.len(),
            "region grown"
        );
        ContactRegion {
            finger: zone.finger().clone(),
            samples,
        }
    }

    /// One region per zone, in zone order; optionally one scoped thread per finger.
    pub fn grow_all(&self, zones: &SearchZones, parallel: bool) -> Vec<ContactRegion> {
        if !parallel || zones.zones().len() < 2 {
            return zones.zones().iter().map(|z| self.grow(z)).collect();
        }
        std::thread::scope(|scope| {
            let handles: Vec<_> = zones
                .zones()
                .iter()
                .map(|z| scope.spawn(move || self.grow(z)))
                .collect();
            handles
                .into_iter()
                .map(|h| match h.join() {
                    Ok(region) => region,
                    Err(payload) => std::panic::resume_unwind(payload),
                })
                .collect()
        })
    }
}
