//! Region transfer: remap stored regions onto another object.
//!
//! Regions are carried as sample *positions* so they survive the change of
//! object. On the target, each position maps to its nearest sample; the
//! mapped list is deduplicated (first occurrence wins) and cut down to the
//! part connected to its first sample, which keeps every region a connected
//! subgraph.

use std::collections::{HashSet, VecDeque};

use nalgebra::Vector3;

use crate::graph::SurfaceGraph;
use crate::grasp::FingerId;
use crate::object::TargetObject;
use crate::region::{ContactRegion, RegionSet};
use crate::store::StoreError;

#[derive(Clone, Debug)]
pub(crate) struct TransferSource {
    grasp_key: String,
    fingers: Vec<(FingerId, Vec<Vector3<f64>>)>,
}

impl TransferSource {
    /// Positions of `set` on the object it was computed for.
    pub(crate) fn capture(object: &TargetObject, set: &RegionSet) -> Self {
        let fingers = set
            .regions
            .iter()
            .map(|r| {
                let positions = r
                    .samples
                    .iter()
                    .filter_map(|&s| object.sample(s).map(|x| x.position))
                    .collect();
                (r.finger.clone(), positions)
            })
            .collect();
        Self {
            grasp_key: set.grasp_key.clone(),
            fingers,
        }
    }

    /// Like `capture`, but every index must exist on `object`.
    pub(crate) fn from_record(object: &TargetObject, set: &RegionSet) -> Result<Self, StoreError> {
        for region in &set.regions {
            if let Some(&bad) = region.samples.iter().find(|&&s| s >= object.len()) {
                return Err(StoreError::UnknownSample {
                    finger: region.finger.clone(),
                    sample: bad,
                });
            }
        }
        Ok(Self::capture(object, set))
    }

    pub(crate) fn remap(&self, graph: &SurfaceGraph) -> RegionSet {
        let object = graph.object();
        let regions = self
            .fingers
            .iter()
            .map(|(finger, positions)| {
                let mut seen = HashSet::new();
                let mapped: Vec<usize> = positions
                    .iter()
                    .map(|p| object.nearest(p))
                    .filter(|s| seen.insert(*s))
                    .collect();
                ContactRegion {
                    finger: finger.clone(),
                    samples: connected_prefix_component(graph, &mapped),
                }
            })
            .collect();
        RegionSet {
            object: object.name().to_string(),
            grasp_key: format!("transfer-{}", self.grasp_key),
            regions,
        }
    }
}

/// Members of `samples` connected to `samples[0]` inside the induced
/// subgraph, in their original order.
fn connected_prefix_component(graph: &SurfaceGraph, samples: &[usize]) -> Vec<usize> {
    let Some(&first) = samples.first() else {
        return Vec::new();
    };
    let members: HashSet<usize> = samples.iter().copied().collect();
    let mut reached = HashSet::from([first]);
    let mut queue = VecDeque::from([first]);
    while let Some(i) = queue.pop_front() {
        for &(j, _) in graph.neighbors(i) {
            if members.contains(&j) && reached.insert(j) {
                queue.push_back(j);
            }
        }
    }
    let kept: Vec<usize> = samples
        .iter()
        .copied()
        .filter(|s| reached.contains(s))
        .collect();
    if kept.len() < samples.len() {
        tracing::debug!(
            dropped = samples.len() - kept.len(),
            "transferred samples disconnected from the region start"
        );
    }
    kept
}
