//! Graph construction: neighborhood edges with metric weights.

use std::sync::Arc;

use super::types::{EdgeMetric, Euclidean, NormalDeviation, SurfaceGraph};
use crate::error::IcrError;
use crate::object::TargetObject;

/// Build with Euclidean weights, or the normal-deviation metric when
/// `curvature_gain > 0`.
pub fn build(
    object: Arc<TargetObject>,
    radius: f64,
    curvature_gain: f64,
) -> Result<SurfaceGraph, IcrError> {
    if curvature_gain > 0.0 {
        build_with_metric(object, radius, &NormalDeviation {
            gain: curvature_gain,
        })
    } else {
        build_with_metric(object, radius, &Euclidean)
    }
}

/// Connect every pair of samples within `radius` (Euclidean), weighted by `metric`.
pub fn build_with_metric(
    object: Arc<TargetObject>,
    radius: f64,
    metric: &dyn EdgeMetric,
) -> Result<SurfaceGraph, IcrError> {
    if object.is_empty() {
        return Err(IcrError::EmptyObject);
    }
    if !(radius.is_finite() && radius > 0.0) {
        return Err(IcrError::invalid(format!(
            "neighborhood radius must be finite and > 0 (got {radius})"
        )));
    }
    let samples = object.samples();
    let n = samples.len();
    let r2 = radius * radius;
    let mut adj: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
    let mut edge_count = 0;
    for i in 0..n {
        for j in (i + 1)..n {
            if (samples[i].position - samples[j].position).norm_squared() > r2 {
                continue;
            }
            let w = metric.weight(&samples[i], &samples[j]);
            if !(w.is_finite() && w >= 0.0) {
                return Err(IcrError::invalid(format!(
                    "edge metric produced weight {w} between samples {i} and {j}"
                )));
            }
            // i < j and rows are filled in ascending i, so each row stays sorted.
            adj[i].push((j, w));
            adj[j].push((i, w));
            edge_count += 1;
        }
    }
    tracing::debug!(samples = n, edges = edge_count, radius, "surface graph built");
    Ok(SurfaceGraph {
        object,
        radius,
        adj,
        edge_count,
    })
}
