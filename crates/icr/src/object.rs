//! Target object: an immutable set of oriented surface samples.
//!
//! Normals are stored unit length and point away from the object. Sample
//! indices equal positions in the sample vector and are stable for the
//! lifetime of the object.

use nalgebra::Vector3;

use crate::cfg::NORMAL_EPS;
use crate::error::IcrError;

/// Raw `(position, normal)` input pair.
pub type OrientedPoint = (Vector3<f64>, Vector3<f64>);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceSample {
    pub index: usize,
    pub position: Vector3<f64>,
    pub normal: Vector3<f64>,
}

/// Object surface plus the reference data the wrench model needs.
///
/// Invariants:
/// - at least one sample;
/// - `samples[i].index == i`;
/// - `torque_scale > 0` (largest sample distance from the centroid, or 1).
#[derive(Clone, Debug)]
pub struct TargetObject {
    name: String,
    samples: Vec<SurfaceSample>,
    centroid: Vector3<f64>,
    torque_scale: f64,
}

impl TargetObject {
    pub fn new(name: impl Into<String>, points: Vec<OrientedPoint>) -> Result<Self, IcrError> {
        if points.is_empty() {
            return Err(IcrError::EmptyObject);
        }
        let mut samples = Vec::with_capacity(points.len());
        for (index, (position, normal)) in points.into_iter().enumerate() {
            if !(position.iter().all(|x| x.is_finite()) && normal.iter().all(|x| x.is_finite())) {
                return Err(IcrError::invalid(format!(
                    "sample {index} has non-finite coordinates"
                )));
            }
            let len = normal.norm();
            if len <= NORMAL_EPS {
                return Err(IcrError::invalid(format!("sample {index} has a zero normal")));
            }
            samples.push(SurfaceSample {
                index,
                position,
                normal: normal / len,
            });
        }
        let centroid = samples
            .iter()
            .fold(Vector3::zeros(), |acc, s| acc + s.position)
            / samples.len() as f64;
        let reach = samples
            .iter()
            .map(|s| (s.position - centroid).norm())
            .fold(0.0, f64::max);
        let torque_scale = if reach > NORMAL_EPS { reach } else { 1.0 };
        Ok(Self {
            name: name.into(),
            samples,
            centroid,
            torque_scale,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
    #[inline]
    pub fn samples(&self) -> &[SurfaceSample] {
        &self.samples
    }
    #[inline]
    pub fn sample(&self, index: usize) -> Option<&SurfaceSample> {
        self.samples.get(index)
    }
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }
    /// Always false for a constructed object; present for API symmetry.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
    #[inline]
    pub fn centroid(&self) -> Vector3<f64> {
        self.centroid
    }
    #[inline]
    pub fn torque_scale(&self) -> f64 {
        self.torque_scale
    }

    /// Index of the sample closest to `point` (ties → lowest index).
    pub fn nearest(&self, point: &Vector3<f64>) -> usize {
        let mut best = 0;
        let mut best_d2 = f64::INFINITY;
        for s in &self.samples {
            let d2 = (s.position - point).norm_squared();
            if d2 < best_d2 {
                best_d2 = d2;
                best = s.index;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    #[test]
    fn empty_object_is_rejected() {
        assert!(matches!(
            TargetObject::new("empty", Vec::new()),
            Err(IcrError::EmptyObject)
        ));
    }

    #[test]
    fn normals_are_normalized_and_indices_assigned() {
        let obj = TargetObject::new(
            "pair",
            vec![
                (vector![1.0, 0.0, 0.0], vector![3.0, 0.0, 0.0]),
                (vector![-1.0, 0.0, 0.0], vector![-0.5, 0.0, 0.0]),
            ],
        )
        .unwrap();
        assert_eq!(obj.len(), 2);
        for (i, s) in obj.samples().iter().enumerate() {
            assert_eq!(s.index, i);
            assert!((s.normal.norm() - 1.0).abs() < 1e-12);
        }
        assert!(obj.centroid().norm() < 1e-12);
        assert!((obj.torque_scale() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_normal_is_invalid() {
        let res = TargetObject::new("bad", vec![(vector![0.0, 0.0, 0.0], Vector3::zeros())]);
        assert!(matches!(res, Err(IcrError::InvalidParameter { .. })));
    }

    #[test]
    fn nearest_prefers_lowest_index_on_ties() {
        let n = vector![0.0, 0.0, 1.0];
        let obj = TargetObject::new(
            "line",
            vec![
                (vector![-1.0, 0.0, 0.0], n),
                (vector![1.0, 0.0, 0.0], n),
                (vector![3.0, 0.0, 0.0], n),
            ],
        )
        .unwrap();
        assert_eq!(obj.nearest(&vector![0.0, 0.0, 0.0]), 0);
        assert_eq!(obj.nearest(&vector![2.9, 0.1, 0.0]), 2);
    }
}
