use nalgebra::{Vector3, Vector6};

use super::cone::{contact_wrenches, ContactPoint};
use super::hull::{scan_hull, spherical_quality, HullScan, Hs6};
use crate::error::IcrError;
use crate::object::TargetObject;

/// Convex wrench polytope of a grasp, with its spherical quality.
///
/// `facets` is empty unless the origin is strictly interior.
#[derive(Clone, Debug)]
pub struct WrenchSpace {
    points: Vec<Vector6<f64>>,
    facets: Vec<Hs6>,
    quality: f64,
}

impl WrenchSpace {
    pub fn from_wrenches(points: Vec<Vector6<f64>>) -> Self {
        let (facets, quality) = match scan_hull(&points, true) {
            HullScan::Interior { facets, radius } => (facets, radius),
            HullScan::OriginOutside { offset } => {
                tracing::debug!(offset, points = points.len(), "origin outside wrench hull");
                (Vec::new(), 0.0)
            }
            HullScan::Degenerate => (Vec::new(), 0.0),
        };
        Self {
            points,
            facets,
            quality,
        }
    }

    /// Space of a grasp without enough contacts to close.
    pub fn empty() -> Self {
        Self {
            points: Vec::new(),
            facets: Vec::new(),
            quality: 0.0,
        }
    }

    #[inline]
    pub fn quality(&self) -> f64 {
        self.quality
    }
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.quality > 0.0
    }
    #[inline]
    pub fn points(&self) -> &[Vector6<f64>] {
        &self.points
    }
    #[inline]
    pub fn facets(&self) -> &[Hs6] {
        &self.facets
    }

    /// `Ok(quality)` when force/torque closed, `NotClosed` otherwise.
    pub fn check_closure(&self) -> Result<f64, IcrError> {
        if self.is_closed() {
            Ok(self.quality)
        } else {
            Err(IcrError::NotClosed {
                quality: self.quality,
            })
        }
    }

    /// Whether `w` lies in the polytope (only meaningful for a closed space).
    pub fn contains(&self, w: &Vector6<f64>) -> bool {
        self.is_closed() && self.facets.iter().all(|h| h.satisfies(w))
    }
}

/// Pure wrench-space evaluator bound to one object's reference frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WrenchEvaluator {
    reference: Vector3<f64>,
    torque_scale: f64,
}

impl WrenchEvaluator {
    pub fn new(reference: Vector3<f64>, torque_scale: f64) -> Self {
        Self {
            reference,
            torque_scale,
        }
    }

    pub fn for_object(object: &TargetObject) -> Self {
        Self::new(object.centroid(), object.torque_scale())
    }

    /// Union of all contacts' cone wrenches.
    pub fn wrenches(&self, contacts: &[ContactPoint]) -> Vec<Vector6<f64>> {
        contacts
            .iter()
            .flat_map(|c| contact_wrenches(c, self.reference, self.torque_scale))
            .collect()
    }

    pub fn wrench_space(&self, contacts: &[ContactPoint]) -> WrenchSpace {
        if contacts.len() < 2 {
            return WrenchSpace::empty();
        }
        WrenchSpace::from_wrenches(self.wrenches(contacts))
    }

    /// Spherical quality only; stops at the first facet that excludes the origin.
    pub fn quality(&self, contacts: &[ContactPoint]) -> f64 {
        if contacts.len() < 2 {
            return 0.0;
        }
        spherical_quality(&self.wrenches(contacts))
    }
}
