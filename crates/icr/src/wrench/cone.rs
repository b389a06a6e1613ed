//! Friction models and the linearized friction cone of a single contact.

use std::collections::BTreeMap;
use std::f64::consts::TAU;

use nalgebra::{Vector3, Vector6};
use serde::{Deserialize, Serialize};

use crate::error::IcrError;
use crate::grasp::FingerId;

/// Contact model of a finger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactModel {
    /// Pushes along the surface normal only.
    Frictionless,
    /// Coulomb friction, no torsion.
    HardFinger,
    /// Coulomb friction plus torsional friction about the normal.
    #[default]
    SoftFinger,
}

/// Per-finger friction parameters.
///
/// `torsion` is the magnitude of the pure torsional wrenches of a soft finger,
/// expressed directly in the scaled torque units of the wrench space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrictionModel {
    pub mu: f64,
    pub facets: usize,
    pub contact: ContactModel,
    pub torsion: f64,
}

impl Default for FrictionModel {
    fn default() -> Self {
        Self {
            mu: 0.5,
            facets: 4,
            contact: ContactModel::SoftFinger,
            torsion: 0.5,
        }
    }
}

impl FrictionModel {
    pub fn frictionless() -> Self {
        Self {
            mu: 0.0,
            facets: 1,
            contact: ContactModel::Frictionless,
            torsion: 0.0,
        }
    }

    pub fn hard_finger(mu: f64, facets: usize) -> Self {
        Self {
            mu,
            facets,
            contact: ContactModel::HardFinger,
            torsion: 0.0,
        }
    }

    pub fn soft_finger(mu: f64, facets: usize, torsion: f64) -> Self {
        Self {
            mu,
            facets,
            contact: ContactModel::SoftFinger,
            torsion,
        }
    }

    pub fn validate(&self) -> Result<(), IcrError> {
        if !(self.mu.is_finite() && self.mu >= 0.0) {
            return Err(IcrError::invalid(format!(
                "friction coefficient must be finite and >= 0 (got {})",
                self.mu
            )));
        }
        if self.facets == 0 {
            return Err(IcrError::invalid("friction cone needs at least one facet"));
        }
        if !(self.torsion.is_finite() && self.torsion >= 0.0) {
            return Err(IcrError::invalid(format!(
                "torsional coefficient must be finite and >= 0 (got {})",
                self.torsion
            )));
        }
        Ok(())
    }

    /// Number of wrenches one contact contributes (before dedup).
    pub fn wrench_count(&self) -> usize {
        match self.contact {
            ContactModel::Frictionless => 1,
            ContactModel::HardFinger => self.facets,
            ContactModel::SoftFinger if self.torsion > 0.0 => self.facets + 2,
            ContactModel::SoftFinger => self.facets,
        }
    }
}

/// Friction models keyed by finger, with a fallback for unlisted fingers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrictionTable {
    default: FrictionModel,
    per_finger: BTreeMap<FingerId, FrictionModel>,
}

impl FrictionTable {
    pub fn new(default: FrictionModel) -> Self {
        Self {
            default,
            per_finger: BTreeMap::new(),
        }
    }

    pub fn set(&mut self, finger: FingerId, model: FrictionModel) {
        self.per_finger.insert(finger, model);
    }

    pub fn get(&self, finger: &FingerId) -> FrictionModel {
        self.per_finger.get(finger).copied().unwrap_or(self.default)
    }

    pub fn fallback(&self) -> FrictionModel {
        self.default
    }

    /// Replace the fallback model; per-finger overrides are kept.
    pub fn set_fallback(&mut self, model: FrictionModel) {
        self.default = model;
    }
}

/// Wrench-model input for one touching contact.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContactPoint {
    pub position: Vector3<f64>,
    /// Outward unit surface normal; the finger pushes along `-normal`.
    pub normal: Vector3<f64>,
    pub friction: FrictionModel,
}

/// Primitive wrenches of one contact's linearized friction cone.
pub fn contact_wrenches(
    contact: &ContactPoint,
    reference: Vector3<f64>,
    torque_scale: f64,
) -> Vec<Vector6<f64>> {
    let model = contact.friction;
    let inward = -contact.normal;
    let arm = (contact.position - reference) / torque_scale;
    let wrench = |f: Vector3<f64>| {
        let f = f.normalize();
        let t = arm.cross(&f);
        Vector6::new(f.x, f.y, f.z, t.x, t.y, t.z)
    };
    let mut out = Vec::with_capacity(model.wrench_count());
    match model.contact {
        ContactModel::Frictionless => out.push(wrench(inward)),
        ContactModel::HardFinger | ContactModel::SoftFinger => {
            let (t1, t2) = tangent_basis(&contact.normal);
            for k in 0..model.facets {
                let theta = TAU * k as f64 / model.facets as f64;
                let edge = inward + (t1 * theta.cos() + t2 * theta.sin()) * model.mu;
                out.push(wrench(edge));
            }
            if model.contact == ContactModel::SoftFinger && model.torsion > 0.0 {
                let m = contact.normal * model.torsion;
                out.push(Vector6::new(0.0, 0.0, 0.0, m.x, m.y, m.z));
                out.push(Vector6::new(0.0, 0.0, 0.0, -m.x, -m.y, -m.z));
            }
        }
    }
    out
}

/// Orthonormal tangent pair `(t1, t2)` with `t1 × t2 = n`.
fn tangent_basis(n: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let seed = if n.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let t1 = (seed - n * n.dot(&seed)).normalize();
    let t2 = n.cross(&t1);
    (t1, t2)
}
