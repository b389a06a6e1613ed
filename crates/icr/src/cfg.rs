//! Tolerances (internal constants) and engine configuration (`IcrCfg`).
//!
//! Policy
//! - Numeric tolerances are fixed constants; they are not part of `IcrCfg`.
//! - `IcrCfg` carries the modelling parameters a caller is expected to tune
//!   (graph radius, search-zone probe, default friction). It is serde-loadable
//!   with per-field defaults so partial JSON files work.

use serde::{Deserialize, Serialize};

use crate::error::IcrError;
use crate::wrench::FrictionModel;

/// Side test for wrench points against a candidate hull hyperplane.
pub(crate) const FEAS_EPS: f64 = 1e-9;
/// Wrench points closer than this are merged before hull enumeration.
pub(crate) const DEDUP_EPS: f64 = 1e-9;
/// Gram–Schmidt residual below which a 6-subset is treated as affinely dependent.
pub(crate) const SPAN_EPS: f64 = 1e-10;
/// Singular-value threshold (per point) for the wrench span rank check.
pub(crate) const RANK_EPS: f64 = 1e-10;
/// Facet dedup grid (quantization step on normal and offset).
pub(crate) const FACET_GRID: f64 = 1e-7;
/// Shortest non-degenerate normal accepted for a surface sample.
pub(crate) const NORMAL_EPS: f64 = 1e-12;

/// Engine configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IcrCfg {
    /// Euclidean neighborhood radius for surface-graph edges (object units).
    pub neighborhood_radius: f64,
    /// Edge weight `d · (1 + gain · (1 − n_a·n_b))`; `0` means plain Euclidean.
    pub curvature_gain: f64,
    /// Search-zone probe floor as a fraction of the baseline quality.
    pub zone_fraction: f64,
    /// Extra geodesic slack added to each probed zone radius.
    pub zone_tolerance: f64,
    /// Cap on displacement from the grasp contact (Euclidean for candidates,
    /// geodesic for the zone radius); `None` = unbounded.
    pub max_displacement: Option<f64>,
    /// Friction model for fingers without an explicit one.
    pub default_friction: FrictionModel,
    /// Grow per-finger regions on scoped worker threads.
    pub parallel_fingers: bool,
}

impl Default for IcrCfg {
    fn default() -> Self {
        Self {
            neighborhood_radius: 0.01,
            curvature_gain: 0.0,
            zone_fraction: 0.0,
            zone_tolerance: 0.0,
            max_displacement: None,
            default_friction: FrictionModel::default(),
            parallel_fingers: false,
        }
    }
}

impl IcrCfg {
    pub fn validate(&self) -> Result<(), IcrError> {
        if !(self.neighborhood_radius.is_finite() && self.neighborhood_radius > 0.0) {
            return Err(IcrError::invalid("neighborhood_radius must be finite and > 0"));
        }
        if !(self.curvature_gain.is_finite() && self.curvature_gain >= 0.0) {
            return Err(IcrError::invalid("curvature_gain must be finite and >= 0"));
        }
        if !(0.0..=1.0).contains(&self.zone_fraction) {
            return Err(IcrError::invalid("zone_fraction must lie in [0, 1]"));
        }
        if !(self.zone_tolerance.is_finite() && self.zone_tolerance >= 0.0) {
            return Err(IcrError::invalid("zone_tolerance must be finite and >= 0"));
        }
        if let Some(limit) = self.max_displacement {
            if !(limit.is_finite() && limit > 0.0) {
                return Err(IcrError::invalid("max_displacement must be finite and > 0"));
            }
        }
        self.default_friction.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cfg_is_valid() {
        assert!(IcrCfg::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_fields() {
        let cfg = IcrCfg {
            neighborhood_radius: 0.0,
            ..IcrCfg::default()
        };
        assert!(matches!(cfg.validate(), Err(IcrError::InvalidParameter { .. })));
        let cfg = IcrCfg {
            zone_fraction: 1.5,
            ..IcrCfg::default()
        };
        assert!(cfg.validate().is_err());
        let cfg = IcrCfg {
            max_displacement: Some(-1.0),
            ..IcrCfg::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: IcrCfg = serde_json::from_str(r#"{"neighborhood_radius": 0.5}"#).unwrap();
        assert_eq!(cfg.neighborhood_radius, 0.5);
        assert_eq!(cfg.default_friction, FrictionModel::default());
        assert!(cfg.max_displacement.is_none());
    }
}
