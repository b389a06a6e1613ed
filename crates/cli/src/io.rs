//! JSON input files: objects, grasps, engine config.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use icr::api::{ContactReport, FingerId, FrictionModel, OrientedPoint};
use icr::IcrCfg;
use nalgebra::Vector3;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SampleDto {
    pub position: [f64; 3],
    pub normal: [f64; 3],
}

/// `{ "name": "...", "frame": "...", "samples": [{position, normal}, ...] }`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ObjectFile {
    pub name: String,
    /// Reference frame id; recorded, not interpreted.
    #[serde(default)]
    pub frame: Option<String>,
    pub samples: Vec<SampleDto>,
}

impl ObjectFile {
    pub fn from_points(name: &str, points: &[OrientedPoint]) -> Self {
        Self {
            name: name.to_string(),
            frame: None,
            samples: points
                .iter()
                .map(|(p, n)| SampleDto {
                    position: [p.x, p.y, p.z],
                    normal: [n.x, n.y, n.z],
                })
                .collect(),
        }
    }

    pub fn points(&self) -> Vec<OrientedPoint> {
        self.samples
            .iter()
            .map(|s| (Vector3::from(s.position), Vector3::from(s.normal)))
            .collect()
    }
}

fn touching_default() -> bool {
    true
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContactDto {
    pub finger: String,
    pub position: [f64; 3],
    #[serde(default = "touching_default")]
    pub touching: bool,
}

/// Contacts plus optional friction settings and active-finger filter.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GraspFile {
    pub contacts: Vec<ContactDto>,
    /// Fallback friction model (overrides the config default).
    #[serde(default)]
    pub friction: Option<FrictionModel>,
    /// Per-finger friction models.
    #[serde(default)]
    pub fingers: BTreeMap<String, FrictionModel>,
    #[serde(default)]
    pub active: Vec<String>,
}

impl GraspFile {
    pub fn reports(&self) -> Vec<ContactReport> {
        self.contacts
            .iter()
            .map(|c| ContactReport {
                finger: FingerId::new(c.finger.as_str()),
                position: Vector3::from(c.position),
                touching: c.touching,
            })
            .collect()
    }

    pub fn active_fingers(&self) -> Vec<FingerId> {
        self.active.iter().map(|f| FingerId::new(f.as_str())).collect()
    }
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
}

/// Config file (if any) with the radius override applied, validated.
pub fn load_cfg(path: Option<&Path>, radius: Option<f64>) -> Result<IcrCfg> {
    let mut cfg = match path {
        Some(p) => read_json::<IcrCfg>(p)?,
        None => IcrCfg::default(),
    };
    if let Some(r) = radius {
        cfg.neighborhood_radius = r;
    }
    cfg.validate().context("invalid engine config")?;
    Ok(cfg)
}
