//! Independent Contact Regions (ICR) for multi-fingered grasps.
//!
//! Given a sampled object surface and a grasp, compute for every finger the
//! largest connected patch of surface samples over which that finger may be
//! relocated (others held fixed) while the grasp keeps a minimum spherical
//! wrench-space quality.
//!
//! Pipeline
//! - `graph`: proximity graph over surface samples + Floyd–Warshall distances.
//! - `wrench`: friction cones → wrench polytope → spherical quality.
//! - `zone`: per-finger search zones (geodesic balls bounded by a quality probe).
//! - `region`: frontier growth inside each zone, gated by the quality threshold.
//! - `state` / `engine` / `server`: the grasp state machine, the owning engine,
//!   and the lock boundary used by concurrent callers.
//! - `store`: region records on disk (one JSON file per object + grasp).
//!
//! API Policy
//! - This crate is project-internal. There is no stable public API.

pub mod api;
pub mod cfg;
pub mod engine;
pub mod error;
pub mod graph;
pub mod grasp;
pub mod object;
pub mod region;
pub mod server;
pub mod shapes;
pub mod state;
pub mod store;
pub mod wrench;
pub mod zone;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use cfg::IcrCfg;
pub use error::IcrError;
pub use nalgebra::{Vector3 as Vec3, Vector6 as Wrench};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::cfg::IcrCfg;
    pub use crate::engine::{ComputationMode, Engine, QualityThreshold};
    pub use crate::error::IcrError;
    pub use crate::grasp::{ContactReport, FingerId, Grasp};
    pub use crate::object::{OrientedPoint, SurfaceSample, TargetObject};
    pub use crate::region::{ContactRegion, RegionSet};
    pub use crate::server::IcrServer;
    pub use crate::state::GraspState;
    pub use crate::wrench::{ContactModel, FrictionModel};
    pub use nalgebra::Vector3;
}
