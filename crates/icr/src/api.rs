//! Curated internal API for the CLI and demos (UNSTABLE).
//!
//! Not a public API; breaking changes are allowed. Prefer these re-exports so
//! callers do not depend on the module layout.

// Engine surface
pub use crate::engine::{ComputationMode, Engine, QualityThreshold, ZoneSummary};
pub use crate::server::IcrServer;
pub use crate::state::GraspState;
// Inputs
pub use crate::grasp::{ContactReport, FingerId};
pub use crate::object::{OrientedPoint, TargetObject};
pub use crate::wrench::{ContactModel, FrictionModel};
// Results and persistence
pub use crate::region::{ContactRegion, RegionSet};
pub use crate::store::{load_region_set, save_region_set, StoreError};
// Sample objects
pub use crate::shapes::{box_surface, fibonacci_sphere, jittered_sphere, square, translated};
