//! Grasp wrench space and the spherical quality metric.
//!
//! Purpose
//! - Turn touching contacts into friction-cone wrenches, build the convex
//!   wrench polytope, and report the radius of the largest origin-centred
//!   ball inside it.
//!
//! Conventions
//! - Wrench `w = [f; (p − c) × f / λ]` with unit force `f`, object centroid `c`
//!   and torque scale `λ` (largest sample distance from `c`).
//! - Half-spaces use `n·w <= c` with unit `n`; a facet offset `c` is the
//!   distance from the origin to that facet when the origin is inside.
//! - Facets are enumerated from 6-subsets of wrench points (explicit and
//!   dependency-light; point counts stay in the tens).
//! - Fewer than two touching contacts never reach hull construction.
//!
//! Split: `cone.rs` (friction models, per-contact wrenches), `hull.rs`
//! (facet enumeration), `space.rs` (`WrenchSpace`, `WrenchEvaluator`).

mod cone;
mod hull;
mod space;

pub use cone::{contact_wrenches, ContactModel, ContactPoint, FrictionModel, FrictionTable};
pub use hull::{spherical_quality, Hs6, WRENCH_DIM};
pub use space::{WrenchEvaluator, WrenchSpace};

#[cfg(test)]
mod tests;
