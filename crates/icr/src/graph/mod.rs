//! Surface proximity graph and all-pairs geodesic distances.
//!
//! Purpose
//! - Connect surface samples that lie within a Euclidean neighborhood radius,
//!   weight the edges with an `EdgeMetric`, and answer geodesic distance
//!   queries over a candidate subset with Floyd–Warshall.
//!
//! Conventions
//! - Edges are undirected; adjacency lists are sorted by neighbor index.
//! - Disconnected pairs carry `f64::INFINITY`, never 0.
//! - Distance matrices are dense over the (sorted, deduplicated) subset and
//!   exactly symmetric.
//!
//! Split: `types.rs` (graph, metrics, distance matrix), `build.rs`
//! (construction), `paths.rs` (Floyd–Warshall, single-source walks and
//! reachability).

mod build;
mod paths;
mod types;

pub use build::{build, build_with_metric};
pub use paths::GeodesicWalk;
pub(crate) use types::Frontier;
pub use types::{DistanceMatrix, EdgeMetric, Euclidean, NormalDeviation, SurfaceGraph};
