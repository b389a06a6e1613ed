//! Error kinds surfaced by the engine.
//!
//! Structural problems (`Precondition`, `EmptyObject`, `InvalidParameter`)
//! abort the requested operation and leave the engine state untouched.
//! `NotClosed` is only returned by explicit closure queries; region growth
//! treats a zero quality as "reject this candidate".

use std::fmt;

use crate::grasp::FingerId;
use crate::state::GraspState;
use crate::store::StoreError;

#[derive(Debug)]
pub enum IcrError {
    /// The object has no surface samples.
    EmptyObject,
    /// The finger has no touching contact in the current grasp.
    UngraspedFinger { finger: FingerId },
    /// The origin is not strictly inside the grasp wrench space.
    NotClosed { quality: f64 },
    /// An operation was invoked before the state it depends on was reached.
    /// `required` is the earliest state in the chain that is still missing.
    Precondition {
        operation: &'static str,
        required: GraspState,
        current: GraspState,
    },
    /// A geodesic distance was requested between samples with no connecting path.
    DisconnectedGraph { from: usize, to: usize },
    InvalidParameter { reason: String },
    /// A staged computation finished after a newer update; its result was dropped.
    Superseded { generation: u64 },
    Store(StoreError),
}

impl IcrError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for IcrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IcrError::EmptyObject => write!(f, "object has no surface samples"),
            IcrError::UngraspedFinger { finger } => {
                write!(f, "finger {finger} has no touching contact")
            }
            IcrError::NotClosed { quality } => write!(
                f,
                "grasp is not force/torque closed (quality {quality:.3e})"
            ),
            IcrError::Precondition {
                operation,
                required,
                current,
            } => write!(
                f,
                "{operation} requires state {required} (current state: {current})"
            ),
            IcrError::DisconnectedGraph { from, to } => {
                write!(f, "no surface path between samples {from} and {to}")
            }
            IcrError::InvalidParameter { reason } => write!(f, "invalid parameter: {reason}"),
            IcrError::Superseded { generation } => write!(
                f,
                "result discarded: engine moved past generation {generation}"
            ),
            IcrError::Store(err) => write!(f, "region store: {err}"),
        }
    }
}

impl std::error::Error for IcrError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IcrError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for IcrError {
    fn from(err: StoreError) -> Self {
        IcrError::Store(err)
    }
}
