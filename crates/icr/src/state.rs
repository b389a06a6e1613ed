//! Grasp state machine.
//!
//! States are totally ordered along the computation chain; an operation that
//! needs state `S` is valid in any state `>= S`. Resets move backwards:
//! object replacement → `ObjectSet`, grasp or contact update → `GraspInitialized`.

use std::fmt;

use crate::error::IcrError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GraspState {
    #[default]
    ObjectUnset,
    ObjectSet,
    GraspInitialized,
    WrenchSpaceComputed,
    SearchZonesComputed,
    RegionsComputed,
}

impl GraspState {
    pub fn name(self) -> &'static str {
        match self {
            GraspState::ObjectUnset => "ObjectUnset",
            GraspState::ObjectSet => "ObjectSet",
            GraspState::GraspInitialized => "GraspInitialized",
            GraspState::WrenchSpaceComputed => "WrenchSpaceComputed",
            GraspState::SearchZonesComputed => "SearchZonesComputed",
            GraspState::RegionsComputed => "RegionsComputed",
        }
    }

    /// Successor in the chain (`RegionsComputed` is its own successor).
    pub fn next(self) -> GraspState {
        match self {
            GraspState::ObjectUnset => GraspState::ObjectSet,
            GraspState::ObjectSet => GraspState::GraspInitialized,
            GraspState::GraspInitialized => GraspState::WrenchSpaceComputed,
            GraspState::WrenchSpaceComputed => GraspState::SearchZonesComputed,
            GraspState::SearchZonesComputed | GraspState::RegionsComputed => {
                GraspState::RegionsComputed
            }
        }
    }

    /// Fail with `Precondition` unless `self >= needed`.
    ///
    /// The error names the earliest missing state (`self.next()`), which is
    /// the step the caller has to perform first.
    pub fn require(self, needed: GraspState, operation: &'static str) -> Result<(), IcrError> {
        if self >= needed {
            Ok(())
        } else {
            Err(IcrError::Precondition {
                operation,
                required: self.next(),
                current: self,
            })
        }
    }

    /// Forward-only transition; never moves backwards.
    pub(crate) fn advance_to(&mut self, target: GraspState) {
        if target > *self {
            *self = target;
        }
    }

    /// Backward-only transition; never moves forwards.
    pub(crate) fn reset_to(&mut self, target: GraspState) {
        if target < *self {
            *self = target;
        }
    }
}

impl fmt::Display for GraspState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
