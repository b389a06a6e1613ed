//! Staged computations: planned under the engine lock, run without it.

use std::sync::Arc;

use super::transfer::TransferSource;
use crate::cfg::IcrCfg;
use crate::error::IcrError;
use crate::graph::SurfaceGraph;
use crate::grasp::Grasp;
use crate::region::{RegionGrower, RegionSet};
use crate::wrench::{FrictionTable, WrenchEvaluator, WrenchSpace};
use crate::zone::{SearchZones, ZoneBuilder};

/// Snapshot for wrench space + search zones.
#[derive(Clone, Debug)]
pub struct ZoneJob {
    pub(super) generation: u64,
    pub(super) graph: Arc<SurfaceGraph>,
    pub(super) grasp: Grasp,
    pub(super) friction: FrictionTable,
    pub(super) cfg: IcrCfg,
}

#[derive(Clone, Debug)]
pub struct ZoneOutcome {
    pub(super) generation: u64,
    pub(super) wrench: WrenchSpace,
    pub(super) zones: SearchZones,
}

impl ZoneJob {
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn run(&self) -> Result<ZoneOutcome, IcrError> {
        let object = self.graph.object();
        let contacts = self.grasp.contact_points(object, &self.friction, None);
        let wrench = WrenchEvaluator::for_object(object).wrench_space(&contacts);
        let zones = ZoneBuilder::new(&self.graph, &self.grasp, &self.friction, self.cfg)
            .build_all()?;
        Ok(ZoneOutcome {
            generation: self.generation,
            wrench,
            zones,
        })
    }
}

#[derive(Clone, Debug)]
enum RegionPlan {
    Grow {
        grasp: Grasp,
        friction: FrictionTable,
        zones: SearchZones,
        threshold: f64,
        parallel: bool,
    },
    Transfer {
        source: TransferSource,
    },
}

/// Snapshot for region growth (or transfer).
#[derive(Clone, Debug)]
pub struct RegionJob {
    generation: u64,
    graph: Arc<SurfaceGraph>,
    plan: RegionPlan,
}

#[derive(Clone, Debug)]
pub struct RegionOutcome {
    pub(super) generation: u64,
    pub(super) regions: RegionSet,
}

impl RegionOutcome {
    #[inline]
    pub fn regions(&self) -> &RegionSet {
        &self.regions
    }
}

impl RegionJob {
    pub(super) fn grow(
        generation: u64,
        graph: Arc<SurfaceGraph>,
        grasp: Grasp,
        friction: FrictionTable,
        zones: SearchZones,
        threshold: f64,
        parallel: bool,
    ) -> Self {
        Self {
            generation,
            graph,
            plan: RegionPlan::Grow {
                grasp,
                friction,
                zones,
                threshold,
                parallel,
            },
        }
    }

    pub(super) fn transfer(
        generation: u64,
        graph: Arc<SurfaceGraph>,
        source: TransferSource,
    ) -> Self {
        Self {
            generation,
            graph,
            plan: RegionPlan::Transfer { source },
        }
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn run(&self) -> RegionOutcome {
        let regions = match &self.plan {
            RegionPlan::Grow {
                grasp,
                friction,
                zones,
                threshold,
                parallel,
            } => {
                let grower = RegionGrower::new(&self.graph, grasp, friction, *threshold);
                RegionSet {
                    object: self.graph.object().name().to_string(),
                    grasp_key: grasp.key(),
                    regions: grower.grow_all(zones, *parallel),
                }
            }
            RegionPlan::Transfer { source } => source.remap(&self.graph),
        };
        RegionOutcome {
            generation: self.generation,
            regions,
        }
    }
}
