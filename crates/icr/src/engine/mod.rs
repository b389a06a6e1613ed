//! The owning ICR engine: object, grasp, friction and derived artifacts.
//!
//! Purpose
//! - Hold every input and derived artifact as a directly-owned field and gate
//!   each computation on `GraspState`.
//! - Expose staged computations (`zone_job` → `run` → `commit_zones`, same for
//!   regions) so a caller holding a lock can run the expensive part without it.
//!
//! Invariants
//! - Failed operations leave state and artifacts untouched.
//! - Every invalidating operation bumps `generation`; a staged result is only
//!   committed if the generation it was planned at is still current.
//! - The surface graph is replaced wholesale (`Arc` swap), never mutated.
//!
//! Split: `jobs.rs` (staged zone/region computations), `transfer.rs` (region
//! transfer between objects).

mod jobs;
mod transfer;

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use jobs::{RegionJob, RegionOutcome, ZoneJob, ZoneOutcome};
use transfer::TransferSource;

use crate::cfg::IcrCfg;
use crate::error::IcrError;
use crate::graph::{self, SurfaceGraph};
use crate::grasp::{ContactReport, FingerId, Grasp};
use crate::object::{OrientedPoint, TargetObject};
use crate::region::RegionSet;
use crate::state::GraspState;
use crate::store;
use crate::wrench::{FrictionModel, FrictionTable, WrenchEvaluator, WrenchSpace};
use crate::zone::SearchZones;

/// When region growth runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComputationMode {
    /// Recompute zones and regions after every grasp update.
    Continuous,
    /// Recompute only on explicit request.
    #[default]
    StepWise,
    /// Remap a previously computed region set onto the current object.
    Transfer,
}

impl fmt::Display for ComputationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ComputationMode::Continuous => "continuous",
            ComputationMode::StepWise => "step-wise",
            ComputationMode::Transfer => "transfer",
        })
    }
}

/// Minimum quality a relocated contact must keep.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityThreshold {
    Absolute(f64),
    /// Fraction of the baseline quality of the grasp as given.
    Relative(f64),
}

impl Default for QualityThreshold {
    fn default() -> Self {
        QualityThreshold::Absolute(0.0)
    }
}

impl QualityThreshold {
    pub fn resolve(self, baseline: f64) -> f64 {
        match self {
            QualityThreshold::Absolute(q) => q,
            QualityThreshold::Relative(f) => f * baseline,
        }
    }

    fn validate(self) -> Result<(), IcrError> {
        let v = match self {
            QualityThreshold::Absolute(v) | QualityThreshold::Relative(v) => v,
        };
        if v.is_finite() && v >= 0.0 {
            Ok(())
        } else {
            Err(IcrError::invalid(format!(
                "quality threshold must be finite and >= 0 (got {v})"
            )))
        }
    }
}

/// Per-finger search-zone summary returned by `compute_search_zones`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ZoneSummary {
    pub finger: FingerId,
    pub origin: usize,
    pub radius: f64,
    pub samples: usize,
}

pub struct Engine {
    cfg: IcrCfg,
    state: GraspState,
    generation: u64,
    mode: ComputationMode,
    threshold: QualityThreshold,
    friction: FrictionTable,
    active: BTreeSet<FingerId>,
    object: Option<Arc<TargetObject>>,
    graph: Option<Arc<SurfaceGraph>>,
    grasp: Option<Grasp>,
    wrench: Option<WrenchSpace>,
    zones: Option<SearchZones>,
    regions: Option<RegionSet>,
    transfer: Option<TransferSource>,
}

impl Engine {
    pub fn new(cfg: IcrCfg) -> Result<Self, IcrError> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            state: GraspState::ObjectUnset,
            generation: 0,
            mode: ComputationMode::default(),
            threshold: QualityThreshold::default(),
            friction: FrictionTable::new(cfg.default_friction),
            active: BTreeSet::new(),
            object: None,
            graph: None,
            grasp: None,
            wrench: None,
            zones: None,
            regions: None,
            transfer: None,
        })
    }

    // ----- accessors -----

    #[inline]
    pub fn state(&self) -> GraspState {
        self.state
    }
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }
    #[inline]
    pub fn mode(&self) -> ComputationMode {
        self.mode
    }
    #[inline]
    pub fn threshold(&self) -> QualityThreshold {
        self.threshold
    }
    #[inline]
    pub fn cfg(&self) -> &IcrCfg {
        &self.cfg
    }
    #[inline]
    pub fn friction(&self) -> &FrictionTable {
        &self.friction
    }
    pub fn object(&self) -> Option<&Arc<TargetObject>> {
        self.object.as_ref()
    }
    pub fn graph(&self) -> Option<&Arc<SurfaceGraph>> {
        self.graph.as_ref()
    }
    pub fn grasp(&self) -> Option<&Grasp> {
        self.grasp.as_ref()
    }
    pub fn wrench_space(&self) -> Option<&WrenchSpace> {
        self.wrench.as_ref()
    }
    pub fn search_zones(&self) -> Option<&SearchZones> {
        self.zones.as_ref()
    }
    /// Last committed regions, if any.
    pub fn regions(&self) -> Option<&RegionSet> {
        self.regions.as_ref()
    }
    pub fn has_transfer_source(&self) -> bool {
        self.transfer.is_some()
    }

    // ----- object -----

    /// Build the object and its surface graph without touching any engine.
    pub fn prepare_object(
        cfg: &IcrCfg,
        name: &str,
        points: Vec<OrientedPoint>,
    ) -> Result<Arc<SurfaceGraph>, IcrError> {
        let object = Arc::new(TargetObject::new(name, points)?);
        let graph = graph::build(object, cfg.neighborhood_radius, cfg.curvature_gain)?;
        Ok(Arc::new(graph))
    }

    pub fn set_object(&mut self, name: &str, points: Vec<OrientedPoint>) -> Result<(), IcrError> {
        let graph = Self::prepare_object(&self.cfg, name, points)?;
        self.install_graph(graph);
        Ok(())
    }

    /// Swap in a prepared object graph; resets to `ObjectSet`.
    ///
    /// Regions computed on the outgoing object become the transfer source.
    pub fn install_graph(&mut self, graph: Arc<SurfaceGraph>) {
        if let (Some(old), Some(regions)) = (&self.object, &self.regions) {
            self.transfer = Some(TransferSource::capture(old, regions));
        }
        let object = graph.object().clone();
        tracing::info!(
            object = object.name(),
            samples = object.len(),
            edges = graph.edge_count(),
            "object set"
        );
        self.object = Some(object);
        self.graph = Some(graph);
        self.grasp = None;
        self.clear_derived();
        self.state = GraspState::ObjectSet;
        self.bump();
    }

    // ----- grasp and parameters -----

    /// Replace the grasp; resets to `GraspInitialized`.
    pub fn apply_grasp(&mut self, reports: Vec<ContactReport>) -> Result<(), IcrError> {
        self.state.require(GraspState::ObjectSet, "update_grasp")?;
        let object = self.require_object("update_grasp")?;
        let reports: Vec<ContactReport> = if self.active.is_empty() {
            reports
        } else {
            reports
                .into_iter()
                .filter(|r| self.active.contains(&r.finger))
                .collect()
        };
        let grasp = Grasp::from_reports(&object, reports)?;
        tracing::info!(
            grasp = %grasp.key(),
            touching = grasp.touching_count(),
            "grasp updated"
        );
        self.grasp = Some(grasp);
        self.clear_derived();
        self.state = GraspState::GraspInitialized;
        self.bump();
        Ok(())
    }

    /// `apply_grasp`, then recompute zones and regions in continuous mode.
    ///
    /// The update itself is what succeeds or fails; a failed automatic
    /// recomputation is logged and leaves the engine at its last completed stage.
    pub fn update_grasp(&mut self, reports: Vec<ContactReport>) -> Result<(), IcrError> {
        self.apply_grasp(reports)?;
        if self.mode == ComputationMode::Continuous {
            if let Err(err) = self.recompute() {
                tracing::warn!(error = %err, "continuous recomputation failed");
            }
        }
        Ok(())
    }

    /// Set the model of one finger, or the fallback model when `finger` is `None`.
    pub fn set_friction_model(
        &mut self,
        finger: Option<FingerId>,
        model: FrictionModel,
    ) -> Result<(), IcrError> {
        model.validate()?;
        match finger {
            Some(f) => self.friction.set(f, model),
            None => self.friction.set_fallback(model),
        }
        self.invalidate_from(GraspState::GraspInitialized);
        self.bump();
        Ok(())
    }

    /// Restrict future grasps to `fingers` (empty = all). Drops a present grasp.
    pub fn set_active_fingers(&mut self, fingers: Vec<FingerId>) {
        self.active = fingers.into_iter().collect();
        if self.grasp.take().is_some() {
            self.clear_derived();
            self.state.reset_to(GraspState::ObjectSet);
        }
        tracing::info!(active = self.active.len(), "active fingers set");
        self.bump();
    }

    /// Switch modes. Leaving `Transfer` steps back to the last stage whose
    /// artifacts exist, since transferred regions skip zones and wrench space.
    pub fn set_computation_mode(&mut self, mode: ComputationMode) {
        if mode != self.mode {
            tracing::info!(from = %self.mode, to = %mode, "computation mode");
        }
        if self.mode == ComputationMode::Transfer && mode != ComputationMode::Transfer {
            self.invalidate_from(self.backed());
        }
        self.mode = mode;
        self.bump();
    }

    /// Absolute threshold shorthand.
    pub fn set_quality_threshold(&mut self, q: f64) -> Result<(), IcrError> {
        self.set_threshold(QualityThreshold::Absolute(q))
    }

    pub fn set_threshold(&mut self, threshold: QualityThreshold) -> Result<(), IcrError> {
        threshold.validate()?;
        self.threshold = threshold;
        self.invalidate_from(GraspState::SearchZonesComputed);
        self.bump();
        Ok(())
    }

    // ----- computations -----

    pub fn compute_wrench_space(&mut self) -> Result<f64, IcrError> {
        self.state
            .require(GraspState::GraspInitialized, "compute_wrench_space")?;
        let (object, grasp) = match (&self.object, &self.grasp) {
            (Some(o), Some(g)) => (o, g),
            _ => return Err(self.missing("compute_wrench_space")),
        };
        let contacts = grasp.contact_points(object, &self.friction, None);
        let space = WrenchEvaluator::for_object(object).wrench_space(&contacts);
        let q = space.quality();
        tracing::info!(quality = q, closed = space.is_closed(), "wrench space");
        self.wrench = Some(space);
        self.state.advance_to(GraspState::WrenchSpaceComputed);
        Ok(q)
    }

    /// Explicit closure query: `NotClosed` when the grasp has no margin.
    pub fn check_closure(&mut self) -> Result<f64, IcrError> {
        if self.wrench.is_none() {
            self.compute_wrench_space()?;
        }
        match &self.wrench {
            Some(space) => space.check_closure(),
            None => Err(self.missing("check_closure")),
        }
    }

    pub fn zone_job(&self) -> Result<ZoneJob, IcrError> {
        self.state
            .require(GraspState::GraspInitialized, "compute_search_zones")?;
        match (&self.graph, &self.grasp) {
            (Some(graph), Some(grasp)) => Ok(ZoneJob {
                generation: self.generation,
                graph: graph.clone(),
                grasp: grasp.clone(),
                friction: self.friction.clone(),
                cfg: self.cfg,
            }),
            _ => Err(self.missing("compute_search_zones")),
        }
    }

    pub fn commit_zones(&mut self, outcome: ZoneOutcome) -> Result<Vec<ZoneSummary>, IcrError> {
        self.check_generation(outcome.generation)?;
        let summary = summarize(&outcome.zones);
        self.wrench = Some(outcome.wrench);
        self.zones = Some(outcome.zones);
        self.regions = None;
        self.state = GraspState::SearchZonesComputed;
        Ok(summary)
    }

    pub fn compute_search_zones(&mut self) -> Result<Vec<ZoneSummary>, IcrError> {
        let outcome = self.zone_job()?.run()?;
        self.commit_zones(outcome)
    }

    pub fn region_job(&self) -> Result<RegionJob, IcrError> {
        const OP: &str = "compute_regions";
        if self.mode == ComputationMode::Transfer {
            self.state.require(GraspState::ObjectSet, OP)?;
            let (Some(graph), Some(source)) = (&self.graph, &self.transfer) else {
                return Err(IcrError::Precondition {
                    operation: OP,
                    required: GraspState::RegionsComputed,
                    current: self.state,
                });
            };
            return Ok(RegionJob::transfer(
                self.generation,
                graph.clone(),
                source.clone(),
            ));
        }
        self.state.require(GraspState::SearchZonesComputed, OP)?;
        match (&self.graph, &self.grasp, &self.zones) {
            (Some(graph), Some(grasp), Some(zones)) => Ok(RegionJob::grow(
                self.generation,
                graph.clone(),
                grasp.clone(),
                self.friction.clone(),
                zones.clone(),
                self.threshold.resolve(zones.baseline()),
                self.cfg.parallel_fingers,
            )),
            _ => Err(self.missing(OP)),
        }
    }

    pub fn commit_regions(&mut self, outcome: RegionOutcome) -> Result<RegionSet, IcrError> {
        self.check_generation(outcome.generation)?;
        tracing::info!(
            grasp = %outcome.regions.grasp_key,
            fingers = outcome.regions.regions.len(),
            samples = outcome.regions.sample_count(),
            "regions computed"
        );
        self.regions = Some(outcome.regions.clone());
        self.state = GraspState::RegionsComputed;
        Ok(outcome.regions)
    }

    pub fn compute_regions(&mut self) -> Result<RegionSet, IcrError> {
        let outcome = self.region_job()?.run();
        self.commit_regions(outcome)
    }

    /// Zones then regions (regions only in transfer mode).
    pub fn recompute(&mut self) -> Result<RegionSet, IcrError> {
        if self.mode != ComputationMode::Transfer {
            self.compute_search_zones()?;
        }
        self.compute_regions()
    }

    // ----- persistence -----

    /// Write the current regions under `dir`; returns the record path.
    pub fn save_regions(&self, dir: &Path) -> Result<PathBuf, IcrError> {
        self.state
            .require(GraspState::RegionsComputed, "save_regions")?;
        let regions = self.regions.as_ref().ok_or_else(|| self.missing("save_regions"))?;
        Ok(store::save_region_set(dir, regions)?)
    }

    /// Read a record for the current object and install it as transfer source.
    pub fn load_regions(&mut self, path: &Path) -> Result<RegionSet, IcrError> {
        self.state.require(GraspState::ObjectSet, "load_regions")?;
        let set = store::load_region_set(path)?;
        self.adopt_regions(&set)?;
        Ok(set)
    }

    /// Validate `set` against the current object and make it the transfer source.
    pub fn adopt_regions(&mut self, set: &RegionSet) -> Result<(), IcrError> {
        self.state.require(GraspState::ObjectSet, "load_regions")?;
        let object = self.require_object("load_regions")?;
        if set.object != object.name() {
            tracing::warn!(
                record = %set.object,
                object = object.name(),
                "region record was saved for a different object"
            );
        }
        self.transfer = Some(TransferSource::from_record(&object, set)?);
        self.bump();
        Ok(())
    }

    // ----- internals -----

    fn bump(&mut self) {
        self.generation += 1;
    }

    fn clear_derived(&mut self) {
        self.wrench = None;
        self.zones = None;
        self.regions = None;
    }

    /// Last stage whose artifacts are all present.
    fn backed(&self) -> GraspState {
        if self.object.is_none() {
            GraspState::ObjectUnset
        } else if self.grasp.is_none() {
            GraspState::ObjectSet
        } else if self.wrench.is_none() {
            GraspState::GraspInitialized
        } else if self.zones.is_none() {
            GraspState::WrenchSpaceComputed
        } else if self.regions.is_none() {
            GraspState::SearchZonesComputed
        } else {
            GraspState::RegionsComputed
        }
    }

    /// Drop artifacts past `keep` and step back to it (or to the last stage
    /// whose artifacts actually exist, after a transfer).
    fn invalidate_from(&mut self, keep: GraspState) {
        if self.state <= keep {
            return;
        }
        let keep = keep.min(self.backed());
        if keep < GraspState::WrenchSpaceComputed {
            self.wrench = None;
        }
        if keep < GraspState::SearchZonesComputed {
            self.zones = None;
        }
        if keep < GraspState::RegionsComputed {
            self.regions = None;
        }
        self.state.reset_to(keep);
    }

    fn check_generation(&self, planned: u64) -> Result<(), IcrError> {
        if planned == self.generation {
            Ok(())
        } else {
            tracing::info!(
                planned,
                current = self.generation,
                "discarding superseded result"
            );
            Err(IcrError::Superseded {
                generation: planned,
            })
        }
    }

    fn require_object(&self, operation: &'static str) -> Result<Arc<TargetObject>, IcrError> {
        self.object.clone().ok_or_else(|| self.missing(operation))
    }

    /// An artifact the operation needs is absent; name the stage that creates it.
    fn missing(&self, operation: &'static str) -> IcrError {
        IcrError::Precondition {
            operation,
            required: self.backed().next(),
            current: self.state,
        }
    }
}

fn summarize(zones: &SearchZones) -> Vec<ZoneSummary> {
    zones
        .zones()
        .iter()
        .map(|z| ZoneSummary {
            finger: z.finger().clone(),
            origin: z.origin(),
            radius: z.radius(),
            samples: z.len(),
        })
        .collect()
}
