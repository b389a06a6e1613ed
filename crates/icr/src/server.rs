//! Lock boundary for concurrent callers.
//!
//! `IcrServer` owns the engine behind one `Mutex`. State transitions hold the
//! lock for their full (short) duration; the expensive parts run outside it:
//! - object graphs are built before the lock is taken and swapped in whole;
//! - zone and region computations are planned under the lock, run without
//!   it, and committed under it only if no invalidating update happened in
//!   between (`IcrError::Superseded` otherwise).

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::cfg::IcrCfg;
use crate::engine::{ComputationMode, Engine, QualityThreshold, ZoneSummary};
use crate::error::IcrError;
use crate::grasp::{ContactReport, FingerId};
use crate::object::OrientedPoint;
use crate::region::RegionSet;
use crate::state::GraspState;
use crate::store;
use crate::wrench::FrictionModel;

pub struct IcrServer {
    engine: Mutex<Engine>,
}

impl IcrServer {
    pub fn new(cfg: IcrCfg) -> Result<Self, IcrError> {
        Ok(Self::from_engine(Engine::new(cfg)?))
    }

    pub fn from_engine(engine: Engine) -> Self {
        Self {
            engine: Mutex::new(engine),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Engine> {
        // Engine methods validate before mutating; a poisoned engine is consistent.
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with exclusive access to the engine.
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut Engine) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn state(&self) -> GraspState {
        self.lock().state()
    }

    pub fn set_object(&self, name: &str, points: Vec<OrientedPoint>) -> Result<(), IcrError> {
        let cfg = *self.lock().cfg();
        let graph = Engine::prepare_object(&cfg, name, points)?;
        self.lock().install_graph(graph);
        Ok(())
    }

    /// Commit a new grasp; in continuous mode, recompute zones and regions.
    ///
    /// A recomputation overtaken by a newer update is not reported as an
    /// error; the newer update owns the next result.
    pub fn update_grasp(&self, reports: Vec<ContactReport>) -> Result<(), IcrError> {
        let continuous = {
            let mut engine = self.lock();
            engine.apply_grasp(reports)?;
            engine.mode() == ComputationMode::Continuous
        };
        if continuous {
            match self.recompute() {
                Ok(_) => {}
                Err(IcrError::Superseded { generation }) => {
                    tracing::debug!(generation, "continuous recompute superseded")
                }
                Err(err) => tracing::warn!(error = %err, "continuous recompute failed"),
            }
        }
        Ok(())
    }

    pub fn set_friction_model(
        &self,
        finger: Option<FingerId>,
        model: FrictionModel,
    ) -> Result<(), IcrError> {
        self.lock().set_friction_model(finger, model)
    }

    pub fn set_active_fingers(&self, fingers: Vec<FingerId>) {
        self.lock().set_active_fingers(fingers)
    }

    pub fn set_computation_mode(&self, mode: ComputationMode) {
        self.lock().set_computation_mode(mode)
    }

    pub fn set_quality_threshold(&self, q: f64) -> Result<(), IcrError> {
        self.lock().set_quality_threshold(q)
    }

    pub fn set_threshold(&self, threshold: QualityThreshold) -> Result<(), IcrError> {
        self.lock().set_threshold(threshold)
    }

    pub fn check_closure(&self) -> Result<f64, IcrError> {
        self.lock().check_closure()
    }

    pub fn compute_search_zones(&self) -> Result<Vec<ZoneSummary>, IcrError> {
        let job = self.lock().zone_job()?;
        let outcome = job.run()?;
        self.lock().commit_zones(outcome)
    }

    pub fn compute_regions(&self) -> Result<RegionSet, IcrError> {
        let job = self.lock().region_job()?;
        let outcome = job.run();
        self.lock().commit_regions(outcome)
    }

    /// Zones then regions (regions only in transfer mode).
    pub fn recompute(&self) -> Result<RegionSet, IcrError> {
        if self.lock().mode() != ComputationMode::Transfer {
            self.compute_search_zones()?;
        }
        self.compute_regions()
    }

    /// Snapshot of the last committed regions.
    pub fn get_regions(&self) -> Option<RegionSet> {
        self.lock().regions().cloned()
    }

    /// Snapshot under the lock, write without it.
    pub fn save_regions(&self, dir: &Path) -> Result<PathBuf, IcrError> {
        let set = {
            let engine = self.lock();
            let state = engine.state();
            state.require(GraspState::RegionsComputed, "save_regions")?;
            engine.regions().cloned().ok_or(IcrError::Precondition {
                operation: "save_regions",
                required: GraspState::RegionsComputed,
                current: state,
            })?
        };
        Ok(store::save_region_set(dir, &set)?)
    }

    /// Read without the lock, validate and install under it.
    pub fn load_regions(&self, path: &Path) -> Result<RegionSet, IcrError> {
        self.lock()
            .state()
            .require(GraspState::ObjectSet, "load_regions")?;
        let set = store::load_region_set(path)?;
        self.lock().adopt_regions(&set)?;
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use nalgebra::vector;

    use super::*;
    use crate::shapes;

    fn server() -> IcrServer {
        let s = IcrServer::new(IcrCfg {
            neighborhood_radius: 2.5,
            ..IcrCfg::default()
        })
        .unwrap();
        s.set_object("square", shapes::square(1.0)).unwrap();
        s
    }

    fn opposing() -> Vec<ContactReport> {
        vec![
            ContactReport::touching("thumb", vector![1.0, 0.0, 0.0]),
            ContactReport::touching("index", vector![-1.0, 0.0, 0.0]),
        ]
    }

    #[test]
    fn staged_pipeline_publishes_regions() {
        let s = server();
        assert!(s.get_regions().is_none());
        s.update_grasp(opposing()).unwrap();
        assert!(s.check_closure().unwrap() > 0.0);
        s.compute_search_zones().unwrap();
        let set = s.compute_regions().unwrap();
        assert_eq!(s.get_regions(), Some(set));
        assert_eq!(s.state(), GraspState::RegionsComputed);
    }

    #[test]
    fn newer_update_supersedes_in_flight_job() {
        let s = server();
        s.update_grasp(opposing()).unwrap();
        let job = s.with_engine(|e| e.zone_job()).unwrap();
        s.update_grasp(opposing()).unwrap();
        let outcome = job.run().unwrap();
        let res = s.with_engine(|e| e.commit_zones(outcome));
        assert!(matches!(res, Err(IcrError::Superseded { .. })));
        assert_eq!(s.state(), GraspState::GraspInitialized);
    }

    #[test]
    fn continuous_mode_publishes_after_update() {
        let s = server();
        s.set_computation_mode(ComputationMode::Continuous);
        s.update_grasp(opposing()).unwrap();
        assert_eq!(s.state(), GraspState::RegionsComputed);
        assert_eq!(s.get_regions().unwrap().regions.len(), 2);
    }

    #[test]
    fn concurrent_callers_leave_a_consistent_engine() {
        let s = Arc::new(server());
        s.set_computation_mode(ComputationMode::Continuous);
        let handles: Vec<_> = (0..4)
            .map(|k| {
                let s = Arc::clone(&s);
                thread::spawn(move || {
                    for _ in 0..3 {
                        s.update_grasp(opposing()).unwrap();
                        if k % 2 == 0 {
                            let _ = s.get_regions();
                        } else {
                            let _ = s.set_quality_threshold(0.0);
                        }
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        // Whatever interleaving happened, one final explicit pass succeeds.
        let set = s.recompute().unwrap();
        assert_eq!(set.regions.len(), 2);
        assert_eq!(s.state(), GraspState::RegionsComputed);
    }

    #[test]
    fn save_and_load_go_through_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let s = server();
        assert!(matches!(
            s.save_regions(dir.path()),
            Err(IcrError::Precondition { .. })
        ));
        s.update_grasp(opposing()).unwrap();
        let set = s.recompute().unwrap();
        let path = s.save_regions(dir.path()).unwrap();
        assert_eq!(s.load_regions(&path).unwrap(), set);
        assert!(s.with_engine(|e| e.has_transfer_source()));
    }
}
