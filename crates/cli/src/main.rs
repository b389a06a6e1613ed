use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use icr::api::{
    jittered_sphere, ComputationMode, ContactReport, FingerId, IcrServer, QualityThreshold,
    RegionSet, ZoneSummary,
};
use icr::IcrCfg;
use nalgebra::vector;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::fmt::SubscriberBuilder;

mod io;
mod provenance;

use io::{load_cfg, read_json, GraspFile, ObjectFile};
use provenance::{write_sidecar, Payload};

#[derive(Parser)]
#[command(name = "icr-cli")]
#[command(about = "Independent contact regions for multi-fingered grasps")]
struct Cmd {
    /// Log per-zone and per-candidate decisions
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    action: Action,
}

#[derive(Args)]
struct EngineArgs {
    /// Engine config (JSON, missing fields take defaults)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override `neighborhood_radius`
    #[arg(long)]
    radius: Option<f64>,
}

#[derive(Subcommand)]
enum Action {
    /// Compute search zones and regions for one object + grasp
    Compute {
        #[arg(long)]
        object: PathBuf,
        #[arg(long)]
        grasp: PathBuf,
        #[command(flatten)]
        engine: EngineArgs,
        /// Absolute quality threshold
        #[arg(long, conflicts_with = "relative")]
        threshold: Option<f64>,
        /// Threshold as a fraction of the baseline quality
        #[arg(long)]
        relative: Option<f64>,
        /// Region database directory; records + provenance are written here
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Remap a saved region record from one object onto another
    Transfer {
        #[arg(long)]
        source: PathBuf,
        #[arg(long)]
        regions: PathBuf,
        #[arg(long)]
        target: PathBuf,
        #[command(flatten)]
        engine: EngineArgs,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Two-finger grasp on a jittered sphere (continuous mode)
    Demo {
        #[arg(long, default_value_t = 120)]
        samples: usize,
        #[arg(long, default_value_t = 2025)]
        seed: u64,
    },
    /// Print version and code revision
    Report,
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    let level = if cmd.verbose { Level::DEBUG } else { Level::INFO };
    SubscriberBuilder::default()
        .with_target(false)
        .with_max_level(level)
        .init();
    let summary = match cmd.action {
        Action::Compute {
            object,
            grasp,
            engine,
            threshold,
            relative,
            out,
        } => {
            let threshold = match (threshold, relative) {
                (Some(q), _) => Some(QualityThreshold::Absolute(q)),
                (None, Some(f)) => Some(QualityThreshold::Relative(f)),
                (None, None) => None,
            };
            compute(&object, &grasp, &engine, threshold, out.as_deref())?
        }
        Action::Transfer {
            source,
            regions,
            target,
            engine,
            out,
        } => transfer(&source, &regions, &target, &engine, out.as_deref())?,
        Action::Demo { samples, seed } => demo(samples, seed)?,
        Action::Report => report(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn compute(
    object_path: &Path,
    grasp_path: &Path,
    engine: &EngineArgs,
    threshold: Option<QualityThreshold>,
    out: Option<&Path>,
) -> Result<Value> {
    let cfg = load_cfg(engine.config.as_deref(), engine.radius)?;
    let object: ObjectFile = read_json(object_path)?;
    let grasp: GraspFile = read_json(grasp_path)?;
    tracing::info!(object = %object.name, frame = ?object.frame, samples = object.samples.len(), "compute");

    let server = IcrServer::new(cfg)?;
    server.set_object(&object.name, object.points())?;
    if let Some(model) = grasp.friction {
        server.set_friction_model(None, model)?;
    }
    for (finger, model) in &grasp.fingers {
        server.set_friction_model(Some(FingerId::new(finger.as_str())), *model)?;
    }
    if !grasp.active.is_empty() {
        server.set_active_fingers(grasp.active_fingers());
    }
    if let Some(t) = threshold {
        server.set_threshold(t)?;
    }
    server.update_grasp(grasp.reports())?;
    let baseline = server.with_engine(|e| e.compute_wrench_space())?;
    let zones = server.compute_search_zones()?;
    let regions = server.compute_regions()?;

    let mut summary = summarize(baseline, &zones, &regions);
    if let Some(dir) = out {
        let record = server
            .save_regions(dir)
            .with_context(|| format!("saving regions under {}", dir.display()))?;
        let params = json!({ "cfg": cfg, "threshold": threshold });
        let sidecar = write_sidecar(
            &record,
            Payload::new(params)
                .with_input(object_path)
                .with_input(grasp_path),
        )?;
        summary["record"] = json!(record.display().to_string());
        summary["provenance"] = json!(sidecar.display().to_string());
    }
    Ok(summary)
}

fn transfer(
    source_path: &Path,
    record_path: &Path,
    target_path: &Path,
    engine: &EngineArgs,
    out: Option<&Path>,
) -> Result<Value> {
    let cfg = load_cfg(engine.config.as_deref(), engine.radius)?;
    let source: ObjectFile = read_json(source_path)?;
    let target: ObjectFile = read_json(target_path)?;

    let server = IcrServer::new(cfg)?;
    server.set_object(&source.name, source.points())?;
    let loaded = server
        .load_regions(record_path)
        .with_context(|| format!("loading {}", record_path.display()))?;
    tracing::info!(from = %source.name, to = %target.name, grasp = %loaded.grasp_key, "transfer");
    server.set_object(&target.name, target.points())?;
    server.set_computation_mode(ComputationMode::Transfer);
    let regions = server.compute_regions()?;

    let mut summary = json!({ "source": loaded.grasp_key, "regions": regions });
    if let Some(dir) = out {
        let record = server.save_regions(dir)?;
        let sidecar = write_sidecar(
            &record,
            Payload::new(json!({ "cfg": cfg, "mode": "transfer" }))
                .with_input(source_path)
                .with_input(record_path)
                .with_input(target_path),
        )?;
        summary["record"] = json!(record.display().to_string());
        summary["provenance"] = json!(sidecar.display().to_string());
    }
    Ok(summary)
}

fn demo(samples: usize, seed: u64) -> Result<Value> {
    let server = IcrServer::new(IcrCfg {
        neighborhood_radius: 0.45,
        zone_tolerance: 0.3,
        ..IcrCfg::default()
    })?;
    server.set_object("demo-sphere", jittered_sphere(samples, 1.0, 0.03, seed))?;
    server.set_computation_mode(ComputationMode::Continuous);
    server.update_grasp(vec![
        ContactReport::touching("thumb", vector![1.0, 0.0, 0.0]),
        ContactReport::touching("index", vector![-1.0, 0.0, 0.0]),
    ])?;
    let regions = server
        .get_regions()
        .context("continuous recompute did not publish regions")?;
    let baseline = server.with_engine(|e| e.search_zones().map(|z| z.baseline()));
    Ok(json!({ "samples": samples, "seed": seed, "baseline": baseline, "regions": regions }))
}

fn report() -> Value {
    json!({
        "tool": "icr-cli",
        "engine_version": icr::VERSION,
        "code_rev": provenance::current_git_rev(),
    })
}

fn summarize(baseline: f64, zones: &[ZoneSummary], regions: &RegionSet) -> Value {
    json!({
        "object": regions.object,
        "grasp_key": regions.grasp_key,
        "baseline": baseline,
        "zones": zones,
        "regions": regions.regions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_inputs(dir: &Path) -> (PathBuf, PathBuf) {
        let object = dir.join("square.json");
        let file = ObjectFile::from_points("square", &icr::api::square(1.0));
        fs::write(&object, serde_json::to_vec(&file).unwrap()).unwrap();
        let grasp = dir.join("grasp.json");
        fs::write(
            &grasp,
            r#"{"contacts": [{"finger": "thumb", "position": [1, 0, 0]},
                             {"finger": "index", "position": [-1, 0, 0]}]}"#,
        )
        .unwrap();
        (object, grasp)
    }

    fn engine_args() -> EngineArgs {
        EngineArgs {
            config: None,
            radius: Some(2.5),
        }
    }

    #[test]
    fn compute_writes_record_and_sidecar() {
        let dir = tempdir().unwrap();
        let (object, grasp) = write_inputs(dir.path());
        let db = dir.path().join("db");
        let summary = compute(&object, &grasp, &engine_args(), None, Some(&db)).unwrap();
        assert!(summary["baseline"].as_f64().unwrap() > 0.0);
        assert_eq!(summary["regions"].as_array().unwrap().len(), 2);
        let record = PathBuf::from(summary["record"].as_str().unwrap());
        assert!(record.exists());
        assert!(PathBuf::from(summary["provenance"].as_str().unwrap()).exists());
    }

    #[test]
    fn transfer_remaps_a_saved_record() {
        let dir = tempdir().unwrap();
        let (object, grasp) = write_inputs(dir.path());
        let db = dir.path().join("db");
        let summary = compute(&object, &grasp, &engine_args(), None, Some(&db)).unwrap();
        let record = PathBuf::from(summary["record"].as_str().unwrap());
        let moved = transfer(&object, &record, &object, &engine_args(), None).unwrap();
        assert_eq!(moved["regions"]["regions"], summary["regions"]);
    }

    #[test]
    fn report_names_the_engine() {
        assert_eq!(report()["engine_version"], icr::VERSION);
    }
}
