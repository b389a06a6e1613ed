//! Grow independent contact regions for a two-finger grasp on a jittered sphere.
//!
//! Usage:
//!   cargo run -p icr --example sphere_regions -- [samples] [seed]
//!
//! Prints the baseline quality, each finger's search zone, and region sizes
//! for a few relative thresholds.

use icr::api::{fibonacci_sphere, jittered_sphere, ContactReport, Engine, QualityThreshold};
use icr::IcrCfg;
use nalgebra::vector;

fn main() -> Result<(), icr::IcrError> {
    let mut args = std::env::args().skip(1);
    let samples: usize = args.next().and_then(|s| s.parse().ok()).unwrap_or(120);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(2025);

    let points = if seed == 0 {
        fibonacci_sphere(samples, 1.0)
    } else {
        jittered_sphere(samples, 1.0, 0.03, seed)
    };
    let mut engine = Engine::new(IcrCfg {
        neighborhood_radius: 0.45,
        zone_tolerance: 0.3,
        ..IcrCfg::default()
    })?;
    engine.set_object("sphere", points)?;
    engine.update_grasp(vec![
        ContactReport::touching("thumb", vector![1.0, 0.0, 0.0]),
        ContactReport::touching("index", vector![-1.0, 0.0, 0.0]),
    ])?;
    println!("baseline quality: {:.4}", engine.compute_wrench_space()?);

    for zone in engine.compute_search_zones()? {
        println!(
            "zone {:>6}: origin {:>4}, radius {:.3}, {} samples",
            zone.finger, zone.origin, zone.radius, zone.samples
        );
    }
    for fraction in [0.0, 0.5, 0.9] {
        engine.set_threshold(QualityThreshold::Relative(fraction))?;
        let set = engine.compute_regions()?;
        let sizes: Vec<String> = set
            .regions
            .iter()
            .map(|r| format!("{}={}", r.finger, r.len()))
            .collect();
        println!("threshold {fraction:.1} x baseline: {}", sizes.join(", "));
    }
    Ok(())
}
