//! Per-finger search zones.
//!
//! A zone is a geodesic ball around the finger's contact sample whose radius
//! comes from a quality probe:
//! - candidates: samples reachable from the contact along graph edges without
//!   leaving the Euclidean `max_displacement` ball (whole component if unset);
//! - probe: walk the candidates outward in ascending `(distance, index)` order
//!   and relocate the finger to each; `r_f` is the distance of the last
//!   candidate before the first one whose quality is zero or below
//!   `zone_fraction · baseline` (the largest distance when none fails);
//! - zone: `{ s : d(s) <= r_f + zone_tolerance }`, capped at `max_displacement`.
//!
//! The walk stops as soon as the radius is known, and Floyd–Warshall only runs
//! over the zone members, so cost follows the zone size rather than the
//! object size. The zone never depends on the quality threshold. Probed
//! qualities are kept and reused by region growth.

use std::collections::BTreeMap;

use crate::cfg::IcrCfg;
use crate::error::IcrError;
use crate::graph::SurfaceGraph;
use crate::grasp::{FingerId, Grasp};
use crate::wrench::{FrictionTable, WrenchEvaluator};

#[derive(Clone, Debug, PartialEq)]
pub struct SearchZone {
    finger: FingerId,
    origin: usize,
    radius: f64,
    distances: BTreeMap<usize, f64>,
    probed: BTreeMap<usize, f64>,
    explored: usize,
}

impl SearchZone {
    #[inline]
    pub fn finger(&self) -> &FingerId {
        &self.finger
    }
    /// Contact sample the zone is centred on.
    #[inline]
    pub fn origin(&self) -> usize {
        self.origin
    }
    /// Geodesic radius (`r_f` plus tolerance, after capping).
    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }
    #[inline]
    pub fn len(&self) -> usize {
        self.distances.len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }
    #[inline]
    pub fn contains(&self, sample: usize) -> bool {
        self.distances.contains_key(&sample)
    }
    /// Geodesic distance from the contact sample (members only).
    #[inline]
    pub fn distance(&self, sample: usize) -> Option<f64> {
        self.distances.get(&sample).copied()
    }
    /// Member samples, ascending.
    pub fn samples(&self) -> Vec<usize> {
        self.distances.keys().copied().collect()
    }
    /// Samples the distance walk settled while building this zone.
    #[inline]
    pub fn explored(&self) -> usize {
        self.explored
    }
    /// Quality observed while probing, if this member was probed.
    #[inline]
    pub fn probed_quality(&self, sample: usize) -> Option<f64> {
        self.probed.get(&sample).copied()
    }
}

/// Zones of all touching fingers, in grasp order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchZones {
    zones: Vec<SearchZone>,
    ungrasped: Vec<FingerId>,
    baseline: f64,
}

impl SearchZones {
    #[inline]
    pub fn zones(&self) -> &[SearchZone] {
        &self.zones
    }
    pub fn get(&self, finger: &FingerId) -> Option<&SearchZone> {
        self.zones.iter().find(|z| &z.finger == finger)
    }
    /// Fingers excluded because they had no touching contact.
    #[inline]
    pub fn ungrasped(&self) -> &[FingerId] {
        &self.ungrasped
    }
    /// Quality of the grasp as given.
    #[inline]
    pub fn baseline(&self) -> f64 {
        self.baseline
    }
}

/// Builds search zones for one grasp on one graph.
pub struct ZoneBuilder<'a> {
    graph: &'a SurfaceGraph,
    grasp: &'a Grasp,
    friction: &'a FrictionTable,
    evaluator: WrenchEvaluator,
    cfg: IcrCfg,
}

impl<'a> ZoneBuilder<'a> {
    pub fn new(
        graph: &'a SurfaceGraph,
        grasp: &'a Grasp,
        friction: &'a FrictionTable,
        cfg: IcrCfg,
    ) -> Self {
        Self {
            graph,
            grasp,
            friction,
            evaluator: WrenchEvaluator::for_object(graph.object()),
            cfg,
        }
    }

    /// Quality of the grasp with `relocate` applied.
    pub fn quality(&self, relocate: Option<(&FingerId, usize)>) -> f64 {
        let contacts = self
            .grasp
            .contact_points(self.graph.object(), self.friction, relocate);
        self.evaluator.quality(&contacts)
    }

    /// Zones for every touching finger; released fingers are listed as
    /// ungrasped instead of failing the whole computation.
    pub fn build_all(&self) -> Result<SearchZones, IcrError> {
        let baseline = self.quality(None);
        let mut zones = Vec::new();
        let mut ungrasped = Vec::new();
        for contact in self.grasp.contacts() {
            match self.build_for(&contact.finger, baseline) {
                Ok(zone) => zones.push(zone),
                Err(IcrError::UngraspedFinger { finger }) => {
                    tracing::debug!(finger = %finger, "no touching contact; zone skipped");
                    ungrasped.push(finger);
                }
                Err(err) => return Err(err),
            }
        }
        tracing::info!(
            zones = zones.len(),
            ungrasped = ungrasped.len(),
            baseline,
            "search zones built"
        );
        Ok(SearchZones {
            zones,
            ungrasped,
            baseline,
        })
    }

    pub fn build_for(&self, finger: &FingerId, baseline: f64) -> Result<SearchZone, IcrError> {
        let origin = self
            .grasp
            .touching_sample(finger)
            .ok_or_else(|| IcrError::UngraspedFinger {
                finger: finger.clone(),
            })?;
        let limit = self.cfg.max_displacement;
        let mut walk = self.graph.geodesic_walk(origin, limit);

        let floor = self.cfg.zone_fraction * baseline;
        let mut probed = BTreeMap::new();
        let mut seen: Vec<(usize, f64)> = Vec::new();
        let mut reach: Option<f64> = None;
        let mut failed = false;
        for (sample, d) in walk.by_ref() {
            if limit.is_some_and(|r| d > r) {
                break;
            }
            seen.push((sample, d));
            let q = self.quality(Some((finger, sample)));
            probed.insert(sample, q);
            if q <= 0.0 || q < floor {
                failed = true;
                break;
            }
            reach = Some(d);
        }
        let r_f = match (failed, reach) {
            (false, _) => seen.last().map_or(0.0, |&(_, d)| d),
            (true, r) => r.unwrap_or(0.0),
        };
        let mut radius = r_f + self.cfg.zone_tolerance;
        if let Some(cap) = limit {
            radius = radius.min(cap);
        }
        for (sample, d) in walk.by_ref() {
            if d > radius {
                break;
            }
            seen.push((sample, d));
        }
        let explored = walk.settled();

        // Every predecessor on a shortest path is closer, so the members
        // induce a connected subgraph with the same distances.
        let members: Vec<usize> = seen
            .iter()
            .filter(|&&(_, d)| d <= radius)
            .map(|&(s, _)| s)
            .collect();
        let dm = self.graph.shortest_paths(&members)?;
        let distances: BTreeMap<usize, f64> = dm
            .row(origin)
            .into_iter()
            .filter(|&(_, d)| d.is_finite())
            .collect();
        probed.retain(|s, _| distances.contains_key(s));
        tracing::debug!(
            finger = %finger,
            origin,
            radius,
            samples = distances.len(),
            probed = probed.len(),
            explored,
            "search zone"
        );
        Ok(SearchZone {
            finger: finger.clone(),
            origin,
            radius,
            distances,
            probed,
            explored,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use nalgebra::vector;

    use super::*;
    use crate::graph;
    use crate::grasp::ContactReport;
    use crate::object::TargetObject;
    use crate::shapes;
    use crate::wrench::FrictionModel;

    fn square_setup() -> (SurfaceGraph, Grasp) {
        let obj = Arc::new(TargetObject::new("square", shapes::square(1.0)).unwrap());
        let g = graph::build(obj.clone(), 2.5, 0.0).unwrap();
        let grasp = Grasp::from_reports(
            &obj,
            vec![
                ContactReport::touching("thumb", vector![1.0, 0.0, 0.0]),
                ContactReport::touching("index", vector![-1.0, 0.0, 0.0]),
                ContactReport::released("ring", vector![0.0, 1.0, 0.0]),
            ],
        )
        .unwrap();
        (g, grasp)
    }

    #[test]
    fn probe_stops_at_first_open_grasp() {
        let (g, grasp) = square_setup();
        let table = FrictionTable::new(FrictionModel::default());
        let builder = ZoneBuilder::new(&g, &grasp, &table, IcrCfg::default());
        let zones = builder.build_all().unwrap();
        assert!(zones.baseline() > 0.0);
        assert_eq!(zones.zones().len(), 2);
        assert_eq!(zones.ungrasped(), &[FingerId::new("ring")]);

        // Moving the thumb to either neighbor opens the grasp, so the zone
        // collapses to the contact sample itself.
        let thumb = zones.get(&"thumb".into()).unwrap();
        assert_eq!(thumb.origin(), 0);
        assert_eq!(thumb.samples(), vec![0]);
        assert_eq!(thumb.radius(), 0.0);
        assert!(thumb.probed_quality(0).unwrap() > 0.0);
    }

    #[test]
    fn tolerance_widens_the_zone() {
        let (g, grasp) = square_setup();
        let table = FrictionTable::default();
        let cfg = IcrCfg {
            zone_tolerance: 1.5,
            ..IcrCfg::default()
        };
        let zones = ZoneBuilder::new(&g, &grasp, &table, cfg).build_all().unwrap();
        let thumb = zones.get(&"thumb".into()).unwrap();
        assert_eq!(thumb.samples(), vec![0, 1, 3]);
        assert!(thumb.distance(2).is_none());
    }

    #[test]
    fn max_displacement_caps_the_zone() {
        let (g, grasp) = square_setup();
        let table = FrictionTable::default();
        let cfg = IcrCfg {
            zone_tolerance: 10.0,
            max_displacement: Some(1.5),
            ..IcrCfg::default()
        };
        let zones = ZoneBuilder::new(&g, &grasp, &table, cfg).build_all().unwrap();
        let thumb = zones.get(&"thumb".into()).unwrap();
        assert_eq!(thumb.radius(), 1.5);
        assert!(!thumb.contains(2));
    }

    #[test]
    fn uncapped_zone_explores_only_its_neighborhood() {
        let obj = Arc::new(TargetObject::new("box", shapes::box_surface(6, 1.0)).unwrap());
        let g = graph::build(obj.clone(), 0.4, 0.0).unwrap();
        assert_eq!(g.component(0).len(), obj.len());
        let grasp = Grasp::from_reports(
            &obj,
            vec![
                ContactReport::touching("thumb", vector![1.0, 0.0, 0.0]),
                ContactReport::touching("index", vector![-1.0, 0.0, 0.0]),
            ],
        )
        .unwrap();
        let table = FrictionTable::default();
        let cfg = IcrCfg::default();
        assert!(cfg.max_displacement.is_none());
        let zones = ZoneBuilder::new(&g, &grasp, &table, cfg).build_all().unwrap();
        assert!(zones.baseline() > 0.0);
        for zone in zones.zones() {
            // Sliding onto a side face opens the grasp, so the walk never
            // leaves the contact's face neighborhood.
            assert!(zone.explored() < obj.len() / 2, "{}", zone.explored());
            assert!(zone.len() <= zone.explored());
            assert!(zone.samples().iter().all(|&s| zone.distance(s).unwrap() <= zone.radius() + 1e-12));
        }
    }

    #[test]
    fn released_finger_reports_ungrasped() {
        let (g, grasp) = square_setup();
        let table = FrictionTable::default();
        let builder = ZoneBuilder::new(&g, &grasp, &table, IcrCfg::default());
        assert!(matches!(
            builder.build_for(&"ring".into(), 1.0),
            Err(IcrError::UngraspedFinger { .. })
        ));
    }
}
