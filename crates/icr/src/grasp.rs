//! Grasp: ordered per-finger contacts resolved against the object surface.

use std::collections::BTreeSet;
use std::fmt;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::IcrError;
use crate::object::TargetObject;
use crate::wrench::{ContactPoint, FrictionTable};

/// Finger (phalange) identifier, e.g. `"thumb_distal"`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FingerId(pub String);

impl FingerId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FingerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FingerId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Contact as reported by the hand, before surface association.
#[derive(Clone, Debug, PartialEq)]
pub struct ContactReport {
    pub finger: FingerId,
    pub position: Vector3<f64>,
    pub touching: bool,
}

impl ContactReport {
    pub fn touching(finger: impl Into<String>, position: Vector3<f64>) -> Self {
        Self {
            finger: FingerId::new(finger),
            position,
            touching: true,
        }
    }
    pub fn released(finger: impl Into<String>, position: Vector3<f64>) -> Self {
        Self {
            finger: FingerId::new(finger),
            position,
            touching: false,
        }
    }
}

/// A contact with its associated surface sample (touching contacts only).
#[derive(Clone, Debug, PartialEq)]
pub struct Contact {
    pub finger: FingerId,
    pub position: Vector3<f64>,
    pub touching: bool,
    pub sample: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Grasp {
    contacts: Vec<Contact>,
}

impl Grasp {
    /// Resolve reports against `object` via nearest-sample lookup.
    ///
    /// Fails on duplicate fingers or non-finite positions.
    pub fn from_reports(
        object: &TargetObject,
        reports: Vec<ContactReport>,
    ) -> Result<Self, IcrError> {
        let mut seen = BTreeSet::new();
        let mut contacts = Vec::with_capacity(reports.len());
        for report in reports {
            if !seen.insert(report.finger.clone()) {
                return Err(IcrError::invalid(format!(
                    "finger {} appears twice in the grasp",
                    report.finger
                )));
            }
            if !report.position.iter().all(|x| x.is_finite()) {
                return Err(IcrError::invalid(format!(
                    "contact of finger {} has non-finite coordinates",
                    report.finger
                )));
            }
            let sample = report.touching.then(|| object.nearest(&report.position));
            contacts.push(Contact {
                finger: report.finger,
                position: report.position,
                touching: report.touching,
                sample,
            });
        }
        Ok(Self { contacts })
    }

    #[inline]
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn contact(&self, finger: &FingerId) -> Option<&Contact> {
        self.contacts.iter().find(|c| &c.finger == finger)
    }

    /// Surface sample of a touching finger.
    pub fn touching_sample(&self, finger: &FingerId) -> Option<usize> {
        self.contact(finger)
            .filter(|c| c.touching)
            .and_then(|c| c.sample)
    }

    pub fn touching_count(&self) -> usize {
        self.contacts
            .iter()
            .filter(|c| c.touching && c.sample.is_some())
            .count()
    }

    /// Identity used for region records: `finger@sample` per contact.
    pub fn key(&self) -> String {
        if self.contacts.is_empty() {
            return "empty".to_string();
        }
        self.contacts
            .iter()
            .map(|c| match (c.touching, c.sample) {
                (true, Some(s)) => format!("{}@{}", c.finger, s),
                _ => format!("{}@-", c.finger),
            })
            .collect::<Vec<_>>()
            .join("+")
    }

    /// Touching contacts as wrench-model inputs.
    ///
    /// `relocate = Some((finger, sample))` moves that finger onto `sample`
    /// while every other contact stays where it is.
    pub fn contact_points(
        &self,
        object: &TargetObject,
        friction: &FrictionTable,
        relocate: Option<(&FingerId, usize)>,
    ) -> Vec<ContactPoint> {
        let mut out = Vec::with_capacity(self.contacts.len());
        for c in &self.contacts {
            if !c.touching {
                continue;
            }
            let sample = match relocate {
                Some((finger, s)) if finger == &c.finger => Some(s),
                _ => c.sample,
            };
            let Some(sample) = sample.and_then(|s| object.sample(s)) else {
                continue;
            };
            out.push(ContactPoint {
                position: sample.position,
                normal: sample.normal,
                friction: friction.get(&c.finger),
            });
        }
        out
    }
}
