//! Region records on disk: `<dir>/<object>/<grasp_key>.json`.
//!
//! One JSON document per object + grasp identity holding the ordered
//! `(finger, samples)` records. Path components are sanitized to
//! `[A-Za-z0-9._-]`; everything else becomes `_`.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::grasp::FingerId;
use crate::region::RegionSet;

#[derive(Debug)]
pub enum StoreError {
    Io { path: PathBuf, source: io::Error },
    Format { path: PathBuf, source: serde_json::Error },
    /// A loaded record refers to a sample the current object does not have.
    UnknownSample { finger: FingerId, sample: usize },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io { path, source } => write!(f, "{}: {source}", path.display()),
            StoreError::Format { path, source } => {
                write!(f, "{}: malformed region record: {source}", path.display())
            }
            StoreError::UnknownSample { finger, sample } => {
                write!(f, "finger {finger} refers to unknown sample {sample}")
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io { source, .. } => Some(source),
            StoreError::Format { source, .. } => Some(source),
            StoreError::UnknownSample { .. } => None,
        }
    }
}

/// Replace characters that are unsafe in a path component.
pub fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "_".to_string()
    } else {
        cleaned
    }
}

pub fn record_path(dir: &Path, object: &str, grasp_key: &str) -> PathBuf {
    dir.join(sanitize(object))
        .join(format!("{}.json", sanitize(grasp_key)))
}

/// Write `set` under `dir`; returns the record path.
pub fn save_region_set(dir: &Path, set: &RegionSet) -> Result<PathBuf, StoreError> {
    let path = record_path(dir, &set.object, &set.grasp_key);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StoreError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let body = serde_json::to_vec_pretty(set).map_err(|source| StoreError::Format {
        path: path.clone(),
        source,
    })?;
    fs::write(&path, body).map_err(|source| StoreError::Io {
        path: path.clone(),
        source,
    })?;
    tracing::info!(path = %path.display(), regions = set.regions.len(), "regions saved");
    Ok(path)
}

pub fn load_region_set(path: &Path) -> Result<RegionSet, StoreError> {
    let bytes = fs::read(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| StoreError::Format {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::ContactRegion;
    use tempfile::tempdir;

    fn sample_set() -> RegionSet {
        RegionSet {
            object: "mug/v2".into(),
            grasp_key: "thumb@3+index@17".into(),
            regions: vec![
                ContactRegion {
                    finger: "thumb".into(),
                    samples: vec![3, 4, 2, 9],
                },
                ContactRegion {
                    finger: "index".into(),
                    samples: vec![17],
                },
                ContactRegion {
                    finger: "ring".into(),
                    samples: Vec::new(),
                },
            ],
        }
    }

    #[test]
    fn sanitize_keeps_safe_characters() {
        assert_eq!(sanitize("thumb@3+index@-"), "thumb_3_index_-");
        assert_eq!(sanitize("mug/v2"), "mug_v2");
        assert_eq!(sanitize(".."), "_");
        assert_eq!(sanitize(""), "_");
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let set = sample_set();
        let path = save_region_set(dir.path(), &set).unwrap();
        assert_eq!(path, dir.path().join("mug_v2").join("thumb_3_index_17.json"));
        let loaded = load_region_set(&path).unwrap();
        assert_eq!(loaded, set);
    }

    #[test]
    fn missing_and_malformed_files_are_reported() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(
            load_region_set(&missing),
            Err(StoreError::Io { .. })
        ));
        let bad = dir.path().join("bad.json");
        fs::write(&bad, b"{\"object\": 3}").unwrap();
        assert!(matches!(
            load_region_set(&bad),
            Err(StoreError::Format { .. })
        ));
    }
}
