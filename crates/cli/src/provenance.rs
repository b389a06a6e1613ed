//! Provenance sidecars for saved region records.
//!
//! `<record>.provenance.json` sits next to each record and names the code
//! revision, the engine version, the call site, the parameters and the input
//! files that produced it.

use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::ffi::OsString;
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Parameters and inputs recorded in a sidecar.
pub struct Payload {
    pub params: Value,
    pub inputs: Vec<String>,
}

impl Payload {
    pub fn new(params: Value) -> Self {
        Self {
            params,
            inputs: Vec::new(),
        }
    }

    pub fn with_input(mut self, path: &Path) -> Self {
        self.inputs.push(path.to_string_lossy().into_owned());
        self
    }
}

#[track_caller]
pub fn write_sidecar<P: AsRef<Path>>(record: P, payload: Payload) -> Result<PathBuf> {
    let record = record.as_ref();
    let sidecar = sidecar_path(record);
    if let Some(parent) = sidecar.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating provenance dir {}", parent.display()))?;
        }
    }
    let callsite = Location::caller();
    let doc = json!({
        "code_rev": current_git_rev(),
        "engine_version": icr::VERSION,
        "callsite": { "file": callsite.file(), "line": callsite.line() },
        "params": payload.params,
        "inputs": payload.inputs,
        "outputs": [record.to_string_lossy()],
    });
    fs::write(&sidecar, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", sidecar.display()))?;
    tracing::debug!(path = %sidecar.display(), "provenance written");
    Ok(sidecar)
}

fn sidecar_path(record: &Path) -> PathBuf {
    let mut name = record
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("record"));
    name.push(".provenance.json");
    record.with_file_name(name)
}

/// `GIT_COMMIT` (build time, then run time), else `git rev-parse HEAD`, else "unknown".
pub fn current_git_rev() -> String {
    if let Some(rev) = option_env!("GIT_COMMIT").filter(|s| !s.is_empty()) {
        return rev.to_string();
    }
    if let Ok(rev) = std::env::var("GIT_COMMIT") {
        if !rev.is_empty() {
            return rev;
        }
    }
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
