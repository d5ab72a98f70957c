//! Collect the manifest list from explicit paths and `--dir` discovery.

use anyhow::Result;
use dupcheck_core::storage;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Explicit manifests first (in the given order), then manifests discovered
/// under `dir`. A path listed twice is used once, at its first position.
pub fn collect_manifests(
    explicit: &[PathBuf],
    dir: Option<&Path>,
    pattern: &str,
) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = explicit.to_vec();
    if let Some(dir) = dir {
        paths.extend(storage::discover_manifests(dir, pattern)?);
    }

    let mut seen = HashSet::new();
    paths.retain(|p| seen.insert(p.clone()));
    Ok(paths)
}
