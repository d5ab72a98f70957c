//! Read manifests from disk and discover them under a directory.

use crate::loader::{LoadedManifest, ManifestLoader};
use crate::manifest::ManifestError;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Default glob used when discovering manifests in a directory.
pub const DEFAULT_MANIFEST_PATTERN: &str = "**/*.report";

/// Load one manifest file with the given loader.
///
/// Read failures are reported as malformed manifests for that file, so callers
/// apply one skip/abort policy to every per-file problem.
pub fn load_file(path: &Path, loader: &dyn ManifestLoader) -> Result<LoadedManifest, ManifestError> {
    let name = path.display().to_string();
    let text = fs::read_to_string(path)
        .map_err(|e| ManifestError::malformed(name.clone(), format!("failed to read: {e}")))?;
    loader.load(&text).map_err(|e| e.with_source_name(name))
}

/// Find manifest files under `dir` whose relative path matches `pattern`.
///
/// Hidden files and gitignored paths are skipped. The result is sorted so runs
/// over the same directory see packages in the same order.
pub fn discover_manifests(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("manifest directory {} does not exist", dir.display());
    }

    let matcher = globset::Glob::new(pattern)
        .with_context(|| format!("invalid manifest pattern: {}", pattern))?
        .compile_matcher();

    let walker = ignore::WalkBuilder::new(dir)
        .hidden(true)
        .git_ignore(true)
        .build();

    let mut found = Vec::new();
    for entry in walker.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let rel = path.strip_prefix(dir).unwrap_or(path);
        if matcher.is_match(rel) {
            found.push(path.to_path_buf());
        }
    }
    found.sort();

    tracing::debug!("discovered {} manifest(s) under {}", found.len(), dir.display());
    Ok(found)
}
