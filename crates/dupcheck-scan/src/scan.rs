//! Cross-package duplication scanning.
//!
//! For every asset of every package, each declared dependency is looked up in
//! the index of every *other* package. A hit means the dependency will be built
//! into the source package although another package already ships it.
//!
//! Output order follows the iteration order exactly:
//! source package → asset → dependency → candidate package.

use crate::index::PackageIndex;
use dupcheck_core::manifest::Package;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// One dependency path that is also a member of another package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Finding {
    /// Package whose asset declares the dependency.
    pub source_package: String,
    pub source_asset: String,
    pub dependency_path: String,
    /// Other package that also contains `dependency_path`.
    pub found_in_package: String,
}

/// Errors from [`scan`] and [`scan_with`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    #[error("at least two packages are required to detect duplication, got {found}")]
    InsufficientInputs { found: usize },
    #[error("scan cancelled")]
    Cancelled,
}

/// Scanner options.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    /// Scan source packages on the rayon pool. Results are identical to a
    /// sequential scan.
    pub parallel: bool,
}

/// Cooperative cancellation flag, checked once per source package.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Scan `packages` sequentially without cancellation.
pub fn scan(packages: &[Package]) -> Result<Vec<Finding>, ScanError> {
    scan_with(packages, &ScanOptions::default(), None)
}

/// Scan `packages` for dependencies that are members of another package.
pub fn scan_with(
    packages: &[Package],
    options: &ScanOptions,
    cancel: Option<&CancelToken>,
) -> Result<Vec<Finding>, ScanError> {
    if packages.len() < 2 {
        return Err(ScanError::InsufficientInputs {
            found: packages.len(),
        });
    }

    let indices: Vec<PackageIndex<'_>> = packages.iter().map(PackageIndex::build).collect();

    let scan_one = |source: &Package| -> Result<Vec<Finding>, ScanError> {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(ScanError::Cancelled);
        }
        let found = scan_package(source, &indices);
        tracing::debug!(
            "package {}: {} asset(s), {} finding(s)",
            source.id(),
            source.len(),
            found.len()
        );
        Ok(found)
    };

    // Partition by source package and concatenate in input order.
    let partitions: Vec<Vec<Finding>> = if options.parallel {
        use rayon::prelude::*;
        packages.par_iter().map(scan_one).collect::<Result<_, _>>()?
    } else {
        packages.iter().map(scan_one).collect::<Result<_, _>>()?
    };

    let mut findings: Vec<Finding> = partitions.into_iter().flatten().collect();

    // Same-id source packages are one identity: keep each tuple once, at its
    // first position.
    let mut ids = HashSet::with_capacity(packages.len());
    if !packages.iter().all(|p| ids.insert(p.id())) {
        let mut emitted = HashSet::with_capacity(findings.len());
        findings.retain(|f| emitted.insert(f.clone()));
    }

    Ok(findings)
}

/// Findings for one source package against every other package's index.
fn scan_package(source: &Package, indices: &[PackageIndex<'_>]) -> Vec<Finding> {
    let mut findings = Vec::new();

    for asset in source.assets() {
        // Repeated dependency entries are reported once, at first occurrence.
        let mut seen: HashSet<&str> = HashSet::with_capacity(asset.dependency_paths.len());

        for dep in &asset.dependency_paths {
            if !seen.insert(dep.as_str()) {
                continue;
            }
            // Candidate ids already reported for this dependency.
            let mut found_in: HashSet<&str> = HashSet::new();
            for other in indices {
                // Identity is the package id: same-id packages never match each other.
                if other.package_id() == source.id() {
                    continue;
                }
                if other.contains(dep) && found_in.insert(other.package_id()) {
                    findings.push(Finding {
                        source_package: source.id().to_string(),
                        source_asset: asset.path.clone(),
                        dependency_path: dep.clone(),
                        found_in_package: other.package_id().to_string(),
                    });
                }
            }
        }
    }

    findings
}

/// Aggregate counts over a finding list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub total: usize,
    /// Distinct dependency paths that were reported at least once.
    pub distinct_paths: usize,
    /// Count per `source_package -> found_in_package` pair.
    pub by_package_pair: BTreeMap<String, usize>,
}

/// Summarize findings for logging and the JSON report.
pub fn summarize(findings: &[Finding]) -> ScanSummary {
    let mut by_package_pair: BTreeMap<String, usize> = BTreeMap::new();
    let mut paths: HashSet<&str> = HashSet::new();

    for f in findings {
        *by_package_pair
            .entry(format!("{} -> {}", f.source_package, f.found_in_package))
            .or_insert(0) += 1;
        paths.insert(f.dependency_path.as_str());
    }

    ScanSummary {
        total: findings.len(),
        distinct_paths: paths.len(),
        by_package_pair,
    }
}
