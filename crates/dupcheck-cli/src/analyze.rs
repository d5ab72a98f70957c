//! The `analyze` operation: load manifests, scan, render, write.

use chrono::Local;
use dupcheck_core::config::{DuplicatePolicy, MalformedPolicy, ReportFormat};
use dupcheck_core::loader::{BuildReportLoader, ManifestLoader};
use dupcheck_core::manifest::{LoadWarning, ManifestError, Package};
use dupcheck_core::storage;
use dupcheck_scan::report::{self, ReportError, ReportMeta};
use dupcheck_scan::scan::{self, CancelToken, ScanError, ScanOptions, ScanSummary};
use indicatif::ProgressBar;
use std::collections::HashMap;
use std::path::PathBuf;

/// Errors surfaced to the caller of [`analyze`].
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error(transparent)]
    MalformedManifest(#[from] ManifestError),
    #[error("at least two valid manifests are required, got {found}")]
    InsufficientInputs { found: usize },
    #[error("package {package} lists asset {path} more than once with different dependencies")]
    DuplicateAssetPathInPackage { package: String, path: String },
    #[error("failed to write report to {}: {source}", path.display())]
    OutputWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Render(ReportError),
    #[error("analysis cancelled")]
    Cancelled,
}

impl From<ScanError> for AnalyzeError {
    fn from(e: ScanError) -> Self {
        match e {
            ScanError::InsufficientInputs { found } => Self::InsufficientInputs { found },
            ScanError::Cancelled => Self::Cancelled,
        }
    }
}

impl From<ReportError> for AnalyzeError {
    fn from(e: ReportError) -> Self {
        match e {
            ReportError::Write { path, source } => Self::OutputWriteFailure { path, source },
            other => Self::Render(other),
        }
    }
}

/// How manifests are turned into packages.
#[derive(Debug, Clone, Copy)]
pub struct LoadPolicy {
    pub on_malformed: MalformedPolicy,
    pub on_duplicate_asset: DuplicatePolicy,
}

/// Packages loaded from a manifest list.
#[derive(Debug, Default)]
pub struct LoadedPackages {
    pub packages: Vec<Package>,
    /// Manifests dropped under [`MalformedPolicy::Skip`].
    pub skipped: Vec<PathBuf>,
}

/// Load every manifest in order, applying the malformed/duplicate policies.
pub fn load_packages(
    paths: &[PathBuf],
    loader: &dyn ManifestLoader,
    policy: LoadPolicy,
    progress: Option<&ProgressBar>,
) -> Result<LoadedPackages, AnalyzeError> {
    let mut loaded = LoadedPackages::default();
    let mut seen_ids: HashMap<String, PathBuf> = HashMap::new();

    for path in paths {
        if let Some(pb) = progress {
            pb.set_message(format!("Loading {}", path.display()));
            pb.tick();
        }

        let manifest = match storage::load_file(path, loader) {
            Ok(m) => m,
            Err(e) => match policy.on_malformed {
                MalformedPolicy::Abort => return Err(e.into()),
                MalformedPolicy::Skip => {
                    tracing::warn!("skipping manifest: {}", e);
                    loaded.skipped.push(path.clone());
                    continue;
                }
            },
        };

        for warning in &manifest.warnings {
            if let (
                DuplicatePolicy::Error,
                LoadWarning::DuplicateAssetPath {
                    package,
                    path: asset,
                    dependencies_differ: true,
                },
            ) = (policy.on_duplicate_asset, warning)
            {
                return Err(AnalyzeError::DuplicateAssetPathInPackage {
                    package: package.clone(),
                    path: asset.clone(),
                });
            }
            tracing::warn!("{}: {}", path.display(), warning);
        }

        let id = manifest.package.id().to_string();
        if let Some(first) = seen_ids.get(&id) {
            tracing::warn!(
                "package {} appears in both {} and {}; they are treated as one package",
                id,
                first.display(),
                path.display()
            );
        } else {
            seen_ids.insert(id, path.clone());
        }

        tracing::debug!(
            "loaded {} from {} ({} assets)",
            manifest.package.id(),
            path.display(),
            manifest.package.len()
        );
        loaded.packages.push(manifest.package);
    }

    Ok(loaded)
}

/// Inputs of one analysis run.
#[derive(Debug, Clone)]
pub struct AnalyzeRequest {
    pub manifest_paths: Vec<PathBuf>,
    pub output_path: PathBuf,
    pub policy: LoadPolicy,
    pub format: ReportFormat,
    pub title: String,
    pub parallel: bool,
    pub cancel: Option<CancelToken>,
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct AnalyzeOutcome {
    pub finding_count: usize,
    pub manifests_used: usize,
    pub skipped: Vec<PathBuf>,
    pub summary: ScanSummary,
}

/// Run the full analysis and write the report to `request.output_path`.
///
/// Nothing is written when loading or scanning fails.
pub fn analyze(request: &AnalyzeRequest) -> Result<AnalyzeOutcome, AnalyzeError> {
    analyze_with_progress(request, None)
}

pub fn analyze_with_progress(
    request: &AnalyzeRequest,
    progress: Option<&ProgressBar>,
) -> Result<AnalyzeOutcome, AnalyzeError> {
    if request.manifest_paths.len() < 2 {
        return Err(AnalyzeError::InsufficientInputs {
            found: request.manifest_paths.len(),
        });
    }

    let loaded = load_packages(
        &request.manifest_paths,
        &BuildReportLoader,
        request.policy,
        progress,
    )?;

    let options = ScanOptions {
        parallel: request.parallel,
    };
    let findings = scan::scan_with(&loaded.packages, &options, request.cancel.as_ref())?;

    let meta = ReportMeta {
        title: request.title.clone(),
        generated_at: Local::now(),
        manifest_count: loaded.packages.len(),
    };
    let rendered = report::render(&findings, &meta, request.format)?;
    report::write_report(&request.output_path, &rendered)?;

    let summary = scan::summarize(&findings);
    tracing::info!(
        "duplicate check complete: {} duplicate(s) across {} package(s), written to {}",
        findings.len(),
        loaded.packages.len(),
        request.output_path.display()
    );

    Ok(AnalyzeOutcome {
        finding_count: findings.len(),
        manifests_used: loaded.packages.len(),
        skipped: loaded.skipped,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_error_mapping() {
        assert!(matches!(
            AnalyzeError::from(ScanError::InsufficientInputs { found: 1 }),
            AnalyzeError::InsufficientInputs { found: 1 }
        ));
        assert!(matches!(
            AnalyzeError::from(ScanError::Cancelled),
            AnalyzeError::Cancelled
        ));
    }

    #[test]
    fn test_report_write_error_maps_to_output_failure() {
        let err = ReportError::Write {
            path: PathBuf::from("/x/out.txt"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let mapped = AnalyzeError::from(err);
        assert!(matches!(mapped, AnalyzeError::OutputWriteFailure { .. }));
        assert!(mapped.to_string().contains("/x/out.txt"));
    }

    #[test]
    fn test_requires_two_manifest_paths() {
        let request = AnalyzeRequest {
            manifest_paths: vec![PathBuf::from("only.report")],
            output_path: PathBuf::from("unused.txt"),
            policy: LoadPolicy {
                on_malformed: MalformedPolicy::Abort,
                on_duplicate_asset: DuplicatePolicy::Warn,
            },
            format: ReportFormat::Text,
            title: "t".to_string(),
            parallel: false,
            cancel: None,
        };
        assert!(matches!(
            analyze(&request),
            Err(AnalyzeError::InsufficientInputs { found: 1 })
        ));
    }
}
