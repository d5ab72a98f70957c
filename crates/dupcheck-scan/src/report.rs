//! Render scan findings as a plain-text or JSON report and persist it.
//!
//! The report is a direct rendering of the scanner output: one line per
//! finding in scanner order, then the total. Nothing is filtered or merged.

use crate::scan::{Finding, ScanSummary, summarize};
use chrono::{DateTime, Local};
use dupcheck_core::config::ReportFormat;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Run metadata printed in the report header.
#[derive(Debug, Clone)]
pub struct ReportMeta {
    pub title: String,
    pub generated_at: DateTime<Local>,
    /// Number of manifests the packages were loaded from.
    pub manifest_count: usize,
}

/// Errors from rendering or writing a report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to render report: {0}")]
    Render(#[from] serde_json::Error),
    #[error("failed to write report to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One report line for a finding.
pub fn format_finding(f: &Finding) -> String {
    format!(
        "{}: {} depends on {}, also found in {}",
        f.source_package, f.source_asset, f.dependency_path, f.found_in_package
    )
}

/// Render the plain-text report.
pub fn render_text(findings: &[Finding], meta: &ReportMeta) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", meta.title));
    out.push_str(&format!(
        "GeneratedAt: {}\n",
        meta.generated_at.format(TIMESTAMP_FORMAT)
    ));
    out.push_str(&format!("ReportsUsed: {}\n", meta.manifest_count));
    out.push('\n');

    for f in findings {
        out.push_str(&format_finding(f));
        out.push('\n');
    }

    if !findings.is_empty() {
        out.push('\n');
    }
    out.push_str(&format!("Total duplicates: {}\n", findings.len()));
    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    title: &'a str,
    generated_at: String,
    manifest_count: usize,
    total: usize,
    findings: &'a [Finding],
    summary: ScanSummary,
}

/// Render the JSON report (pretty-printed).
pub fn render_json(findings: &[Finding], meta: &ReportMeta) -> Result<String, ReportError> {
    let report = JsonReport {
        title: &meta.title,
        generated_at: meta.generated_at.to_rfc3339(),
        manifest_count: meta.manifest_count,
        total: findings.len(),
        findings,
        summary: summarize(findings),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Render in the requested format.
pub fn render(
    findings: &[Finding],
    meta: &ReportMeta,
    format: ReportFormat,
) -> Result<String, ReportError> {
    match format {
        ReportFormat::Text => Ok(render_text(findings, meta)),
        ReportFormat::Json => render_json(findings, meta),
    }
}

/// Write a rendered report, creating the parent directory if it is missing.
pub fn write_report(path: &Path, contents: &str) -> Result<(), ReportError> {
    let write_err = |source: std::io::Error| ReportError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir).map_err(write_err)?;
    }
    fs::write(path, contents).map_err(write_err)
}
