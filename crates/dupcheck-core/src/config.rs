//! Configuration for manifest loading, scanning and report output.
//!
//! Load order: `.dupcheck/config.toml` → defaults. Command-line flags are
//! applied on top by the CLI.

use crate::storage::DEFAULT_MANIFEST_PATTERN;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level dupcheck configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DupcheckConfig {
    pub manifest: ManifestConfig,
    pub scan: ScanConfig,
    pub report: ReportConfig,
    pub classify: ClassifyConfig,
}

/// What to do with a manifest that cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Fail the whole run.
    Abort,
    /// Log a warning and continue without that manifest.
    Skip,
}

/// What to do when a manifest lists the same asset path twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Keep the last record and log a warning.
    Warn,
    /// Fail the run.
    Error,
}

/// Output format of the persisted report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Text,
    Json,
}

/// Manifest discovery and loading configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// Glob matched against paths relative to a `--dir` argument.
    pub pattern: String,
    pub on_malformed: MalformedPolicy,
    pub on_duplicate_asset: DuplicatePolicy,
}

/// Scanner configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Scan source packages on the rayon pool. Output order is unchanged.
    pub parallel: bool,
}

/// Report output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub format: ReportFormat,
    pub title: String,
    /// Default output path, relative to the project root.
    pub output: PathBuf,
}

/// Folder classification rules for `dupcheck classify`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyConfig {
    /// Absolute directory that `Assets/` maps to; lets rules use absolute folders.
    pub assets_root: Option<String>,
    /// Evaluated in order, first match wins.
    pub rules: Vec<FolderRuleConfig>,
}

/// One folder rule as written in `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FolderRuleConfig {
    pub folder: String,
    pub join_check: bool,
    pub include_children: bool,
    pub hidden: bool,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_MANIFEST_PATTERN.to_string(),
            on_malformed: MalformedPolicy::Abort,
            on_duplicate_asset: DuplicatePolicy::Warn,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::Text,
            title: "Asset Duplicate Report".to_string(),
            output: PathBuf::from("duplicate_assets.txt"),
        }
    }
}

impl DupcheckConfig {
    /// Load config from `.dupcheck/config.toml` in the project root.
    /// Falls back to defaults if no config file exists.
    pub fn load(project_root: &Path) -> Result<Self> {
        let config_path = project_root.join(".dupcheck").join("config.toml");

        let config: Self = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if let Err(e) = globset::Glob::new(&self.manifest.pattern) {
            anyhow::bail!("invalid manifest.pattern ({}): {}", self.manifest.pattern, e);
        }
        if self.report.title.trim().is_empty() {
            anyhow::bail!("report.title must not be empty");
        }
        if let Some(i) = self.classify.rules.iter().position(|r| r.folder.is_empty()) {
            anyhow::bail!("classify.rules[{}].folder must not be empty", i);
        }
        Ok(())
    }
}
