//! In-memory model of one package's build manifest.
//!
//! A [`Package`] owns an ordered list of [`AssetRecord`]s. Asset paths are the
//! identity key and are unique within a package; the constructors enforce this.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Errors raised while turning serialized manifest data into a [`Package`].
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("malformed manifest {source_name}: {reason}")]
    Malformed { source_name: String, reason: String },
}

impl ManifestError {
    pub fn malformed(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Replace the source name, used once the file a manifest came from is known.
    #[must_use]
    pub fn with_source_name(self, name: impl Into<String>) -> Self {
        match self {
            Self::Malformed { reason, .. } => Self::Malformed {
                source_name: name.into(),
                reason,
            },
        }
    }
}

/// Non-fatal problems found while building a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// The same asset path was listed more than once; the last record won.
    DuplicateAssetPath {
        package: String,
        path: String,
        /// Whether the replaced record declared different dependencies.
        dependencies_differ: bool,
    },
    /// An asset record without a path was dropped.
    EmptyAssetPath { package: String },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateAssetPath {
                package,
                path,
                dependencies_differ,
            } => {
                write!(f, "package {} lists asset {} more than once", package, path)?;
                if *dependencies_differ {
                    write!(f, " with different dependencies")?;
                }
                write!(f, "; keeping the last record")
            }
            Self::EmptyAssetPath { package } => {
                write!(f, "package {} has an asset record with an empty path", package)
            }
        }
    }
}

/// One asset inside a package together with the asset paths it depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub path: String,
    /// Dependency paths in manifest order. May contain repeats.
    #[serde(default)]
    pub dependency_paths: Vec<String>,
}

impl AssetRecord {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            dependency_paths: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependency_paths = deps.into_iter().map(Into::into).collect();
        self
    }
}

/// One independently built package: its identifier and the assets it contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Package {
    id: String,
    assets: Vec<AssetRecord>,
}

impl Package {
    /// Build a package from records that are already known to have unique,
    /// non-empty paths. Fails only when `id` is empty.
    pub fn new(id: impl Into<String>, assets: Vec<AssetRecord>) -> Result<Self, ManifestError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ManifestError::malformed(
                "<package>",
                "package identifier is empty",
            ));
        }
        Ok(Self { id, assets })
    }

    /// Build a package from raw manifest records.
    ///
    /// Records with an empty path are dropped. A repeated path replaces the
    /// earlier record at its first position; dependency lists are never
    /// merged. Both cases are returned as warnings.
    pub fn from_records(
        id: impl Into<String>,
        records: Vec<AssetRecord>,
    ) -> Result<(Self, Vec<LoadWarning>), ManifestError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ManifestError::malformed(
                "<package>",
                "package identifier is empty",
            ));
        }

        let mut warnings = Vec::new();
        let mut assets: Vec<AssetRecord> = Vec::with_capacity(records.len());
        let mut positions: HashMap<String, usize> = HashMap::with_capacity(records.len());

        for record in records {
            if record.path.is_empty() {
                warnings.push(LoadWarning::EmptyAssetPath {
                    package: id.clone(),
                });
                continue;
            }
            if let Some(&pos) = positions.get(&record.path) {
                warnings.push(LoadWarning::DuplicateAssetPath {
                    package: id.clone(),
                    path: record.path.clone(),
                    dependencies_differ: assets[pos].dependency_paths != record.dependency_paths,
                });
                assets[pos] = record;
            } else {
                positions.insert(record.path.clone(), assets.len());
                assets.push(record);
            }
        }

        Ok((Self { id, assets }, warnings))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Asset records in stored order.
    pub fn assets(&self) -> &[AssetRecord] {
        &self.assets
    }

    pub fn asset(&self, path: &str) -> Option<&AssetRecord> {
        self.assets.iter().find(|a| a.path == path)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Total number of declared dependency edges across all assets.
    pub fn dependency_edge_count(&self) -> usize {
        self.assets.iter().map(|a| a.dependency_paths.len()).sum()
    }
}
