//! Parsing of serialized build reports into [`Package`]s.
//!
//! The wire format belongs to the upstream build pipeline. [`BuildReportLoader`]
//! understands the JSON `BuildReport` it writes next to every package build;
//! other formats plug in through [`ManifestLoader`].

use crate::manifest::{AssetRecord, LoadWarning, ManifestError, Package};
use serde::Deserialize;

/// A package parsed from one manifest, plus anything worth warning about.
#[derive(Debug, Clone)]
pub struct LoadedManifest {
    pub package: Package,
    pub warnings: Vec<LoadWarning>,
}

/// Turns serialized manifest text into a [`Package`].
pub trait ManifestLoader: Send + Sync {
    fn load(&self, text: &str) -> Result<LoadedManifest, ManifestError>;

    /// Short format name (for logging).
    fn name(&self) -> &str;
}

/// Loader for the build pipeline's `BuildReport` JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuildReportLoader;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawBuildReport {
    summary: Option<RawSummary>,
    #[serde(default)]
    asset_infos: Option<Vec<RawAssetInfo>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawSummary {
    #[serde(default)]
    build_package_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawAssetInfo {
    #[serde(default)]
    asset_path: Option<String>,
    #[serde(default)]
    depend_assets: Option<Vec<RawDependAsset>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawDependAsset {
    #[serde(default)]
    asset_path: Option<String>,
}

impl ManifestLoader for BuildReportLoader {
    fn load(&self, text: &str) -> Result<LoadedManifest, ManifestError> {
        let raw: RawBuildReport = serde_json::from_str(text)
            .map_err(|e| ManifestError::malformed("<input>", format!("invalid build report: {e}")))?;

        let package_name = raw
            .summary
            .and_then(|s| s.build_package_name)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                ManifestError::malformed("<input>", "Summary.BuildPackageName is missing or empty")
            })?;

        let records: Vec<AssetRecord> = raw
            .asset_infos
            .unwrap_or_default()
            .into_iter()
            .map(|info| AssetRecord {
                path: info.asset_path.unwrap_or_default(),
                dependency_paths: info
                    .depend_assets
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|d| d.asset_path)
                    .filter(|p| !p.is_empty())
                    .collect(),
            })
            .collect();

        let (package, warnings) = Package::from_records(package_name, records)?;
        Ok(LoadedManifest { package, warnings })
    }

    fn name(&self) -> &str {
        "build-report"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UI_REPORT: &str = r#"{
        "Summary": { "BuildPackageName": "UI", "BuildPackageVersion": "2026-10-19-1200" },
        "AssetInfos": [
            {
                "AssetPath": "Assets/UI/btn.png",
                "AssetGUID": "abc",
                "DependAssets": [
                    { "AssetPath": "Assets/Shared/icon.png", "AssetGUID": "def" },
                    { "AssetPath": "" }
                ]
            },
            { "AssetPath": "Assets/UI/panel.prefab" }
        ],
        "BundleInfos": []
    }"#;

    #[test]
    fn test_load_build_report() {
        let loaded = BuildReportLoader.load(UI_REPORT).unwrap();
        assert!(loaded.warnings.is_empty());

        let pkg = loaded.package;
        assert_eq!(pkg.id(), "UI");
        assert_eq!(pkg.len(), 2);
        assert_eq!(
            pkg.assets()[0].dependency_paths,
            vec!["Assets/Shared/icon.png".to_string()]
        );
        assert!(pkg.assets()[1].dependency_paths.is_empty());
    }

    #[test]
    fn test_load_without_asset_infos_is_empty_package() {
        let loaded = BuildReportLoader
            .load(r#"{"Summary": {"BuildPackageName": "Core"}}"#)
            .unwrap();
        assert_eq!(loaded.package.id(), "Core");
        assert!(loaded.package.is_empty());
    }

    #[test]
    fn test_load_rejects_missing_package_name() {
        let err = BuildReportLoader
            .load(r#"{"Summary": {}, "AssetInfos": []}"#)
            .unwrap_err();
        assert!(err.to_string().contains("BuildPackageName"));
    }

    #[test]
    fn test_load_rejects_invalid_json() {
        let err = BuildReportLoader.load("not json").unwrap_err();
        assert!(matches!(err, ManifestError::Malformed { .. }));
    }

    #[test]
    fn test_load_rejects_wrong_shape() {
        let err = BuildReportLoader
            .load(r#"{"Summary": {"BuildPackageName": "UI"}, "AssetInfos": 3}"#)
            .unwrap_err();
        assert!(err.to_string().contains("invalid build report"));
    }

    #[test]
    fn test_load_reports_duplicate_asset_paths() {
        let text = r#"{
            "Summary": {"BuildPackageName": "UI"},
            "AssetInfos": [
                {"AssetPath": "a.png", "DependAssets": [{"AssetPath": "x.mat"}]},
                {"AssetPath": "a.png", "DependAssets": [{"AssetPath": "y.mat"}]}
            ]
        }"#;
        let loaded = BuildReportLoader.load(text).unwrap();
        assert_eq!(loaded.package.len(), 1);
        assert_eq!(loaded.warnings.len(), 1);
        assert_eq!(
            loaded.package.assets()[0].dependency_paths,
            vec!["y.mat".to_string()]
        );
    }
}
