//! Reverse dependency lookup: which assets depend on a given asset path.

use dupcheck_core::manifest::Package;
use serde::Serialize;
use std::collections::BTreeSet;

/// An asset that declares a dependency on the looked-up path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Dependent {
    pub package: String,
    pub asset: String,
}

/// List every `(package, asset)` whose dependencies include `target`.
///
/// The target asset itself is never listed. Results are sorted by package then
/// asset path and contain no repeats.
pub fn dependents(packages: &[Package], target: &str) -> Vec<Dependent> {
    let mut found: BTreeSet<Dependent> = BTreeSet::new();

    for package in packages {
        for asset in package.assets() {
            if asset.path == target {
                continue;
            }
            if asset.dependency_paths.iter().any(|d| d == target) {
                found.insert(Dependent {
                    package: package.id().to_string(),
                    asset: asset.path.clone(),
                });
            }
        }
    }

    found.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dupcheck_core::manifest::AssetRecord;

    fn packages() -> Vec<Package> {
        vec![
            Package::new(
                "UI",
                vec![
                    AssetRecord::new("ui/z.prefab").with_dependencies(["shared/icon.png"]),
                    AssetRecord::new("ui/a.prefab")
                        .with_dependencies(["shared/icon.png", "shared/icon.png"]),
                    AssetRecord::new("ui/b.prefab").with_dependencies(["shared/font.ttf"]),
                ],
            )
            .unwrap(),
            Package::new(
                "Core",
                vec![AssetRecord::new("shared/icon.png").with_dependencies(["shared/icon.png"])],
            )
            .unwrap(),
            Package::new(
                "Battle",
                vec![AssetRecord::new("fx/hit.prefab").with_dependencies(["shared/icon.png"])],
            )
            .unwrap(),
        ]
    }

    #[test]
    fn test_dependents_sorted_and_unique() {
        let found = dependents(&packages(), "shared/icon.png");
        let pairs: Vec<(&str, &str)> = found
            .iter()
            .map(|d| (d.package.as_str(), d.asset.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("Battle", "fx/hit.prefab"),
                ("UI", "ui/a.prefab"),
                ("UI", "ui/z.prefab"),
            ]
        );
    }

    #[test]
    fn test_dependents_excludes_target_itself() {
        let found = dependents(&packages(), "shared/icon.png");
        assert!(found.iter().all(|d| d.asset != "shared/icon.png"));
    }

    #[test]
    fn test_dependents_none() {
        assert!(dependents(&packages(), "missing.png").is_empty());
    }
}
