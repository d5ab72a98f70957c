//! Constant-time membership lookup over one package's asset paths.

use dupcheck_core::manifest::Package;
use std::collections::HashSet;

/// Read-only set of the asset paths a package contains.
///
/// Borrows from the package; rebuilt for every scan.
#[derive(Debug, Clone)]
pub struct PackageIndex<'a> {
    package_id: &'a str,
    paths: HashSet<&'a str>,
}

impl<'a> PackageIndex<'a> {
    pub fn build(package: &'a Package) -> Self {
        let paths = package.assets().iter().map(|a| a.path.as_str()).collect();
        Self {
            package_id: package.id(),
            paths,
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn package_id(&self) -> &'a str {
        self.package_id
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dupcheck_core::manifest::AssetRecord;

    #[test]
    fn test_contains_member_paths() {
        let pkg = Package::new(
            "Core",
            vec![AssetRecord::new("shared/icon.png"), AssetRecord::new("shared/font.ttf")],
        )
        .unwrap();
        let index = PackageIndex::build(&pkg);

        assert_eq!(index.package_id(), "Core");
        assert_eq!(index.len(), 2);
        assert!(index.contains("shared/icon.png"));
        assert!(!index.contains("shared/ICON.png"));
        assert!(!index.contains("missing.png"));
    }

    #[test]
    fn test_empty_package_never_matches() {
        let pkg = Package::new("Empty", Vec::new()).unwrap();
        let index = PackageIndex::build(&pkg);
        assert!(index.is_empty());
        assert!(!index.contains(""));
        assert!(!index.contains("anything.png"));
    }

    #[test]
    fn test_dependencies_are_not_members() {
        let pkg = Package::new(
            "UI",
            vec![AssetRecord::new("btn.png").with_dependencies(["shared/icon.png"])],
        )
        .unwrap();
        let index = PackageIndex::build(&pkg);
        assert!(index.contains("btn.png"));
        assert!(!index.contains("shared/icon.png"));
    }
}
