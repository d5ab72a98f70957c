//! Folder buckets for asset paths.
//!
//! An ordered list of folder rules; the first rule whose folder matches an
//! asset path decides its bucket. A matching hidden rule suppresses the path.

use dupcheck_core::config::{ClassifyConfig, FolderRuleConfig};

/// A folder rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderRule {
    /// Project-relative (`Assets/...`) or absolute folder path.
    pub folder: String,
    /// Assets under this folder are grouped under its name.
    pub join_check: bool,
    /// Match assets in subfolders too, not just direct children.
    pub include_children: bool,
    /// Assets under this folder are suppressed.
    pub hidden: bool,
}

impl From<&FolderRuleConfig> for FolderRule {
    fn from(c: &FolderRuleConfig) -> Self {
        Self {
            folder: c.folder.clone(),
            join_check: c.join_check,
            include_children: c.include_children,
            hidden: c.hidden,
        }
    }
}

/// Where an asset path falls.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Bucket {
    /// Matched a rule; holds the folder's last path segment.
    Folder(String),
    /// Matched a hidden rule.
    Hidden,
    /// No active rule matched.
    Unclassified,
}

/// Ordered rule set with an optional absolute root for `Assets/`.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    rules: Vec<FolderRule>,
    assets_root: Option<String>,
}

impl Classifier {
    pub fn new(rules: Vec<FolderRule>, assets_root: Option<String>) -> Self {
        Self {
            rules,
            assets_root: assets_root.map(|r| normalize(&r).trim_end_matches('/').to_string()),
        }
    }

    pub fn from_config(config: &ClassifyConfig) -> Self {
        Self::new(
            config.rules.iter().map(FolderRule::from).collect(),
            config.assets_root.clone(),
        )
    }

    pub fn rules(&self) -> &[FolderRule] {
        &self.rules
    }

    pub fn classify(&self, asset_path: &str) -> Bucket {
        if asset_path.is_empty() {
            return Bucket::Unclassified;
        }
        let asset_path = normalize(asset_path);

        for rule in &self.rules {
            if !rule.join_check && !rule.hidden {
                continue;
            }
            let Some(folder) = self.relative_folder(&rule.folder) else {
                continue;
            };

            let matched = if rule.include_children {
                starts_with_ignore_case(&asset_path, &folder)
            } else {
                let dir = match asset_path.rfind('/') {
                    Some(i) => &asset_path[..=i],
                    None => "",
                };
                dir.eq_ignore_ascii_case(&folder)
            };
            if !matched {
                continue;
            }

            if rule.hidden {
                return Bucket::Hidden;
            }
            let trimmed = folder.trim_end_matches('/');
            let name = trimmed.rsplit('/').next().unwrap_or(trimmed);
            return Bucket::Folder(name.to_string());
        }

        Bucket::Unclassified
    }

    /// `Assets/`-relative form of a rule folder with a trailing slash, or
    /// `None` when an absolute folder lies outside the assets root.
    fn relative_folder(&self, folder: &str) -> Option<String> {
        let folder = normalize(folder);
        if folder.is_empty() {
            return None;
        }

        let mut rel = if folder.eq_ignore_ascii_case("Assets")
            || starts_with_ignore_case(&folder, "Assets/")
        {
            folder
        } else {
            let root = self.assets_root.as_deref()?;
            if !starts_with_ignore_case(&folder, root) {
                return None;
            }
            let rest = &folder[root.len()..];
            // The root must end at a path boundary.
            if !rest.is_empty() && !rest.starts_with('/') {
                return None;
            }
            format!("Assets{}", rest)
        };

        if !rel.ends_with('/') {
            rel.push('/');
        }
        Some(rel)
    }
}

/// Convenience wrapper over [`Classifier::classify`].
pub fn classify(asset_path: &str, rules: &[FolderRule]) -> Bucket {
    Classifier::new(rules.to_vec(), None).classify(asset_path)
}

fn normalize(path: &str) -> String {
    path.replace('\\', "/")
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.is_char_boundary(prefix.len())
        && s[..prefix.len()].eq_ignore_ascii_case(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(folder: &str, include_children: bool, hidden: bool) -> FolderRule {
        FolderRule {
            folder: folder.to_string(),
            join_check: !hidden,
            include_children,
            hidden,
        }
    }

    #[test]
    fn test_direct_child_only() {
        let rules = vec![rule("Assets/Art/UI", false, false)];
        assert_eq!(
            classify("Assets/Art/UI/btn.png", &rules),
            Bucket::Folder("UI".to_string())
        );
        assert_eq!(classify("Assets/Art/UI/icons/a.png", &rules), Bucket::Unclassified);
    }

    #[test]
    fn test_include_children() {
        let rules = vec![rule("Assets/Art", true, false)];
        assert_eq!(
            classify("Assets/Art/UI/icons/a.png", &rules),
            Bucket::Folder("Art".to_string())
        );
    }

    #[test]
    fn test_no_prefix_confusion() {
        let rules = vec![rule("Assets/Foo", true, false)];
        assert_eq!(classify("Assets/Foobar/x.png", &rules), Bucket::Unclassified);
    }

    #[test]
    fn test_first_match_wins() {
        let rules = vec![
            rule("Assets/Art/UI", true, true),
            rule("Assets/Art", true, false),
        ];
        assert_eq!(classify("Assets/Art/UI/btn.png", &rules), Bucket::Hidden);
        assert_eq!(
            classify("Assets/Art/Env/tree.fbx", &rules),
            Bucket::Folder("Art".to_string())
        );
    }

    #[test]
    fn test_inactive_rule_skipped() {
        let rules = vec![
            FolderRule {
                folder: "Assets/Art".to_string(),
                join_check: false,
                include_children: true,
                hidden: false,
            },
            rule("Assets", true, false),
        ];
        assert_eq!(
            classify("Assets/Art/a.png", &rules),
            Bucket::Folder("Assets".to_string())
        );
    }

    #[test]
    fn test_case_insensitive_and_backslashes() {
        let rules = vec![rule("assets\\art", true, false)];
        assert_eq!(
            classify("Assets\\Art\\a.png", &rules),
            Bucket::Folder("art".to_string())
        );
    }

    #[test]
    fn test_absolute_folder_under_assets_root() {
        let classifier = Classifier::new(
            vec![rule("/work/game/Assets/Shared", true, false)],
            Some("/work/game/Assets".to_string()),
        );
        assert_eq!(
            classifier.classify("Assets/Shared/icon.png"),
            Bucket::Folder("Shared".to_string())
        );
    }

    #[test]
    fn test_absolute_folder_outside_root_skipped() {
        let classifier = Classifier::new(
            vec![rule("/elsewhere/Shared", true, false)],
            Some("/work/game/Assets".to_string()),
        );
        assert_eq!(classifier.classify("Assets/Shared/icon.png"), Bucket::Unclassified);

        let sibling = Classifier::new(
            vec![rule("/work/game/AssetsOld/Shared", true, false)],
            Some("/work/game/Assets".to_string()),
        );
        assert_eq!(sibling.classify("AssetsOld/Shared/icon.png"), Bucket::Unclassified);
        assert_eq!(sibling.classify("Assets/Shared/icon.png"), Bucket::Unclassified);

        let no_root = Classifier::new(vec![rule("/work/game/Assets/Shared", true, false)], None);
        assert_eq!(no_root.classify("Assets/Shared/icon.png"), Bucket::Unclassified);
    }

    #[test]
    fn test_from_config() {
        let config = ClassifyConfig {
            assets_root: None,
            rules: vec![FolderRuleConfig {
                folder: "Assets/Shared".to_string(),
                join_check: true,
                include_children: false,
                hidden: false,
            }],
        };
        let classifier = Classifier::from_config(&config);
        assert_eq!(classifier.rules().len(), 1);
        assert_eq!(
            classifier.classify("Assets/Shared/icon.png"),
            Bucket::Folder("Shared".to_string())
        );
    }

    #[test]
    fn test_empty_path_unclassified() {
        let rules = vec![rule("Assets", true, false)];
        assert_eq!(classify("", &rules), Bucket::Unclassified);
    }
}
