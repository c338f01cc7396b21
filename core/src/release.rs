//! # Installation Release
//!
//! Reads release metadata from an installation's `version.php`. The release string
//! becomes the document version and feeds the `{VERSION}` output path placeholder.

use crate::error::{AppError, AppResult};
use regex::Regex;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Release metadata of an installation.
#[derive(Debug, Clone, PartialEq)]
pub struct Release {
    /// Installation root.
    pub root: PathBuf,
    /// Numeric build version, e.g. `2024100700.00`.
    pub version: f64,
    /// Human release string, e.g. `4.5 (Build: 20241007)`.
    pub release: String,
    /// Branch identifier, e.g. `405`.
    pub branch: String,
    /// Maturity constant, e.g. `MATURITY_STABLE`.
    pub maturity: String,
}

impl Release {
    /// Reads `<root>/version.php`.
    pub fn from_root(root: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(root.join("version.php"))?;
        Self::parse(root, &content)
    }

    /// Parses the content of a `version.php` file.
    pub fn parse(root: &Path, content: &str) -> AppResult<Self> {
        static VERSION_RE: OnceLock<Regex> = OnceLock::new();
        let version_re = VERSION_RE
            .get_or_init(|| Regex::new(r"\$version\s*=\s*([\d.]+);").expect("Invalid regex"));

        static RELEASE_RE: OnceLock<Regex> = OnceLock::new();
        let release_re = RELEASE_RE
            .get_or_init(|| Regex::new(r"\$release\s*=\s*'([^']+)';").expect("Invalid regex"));

        static BRANCH_RE: OnceLock<Regex> = OnceLock::new();
        let branch_re = BRANCH_RE
            .get_or_init(|| Regex::new(r"\$branch\s*=\s*'([^']+)';").expect("Invalid regex"));

        static MATURITY_RE: OnceLock<Regex> = OnceLock::new();
        let maturity_re = MATURITY_RE
            .get_or_init(|| Regex::new(r"\$maturity\s*=\s*([A-Z_]+);").expect("Invalid regex"));

        let capture = |re: &Regex| {
            re.captures(content)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        };

        let (Some(version), Some(release), Some(branch), Some(maturity)) = (
            capture(version_re),
            capture(release_re),
            capture(branch_re),
            capture(maturity_re),
        ) else {
            return Err(AppError::General(format!(
                "Failed to parse installation information in {:?}",
                root
            )));
        };

        let version = version
            .parse::<f64>()
            .map_err(|e| AppError::General(format!("Invalid version '{}': {}", version, e)))?;

        Ok(Self {
            root: root.to_path_buf(),
            version,
            release,
            branch,
            maturity,
        })
    }

    /// The `v<major>.<minor>.<patch>` tag embedded in the release string, if any.
    pub fn version_tag(&self) -> Option<String> {
        static TAG_RE: OnceLock<Regex> = OnceLock::new();
        let tag_re = TAG_RE.get_or_init(|| Regex::new(r"\d+\.\d+\.\d+").expect("Invalid regex"));
        tag_re
            .find(&self.release)
            .map(|m| format!("v{}", m.as_str()))
    }
}

impl fmt::Display for Release {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Root:     {}", self.root.display())?;
        writeln!(f, "Release:  {}", self.release)?;
        writeln!(f, "Version:  {}", self.version)?;
        writeln!(f, "Branch:   {}", self.branch)?;
        write!(f, "Maturity: {}", self.maturity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERSION_PHP: &str = r#"<?php
defined('MOODLE_INTERNAL') || die();

$version  = 2024100702.00;              // YYYYMMDD      = weekly release date of this DEV branch.
$release  = '4.5.2 (Build: 20250210)'; // Human-friendly version name
$branch   = '405';                     // This version's branch.
$maturity = MATURITY_STABLE;             // This version's maturity level.
"#;

    #[test]
    fn test_parse_version_php() {
        let release = Release::parse(Path::new("/srv/moodle"), VERSION_PHP).unwrap();
        assert_eq!(release.version, 2024100702.00);
        assert_eq!(release.release, "4.5.2 (Build: 20250210)");
        assert_eq!(release.branch, "405");
        assert_eq!(release.maturity, "MATURITY_STABLE");
        assert_eq!(release.version_tag().as_deref(), Some("v4.5.2"));
    }

    #[test]
    fn test_display_lists_installation() {
        let release = Release::parse(Path::new("/srv/moodle"), VERSION_PHP).unwrap();
        let text = release.to_string();
        assert!(text.contains("Root:     /srv/moodle"));
        assert!(text.contains("Release:  4.5.2 (Build: 20250210)"));
        assert!(text.contains("Version:  2024100702"));
        assert!(text.contains("Branch:   405"));
        assert!(text.ends_with("Maturity: MATURITY_STABLE"));
    }

    #[test]
    fn test_release_without_patch_has_no_tag() {
        let content = VERSION_PHP.replace("4.5.2 (Build", "4.5+ (Build");
        let release = Release::parse(Path::new("."), &content).unwrap();
        assert_eq!(release.version_tag(), None);
    }

    #[test]
    fn test_incomplete_file_rejected() {
        let res = Release::parse(Path::new("."), "<?php\n$version = 1;\n");
        assert!(matches!(res, Err(AppError::General(_))));
    }

    #[test]
    fn test_from_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("version.php"), VERSION_PHP).unwrap();
        let release = Release::from_root(dir.path()).unwrap();
        assert_eq!(release.root, dir.path());
        assert_eq!(release.branch, "405");
    }
}
