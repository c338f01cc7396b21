//! # Method Filter
//!
//! Restricts the method set with either an allow-list or a deny-list read from a
//! plain text file (one identifier per line).

use crate::error::{AppError, AppResult};
use crate::method::MethodSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Where the filter list comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterSource {
    /// Keep only the listed methods.
    Allow(PathBuf),
    /// Drop the listed methods.
    Deny(PathBuf),
}

impl FilterSource {
    /// Builds the filter source from optional list paths; supplying both is an error.
    pub fn from_paths(
        allow: Option<PathBuf>,
        deny: Option<PathBuf>,
    ) -> AppResult<Option<FilterSource>> {
        match (allow, deny) {
            (Some(_), Some(_)) => Err(AppError::ConflictingFilters),
            (Some(path), None) => Ok(Some(FilterSource::Allow(path))),
            (None, Some(path)) => Ok(Some(FilterSource::Deny(path))),
            (None, None) => Ok(None),
        }
    }

    /// The list file path.
    pub fn path(&self) -> &Path {
        match self {
            FilterSource::Allow(path) | FilterSource::Deny(path) => path,
        }
    }

    /// Reads the list file and builds the filter.
    pub fn load(&self) -> AppResult<MethodFilter> {
        let names = read_list(self.path())?;
        Ok(match self {
            FilterSource::Allow(_) => MethodFilter::Allow(names),
            FilterSource::Deny(_) => MethodFilter::Deny(names),
        })
    }
}

/// A loaded method filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodFilter {
    /// Keep only these identifiers.
    Allow(Vec<String>),
    /// Remove these identifiers.
    Deny(Vec<String>),
}

impl MethodFilter {
    /// Applies the filter. Listed identifiers that are not in `methods` are ignored.
    pub fn apply(&self, mut methods: MethodSet) -> MethodSet {
        match self {
            MethodFilter::Deny(names) => {
                for name in names {
                    methods.shift_remove(name);
                }
                methods
            }
            MethodFilter::Allow(names) => names
                .iter()
                .filter_map(|name| methods.shift_remove_entry(name))
                .collect(),
        }
    }
}

/// Parses a filter list: one identifier per line, surrounding whitespace trimmed,
/// blank lines skipped.
pub fn parse_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reads a filter list file.
pub fn read_list(path: &Path) -> AppResult<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(parse_list(&content))
}
