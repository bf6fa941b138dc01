//! Ignore filtering for tree construction and working-directory cleanup.
//!
//! Patterns live in a per-directory `.rvignore` file and apply only to that
//! directory's immediate children. There is no inheritance from parent
//! directories and no negation; each non-empty, non-comment line is a
//! single-segment glob matched against the file name.

use crate::store::{IGNORE_FILE, META_DIR};
use globset::{Glob, GlobMatcher};
use std::fs;
use std::path::Path;

/// Check whether a path is excluded from storage and cleanup.
///
/// The metadata directory is always ignored. Otherwise the path's file name
/// is matched against the patterns of the `.rvignore` file in the same
/// directory, if one exists.
pub fn is_ignored(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };

    if name == META_DIR {
        return true;
    }

    let Some(parent) = path.parent() else {
        return false;
    };

    patterns_in(parent).iter().any(|m| m.is_match(name))
}

/// Load the ignore patterns of a single directory.
///
/// A missing or unreadable ignore file means no patterns. Lines that fail to
/// parse as globs are skipped.
fn patterns_in(dir: &Path) -> Vec<GlobMatcher> {
    let Ok(content) = fs::read_to_string(dir.join(IGNORE_FILE)) else {
        return Vec::new();
    };

    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| Glob::new(line).ok().map(|g| g.compile_matcher()))
        .collect()
}
