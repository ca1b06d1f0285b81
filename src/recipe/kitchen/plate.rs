// src/recipe/kitchen/plate.rs

//! File copying for the Kitchen: packaging copy rules and local sources

use crate::error::{Error, Result};
use crate::recipe::format::CopyRule;
use crate::recipe::parser::is_relative_inside;
use glob::{MatchOptions, Pattern};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// fnmatch semantics: `*` crosses directory separators. Case-sensitive.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Apply one copy rule
///
/// `rule.src` is resolved against `build_dir`, `rule.dst` against
/// `package_dir`. Paths in the rule must already be substituted. Returns the
/// copied paths relative to `package_dir`.
///
/// A rule that matches nothing fails with [`Error::MissingFile`]: a package
/// missing one of its declared artifacts is never produced silently.
pub fn apply_copy_rule(rule: &CopyRule, build_dir: &Path, package_dir: &Path) -> Result<Vec<PathBuf>> {
    for path in [&rule.pattern, &rule.src, &rule.dst] {
        if !is_relative_inside(path) {
            return Err(Error::ParseError(format!(
                "Copy rule path escapes its root: {}",
                path
            )));
        }
    }

    let src_root = build_dir.join(&rule.src);
    let dst_root = package_dir.join(&rule.dst);

    if !src_root.is_dir() {
        return Err(Error::MissingFile(format!(
            "copy source directory {} does not exist",
            src_root.display()
        )));
    }

    let pattern = Pattern::new(&rule.pattern)
        .map_err(|e| Error::ParseError(format!("Invalid copy pattern '{}': {}", rule.pattern, e)))?;
    let excludes = rule
        .exclude
        .iter()
        .map(|p| {
            Pattern::new(p)
                .map_err(|e| Error::ParseError(format!("Invalid exclude pattern '{}': {}", p, e)))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut copied = Vec::new();

    if is_literal(&rule.pattern) {
        let candidate = src_root.join(&rule.pattern);
        let is_copyable = fs::symlink_metadata(&candidate)
            .map(|m| !m.is_dir())
            .unwrap_or(false);
        if is_copyable && !is_excluded(&rule.pattern, &excludes) {
            copy_entry(&candidate, &dst_root.join(&rule.pattern))?;
            copied.push(Path::new(&rule.dst).join(&rule.pattern));
        }
    } else {
        for entry in WalkDir::new(&src_root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry?;
            if entry.file_type().is_dir() {
                continue;
            }

            let rel = entry
                .path()
                .strip_prefix(&src_root)
                .map_err(|e| Error::IoError(e.to_string()))?;
            let rel_str = rel.to_string_lossy().replace('\\', "/");

            if !pattern.matches_with(&rel_str, MATCH_OPTIONS) || is_excluded(&rel_str, &excludes) {
                continue;
            }

            copy_entry(entry.path(), &dst_root.join(rel))?;
            copied.push(Path::new(&rule.dst).join(rel));
        }
    }

    if copied.is_empty() {
        return Err(Error::MissingFile(format!(
            "no files match '{}' in {}",
            rule.pattern,
            src_root.display()
        )));
    }

    debug!(
        "Copied {} file(s) for '{}' from {}",
        copied.len(),
        rule.pattern,
        src_root.display()
    );

    Ok(copied)
}

/// Copy a whole directory tree, preserving symlinks
pub fn copy_tree(src: &Path, dst: &Path) -> Result<usize> {
    if !src.is_dir() {
        return Err(Error::NotFound(format!(
            "source directory {} does not exist",
            src.display()
        )));
    }

    fs::create_dir_all(dst)?;
    let mut count = 0;

    for entry in WalkDir::new(src).min_depth(1).follow_links(false) {
        let entry = entry?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| Error::IoError(e.to_string()))?;
        let target = dst.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            copy_entry(entry.path(), &target)?;
            count += 1;
        }
    }

    Ok(count)
}

/// Copy a file or recreate a symlink at `dst`
fn copy_entry(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }

    let meta = fs::symlink_metadata(src)?;
    if meta.file_type().is_symlink() {
        let link_target = fs::read_link(src)?;
        if fs::symlink_metadata(dst).is_ok() {
            fs::remove_file(dst)?;
        }
        make_symlink(&link_target, dst)?;
    } else {
        fs::copy(src, dst).map_err(|e| {
            Error::IoError(format!(
                "Failed to copy {} to {}: {}",
                src.display(),
                dst.display(),
                e
            ))
        })?;
    }

    Ok(())
}

#[cfg(unix)]
fn make_symlink(target: &Path, link: &Path) -> Result<()> {
    std::os::unix::fs::symlink(target, link)?;
    Ok(())
}

#[cfg(not(unix))]
fn make_symlink(target: &Path, link: &Path) -> Result<()> {
    // No portable symlinks: copy what the link points at
    let resolved = link.parent().map(|p| p.join(target)).unwrap_or_else(|| target.to_path_buf());
    fs::copy(resolved, link)?;
    Ok(())
}

fn is_literal(pattern: &str) -> bool {
    !pattern.contains(['*', '?', '['])
}

fn is_excluded(rel: &str, excludes: &[Pattern]) -> bool {
    excludes.iter().any(|p| p.matches_with(rel, MATCH_OPTIONS))
}
