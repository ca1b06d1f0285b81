// src/manifest.rs

//! Package manifests
//!
//! A manifest lists every entry of a package layout with its SHA-256, plus a
//! package id derived from name, version and settings. Serialization is
//! deterministic (sorted maps, no timestamps): two cooks of the same upstream
//! revision with the same settings produce byte-identical manifests.

use crate::error::{Error, Result};
use crate::hash::{sha256, sha256_file};
use crate::recipe::Settings;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// One entry of a package layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FileEntry {
    File {
        sha256: String,
        size: u64,
        executable: bool,
    },
    Symlink {
        target: String,
    },
}

/// Manifest of a cooked package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    pub name: String,
    pub version: String,
    pub package_id: String,
    pub settings: BTreeMap<String, String>,
    /// Relative path (with `/` separators) to entry
    pub files: BTreeMap<String, FileEntry>,
}

/// Differences between a manifest and a package directory
#[derive(Debug, Default, PartialEq, Eq)]
pub struct VerifyReport {
    pub missing: Vec<String>,
    pub modified: Vec<String>,
    pub unexpected: Vec<String>,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.modified.is_empty() && self.unexpected.is_empty()
    }
}

/// Identify a package build by name, version and settings
pub fn package_id(name: &str, version: &str, settings: &Settings) -> String {
    let mut input = format!("name={}\nversion={}\n", name, version);
    for (axis, value) in settings.iter() {
        input.push_str(&format!("setting.{}={}\n", axis, value));
    }
    sha256(input.as_bytes())
}

impl PackageManifest {
    /// Build a manifest by scanning a package directory
    pub fn scan(name: &str, version: &str, settings: &Settings, package_dir: &Path) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            version: version.to_string(),
            package_id: package_id(name, version, settings),
            settings: settings.as_map().clone(),
            files: scan_entries(package_dir)?,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::ParseError(format!("Failed to serialize manifest: {}", e)))?;
        json.push('\n');
        Ok(json)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::IoError(format!("Failed to read manifest {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content)
            .map_err(|e| Error::ParseError(format!("Invalid manifest {}: {}", path.display(), e)))
    }

    /// Compare a package directory against this manifest
    pub fn verify(&self, package_dir: &Path) -> Result<VerifyReport> {
        if !package_dir.is_dir() {
            return Err(Error::NotFound(format!(
                "package directory {} does not exist",
                package_dir.display()
            )));
        }

        let actual = scan_entries(package_dir)?;
        let mut report = VerifyReport::default();

        for (path, expected) in &self.files {
            match actual.get(path) {
                None => report.missing.push(path.clone()),
                Some(found) if found != expected => report.modified.push(path.clone()),
                Some(_) => {}
            }
        }

        for path in actual.keys() {
            if !self.files.contains_key(path) {
                report.unexpected.push(path.clone());
            }
        }

        Ok(report)
    }
}

fn scan_entries(root: &Path) -> Result<BTreeMap<String, FileEntry>> {
    let mut files = BTreeMap::new();

    for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
        let entry = entry?;
        let file_type = entry.file_type();
        if file_type.is_dir() {
            continue;
        }

        let rel = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| Error::IoError(e.to_string()))?
            .to_string_lossy()
            .replace('\\', "/");

        let record = if file_type.is_symlink() {
            FileEntry::Symlink {
                target: fs::read_link(entry.path())?.to_string_lossy().into_owned(),
            }
        } else {
            let meta = entry.metadata()?;
            FileEntry::File {
                sha256: sha256_file(entry.path())?,
                size: meta.len(),
                executable: is_executable(&meta),
            }
        };

        files.insert(rel, record);
    }

    Ok(files)
}

#[cfg(unix)]
fn is_executable(meta: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_meta: &fs::Metadata) -> bool {
    false
}
