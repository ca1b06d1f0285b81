// src/recipe/kitchen/config.rs

//! Configuration types for the Kitchen

use crate::error::{Error, Result};
use crate::manifest::PackageManifest;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Configuration for the Kitchen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KitchenConfig {
    /// Root under which each recipe gets its work directory
    pub build_root: PathBuf,
    /// Where finished packages and their manifests are written
    pub output_dir: PathBuf,
    /// Number of parallel jobs (exported as `MAKEFLAGS=-j<jobs>`)
    pub jobs: u32,
    /// Extra environment for every build command
    pub environment: BTreeMap<String, String>,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        let jobs = std::thread::available_parallelism()
            .map(|p| p.get() as u32)
            .unwrap_or(4);

        Self {
            build_root: PathBuf::from("build"),
            output_dir: PathBuf::from("packages"),
            jobs,
            environment: BTreeMap::new(),
        }
    }
}

/// On-disk configuration file
///
/// ```toml
/// [kitchen]
/// build_root = "/var/tmp/larder"
/// output_dir = "dist"
/// jobs = 8
///
/// [settings]
/// compiler = "clang"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub kitchen: KitchenConfig,
    /// Default values for setting axes
    pub settings: BTreeMap<String, String>,
}

impl ConfigFile {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ParseError(format!("Invalid config: {}", e)))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::IoError(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }
}

/// Result of cooking a recipe
#[derive(Debug)]
pub struct CookResult {
    /// Directory holding the packaged layout
    pub package_dir: PathBuf,
    /// Where the manifest was written
    pub manifest_path: PathBuf,
    /// Manifest of the package layout
    pub manifest: PackageManifest,
    /// Build log
    pub log: String,
    /// Warnings generated during the cook
    pub warnings: Vec<String>,
}
