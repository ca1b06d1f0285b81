// src/recipe/kitchen/mod.rs

//! Kitchen: runs recipes through their phases
//!
//! A cook runs three phases strictly in sequence, stopping at the first
//! failure with no rollback and no retry:
//! - **Source**: clone (or copy) the upstream source into the work directory
//! - **Build**: setup, configure, make, check, install into staging
//! - **Package**: copy staged artifacts into the package layout
//!
//! Each phase can also be run on its own against an existing work directory.

mod config;
mod cook;
pub mod plate;
pub mod runner;

pub use config::{ConfigFile, CookResult, KitchenConfig};
pub use cook::Cook;
pub use runner::{CommandRunner, ShellRunner, StepCommand, StepOutput};

use crate::error::Result;
use crate::manifest::PackageManifest;
use crate::recipe::format::Recipe;
use crate::recipe::settings::Settings;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// The phases of a cook, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Source,
    Build,
    Package,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Source => "source",
            Phase::Build => "build",
            Phase::Package => "package",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a recipe's files live on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkLayout {
    /// `<build_root>/<name>-<version>`
    pub root: PathBuf,
    /// Clone target: `<root>/src`
    pub source_dir: PathBuf,
    /// Working directory for build commands (`source_dir` or its `workdir`)
    pub build_dir: PathBuf,
    /// Staging directory, `<build_dir>/<destdir>`
    pub dest_dir: PathBuf,
    /// Plain-text log of every command run
    pub log_path: PathBuf,
    /// `<output_dir>/<name>-<version>`
    pub package_dir: PathBuf,
    /// `<output_dir>/<name>-<version>.manifest.json`
    pub manifest_path: PathBuf,
}

impl WorkLayout {
    /// Compute the layout; all paths are absolute
    pub fn new(config: &KitchenConfig, recipe: &Recipe) -> Result<Self> {
        let package_ref = recipe.package_ref();
        let root = std::path::absolute(&config.build_root)?.join(&package_ref);
        let output_dir = std::path::absolute(&config.output_dir)?;

        let source_dir = root.join("src");
        let build_dir = match &recipe.build.workdir {
            Some(wd) => source_dir.join(wd),
            None => source_dir.clone(),
        };
        let dest_dir = build_dir.join(&recipe.build.destdir);

        Ok(Self {
            log_path: root.join("build.log"),
            package_dir: output_dir.join(&package_ref),
            manifest_path: output_dir.join(format!("{}.manifest.json", package_ref)),
            root,
            source_dir,
            build_dir,
            dest_dir,
        })
    }
}

/// The Kitchen: where recipes are cooked
pub struct Kitchen {
    pub(crate) config: KitchenConfig,
    pub(crate) runner: Arc<dyn CommandRunner>,
}

impl Kitchen {
    /// Create a new Kitchen running commands through `sh`
    pub fn new(config: KitchenConfig) -> Self {
        Self::with_runner(config, Arc::new(ShellRunner::new()))
    }

    /// Create a new Kitchen with a custom command runner
    pub fn with_runner(config: KitchenConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &KitchenConfig {
        &self.config
    }

    /// Paths used for `recipe`
    pub fn layout(&self, recipe: &Recipe) -> Result<WorkLayout> {
        WorkLayout::new(&self.config, recipe)
    }

    /// Remove the recipe's work directory
    pub fn clean(&self, recipe: &Recipe) -> Result<()> {
        let layout = self.layout(recipe)?;
        if layout.root.exists() {
            info!("Removing work directory {}", layout.root.display());
            fs::remove_dir_all(&layout.root)?;
        }
        Ok(())
    }

    /// Run the source phase only
    pub fn source(&self, recipe: &Recipe, settings: &Settings) -> Result<()> {
        let mut cook = Cook::new(self, recipe, settings)?;
        let result = cook.prep();
        finish(&mut cook);
        result
    }

    /// Run the build phase only (the source phase must have run)
    pub fn build(&self, recipe: &Recipe, settings: &Settings) -> Result<Vec<String>> {
        let mut cook = Cook::new(self, recipe, settings)?;
        let result = cook.simmer();
        finish(&mut cook);
        result.map(|_| cook.warnings)
    }

    /// Run the package phase only (the build phase must have run)
    pub fn package(&self, recipe: &Recipe, settings: &Settings) -> Result<CookResult> {
        let mut cook = Cook::new(self, recipe, settings)?;
        let result = cook.plate();
        finish(&mut cook);
        let manifest = result?;
        Ok(cook.into_result(manifest))
    }

    /// Cook a recipe from a clean work directory
    ///
    /// ## Cooking Process
    /// 1. **Clean**: remove any previous work directory
    /// 2. **Prep**: fetch the source
    /// 3. **Simmer**: run the build commands, tests included
    /// 4. **Plate**: copy staged artifacts into the package and write its manifest
    ///
    /// The first failing step aborts everything after it.
    pub fn cook(&self, recipe: &Recipe, settings: &Settings) -> Result<CookResult> {
        info!(
            "Cooking {} version {}",
            recipe.package.name, recipe.package.version
        );

        self.clean(recipe)?;
        let mut cook = Cook::new(self, recipe, settings)?;

        let result = (|| -> Result<PackageManifest> {
            info!("Prep: fetching source...");
            cook.prep()?;

            info!("Simmering: running build...");
            cook.simmer()?;

            info!("Plating: packaging artifacts...");
            cook.plate()
        })();

        finish(&mut cook);
        let manifest = result?;

        info!(
            "Cooked {} ({} files) into {}",
            recipe.package_ref(),
            manifest.files.len(),
            cook.layout().package_dir.display()
        );

        Ok(cook.into_result(manifest))
    }

    /// Check an existing package against its manifest
    pub fn verify(&self, recipe: &Recipe) -> Result<crate::manifest::VerifyReport> {
        let layout = self.layout(recipe)?;
        let manifest = PackageManifest::load(&layout.manifest_path)?;
        manifest.verify(&layout.package_dir)
    }

    pub(crate) fn runner(&self) -> &dyn CommandRunner {
        self.runner.as_ref()
    }
}

/// Persist the log whatever the outcome; a log write failure never masks
/// the phase result
fn finish(cook: &mut Cook<'_>) {
    if let Err(e) = cook.flush_log() {
        warn!("Failed to write build log: {}", e);
    }
}

/// Does `dir` exist with something in it
pub(crate) fn is_non_empty_dir(dir: &Path) -> Result<bool> {
    if !dir.exists() {
        return Ok(false);
    }
    Ok(fs::read_dir(dir)?.next().is_some())
}
