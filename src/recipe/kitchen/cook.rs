// src/recipe/kitchen/cook.rs

//! Cook: the phase execution for a single recipe

use crate::error::{Error, Result};
use crate::manifest::PackageManifest;
use crate::recipe::format::{CopyRule, Recipe, SourceKind};
use crate::recipe::settings::Settings;
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::plate::{apply_copy_rule, copy_tree};
use super::runner::{shell_quote, StepCommand, StepOutput};
use super::{is_non_empty_dir, CookResult, Kitchen, Phase, WorkLayout};

/// A single cook operation
pub struct Cook<'a> {
    kitchen: &'a Kitchen,
    recipe: &'a Recipe,
    settings: &'a Settings,
    layout: WorkLayout,
    /// Built-in substitution variables
    variables: BTreeMap<String, String>,
    /// The same, with paths quoted for `sh -c`
    command_variables: BTreeMap<String, String>,
    /// Environment for every command
    env: Vec<(String, String)>,
    /// Build log accumulator
    log: String,
    /// Bytes of `log` already written to disk
    flushed: usize,
    /// Warnings
    pub(super) warnings: Vec<String>,
}

impl<'a> Cook<'a> {
    pub(super) fn new(kitchen: &'a Kitchen, recipe: &'a Recipe, settings: &'a Settings) -> Result<Self> {
        let layout = kitchen.layout(recipe)?;
        let jobs = recipe.build.jobs.unwrap_or(kitchen.config.jobs).max(1);

        // Built-ins override setting axes of the same name
        let mut variables: BTreeMap<String, String> = settings
            .iter()
            .map(|(axis, value)| (axis.to_string(), value.to_string()))
            .collect();
        variables.extend(recipe.metadata_variables());
        variables.insert("destdir".to_string(), layout.dest_dir.display().to_string());
        variables.insert("build_dir".to_string(), layout.build_dir.display().to_string());
        variables.insert("jobs".to_string(), jobs.to_string());

        let mut command_variables = variables.clone();
        for key in ["destdir", "build_dir"] {
            if let Some(value) = command_variables.get_mut(key) {
                *value = shell_quote(value);
            }
        }

        let mut env = vec![
            ("DESTDIR".to_string(), layout.dest_dir.display().to_string()),
            ("MAKEFLAGS".to_string(), format!("-j{}", jobs)),
        ];
        env.extend(settings.env_vars());
        for (key, value) in &kitchen.config.environment {
            env.push((key.clone(), value.clone()));
        }

        let mut cook = Self {
            kitchen,
            recipe,
            settings,
            layout,
            variables,
            command_variables,
            env,
            log: String::new(),
            flushed: 0,
            warnings: Vec::new(),
        };

        // Recipe environment values may use variables
        let recipe_env: Vec<(String, String)> = recipe
            .build
            .environment
            .iter()
            .map(|(k, v)| (k.clone(), cook.substitute(v)))
            .collect();
        cook.env.extend(recipe_env);

        Ok(cook)
    }

    pub fn layout(&self) -> &WorkLayout {
        &self.layout
    }

    fn substitute(&self, template: &str) -> String {
        self.recipe.substitute(template, &self.variables)
    }

    fn substitute_command(&self, template: &str) -> String {
        self.recipe.substitute(template, &self.command_variables)
    }

    /// Phase 1: Prep - fetch the source into an empty source directory
    pub(super) fn prep(&mut self) -> Result<()> {
        let source_dir = self.layout.source_dir.clone();

        if is_non_empty_dir(&source_dir)? {
            return Err(Error::WorkDirNotEmpty(source_dir.display().to_string()));
        }
        fs::create_dir_all(&source_dir)?;

        let recipe = self.recipe;
        let kind = recipe.source.kind().ok_or_else(|| {
            Error::ParseError("Recipe source must set exactly one of 'git' or 'path'".to_string())
        })?;

        match kind {
            SourceKind::Git { url, revision } => {
                let url = self.substitute(url);
                let clone = format!("git clone {} .", shell_quote(&url));
                self.run_step(Phase::Source, "clone", &clone, &source_dir)?;

                match revision {
                    Some(rev) => {
                        let checkout = format!("git checkout --quiet {}", shell_quote(&self.substitute(rev)));
                        self.run_step(Phase::Source, "checkout", &checkout, &source_dir)?;
                    }
                    None => {
                        self.warn(format!(
                            "Source {} is not pinned to a revision; rebuilds follow upstream",
                            url
                        ));
                    }
                }
            }
            SourceKind::Path(path) => {
                let path = PathBuf::from(self.substitute(path));
                info!("Copying source from {}", path.display());
                let count = copy_tree(&path, &source_dir)?;
                self.log_line(&format!(
                    "=== source: copy ===\nCopied {} file(s) from {}",
                    count,
                    path.display()
                ));
            }
        }

        Ok(())
    }

    /// Phase 2: Simmer - run the build commands in order
    pub(super) fn simmer(&mut self) -> Result<()> {
        if !self.layout.source_dir.is_dir() {
            return Err(Error::NotFound(format!(
                "source directory {} (run the source phase first)",
                self.layout.source_dir.display()
            )));
        }

        let build_dir = self.layout.build_dir.clone();
        if !build_dir.is_dir() {
            return Err(Error::NotFound(format!(
                "build directory {}",
                build_dir.display()
            )));
        }

        let steps: Vec<(&str, String)> = self
            .recipe
            .build
            .steps()
            .into_iter()
            .map(|(label, cmd)| (label, self.substitute_command(cmd)))
            .collect();

        if steps.is_empty() {
            self.warn("Recipe has no build commands".to_string());
        }

        for (label, command) in &steps {
            self.run_step(Phase::Build, label, command, &build_dir)?;
        }

        if !self.layout.dest_dir.exists() {
            self.warn(format!(
                "Nothing was installed into {}",
                self.layout.dest_dir.display()
            ));
        }

        Ok(())
    }

    /// Phase 3: Plate - copy staged artifacts into a fresh package directory
    ///
    /// On failure the partial package directory is removed, so an incomplete
    /// package is never left behind.
    pub(super) fn plate(&mut self) -> Result<PackageManifest> {
        let build_dir = self.layout.build_dir.clone();
        let package_dir = self.layout.package_dir.clone();

        if !build_dir.is_dir() {
            return Err(Error::NotFound(format!(
                "build directory {} (run the build phase first)",
                build_dir.display()
            )));
        }

        if package_dir.exists() {
            fs::remove_dir_all(&package_dir)?;
        }
        if self.layout.manifest_path.exists() {
            fs::remove_file(&self.layout.manifest_path)?;
        }
        fs::create_dir_all(&package_dir)?;

        match self.copy_all(&build_dir, &package_dir) {
            Ok(()) => {}
            Err(e) => {
                if let Err(cleanup) = fs::remove_dir_all(&package_dir) {
                    warn!("Failed to remove incomplete package: {}", cleanup);
                }
                self.log_line(&format!("=== package: failed ===\n{}", e));
                return Err(e);
            }
        }

        let manifest = PackageManifest::scan(
            &self.recipe.package.name,
            &self.recipe.package.version,
            self.settings,
            &package_dir,
        )?;
        manifest.write(&self.layout.manifest_path)?;

        self.log_line(&format!(
            "=== package: manifest ===\n{} file(s), package id {}",
            manifest.files.len(),
            manifest.package_id
        ));

        Ok(manifest)
    }

    fn copy_all(&mut self, build_dir: &Path, package_dir: &Path) -> Result<()> {
        let rules: Vec<CopyRule> = self
            .recipe
            .plate
            .copy
            .iter()
            .map(|rule| CopyRule {
                pattern: self.substitute(&rule.pattern),
                src: self.substitute(&rule.src),
                dst: self.substitute(&rule.dst),
                exclude: rule.exclude.iter().map(|e| self.substitute(e)).collect(),
            })
            .collect();

        if rules.is_empty() {
            self.warn("Recipe has no copy rules; the package is empty".to_string());
        }

        for rule in &rules {
            info!("Copying '{}' from {} to {}", rule.pattern, rule.src, rule.dst);
            let copied = apply_copy_rule(rule, build_dir, package_dir)?;

            let mut entry = format!("=== package: copy {} ===", rule.pattern);
            for path in &copied {
                entry.push('\n');
                entry.push_str(&path.display().to_string());
            }
            self.log_line(&entry);
        }

        Ok(())
    }

    /// Run one command and fail on a non-zero exit
    fn run_step(&mut self, phase: Phase, step: &str, command: &str, workdir: &Path) -> Result<()> {
        info!("Running {} step '{}'", phase, step);
        debug!("Command: {}", command);

        let cmd = StepCommand {
            phase,
            step,
            command,
            workdir,
            env: &self.env,
        };

        let output = self.kitchen.runner().run(&cmd)?;
        append_output(&mut self.log, phase, step, command, &output);
        output.into_result(&cmd).map(|_| ())
    }

    fn warn(&mut self, message: String) {
        warn!("{}", message);
        self.log_line(&format!("warning: {}", message));
        self.warnings.push(message);
    }

    fn log_line(&mut self, line: &str) {
        self.log.push_str(line);
        self.log.push('\n');
    }

    /// Append the not yet written part of the log to `build.log`
    pub(super) fn flush_log(&mut self) -> Result<()> {
        if self.flushed == self.log.len() {
            return Ok(());
        }

        fs::create_dir_all(&self.layout.root)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.layout.log_path)?;
        file.write_all(self.log[self.flushed..].as_bytes())?;
        self.flushed = self.log.len();

        Ok(())
    }

    pub(super) fn into_result(self, manifest: PackageManifest) -> CookResult {
        CookResult {
            package_dir: self.layout.package_dir,
            manifest_path: self.layout.manifest_path,
            manifest,
            log: self.log,
            warnings: self.warnings,
        }
    }
}

/// Log a command's output with a phase header
fn append_output(log: &mut String, phase: Phase, step: &str, command: &str, output: &StepOutput) {
    log.push_str(&format!("=== {}: {} ===\n$ {}\n", phase, step, command));
    if !output.stdout.is_empty() {
        log.push_str(&output.stdout);
        if !output.stdout.ends_with('\n') {
            log.push('\n');
        }
    }
    if !output.stderr.is_empty() {
        log.push_str(&output.stderr);
        if !output.stderr.ends_with('\n') {
            log.push('\n');
        }
    }
    if !output.success() {
        log.push_str(&format!("({})\n", output.status()));
    }
}
