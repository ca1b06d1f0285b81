// src/commands/cook.rs

//! Cook commands - run a recipe's phases

use super::{prepare, Prepared};
use crate::cli::KitchenArgs;
use anyhow::{Context, Result};
use tracing::info;

/// Which phases a cook command runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookMode {
    /// Clean, then source, build and package
    Create,
    Source,
    Build,
    Package,
}

/// Cook a recipe, or one phase of it
pub fn cmd_cook(args: &KitchenArgs, config_path: Option<&str>, mode: CookMode) -> Result<()> {
    println!("Reading recipe: {}", args.recipe);
    let Prepared {
        kitchen,
        recipe,
        settings,
        warnings,
    } = prepare(args, config_path)?;

    println!("Recipe: {} version {}", recipe.package.name, recipe.package.version);
    for warning in &warnings {
        println!("Warning: {}", warning);
    }
    if !settings.is_empty() {
        println!("Settings: {}", settings);
    }

    let layout = kitchen.layout(&recipe)?;
    let name = &recipe.package.name;

    match mode {
        CookMode::Source => {
            kitchen
                .source(&recipe, &settings)
                .with_context(|| format!("Failed to fetch source for {}", name))?;
            println!("\n[COMPLETE] Source ready in {}", layout.source_dir.display());
        }
        CookMode::Build => {
            let build_warnings = kitchen
                .build(&recipe, &settings)
                .with_context(|| format!("Failed to build {}", name))?;
            print_warnings(&build_warnings);
            println!("\n[COMPLETE] Staged into {}", layout.dest_dir.display());
        }
        CookMode::Package => {
            let result = kitchen
                .package(&recipe, &settings)
                .with_context(|| format!("Failed to package {}", name))?;
            print_warnings(&result.warnings);
            println!(
                "\n[COMPLETE] Packaged {} file(s) into {}",
                result.manifest.files.len(),
                result.package_dir.display()
            );
            println!("Manifest: {}", result.manifest_path.display());
        }
        CookMode::Create => {
            println!(
                "Cooking with {} parallel jobs in {}...",
                kitchen.config().jobs,
                layout.root.display()
            );
            let result = kitchen
                .cook(&recipe, &settings)
                .with_context(|| format!("Failed to cook {}", name))?;

            println!("\n[COMPLETE] Cooked: {}", result.package_dir.display());
            print_warnings(&result.warnings);
            println!("Package id: {}", result.manifest.package_id);
            println!("Manifest: {}", result.manifest_path.display());

            info!(
                "Successfully cooked {} to {}",
                recipe.package_ref(),
                result.package_dir.display()
            );
        }
    }

    println!("Build log: {}", layout.log_path.display());
    Ok(())
}

fn print_warnings(warnings: &[String]) {
    if warnings.is_empty() {
        return;
    }
    println!("\nBuild warnings:");
    for warning in warnings {
        println!("  - {}", warning);
    }
}
