// src/commands/mod.rs
//! Command handlers for the larder CLI

mod cook;
mod inspect;
mod verify;

pub use cook::{cmd_cook, CookMode};
pub use inspect::{cmd_inspect, cmd_validate};
pub use verify::cmd_verify;

use crate::cli::KitchenArgs;
use anyhow::{Context, Result};
use larder::recipe::{
    parse_assignment, parse_recipe_file, validate_recipe, ConfigFile, Kitchen, Recipe, Settings,
};
use std::path::{Path, PathBuf};

/// Read a recipe and anchor a relative `path` source at the recipe's directory
pub(crate) fn load_recipe(recipe_path: &str) -> Result<Recipe> {
    let recipe_path = Path::new(recipe_path);
    let mut recipe = parse_recipe_file(recipe_path)
        .with_context(|| format!("Failed to parse recipe: {}", recipe_path.display()))?;

    if let Some(path) = &recipe.source.path
        && Path::new(path).is_relative()
    {
        let base = recipe_path.parent().unwrap_or_else(|| Path::new("."));
        recipe.source.path = Some(base.join(path).to_string_lossy().into_owned());
    }

    Ok(recipe)
}

/// Everything a kitchen command needs
pub(crate) struct Prepared {
    pub kitchen: Kitchen,
    pub recipe: Recipe,
    pub settings: Settings,
    pub warnings: Vec<String>,
}

/// Load config, recipe and settings, applying command-line overrides
pub(crate) fn prepare(args: &KitchenArgs, config_path: Option<&str>) -> Result<Prepared> {
    let config_file = match config_path {
        Some(path) => ConfigFile::load(Path::new(path))
            .with_context(|| format!("Failed to load config: {}", path))?,
        None => ConfigFile::default(),
    };

    let mut config = config_file.kitchen;
    if let Some(root) = &args.build_root {
        config.build_root = PathBuf::from(root);
    }
    if let Some(output) = &args.output {
        config.output_dir = PathBuf::from(output);
    }
    if let Some(jobs) = args.jobs {
        config.jobs = jobs;
    }

    let recipe = load_recipe(&args.recipe)?;
    let warnings = validate_recipe(&recipe).with_context(|| "Recipe validation failed")?;

    let mut defaults = Settings::detect();
    for (axis, value) in &config_file.settings {
        defaults.set(axis.clone(), value.clone());
    }
    let overrides = args
        .settings
        .iter()
        .map(|s| parse_assignment(s))
        .collect::<larder::Result<Vec<_>>>()?;
    let settings = Settings::resolve(&recipe.package.settings, &defaults, &overrides)
        .with_context(|| format!("Failed to resolve settings for {}", recipe.package_ref()))?;

    Ok(Prepared {
        kitchen: Kitchen::new(config),
        recipe,
        settings,
        warnings,
    })
}
