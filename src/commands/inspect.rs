// src/commands/inspect.rs

//! Recipe inspection and validation commands

use super::load_recipe;
use anyhow::{Context, Result};
use larder::recipe::validate_recipe;

/// Show a recipe's metadata, build steps and copy rules
pub fn cmd_inspect(recipe_path: &str, json: bool) -> Result<()> {
    let recipe = load_recipe(recipe_path)?;

    if json {
        let out = serde_json::to_string_pretty(&recipe).context("Failed to serialize recipe")?;
        println!("{}", out);
        return Ok(());
    }

    let package = &recipe.package;
    println!("Package: {}", package.name);
    println!("Version: {}", package.version);
    if let Some(license) = &package.license {
        println!("License: {}", license);
    }
    if let Some(author) = &package.author {
        println!("Author: {}", author);
    }
    if let Some(homepage) = &package.homepage {
        println!("Homepage: {}", homepage);
    }
    if let Some(description) = &package.description {
        println!("Description: {}", description);
    }
    if !package.topics.is_empty() {
        println!("Topics: {}", package.topics.join(", "));
    }
    if !package.settings.is_empty() {
        println!("Settings: {}", package.settings.join(", "));
    }

    println!();
    match (&recipe.source.git, &recipe.source.path) {
        (Some(url), _) => match &recipe.source.revision {
            Some(rev) => println!("Source: git {} @ {}", url, rev),
            None => println!("Source: git {} (unpinned)", url),
        },
        (None, Some(path)) => println!("Source: path {}", path),
        (None, None) => println!("Source: (none)"),
    }

    let steps = recipe.build.steps();
    if !steps.is_empty() {
        println!("\nBuild steps:");
        for (step, command) in steps {
            println!("  {:<12} {}", step, command);
        }
    }

    if !recipe.plate.copy.is_empty() {
        println!("\nCopy rules:");
        for rule in &recipe.plate.copy {
            println!("  {} : {} -> {}", rule.pattern, rule.src, rule.dst);
        }
    }

    if !recipe.variables.is_empty() {
        println!("\nVariables:");
        for (key, value) in &recipe.variables {
            println!("  {} = {}", key, value);
        }
    }

    Ok(())
}

/// Validate a recipe, printing warnings; errors fail the command
pub fn cmd_validate(recipe_path: &str) -> Result<()> {
    let recipe = load_recipe(recipe_path)?;
    let warnings = validate_recipe(&recipe)
        .with_context(|| format!("Recipe {} is invalid", recipe_path))?;

    for warning in &warnings {
        println!("Warning: {}", warning);
    }
    println!(
        "[OK] {} ({} warning(s))",
        recipe.package_ref(),
        warnings.len()
    );
    Ok(())
}
