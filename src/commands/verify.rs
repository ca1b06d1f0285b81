// src/commands/verify.rs

//! Check a cooked package against its manifest

use super::{prepare, Prepared};
use crate::cli::KitchenArgs;
use anyhow::{Context, Result};

pub fn cmd_verify(args: &KitchenArgs, config_path: Option<&str>) -> Result<()> {
    let Prepared { kitchen, recipe, .. } = prepare(args, config_path)?;
    let layout = kitchen.layout(&recipe)?;

    println!("Verifying {} against {}", layout.package_dir.display(), layout.manifest_path.display());
    let report = kitchen
        .verify(&recipe)
        .with_context(|| format!("Failed to verify {}", recipe.package_ref()))?;

    for path in &report.missing {
        println!("  missing:    {}", path);
    }
    for path in &report.modified {
        println!("  modified:   {}", path);
    }
    for path in &report.unexpected {
        println!("  unexpected: {}", path);
    }

    if !report.is_clean() {
        anyhow::bail!(
            "Package {} does not match its manifest ({} missing, {} modified, {} unexpected)",
            recipe.package_ref(),
            report.missing.len(),
            report.modified.len(),
            report.unexpected.len()
        );
    }

    println!("[OK] {} matches its manifest", recipe.package_ref());
    Ok(())
}
