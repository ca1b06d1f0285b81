// src/recipe/parser.rs

//! Recipe file parsing

use crate::error::{Error, Result};
use crate::recipe::format::{Recipe, BUILTIN_VARIABLES};
use std::collections::HashSet;
use std::path::{Component, Path};

/// Parse a recipe from a TOML string
pub fn parse_recipe(content: &str) -> Result<Recipe> {
    toml::from_str(content).map_err(|e| Error::ParseError(format!("Invalid recipe: {}", e)))
}

/// Parse a recipe from a file
pub fn parse_recipe_file(path: &Path) -> Result<Recipe> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::IoError(format!("Failed to read recipe file: {}", e)))?;

    parse_recipe(&content)
}

/// Validate a recipe for completeness and correctness
///
/// Hard problems are returned as an error; soft ones as warnings.
pub fn validate_recipe(recipe: &Recipe) -> Result<Vec<String>> {
    let mut warnings = Vec::new();

    if recipe.package.name.trim().is_empty() {
        return Err(Error::ParseError("Recipe package name cannot be empty".to_string()));
    }
    if recipe.package.version.trim().is_empty() {
        return Err(Error::ParseError("Recipe package version cannot be empty".to_string()));
    }
    if recipe.package.name.contains('/') || recipe.package.version.contains('/') {
        return Err(Error::ParseError(
            "Recipe package name and version cannot contain '/'".to_string(),
        ));
    }

    if recipe.source.kind().is_none() {
        return Err(Error::ParseError(
            "Recipe source must set exactly one of 'git' or 'path' ('revision' requires 'git')"
                .to_string(),
        ));
    }

    // Setting axes
    let mut seen = HashSet::new();
    for axis in &recipe.package.settings {
        if axis.trim().is_empty() {
            return Err(Error::ParseError("Setting axis name cannot be empty".to_string()));
        }
        if !seen.insert(axis.as_str()) {
            return Err(Error::ParseError(format!("Duplicate setting axis: {}", axis)));
        }
        if BUILTIN_VARIABLES.contains(&axis.as_str()) {
            return Err(Error::ParseError(format!(
                "Setting axis '{}' shadows a built-in variable",
                axis
            )));
        }
    }

    // Custom variables must not shadow what the kitchen defines
    for key in recipe.variables.keys() {
        if BUILTIN_VARIABLES.contains(&key.as_str()) || seen.contains(key.as_str()) {
            return Err(Error::ParseError(format!(
                "Variable '{}' shadows a built-in variable",
                key
            )));
        }
    }

    if !is_relative_inside(&recipe.build.destdir) {
        return Err(Error::ParseError(format!(
            "Build destdir must be a relative path inside the build directory: {}",
            recipe.build.destdir
        )));
    }
    if let Some(workdir) = &recipe.build.workdir
        && !is_relative_inside(workdir)
    {
        return Err(Error::ParseError(format!(
            "Build workdir must be a relative path inside the source directory: {}",
            workdir
        )));
    }

    for rule in &recipe.plate.copy {
        if rule.pattern.trim().is_empty() {
            return Err(Error::ParseError("Copy rule pattern cannot be empty".to_string()));
        }
        if glob::Pattern::new(&rule.pattern).is_err() {
            return Err(Error::ParseError(format!(
                "Invalid copy pattern: {}",
                rule.pattern
            )));
        }
        if !is_relative_inside(&rule.pattern) {
            return Err(Error::ParseError(format!(
                "Copy pattern must be relative and stay inside its source: {}",
                rule.pattern
            )));
        }
        for path in [&rule.src, &rule.dst] {
            if !is_relative_inside(path) {
                return Err(Error::ParseError(format!(
                    "Copy rule paths must be relative and stay inside their root: {}",
                    path
                )));
            }
        }
    }

    // Warn about missing fields
    if recipe.package.description.is_none() {
        warnings.push("Missing package description".to_string());
    }
    if recipe.package.license.is_none() {
        warnings.push("Missing package license".to_string());
    }

    if recipe.build.install.as_ref().is_none_or(|i| i.is_empty()) {
        warnings.push("No install command specified".to_string());
    } else if !recipe
        .build
        .install
        .iter()
        .flat_map(|i| i.iter())
        .any(|c| c.contains("%(destdir)s"))
    {
        warnings.push("Install command does not reference %(destdir)s".to_string());
    }

    if recipe.plate.copy.is_empty() {
        warnings.push("No [[plate.copy]] rules; the package will be empty".to_string());
    }

    Ok(warnings)
}

/// Relative, and never climbs out of its root with `..`
pub(crate) fn is_relative_inside(path: &str) -> bool {
    Path::new(path)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = r#"
[package]
name = "test"
version = "1.0"
description = "A test package"
license = "MIT"

[source]
git = "https://example.com/test.git"

[build]
install = "make install DESTDIR=%(destdir)s"

[[plate.copy]]
pattern = "*"
src = "install"
"#;

    #[test]
    fn test_parse_valid_recipe() {
        let recipe = parse_recipe(BASE).unwrap();
        assert_eq!(recipe.package.name, "test");
        assert!(validate_recipe(&recipe).unwrap().is_empty());
    }

    #[test]
    fn test_parse_invalid_recipe() {
        let content = "this is not valid toml at all {}";
        assert!(parse_recipe(content).is_err());
    }

    #[test]
    fn test_parse_missing_file() {
        let err = parse_recipe_file(Path::new("/nonexistent/recipe.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read recipe file"));
    }

    #[test]
    fn test_validate_empty_name() {
        let recipe = parse_recipe(&BASE.replace("name = \"test\"", "name = \"\"")).unwrap();
        assert!(validate_recipe(&recipe).is_err());
    }

    #[test]
    fn test_validate_source_both_kinds() {
        let content = BASE.replace(
            "git = \"https://example.com/test.git\"",
            "git = \"https://example.com/test.git\"\npath = \"/tmp/test\"",
        );
        let recipe = parse_recipe(&content).unwrap();
        let err = validate_recipe(&recipe).unwrap_err();
        assert!(err.to_string().contains("exactly one"));
    }

    #[test]
    fn test_validate_duplicate_axis() {
        let content = BASE.replace(
            "license = \"MIT\"",
            "license = \"MIT\"\nsettings = [\"os\", \"arch\", \"os\"]",
        );
        let recipe = parse_recipe(&content).unwrap();
        assert!(validate_recipe(&recipe).is_err());
    }

    #[test]
    fn test_validate_shadowed_variable() {
        let content = format!("{}\n[variables]\ndestdir = \"/tmp\"\n", BASE);
        let recipe = parse_recipe(&content).unwrap();
        let err = validate_recipe(&recipe).unwrap_err();
        assert!(err.to_string().contains("destdir"));
    }

    #[test]
    fn test_validate_escaping_copy_path() {
        let recipe = parse_recipe(&BASE.replace("src = \"install\"", "src = \"../etc\"")).unwrap();
        assert!(validate_recipe(&recipe).is_err());

        let recipe = parse_recipe(&BASE.replace("src = \"install\"", "src = \"/etc\"")).unwrap();
        assert!(validate_recipe(&recipe).is_err());
    }

    #[test]
    fn test_validate_escaping_copy_pattern() {
        let content = BASE.replace("pattern = \"*\"", "pattern = \"../LICENSE\"");
        let recipe = parse_recipe(&content).unwrap();
        let err = validate_recipe(&recipe).unwrap_err();
        assert!(err.to_string().contains("../LICENSE"));
    }

    #[test]
    fn test_validate_axis_shadowing_builtin() {
        for axis in ["destdir", "name", "version", "jobs", "build_dir"] {
            let content = BASE.replace(
                "license = \"MIT\"",
                &format!("license = \"MIT\"\nsettings = [\"os\", \"{}\"]", axis),
            );
            let recipe = parse_recipe(&content).unwrap();
            let err = validate_recipe(&recipe).unwrap_err();
            assert!(err.to_string().contains("shadows"), "axis {} accepted", axis);
        }
    }

    #[test]
    fn test_validate_warnings() {
        let content = r#"
[package]
name = "test"
version = "1.0"

[source]
path = "/tmp/test"

[build]
install = "make install"
"#;

        let recipe = parse_recipe(content).unwrap();
        let warnings = validate_recipe(&recipe).unwrap();
        assert!(warnings.iter().any(|w| w.contains("description")));
        assert!(warnings.iter().any(|w| w.contains("license")));
        assert!(warnings.iter().any(|w| w.contains("%(destdir)s")));
        assert!(warnings.iter().any(|w| w.contains("plate.copy")));
    }

    #[test]
    fn test_shipped_recipe_is_clean() {
        let recipe = parse_recipe(include_str!("../../recipes/libeasyyaml.toml")).unwrap();
        assert!(validate_recipe(&recipe).unwrap().is_empty());
    }
}
