// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use larder::recipe::{parse_recipe, Kitchen, KitchenConfig, Recipe, Settings};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Build commands for the fixture project, standing in for autotools
pub const CONFIGURE: &str = "echo prefix=%(prefix)s > config.status";
pub const MAKE: &str = "mkdir -p .libs && cp easyyaml.c .libs/libeasyyaml.so.1.0.0";
pub const CHECK: &str = "test -f config.status && test -f .libs/libeasyyaml.so.1.0.0";
pub const INSTALL: &str = "mkdir -p %(destdir)s/usr/local/lib %(destdir)s/usr/local/include \
    && cp .libs/libeasyyaml.so.1.0.0 %(destdir)s/usr/local/lib/ \
    && ln -sf libeasyyaml.so.1.0.0 %(destdir)s/usr/local/lib/libeasyyaml.so \
    && cp easyyaml.h %(destdir)s/usr/local/include/";

/// A scratch area holding an upstream project and the kitchen directories.
///
/// Keep the value alive for the duration of the test; dropping it removes
/// everything.
pub struct Fixture {
    pub temp_dir: TempDir,
    pub upstream: PathBuf,
}

impl Fixture {
    /// Lay out a small C library project with a header and a license
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().unwrap();
        let upstream = temp_dir.path().join("upstream");
        fs::create_dir_all(&upstream).unwrap();

        fs::write(upstream.join("easyyaml.h"), "int easyyaml_parse(const char *);\n").unwrap();
        fs::write(upstream.join("easyyaml.c"), "int easyyaml_parse(const char *s) { return 0; }\n")
            .unwrap();
        fs::write(upstream.join("LICENSE"), "MIT License\n").unwrap();

        Self { temp_dir, upstream }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config(&self) -> KitchenConfig {
        KitchenConfig {
            build_root: self.root().join("build"),
            output_dir: self.root().join("packages"),
            jobs: 2,
            ..KitchenConfig::default()
        }
    }

    pub fn kitchen(&self) -> Kitchen {
        Kitchen::new(self.config())
    }

    /// The fixture recipe with its check and install commands replaced
    pub fn recipe_with(&self, check: &str, install: &str) -> Recipe {
        let content = format!(
            r#"
[package]
name = "libeasyyaml"
version = "1.0.0"
license = "MIT"
description = "Simple YAML parsing library"
settings = ["build_type", "arch"]

[source]
path = "{upstream}"

[build]
configure = "{configure}"
make = "{make}"
check = "{check}"
install = "{install}"

[variables]
prefix = "/usr/local"

[[plate.copy]]
pattern = "*"
src = "install/usr/local/lib"
dst = "lib"

[[plate.copy]]
pattern = "easyyaml.h"
src = "install/usr/local/include"
dst = "include"

[[plate.copy]]
pattern = "LICENSE"
"#,
            upstream = self.upstream.display(),
            configure = CONFIGURE,
            make = MAKE,
            check = check,
            install = install,
        );
        parse_recipe(&content).unwrap()
    }

    pub fn recipe(&self) -> Recipe {
        self.recipe_with(CHECK, INSTALL)
    }
}

/// Settings as the command line resolves them
pub fn release_settings(recipe: &Recipe) -> Settings {
    let mut defaults = Settings::new();
    defaults.set("arch", "x86_64");
    let overrides = vec![("build_type".to_string(), "Release".to_string())];
    Settings::resolve(&recipe.package.settings, &defaults, &overrides).unwrap()
}

/// Every path under `dir`, relative and sorted
pub fn list_tree(dir: &Path) -> Vec<String> {
    let mut paths: Vec<String> = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .follow_links(false)
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| !e.file_type().is_dir())
        .map(|e| e.path().strip_prefix(dir).unwrap().to_string_lossy().into_owned())
        .collect();
    paths.sort();
    paths
}
