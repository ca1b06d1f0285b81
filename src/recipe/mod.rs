// src/recipe/mod.rs

//! Recipe system for fetching, building and packaging third-party libraries
//!
//! Recipes define how to turn an upstream project into a package:
//! - Package metadata (name, version, license, topics, setting axes)
//! - Where the source comes from (a git URL or a local directory)
//! - Build instructions (setup, configure, make, check, install)
//! - Copy rules laying out the final package
//!
//! # Culinary Terminology
//!
//! - **Recipe**: The build specification (like a recipe card)
//! - **Kitchen**: Holds configuration and runs recipes
//! - **Cook**: One run of one recipe
//! - **Prep**: Fetch the source
//! - **Simmer**: The actual build process
//! - **Plate**: Copy staged artifacts into the package layout
//!
//! # Example Recipe
//!
//! ```toml
//! [package]
//! name = "libeasyyaml"
//! version = "1.0.0"
//! settings = ["os", "compiler", "build_type", "arch"]
//!
//! [source]
//! git = "https://github.com/mwri/libeasyyaml"
//!
//! [build]
//! setup = ["libtoolize", "autoreconf -i"]
//! configure = "./configure CFLAGS=-O3 --prefix=/usr/local"
//! make = "make"
//! check = "make test"
//! install = "make install DESTDIR=%(destdir)s"
//!
//! [[plate.copy]]
//! pattern = "easyyaml.h"
//! src = "install/usr/local/include"
//! dst = "include"
//! ```

mod format;
pub mod kitchen;
pub mod parser;
pub mod settings;

pub use format::{
    BuildSection, CommandList, CopyRule, PackageSection, PlateSection, Recipe, SourceKind,
    SourceSection, BUILTIN_VARIABLES,
};
pub use kitchen::{
    CommandRunner, ConfigFile, Cook, CookResult, Kitchen, KitchenConfig, Phase, ShellRunner,
    StepCommand, StepOutput, WorkLayout,
};
pub use parser::{parse_recipe, parse_recipe_file, validate_recipe};
pub use settings::{parse_assignment, Settings};
