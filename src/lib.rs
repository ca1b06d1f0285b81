// src/lib.rs

//! Larder: a package recipe runner
//!
//! Fetches a library's source, drives its build (configure, make, test,
//! install into a staging directory) and copies the staged artifacts into a
//! package layout, strictly in sequence and failing fast.
//!
//! # Architecture
//!
//! - Recipes: declarative TOML with scripted build steps
//! - Kitchen: runs the source, build and package phases
//! - Manifests: deterministic SHA-256 listings of cooked packages

mod error;
pub mod hash;
pub mod manifest;
pub mod recipe;

pub use error::{Error, Result};
pub use manifest::{PackageManifest, VerifyReport};
pub use recipe::{CookResult, Kitchen, KitchenConfig, Phase, Recipe, Settings};
