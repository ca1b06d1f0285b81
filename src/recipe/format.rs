// src/recipe/format.rs

//! Recipe file format definitions
//!
//! Recipes are TOML files that describe where a package's source comes from,
//! the shell commands that build and stage it, and which staged files make up
//! the final package.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Variable names the kitchen always defines
pub const BUILTIN_VARIABLES: &[&str] = &["name", "version", "destdir", "build_dir", "jobs"];

/// A complete recipe for building a package
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    /// Package metadata
    pub package: PackageSection,

    /// Where the source comes from
    pub source: SourceSection,

    /// Build instructions
    #[serde(default)]
    pub build: BuildSection,

    /// Packaging copy rules
    #[serde(default)]
    pub plate: PlateSection,

    /// Variables for substitution (optional)
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

impl Recipe {
    /// Substitute variables in a string
    ///
    /// Replaces `%(name)s` patterns. Custom variables from the `[variables]`
    /// section go first so their values may themselves use the built-ins
    /// (`name`, `version`, `destdir`, settings, ...) passed in `builtins`.
    pub fn substitute(&self, template: &str, builtins: &BTreeMap<String, String>) -> String {
        let mut result = template.to_string();

        for (key, value) in &self.variables {
            result = result.replace(&format!("%({})s", key), value);
        }

        for (key, value) in builtins {
            result = result.replace(&format!("%({})s", key), value);
        }

        result
    }

    /// Variables derived from the package section alone
    pub fn metadata_variables(&self) -> BTreeMap<String, String> {
        let mut vars = BTreeMap::new();
        vars.insert("name".to_string(), self.package.name.clone());
        vars.insert("version".to_string(), self.package.version.clone());
        vars
    }

    /// `<name>-<version>`, used for the work root and package directory
    pub fn package_ref(&self) -> String {
        format!("{}-{}", self.package.name, self.package.version)
    }
}

/// Package metadata section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageSection {
    /// Package name
    pub name: String,

    /// Package version
    pub version: String,

    /// License identifier (SPDX)
    #[serde(default)]
    pub license: Option<String>,

    /// Author, usually `Name <email>`
    #[serde(default)]
    pub author: Option<String>,

    /// Upstream URL
    #[serde(default)]
    pub homepage: Option<String>,

    /// Full description
    #[serde(default)]
    pub description: Option<String>,

    /// Topic tags
    #[serde(default)]
    pub topics: Vec<String>,

    /// Build-setting axes consumed from the calling environment
    ///
    /// Passed through to the build untouched, e.g.
    /// `["os", "compiler", "build_type", "arch"]`.
    #[serde(default)]
    pub settings: Vec<String>,
}

/// Source section: exactly one of `git` or `path`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceSection {
    /// Version control URL, cloned into the source directory
    #[serde(default)]
    pub git: Option<String>,

    /// Commit or tag to check out after cloning
    #[serde(default)]
    pub revision: Option<String>,

    /// Local directory copied into the source directory
    #[serde(default)]
    pub path: Option<String>,
}

/// Resolved view of the source section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind<'a> {
    Git {
        url: &'a str,
        revision: Option<&'a str>,
    },
    Path(&'a str),
}

impl SourceSection {
    /// The kind of source, or `None` if the section is ambiguous or empty
    pub fn kind(&self) -> Option<SourceKind<'_>> {
        match (&self.git, &self.path) {
            (Some(url), None) => Some(SourceKind::Git {
                url,
                revision: self.revision.as_deref(),
            }),
            (None, Some(path)) if self.revision.is_none() => Some(SourceKind::Path(path)),
            _ => None,
        }
    }
}

/// One command or an ordered list of commands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandList {
    One(String),
    Many(Vec<String>),
}

impl CommandList {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            CommandList::One(cmd) => std::slice::from_ref(cmd),
            CommandList::Many(cmds) => cmds,
        };
        slice.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.iter().all(|c| c.trim().is_empty())
    }
}

/// Build instructions section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSection {
    /// Tooling bootstrap commands (libtoolize, autoreconf, ...)
    #[serde(default)]
    pub setup: Option<CommandList>,

    /// Configure command(s)
    ///
    /// Supports `%(variable)s` substitution.
    #[serde(default)]
    pub configure: Option<CommandList>,

    /// Make/build command(s)
    #[serde(default)]
    pub make: Option<CommandList>,

    /// Test suite command(s); a failure aborts the build
    #[serde(default)]
    pub check: Option<CommandList>,

    /// Install command(s)
    ///
    /// Must install to `%(destdir)s`.
    #[serde(default)]
    pub install: Option<CommandList>,

    /// Post-install commands
    #[serde(default)]
    pub post_install: Option<CommandList>,

    /// Environment variables to set during build
    #[serde(default)]
    pub environment: BTreeMap<String, String>,

    /// Working directory within source (relative path)
    #[serde(default)]
    pub workdir: Option<String>,

    /// Staging directory, relative to the build working directory
    #[serde(default = "default_destdir")]
    pub destdir: String,

    /// Number of parallel jobs (default: kitchen setting)
    #[serde(default)]
    pub jobs: Option<u32>,
}

fn default_destdir() -> String {
    "install".to_string()
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            setup: None,
            configure: None,
            make: None,
            check: None,
            install: None,
            post_install: None,
            environment: BTreeMap::new(),
            workdir: None,
            destdir: default_destdir(),
            jobs: None,
        }
    }
}

impl BuildSection {
    /// All build commands in execution order, labelled by step
    pub fn steps(&self) -> Vec<(&'static str, &str)> {
        let ordered = [
            ("setup", &self.setup),
            ("configure", &self.configure),
            ("make", &self.make),
            ("check", &self.check),
            ("install", &self.install),
            ("post_install", &self.post_install),
        ];

        ordered
            .into_iter()
            .filter_map(|(label, cmds)| cmds.as_ref().map(|c| (label, c)))
            .flat_map(|(label, cmds)| {
                cmds.iter()
                    .filter(|c| !c.trim().is_empty())
                    .map(move |c| (label, c))
            })
            .collect()
    }
}

/// Packaging section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlateSection {
    /// Copy rules applied in order
    #[serde(default)]
    pub copy: Vec<CopyRule>,
}

/// Copy files matching `pattern` under `src` (relative to the build
/// directory) into `dst` (relative to the package directory)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyRule {
    pub pattern: String,

    #[serde(default = "default_dot")]
    pub src: String,

    #[serde(default = "default_dot")]
    pub dst: String,

    /// Patterns to skip even if they match
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_dot() -> String {
    ".".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIBEASYYAML: &str = include_str!("../../recipes/libeasyyaml.toml");

    #[test]
    fn test_parse_shipped_recipe() {
        let recipe: Recipe = toml::from_str(LIBEASYYAML).unwrap();

        assert_eq!(recipe.package.name, "libeasyyaml");
        assert_eq!(recipe.package.version, "1.0.0");
        assert_eq!(recipe.package.license.as_deref(), Some("MIT"));
        assert_eq!(recipe.package.topics, vec!["yaml", "parse", "schema"]);
        assert_eq!(
            recipe.package.settings,
            vec!["os", "compiler", "build_type", "arch"]
        );
        assert_eq!(
            recipe.source.kind(),
            Some(SourceKind::Git {
                url: "https://github.com/mwri/libeasyyaml",
                revision: None
            })
        );
        assert_eq!(recipe.plate.copy.len(), 3);
        assert_eq!(recipe.plate.copy[1].pattern, "easyyaml.h");
        assert_eq!(recipe.plate.copy[1].dst, "include");
    }

    #[test]
    fn test_build_steps_in_order() {
        let recipe: Recipe = toml::from_str(LIBEASYYAML).unwrap();
        let steps = recipe.build.steps();

        let labels: Vec<&str> = steps.iter().map(|(l, _)| *l).collect();
        assert_eq!(
            labels,
            vec!["setup", "setup", "configure", "make", "check", "install"]
        );
        assert_eq!(steps[0].1, "libtoolize");
        assert_eq!(steps[1].1, "autoreconf -i");
        assert_eq!(steps[4].1, "make test");
    }

    #[test]
    fn test_variable_substitution() {
        let recipe: Recipe = toml::from_str(LIBEASYYAML).unwrap();
        let mut builtins = recipe.metadata_variables();
        builtins.insert("destdir".to_string(), "/work/src/install".to_string());

        let configure = recipe.build.configure.as_ref().unwrap().iter().next().unwrap();
        assert_eq!(
            recipe.substitute(configure, &builtins),
            "./configure CFLAGS=-O3 --prefix=/usr/local"
        );

        let install = recipe.build.install.as_ref().unwrap().iter().next().unwrap();
        assert_eq!(
            recipe.substitute(install, &builtins),
            "make install DESTDIR=/work/src/install"
        );
    }

    #[test]
    fn test_custom_variable_may_use_builtins() {
        let recipe: Recipe = toml::from_str(
            r#"
[package]
name = "hello"
version = "2.1"

[source]
path = "."

[variables]
tarball = "%(name)s-%(version)s.tar.gz"
"#,
        )
        .unwrap();

        let out = recipe.substitute("dist/%(tarball)s", &recipe.metadata_variables());
        assert_eq!(out, "dist/hello-2.1.tar.gz");
    }

    #[test]
    fn test_minimal_recipe_defaults() {
        let recipe: Recipe = toml::from_str(
            r#"
[package]
name = "hello"
version = "1.0"

[source]
path = "/src/hello"
"#,
        )
        .unwrap();

        assert_eq!(recipe.build.destdir, "install");
        assert!(recipe.build.steps().is_empty());
        assert!(recipe.plate.copy.is_empty());
        assert!(recipe.package.settings.is_empty());
        assert_eq!(recipe.source.kind(), Some(SourceKind::Path("/src/hello")));
        assert_eq!(recipe.package_ref(), "hello-1.0");
    }

    #[test]
    fn test_source_kind_ambiguous() {
        let both = SourceSection {
            git: Some("https://example.com/x".to_string()),
            revision: None,
            path: Some("/tmp/x".to_string()),
        };
        assert_eq!(both.kind(), None);

        assert_eq!(SourceSection::default().kind(), None);

        let path_with_rev = SourceSection {
            git: None,
            revision: Some("v1".to_string()),
            path: Some("/tmp/x".to_string()),
        };
        assert_eq!(path_with_rev.kind(), None);
    }

    #[test]
    fn test_copy_rule_defaults() {
        let recipe: Recipe = toml::from_str(
            r#"
[package]
name = "x"
version = "1"

[source]
path = "."

[[plate.copy]]
pattern = "LICENSE"
"#,
        )
        .unwrap();

        let rule = &recipe.plate.copy[0];
        assert_eq!(rule.src, ".");
        assert_eq!(rule.dst, ".");
        assert!(rule.exclude.is_empty());
    }

    #[test]
    fn test_command_list_blank_entries_skipped() {
        let build = BuildSection {
            make: Some(CommandList::Many(vec![
                "make".to_string(),
                "  ".to_string(),
                "make docs".to_string(),
            ])),
            check: Some(CommandList::One(String::new())),
            ..Default::default()
        };

        assert_eq!(build.steps(), vec![("make", "make"), ("make", "make docs")]);
        assert!(build.check.as_ref().unwrap().is_empty());
    }
}
