// src/recipe/settings.rs

//! Build-setting axes (os, compiler, build_type, arch, ...)
//!
//! Settings are passed through to the build untouched: the kitchen exports
//! them as `LARDER_SETTING_<AXIS>` and as `%(axis)s` variables, and records
//! them in the package manifest. Nothing here interprets the values.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;

/// Environment variable prefix for exported settings
pub const SETTING_ENV_PREFIX: &str = "LARDER_SETTING_";

/// Resolved setting values, keyed by axis
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    values: BTreeMap<String, String>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults detected from the host
    pub fn detect() -> Self {
        let mut settings = Self::new();
        settings.set("os", host_os());
        settings.set("arch", host_arch());
        settings.set("compiler", host_compiler());
        settings.set("build_type", "Release");
        settings
    }

    pub fn set(&mut self, axis: impl Into<String>, value: impl Into<String>) {
        self.values.insert(axis.into(), value.into());
    }

    pub fn get(&self, axis: &str) -> Option<&str> {
        self.values.get(axis).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    /// Resolve the settings a recipe declares
    ///
    /// Starts from `defaults` (host detection plus config file), applies the
    /// command-line `overrides`, and keeps only the declared `axes`.
    /// Overriding an undeclared axis, or leaving a declared one without a
    /// value, is an error.
    pub fn resolve(
        axes: &[String],
        defaults: &Settings,
        overrides: &[(String, String)],
    ) -> Result<Settings> {
        let mut merged = defaults.clone();

        for (axis, value) in overrides {
            if !axes.iter().any(|a| a == axis) {
                return Err(Error::InvalidSetting(format!(
                    "'{}' is not a setting of this recipe (declared: {})",
                    axis,
                    if axes.is_empty() {
                        "none".to_string()
                    } else {
                        axes.join(", ")
                    }
                )));
            }
            merged.set(axis.clone(), value.clone());
        }

        let mut resolved = Settings::new();
        for axis in axes {
            match merged.get(axis) {
                Some(value) => resolved.set(axis.clone(), value),
                None => {
                    return Err(Error::InvalidSetting(format!(
                        "no value for setting '{}'; pass -s {}=<value>",
                        axis, axis
                    )));
                }
            }
        }

        Ok(resolved)
    }

    /// Environment variables exporting these settings to build commands
    pub fn env_vars(&self) -> Vec<(String, String)> {
        self.values
            .iter()
            .map(|(axis, value)| {
                (
                    format!("{}{}", SETTING_ENV_PREFIX, axis.to_ascii_uppercase()),
                    value.clone(),
                )
            })
            .collect()
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (axis, value) in &self.values {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", axis, value)?;
            first = false;
        }
        Ok(())
    }
}

/// Parse a `axis=value` assignment from the command line
pub fn parse_assignment(s: &str) -> Result<(String, String)> {
    let (axis, value) = s
        .split_once('=')
        .ok_or_else(|| Error::InvalidSetting(format!("expected axis=value, got '{}'", s)))?;

    let axis = axis.trim();
    let value = value.trim();
    if axis.is_empty() || value.is_empty() {
        return Err(Error::InvalidSetting(format!(
            "expected axis=value, got '{}'",
            s
        )));
    }

    Ok((axis.to_string(), value.to_string()))
}

fn host_os() -> String {
    match std::env::consts::OS {
        "linux" => "Linux".to_string(),
        "macos" => "Macos".to_string(),
        "windows" => "Windows".to_string(),
        "freebsd" => "FreeBSD".to_string(),
        other => other.to_string(),
    }
}

fn host_arch() -> String {
    match std::env::consts::ARCH {
        "aarch64" => "armv8".to_string(),
        "x86" => "x86".to_string(),
        other => other.to_string(),
    }
}

fn host_compiler() -> String {
    std::env::var("CC")
        .ok()
        .and_then(|cc| {
            cc.split_whitespace()
                .next()
                .and_then(|prog| prog.rsplit('/').next())
                .map(str::to_string)
        })
        .filter(|cc| !cc.is_empty())
        .unwrap_or_else(|| "gcc".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axes(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_detect_fills_standard_axes() {
        let settings = Settings::detect();
        for axis in ["os", "arch", "compiler", "build_type"] {
            assert!(settings.get(axis).is_some(), "missing {}", axis);
        }
        assert_eq!(settings.get("build_type"), Some("Release"));
    }

    #[test]
    fn test_resolve_keeps_declared_axes_only() {
        let mut defaults = Settings::new();
        defaults.set("os", "Linux");
        defaults.set("arch", "x86_64");
        defaults.set("compiler", "gcc");

        let resolved = Settings::resolve(&axes(&["os", "arch"]), &defaults, &[]).unwrap();
        assert_eq!(resolved.get("os"), Some("Linux"));
        assert_eq!(resolved.get("arch"), Some("x86_64"));
        assert_eq!(resolved.get("compiler"), None);
    }

    #[test]
    fn test_resolve_applies_overrides() {
        let mut defaults = Settings::new();
        defaults.set("build_type", "Release");

        let overrides = vec![("build_type".to_string(), "Debug".to_string())];
        let resolved = Settings::resolve(&axes(&["build_type"]), &defaults, &overrides).unwrap();
        assert_eq!(resolved.get("build_type"), Some("Debug"));
    }

    #[test]
    fn test_resolve_rejects_undeclared_override() {
        let overrides = vec![("os".to_string(), "Linux".to_string())];
        let err = Settings::resolve(&axes(&["arch"]), &Settings::new(), &overrides).unwrap_err();
        assert!(matches!(err, Error::InvalidSetting(_)));
        assert!(err.to_string().contains("declared: arch"));
    }

    #[test]
    fn test_resolve_requires_value_for_custom_axis() {
        let err = Settings::resolve(&axes(&["libc"]), &Settings::detect(), &[]).unwrap_err();
        assert!(err.to_string().contains("-s libc=<value>"));

        let overrides = vec![("libc".to_string(), "musl".to_string())];
        let resolved =
            Settings::resolve(&axes(&["libc"]), &Settings::detect(), &overrides).unwrap();
        assert_eq!(resolved.get("libc"), Some("musl"));
    }

    #[test]
    fn test_env_vars_uppercase_axis() {
        let mut settings = Settings::new();
        settings.set("build_type", "Release");
        settings.set("os", "Linux");

        assert_eq!(
            settings.env_vars(),
            vec![
                ("LARDER_SETTING_BUILD_TYPE".to_string(), "Release".to_string()),
                ("LARDER_SETTING_OS".to_string(), "Linux".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("os=Linux").unwrap(),
            ("os".to_string(), "Linux".to_string())
        );
        assert_eq!(
            parse_assignment(" compiler = clang ").unwrap(),
            ("compiler".to_string(), "clang".to_string())
        );
        assert!(parse_assignment("os").is_err());
        assert!(parse_assignment("=Linux").is_err());
        assert!(parse_assignment("os=").is_err());
    }

    #[test]
    fn test_display() {
        let mut settings = Settings::new();
        settings.set("os", "Linux");
        settings.set("arch", "x86_64");
        assert_eq!(settings.to_string(), "arch=x86_64, os=Linux");
    }
}
