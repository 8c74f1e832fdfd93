//! TOML check profile: build options, install layout, and normalization
//! settings for one package configuration.
//!
//! Every field is optional. Command-line flags are applied on top of a loaded
//! profile before it is resolved into [`BuildOptions`], [`LoadOptions`] and
//! [`NormalizeOptions`].

use crate::manifest::LoadOptions;
use crate::normalize::{LibSuffixScope, NormalizeOptions};
use crate::options::{parse_bool_flag, BuildOptions, InstallLayout};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("layout.{0} must not be empty")]
    EmptyDirectory(&'static str),
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CheckProfile {
    #[serde(default)]
    pub options: OptionsSection,
    #[serde(default)]
    pub layout: InstallLayout,
    #[serde(default)]
    pub normalize: NormalizeSection,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct OptionsSection {
    #[serde(default, deserialize_with = "de_flag")]
    pub shared_libs: Option<bool>,
    #[serde(default, deserialize_with = "de_flag")]
    pub pkg_config: Option<bool>,
    #[serde(default, deserialize_with = "de_flag")]
    pub docs: Option<bool>,
    #[serde(default, deserialize_with = "de_flag")]
    pub examples: Option<bool>,
    #[serde(default, deserialize_with = "de_flag")]
    pub tools: Option<bool>,
    #[serde(default, deserialize_with = "de_flag")]
    pub bindings: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct NormalizeSection {
    #[serde(default)]
    pub install_prefix: Option<String>,
    #[serde(default)]
    pub root_marker: Option<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub library_suffix: Option<String>,
    #[serde(default)]
    pub library_suffix_scope: Option<LibSuffixScope>,
}

/// Accept either a TOML boolean or a CMake-style string such as `"OFF"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum FlagValue {
    Bool(bool),
    Text(String),
}

fn de_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    match Option::<FlagValue>::deserialize(deserializer)? {
        None => Ok(None),
        Some(FlagValue::Bool(b)) => Ok(Some(b)),
        Some(FlagValue::Text(s)) => parse_bool_flag(&s)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

impl CheckProfile {
    /// Resolve the build options, falling back to [`BuildOptions::default`]
    /// for anything left unset.
    pub fn build_options(&self) -> Result<BuildOptions, ConfigError> {
        self.validate_layout()?;
        let defaults = BuildOptions::default();
        let o = &self.options;
        Ok(BuildOptions {
            shared_libs: o.shared_libs.unwrap_or(defaults.shared_libs),
            pkg_config: o.pkg_config.unwrap_or(defaults.pkg_config),
            docs: o.docs.unwrap_or(defaults.docs),
            examples: o.examples.unwrap_or(defaults.examples),
            tools: o.tools.unwrap_or(defaults.tools),
            bindings: o.bindings.unwrap_or(defaults.bindings),
            layout: normalized_layout(&self.layout),
        })
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            exclude: self.normalize.exclude.clone(),
            root_marker: non_empty(self.normalize.root_marker.as_deref()),
            install_prefix: non_empty(self.normalize.install_prefix.as_deref()),
        }
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            library_suffix: non_empty(self.normalize.library_suffix.as_deref()),
            library_suffix_scope: self.normalize.library_suffix_scope.unwrap_or_default(),
        }
    }

    fn validate_layout(&self) -> Result<(), ConfigError> {
        let l = &self.layout;
        for (name, value) in [
            ("examples_dir", &l.examples_dir),
            ("tools_dir", &l.tools_dir),
            ("docs_dir", &l.docs_dir),
            ("binding_dir", &l.binding_dir),
        ] {
            if value.trim().trim_matches('/').is_empty() {
                return Err(ConfigError::EmptyDirectory(name));
            }
        }
        Ok(())
    }
}

fn normalized_layout(layout: &InstallLayout) -> InstallLayout {
    let clean = |s: &str| s.trim().trim_matches('/').to_owned();
    InstallLayout {
        examples_dir: clean(&layout.examples_dir),
        tools_dir: clean(&layout.tools_dir),
        docs_dir: clean(&layout.docs_dir),
        binding_dir: clean(&layout.binding_dir),
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

pub fn parse_profile_str(input: &str) -> Result<CheckProfile, ConfigError> {
    Ok(toml::from_str(input)?)
}

pub fn load_profile_file(path: impl AsRef<Path>) -> Result<CheckProfile, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_profile_str(&content)
}
