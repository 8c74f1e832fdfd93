use serde::{Deserialize, Serialize};

/// How the package under test was configured.
///
/// Constructed once per run and passed by value; it only drives policy
/// decisions and never touches the manifests themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Shared libraries are the exclusive build mode.
    pub shared_libs: bool,
    pub pkg_config: bool,
    pub docs: bool,
    pub examples: bool,
    pub tools: bool,
    /// Language binding built and installed.
    pub bindings: bool,
    pub layout: InstallLayout,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            shared_libs: false,
            pkg_config: true,
            docs: true,
            examples: true,
            tools: true,
            bindings: true,
            layout: InstallLayout::default(),
        }
    }
}

/// Package-relative directories inspected by the policy rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstallLayout {
    #[serde(default = "default_examples_dir")]
    pub examples_dir: String,
    #[serde(default = "default_tools_dir")]
    pub tools_dir: String,
    #[serde(default = "default_docs_dir")]
    pub docs_dir: String,
    #[serde(default = "default_binding_dir")]
    pub binding_dir: String,
}

impl Default for InstallLayout {
    fn default() -> Self {
        Self {
            examples_dir: default_examples_dir(),
            tools_dir: default_tools_dir(),
            docs_dir: default_docs_dir(),
            binding_dir: default_binding_dir(),
        }
    }
}

fn default_examples_dir() -> String {
    "share/docs/examples".to_owned()
}

fn default_tools_dir() -> String {
    "bin".to_owned()
}

fn default_docs_dir() -> String {
    "share/doc".to_owned()
}

fn default_binding_dir() -> String {
    "python".to_owned()
}

/// Parse a CMake-style boolean (`ON`/`OFF`, `TRUE`/`FALSE`, `YES`/`NO`, `1`/`0`).
pub fn parse_bool_flag(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_uppercase().as_str() {
        "ON" | "TRUE" | "YES" | "Y" | "1" => Ok(true),
        "OFF" | "FALSE" | "NO" | "N" | "0" | "" => Ok(false),
        _ => Err(format!(
            "invalid boolean '{value}', expected ON/OFF, TRUE/FALSE, YES/NO or 1/0"
        )),
    }
}
