use instcheck_schema::{BuildOptions, ManifestEntry, NormalizedManifest};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// A configuration-dependent check on the generated manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum PolicyRule {
    /// pkg-config generation disabled: no `.pc` file may be installed.
    ForbidPkgConfig,
    /// Documentation disabled: nothing may be installed under `dir`.
    ForbidDocs { dir: String },
    /// Examples disabled: nothing may be installed under `dir`.
    ForbidExamples { dir: String },
    /// Tools disabled: nothing may be installed under `dir`.
    ForbidTools { dir: String },
    /// Shared-only build: no static archive may be installed.
    ForbidStaticArchives,
    /// Binding disabled: reference entries under `dir` are expected to be missing.
    ExemptBinding { dir: String },
}

impl PolicyRule {
    fn forbids(&self, entry: &ManifestEntry) -> bool {
        match self {
            Self::ForbidPkgConfig => entry.has_extension(".pc"),
            Self::ForbidStaticArchives => entry.has_extension(".a"),
            Self::ForbidDocs { dir } | Self::ForbidExamples { dir } | Self::ForbidTools { dir } => {
                entry.is_under(dir)
            }
            Self::ExemptBinding { .. } => false,
        }
    }

    /// Entries of `generated` that break this rule, in sorted order.
    fn offending(&self, generated: &NormalizedManifest) -> Vec<ManifestEntry> {
        generated.iter().filter(|e| self.forbids(e)).cloned().collect()
    }
}

impl fmt::Display for PolicyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ForbidPkgConfig => {
                f.write_str("pkg-config file installed but pkg-config generation is disabled")
            }
            Self::ForbidDocs { dir } => {
                write!(f, "files in '{dir}' installed but documentation is disabled")
            }
            Self::ForbidExamples { dir } => {
                write!(f, "files in '{dir}' installed but examples are disabled")
            }
            Self::ForbidTools { dir } => {
                write!(f, "files in '{dir}' installed but tools are disabled")
            }
            Self::ForbidStaticArchives => {
                f.write_str("static library files (.a) installed in a shared-only build")
            }
            Self::ExemptBinding { dir } => {
                write!(f, "entries under '{dir}' exempt because the binding is disabled")
            }
        }
    }
}

/// A hard error raised by one policy rule, with every offending entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyViolation {
    #[serde(flatten)]
    pub rule: PolicyRule,
    pub message: String,
    pub paths: Vec<ManifestEntry>,
}

impl fmt::Display for PolicyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let paths: Vec<&str> = self.paths.iter().map(ManifestEntry::as_str).collect();
        write!(f, "{}: {}", self.message, paths.join(", "))
    }
}

/// Policy rules derived from one run's [`BuildOptions`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyFilter {
    rules: Vec<PolicyRule>,
}

/// Result of evaluating a [`PolicyFilter`] against a generated manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyOutcome {
    pub violations: Vec<PolicyViolation>,
    /// Subtrees whose reference entries may be absent from the generated manifest.
    pub exempt_dirs: Vec<String>,
}

impl PolicyOutcome {
    pub fn is_exempt(&self, entry: &ManifestEntry) -> bool {
        self.exempt_dirs.iter().any(|dir| entry.is_under(dir))
    }
}

impl PolicyFilter {
    /// One rule per disabled (or, for shared libs, enabled) option, in a fixed order.
    pub fn from_options(options: &BuildOptions) -> Self {
        let layout = &options.layout;
        let mut rules = Vec::new();
        if !options.pkg_config {
            rules.push(PolicyRule::ForbidPkgConfig);
        }
        if !options.docs {
            rules.push(PolicyRule::ForbidDocs {
                dir: layout.docs_dir.clone(),
            });
        }
        if !options.examples {
            rules.push(PolicyRule::ForbidExamples {
                dir: layout.examples_dir.clone(),
            });
        }
        if !options.tools {
            rules.push(PolicyRule::ForbidTools {
                dir: layout.tools_dir.clone(),
            });
        }
        if options.shared_libs {
            rules.push(PolicyRule::ForbidStaticArchives);
        }
        if !options.bindings {
            rules.push(PolicyRule::ExemptBinding {
                dir: layout.binding_dir.clone(),
            });
        }
        Self { rules }
    }

    pub fn rules(&self) -> &[PolicyRule] {
        &self.rules
    }

    pub fn evaluate(&self, generated: &NormalizedManifest) -> PolicyOutcome {
        let mut outcome = PolicyOutcome::default();
        for rule in &self.rules {
            if let PolicyRule::ExemptBinding { dir } = rule {
                outcome.exempt_dirs.push(dir.clone());
                continue;
            }
            let paths = rule.offending(generated);
            if !paths.is_empty() {
                outcome.violations.push(PolicyViolation {
                    rule: rule.clone(),
                    message: rule.to_string(),
                    paths,
                });
            }
        }
        outcome
    }

    /// Remove exempted entries from `missing`, returning the ones removed.
    pub fn apply_exemptions(
        outcome: &PolicyOutcome,
        missing: &mut BTreeSet<ManifestEntry>,
    ) -> BTreeSet<ManifestEntry> {
        let exempted: BTreeSet<ManifestEntry> = missing
            .iter()
            .filter(|e| outcome.is_exempt(e))
            .cloned()
            .collect();
        missing.retain(|e| !exempted.contains(e));
        exempted
    }
}
