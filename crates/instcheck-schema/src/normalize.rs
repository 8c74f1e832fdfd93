use crate::types::{ManifestDigest, ManifestEntry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Shared-library suffixes of the supported platforms (Linux, macOS, Windows).
pub const SHARED_LIBRARY_SUFFIXES: &[&str] = &[".so", ".dylib", ".dll"];

/// Where a configured library-name suffix may be removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LibSuffixScope {
    /// Only paths with a `lib` segment.
    #[default]
    LibraryDir,
    /// Any path carrying a shared-library suffix.
    Anywhere,
}

impl fmt::Display for LibSuffixScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LibraryDir => f.write_str("library-dir"),
            Self::Anywhere => f.write_str("anywhere"),
        }
    }
}

impl std::str::FromStr for LibSuffixScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "library-dir" | "lib" => Ok(Self::LibraryDir),
            "anywhere" | "any" => Ok(Self::Anywhere),
            other => Err(format!(
                "invalid library suffix scope '{other}', expected 'library-dir' or 'anywhere'"
            )),
        }
    }
}

/// Settings that select which normalization rules run.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct NormalizeOptions {
    /// Install-time string inserted into shared-library file names (e.g. `_d`).
    #[serde(default)]
    pub library_suffix: Option<String>,
    #[serde(default)]
    pub library_suffix_scope: LibSuffixScope,
}

/// One step of the normalization pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeRule {
    /// Replace every path segment equal to `from` with `to`.
    RenameSegment { from: String, to: String },
    /// Detach any of these trailing suffixes from the file name.
    DetachSharedSuffix { suffixes: Vec<String> },
    /// Remove `suffix` from the end of a name whose shared suffix was detached.
    StripLibrarySuffix {
        suffix: String,
        scope: LibSuffixScope,
    },
}

/// Path under normalization, and whether a shared-library suffix was detached from it.
#[derive(Debug)]
struct WorkingPath {
    body: String,
    detached: bool,
}

impl NormalizeRule {
    fn apply(&self, path: &mut WorkingPath) {
        match self {
            Self::RenameSegment { from, to } => {
                if path.body.split('/').any(|seg| seg == from) {
                    path.body = path
                        .body
                        .split('/')
                        .map(|seg| if seg == from { to.as_str() } else { seg })
                        .collect::<Vec<_>>()
                        .join("/");
                }
            }
            Self::DetachSharedSuffix { suffixes } => {
                if let Some(stripped) = suffixes
                    .iter()
                    .find_map(|s| strip_file_suffix(&path.body, s))
                {
                    path.body = stripped.to_owned();
                    path.detached = true;
                }
            }
            Self::StripLibrarySuffix { suffix, scope } => {
                if !path.detached || suffix.is_empty() {
                    return;
                }
                let in_scope = match scope {
                    LibSuffixScope::LibraryDir => {
                        let mut segments: Vec<&str> = path.body.split('/').collect();
                        segments.pop();
                        segments.contains(&"lib")
                    }
                    LibSuffixScope::Anywhere => true,
                };
                if in_scope {
                    if let Some(stripped) = strip_file_suffix(&path.body, suffix) {
                        path.body = stripped.to_owned();
                    }
                }
            }
        }
    }
}

/// Strip `suffix` from the end of the file name, leaving a non-empty name.
fn strip_file_suffix<'a>(path: &'a str, suffix: &str) -> Option<&'a str> {
    let stripped = path.strip_suffix(suffix)?;
    if stripped.is_empty() || stripped.ends_with('/') {
        return None;
    }
    Some(stripped)
}

/// Upper bound on rule passes, in case a custom rule list never settles.
const MAX_PASSES: usize = 16;

/// Interpreter for an ordered list of [`NormalizeRule`]s.
///
/// The pipeline is a pure function of its input path. The full rule list is
/// re-run until the path stops changing, so normalizing an already-normalized
/// path is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathNormalizer {
    rules: Vec<NormalizeRule>,
}

impl Default for PathNormalizer {
    fn default() -> Self {
        Self::new(&NormalizeOptions::default())
    }
}

impl PathNormalizer {
    /// Standard pipeline: `lib64` → `lib`, shared suffixes detached, then the
    /// optional library-name suffix.
    pub fn new(options: &NormalizeOptions) -> Self {
        let mut rules = vec![
            NormalizeRule::RenameSegment {
                from: "lib64".to_owned(),
                to: "lib".to_owned(),
            },
            NormalizeRule::DetachSharedSuffix {
                suffixes: SHARED_LIBRARY_SUFFIXES
                    .iter()
                    .map(|s| (*s).to_owned())
                    .collect(),
            },
        ];
        if let Some(suffix) = options.library_suffix.as_deref().filter(|s| !s.is_empty()) {
            rules.push(NormalizeRule::StripLibrarySuffix {
                suffix: suffix.to_owned(),
                scope: options.library_suffix_scope,
            });
        }
        Self { rules }
    }

    /// Build a normalizer from an explicit rule list.
    pub fn with_rules(rules: Vec<NormalizeRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[NormalizeRule] {
        &self.rules
    }

    /// Map a raw relative path to its canonical entry.
    pub fn normalize(&self, path: &str) -> ManifestEntry {
        let mut body = path.to_owned();
        for _ in 0..MAX_PASSES {
            let mut working = WorkingPath {
                body: body.clone(),
                detached: false,
            };
            for rule in &self.rules {
                rule.apply(&mut working);
            }
            if working.body == body {
                break;
            }
            body = working.body;
        }
        ManifestEntry::new(body)
    }

    /// Normalize every path of a loaded manifest.
    pub fn normalize_all<I, S>(&self, paths: I) -> NormalizedManifest
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        paths
            .into_iter()
            .map(|p| self.normalize(p.as_ref()))
            .collect()
    }
}

/// Sorted, deduplicated set of canonical entries. Immutable once built.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct NormalizedManifest {
    entries: BTreeSet<ManifestEntry>,
}

impl FromIterator<ManifestEntry> for NormalizedManifest {
    fn from_iter<T: IntoIterator<Item = ManifestEntry>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a NormalizedManifest {
    type Item = &'a ManifestEntry;
    type IntoIter = std::collections::btree_set::Iter<'a, ManifestEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl NormalizedManifest {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, entry: &ManifestEntry) -> bool {
        self.entries.contains(entry)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries.iter()
    }

    /// Entries of `self` absent from `other`, in sorted order.
    pub fn difference(&self, other: &Self) -> BTreeSet<ManifestEntry> {
        self.entries.difference(&other.entries).cloned().collect()
    }

    /// Blake3 digest over the sorted entries, one per line.
    pub fn digest(&self) -> ManifestDigest {
        let mut hasher = blake3::Hasher::new();
        for entry in &self.entries {
            hasher.update(entry.as_bytes());
            hasher.update(b"\n");
        }
        ManifestDigest::new(hasher.finalize().to_hex().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(path: &str) -> String {
        PathNormalizer::default().normalize(path).into_inner()
    }

    fn with_suffix(suffix: &str, scope: LibSuffixScope) -> PathNormalizer {
        PathNormalizer::new(&NormalizeOptions {
            library_suffix: Some(suffix.to_owned()),
            library_suffix_scope: scope,
        })
    }

    #[test]
    fn lib64_segment_becomes_lib() {
        assert_eq!(norm("lib64/libfoo.a"), "lib/libfoo.a");
        assert_eq!(norm("usr/lib64/cmake/Foo.cmake"), "usr/lib/cmake/Foo.cmake");
        assert_eq!(norm("lib64"), "lib");
    }

    #[test]
    fn lib64_substring_is_not_a_segment() {
        assert_eq!(norm("share/mylib64/x.h"), "share/mylib64/x.h");
        assert_eq!(norm("include/lib64.h"), "include/lib64.h");
    }

    #[test]
    fn all_shared_suffixes_collapse() {
        let so = norm("lib/libfoo.so");
        assert_eq!(so, "lib/libfoo");
        assert_eq!(norm("lib/libfoo.dylib"), so);
        assert_eq!(norm("lib/libfoo.dll"), so);
    }

    #[test]
    fn versioned_shared_object_passes_through() {
        assert_eq!(norm("lib/libfoo.so.32"), "lib/libfoo.so.32");
        assert_eq!(norm("lib/libfoo.3.dylib"), "lib/libfoo.3");
    }

    #[test]
    fn non_library_paths_unchanged() {
        assert_eq!(norm("bin/tool"), "bin/tool");
        assert_eq!(norm("include/foo/bar.h"), "include/foo/bar.h");
        assert_eq!(norm("lib/libfoo.a"), "lib/libfoo.a");
    }

    #[test]
    fn bare_suffix_file_is_kept() {
        assert_eq!(norm("lib/.so"), "lib/.so");
    }

    #[test]
    fn normalization_is_idempotent() {
        let n = PathNormalizer::default();
        for p in [
            "lib64/libfoo.so",
            "lib/libfoo.so.dll",
            "lib64/lib64/x.dylib",
            "bin/tool",
            "lib/libfoo.so.3",
            "lib/libfoo.dll.so.dylib",
        ] {
            let once = n.normalize(p);
            assert_eq!(n.normalize(&once), once, "not idempotent for {p}");
        }
    }

    #[test]
    fn idempotent_with_library_suffix() {
        let n = with_suffix("_d", LibSuffixScope::LibraryDir);
        let once = n.normalize("lib/libfoo_d_d.so");
        assert_eq!(once, "lib/libfoo_d");
        assert_eq!(n.normalize(&once), once);
    }

    #[test]
    fn library_suffix_exposing_shared_suffix_settles() {
        let n = with_suffix("_d", LibSuffixScope::LibraryDir);
        let once = n.normalize("lib/libfoo.so_d.so");
        assert_eq!(once, "lib/libfoo");
        assert_eq!(n.normalize(&once), once);
    }

    #[test]
    fn cyclic_custom_rules_terminate() {
        let n = PathNormalizer::with_rules(vec![
            NormalizeRule::RenameSegment {
                from: "a".to_owned(),
                to: "b".to_owned(),
            },
            NormalizeRule::RenameSegment {
                from: "b".to_owned(),
                to: "a".to_owned(),
            },
        ]);
        assert_eq!(n.normalize("a/x"), "a/x");
    }

    #[test]
    fn library_suffix_removed_inside_lib() {
        let n = with_suffix("-3_2", LibSuffixScope::LibraryDir);
        assert_eq!(n.normalize("lib/libOpenEXR-3_2.so"), "lib/libOpenEXR");
        assert_eq!(n.normalize("lib64/libOpenEXR-3_2.dylib"), "lib/libOpenEXR");
    }

    #[test]
    fn library_suffix_ignored_outside_lib() {
        let n = with_suffix("-3_2", LibSuffixScope::LibraryDir);
        assert_eq!(n.normalize("bin/OpenEXR-3_2.dll"), "bin/OpenEXR-3_2");
    }

    #[test]
    fn library_suffix_anywhere_scope() {
        let n = with_suffix("-3_2", LibSuffixScope::Anywhere);
        assert_eq!(n.normalize("bin/OpenEXR-3_2.dll"), "bin/OpenEXR");
    }

    #[test]
    fn library_suffix_requires_shared_suffix() {
        let n = with_suffix("-3_2", LibSuffixScope::Anywhere);
        assert_eq!(n.normalize("lib/libOpenEXR-3_2.a"), "lib/libOpenEXR-3_2.a");
        assert_eq!(
            n.normalize("include/OpenEXR-3_2"),
            "include/OpenEXR-3_2"
        );
    }

    #[test]
    fn scope_parses_from_str() {
        assert_eq!(
            "library-dir".parse::<LibSuffixScope>().unwrap(),
            LibSuffixScope::LibraryDir
        );
        assert_eq!(
            "ANYWHERE".parse::<LibSuffixScope>().unwrap(),
            LibSuffixScope::Anywhere
        );
        assert!("somewhere".parse::<LibSuffixScope>().is_err());
    }

    #[test]
    fn custom_rule_list() {
        let n = PathNormalizer::with_rules(vec![NormalizeRule::RenameSegment {
            from: "lib32".to_owned(),
            to: "lib".to_owned(),
        }]);
        assert_eq!(n.normalize("lib32/libfoo.so"), "lib/libfoo.so");
        assert_eq!(n.rules().len(), 1);
    }

    #[test]
    fn manifest_sorted_and_deduplicated() {
        let m = PathNormalizer::default().normalize_all([
            "lib64/libfoo.so",
            "bin/tool",
            "lib/libfoo.dylib",
        ]);
        let entries: Vec<&str> = m.iter().map(ManifestEntry::as_str).collect();
        assert_eq!(entries, vec!["bin/tool", "lib/libfoo"]);
    }

    #[test]
    fn difference_is_exact() {
        let n = PathNormalizer::default();
        let a = n.normalize_all(["bin/a", "bin/b"]);
        let b = n.normalize_all(["bin/b", "bin/c"]);
        let d: Vec<String> = a.difference(&b).into_iter().map(ManifestEntry::into_inner).collect();
        assert_eq!(d, vec!["bin/a"]);
    }

    #[test]
    fn digest_depends_only_on_content() {
        let n = PathNormalizer::default();
        let a = n.normalize_all(["bin/b", "bin/a"]);
        let b = n.normalize_all(["bin/a", "bin/b", "bin/a"]);
        let c = n.normalize_all(["bin/a"]);
        assert_eq!(a.digest(), b.digest());
        assert_ne!(a.digest(), c.digest());
        assert_eq!(a.digest().len(), 64);
    }
}
