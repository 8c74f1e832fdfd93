use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read manifest file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Line-level filtering applied while reading a raw manifest.
///
/// Everything here operates on the raw text; platform normalization happens
/// afterwards in [`crate::PathNormalizer`].
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoadOptions {
    /// Lines containing any of these substrings never take part in a comparison.
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Directory name marking the install root inside absolute build-tree paths.
    #[serde(default)]
    pub root_marker: Option<String>,
    /// Literal install prefix to strip from the start of each line.
    #[serde(default)]
    pub install_prefix: Option<String>,
}

impl LoadOptions {
    fn is_excluded(&self, line: &str) -> bool {
        self.exclude
            .iter()
            .any(|token| !token.is_empty() && line.contains(token.as_str()))
    }
}

/// Read a manifest file into its set of package-relative paths.
pub fn load_manifest_file(
    path: impl AsRef<Path>,
    options: &LoadOptions,
) -> Result<BTreeSet<String>, ManifestError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            ManifestError::NotFound(path.to_path_buf())
        } else {
            ManifestError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    let scan = scan_manifest(&content, options);
    if let Some(marker) = options.root_marker.as_deref() {
        if scan.marker_hits == 0 && scan.absolute_lines > 0 {
            warn!(
                "{}: install root marker '{marker}' did not match any absolute path",
                path.display()
            );
        }
    }
    debug!("loaded {} entries from {}", scan.entries.len(), path.display());
    Ok(scan.entries)
}

/// Parse manifest text: one path per line, `#` comments and blank lines ignored.
pub fn load_manifest_str(input: &str, options: &LoadOptions) -> BTreeSet<String> {
    scan_manifest(input, options).entries
}

struct ManifestScan {
    entries: BTreeSet<String>,
    marker_hits: usize,
    absolute_lines: usize,
}

fn scan_manifest(input: &str, options: &LoadOptions) -> ManifestScan {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut scan = ManifestScan {
        entries: BTreeSet::new(),
        marker_hits: 0,
        absolute_lines: 0,
    };

    for raw in input.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || options.is_excluded(line) {
            continue;
        }

        let mut path = line.replace('\\', "/");
        if is_absolute(&path) {
            scan.absolute_lines += 1;
        }
        if let Some(marker) = options.root_marker.as_deref() {
            if let Some(rest) = strip_through_marker(&path, marker) {
                path = rest.to_owned();
                scan.marker_hits += 1;
            }
        }
        if let Some(prefix) = options.install_prefix.as_deref() {
            if let Some(rest) = strip_install_prefix(&path, prefix) {
                path = rest.to_owned();
            }
        }

        let relative = clean_relative(&path);
        if !relative.is_empty() {
            scan.entries.insert(relative);
        }
    }

    scan
}

/// `/abs/path` or a Windows drive path such as `C:/pkg`.
fn is_absolute(path: &str) -> bool {
    match path.as_bytes() {
        [b'/', ..] => true,
        [drive, b':', ..] => drive.is_ascii_alphabetic(),
        _ => false,
    }
}

/// Strip `prefix` only when it ends on a segment boundary.
fn strip_install_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let prefix = prefix.replace('\\', "/");
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return None;
    }
    path.strip_prefix(prefix)
        .filter(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Return the part of `path` after the first whole segment equal to `marker`.
fn strip_through_marker<'a>(path: &'a str, marker: &str) -> Option<&'a str> {
    let marker = marker.trim_matches('/');
    if marker.is_empty() {
        return None;
    }
    if let Some(rest) = path.strip_prefix(marker).and_then(|r| r.strip_prefix('/')) {
        return Some(rest);
    }
    let needle = format!("/{marker}/");
    path.find(&needle).map(|idx| &path[idx + needle.len()..])
}

/// Drop leading separators and `.`/empty segments.
fn clean_relative(path: &str) -> String {
    path.split('/')
        .filter(|seg| !seg.is_empty() && *seg != ".")
        .collect::<Vec<_>>()
        .join("/")
}
