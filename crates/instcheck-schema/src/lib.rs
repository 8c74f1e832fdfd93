//! Install manifest loading, path normalization, and build configuration for instcheck.
//!
//! This crate defines the schema layer: reading raw install manifests into
//! package-relative paths (`load_manifest_file`), the ordered normalization
//! pipeline that makes platform variants compare equal (`PathNormalizer`),
//! the resulting sorted set (`NormalizedManifest`), the per-run `BuildOptions`
//! record, and TOML check profiles (`CheckProfile`).

pub mod manifest;
pub mod normalize;
pub mod options;
pub mod profile;
pub mod types;

pub use manifest::{load_manifest_file, load_manifest_str, LoadOptions, ManifestError};
pub use normalize::{
    LibSuffixScope, NormalizeOptions, NormalizeRule, NormalizedManifest, PathNormalizer,
    SHARED_LIBRARY_SUFFIXES,
};
pub use options::{parse_bool_flag, BuildOptions, InstallLayout};
pub use profile::{
    load_profile_file, parse_profile_str, CheckProfile, ConfigError, NormalizeSection,
    OptionsSection,
};
pub use types::{ManifestDigest, ManifestEntry};
