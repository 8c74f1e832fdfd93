//! Newtype wrappers for manifest strings, providing compile-time type safety.
//!
//! All newtypes serialize/deserialize as plain strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

macro_rules! string_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new instance from a string.
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Return the inner string as a slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume self and return the inner `String`.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Deref for $name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }
    };
}

string_newtype!(
    /// Canonical package-relative install path, after normalization.
    ManifestEntry
);

string_newtype!(
    /// Blake3 hex digest of a normalized manifest's sorted entries.
    ManifestDigest
);

impl ManifestEntry {
    /// Iterate over the `/`-separated segments of the path.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// True if the path lies strictly below `dir`, where `dir` is matched as a
    /// contiguous run of whole segments anywhere in the path.
    pub fn is_under(&self, dir: &str) -> bool {
        let dir: Vec<&str> = dir.split('/').filter(|s| !s.is_empty()).collect();
        if dir.is_empty() {
            return false;
        }
        let segments: Vec<&str> = self.segments().collect();
        if segments.len() <= dir.len() {
            return false;
        }
        // The last segment is the file itself; the directory must end before it.
        segments[..segments.len() - 1]
            .windows(dir.len())
            .any(|w| w == dir.as_slice())
    }

    /// True if the final path segment ends with `ext` (including the dot).
    pub fn has_extension(&self, ext: &str) -> bool {
        self.segments()
            .last()
            .is_some_and(|name| name.len() > ext.len() && name.ends_with(ext))
    }
}
