//! Alias derivation for discovered template files.
//!
//! Every template file is reachable under several names derived from its path
//! relative to the root directory it was found in. For root `/tmp/tpl`:
//!
//! | File | Long alias | Stem alias | Short alias |
//! |------|------------|------------|-------------|
//! | `/tmp/tpl/top-level.html` | `top-level.html` | `top-level` | `top-level` |
//! | `/tmp/tpl/pages/page-1.html` | `pages/page-1.html` | `pages/page-1` | `pages-page-1` |
//! | `/tmp/tpl/atoms/subatoms/sub-atom-1.html` | `atoms/subatoms/sub-atom-1.html` | `atoms/subatoms/sub-atom-1` | `atoms-sub-atom-1` |
//!
//! The short alias keeps only the first and last path segments, so
//! intermediate directories disappear from it. Separators in the long and stem
//! aliases are whatever the platform produced; they are not rewritten to `/`.
//!
//! # Numeric prefixes
//!
//! Directory trees laid out in "atomic design" style often order entries with
//! numeric prefixes (`00-atoms/10-buttons`). With prefix stripping enabled, the
//! segments used for the short alias lose that prefix:
//!
//! ```rust
//! use atomic_templates::alias::TemplateAliases;
//!
//! let aliases = TemplateAliases::from_relative("00-atoms/00-subdir/template-1.html", "html", true);
//! assert_eq!(aliases.short, "atoms-template-1");
//! assert_eq!(aliases.long, "00-atoms/00-subdir/template-1.html");
//! ```
//!
//! Stripping is off by default, in which case segments pass through unchanged.

use std::path::{Path, MAIN_SEPARATOR};

use tracing::warn;

/// The names a single template file is registered under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateAliases {
    /// Path relative to the root, extension included. The canonical name.
    pub long: String,
    /// Path relative to the root, extension stripped.
    pub stem: String,
    /// First and last stem segments joined by `-`.
    pub short: String,
}

impl TemplateAliases {
    /// Derives aliases for `path`, found while walking `root`.
    ///
    /// Returns `None` when `path` is not below `root`, is the root itself, or
    /// its relative part is not valid UTF-8. Non-UTF-8 names are logged at
    /// `warn` and never registered.
    pub fn derive(root: &Path, path: &Path, ext: &str, strip_numeric_prefixes: bool) -> Option<Self> {
        let relative = path.strip_prefix(root).ok()?;
        let Some(relative) = relative.to_str() else {
            warn!(path = %path.display(), "template path is not valid UTF-8, skipping");
            return None;
        };
        if relative.is_empty() {
            return None;
        }
        Some(Self::from_relative(relative, ext, strip_numeric_prefixes))
    }

    /// Derives aliases from a path already made relative to its root.
    pub fn from_relative(relative: &str, ext: &str, strip_numeric_prefixes: bool) -> Self {
        let long = relative.to_string();
        let stem = relative
            .strip_suffix(ext)
            .and_then(|s| s.strip_suffix('.'))
            .unwrap_or(relative)
            .to_string();

        let segment = |s: &str| {
            if strip_numeric_prefixes {
                strip_leading_numbers(s).to_string()
            } else {
                s.to_string()
            }
        };

        let parts: Vec<&str> = stem.split(MAIN_SEPARATOR).collect();
        let short = match parts.as_slice() {
            [] => String::new(),
            [only] => segment(*only),
            [first, .., last] => format!("{}-{}", segment(*first), segment(*last)),
        };

        Self { long, stem, short }
    }

    /// Returns every distinct name, canonical long alias first.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::with_capacity(3);
        for name in [self.long.as_str(), self.stem.as_str(), self.short.as_str()] {
            if !name.is_empty() && !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

/// Removes a leading run of ASCII digits and one following `-`, `_` or `.`.
///
/// Segments without such a prefix, or that would become empty, are returned
/// unchanged.
///
/// ```rust
/// use atomic_templates::alias::strip_leading_numbers;
///
/// assert_eq!(strip_leading_numbers("00-section"), "section");
/// assert_eq!(strip_leading_numbers("10_buttons"), "buttons");
/// assert_eq!(strip_leading_numbers("404"), "404");
/// assert_eq!(strip_leading_numbers("page-1"), "page-1");
/// ```
pub fn strip_leading_numbers(segment: &str) -> &str {
    let rest = segment.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() == segment.len() {
        return segment;
    }
    match rest.strip_prefix(['-', '_', '.']) {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => segment,
    }
}
