//! Manager configuration.
//!
//! A [`ManagerConfig`] captures everything a [`TemplateManager`] needs apart
//! from function bindings, which are Rust closures and can only be supplied in
//! code. Configurations can be built in code or loaded from YAML:
//!
//! ```rust
//! use atomic_templates::ManagerConfig;
//!
//! let config = ManagerConfig::from_yaml(r#"
//! directories:
//!   - ./templates
//! extensions: [html, tpl, jinja]
//! delimiters:
//!   left: "[["
//!   right: "]]"
//! reparse_on_execute: true
//! "#).unwrap();
//!
//! assert_eq!(config.extensions.len(), 3);
//! assert_eq!(config.delimiters.left, "[[");
//! assert!(!config.strip_numeric_prefixes);
//! ```
//!
//! Every field is optional; missing fields take the values of
//! [`ManagerConfig::default`].
//!
//! [`TemplateManager`]: crate::TemplateManager

use std::path::{Path, PathBuf};

use minijinja::syntax::SyntaxConfig;
use serde::{Deserialize, Serialize};

use crate::error::ManagerError;
use crate::file_loader::DEFAULT_EXTENSIONS;

/// Left and right delimiters for template expressions.
///
/// These replace MiniJinja's variable delimiters (`{{` / `}}`). Block (`{% %}`)
/// and comment (`{# #}`) delimiters are unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delimiters {
    pub left: String,
    pub right: String,
}

impl Delimiters {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }

    /// Returns true for the engine's stock `{{` / `}}` pair.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Builds the engine syntax for these delimiters.
    ///
    /// An empty side falls back to its default (`{{` or `}}`), so
    /// `Delimiters::new("", "")` behaves like the stock pair.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Config`] if the engine rejects the pair, for
    /// example when it clashes with the block or comment delimiters.
    pub fn to_syntax(&self) -> Result<SyntaxConfig, ManagerError> {
        let (left, right) = self.resolved();
        SyntaxConfig::builder()
            .variable_delimiters(left.to_string(), right.to_string())
            .build()
            .map_err(|e| {
                ManagerError::config(format!(
                    "invalid delimiters {:?} / {:?}: {}",
                    left, right, e
                ))
            })
    }

    /// The effective pair, with empty sides replaced by the defaults.
    pub fn resolved(&self) -> (&str, &str) {
        let left = if self.left.is_empty() { "{{" } else { self.left.as_str() };
        let right = if self.right.is_empty() { "}}" } else { self.right.as_str() };
        (left, right)
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Self::new("{{", "}}")
    }
}

/// Declarative manager settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Root directories to scan. Relative paths resolve against the current
    /// directory when the manager is built.
    pub directories: Vec<PathBuf>,
    /// Template extensions, without leading dot.
    pub extensions: Vec<String>,
    pub delimiters: Delimiters,
    /// Recompile the whole namespace before every render.
    pub reparse_on_execute: bool,
    /// Drop leading numeric prefixes (`00-atoms` → `atoms`) from short aliases.
    pub strip_numeric_prefixes: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            directories: Vec::new(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            delimiters: Delimiters::default(),
            reparse_on_execute: false,
            strip_numeric_prefixes: false,
        }
    }
}

impl ManagerConfig {
    /// Parses a configuration from a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ManagerError> {
        serde_yaml::from_str(yaml).map_err(|e| ManagerError::config(e.to_string()))
    }

    /// Reads and parses a YAML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ManagerError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ManagerError::config(format!("failed to read \"{}\": {}", path.display(), e))
        })?;
        Self::from_yaml(&content).map_err(|e| match e {
            ManagerError::Config(msg) => {
                ManagerError::config(format!("\"{}\": {}", path.display(), msg))
            }
            other => other,
        })
    }
}
