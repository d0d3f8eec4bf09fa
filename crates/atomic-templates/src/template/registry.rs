//! Handles to compiled templates.
//!
//! The engine's template objects borrow the namespace they live in, and the
//! namespace sits behind a lock, so callers never see them directly. Lookups
//! and introspection return a [`CompiledTemplate`] instead: an owned,
//! cheaply cloneable description of one physical template file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::alias::TemplateAliases;

/// One successfully parsed template file.
///
/// # Example
///
/// For `/app/templates/pages/page-1.html` with root `/app/templates`:
///
/// ```rust,ignore
/// tmpl.name()    // "pages/page-1.html"
/// tmpl.aliases() // ["pages/page-1.html", "pages/page-1", "pages-page-1"]
/// tmpl.path()    // "/app/templates/pages/page-1.html"
/// tmpl.root()    // "/app/templates"
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledTemplate {
    inner: Arc<Entry>,
}

#[derive(Debug, PartialEq, Eq)]
struct Entry {
    aliases: Vec<String>,
    path: PathBuf,
    root: PathBuf,
    source: String,
}

impl CompiledTemplate {
    pub(crate) fn new(
        aliases: &TemplateAliases,
        path: impl Into<PathBuf>,
        root: impl Into<PathBuf>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(Entry {
                aliases: aliases.names().into_iter().map(str::to_string).collect(),
                path: path.into(),
                root: root.into(),
                source: source.into(),
            }),
        }
    }

    /// The canonical name: the long alias, extension included.
    pub fn name(&self) -> &str {
        &self.inner.aliases[0]
    }

    /// Every name this template was registered under, canonical name first.
    ///
    /// A later template may since have claimed one of these names.
    pub fn aliases(&self) -> &[String] {
        &self.inner.aliases
    }

    /// The file the template was read from.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// The registered root directory the file was found under.
    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    /// The template source as it was read at compile time.
    pub fn source(&self) -> &str {
        &self.inner.source
    }
}
