//! # Atomic Templates - Directory-Scanned Template Namespaces
//!
//! `atomic-templates` turns directory trees of template files into a single
//! namespace of named templates. Every file is registered under names derived
//! from its path, so templates can be rendered and included by a long,
//! path-like name or by a short one.
//!
//! It suits projects laid out in "atomic design" style, where small fragments
//! (atoms) are composed into larger ones (molecules, pages):
//!
//! ```text
//! templates/
//! ├── top-level.html          → "top-level.html", "top-level"
//! ├── atoms/
//! │   ├── atom-1.html         → "atoms/atom-1.html", "atoms/atom-1", "atoms-atom-1"
//! │   └── subatoms/
//! │       └── sub-atom-1.html → "atoms/subatoms/sub-atom-1.html", ..., "atoms-sub-atom-1"
//! └── pages/
//!     └── page-1.html         → "pages/page-1.html", "pages/page-1", "pages-page-1"
//! ```
//!
//! Templates are [MiniJinja](https://docs.rs/minijinja) templates with HTML
//! auto-escaping.
//!
//! ## Quick Start
//!
//! ```rust
//! use atomic_templates::TemplateManager;
//! use serde::Serialize;
//!
//! # let dir = tempfile::tempdir().unwrap();
//! # std::fs::create_dir(dir.path().join("pages")).unwrap();
//! # std::fs::write(dir.path().join("pages/page-1.html"), "Hello {{ name }}").unwrap();
//! #[derive(Serialize)]
//! struct Page {
//!     name: String,
//! }
//!
//! let mut manager = TemplateManager::new();
//! manager.add_directories([dir.path()])?;
//!
//! let errors = manager.parse_templates();
//! assert!(errors.is_empty());
//!
//! let page = Page { name: "<world>".into() };
//! assert_eq!(manager.render("pages-page-1", &page)?, "Hello &lt;world&gt;");
//! assert_eq!(manager.render("pages/page-1.html", &page)?, "Hello &lt;world&gt;");
//! # Ok::<(), atomic_templates::ManagerError>(())
//! ```
//!
//! ## Configuration
//!
//! Settings can also come from YAML, see [`ManagerConfig`]:
//!
//! ```yaml
//! directories: [templates]
//! extensions: [html, tpl]
//! delimiters: { left: "[[", right: "]]" }
//! reparse_on_execute: true
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events: directory registration and per-template
//! compiles at `debug`, alias collisions and skipped entries at `warn`. Install
//! any subscriber to see them.

pub mod alias;
pub mod config;
mod error;
pub mod file_loader;
mod manager;
pub mod template;

pub use alias::TemplateAliases;
pub use config::{Delimiters, ManagerConfig};
pub use error::ManagerError;
pub use file_loader::DEFAULT_EXTENSIONS;
pub use manager::TemplateManager;
pub use template::{CompiledTemplate, FuncMap, NAMESPACE_ROOT};

// Function bindings take and return engine values.
pub use minijinja::Value;
