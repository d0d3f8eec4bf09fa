//! The template namespace manager.
//!
//! [`TemplateManager`] owns the registered directories, the extension
//! allow-list, the rendering configuration and the compiled namespace.
//!
//! # Lifecycle
//!
//! 1. Configure: [`add_directories`](TemplateManager::add_directories),
//!    [`add_extension`](TemplateManager::add_extension),
//!    [`delims`](TemplateManager::delims), [`funcs`](TemplateManager::funcs).
//!    These only affect the next compile.
//! 2. Compile: [`parse_templates`](TemplateManager::parse_templates) discards
//!    the namespace and rebuilds it from every registered directory.
//! 3. Render: [`execute`](TemplateManager::execute) or
//!    [`render`](TemplateManager::render), by long or short alias.
//!
//! Configuration methods take `&mut self`; compiling, lookups and rendering
//! take `&self` and synchronize on an internal lock, so a configured manager
//! can be shared across threads behind an `Arc`.
//!
//! # Concurrency
//!
//! Compilation walks every root directory on its own scoped thread. Within a
//! root, files are read and parsed one at a time in lexicographic order. The
//! namespace lock is held only while a parsed template is inserted, never
//! during traversal or file reads. Errors from all workers are collected in
//! completion order and returned together once every worker has finished.
//!
//! Rendering holds the same lock for its whole duration, so renders are
//! serialized against each other and against compilation. A function binding
//! must not call back into the manager while a render is in progress.

use std::collections::BTreeSet;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;

use serde::Serialize;
use tracing::{debug, debug_span, info_span, warn, Span};

use crate::alias::TemplateAliases;
use crate::config::{Delimiters, ManagerConfig};
use crate::error::ManagerError;
use crate::file_loader::{self, TemplateFile, DEFAULT_EXTENSIONS};
use crate::template::namespace::Namespace;
use crate::template::{CompiledTemplate, FuncMap};

/// Scans template directories and renders the templates by alias.
///
/// # Example
///
/// ```rust,no_run
/// use atomic_templates::TemplateManager;
///
/// let mut manager = TemplateManager::new();
/// manager.add_directories(["/tmp/template-dir"])?;
///
/// let errors = manager.parse_templates();
/// for err in &errors {
///     eprintln!("{err}");
/// }
///
/// // Short alias: first and last path segment, extension dropped.
/// manager.execute(std::io::stdout(), "pages-page-1", &())?;
/// // Long alias: the path relative to the directory.
/// manager.execute(std::io::stdout(), "pages/page-1.html", &())?;
/// # Ok::<(), atomic_templates::ManagerError>(())
/// ```
pub struct TemplateManager {
    namespace: Mutex<Namespace>,
    dirs: BTreeSet<PathBuf>,
    extensions: BTreeSet<String>,
    delimiters: Delimiters,
    funcs: FuncMap,
    reparse: bool,
    strip_numeric_prefixes: bool,
}

impl Default for TemplateManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateManager {
    /// Creates a manager with no directories and the default extensions
    /// (`html`, `tpl`).
    pub fn new() -> Self {
        Self {
            namespace: Mutex::new(Namespace::new()),
            dirs: BTreeSet::new(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            delimiters: Delimiters::default(),
            funcs: FuncMap::new(),
            reparse: false,
            strip_numeric_prefixes: false,
        }
    }

    /// Creates a manager from declarative settings.
    ///
    /// Directories are registered immediately; templates are not compiled
    /// until [`parse_templates`](Self::parse_templates) is called.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Config`] for an invalid delimiter pair and
    /// [`ManagerError::PathResolution`] for a directory that cannot be
    /// absolutized.
    pub fn from_config(config: ManagerConfig) -> Result<Self, ManagerError> {
        config.delimiters.to_syntax()?;

        let mut manager = Self::new();
        manager.extensions = config.extensions.into_iter().collect();
        manager.delimiters = config.delimiters;
        manager.reparse = config.reparse_on_execute;
        manager.strip_numeric_prefixes = config.strip_numeric_prefixes;
        manager.add_directories(&config.directories)?;
        Ok(manager)
    }

    /// Registers root directories to scan for templates.
    ///
    /// Each path is made absolute against the current directory, so
    /// `./templates` and its absolute spelling register once. Paths that
    /// cannot be resolved are skipped; the others are still registered and the
    /// first failure is returned.
    ///
    /// Registered directories should not be nested inside each other, or the
    /// nested files are compiled twice under different aliases.
    pub fn add_directories<I, P>(&mut self, dirs: I) -> Result<&mut Self, ManagerError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut first_error = None;

        for dir in dirs {
            let dir = dir.as_ref();
            match absolutize(dir) {
                Ok(abs) => {
                    debug!(dir = %abs.display(), "registered template directory");
                    self.dirs.insert(abs);
                }
                Err(source) => {
                    let err = ManagerError::PathResolution {
                        path: dir.to_path_buf(),
                        source,
                    };
                    if first_error.is_none() {
                        first_error = Some(err);
                    } else {
                        warn!(error = %err, "skipping template directory");
                    }
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }

    /// Treats files with `ext` (no leading dot) as templates from the next
    /// compile on.
    pub fn add_extension(&mut self, ext: impl Into<String>) -> &mut Self {
        self.extensions.insert(ext.into());
        self
    }

    /// Stops treating files with `ext` as templates from the next compile on.
    pub fn remove_extension(&mut self, ext: &str) -> &mut Self {
        self.extensions.remove(ext);
        self
    }

    /// Sets the expression delimiters used by the next compile.
    ///
    /// Only output expressions (`{{ name }}`) switch to the new pair. Block
    /// tags such as `{% if %}`, `{% for %}` and `{% include %}` and comments
    /// keep their `{% %}` and `{# #}` delimiters. An empty side falls back to
    /// `{{` or `}}`.
    pub fn delims(&mut self, left: impl Into<String>, right: impl Into<String>) -> &mut Self {
        self.delimiters = Delimiters::new(left, right);
        self
    }

    /// Sets the function bindings used by the next compile.
    pub fn funcs(&mut self, funcs: FuncMap) -> &mut Self {
        self.funcs = funcs;
        self
    }

    /// Recompiles every template before each render when `reparse` is true.
    ///
    /// Meant for development, where templates change while the process runs.
    /// Each render then pays for a full compile of every directory.
    pub fn set_reparse_on_execute(&mut self, reparse: bool) -> &mut Self {
        self.reparse = reparse;
        self
    }

    /// Drops numeric prefixes (`00-atoms` → `atoms`) from short aliases.
    pub fn set_strip_numeric_prefixes(&mut self, strip: bool) -> &mut Self {
        self.strip_numeric_prefixes = strip;
        self
    }

    /// Discards the namespace and compiles every template found in the
    /// registered directories.
    ///
    /// Compilation is best effort: a failing file stops only the walk of its
    /// own directory, and every template that parsed stays available. All
    /// errors are returned together; an empty vector means full success.
    pub fn parse_templates(&self) -> Vec<ManagerError> {
        let _span = info_span!("parse_templates", roots = self.dirs.len()).entered();

        // A rejected syntax leaves the previous namespace in place.
        let syntax = match self.delimiters.to_syntax() {
            Ok(syntax) => syntax,
            Err(err) => return vec![err],
        };
        {
            let mut namespace = self.lock();
            // Globals from an earlier configuration must not survive.
            *namespace = Namespace::new();
            namespace.configure(syntax, &self.funcs);
        }

        debug!(extensions = ?self.extensions, "compile cycle started");
        let parent = Span::current();
        let (tx, rx) = crossbeam_channel::unbounded();
        thread::scope(|scope| {
            for root in &self.dirs {
                let tx = tx.clone();
                let parent = &parent;
                scope.spawn(move || {
                    let _span =
                        debug_span!(parent: parent, "walk", root = %root.display()).entered();
                    file_loader::walk_templates(
                        root,
                        &self.extensions,
                        |file| self.compile_file(&file),
                        |err| {
                            // The receiver outlives the scope.
                            let _ = tx.send(err);
                        },
                    );
                });
            }
        });
        drop(tx);

        let errors: Vec<ManagerError> = rx.try_iter().collect();
        debug!(
            templates = self.lock().templates().len(),
            errors = errors.len(),
            "compile cycle finished"
        );
        errors
    }

    fn compile_file(&self, file: &TemplateFile) -> Result<(), ManagerError> {
        let Some(aliases) = TemplateAliases::derive(
            &file.root,
            &file.path,
            &file.extension,
            self.strip_numeric_prefixes,
        ) else {
            return Ok(());
        };

        let source = file.read()?;
        self.lock().insert(file, &aliases, source)?;
        Ok(())
    }

    /// Finds a template by any of its aliases.
    pub fn lookup(&self, name: &str) -> Option<CompiledTemplate> {
        self.lock().lookup(name)
    }

    /// Renders the template registered as `name` into `writer`.
    ///
    /// With reparse-on-execute enabled, the whole namespace is recompiled
    /// first; compile errors are logged and the render proceeds with whatever
    /// compiled.
    ///
    /// # Errors
    ///
    /// - [`ManagerError::TemplateNotFound`] if no template has that name
    /// - [`ManagerError::Render`] if the template fails while rendering
    /// - [`ManagerError::Io`] if writing to `writer` fails
    pub fn execute<W, S>(&self, writer: W, name: &str, data: &S) -> Result<(), ManagerError>
    where
        W: io::Write,
        S: Serialize + ?Sized,
    {
        if self.reparse {
            for err in self.parse_templates() {
                warn!(error = %err, "reparse before execute failed");
            }
        }

        self.lock().render_to_write(name, data, writer)
    }

    /// Renders the template registered as `name` to a string.
    pub fn render<S>(&self, name: &str, data: &S) -> Result<String, ManagerError>
    where
        S: Serialize + ?Sized,
    {
        let mut out = Vec::new();
        self.execute(&mut out, name, data)?;
        String::from_utf8(out).map_err(|e| ManagerError::Render(e.to_string()))
    }

    /// Returns one handle per successfully compiled file.
    ///
    /// Order follows compile completion and is not stable across compiles.
    pub fn templates(&self) -> Vec<CompiledTemplate> {
        self.lock().templates().to_vec()
    }

    /// Returns every registered alias, sorted.
    pub fn names(&self) -> Vec<String> {
        self.lock().names()
    }

    /// Returns the registered root directories.
    pub fn directories(&self) -> impl Iterator<Item = &Path> {
        self.dirs.iter().map(PathBuf::as_path)
    }

    /// Returns the extension allow-list.
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }

    pub fn delimiters(&self) -> &Delimiters {
        &self.delimiters
    }

    pub fn reparse_on_execute(&self) -> bool {
        self.reparse
    }

    pub fn strip_numeric_prefixes(&self) -> bool {
        self.strip_numeric_prefixes
    }

    // The namespace is rebuilt on every compile, so a panic mid-insert leaves
    // nothing that the next compile does not replace.
    fn lock(&self) -> MutexGuard<'_, Namespace> {
        self.namespace.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Makes `path` absolute against the current directory and removes `.` and
/// `..` components lexically. Symlinks are not resolved.
fn absolutize(path: &Path) -> io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut cleaned = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    Ok(cleaned)
}
