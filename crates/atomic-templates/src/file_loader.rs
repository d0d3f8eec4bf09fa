//! Directory walking for template discovery.
//!
//! [`walk_templates`] traverses one root directory recursively and hands every
//! file whose extension is on the allow-list to a visitor, one file at a time,
//! in lexicographic order of path segments.
//!
//! # Error policy
//!
//! | Situation | Reported as | Walk continues? |
//! |-----------|-------------|-----------------|
//! | Root is a file, not a directory | [`ManagerError::NotADirectory`] | no |
//! | Permission denied on an entry | [`ManagerError::WalkPermission`] | yes |
//! | Any other traversal error | [`ManagerError::Walk`] | no |
//! | Visitor returns an error | that error | no |
//!
//! Errors are passed to a reporter callback as they happen rather than
//! returned, so a caller fanning out over several roots sees them in
//! completion order.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{trace, warn};
use walkdir::WalkDir;

use crate::error::ManagerError;

/// Default template extensions, without leading dot.
pub const DEFAULT_EXTENSIONS: &[&str] = &["html", "tpl"];

/// A template file discovered during directory walking.
///
/// For a file at `/app/templates/pages/page-1.html` with root `/app/templates`:
///
/// ```rust,ignore
/// TemplateFile {
///     path: PathBuf::from("/app/templates/pages/page-1.html"),
///     root: PathBuf::from("/app/templates"),
///     extension: "html".to_string(),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    /// Full path of the file.
    pub path: PathBuf,
    /// The registered root directory the file was found under.
    pub root: PathBuf,
    /// The matched extension, without leading dot.
    pub extension: String,
}

impl TemplateFile {
    /// Creates a new template file descriptor.
    pub fn new(
        path: impl Into<PathBuf>,
        root: impl Into<PathBuf>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            root: root.into(),
            extension: extension.into(),
        }
    }

    /// Reads the whole file into memory.
    pub fn read(&self) -> Result<String, ManagerError> {
        std::fs::read_to_string(&self.path).map_err(|source| ManagerError::FileRead {
            path: self.path.clone(),
            source,
        })
    }
}

/// Returns the allow-listed extension of `path`, if any.
///
/// Files without an extension are never templates.
pub fn matching_extension(path: &Path, extensions: &BTreeSet<String>) -> Option<String> {
    let ext = path.extension()?.to_str()?;
    extensions.contains(ext).then(|| ext.to_string())
}

/// Walks `root` and calls `visit` for every allow-listed file.
///
/// See the module docs for how errors flow into `report`.
pub fn walk_templates<V, R>(root: &Path, extensions: &BTreeSet<String>, mut visit: V, mut report: R)
where
    V: FnMut(TemplateFile) -> Result<(), ManagerError>,
    R: FnMut(ManagerError),
{
    // A missing root is left to the walker, which reports it as `Walk`.
    if root.metadata().is_ok_and(|meta| !meta.is_dir()) {
        report(ManagerError::NotADirectory {
            path: root.to_path_buf(),
        });
        return;
    }

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().unwrap_or(root).to_path_buf();
                let denied = err
                    .io_error()
                    .is_some_and(|e| e.kind() == io::ErrorKind::PermissionDenied);
                if denied {
                    warn!(path = %path.display(), "permission denied, skipping entry");
                    report(ManagerError::WalkPermission {
                        path,
                        message: err.to_string(),
                    });
                    continue;
                }
                report(ManagerError::Walk {
                    root: root.to_path_buf(),
                    message: err.to_string(),
                });
                return;
            }
        };

        if entry.file_type().is_dir() {
            continue;
        }

        let Some(extension) = matching_extension(entry.path(), extensions) else {
            trace!(path = %entry.path().display(), "not a template, skipping");
            continue;
        };

        let file = TemplateFile::new(entry.into_path(), root, extension);
        if let Err(err) = visit(file) {
            report(err);
            return;
        }
    }
}
