//! Error types for the template manager.
//!
//! This module provides [`ManagerError`], the single error type returned by
//! every manager operation. Compile-time errors are collected into a
//! `Vec<ManagerError>` by [`TemplateManager::parse_templates`]; lookup and
//! render errors are returned immediately.
//!
//! [`TemplateManager::parse_templates`]: crate::TemplateManager::parse_templates

use std::io;
use std::path::PathBuf;

/// Error type for template manager operations.
///
/// The engine's own error type is not exposed; [`minijinja::Error`] values are
/// flattened into [`ManagerError::Parse`], [`ManagerError::TemplateNotFound`]
/// or [`ManagerError::Render`] depending on where they occur.
#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    /// A registered directory could not be turned into an absolute path.
    #[error("cannot resolve absolute path for \"{}\": {source}", .path.display())]
    PathResolution {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An entry could not be visited because of missing permissions.
    ///
    /// Non-fatal: the walk continues past the entry.
    #[error("permission denied while walking \"{}\": {message}", .path.display())]
    WalkPermission { path: PathBuf, message: String },

    /// Walking a root directory failed; the rest of that root is skipped.
    #[error("failed to walk \"{}\": {message}", .root.display())]
    Walk { root: PathBuf, message: String },

    /// A registered root exists but is not a directory.
    #[error("template root \"{}\" is not a directory", .path.display())]
    NotADirectory { path: PathBuf },

    /// A template file could not be read.
    #[error("failed to read template \"{}\": {source}", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A template file has invalid syntax.
    #[error("failed to parse template \"{name}\" ({}): {message}", .path.display())]
    Parse {
        name: String,
        path: PathBuf,
        message: String,
    },

    /// No template is registered under the requested name.
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// A template failed while rendering.
    #[error("render error: {0}")]
    Render(String),

    /// Writing rendered output to the sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid configuration (YAML document, delimiter pair).
    #[error("configuration error: {0}")]
    Config(String),
}

impl ManagerError {
    /// Create a parse error for the template registered as `name`.
    pub fn parse(name: impl Into<String>, path: impl Into<PathBuf>, err: &minijinja::Error) -> Self {
        Self::Parse {
            name: name.into(),
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Returns true for errors that do not stop a directory walk.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ManagerError::WalkPermission { .. })
    }
}

impl From<minijinja::Error> for ManagerError {
    fn from(err: minijinja::Error) -> Self {
        use minijinja::ErrorKind;

        match err.kind() {
            ErrorKind::TemplateNotFound => ManagerError::TemplateNotFound(err.to_string()),
            ErrorKind::SyntaxError | ErrorKind::BadEscape => {
                ManagerError::Parse {
                    name: err.name().unwrap_or_default().to_string(),
                    path: PathBuf::new(),
                    message: err.to_string(),
                }
            }
            _ => ManagerError::Render(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ManagerError::TemplateNotFound("foo".to_string());
        assert!(err.to_string().contains("template not found"));
        assert!(err.to_string().contains("foo"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "closed");
        let err: ManagerError = io_err.into();
        assert!(matches!(err, ManagerError::Io(_)));
    }

    #[test]
    fn test_from_minijinja_template_not_found() {
        let mj_err = minijinja::Error::new(
            minijinja::ErrorKind::TemplateNotFound,
            "template 'foo' not found",
        );
        let err: ManagerError = mj_err.into();
        assert!(matches!(err, ManagerError::TemplateNotFound(_)));
    }

    #[test]
    fn test_from_minijinja_runtime_error() {
        let mj_err = minijinja::Error::new(minijinja::ErrorKind::InvalidOperation, "boom");
        let err: ManagerError = mj_err.into();
        assert!(matches!(err, ManagerError::Render(ref msg) if msg.contains("boom")));
    }

    #[test]
    fn test_path_display_in_messages() {
        let err = ManagerError::Walk {
            root: PathBuf::from("/srv/templates"),
            message: "gone".into(),
        };
        assert_eq!(err.to_string(), "failed to walk \"/srv/templates\": gone");
    }

    #[test]
    fn test_not_a_directory_message() {
        let err = ManagerError::NotADirectory {
            path: PathBuf::from("/srv/page.html"),
        };
        assert_eq!(
            err.to_string(),
            "template root \"/srv/page.html\" is not a directory"
        );
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_only_permission_errors_are_recoverable() {
        let permission = ManagerError::WalkPermission {
            path: PathBuf::from("/a"),
            message: "denied".into(),
        };
        assert!(permission.is_recoverable());
        assert!(!ManagerError::TemplateNotFound("x".into()).is_recoverable());
    }
}
