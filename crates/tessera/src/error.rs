//! Error types for component rendering.
//!
//! This module provides [`ComponentError`], the error type for every fallible
//! operation in the crate. It abstracts over the template engine's errors so
//! the public API stays stable regardless of the backend.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while creating or rendering components.
#[derive(Debug, Error)]
pub enum ComponentError {
    /// No template engine is bound, or the engine cannot resolve templates
    /// from a filesystem search root.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A component failed validation at construction time.
    #[error("validation error: {0}")]
    Validation(String),

    /// The template for a component could not be located.
    #[error("cannot resolve template \"{name}\": {message}")]
    Resolution {
        /// The template name (or component type) that failed to resolve
        name: String,
        /// Why resolution failed
        message: String,
    },

    /// Reading an extra HTML file or a companion script failed.
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        /// Path that failed to read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Template syntax or evaluation error reported by the engine.
    #[error("template error: {0}")]
    Template(String),

    /// Component fields could not be serialized into template values.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A component was asked to render inside its own render.
    #[error("render cycle detected: component \"{id}\" is already being rendered")]
    Cycle {
        /// Id of the component that re-entered rendering
        id: String,
    },
}

/// Result type for component operations.
pub type Result<T> = std::result::Result<T, ComponentError>;

impl ComponentError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ComponentError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for ComponentError {
    fn from(err: serde_json::Error) -> Self {
        ComponentError::Serialization(err.to_string())
    }
}

// Engine errors are folded into the two categories callers act on.
impl From<minijinja::Error> for ComponentError {
    fn from(err: minijinja::Error) -> Self {
        use minijinja::ErrorKind;

        match err.kind() {
            ErrorKind::TemplateNotFound => ComponentError::Resolution {
                name: err.name().unwrap_or_default().to_string(),
                message: err.to_string(),
            },
            ErrorKind::BadSerialization => ComponentError::Serialization(err.to_string()),
            _ => ComponentError::Template(err.to_string()),
        }
    }
}
