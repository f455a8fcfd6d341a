//! Error types for filemap-core

use thiserror::Error;

/// Result type alias for filemap-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error raised by user-supplied hooks
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur in filemap-core
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file could not be found
    #[error("configuration file not found: {path}")]
    ConfigNotFound {
        /// Path that was searched
        path: String,
    },

    /// Failed to parse YAML configuration
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// Invalid configuration value
    #[error("invalid configuration: {message}")]
    ConfigInvalid {
        /// Description of what's invalid
        message: String,
    },

    /// A target's file specification matches none of the recognized shapes
    #[error("invalid file specification for target '{target}': {message}")]
    InvalidFileSpec {
        /// Target (or destination key) being normalized
        target: String,
        /// Description of the problem
        message: String,
    },

    /// A glob pattern could not be compiled
    #[error("invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Underlying glob error
        source: globset::Error,
    },

    /// A `rename` or `filter` names a hook that was never registered
    #[error("unknown {kind} hook '{name}' in target '{target}'")]
    UnknownHook {
        /// Hook kind (`rename` or `filter`)
        kind: &'static str,
        /// Hook name from configuration
        name: String,
        /// Target being normalized
        target: String,
    },

    /// A rename hook failed; the hook's own error is kept as the source
    #[error("rename failed in target '{target}' for '{dest_path}'")]
    Rename {
        /// Target being normalized
        target: String,
        /// Relative destination path handed to the hook
        dest_path: String,
        /// Error raised by the hook
        #[source]
        source: HookError,
    },

    /// Template rendering error
    #[error("template error: {0}")]
    TemplateError(#[from] minijinja::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
