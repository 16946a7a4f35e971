//! Error types for skill loading

use std::path::PathBuf;
use thiserror::Error;

/// Skill loading errors
#[derive(Debug, Error)]
pub enum SkillError {
    /// Filesystem error with the path that caused it
    #[error("I/O error at {path:?}: {source}")]
    Io {
        /// Path being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Marker document is not well-formed
    #[error("Malformed front matter: {0}")]
    Frontmatter(String),

    /// Metadata failed validation
    #[error("Invalid skill metadata: {0}")]
    InvalidMetadata(String),

    /// Arguments passed to a tool do not match its schema
    #[error("Invalid arguments for tool '{tool}': {reason}")]
    InvalidArgument {
        /// Tool name
        tool: String,
        /// Failure reason
        reason: String,
    },

    /// Manifest references a function missing from the tool table
    #[error("Function '{handler}' for skill '{skill}' is not registered")]
    ToolNotFound {
        /// Skill name
        skill: String,
        /// Handler key looked up in the table
        handler: String,
    },

    /// YAML deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl SkillError {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, SkillError>;
