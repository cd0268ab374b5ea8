use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the log-gantt library.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// IO error with context about the file path.
    #[error("IO error accessing '{path}': {message}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// A line matched the timestamp pattern but the text could not be parsed.
    #[error("Invalid timestamp '{text}' at {path}:{line}: {message}")]
    Timestamp {
        /// Log file being scanned
        path: PathBuf,
        /// 1-based line number
        line: usize,
        /// Text captured by the timestamp pattern
        text: String,
        /// Parser error message
        message: String,
    },

    /// Configuration validation error.
    #[error("Invalid configuration: {message}")]
    Config {
        /// Detailed error message
        message: String,
    },

    /// Chart encoding or writing failed.
    #[error("Failed to render chart to '{path}': {message}")]
    Render {
        /// Output image path
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// JSON serialization error.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message
        message: String,
    },
}

impl Error {
    /// Creates an IO error with path context.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a timestamp parsing error.
    #[must_use]
    pub fn timestamp(
        path: impl Into<PathBuf>,
        line: usize,
        text: impl Into<String>,
        source: chrono::ParseError,
    ) -> Self {
        Self::Timestamp {
            path: path.into(),
            line,
            text: text.into(),
            message: source.to_string(),
        }
    }

    /// Creates a rendering error.
    #[must_use]
    pub fn render(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Self::Render {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Returns true if this is an IO error.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    /// Returns true if this is a timestamp parsing error.
    #[must_use]
    pub const fn is_timestamp(&self) -> bool {
        matches!(self, Self::Timestamp { .. })
    }

    /// Returns true if this is a rendering error.
    #[must_use]
    pub const fn is_render(&self) -> bool {
        matches!(self, Self::Render { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization {
            message: e.to_string(),
        }
    }
}

impl From<regex::Error> for Error {
    fn from(e: regex::Error) -> Self {
        Self::Config {
            message: format!("invalid timestamp pattern: {e}"),
        }
    }
}
