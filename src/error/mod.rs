use thiserror::Error;

/// Errors raised while loading OpenAPI sources.
///
/// The type is `Clone` because one initialization outcome is handed to every
/// caller waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocsError {
    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A source could not be fetched.
    #[error("failed to fetch OpenAPI source '{url}': {message}")]
    Fetch { url: String, message: String },

    /// A source was fetched but its body is not JSON.
    #[error("failed to decode OpenAPI source '{url}' as JSON: {message}")]
    Decode { url: String, message: String },

    /// A local source file could not be read.
    #[error("failed to read OpenAPI source file '{path}': {message}")]
    Io { path: String, message: String },
}

pub type Result<T> = std::result::Result<T, DocsError>;
