use camino::Utf8PathBuf;
use thiserror::Error;

/// A Maven coordinate or scope string could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordinateError {
    #[error("malformed coordinate '{0}', expected groupId:artifactId[:type[:classifier]]:version")]
    Malformed(String),

    #[error("coordinate '{coordinate}' has an empty segment at position {index}")]
    EmptySegment { coordinate: String, index: usize },

    #[error("unknown dependency scope '{0}'")]
    UnknownScope(String),
}

/// Errors raised while loading a fraction catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unsupported catalog file: {0}")]
    UnsupportedFormat(Utf8PathBuf),

    #[error("fraction '{0}' is listed more than once")]
    DuplicateFraction(String),
}
