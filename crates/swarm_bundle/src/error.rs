//! Error types for packaging operations.
//!
//! Every fallible function in this crate returns [`Result<T>`] with [`Error`].
//! [`BuildTool::build`](crate::BuildTool::build) wraps the first error of a run
//! into a single [`BuildFailure`] that records the pipeline stage it came from.

use camino::Utf8PathBuf;
use swarm_artifact::CoordinateError;
use thiserror::Error;

use crate::builder::BuildStage;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while packaging an archive.
#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem I/O failed (reading inputs, writing the archive, etc.).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An input or output archive could not be read or written.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The swarm manifest could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A coordinate string could not be parsed.
    #[error("invalid coordinate: {0}")]
    Coordinate(#[from] CoordinateError),

    /// A coordinate could not be turned into a file on disk.
    #[error("unable to resolve {coordinate}: {reason}")]
    Resolution { coordinate: String, reason: String },

    /// A fraction name is neither in the catalog nor a full coordinate.
    #[error("unknown fraction '{0}'")]
    UnknownFraction(String),

    /// Requested fractions could not be resolved and detection mode is strict.
    #[error("unresolvable fractions requested in force mode: {}", .unresolved.join(", "))]
    Conflict { unresolved: Vec<String> },

    /// Another build holds the lock on the output file.
    #[error("output {0} is locked by another build")]
    OutputInUse(Utf8PathBuf),

    /// Re-embedding the archive into a web archive failed.
    #[error("unable to repackage {path}: {source}")]
    Repackage {
        path: Utf8PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// The host cancelled the build or its timeout elapsed.
    #[error("build cancelled")]
    Cancelled,

    /// A build input is missing or inconsistent.
    #[error("invalid build input: {0}")]
    InvalidInput(String),
}

impl Error {
    pub fn resolution(coordinate: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Resolution {
            coordinate: coordinate.into(),
            reason: reason.into(),
        }
    }

    pub fn repackage(path: impl Into<Utf8PathBuf>, source: Error) -> Self {
        Error::Repackage {
            path: path.into(),
            source: Box::new(source),
        }
    }
}

/// The single failure a build reports to its host.
#[derive(Error, Debug)]
#[error("unable to create swarm archive ({stage}): {source}")]
pub struct BuildFailure {
    /// The stage that was being attempted when the build failed.
    pub stage: BuildStage,
    #[source]
    pub source: Error,
}
