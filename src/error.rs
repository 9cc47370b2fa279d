//! Failure taxonomy for the dispatch pipeline.
//!
//! Every error raised while resolving, constructing or invoking a
//! controller is a [`DispatchError`]. The recovery boundary only cares
//! about the coarse [`FailureKind`], which also names the log stream the
//! failure is written to.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Coarse failure classification, one log stream per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FailureKind {
    HandlerNotFound,
    MethodNotFound,
    ConfigurationNotFound,
    UnclassifiedFailure,
}

impl FailureKind {
    pub const ALL: [FailureKind; 4] = [
        FailureKind::HandlerNotFound,
        FailureKind::MethodNotFound,
        FailureKind::ConfigurationNotFound,
        FailureKind::UnclassifiedFailure,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::HandlerNotFound => "HandlerNotFound",
            FailureKind::MethodNotFound => "MethodNotFound",
            FailureKind::ConfigurationNotFound => "ConfigurationNotFound",
            FailureKind::UnclassifiedFailure => "UnclassifiedFailure",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any error raised inside the dispatch pipeline.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// No controller is registered under the computed qualified name.
    #[error("Controller {0} not found")]
    HandlerNotFound(String),

    /// The controller exists but exposes no action with this name.
    #[error("Action {action} not found in controller {handler}")]
    MethodNotFound { action: String, handler: String },

    /// A required configuration resource is missing on disk.
    #[error("Configuration file {} not found", .0.display())]
    ConfigurationNotFound(PathBuf),

    #[error("invalid header line {0:?}")]
    InvalidHeader(String),

    #[error("invalid HTTP status code {0}")]
    InvalidStatus(u16),

    #[error(transparent)]
    Template(#[from] minijinja::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A constructor or action panicked; the payload message is kept.
    #[error("handler panicked: {0}")]
    Panic(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DispatchError {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            DispatchError::HandlerNotFound(_) => FailureKind::HandlerNotFound,
            DispatchError::MethodNotFound { .. } => FailureKind::MethodNotFound,
            DispatchError::ConfigurationNotFound(_) => FailureKind::ConfigurationNotFound,
            DispatchError::InvalidHeader(_)
            | DispatchError::InvalidStatus(_)
            | DispatchError::Template(_)
            | DispatchError::Io(_)
            | DispatchError::Panic(_)
            | DispatchError::Other(_) => FailureKind::UnclassifiedFailure,
        }
    }
}

/// A failure that reached the recovery boundary.
///
/// `message` is the human-readable text shown on the error page. The
/// pipeline's own messages are plain text; action errors may carry markup.
/// `trace` is a JSON context blob for the operator log.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchFailure {
    pub kind: FailureKind,
    pub message: String,
    pub trace: String,
    /// Pipeline stage the failure surfaced in.
    pub stage: &'static str,
}
