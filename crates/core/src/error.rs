//! Error types for relock operations

use crate::version::PyVersion;
use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for relock operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while regenerating locked requirements manifests.
///
/// `MatrixNotFound` is the only fatal kind: it aborts a run before any
/// provisioning starts. Every other kind is scoped to a single interpreter
/// version and is folded into that version's outcome without touching
/// sibling units.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The test-matrix configuration file does not exist.
    #[error("Test matrix not found: {}", path.display())]
    #[diagnostic(
        code(relock::matrix::not_found),
        help("relock reads the supported interpreter versions from tox.ini; run it from the project root or pass --matrix")
    )]
    MatrixNotFound {
        /// The path that was probed
        path: PathBuf,
    },

    /// No interpreter binary for the requested version exists on PATH.
    #[error("No python{version} interpreter found on PATH")]
    #[diagnostic(
        code(relock::provision::interpreter_not_found),
        help("Install the interpreter or remove the version from the tox envlist")
    )]
    InterpreterNotFound {
        /// The version whose interpreter is missing
        version: PyVersion,
    },

    /// Creating the per-version virtualenv exited non-zero.
    #[error("Failed to create virtualenv for python{version}: {message}")]
    #[diagnostic(code(relock::provision::env_creation))]
    EnvCreation {
        /// The version being provisioned
        version: PyVersion,
        /// Captured diagnostic output from the creation step
        message: String,
    },

    /// Installing pip-tools into the virtualenv failed.
    #[error("Failed to install pip-tools for python{version}: {message}")]
    #[diagnostic(
        code(relock::provision::tool_install),
        help("pip-tools is fetched from the package index; check network connectivity and index configuration")
    )]
    ToolInstall {
        /// The version being provisioned
        version: PyVersion,
        /// Captured diagnostic output from the install step
        message: String,
    },

    /// The pip-compile invocation exited non-zero.
    #[error("pip-compile failed for python{version}: {message}")]
    #[diagnostic(code(relock::compile::failed))]
    Compilation {
        /// The version being compiled
        version: PyVersion,
        /// Exit code of the tool, if it exited at all
        exit_code: Option<i32>,
        /// Captured diagnostic output from the tool
        message: String,
    },

    /// A child-process invocation exceeded its configured deadline.
    #[error("{operation} for python{version} timed out after {seconds} seconds")]
    #[diagnostic(code(relock::timeout))]
    Timeout {
        /// The version whose unit timed out
        version: PyVersion,
        /// The invocation that exceeded the deadline
        operation: String,
        /// The configured deadline in seconds
        seconds: u64,
    },

    /// I/O error with path context. Only raised while standing up a run
    /// (matrix read, output directory, scratch workspace), so it always
    /// precedes dispatch.
    #[error("I/O error during {operation}: {source}")]
    #[diagnostic(code(relock::io))]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// The path where the I/O error occurred, if applicable
        path: Option<PathBuf>,
        /// Description of the operation that failed
        operation: String,
    },
}

impl Error {
    /// Create a matrix-not-found error
    #[must_use]
    pub fn matrix_not_found(path: impl Into<PathBuf>) -> Self {
        Self::MatrixNotFound { path: path.into() }
    }

    /// Create an interpreter-not-found error
    #[must_use]
    pub fn interpreter_not_found(version: PyVersion) -> Self {
        Self::InterpreterNotFound { version }
    }

    /// Create a virtualenv-creation error
    #[must_use]
    pub fn env_creation(version: PyVersion, message: impl Into<String>) -> Self {
        Self::EnvCreation {
            version,
            message: message.into(),
        }
    }

    /// Create a tool-install error
    #[must_use]
    pub fn tool_install(version: PyVersion, message: impl Into<String>) -> Self {
        Self::ToolInstall {
            version,
            message: message.into(),
        }
    }

    /// Create a compilation error
    #[must_use]
    pub fn compilation(
        version: PyVersion,
        exit_code: Option<i32>,
        message: impl Into<String>,
    ) -> Self {
        Self::Compilation {
            version,
            exit_code,
            message: message.into(),
        }
    }

    /// Create a timeout error
    #[must_use]
    pub fn timeout(version: PyVersion, operation: impl Into<String>, seconds: u64) -> Self {
        Self::Timeout {
            version,
            operation: operation.into(),
            seconds,
        }
    }

    /// Create an I/O error with context
    #[must_use]
    pub fn io(source: std::io::Error, path: Option<PathBuf>, operation: impl Into<String>) -> Self {
        Self::Io {
            source,
            path,
            operation: operation.into(),
        }
    }

    /// Whether this error aborts the whole run before any unit is dispatched.
    ///
    /// Per-version failures never reach the caller as errors; they are folded
    /// into that version's outcome instead.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::MatrixNotFound { .. } | Self::Io { .. })
    }
}
