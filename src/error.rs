//! Error types and handling infrastructure for lockedfile.
//!
//! This module provides a centralized error handling system using `thiserror`
//! for the crate's error enum and a standardized `Result` alias used across
//! all modules.
//!
//! ## Design Principles
//!
//! - **Caller-directed**: every error is returned to the immediate caller;
//!   nothing is retried or silently downgraded inside the crate
//! - **OS diagnostics preserved**: failures that wrap a native call carry the
//!   underlying `io::Error` as a source, so the OS-provided message text is
//!   never lost
//! - **Consistency**: one `Result` type across all modules

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for lockedfile operations.
///
/// Covers every failure a [`LockedFile`](crate::LockedFile) operation can
/// surface, from argument validation through native open/lock/transfer
/// errors.
#[derive(Error, Debug)]
pub enum LockedFileError {
    /// A parameter survived static typing but is still unusable
    /// (e.g. a non-UTF-8 path, or a read length that exceeds addressable
    /// memory on this host).
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// The open-mode token is not one of the eight recognized tokens.
    #[error("invalid open mode \"{token}\"; valid modes are w, r, a, rw, wb, rb, ab and rwb")]
    InvalidMode { token: String },

    /// The seek-anchor token is not `begin`, `current` or `end`.
    #[error("invalid seek anchor \"{token}\"; valid anchors are begin, current and end")]
    InvalidAnchor { token: String },

    /// The filename failed validation (control characters everywhere;
    /// reserved device names and structural glyphs under Windows rules).
    #[error("filename contains characters that are not allowed: {name:?}")]
    InvalidFilename { name: String },

    /// A read-mode open was attempted against a path that does not exist.
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// `Open` was called on a handle that already holds an open file.
    #[error("a file is already open on this handle; close it before opening another")]
    AlreadyOpen,

    /// A data operation was attempted before `open` or after `close`.
    #[error("no file is open on this handle")]
    NotOpen,

    /// A write was attempted on a handle opened in read-only mode.
    #[error("the file was not opened in write mode")]
    ReadOnlyMode,

    /// A read was attempted on a handle opened in write-only mode.
    #[error("the file was not opened in read mode")]
    WriteOnlyMode,

    /// The payload's shape (text vs raw bytes) disagrees with the binary
    /// flag the handle was opened with.
    #[error("payload does not match the handle's binary flag: {message}")]
    TypeMismatch { message: String },

    /// The native open-and-lock step failed: the file is held by another
    /// process in a conflicting mode, or the open itself failed.
    #[error("could not open and lock {}: {source}", path.display())]
    LockOrOpenFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A native read/write/seek/size call failed mid-operation. The whole
    /// logical operation is reported as failed; no partial count is kept.
    #[error("{message}: {source}")]
    IoFailure {
        message: String,
        #[source]
        source: io::Error,
    },
}

/// Standard Result type for lockedfile operations.
///
/// This type alias provides a consistent error handling interface across
/// all modules in the crate.
pub type Result<T> = std::result::Result<T, LockedFileError>;

impl LockedFileError {
    /// Create an InvalidArgument error with a descriptive message.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a TypeMismatch error with a descriptive message.
    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::TypeMismatch {
            message: message.into(),
        }
    }

    /// Create an IoFailure from an io::Error with additional context.
    pub fn io_failure(message: impl Into<String>, source: io::Error) -> Self {
        Self::IoFailure {
            message: message.into(),
            source,
        }
    }

    /// Create a LockOrOpenFailed error for the given path.
    pub fn lock_or_open_failed(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::LockOrOpenFailed {
            path: path.into(),
            source,
        }
    }
}

// Automatic conversion from io::Error for the data-path operations. The
// open path maps its errors explicitly (LockOrOpenFailed / FileNotFound)
// and never goes through this.
impl From<io::Error> for LockedFileError {
    fn from(err: io::Error) -> Self {
        Self::IoFailure {
            message: "i/o operation failed".to_string(),
            source: err,
        }
    }
}
