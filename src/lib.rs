//! # lockedfile - Exclusive Cross-Platform File Access
//!
//! A single-file handle abstraction that guarantees no other process can read
//! or write a file while it is open, with mode-checked read/write/seek
//! operations that behave byte-for-byte identically on every host OS.
//!
//! ## Features
//!
//! - **Exclusive access**: opening acquires a non-blocking exclusive lock
//!   together with the resource; contention fails the open immediately
//! - **Mode-checked operations**: eight open modes (`w`, `r`, `a`, `rw` and
//!   binary variants) with direction checks on every read and write
//! - **Byte-exact seeking**: relative offsets and named anchors normalize to
//!   the same clamped positions on every platform
//! - **Scoped release**: the lock and resource are released deterministically
//!   on `close` or drop, on every exit path
//!
//! ## Architecture
//!
//! The library is organized into focused modules:
//!
//! - [`error`] - Centralized error types and handling
//! - [`handle`] - The locked handle, mode resolution, seek math, validation
//! - [`backend`] - The native-primitive seam and its per-platform backends
//!
//! ## Exclusion contract
//!
//! On Windows the lock is mandatory (the file is opened with share mode
//! none); elsewhere it is advisory, excluding only cooperating processes
//! that also check the lock. [`LockedFile::exclusion`] reports which level
//! the running platform provides.
//!
//! ## Example
//!
//! ```no_run
//! use lockedfile::LockedFile;
//!
//! # fn main() -> lockedfile::Result<()> {
//! let mut file = LockedFile::open("t.txt", "w")?;
//! file.write("hello")?;
//! file.close();
//!
//! let mut file = LockedFile::open("t.txt", "r")?;
//! assert_eq!(file.read(-1)?.as_text(), Some("hello"));
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod backend;
pub mod error;
pub mod handle;

// Re-export commonly used types for convenience
pub use error::{LockedFileError, Result};

// Public API surface for external usage
pub use backend::{Exclusion, NativeBackend, NativeHandle};
pub use handle::{Anchor, LockedFile, OpenMode, Payload};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
