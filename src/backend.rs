//! Native file-primitive abstraction.
//!
//! This module defines the seam between the platform-independent handle logic
//! and the two native I/O models: raw handles with mandatory share-mode
//! exclusion (Windows) and buffered streams with advisory `flock` exclusion
//! (Unix). The handle layer depends only on these traits; the concrete backend
//! is selected once per process by [`native_backend`].

#[cfg(windows)]
pub mod raw_handle;
#[cfg(unix)]
pub mod stream;
pub mod transfer;

use crate::handle::mode::{AccessMode, Disposition};
use std::io;
use std::path::Path;

/// Strength of the cross-process exclusion a backend provides.
///
/// The contract deliberately names both levels instead of varying silently by
/// platform: callers that need to know can query it through
/// [`LockedFile::exclusion`](crate::LockedFile::exclusion).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    /// The OS enforces the lock against every process, cooperating or not.
    Mandatory,
    /// Only processes that check the lock are excluded; non-cooperating
    /// processes can bypass it.
    Advisory,
}

/// One live native file resource.
///
/// A `NativeHandle` owns its OS resource exclusively; dropping it closes the
/// resource and releases the lock acquired at open. Every call is an atomic,
/// possibly-failing native operation surfacing the OS diagnostic on failure.
pub trait NativeHandle: Send {
    /// Read up to `buf.len()` bytes at the current cursor, advancing it by
    /// the count actually read. May read fewer bytes than requested.
    fn read_some(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write up to `buf.len()` bytes at the current cursor, advancing it by
    /// the count actually written. May write fewer bytes than requested.
    fn write_some(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Move the cursor to an absolute position. Positions past end-of-file
    /// are legal. Returns the new position.
    fn set_position(&mut self, pos: u64) -> io::Result<u64>;

    /// The current cursor position.
    fn position(&mut self) -> io::Result<u64>;

    /// The current file size in bytes.
    fn size(&mut self) -> io::Result<u64>;

    /// The largest buffer one native read/write call can move, or `None`
    /// when the platform transfers arbitrary sizes in one logical call.
    fn transfer_ceiling(&self) -> Option<usize>;
}

/// Factory for native handles on one platform.
pub trait NativeBackend: Send + Sync {
    /// Open `path` with the given access and disposition AND acquire the
    /// exclusive, non-blocking lock as a single observable step: if the lock
    /// cannot be obtained immediately the open fails and no handle escapes.
    fn open(
        &self,
        path: &Path,
        access: AccessMode,
        disposition: Disposition,
    ) -> io::Result<Box<dyn NativeHandle>>;

    /// The exclusion strength this backend's locks provide.
    fn exclusion(&self) -> Exclusion;
}

/// The backend for the compilation target, selected once.
pub fn native_backend() -> &'static dyn NativeBackend {
    #[cfg(windows)]
    {
        &raw_handle::RawHandleBackend
    }
    #[cfg(unix)]
    {
        &stream::BufferedStreamBackend
    }
}

/// Map the disposition and access mode onto `std::fs::OpenOptions`.
///
/// Shared by both backends: append and read-write handles need read+write
/// access at the OS level (append is readable, and `CreateOrOpen` preserves
/// contents), write-only handles truncate, read-only handles open as-is.
pub(crate) fn open_options(access: AccessMode, disposition: Disposition) -> std::fs::OpenOptions {
    let mut options = std::fs::OpenOptions::new();

    match access {
        AccessMode::ReadOnly => {
            options.read(true);
        }
        AccessMode::WriteOnly => {
            options.write(true);
        }
        AccessMode::Append | AccessMode::ReadWrite => {
            options.read(true).write(true);
        }
    }

    match disposition {
        Disposition::TruncateOrCreate => {
            options.create(true).truncate(true);
        }
        Disposition::OpenExisting => {}
        Disposition::CreateOrOpen => {
            options.create(true);
        }
    }

    options
}
