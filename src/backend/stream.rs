//! Buffered-stream backend for Unix hosts.
//!
//! Opens through `OpenOptions` and takes a non-blocking exclusive `flock`
//! immediately after: if the lock is held elsewhere the file is dropped before
//! the handle can escape, so callers never observe a resource without its
//! lock. The exclusion is advisory; only cooperating processes are kept out.

use crate::backend::{open_options, Exclusion, NativeBackend, NativeHandle};
use crate::handle::mode::{AccessMode, Disposition};
use fs2::FileExt;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Backend built on `std::fs::File` plus advisory `flock` exclusion.
pub struct BufferedStreamBackend;

impl NativeBackend for BufferedStreamBackend {
    fn open(
        &self,
        path: &Path,
        access: AccessMode,
        disposition: Disposition,
    ) -> io::Result<Box<dyn NativeHandle>> {
        let file = open_options(access, disposition).open(path)?;

        // Non-blocking: contention fails the open instead of waiting.
        file.try_lock_exclusive()?;

        Ok(Box::new(StreamHandle { file }))
    }

    fn exclusion(&self) -> Exclusion {
        Exclusion::Advisory
    }
}

/// An open file plus its advisory lock. Dropping the file closes the
/// descriptor, which releases the flock.
struct StreamHandle {
    file: File,
}

impl NativeHandle for StreamHandle {
    fn read_some(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }

    fn write_some(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn set_position(&mut self, pos: u64) -> io::Result<u64> {
        self.file.seek(SeekFrom::Start(pos))
    }

    fn position(&mut self) -> io::Result<u64> {
        self.file.stream_position()
    }

    fn size(&mut self) -> io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    fn transfer_ceiling(&self) -> Option<usize> {
        // Streams move arbitrary sizes in one logical call.
        None
    }
}
