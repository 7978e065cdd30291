//! Raw-handle backend for Windows hosts.
//!
//! Opens with share mode `FILE_SHARE_NONE`, so the exclusive lock is acquired
//! atomically with the handle itself and is mandatory: no other process can
//! open the file at all while the handle lives. The native transfer primitive
//! is bounded per call, so this backend reports a transfer ceiling and relies
//! on the chunked-transfer loops for larger buffers.

use crate::backend::{open_options, Exclusion, NativeBackend, NativeHandle};
use crate::handle::mode::{AccessMode, Disposition};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::os::windows::fs::OpenOptionsExt;
use std::path::Path;
use windows_sys::Win32::Storage::FileSystem::FILE_SHARE_NONE;

/// Largest buffer one native transfer call may move.
const MAX_BYTES_PER_CALL: usize = 100_000;

/// Backend built on share-mode-none handles with mandatory exclusion.
pub struct RawHandleBackend;

impl NativeBackend for RawHandleBackend {
    fn open(
        &self,
        path: &Path,
        access: AccessMode,
        disposition: Disposition,
    ) -> io::Result<Box<dyn NativeHandle>> {
        let file = open_options(access, disposition)
            .share_mode(FILE_SHARE_NONE)
            .open(path)?;

        Ok(Box::new(RawHandle { file }))
    }

    fn exclusion(&self) -> Exclusion {
        Exclusion::Mandatory
    }
}

/// An open file whose share mode excludes every other opener. Dropping the
/// file closes the handle, which lifts the exclusion.
struct RawHandle {
    file: File,
}

impl NativeHandle for RawHandle {
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
        Some(MAX_BYTES_PER_CALL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_share_mode_none_excludes_second_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("held.txt");

        let first = RawHandleBackend
            .open(&path, AccessMode::ReadWrite, Disposition::CreateOrOpen)
            .unwrap();

        let second =
            RawHandleBackend.open(&path, AccessMode::ReadOnly, Disposition::OpenExisting);
        assert!(second.is_err());

        drop(first);

        RawHandleBackend
            .open(&path, AccessMode::ReadOnly, Disposition::OpenExisting)
            .expect("exclusion should lift once the handle is closed");
    }

    #[test]
    fn test_transfer_ceiling_reported() {
        let dir = TempDir::new().unwrap();
        let handle = RawHandleBackend
            .open(
                &dir.path().join("sized.bin"),
                AccessMode::WriteOnly,
                Disposition::TruncateOrCreate,
            )
            .unwrap();
        assert_eq!(handle.transfer_ceiling(), Some(MAX_BYTES_PER_CALL));
    }
}
