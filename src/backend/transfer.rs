//! Chunked-transfer loops shared by both backends.
//!
//! Where the native primitive is bounded per call, a logical read or write is
//! split into calls of at most the backend's ceiling; where it is unbounded
//! the loops degenerate to a pass-through. Failure semantics are all-or-
//! nothing: the first failing chunk fails the whole logical call, and no
//! partial count is surfaced to the caller.

use crate::backend::NativeHandle;
use crate::error::{LockedFileError, Result};
use std::io;

/// Write all of `data` at the handle's current cursor.
///
/// Chunks are capped at `ceiling` bytes per native call. Short native writes
/// advance the loop by the count actually written; interrupted calls are
/// retried; a write of zero bytes before completion is an error (the handle
/// can make no progress).
pub fn write_in_chunks(
    handle: &mut dyn NativeHandle,
    data: &[u8],
    ceiling: Option<usize>,
) -> Result<()> {
    let mut written = 0;

    while written < data.len() {
        let remaining = data.len() - written;
        let chunk = match ceiling {
            Some(max) => remaining.min(max),
            None => remaining,
        };

        match handle.write_some(&data[written..written + chunk]) {
            Ok(0) => {
                return Err(LockedFileError::io_failure(
                    "write failed",
                    io::Error::new(io::ErrorKind::WriteZero, "native write made no progress"),
                ));
            }
            Ok(n) => written += n,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(LockedFileError::io_failure("write failed", e)),
        }
    }

    Ok(())
}

/// Read exactly `len` bytes from the handle's current cursor.
///
/// `len` must already be clamped against the file size; hitting end-of-file
/// before `len` bytes arrive is therefore an error, not a short result.
pub fn read_in_chunks(
    handle: &mut dyn NativeHandle,
    len: usize,
    ceiling: Option<usize>,
) -> Result<Vec<u8>> {
    let mut data = vec![0u8; len];
    let mut filled = 0;

    while filled < len {
        let remaining = len - filled;
        let chunk = match ceiling {
            Some(max) => remaining.min(max),
            None => remaining,
        };

        match handle.read_some(&mut data[filled..filled + chunk]) {
            Ok(0) => {
                return Err(LockedFileError::io_failure(
                    "read failed",
                    io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "file ended before the clamped length was read",
                    ),
                ));
            }
            Ok(n) => filled += n,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(LockedFileError::io_failure("read failed", e)),
        }
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// In-memory stand-in for a native handle, with failure injection and a
    /// record of every native call size.
    struct MockHandle {
        data: Vec<u8>,
        pos: usize,
        call_sizes: Vec<usize>,
        /// Cap each native call below the requested chunk (short transfers).
        short_by: Option<usize>,
        /// Fail after this many successful calls.
        fail_after: Option<usize>,
        /// Report Interrupted this many times before succeeding.
        interruptions: usize,
    }

    impl MockHandle {
        fn new(data: &[u8]) -> Self {
            Self {
                data: data.to_vec(),
                pos: 0,
                call_sizes: Vec::new(),
                short_by: None,
                fail_after: None,
                interruptions: 0,
            }
        }

        fn check_injections(&mut self) -> io::Result<()> {
            if self.interruptions > 0 {
                self.interruptions -= 1;
                return Err(io::Error::new(io::ErrorKind::Interrupted, "interrupted"));
            }
            if let Some(after) = self.fail_after {
                if self.call_sizes.len() >= after {
                    return Err(io::Error::new(io::ErrorKind::Other, "injected failure"));
                }
            }
            Ok(())
        }

        fn effective(&self, requested: usize) -> usize {
            match self.short_by {
                Some(cap) => requested.min(cap),
                None => requested,
            }
        }
    }

    impl NativeHandle for MockHandle {
        fn read_some(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.check_injections()?;
            let n = self
                .effective(buf.len())
                .min(self.data.len().saturating_sub(self.pos));
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            self.call_sizes.push(buf.len());
            Ok(n)
        }

        fn write_some(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.check_injections()?;
            let n = self.effective(buf.len());
            if self.pos + n > self.data.len() {
                self.data.resize(self.pos + n, 0);
            }
            self.data[self.pos..self.pos + n].copy_from_slice(&buf[..n]);
            self.pos += n;
            self.call_sizes.push(buf.len());
            Ok(n)
        }

        fn set_position(&mut self, pos: u64) -> io::Result<u64> {
            self.pos = pos as usize;
            Ok(pos)
        }

        fn position(&mut self) -> io::Result<u64> {
            Ok(self.pos as u64)
        }

        fn size(&mut self) -> io::Result<u64> {
            Ok(self.data.len() as u64)
        }

        fn transfer_ceiling(&self) -> Option<usize> {
            None
        }
    }

    #[test]
    fn test_write_respects_ceiling() {
        let mut handle = MockHandle::new(b"");
        write_in_chunks(&mut handle, &[7u8; 25], Some(10)).unwrap();

        assert_eq!(handle.data, vec![7u8; 25]);
        assert_eq!(handle.call_sizes, vec![10, 10, 5]);
        assert!(handle.call_sizes.iter().all(|&s| s <= 10));
    }

    #[test]
    fn test_write_without_ceiling_is_one_call() {
        let mut handle = MockHandle::new(b"");
        write_in_chunks(&mut handle, &[1u8; 4096], None).unwrap();
        assert_eq!(handle.call_sizes, vec![4096]);
    }

    #[test]
    fn test_short_native_writes_still_complete() {
        let mut handle = MockHandle::new(b"");
        handle.short_by = Some(3);
        write_in_chunks(&mut handle, b"abcdefgh", Some(100)).unwrap();
        assert_eq!(handle.data, b"abcdefgh");
    }

    #[test]
    fn test_failing_chunk_fails_whole_write() {
        let mut handle = MockHandle::new(b"");
        handle.fail_after = Some(2);

        let err = write_in_chunks(&mut handle, &[0u8; 50], Some(10)).unwrap_err();
        assert!(matches!(err, LockedFileError::IoFailure { .. }));
        assert!(err.to_string().contains("injected failure"));
    }

    #[test]
    fn test_interrupted_write_is_retried() {
        let mut handle = MockHandle::new(b"");
        handle.interruptions = 2;
        write_in_chunks(&mut handle, b"payload", Some(4)).unwrap();
        assert_eq!(handle.data, b"payload");
    }

    #[test]
    fn test_read_respects_ceiling() {
        let source: Vec<u8> = (0..25).collect();
        let mut handle = MockHandle::new(&source);

        let data = read_in_chunks(&mut handle, 25, Some(10)).unwrap();
        assert_eq!(data, source);
        assert_eq!(handle.call_sizes, vec![10, 10, 5]);
    }

    #[test]
    fn test_read_of_zero_is_empty() {
        let mut handle = MockHandle::new(b"content");
        let data = read_in_chunks(&mut handle, 0, Some(10)).unwrap();
        assert!(data.is_empty());
        assert!(handle.call_sizes.is_empty());
    }

    #[test]
    fn test_premature_eof_fails_read() {
        let mut handle = MockHandle::new(b"short");
        let err = read_in_chunks(&mut handle, 10, None).unwrap_err();
        assert!(matches!(err, LockedFileError::IoFailure { .. }));
    }

    #[test]
    fn test_interrupted_read_is_retried() {
        let mut handle = MockHandle::new(b"0123456789");
        handle.interruptions = 1;
        let data = read_in_chunks(&mut handle, 10, Some(4)).unwrap();
        assert_eq!(data, b"0123456789");
    }
}
