//! The locked file handle: one exclusively-held native resource with
//! mode-checked read, write and seek operations.
//!
//! A handle is either `Closed` or `Open`; the open state carries the path,
//! the resolved mode and the native resource together in one variant, so a
//! mode without a resource (or the reverse) cannot be represented. Opening
//! acquires the platform's exclusive lock together with the resource; closing
//! (or dropping) releases both exactly once.

use crate::backend::transfer::{read_in_chunks, write_in_chunks};
use crate::backend::{native_backend, Exclusion, NativeHandle};
use crate::error::{LockedFileError, Result};
use crate::handle::mode::{AccessMode, Disposition, OpenMode};
use crate::handle::seek::{clamp_read_len, resolve_position, Anchor};
use crate::handle::validation::is_valid_filename;
use log::{debug, warn};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Data moving through a handle: decoded text for text-mode handles, raw
/// bytes for binary ones. Writing a payload whose shape disagrees with the
/// handle's binary flag fails with `TypeMismatch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Bytes(Vec<u8>),
}

impl Payload {
    /// Length of the payload in bytes.
    pub fn len(&self) -> usize {
        match self {
            Self::Text(text) => text.len(),
            Self::Bytes(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The decoded text, if this is a text payload.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Bytes(_) => None,
        }
    }

    /// The raw bytes, if this is a byte payload.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Text(_) => None,
            Self::Bytes(bytes) => Some(bytes),
        }
    }

    /// The byte representation written to the file: UTF-8 for text.
    fn into_encoded(self) -> Vec<u8> {
        match self {
            Self::Text(text) => text.into_bytes(),
            Self::Bytes(bytes) => bytes,
        }
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl<const N: usize> From<&[u8; N]> for Payload {
    fn from(bytes: &[u8; N]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

/// Decode file bytes as UTF-8, falling back to Latin-1 when that fails.
/// The fallback is total: every byte maps to the code point of its value.
fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            warn!("data is not valid UTF-8; decoding as Latin-1");
            err.into_bytes().iter().map(|&b| char::from(b)).collect()
        }
    }
}

/// Everything an open handle owns, bound together so none of it can exist
/// without the rest.
struct OpenState {
    path: PathBuf,
    mode: OpenMode,
    handle: Box<dyn NativeHandle>,
}

enum HandleState {
    Closed,
    Open(OpenState),
}

/// A file handle with exclusive cross-process access.
///
/// While a `LockedFile` is open, no other process can read or write the file
/// (mandatory exclusion on Windows; advisory exclusion among cooperating
/// processes elsewhere — see [`LockedFile::exclusion`]). Operations are
/// mode-checked and byte-exact on every platform.
///
/// The handle is reusable: after [`close`](Self::close) it can be opened
/// again via [`reopen`](Self::reopen). Dropping an open handle releases the
/// lock and the resource on every exit path, including unwinding.
///
/// Handles are not safe for concurrent use from multiple threads; `&mut self`
/// on every data operation makes callers serialize access at compile time.
///
/// # Example
///
/// ```no_run
/// use lockedfile::LockedFile;
///
/// # fn main() -> lockedfile::Result<()> {
/// let mut file = LockedFile::open("notes.txt", "w")?;
/// file.write("hello")?;
/// file.close();
/// # Ok(())
/// # }
/// ```
pub struct LockedFile {
    state: HandleState,
}

impl LockedFile {
    /// Create a closed handle. Open it later with [`reopen`](Self::reopen).
    pub fn new() -> Self {
        Self {
            state: HandleState::Closed,
        }
    }

    /// Open `path` in the given mode, acquiring the exclusive lock.
    ///
    /// Equivalent to [`new`](Self::new) followed by [`reopen`](Self::reopen);
    /// see `reopen` for the mode tokens and the errors.
    pub fn open(path: impl AsRef<Path>, mode_token: &str) -> Result<Self> {
        let mut file = Self::new();
        file.reopen(path, mode_token)?;
        Ok(file)
    }

    /// Open a file on this handle, acquiring the exclusive lock.
    ///
    /// # Mode tokens
    /// * `w` - write only, truncating or creating the file
    /// * `r` - read only, the file must exist
    /// * `a` - append: create or open, cursor forced to end-of-file
    /// * `rw` - read and write: create if absent, preserve contents, cursor
    ///   at start
    /// * `wb`, `rb`, `ab`, `rwb` - the same with raw byte transfer
    ///
    /// # Errors
    /// * `AlreadyOpen` if the handle already holds an open file
    /// * `InvalidArgument` if the path is not valid UTF-8
    /// * `InvalidFilename` if the name fails platform validation
    /// * `InvalidMode` for an unrecognized token
    /// * `FileNotFound` for a read-mode open against a missing path
    /// * `LockOrOpenFailed` when another process holds the file, or the
    ///   native open fails; carries the OS diagnostic
    pub fn reopen(&mut self, path: impl AsRef<Path>, mode_token: &str) -> Result<()> {
        if self.is_open() {
            return Err(LockedFileError::AlreadyOpen);
        }

        let path = path.as_ref();
        let name = path
            .to_str()
            .ok_or_else(|| LockedFileError::invalid_argument("path is not valid UTF-8"))?;

        if !is_valid_filename(name) {
            return Err(LockedFileError::InvalidFilename {
                name: name.to_string(),
            });
        }

        let mode = OpenMode::resolve(mode_token)?;

        // Read-mode existence pre-check; a racing native not-found error on
        // the same disposition maps to FileNotFound below as well.
        if mode.disposition() == Disposition::OpenExisting && !path.exists() {
            return Err(LockedFileError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let mut handle = native_backend()
            .open(path, mode.access(), mode.disposition())
            .map_err(|e| {
                if mode.disposition() == Disposition::OpenExisting
                    && e.kind() == io::ErrorKind::NotFound
                {
                    LockedFileError::FileNotFound {
                        path: path.to_path_buf(),
                    }
                } else {
                    LockedFileError::lock_or_open_failed(path, e)
                }
            })?;

        if mode.access() == AccessMode::Append {
            let size = handle
                .size()
                .map_err(|e| LockedFileError::io_failure("could not query the file size", e))?;
            let end = resolve_position(Anchor::End, 0, 0, size);
            handle
                .set_position(end)
                .map_err(|e| LockedFileError::io_failure("could not move to end-of-file", e))?;
        }

        debug!("opened {} in mode {:?}", path.display(), mode.token());

        self.state = HandleState::Open(OpenState {
            path: path.to_path_buf(),
            mode,
            handle,
        });

        Ok(())
    }

    /// Release the lock and the native resource.
    ///
    /// Idempotent and infallible: closing a closed (or never-opened) handle
    /// is a no-op. Dropping the handle calls this automatically.
    pub fn close(&mut self) {
        if let HandleState::Open(state) = std::mem::replace(&mut self.state, HandleState::Closed) {
            debug!("closed {}", state.path.display());
            // Dropping the native handle closes the resource and releases
            // the lock.
            drop(state);
        }
    }

    /// Write a payload at the current cursor, advancing it by the full
    /// length. There is no partial success: either everything is written or
    /// the call fails.
    ///
    /// # Errors
    /// * `NotOpen` if no file is open
    /// * `TypeMismatch` if the payload shape disagrees with the binary flag
    /// * `ReadOnlyMode` if the handle was opened with `r`/`rb`
    /// * `IoFailure` when a native write fails
    pub fn write(&mut self, data: impl Into<Payload>) -> Result<()> {
        let state = self.open_state_mut()?;
        let payload = data.into();

        match (&payload, state.mode.is_binary()) {
            (Payload::Text(_), true) => {
                return Err(LockedFileError::type_mismatch(
                    "only byte payloads can be written to a binary-mode handle",
                ));
            }
            (Payload::Bytes(_), false) => {
                return Err(LockedFileError::type_mismatch(
                    "only text payloads can be written to a text-mode handle",
                ));
            }
            _ => {}
        }

        if !state.mode.is_writable() {
            return Err(LockedFileError::ReadOnlyMode);
        }

        let ceiling = state.handle.transfer_ceiling();
        write_in_chunks(state.handle.as_mut(), &payload.into_encoded(), ceiling)
    }

    /// Read up to `n` bytes from the current cursor.
    ///
    /// The length is clamped against the file size before any transfer:
    /// reading past end-of-file returns what remains, and a negative `n`
    /// counts back from end-of-file (`-1` reads everything through the end,
    /// `-2` one byte less, and so on). The result may therefore be shorter
    /// than requested, but the call never over-reads and never fails at
    /// end-of-file.
    ///
    /// Returns decoded text for text-mode handles and raw bytes for binary
    /// ones.
    ///
    /// # Errors
    /// * `NotOpen` if no file is open
    /// * `WriteOnlyMode` if the handle was opened with `w`/`wb`
    /// * `IoFailure` when a native read fails
    pub fn read(&mut self, n: i64) -> Result<Payload> {
        let state = self.open_state_mut()?;

        if !state.mode.is_readable() {
            return Err(LockedFileError::WriteOnlyMode);
        }

        let pos = state.handle.position()?;
        let size = state.handle.size()?;
        let len = usize::try_from(clamp_read_len(pos, size, n)).map_err(|_| {
            LockedFileError::invalid_argument("read length exceeds addressable memory")
        })?;

        let ceiling = state.handle.transfer_ceiling();
        let bytes = read_in_chunks(state.handle.as_mut(), len, ceiling)?;

        if state.mode.is_binary() {
            Ok(Payload::Bytes(bytes))
        } else {
            Ok(Payload::Text(decode_text(bytes)))
        }
    }

    /// Read everything from the current cursor through end-of-file.
    pub fn read_all(&mut self) -> Result<Payload> {
        self.read(-1)
    }

    /// Move the cursor by `offset` relative to `anchor` and return the new
    /// absolute position.
    ///
    /// Targets below zero clamp to zero; seeking past end-of-file is legal.
    pub fn seek(&mut self, offset: i64, anchor: Anchor) -> Result<u64> {
        let state = self.open_state_mut()?;
        let current = state.handle.position()?;
        let size = state.handle.size()?;
        let target = resolve_position(anchor, offset, current, size);
        Ok(state.handle.set_position(target)?)
    }

    /// Place the cursor at the absolute position `pos` (negative values
    /// clamp to zero). Equivalent to `seek(pos, Anchor::Begin)`.
    pub fn seek_to(&mut self, pos: i64) -> Result<u64> {
        self.seek(pos, Anchor::Begin)
    }

    /// The current cursor position. Equivalent to `seek(0, Anchor::Current)`.
    pub fn cursor_pos(&mut self) -> Result<u64> {
        Ok(self.open_state_mut()?.handle.position()?)
    }

    /// The current file size in bytes.
    pub fn file_size(&mut self) -> Result<u64> {
        Ok(self.open_state_mut()?.handle.size()?)
    }

    /// Whether a file is currently open on this handle.
    pub fn is_open(&self) -> bool {
        matches!(self.state, HandleState::Open(_))
    }

    /// The path of the open file, if any.
    pub fn path(&self) -> Option<&Path> {
        match &self.state {
            HandleState::Open(state) => Some(&state.path),
            HandleState::Closed => None,
        }
    }

    /// Whether writes are legal under the current mode.
    ///
    /// On a closed handle no mode is bound and this reports `true`; only the
    /// answer for an open handle is meaningful.
    pub fn is_writable(&self) -> bool {
        match &self.state {
            HandleState::Open(state) => state.mode.is_writable(),
            HandleState::Closed => true,
        }
    }

    /// Whether reads are legal under the current mode. Reports `true` on a
    /// closed handle, like [`is_writable`](Self::is_writable).
    pub fn is_readable(&self) -> bool {
        match &self.state {
            HandleState::Open(state) => state.mode.is_readable(),
            HandleState::Closed => true,
        }
    }

    /// Whether data moves as raw bytes. Reports `false` on a closed handle.
    pub fn is_binary(&self) -> bool {
        match &self.state {
            HandleState::Open(state) => state.mode.is_binary(),
            HandleState::Closed => false,
        }
    }

    /// The exclusion strength this platform's locks provide: `Mandatory` on
    /// Windows (share-mode none), `Advisory` elsewhere (flock among
    /// cooperating processes).
    pub fn exclusion() -> Exclusion {
        native_backend().exclusion()
    }

    fn open_state_mut(&mut self) -> Result<&mut OpenState> {
        match &mut self.state {
            HandleState::Open(state) => Ok(state),
            HandleState::Closed => Err(LockedFileError::NotOpen),
        }
    }
}

impl Default for LockedFile {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for LockedFile {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for LockedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            HandleState::Closed => f.debug_struct("LockedFile").field("open", &false).finish(),
            HandleState::Open(state) => f
                .debug_struct("LockedFile")
                .field("open", &true)
                .field("path", &state.path)
                .field("mode", &state.mode.token())
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_payload_conversions() {
        assert_eq!(Payload::from("hi"), Payload::Text("hi".to_string()));
        assert_eq!(Payload::from(String::from("hi")), Payload::Text("hi".into()));
        assert_eq!(Payload::from(b"\x00\x01"), Payload::Bytes(vec![0, 1]));
        assert_eq!(Payload::from(vec![2u8, 3]), Payload::Bytes(vec![2, 3]));
        assert_eq!(Payload::from(&[4u8, 5][..]), Payload::Bytes(vec![4, 5]));
    }

    #[test]
    fn test_payload_accessors() {
        let text = Payload::from("abc");
        assert_eq!(text.as_text(), Some("abc"));
        assert_eq!(text.as_bytes(), None);
        assert_eq!(text.len(), 3);

        let bytes = Payload::from(b"\x00\x01");
        assert_eq!(bytes.as_bytes(), Some(&[0u8, 1][..]));
        assert_eq!(bytes.as_text(), None);
        assert!(!bytes.is_empty());
    }

    #[test]
    fn test_decode_utf8_and_latin1_fallback() {
        assert_eq!(decode_text(b"plain ascii".to_vec()), "plain ascii");
        assert_eq!(decode_text("héllo".as_bytes().to_vec()), "héllo");

        // 0xE9 alone is invalid UTF-8; Latin-1 maps it to é
        assert_eq!(decode_text(vec![0x68, 0xE9]), "hé");
    }

    #[test]
    fn test_closed_handle_query_defaults() {
        let file = LockedFile::new();
        assert!(!file.is_open());
        assert!(file.path().is_none());
        // No mode bound: the documented sentinel answers
        assert!(file.is_writable());
        assert!(file.is_readable());
        assert!(!file.is_binary());
    }

    #[test]
    fn test_data_operations_require_open() {
        let mut file = LockedFile::new();
        assert!(matches!(file.write("x"), Err(LockedFileError::NotOpen)));
        assert!(matches!(file.read(-1), Err(LockedFileError::NotOpen)));
        assert!(matches!(
            file.seek(0, Anchor::Current),
            Err(LockedFileError::NotOpen)
        ));
        assert!(matches!(file.cursor_pos(), Err(LockedFileError::NotOpen)));
        assert!(matches!(file.file_size(), Err(LockedFileError::NotOpen)));
    }

    #[test]
    fn test_type_mismatch_checked_before_mode() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.txt");
        std::fs::write(&path, "data").unwrap();
        let mut file = LockedFile::open(&path, "r").unwrap();

        // Wrong payload shape on a read-only text handle reports the shape
        // problem, not the mode problem
        let err = file.write(b"\x00").unwrap_err();
        assert!(matches!(err, LockedFileError::TypeMismatch { .. }));

        let err = file.write("text").unwrap_err();
        assert!(matches!(err, LockedFileError::ReadOnlyMode));
    }

    #[test]
    fn test_debug_formatting() {
        let closed = LockedFile::new();
        assert!(format!("{closed:?}").contains("open: false"));

        let dir = TempDir::new().unwrap();
        let open = LockedFile::open(dir.path().join("d.txt"), "w").unwrap();
        let rendered = format!("{open:?}");
        assert!(rendered.contains("d.txt"));
        assert!(rendered.contains("\"w\""));
    }
}
