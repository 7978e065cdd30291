//! Open-mode resolution: mapping caller-facing mode tokens to an access mode,
//! a disposition and a binary flag.
//!
//! Exactly eight tokens are recognized: `w`, `r`, `a`, `rw` and their binary
//! variants `wb`, `rb`, `ab`, `rwb`. Anything else fails resolution with
//! `InvalidMode`.

use crate::error::{LockedFileError, Result};
use std::str::FromStr;

/// Transfer direction(s) a handle was opened with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// `w`: writes only; reads fail with `WriteOnlyMode`.
    WriteOnly,
    /// `r`: reads only; writes fail with `ReadOnlyMode`.
    ReadOnly,
    /// `a`: cursor starts at end-of-file. Reads are legal (only `WriteOnly`
    /// blocks them), so backends open append handles with read+write access.
    Append,
    /// `rw`: both directions, cursor at start, contents preserved.
    ReadWrite,
}

/// Create-vs-open policy applied when acquiring the native resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Replace any existing file with an empty one, creating it if absent.
    TruncateOrCreate,
    /// Open an existing file only; a missing target is `FileNotFound`.
    OpenExisting,
    /// Create the file if absent, otherwise open it preserving its contents.
    CreateOrOpen,
}

/// A fully resolved open mode: token, access direction, disposition and
/// binary flag, fixed for the lifetime of an open resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenMode {
    token: &'static str,
    access: AccessMode,
    disposition: Disposition,
    binary: bool,
}

impl OpenMode {
    /// Resolve a mode token into its access mode, disposition and binary flag.
    ///
    /// # Errors
    /// * `InvalidMode` if the token is not one of the eight recognized tokens
    pub fn resolve(token: &str) -> Result<Self> {
        let mode = match token {
            "w" => Self::new("w", AccessMode::WriteOnly, Disposition::TruncateOrCreate, false),
            "wb" => Self::new("wb", AccessMode::WriteOnly, Disposition::TruncateOrCreate, true),
            "r" => Self::new("r", AccessMode::ReadOnly, Disposition::OpenExisting, false),
            "rb" => Self::new("rb", AccessMode::ReadOnly, Disposition::OpenExisting, true),
            "a" => Self::new("a", AccessMode::Append, Disposition::CreateOrOpen, false),
            "ab" => Self::new("ab", AccessMode::Append, Disposition::CreateOrOpen, true),
            "rw" => Self::new("rw", AccessMode::ReadWrite, Disposition::CreateOrOpen, false),
            "rwb" => Self::new("rwb", AccessMode::ReadWrite, Disposition::CreateOrOpen, true),
            _ => {
                return Err(LockedFileError::InvalidMode {
                    token: token.to_string(),
                })
            }
        };
        Ok(mode)
    }

    const fn new(
        token: &'static str,
        access: AccessMode,
        disposition: Disposition,
        binary: bool,
    ) -> Self {
        Self {
            token,
            access,
            disposition,
            binary,
        }
    }

    /// The token this mode was resolved from.
    pub fn token(&self) -> &'static str {
        self.token
    }

    /// The access direction bound at open time.
    pub fn access(&self) -> AccessMode {
        self.access
    }

    /// The create-vs-open policy for the native open.
    pub fn disposition(&self) -> Disposition {
        self.disposition
    }

    /// Whether data moves as raw bytes (no text decoding).
    pub fn is_binary(&self) -> bool {
        self.binary
    }

    /// Whether writes are legal under this mode.
    pub fn is_writable(&self) -> bool {
        self.access != AccessMode::ReadOnly
    }

    /// Whether reads are legal under this mode.
    pub fn is_readable(&self) -> bool {
        self.access != AccessMode::WriteOnly
    }
}

impl FromStr for OpenMode {
    type Err = LockedFileError;

    fn from_str(token: &str) -> Result<Self> {
        Self::resolve(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_all_eight_tokens() {
        let table = [
            ("w", AccessMode::WriteOnly, Disposition::TruncateOrCreate, false),
            ("wb", AccessMode::WriteOnly, Disposition::TruncateOrCreate, true),
            ("r", AccessMode::ReadOnly, Disposition::OpenExisting, false),
            ("rb", AccessMode::ReadOnly, Disposition::OpenExisting, true),
            ("a", AccessMode::Append, Disposition::CreateOrOpen, false),
            ("ab", AccessMode::Append, Disposition::CreateOrOpen, true),
            ("rw", AccessMode::ReadWrite, Disposition::CreateOrOpen, false),
            ("rwb", AccessMode::ReadWrite, Disposition::CreateOrOpen, true),
        ];

        for (token, access, disposition, binary) in table {
            let mode = OpenMode::resolve(token).unwrap();
            assert_eq!(mode.token(), token);
            assert_eq!(mode.access(), access);
            assert_eq!(mode.disposition(), disposition);
            assert_eq!(mode.is_binary(), binary);
        }
    }

    #[test]
    fn test_unrecognized_tokens_fail() {
        for bad in ["", "x", "br", "w+", "read", "RW", "wba"] {
            match OpenMode::resolve(bad) {
                Err(LockedFileError::InvalidMode { token }) => assert_eq!(token, bad),
                other => panic!("expected InvalidMode for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_direction_queries_match_token() {
        assert!(OpenMode::resolve("w").unwrap().is_writable());
        assert!(!OpenMode::resolve("w").unwrap().is_readable());

        assert!(!OpenMode::resolve("r").unwrap().is_writable());
        assert!(OpenMode::resolve("r").unwrap().is_readable());

        // Append handles accept reads too
        assert!(OpenMode::resolve("a").unwrap().is_writable());
        assert!(OpenMode::resolve("a").unwrap().is_readable());

        assert!(OpenMode::resolve("rw").unwrap().is_writable());
        assert!(OpenMode::resolve("rw").unwrap().is_readable());
    }

    #[test]
    fn test_from_str() {
        let mode: OpenMode = "rwb".parse().unwrap();
        assert_eq!(mode.access(), AccessMode::ReadWrite);
        assert!(mode.is_binary());
    }
}
