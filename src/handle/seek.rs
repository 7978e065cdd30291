//! Cursor-position normalization for seek and read operations.
//!
//! This module contains the pure math behind every cursor movement: translating
//! a relative offset plus a named anchor into an absolute position, and clamping
//! a requested read length against the current cursor and file size. Both
//! functions are stateless so they behave identically on every platform.

use crate::error::{LockedFileError, Result};
use std::str::FromStr;

/// Reference point from which a seek offset is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Measure from position zero (the start of the file).
    Begin,
    /// Measure from the current cursor position.
    Current,
    /// Measure from end-of-file.
    End,
}

impl Anchor {
    /// The external token for this anchor (`begin`, `current` or `end`).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Begin => "begin",
            Self::Current => "current",
            Self::End => "end",
        }
    }
}

impl FromStr for Anchor {
    type Err = LockedFileError;

    fn from_str(token: &str) -> Result<Self> {
        match token {
            "begin" => Ok(Self::Begin),
            "current" => Ok(Self::Current),
            "end" => Ok(Self::End),
            _ => Err(LockedFileError::InvalidAnchor {
                token: token.to_string(),
            }),
        }
    }
}

/// Translate `(anchor, offset)` into an absolute cursor position.
///
/// # Arguments
/// * `anchor` - Reference point the offset is measured from
/// * `offset` - Signed displacement in bytes
/// * `current` - The cursor position before the seek
/// * `size` - The file size in bytes
///
/// # Clamping
/// * Targets below zero clamp to 0
/// * Targets above `i64::MAX` (the largest addressable offset) clamp to it
/// * No upper clamp to `size`: seeking past end-of-file is legal and only
///   affects subsequent reads/writes
///
/// The `End` anchor is the `Current` rule applied after anchoring the cursor
/// at `size`, so both share the same lower clamp.
pub fn resolve_position(anchor: Anchor, offset: i64, current: u64, size: u64) -> u64 {
    let base = match anchor {
        Anchor::Begin => 0,
        Anchor::Current => current as i128,
        Anchor::End => size as i128,
    };

    let target = base + offset as i128;
    target.clamp(0, i64::MAX as i128) as u64
}

/// Clamp a requested read length against the cursor position and file size.
///
/// Negative lengths follow the negative-slice convention: `n = -1` means
/// "through end-of-file", `n = -2` stops one byte short of it, and so on.
///
/// # Rules (applied in order)
/// 1. Cursor at or past end-of-file: nothing to read, length 0
/// 2. `n < 0`: length is `size - pos + n + 1`, floored at 0
/// 3. `pos + n` overruns the file: length is `size - pos`
/// 4. Otherwise: `n` as requested
///
/// The result never exceeds `size - pos`, so a transfer of the returned
/// length can never overrun the file.
pub fn clamp_read_len(pos: u64, size: u64, n: i64) -> u64 {
    if pos >= size {
        return 0;
    }

    let remaining = (size - pos) as i128;

    if n < 0 {
        let len = remaining + n as i128 + 1;
        len.max(0) as u64
    } else if n as i128 > remaining {
        remaining as u64
    } else {
        n as u64
    }
}
