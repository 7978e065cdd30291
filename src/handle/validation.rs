//! Filename validation gating every open.
//!
//! Control characters are rejected on every platform. Under the Windows naming
//! rules, path components are additionally checked against the reserved device
//! names and the structural/forbidden glyph set. The worker is parameterized on
//! a rule set so the Windows rules stay testable on any host; callers normally
//! go through [`is_valid_filename`], which applies the host's rules.

/// Platform naming rules applied during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingRules {
    /// Reserved device names and forbidden glyphs enforced per component.
    Windows,
    /// Only the universal control-character rule applies.
    Unix,
}

impl NamingRules {
    /// The rule set of the compilation target.
    pub fn host() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Unix
        }
    }
}

/// Device names the Windows filesystem reserves. A component is rejected when
/// its uppercase form merely starts with one of these, so `con.txt` and
/// `lpt1_backup` are both invalid.
const RESERVED_DEVICE_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "CLOCK$", "NUL", "COM0", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6",
    "COM7", "COM8", "COM9", "LPT0", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8",
    "LPT9",
];

/// Characters that may not appear inside a Windows path component. `/` is in
/// this set, so forward-slash-separated paths never pass the Windows rules;
/// components are split on `\` only.
const FORBIDDEN_GLYPHS: &[char] = &['<', '>', ':', '"', '/', '|', '?', '*'];

/// Check whether a filename is legal to open on the current platform.
///
/// Pure and deterministic: no I/O, no side effects.
pub fn is_valid_filename(name: &str) -> bool {
    is_valid_filename_for(name, NamingRules::host())
}

/// Check a filename against an explicit rule set.
pub fn is_valid_filename_for(name: &str, rules: NamingRules) -> bool {
    // Control characters (code points 0-31) are illegal everywhere.
    if name.chars().any(|c| (c as u32) < 32) {
        return false;
    }

    if rules == NamingRules::Unix {
        return true;
    }

    // Reserved device names are checked before the drive prefix is stripped.
    for component in name.split('\\') {
        let upper = component.to_uppercase();
        if RESERVED_DEVICE_NAMES
            .iter()
            .any(|reserved| upper.starts_with(reserved))
        {
            return false;
        }
    }

    // The drive prefix carries a legal colon; strip it (and its separator)
    // before the glyph scan.
    let stripped = strip_drive_prefix(name);

    stripped
        .split('\\')
        .all(|component| !component.contains(FORBIDDEN_GLYPHS))
}

/// Remove a leading `X:` drive prefix and the separator that follows it.
fn strip_drive_prefix(name: &str) -> &str {
    let bytes = name.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        let rest = &name[2..];
        rest.strip_prefix('\\').unwrap_or(rest)
    } else {
        name
    }
}
