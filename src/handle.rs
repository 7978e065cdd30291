//! The locked-handle component: filename validation, mode resolution, the
//! seek engine and the `LockedFile` state machine itself.

pub mod locked;
pub mod mode;
pub mod seek;
pub mod validation;

pub use locked::{LockedFile, Payload};
pub use mode::{AccessMode, Disposition, OpenMode};
pub use seek::Anchor;
pub use validation::{is_valid_filename, is_valid_filename_for, NamingRules};
