//! CLI command implementations.

pub mod check;
pub mod transforms;
pub mod verify;

/// Exit status for ALLOW and for successful housekeeping commands.
pub const EXIT_ALLOW: u8 = 0;
pub const EXIT_DENY: u8 = 1;
/// Exit status when no outcome could be produced.
pub const EXIT_FAILURE: u8 = 2;
