//! Process exit statuses. Pass, declined and error are pairwise distinct.

/// Phase completed.
pub const PASS: i32 = 0;

/// Detect declined: the buildpack does not apply to this application.
pub const DETECT_FAIL: i32 = 100;

/// Fatal error of any kind.
pub const ERROR: i32 = 1;
