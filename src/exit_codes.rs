//! Exit code policy for check-icinga.
//!
//! Follows the Nagios plugin convention so Icinga/Nagios can schedule the
//! plugin directly:
//!
//! - `0` = OK (everything within thresholds)
//! - `1` = WARNING (warning threshold reached)
//! - `2` = CRITICAL (critical threshold, shrinking population, or timeout)
//! - `3` = UNKNOWN (we could not check: bad flags, no mode, HTTP or payload errors)
//!
//! Findings (0-2) and "could not check" (3) never overlap, so automation can
//! tell "the remote monitoring reports problems" apart from "the plugin broke".

/// Exit code: all entities within thresholds
pub const OK: i32 = 0;

/// Exit code: warning threshold reached
pub const WARNING: i32 = 1;

/// Exit code: critical finding
pub const CRITICAL: i32 = 2;

/// Exit code: operational failure or caller misuse
pub const UNKNOWN: i32 = 3;
