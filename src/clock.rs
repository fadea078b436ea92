//! Wall-clock seconds since the Unix epoch.
//!
//! Expiry timestamps and `now()` comparisons are both expressed as absolute
//! Unix seconds, matching the host process's own clock rather than a
//! monotonic `Instant` — the cache makes no guarantee about behavior across
//! a system clock step.

use std::time::{SystemTime, UNIX_EPOCH};

pub(crate) fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
