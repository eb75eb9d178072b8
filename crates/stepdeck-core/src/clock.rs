//! Wall-clock timestamps for audit stamping.

/// Current wall-clock time in integer microseconds.
///
/// All `*_at_us` columns store this representation.
#[must_use]
pub fn now_us() -> i64 {
    chrono::Utc::now().timestamp_micros()
}
