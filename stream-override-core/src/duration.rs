//! Stream duration values.

/// Stream duration in milliseconds.
pub type DurationMs = i64;

/// Sentinel meaning "no duration recorded".
///
/// Never a real duration. Players that receive it keep whatever value the
/// replacement data carries, or fall back to the coarse
/// `lengthSeconds * 1000` approximation.
pub const UNSET_DURATION: DurationMs = DurationMs::MAX;

/// Returns `true` if `duration_ms` is the [`UNSET_DURATION`] sentinel.
#[inline]
pub const fn is_unset(duration_ms: DurationMs) -> bool {
    duration_ms == UNSET_DURATION
}
