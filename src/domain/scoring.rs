/// Round scoring rules.
///
/// A correct answer is worth the whole seconds still on the clock
/// (rounded up) plus the target count itself:
///
///   round_score = ceil(remaining_ms / 1000) + target
///
/// `remaining_ms` is clamped to zero before the ceiling is taken, so a
/// late answer still earns `target` points.

use super::clock::Millis;

/// Whole seconds at or above which a correct answer earns the bonus effect.
pub const DEFAULT_BONUS_SECONDS: u32 = 10;

/// Time left on a round started at `started_at`, never below zero.
pub fn remaining_ms(time_limit_ms: Millis, started_at: Millis, now: Millis) -> Millis {
    let elapsed = now.saturating_sub(started_at);
    time_limit_ms.saturating_sub(elapsed)
}

/// Remaining time as whole seconds, rounded up.
pub fn seconds_left(remaining_ms: Millis) -> u32 {
    remaining_ms.div_ceil(1000) as u32
}

pub fn round_score(remaining_ms: Millis, target: u32) -> u32 {
    seconds_left(remaining_ms) + target
}

pub fn is_bonus(seconds_left: u32, bonus_seconds: u32) -> bool {
    seconds_left >= bonus_seconds
}

/// Timer display turns to the warning colour in the last five seconds.
pub fn is_running_low(seconds_left: u32) -> bool {
    seconds_left <= 5
}
