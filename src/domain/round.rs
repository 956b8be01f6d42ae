/// Round and selection data.
///
/// A `Round` is one countdown with a fixed target. It is live until
/// `ended` flips, which happens exactly once: on a correct answer or on
/// timeout. `Selection` is the player's highlighted candidate.

use super::clock::Millis;
use super::scoring;

pub const MIN_COUNT: u32 = 1;
pub const MAX_COUNT: u32 = 10;
pub const DEFAULT_TIME_LIMIT_MS: Millis = 15_000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Round {
    pub target: u32,
    pub started_at: Millis,
    pub time_limit_ms: Millis,
    pub ended: bool,
}

impl Round {
    pub fn new(target: u32, started_at: Millis, time_limit_ms: Millis) -> Self {
        Round {
            target: clamp_count(target),
            started_at,
            time_limit_ms,
            ended: false,
        }
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        !self.ended
    }

    pub fn remaining_at(&self, now: Millis) -> Millis {
        scoring::remaining_ms(self.time_limit_ms, self.started_at, now)
    }

    pub fn seconds_left_at(&self, now: Millis) -> u32 {
        scoring::seconds_left(self.remaining_at(now))
    }

    pub fn is_expired_at(&self, now: Millis) -> bool {
        self.remaining_at(now) == 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    current: u32,
}

impl Selection {
    pub fn new() -> Self {
        Selection { current: MIN_COUNT }
    }

    #[inline]
    pub fn current(&self) -> u32 {
        self.current
    }

    /// Any value is accepted and clamped into [1, 10].
    pub fn set(&mut self, value: i64) {
        self.current = value.clamp(MIN_COUNT as i64, MAX_COUNT as i64) as u32;
    }

    pub fn step(&mut self, delta: i64) {
        self.set(self.current as i64 + delta);
    }

    pub fn reset(&mut self) {
        self.current = MIN_COUNT;
    }
}

impl Default for Selection {
    fn default() -> Self {
        Selection::new()
    }
}

#[inline]
pub fn clamp_count(n: u32) -> u32 {
    n.clamp(MIN_COUNT, MAX_COUNT)
}
