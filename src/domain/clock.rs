/// Time source for the frame loop.
///
/// Every timing decision in the game is made from millisecond timestamps
/// handed in by the caller, never from frame counts. `SystemClock` reads a
/// monotonic clock anchored at construction; tests drive `ManualClock`.

use std::time::Instant;

/// Milliseconds since the clock's origin.
pub type Millis = u64;

pub trait Clock {
    fn now(&self) -> Millis;
}

pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock { origin: Instant::now() }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Millis {
        self.origin.elapsed().as_millis() as Millis
    }
}

/// Hand-advanced clock for deterministic tests.
#[cfg(test)]
pub struct ManualClock {
    now: std::cell::Cell<Millis>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new(start: Millis) -> Self {
        ManualClock { now: std::cell::Cell::new(start) }
    }

    pub fn advance(&self, ms: Millis) {
        self.now.set(self.now.get() + ms);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> Millis {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(1_000);
        assert_eq!(clock.now(), 1_000);
        clock.advance(250);
        assert_eq!(clock.now(), 1_250);
    }
}
