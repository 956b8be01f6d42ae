/// One-shot deferred transitions.
///
/// Every entry carries the game generation current when it was queued.
/// Restart bumps the generation, so anything queued before it comes back
/// out as stale and is dropped by the caller instead of applied.

use crate::domain::clock::Millis;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Deferred {
    StartRound,
}

#[derive(Clone, Copy, Debug)]
struct Pending {
    due: Millis,
    generation: u64,
    action: Deferred,
}

/// Outcome of draining a due entry.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Due {
    Apply(Deferred),
    Stale { action: Deferred, scheduled_in: u64 },
}

#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    pending: Vec<Pending>,
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler { pending: Vec::with_capacity(4) }
    }

    pub fn schedule(&mut self, due: Millis, generation: u64, action: Deferred) {
        self.pending.push(Pending { due, generation, action });
    }

    /// Remove every entry due at `now`, in due order, classified against
    /// the current generation.
    pub fn drain_due(&mut self, now: Millis, generation: u64) -> Vec<Due> {
        let mut ready: Vec<Pending> = Vec::new();
        self.pending.retain(|p| {
            if p.due <= now {
                ready.push(*p);
                false
            } else {
                true
            }
        });
        ready.sort_by_key(|p| p.due);
        ready
            .into_iter()
            .map(|p| {
                if p.generation == generation {
                    Due::Apply(p.action)
                } else {
                    Due::Stale { action: p.action, scheduled_in: p.generation }
                }
            })
            .collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_due_before_deadline() {
        let mut s = Scheduler::new();
        s.schedule(2_000, 0, Deferred::StartRound);
        assert!(s.drain_due(1_999, 0).is_empty());
        assert_eq!(s.len(), 1);
        assert_eq!(s.drain_due(2_000, 0), vec![Due::Apply(Deferred::StartRound)]);
        assert!(s.is_empty());
    }

    #[test]
    fn old_generation_comes_back_stale() {
        let mut s = Scheduler::new();
        s.schedule(500, 3, Deferred::StartRound);
        assert_eq!(
            s.drain_due(600, 4),
            vec![Due::Stale { action: Deferred::StartRound, scheduled_in: 3 }]
        );
    }

    #[test]
    fn drained_in_due_order() {
        let mut s = Scheduler::new();
        s.schedule(900, 1, Deferred::StartRound);
        s.schedule(300, 0, Deferred::StartRound);
        let out = s.drain_due(1_000, 1);
        assert_eq!(
            out,
            vec![
                Due::Stale { action: Deferred::StartRound, scheduled_in: 0 },
                Due::Apply(Deferred::StartRound),
            ]
        );
    }
}
