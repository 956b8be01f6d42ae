/// GameState: the complete state of a running game.
///
/// One owned aggregate holds everything the round engine mutates:
///   - `round`     — the current countdown (live until `ended`)
///   - `selection` — the player's highlighted candidate
///   - `ledger`    — lives, total score, best score
///   - `status`    — Playing / GameOver
///
/// Engine operations in `step` take `&mut GameState` plus the frame's
/// timestamp. The presentation layer only ever sees a `Snapshot`.
///
/// ## Generation
///
/// `generation` increments on every restart. Deferred transitions capture
/// it when queued and are discarded if it has moved on by the time they
/// come due.

use rand::rngs::StdRng;

use crate::config::RoundConfig;
use crate::domain::clock::Millis;
use crate::domain::creature::{Creature, Item};
use crate::domain::ledger::Ledger;
use crate::domain::round::{Round, Selection};
use super::event::{Notice, NoticeKind};
use super::schedule::Scheduler;
use super::step;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameStatus {
    Playing,
    GameOver,
}

pub struct GameState {
    pub status: GameStatus,
    pub round: Round,
    pub selection: Selection,
    pub ledger: Ledger,

    // ── Round layout ──
    pub creature: Creature,
    pub items: Vec<Item>,

    // ── Sequencing ──
    pub generation: u64,
    pub round_no: u64,
    pub scheduler: Scheduler,

    // ── UI ──
    pub notice: Option<Notice>,

    pub rules: RoundConfig,
    pub(crate) rng: StdRng,
}

/// Per-frame view handed to the presentation layer.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub status: GameStatus,
    pub round: RoundView,
    pub selection: u32,
    pub lives: u32,
    pub total_score: u32,
    pub best_score: u32,
    pub creature: Creature,
    pub items: Vec<Item>,
    pub notice: Option<Notice>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundView {
    pub target: u32,
    pub remaining_ms: Millis,
    pub seconds_left: u32,
}

// ── Construction ──

impl GameState {
    /// Build a game with the given best score and start its first round.
    pub fn new(rules: RoundConfig, best_score: u32, rng: StdRng, now: Millis) -> Self {
        let mut state = GameState {
            status: GameStatus::Playing,
            round: Round::new(1, now, rules.time_limit_ms),
            selection: Selection::new(),
            ledger: Ledger::new(best_score),
            creature: Creature::Mermaid,
            items: vec![],
            generation: 0,
            round_no: 0,
            scheduler: Scheduler::new(),
            notice: None,
            rules,
            rng,
        };
        step::start_round(&mut state, now);
        state
    }

    pub fn snapshot(&self, now: Millis) -> Snapshot {
        let remaining_ms = self.round.remaining_at(now);
        Snapshot {
            status: self.status,
            round: RoundView {
                target: self.round.target,
                remaining_ms,
                seconds_left: crate::domain::scoring::seconds_left(remaining_ms),
            },
            selection: self.selection.current(),
            lives: self.ledger.lives,
            total_score: self.ledger.total_score,
            best_score: self.ledger.best_score,
            creature: self.creature,
            items: self.items.clone(),
            notice: self.notice.clone(),
        }
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.status == GameStatus::GameOver
    }

    pub fn set_message(&mut self, kind: NoticeKind, text: &str, now: Millis) {
        self.notice = Some(Notice {
            kind,
            text: text.to_string(),
            expires_at: now + self.rules.notice_ms,
        });
    }

    /// Drop the notice once its display time has passed.
    pub fn expire_message(&mut self, now: Millis) {
        if self.notice.as_ref().is_some_and(|n| now >= n.expires_at) {
            self.notice = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn game(now: Millis) -> GameState {
        GameState::new(RoundConfig::default(), 5, StdRng::seed_from_u64(11), now)
    }

    #[test]
    fn new_game_has_a_live_round() {
        let g = game(100);
        assert_eq!(g.status, GameStatus::Playing);
        assert!(g.round.is_live());
        assert_eq!(g.round.started_at, 100);
        assert_eq!(g.items.len(), g.round.target as usize);
        assert_eq!(g.selection.current(), 1);
        assert_eq!(g.ledger.best_score, 5);
        assert_eq!(g.round_no, 1);
    }

    #[test]
    fn snapshot_reflects_timer() {
        let g = game(0);
        let snap = g.snapshot(3_500);
        assert_eq!(snap.round.remaining_ms, 11_500);
        assert_eq!(snap.round.seconds_left, 12);
        assert_eq!(snap.lives, 3);
        assert_eq!(snap.total_score, 0);
        assert_eq!(snap.items.len() as u32, snap.round.target);
    }

    #[test]
    fn message_expires_after_notice_time() {
        let mut g = game(0);
        g.set_message(NoticeKind::Retry, "Try again!", 1_000);
        g.expire_message(2_499);
        assert!(g.notice.is_some());
        g.expire_message(2_500);
        assert!(g.notice.is_none());
    }
}
