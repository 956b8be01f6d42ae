/// Round engine: every state transition of the game.
///
/// Per-frame processing order (see `tick`):
///   1. Expire the transient notice
///   2. Apply deferred transitions that came due (generation-checked)
///   3. Timeout check for the live round
///
/// The frame loop calls `tick` before applying that frame's input, so a
/// round whose clock reached zero this frame is lost to the timeout even if
/// the correct answer arrives in the same frame. A submission evaluated
/// before any tick saw the expiry is accepted and scores `target` points.

use rand::Rng;

use crate::domain::clock::Millis;
use crate::domain::creature::{self, Creature};
use crate::domain::round::{Round, MAX_COUNT, MIN_COUNT};
use crate::domain::scoring;
use super::event::{GameEvent, NoticeKind};
use super::save::BestScoreStore;
use super::schedule::{Deferred, Due};
use super::world::{GameState, GameStatus};

// ══════════════════════════════════════════════════════════════
// Round lifecycle
// ══════════════════════════════════════════════════════════════

/// Begin a new round: fresh target, creature and layout, selection back to 1.
pub fn start_round(state: &mut GameState, now: Millis) -> Vec<GameEvent> {
    let target = state.rng.gen_range(MIN_COUNT..=MAX_COUNT);
    state.creature = Creature::random(&mut state.rng);
    state.items = creature::layout(&mut state.rng, target);
    state.round = Round::new(target, now, state.rules.time_limit_ms);
    state.selection.reset();
    state.round_no += 1;

    tracing::info!(
        round = state.round_no,
        target,
        creature = state.creature.name(),
        generation = state.generation,
        "round started"
    );

    vec![GameEvent::RoundStarted { round: state.round_no, target }]
}

/// Advance the clock-driven parts of the game to `now`.
pub fn tick(state: &mut GameState, store: &mut dyn BestScoreStore, now: Millis) -> Vec<GameEvent> {
    let mut events = Vec::new();

    state.expire_message(now);
    resolve_deferred(state, now, &mut events);
    resolve_timeout(state, store, now, &mut events);

    events
}

/// Player commits `guess` as the answer for the live round.
pub fn submit(state: &mut GameState, guess: u32, now: Millis) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if state.round.ended || state.is_game_over() {
        return events;
    }

    if guess != state.round.target {
        tracing::debug!(round = state.round_no, guess, "wrong answer");
        events.push(GameEvent::WrongAnswer { guess });
        notify(state, NoticeKind::Retry, "Try again!", now, &mut events);
        return events;
    }

    state.round.ended = true;
    let remaining = state.round.remaining_at(now);
    let seconds_left = scoring::seconds_left(remaining);
    let points = scoring::round_score(remaining, state.round.target);
    state.ledger.apply_round_score(points);

    if scoring::is_bonus(seconds_left, state.rules.bonus_seconds) {
        tracing::info!(round = state.round_no, points, seconds_left, total = state.ledger.total_score, "bonus answer");
        events.push(GameEvent::Bonus { points, seconds_left });
        notify(state, NoticeKind::Bonus, &format!("🎉 Amazing! +{}", points), now, &mut events);
    } else {
        tracing::info!(round = state.round_no, points, seconds_left, total = state.ledger.total_score, "correct answer");
        events.push(GameEvent::Correct { points, seconds_left });
        notify(state, NoticeKind::Correct, &format!("✓ Correct! +{}", points), now, &mut events);
    }

    schedule_next_round(state, now);
    events
}

/// New game: full lives, zero score, fresh round. Pending transitions from
/// the previous game become stale.
pub fn restart(state: &mut GameState, now: Millis) -> Vec<GameEvent> {
    state.generation += 1;
    state.ledger.reset();
    state.status = GameStatus::Playing;
    state.notice = None;

    tracing::info!(generation = state.generation, "game restarted");

    let mut events = vec![GameEvent::Restarted];
    events.extend(start_round(state, now));
    events
}

/// Nudge the highlighted number, clamped to [1, 10].
pub fn move_selection(state: &mut GameState, delta: i64) {
    state.selection.step(delta);
}

/// Highlight `n` and submit it in one gesture.
pub fn select_and_submit(state: &mut GameState, n: u32, now: Millis) -> Vec<GameEvent> {
    state.selection.set(n as i64);
    let guess = state.selection.current();
    submit(state, guess, now)
}

// ══════════════════════════════════════════════════════════════
// Tick phases
// ══════════════════════════════════════════════════════════════

fn resolve_deferred(state: &mut GameState, now: Millis, events: &mut Vec<GameEvent>) {
    for due in state.scheduler.drain_due(now, state.generation) {
        match due {
            Due::Apply(Deferred::StartRound) => {
                // Idempotent against the current state: only an ended round
                // in a running game is replaced.
                if state.status == GameStatus::Playing && state.round.ended {
                    events.extend(start_round(state, now));
                } else {
                    tracing::debug!(round = state.round_no, "deferred round start not needed");
                }
            }
            Due::Stale { action, scheduled_in } => {
                tracing::debug!(?action, scheduled_in, current = state.generation, "discarded stale transition");
            }
        }
    }
}

fn resolve_timeout(
    state: &mut GameState,
    store: &mut dyn BestScoreStore,
    now: Millis,
    events: &mut Vec<GameEvent>,
) {
    if state.round.ended || !state.round.is_expired_at(now) {
        return;
    }

    state.round.ended = true;
    let lives_left = state.ledger.lose_life();
    tracing::info!(round = state.round_no, lives_left, "round timed out");
    events.push(GameEvent::TimedOut { lives_left });

    if state.ledger.is_depleted() {
        end_game(state, store, now, events);
    } else {
        notify(
            state,
            NoticeKind::Timeout,
            &format!("Time's up! Lives left: {}", lives_left),
            now,
            events,
        );
        schedule_next_round(state, now);
    }
}

fn end_game(
    state: &mut GameState,
    store: &mut dyn BestScoreStore,
    now: Millis,
    events: &mut Vec<GameEvent>,
) {
    state.status = GameStatus::GameOver;
    let final_score = state.ledger.total_score;
    let improved = state.ledger.end_game();

    if let Some(best) = improved {
        if let Err(e) = store.save_best_score(best) {
            tracing::warn!(error = %e, best, "best score not saved");
        }
    }

    tracing::info!(final_score, best = state.ledger.best_score, new_best = improved.is_some(), "game over");
    events.push(GameEvent::GameOver { final_score, new_best: improved.is_some() });
    notify(
        state,
        NoticeKind::GameOver,
        &format!("Game Over! Final Score: {}", final_score),
        now,
        events,
    );
}

// ══════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════

fn schedule_next_round(state: &mut GameState, now: Millis) {
    let due = now + state.rules.round_delay_ms;
    state.scheduler.schedule(due, state.generation, Deferred::StartRound);
}

fn notify(state: &mut GameState, kind: NoticeKind, text: &str, now: Millis, events: &mut Vec<GameEvent>) {
    state.set_message(kind, text, now);
    events.push(GameEvent::Notice { kind, text: text.to_string() });
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoundConfig;
    use crate::sim::save::MemoryStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const LIMIT: Millis = 15_000;
    const DELAY: Millis = 2_000;

    fn game_with_best(seed: u64, best: u32) -> (GameState, MemoryStore) {
        let store = MemoryStore { best, writes: 0 };
        let state = GameState::new(RoundConfig::default(), best, StdRng::seed_from_u64(seed), 0);
        (state, store)
    }

    fn game(seed: u64) -> (GameState, MemoryStore) {
        game_with_best(seed, 0)
    }

    /// Force a known target and a matching layout.
    fn set_target(state: &mut GameState, target: u32) {
        state.round.target = target;
        state.items = crate::domain::creature::layout(&mut state.rng, target);
    }

    /// Let the live round run out and tick once at the exact expiry moment.
    fn expire_round(state: &mut GameState, store: &mut MemoryStore) -> Vec<GameEvent> {
        let at = state.round.started_at + state.round.time_limit_ms;
        tick(state, store, at)
    }

    fn wrong_guess(state: &GameState) -> u32 {
        if state.round.target == 1 { 2 } else { 1 }
    }

    // ── start_round ──

    #[test]
    fn start_round_produces_target_items() {
        let (mut g, _) = game(1);
        for i in 0..200 {
            start_round(&mut g, i * 10);
            let t = g.round.target;
            assert!((1..=10).contains(&t), "target {t} out of range");
            assert_eq!(g.items.len(), t as usize);
            assert!(g.round.is_live());
            assert_eq!(g.selection.current(), 1);
        }
    }

    #[test]
    fn targets_cover_whole_range() {
        let (mut g, _) = game(2);
        let mut seen = [false; 11];
        for _ in 0..500 {
            start_round(&mut g, 0);
            seen[g.round.target as usize] = true;
        }
        assert!(seen[1..=10].iter().all(|s| *s));
        assert!(!seen[0]);
    }

    #[test]
    fn start_round_resets_selection() {
        let (mut g, _) = game(3);
        move_selection(&mut g, 4);
        assert_eq!(g.selection.current(), 5);
        start_round(&mut g, 50);
        assert_eq!(g.selection.current(), 1);
        assert_eq!(g.round.started_at, 50);
    }

    // ── submit: scoring ──

    #[test]
    fn correct_answer_scores_seconds_plus_target() {
        let (mut g, _) = game(4);
        set_target(&mut g, 7);
        let events = submit(&mut g, 7, 3_000);
        assert!(g.round.ended);
        assert_eq!(g.ledger.total_score, 19);
        assert!(events.contains(&GameEvent::Bonus { points: 19, seconds_left: 12 }));
    }

    #[test]
    fn bonus_exactly_at_boundary() {
        let (mut g, _) = game(5);
        set_target(&mut g, 3);
        let events = submit(&mut g, 3, 5_000);
        assert!(events.contains(&GameEvent::Bonus { points: 13, seconds_left: 10 }));
        assert_eq!(g.notice.as_ref().unwrap().kind, NoticeKind::Bonus);
        assert_eq!(g.notice.as_ref().unwrap().text, "🎉 Amazing! +13");
    }

    #[test]
    fn one_millisecond_past_boundary_still_rounds_to_ten() {
        let (mut g, _) = game(6);
        set_target(&mut g, 3);
        let events = submit(&mut g, 3, 5_001);
        assert!(events.contains(&GameEvent::Bonus { points: 13, seconds_left: 10 }));
    }

    #[test]
    fn below_threshold_is_plain_correct() {
        let (mut g, _) = game(7);
        set_target(&mut g, 3);
        let events = submit(&mut g, 3, 6_000);
        assert!(events.contains(&GameEvent::Correct { points: 12, seconds_left: 9 }));
        assert_eq!(g.notice.as_ref().unwrap().kind, NoticeKind::Correct);
        assert_eq!(g.notice.as_ref().unwrap().text, "✓ Correct! +12");
    }

    #[test]
    fn late_submission_before_any_tick_scores_target() {
        let (mut g, _) = game(8);
        set_target(&mut g, 6);
        let events = submit(&mut g, 6, LIMIT + 500);
        assert!(events.contains(&GameEvent::Correct { points: 6, seconds_left: 0 }));
        assert_eq!(g.ledger.lives, 3);
    }

    // ── submit: wrong / ignored ──

    #[test]
    fn wrong_answer_keeps_round_live() {
        let (mut g, _) = game(9);
        let guess = wrong_guess(&g);
        let events = submit(&mut g, guess, 1_000);
        assert!(g.round.is_live());
        assert_eq!(g.ledger.total_score, 0);
        assert_eq!(g.ledger.lives, 3);
        assert!(events.contains(&GameEvent::WrongAnswer { guess }));
        assert_eq!(g.notice.as_ref().unwrap().kind, NoticeKind::Retry);
        assert!(g.scheduler.is_empty());

        // and may resubmit
        let target = g.round.target;
        submit(&mut g, target, 2_000);
        assert!(g.round.ended);
    }

    #[test]
    fn submit_after_round_ended_is_ignored() {
        let (mut g, _) = game(10);
        let target = g.round.target;
        submit(&mut g, target, 1_000);
        let before = g.snapshot(1_500);
        let events = submit(&mut g, target, 1_500);
        assert!(events.is_empty());
        assert_eq!(g.snapshot(1_500), before);
        assert_eq!(g.scheduler.len(), 1);
    }

    #[test]
    fn submit_during_game_over_is_ignored() {
        let (mut g, mut store) = game(11);
        for _ in 0..3 {
            expire_round(&mut g, &mut store);
            let t = g.round.started_at + LIMIT + DELAY;
            tick(&mut g, &mut store, t);
        }
        assert_eq!(g.status, GameStatus::GameOver);
        let now = 200_000;
        let before = g.snapshot(now);
        let target = g.round.target;
        let wrong = wrong_guess(&g);
        assert!(submit(&mut g, target, now).is_empty());
        assert!(submit(&mut g, wrong, now).is_empty());
        assert_eq!(g.snapshot(now), before);
    }

    // ── tick: timeout ──

    #[test]
    fn timeout_costs_exactly_one_life() {
        let (mut g, mut store) = game(12);
        let events = expire_round(&mut g, &mut store);
        assert!(g.round.ended);
        assert_eq!(g.ledger.lives, 2);
        assert!(events.contains(&GameEvent::TimedOut { lives_left: 2 }));
        assert_eq!(g.notice.as_ref().unwrap().text, "Time's up! Lives left: 2");

        for t in [LIMIT, LIMIT + 1, LIMIT + 100, LIMIT + 1_999] {
            tick(&mut g, &mut store, t);
        }
        assert_eq!(g.ledger.lives, 2);
    }

    #[test]
    fn no_timeout_before_limit() {
        let (mut g, mut store) = game(13);
        tick(&mut g, &mut store, LIMIT - 1);
        assert!(g.round.is_live());
        assert_eq!(g.ledger.lives, 3);
    }

    #[test]
    fn next_round_starts_after_delay() {
        let (mut g, mut store) = game(14);
        expire_round(&mut g, &mut store);
        tick(&mut g, &mut store, LIMIT + DELAY - 1);
        assert!(g.round.ended);
        assert_eq!(g.round_no, 1);

        let events = tick(&mut g, &mut store, LIMIT + DELAY);
        assert!(g.round.is_live());
        assert_eq!(g.round_no, 2);
        assert_eq!(g.round.started_at, LIMIT + DELAY);
        assert!(matches!(events[0], GameEvent::RoundStarted { round: 2, .. }));
    }

    #[test]
    fn correct_answer_schedules_next_round() {
        let (mut g, mut store) = game(15);
        let target = g.round.target;
        submit(&mut g, target, 4_000);
        tick(&mut g, &mut store, 5_999);
        assert_eq!(g.round_no, 1);
        tick(&mut g, &mut store, 6_000);
        assert_eq!(g.round_no, 2);
        assert!(g.round.is_live());
        // The old round's deadline no longer matters.
        tick(&mut g, &mut store, LIMIT + 10);
        assert_eq!(g.ledger.lives, 3);
    }

    #[test]
    fn timeout_wins_when_checked_first_in_frame() {
        let (mut g, mut store) = game(16);
        let target = g.round.target;
        let frame = LIMIT;
        expire_round(&mut g, &mut store);
        let events = submit(&mut g, target, frame);
        assert!(events.is_empty());
        assert_eq!(g.ledger.total_score, 0);
        assert_eq!(g.ledger.lives, 2);
    }

    #[test]
    fn notice_clears_after_display_time() {
        let (mut g, mut store) = game(17);
        let wrong = wrong_guess(&g);
        submit(&mut g, wrong, 1_000);
        tick(&mut g, &mut store, 2_499);
        assert!(g.notice.is_some());
        tick(&mut g, &mut store, 2_500);
        assert!(g.notice.is_none());
    }

    // ── game over / persistence ──

    fn play_to_game_over(g: &mut GameState, store: &mut MemoryStore) {
        while g.status == GameStatus::Playing {
            expire_round(g, store);
            let t = g.round.started_at + LIMIT + DELAY;
            tick(g, store, t);
        }
    }

    #[test]
    fn losing_all_lives_ends_game_and_persists_once() {
        let (mut g, mut store) = game_with_best(18, 4);
        let target = g.round.target;
        submit(&mut g, target, 1_000);
        let scored = g.ledger.total_score;
        assert!(scored > 4);
        tick(&mut g, &mut store, 1_000 + DELAY);

        play_to_game_over(&mut g, &mut store);
        assert_eq!(g.ledger.lives, 0);
        assert_eq!(g.ledger.best_score, scored);
        assert_eq!(store.best, scored);
        assert_eq!(store.writes, 1);
        assert_eq!(g.notice.as_ref().unwrap().kind, NoticeKind::GameOver);

        // Further ticks neither persist again nor start rounds.
        let round_no = g.round_no;
        for t in (0..10).map(|i| 500_000 + i * 5_000) {
            tick(&mut g, &mut store, t);
        }
        assert_eq!(store.writes, 1);
        assert_eq!(g.round_no, round_no);
        assert_eq!(g.status, GameStatus::GameOver);
    }

    #[test]
    fn game_over_without_record_does_not_write() {
        let (mut g, mut store) = game_with_best(19, 500);
        play_to_game_over(&mut g, &mut store);
        assert_eq!(store.writes, 0);
        assert_eq!(g.ledger.best_score, 500);
    }

    #[test]
    fn last_life_schedules_nothing() {
        let (mut g, mut store) = game(20);
        g.ledger.lives = 1;
        let events = expire_round(&mut g, &mut store);
        assert_eq!(g.status, GameStatus::GameOver);
        assert!(g.scheduler.is_empty());
        assert!(events.iter().any(|e| matches!(e, GameEvent::GameOver { final_score: 0, new_best: false })));
    }

    // ── restart ──

    #[test]
    fn restart_resets_ledger_and_starts_round() {
        let (mut g, mut store) = game_with_best(21, 0);
        let target = g.round.target;
        submit(&mut g, target, 500);
        tick(&mut g, &mut store, 500 + DELAY);
        play_to_game_over(&mut g, &mut store);
        let best = g.ledger.best_score;

        let events = restart(&mut g, 900_000);
        assert_eq!(g.status, GameStatus::Playing);
        assert_eq!(g.ledger.lives, 3);
        assert_eq!(g.ledger.total_score, 0);
        assert_eq!(g.ledger.best_score, best);
        assert!(g.round.is_live());
        assert_eq!(g.round.started_at, 900_000);
        assert_eq!(g.items.len(), g.round.target as usize);
        assert_eq!(events[0], GameEvent::Restarted);
    }

    #[test]
    fn restart_draws_a_fresh_target() {
        let (mut g, _) = game(22);
        let mut targets = std::collections::HashSet::new();
        for i in 0..50 {
            restart(&mut g, i * 100);
            targets.insert(g.round.target);
        }
        assert!(targets.len() > 1);
    }

    #[test]
    fn stale_round_start_after_restart_is_discarded() {
        let (mut g, mut store) = game(23);
        let target = g.round.target;
        submit(&mut g, target, 1_000); // queues a start at 3_000

        restart(&mut g, 1_500);
        let fresh_round = g.round_no;
        let fresh_target = g.round.target;
        let fresh_start = g.round.started_at;

        tick(&mut g, &mut store, 3_000);
        assert_eq!(g.round_no, fresh_round);
        assert_eq!(g.round.target, fresh_target);
        assert_eq!(g.round.started_at, fresh_start);
        assert!(g.scheduler.is_empty());
    }

    #[test]
    fn stale_start_does_not_replace_a_resolved_round_of_new_game() {
        let (mut g, mut store) = game(24);
        expire_round(&mut g, &mut store); // queues start at LIMIT + DELAY, gen 0
        restart(&mut g, LIMIT + 100);
        let target = g.round.target;
        submit(&mut g, target, LIMIT + 200); // queues start at LIMIT + 2200, gen 1
        let round_no = g.round_no;

        tick(&mut g, &mut store, LIMIT + DELAY);
        assert_eq!(g.round_no, round_no);
        assert!(g.round.ended);

        tick(&mut g, &mut store, LIMIT + 200 + DELAY);
        assert_eq!(g.round_no, round_no + 1);
        assert!(g.round.is_live());
    }

    // ── selection ──

    #[test]
    fn selection_moves_and_clamps() {
        let (mut g, _) = game(25);
        for _ in 0..3 {
            move_selection(&mut g, -1);
        }
        assert_eq!(g.selection.current(), 1);
        for _ in 0..15 {
            move_selection(&mut g, 1);
        }
        assert_eq!(g.selection.current(), 10);
    }

    #[test]
    fn select_and_submit_updates_highlight() {
        let (mut g, _) = game(26);
        let target = g.round.target;
        select_and_submit(&mut g, target, 2_000);
        assert_eq!(g.selection.current(), target);
        assert!(g.round.ended);
    }
}
