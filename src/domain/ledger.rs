/// Lives and score bookkeeping.
///
/// `best_score` is loaded once at startup and only moves when a game ends
/// with a higher total. `end_game` reports whether the best score improved
/// so the caller can persist it; it is idempotent per game.

pub const STARTING_LIVES: u32 = 3;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ledger {
    pub lives: u32,
    pub total_score: u32,
    pub best_score: u32,
    game_closed: bool,
}

impl Ledger {
    pub fn new(best_score: u32) -> Self {
        Ledger {
            lives: STARTING_LIVES,
            total_score: 0,
            best_score,
            game_closed: false,
        }
    }

    pub fn apply_round_score(&mut self, points: u32) {
        self.total_score = self.total_score.saturating_add(points);
    }

    /// Take one life. Returns the lives left.
    pub fn lose_life(&mut self) -> u32 {
        self.lives = self.lives.saturating_sub(1);
        self.lives
    }

    #[inline]
    pub fn is_depleted(&self) -> bool {
        self.lives == 0
    }

    /// Close the current game. Returns `Some(best)` when the total beat the
    /// stored best and it needs persisting; `None` otherwise or when the
    /// game was already closed.
    pub fn end_game(&mut self) -> Option<u32> {
        if self.game_closed {
            return None;
        }
        self.game_closed = true;
        if self.total_score > self.best_score {
            self.best_score = self.total_score;
            Some(self.best_score)
        } else {
            None
        }
    }

    /// Fresh game: full lives, zero score. Best score survives.
    pub fn reset(&mut self) {
        self.lives = STARTING_LIVES;
        self.total_score = 0;
        self.game_closed = false;
    }
}
