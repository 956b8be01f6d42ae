/// Events emitted by the round engine.
/// The presentation layer consumes these for notices, sound and effects.

use crate::domain::clock::Millis;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NoticeKind {
    Timeout,
    Correct,
    Bonus,
    Retry,
    GameOver,
}

/// Transient message shown over the playfield.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    pub expires_at: Millis,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    RoundStarted { round: u64, target: u32 },
    Correct { points: u32, seconds_left: u32 },
    Bonus { points: u32, seconds_left: u32 },
    WrongAnswer { guess: u32 },
    TimedOut { lives_left: u32 },
    GameOver { final_score: u32, new_best: bool },
    Restarted,
    Notice { kind: NoticeKind, text: String },
}
