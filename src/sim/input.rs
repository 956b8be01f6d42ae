/// Input resolution: raw key/pointer events → game actions.
///
/// Nothing here knows about terminals or rendering. The UI layer converts
/// device events into `InputEvent`s (pointer positions in device units plus
/// the device→logical scale factors) and this module decides what they mean
/// for the current `GameStatus`.
///
/// ## Number bar hit boxes (logical 800×600 space)
///
///   box i (1..=10) centre x = 50 + (i-1)*70, half-width 20
///   all boxes share the band y = 30 ± 20
///
/// Edges are inclusive.

use crate::domain::clock::Millis;
use crate::domain::round::{MAX_COUNT, MIN_COUNT};
use super::event::GameEvent;
use super::step;
use super::world::{GameState, GameStatus};

pub const BAR_Y: f32 = 30.0;
pub const BAR_START_X: f32 = 50.0;
pub const BAR_SPACING: f32 = 70.0;
pub const BOX_HALF_WIDTH: f32 = 20.0;
pub const BOX_HALF_HEIGHT: f32 = 20.0;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Key {
    Left,
    Right,
    Confirm,
    Other,
}

impl Key {
    /// Map a key identifier (`"ArrowLeft"`, `" "`, ...) to a game key.
    pub fn from_name(name: &str) -> Key {
        match name {
            "ArrowLeft" | "a" | "A" => Key::Left,
            "ArrowRight" | "d" | "D" => Key::Right,
            " " | "Space" | "Enter" => Key::Confirm,
            _ => Key::Other,
        }
    }
}

/// Pointer-down / touch-start in device units.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Pointer {
    pub x: f32,
    pub y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl Pointer {
    pub fn logical(&self) -> (f32, f32) {
        (self.x * self.scale_x, self.y * self.scale_y)
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum InputEvent {
    Key(Key),
    Pointer(Pointer),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    Move(i64),
    Submit,
    SelectAndSubmit(u32),
    Restart,
}

/// Centre x of number box `n`.
pub fn box_center_x(n: u32) -> f32 {
    BAR_START_X + (n as f32 - 1.0) * BAR_SPACING
}

/// Which number box, if any, contains the logical point.
pub fn hit_test(x: f32, y: f32) -> Option<u32> {
    if y < BAR_Y - BOX_HALF_HEIGHT || y > BAR_Y + BOX_HALF_HEIGHT {
        return None;
    }
    (MIN_COUNT..=MAX_COUNT).find(|&n| {
        let cx = box_center_x(n);
        x >= cx - BOX_HALF_WIDTH && x <= cx + BOX_HALF_WIDTH
    })
}

/// Decide what an event means right now.
pub fn resolve(event: &InputEvent, status: GameStatus) -> Option<Action> {
    match (event, status) {
        (InputEvent::Key(Key::Left), _) => Some(Action::Move(-1)),
        (InputEvent::Key(Key::Right), _) => Some(Action::Move(1)),
        (InputEvent::Key(Key::Confirm), GameStatus::Playing) => Some(Action::Submit),
        (InputEvent::Key(Key::Confirm), GameStatus::GameOver) => Some(Action::Restart),
        (InputEvent::Key(Key::Other), _) => None,
        (InputEvent::Pointer(_), GameStatus::GameOver) => Some(Action::Restart),
        (InputEvent::Pointer(p), GameStatus::Playing) => {
            let (x, y) = p.logical();
            hit_test(x, y).map(Action::SelectAndSubmit)
        }
    }
}

/// Carry out an action against the game.
pub fn apply(state: &mut GameState, action: Action, now: Millis) -> Vec<GameEvent> {
    match action {
        Action::Move(delta) => {
            step::move_selection(state, delta);
            vec![]
        }
        Action::Submit => {
            let guess = state.selection.current();
            step::submit(state, guess, now)
        }
        Action::SelectAndSubmit(n) => step::select_and_submit(state, n, now),
        Action::Restart => step::restart(state, now),
    }
}

/// Resolve and apply in one go. Status is read per event, so a restart
/// earlier in the frame changes what later events mean.
pub fn handle(state: &mut GameState, event: &InputEvent, now: Millis) -> Vec<GameEvent> {
    match resolve(event, state.status) {
        Some(action) => apply(state, action, now),
        None => vec![],
    }
}
