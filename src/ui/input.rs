/// Terminal input collector.
///
/// Drains every pending crossterm event once per frame and turns it into
/// the game's device-independent `InputEvent`s:
///   - key presses become `Key`s (arrows, a/d, Space/Enter)
///   - left-button mouse presses become `Pointer`s, positioned at the centre
///     of the clicked terminal cell, with scale factors from terminal cells
///     to the 800×600 logical canvas
///
/// Quit requests (Esc, q, Ctrl+C) are tracked separately; they never reach
/// the round engine.

use std::time::Duration;

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};

use crate::domain::creature::{LOGICAL_H, LOGICAL_W};
use crate::sim::input::{InputEvent, Key, Pointer};

pub struct InputState {
    /// Game events collected during the most recent drain, in arrival order.
    events: Vec<InputEvent>,
    quit: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            events: Vec::with_capacity(8),
            quit: false,
        }
    }

    /// Drain all pending terminal events without blocking.
    /// `term_size` is the current terminal size in cells.
    pub fn drain_events(&mut self, term_size: (u16, u16)) {
        self.events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => self.on_key(key),
                Ok(Event::Mouse(mouse)) => {
                    if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
                        self.events.push(InputEvent::Pointer(cell_pointer(
                            mouse.column,
                            mouse.row,
                            term_size,
                        )));
                    }
                }
                _ => {}
            }
        }
    }

    /// Game events from the last drain.
    pub fn events(&self) -> &[InputEvent] {
        &self.events
    }

    /// Queue an event from another device (gamepad).
    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    // ── Internal ──

    fn on_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        if is_quit(&key) {
            self.quit = true;
            return;
        }
        let mapped = map_key(key.code);
        match mapped {
            Key::Other => {}
            // Holding Space must not fire a stream of submits.
            Key::Confirm if key.kind == KeyEventKind::Repeat => {}
            _ => self.events.push(InputEvent::Key(mapped)),
        }
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    let ctrl_c = key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'));
    ctrl_c || matches!(key.code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q'))
}

pub fn map_key(code: KeyCode) -> Key {
    match code {
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Enter => Key::Confirm,
        KeyCode::Char(c) => Key::from_name(c.encode_utf8(&mut [0u8; 4])),
        _ => Key::Other,
    }
}

/// Scale factors from terminal cells to logical canvas units.
pub fn cell_scale(term_size: (u16, u16)) -> (f32, f32) {
    let (w, h) = (term_size.0.max(1) as f32, term_size.1.max(1) as f32);
    (LOGICAL_W / w, LOGICAL_H / h)
}

/// A click on cell (col, row), measured from the cell's centre.
pub fn cell_pointer(col: u16, row: u16, term_size: (u16, u16)) -> Pointer {
    let (scale_x, scale_y) = cell_scale(term_size);
    Pointer {
        x: col as f32 + 0.5,
        y: row as f32 + 0.5,
        scale_x,
        scale_y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::input::{hit_test, resolve, Action};
    use crate::sim::world::GameStatus;

    #[test]
    fn key_mapping() {
        assert_eq!(map_key(KeyCode::Left), Key::Left);
        assert_eq!(map_key(KeyCode::Right), Key::Right);
        assert_eq!(map_key(KeyCode::Char(' ')), Key::Confirm);
        assert_eq!(map_key(KeyCode::Enter), Key::Confirm);
        assert_eq!(map_key(KeyCode::Char('a')), Key::Left);
        assert_eq!(map_key(KeyCode::Char('D')), Key::Right);
        assert_eq!(map_key(KeyCode::Up), Key::Other);
    }

    #[test]
    fn quit_keys() {
        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        let plain_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE);
        assert!(is_quit(&esc));
        assert!(is_quit(&ctrl_c));
        assert!(!is_quit(&plain_c));
    }

    #[test]
    fn space_repeat_is_dropped() {
        let mut input = InputState::new();
        let mut repeat = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);
        repeat.kind = KeyEventKind::Repeat;
        input.on_key(repeat);
        assert!(input.events().is_empty());

        let mut arrow = KeyEvent::new(KeyCode::Right, KeyModifiers::NONE);
        arrow.kind = KeyEventKind::Repeat;
        input.on_key(arrow);
        assert_eq!(input.events(), &[InputEvent::Key(Key::Right)]);
    }

    #[test]
    fn cell_click_maps_onto_number_bar() {
        // 80×24 terminal: each cell is 10×25 logical units.
        let size = (80, 24);
        let p = cell_pointer(5, 0, size);
        let (x, y) = p.logical();
        assert_eq!((x, y), (55.0, 12.5));
        assert_eq!(hit_test(x, y), Some(1));
        assert_eq!(
            resolve(&InputEvent::Pointer(p), GameStatus::Playing),
            Some(Action::SelectAndSubmit(1))
        );
    }

    #[test]
    fn zero_sized_terminal_does_not_divide_by_zero() {
        let (sx, sy) = cell_scale((0, 0));
        assert!(sx.is_finite() && sy.is_finite());
    }
}
