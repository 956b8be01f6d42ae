/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The whole terminal stands for the 800×600 logical canvas. Every logical
/// position (creatures, particles, the number bar) is scaled to cells with
/// the same factors the input layer uses for mouse clicks, so a box is drawn
/// exactly where clicking it hits.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::clock::Millis;
use crate::domain::creature::LOGICAL_H;
use crate::domain::ledger::STARTING_LIVES;
use crate::domain::round::{MAX_COUNT, MIN_COUNT};
use crate::domain::scoring;
use crate::sim::event::NoticeKind;
use crate::sim::input::{box_center_x, hit_test, BAR_Y};
use crate::sim::world::{GameStatus, Snapshot};
use super::fireworks::Fireworks;
use super::input::cell_scale;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: [u8; 4],
    ch_len: u8,
    fg: Color,
    bg: Color,
    wide: bool,    // true = this char occupies 2 terminal columns
    cont: bool,    // true = continuation of previous wide char (skip render)
}

impl Cell {
    /// Explicit background for every "empty" cell. Using the same RGB for
    /// `Clear(ClearType::All)` keeps inter-row gaps the same colour on
    /// VTE-based terminals.
    const BASE_BG: Color = Color::Rgb { r: 14, g: 42, b: 71 };

    const BLANK: Cell = Cell {
        ch: [b' ', 0, 0, 0],
        ch_len: 1,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: false,
    };

    const WIDE_CONT: Cell = Cell {
        ch: [0; 4],
        ch_len: 0,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: true,
    };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell {
        ch: [b'?', 0, 0, 0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
        wide: false,
        cont: false,
    };

    /// Normalize bg: Color::Reset → BASE_BG so that every cell gets an
    /// explicit background color (never terminal-default).
    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn from_char(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::BLANK;
        cell.ch_len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.fg = fg;
        cell.bg = Self::norm_bg(bg);
        cell
    }

    fn from_char_wide(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::from_char(c, fg, bg);
        cell.wide = true;
        cell
    }

    fn as_str(&self) -> &str {
        std::str::from_utf8(&self.ch[..self.ch_len as usize]).unwrap_or(" ")
    }
}

/// Emoji and pictographs take two terminal columns.
fn is_wide(c: char) -> bool {
    matches!(c as u32, 0x1F300..=0x1FAFF)
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Place a wide glyph and its continuation cell. Dropped if it would
    /// hang off the right edge.
    fn put_wide(&mut self, x: usize, y: usize, c: char, bg: Color) {
        if x + 1 < self.width {
            self.set(x, y, Cell::from_char_wide(c, Color::Reset, bg));
            let mut cont = Cell::WIDE_CONT;
            cont.bg = Cell::norm_bg(bg);
            self.set(x + 1, y, cont);
        }
    }

    /// Write a string at (x, y). Returns the column after the last char.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) -> usize {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width { break; }
            if is_wide(ch) {
                self.put_wide(cx, y, ch, bg);
                cx += 2;
            } else {
                self.set(cx, y, Cell::from_char(ch, fg, bg));
                cx += 1;
            }
        }
        cx
    }

    /// Display width of `s` as `put_str` lays it out.
    fn str_width(s: &str) -> usize {
        s.chars().map(|c| if is_wide(c) { 2 } else { 1 }).sum()
    }

    fn put_centered(&mut self, y: usize, s: &str, fg: Color, bg: Color) {
        let x = self.width.saturating_sub(Self::str_width(s)) / 2;
        self.put_str(x, y, s, fg, bg);
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::from_char(' ', Color::White, bg));
        }
    }
}

// ── Palette ──

const SAND: Color = Color::Rgb { r: 194, g: 164, b: 110 };
const BOX_BG: Color = Color::Rgb { r: 88, g: 28, b: 135 };
const BOX_SELECTED: Color = Color::Rgb { r: 255, g: 215, b: 0 };
const HUD_FG: Color = Color::White;
const WARN_FG: Color = Color::Rgb { r: 255, g: 80, b: 80 };
const HEART_FULL: Color = Color::Rgb { r: 255, g: 60, b: 90 };
const HEART_EMPTY: Color = Color::Rgb { r: 90, g: 90, b: 110 };
const DIM: Color = Color::Rgb { r: 120, g: 150, b: 180 };

/// Logical y where the seabed starts.
const SEABED_Y: f32 = 500.0;

fn notice_bg(kind: NoticeKind) -> Color {
    match kind {
        NoticeKind::Correct => Color::Rgb { r: 60, g: 180, b: 90 },
        NoticeKind::Bonus => Color::Rgb { r: 200, g: 180, b: 50 },
        NoticeKind::Retry => Color::Rgb { r: 230, g: 140, b: 40 },
        NoticeKind::Timeout => Color::Rgb { r: 220, g: 90, b: 60 },
        NoticeKind::GameOver => Color::Rgb { r: 200, g: 40, b: 40 },
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_status: Option<GameStatus>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_status: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Terminal size as of the last render, in cells.
    pub fn size(&self) -> (u16, u16) {
        (self.term_w as u16, self.term_h as u16)
    }

    pub fn render(&mut self, snap: &Snapshot, fireworks: &Fireworks, now: Millis) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Status change → clear for clean transition
        if self.last_status != Some(snap.status) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_status = Some(snap.status);
        }

        self.front.clear();
        compose(&mut self.front, snap, fireworks, now);

        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors, never ResetColor (terminal default may differ).
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            let mut x = 0;
            while x < self.front.width {
                let cell = self.front.get(x, y);
                let prev = self.back.get(x, y);

                // Skip continuation cells (right half of wide emoji)
                if cell.cont {
                    if cell != prev { need_move = true; }
                    x += 1;
                    continue;
                }

                // For wide cells, also check if the continuation changed
                let cont_changed = cell.wide
                    && x + 1 < self.front.width
                    && self.front.get(x + 1, y) != self.back.get(x + 1, y);

                if cell == prev && !cont_changed {
                    need_move = true;
                    x += 1;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.as_str()))?;

                if cell.wide {
                    last_x = x + 1;
                    x += 2;
                } else {
                    last_x = x;
                    x += 1;
                }
                last_y = y;
            }
        }

        self.writer.flush()
    }
}

// ── Compose: build front buffer content ──

/// Terminal geometry of the number bar for one buffer size.
struct BarLayout {
    /// Rows whose centres fall inside the hit band.
    rows: std::ops::Range<usize>,
    /// Column span of each box, index 0 = box 1. Empty when the terminal
    /// is too narrow for any cell centre to land in that box.
    spans: Vec<std::ops::Range<usize>>,
}

impl BarLayout {
    fn new(width: usize, height: usize) -> Self {
        let (sx, sy) = cell_scale((width as u16, height as u16));
        let centre = |i: usize, s: f32| (i as f32 + 0.5) * s;

        let in_band = |row: usize| hit_test(box_center_x(MIN_COUNT), centre(row, sy)).is_some();
        let first = (0..height).find(|&r| in_band(r)).unwrap_or(0);
        let end = (first..height).find(|&r| !in_band(r)).unwrap_or(height);

        let spans = (MIN_COUNT..=MAX_COUNT)
            .map(|n| {
                let cols: Vec<usize> = (0..width)
                    .filter(|&c| hit_test(centre(c, sx), BAR_Y) == Some(n))
                    .collect();
                match (cols.first(), cols.last()) {
                    (Some(&a), Some(&b)) => a..b + 1,
                    _ => 0..0,
                }
            })
            .collect();

        BarLayout { rows: first..end, spans }
    }

    fn label_row(&self) -> usize {
        self.rows.start + self.rows.len().saturating_sub(1) / 2
    }
}

fn compose(buf: &mut FrameBuffer, snap: &Snapshot, fireworks: &Fireworks, now: Millis) {
    if buf.width == 0 || buf.height == 0 {
        return;
    }
    let bar = BarLayout::new(buf.width, buf.height);

    match snap.status {
        GameStatus::Playing => compose_playing(buf, snap, &bar, now),
        GameStatus::GameOver => compose_game_over(buf, snap),
    }
    compose_fireworks(buf, fireworks);
    compose_notice(buf, snap, &bar);
}

fn compose_playing(buf: &mut FrameBuffer, snap: &Snapshot, bar: &BarLayout, now: Millis) {
    let (sx, sy) = cell_scale((buf.width as u16, buf.height as u16));

    // ── Seabed ──
    let seabed_row = (SEABED_Y / sy) as usize;
    for row in seabed_row..buf.height {
        buf.fill_row(row, SAND);
    }

    // ── Number bar ──
    let label_row = bar.label_row();
    for (i, span) in bar.spans.iter().enumerate() {
        if span.is_empty() { continue; }
        let n = i as u32 + MIN_COUNT;
        let selected = n == snap.selection;
        let (fg, bg) = if selected { (Color::Black, BOX_SELECTED) } else { (Color::White, BOX_BG) };
        for row in bar.rows.clone() {
            for col in span.clone() {
                buf.set(col, row, Cell::from_char(' ', fg, bg));
            }
        }
        let label = n.to_string();
        let x = span.start + span.len().saturating_sub(label.len()) / 2;
        buf.put_str(x, label_row, &label, fg, bg);
    }

    // ── Creatures ──
    let glyph = snap.creature.glyph();
    for item in &snap.items {
        let col = (item.x / sx) as usize;
        let row = (item.bobbed_y(now) / sy) as usize;
        let bg = if row >= seabed_row { SAND } else { Cell::BASE_BG };
        buf.put_wide(col, row, glyph, bg);
    }

    // ── HUD (bottom rows) ──
    let h = buf.height;
    let hud_bg = if h > seabed_row { SAND } else { Cell::BASE_BG };
    if h >= 3 {
        let mut x = 1;
        for i in 0..STARTING_LIVES {
            let (c, fg) = if i < snap.lives { ('♥', HEART_FULL) } else { ('♡', HEART_EMPTY) };
            buf.set(x, h - 3, Cell::from_char(c, fg, hud_bg));
            x += 2;
        }
    }
    if h >= 2 {
        let line = format!(" Score: {}   Best: {}", snap.total_score, snap.best_score);
        buf.put_str(0, h - 2, &line, Color::Black, hud_bg);

        let secs = snap.round.seconds_left;
        let timer = format!("Time: {}s ", secs);
        let fg = if scoring::is_running_low(secs) { WARN_FG } else { Color::Black };
        let x = buf.width.saturating_sub(timer.len());
        buf.put_str(x, h - 2, &timer, fg, hud_bg);
    }
    let help = " ←/→ select   SPACE submit   click a number   Q quit";
    buf.put_str(0, h - 1, help, DIM, hud_bg);
}

fn compose_game_over(buf: &mut FrameBuffer, snap: &Snapshot) {
    let box_art = [
        "╔══════════════════════════════╗",
        "║          GAME  OVER          ║",
        "╚══════════════════════════════╝",
    ];
    let mid = buf.height / 2;
    let top = mid.saturating_sub(4);
    for (i, l) in box_art.iter().enumerate() {
        buf.put_centered(top + i, l, Color::Rgb { r: 255, g: 60, b: 60 }, Color::Reset);
    }
    let score = format!("Final Score: {}", snap.total_score);
    let best = format!("Best: {}", snap.best_score);
    buf.put_centered(mid, &score, HUD_FG, Color::Reset);
    buf.put_centered(mid + 1, &best, Color::Rgb { r: 255, g: 215, b: 0 }, Color::Reset);
    buf.put_centered(mid + 3, "Press SPACE or tap to play again", Color::Rgb { r: 80, g: 255, b: 80 }, Color::Reset);
}

fn compose_fireworks(buf: &mut FrameBuffer, fireworks: &Fireworks) {
    let (sx, sy) = cell_scale((buf.width as u16, buf.height as u16));
    for p in fireworks.particles() {
        if p.x < 0.0 || p.y < 0.0 || p.y >= LOGICAL_H {
            continue;
        }
        let (col, row) = ((p.x / sx) as usize, (p.y / sy) as usize);
        if col >= buf.width || row >= buf.height {
            continue;
        }
        let c = if p.life > 0.5 { '✦' } else { '·' };
        let bg = buf.get(col, row).bg;
        buf.set(col, row, Cell::from_char(c, p.color, bg));
    }
}

fn compose_notice(buf: &mut FrameBuffer, snap: &Snapshot, bar: &BarLayout) {
    let Some(notice) = &snap.notice else { return };
    let row = (bar.rows.end + 1).min(buf.height.saturating_sub(1));
    let bg = notice_bg(notice.kind);
    buf.fill_row(row, bg);
    buf.put_centered(row, &format!(" {} ", notice.text), Color::Black, bg);
}
