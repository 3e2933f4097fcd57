//! BoardView: draws a `Game` into a framebuffer.
//!
//! Pure, no I/O. Each board cell is two terminal columns wide to make up for
//! the usual glyph aspect ratio.

use crossterm::style::Color;

use crate::core::{cells_at, Game, LineClearPhase, Tetromino};
use crate::fb::{FrameBuffer, Style};
use crate::types::{Point, Shape};

const CELL_W: u16 = 2;
const PANEL_GAP: u16 = 3;
const WELL_BG: Color = Color::Rgb {
    r: 24,
    g: 24,
    b: 32,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BoardView {
    show_ghost: bool,
}

impl BoardView {
    pub fn new() -> Self {
        Self { show_ghost: true }
    }

    pub fn with_ghost(mut self, show_ghost: bool) -> Self {
        self.show_ghost = show_ghost;
        self
    }

    pub fn render(&self, game: &Game, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(game, viewport, &mut fb);
        fb
    }

    pub fn render_into(&self, game: &Game, viewport: Viewport, fb: &mut FrameBuffer) {
        fb.reset(viewport.width, viewport.height);
        let board = game.board();

        let well_w = board.width().max(0) as u16 * CELL_W;
        let well_h = board.height().max(0) as u16;
        let frame_w = well_w + 2;
        let frame_h = well_h + 2;
        let panel_w = 14;
        let origin_x = viewport
            .width
            .saturating_sub(frame_w + PANEL_GAP + panel_w)
            / 2;
        let origin_y = viewport.height.saturating_sub(frame_h) / 2;
        let well = (origin_x + 1, origin_y + 1);

        fb.fill(well.0, well.1, well_w, well_h, ' ', Style::default().on(WELL_BG));
        draw_frame(fb, origin_x, origin_y, frame_w, frame_h);

        let empty = Style::fg(Color::DarkGrey).dim().on(WELL_BG);
        for y in 0..board.height() {
            for x in 0..board.width() {
                let p = Point::new(x, y);
                if board.owner_at(p).is_none() {
                    put_cell(fb, well, p, '·', empty);
                }
            }
        }

        for block in board.occupied() {
            let shape = board
                .tetromino(block.parent)
                .map_or(Shape::Single, Tetromino::shape);
            put_cell(fb, well, block.point(), '█', Style::fg(shape_color(shape)).on(WELL_BG));
        }

        if let Some(phase) = board.animation_phase() {
            let (ch, style) = match phase {
                LineClearPhase::Flashing => ('▓', Style::fg(Color::White).bold().on(WELL_BG)),
                LineClearPhase::Fading => ('░', Style::fg(Color::Grey).dim().on(WELL_BG)),
            };
            for &row in board.clearing_rows() {
                for x in 0..board.width() {
                    put_cell(fb, well, Point::new(x, row), ch, style);
                }
            }
        }

        if let Some(active) = board.active_tetromino() {
            let color = shape_color(active.shape());
            if self.show_ghost {
                if let Some(distance) = board.landing_distance().filter(|d| *d > 0) {
                    for p in active.blocks_shifted(0, distance) {
                        put_cell(fb, well, p, '░', Style::fg(color).dim().on(WELL_BG));
                    }
                }
            }
            for p in active.blocks() {
                put_cell(fb, well, p, '█', Style::fg(color).bold().on(WELL_BG));
            }
        }

        let panel_x = origin_x + frame_w + PANEL_GAP;
        draw_panel(fb, game, panel_x, origin_y);

        let overlay = if board.is_game_over() {
            Some("GAME OVER")
        } else if game.is_paused() {
            Some("PAUSED")
        } else {
            None
        };
        if let Some(text) = overlay {
            let x = origin_x + frame_w.saturating_sub(text.len() as u16) / 2;
            let style = Style::fg(Color::White).bold().on(Color::Black);
            fb.text(x, origin_y + frame_h / 2, text, style);
        }
    }
}

fn put_cell(fb: &mut FrameBuffer, well: (u16, u16), p: Point, ch: char, style: Style) {
    if p.x < 0 || p.y < 0 {
        return;
    }
    let x = well.0 + p.x as u16 * CELL_W;
    let y = well.1 + p.y as u16;
    fb.fill(x, y, CELL_W, 1, ch, style);
}

fn draw_frame(fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16) {
    if w < 2 || h < 2 {
        return;
    }
    let style = Style::fg(Color::Grey);
    let (right, bottom) = (x + w - 1, y + h - 1);
    fb.put(x, y, '┌', style);
    fb.put(right, y, '┐', style);
    fb.put(x, bottom, '└', style);
    fb.put(right, bottom, '┘', style);
    fb.fill(x + 1, y, w - 2, 1, '─', style);
    fb.fill(x + 1, bottom, w - 2, 1, '─', style);
    fb.fill(x, y + 1, 1, h - 2, '│', style);
    fb.fill(right, y + 1, 1, h - 2, '│', style);
}

fn draw_panel(fb: &mut FrameBuffer, game: &Game, x: u16, y: u16) {
    let label = Style::fg(Color::White).bold();
    let value = Style::fg(Color::Grey);

    let stats = [
        ("SCORE", game.score()),
        ("LEVEL", game.level()),
        ("LINES", game.lines()),
    ];
    let mut row = y;
    for (name, number) in stats {
        fb.text(x, row, name, label);
        fb.text(x, row + 1, &number.to_string(), value);
        row += 3;
    }

    fb.text(x, row, "NEXT", label);
    draw_preview(fb, game.board().next_tetromino(), x, row + 1);
    row += 5;

    let hold_style = if game.board().can_hold() { label } else { label.dim() };
    fb.text(x, row, "HOLD", hold_style);
    draw_preview(fb, game.board().held_tetromino(), x, row + 1);
    row += 5;

    for hint in ["p pause", "r restart", "q quit"] {
        fb.text(x, row, hint, value.dim());
        row += 1;
    }
}

/// Spawn orientation of an off-board piece in a 4x3 box
fn draw_preview(fb: &mut FrameBuffer, piece: Option<&Tetromino>, x: u16, y: u16) {
    let Some(piece) = piece else {
        fb.text(x, y, "-", Style::fg(Color::DarkGrey));
        return;
    };
    let style = Style::fg(shape_color(piece.shape()));
    for p in cells_at(piece.shape(), 0, Point::new(1, 1)) {
        if p.x >= 0 && p.y >= 0 {
            fb.fill(x + p.x as u16 * CELL_W, y + p.y as u16, CELL_W, 1, '█', style);
        }
    }
}

fn shape_color(shape: Shape) -> Color {
    match shape {
        Shape::T => Color::Rgb { r: 200, g: 120, b: 220 },
        Shape::I => Color::Rgb { r: 80, g: 220, b: 220 },
        Shape::O => Color::Rgb { r: 240, g: 220, b: 80 },
        Shape::J => Color::Rgb { r: 80, g: 120, b: 220 },
        Shape::L => Color::Rgb { r: 255, g: 165, b: 0 },
        Shape::Z => Color::Rgb { r: 220, g: 80, b: 80 },
        Shape::S => Color::Rgb { r: 100, g: 220, b: 120 },
        Shape::Single => Color::Rgb { r: 170, g: 170, b: 170 },
    }
}
