//! TerminalRenderer: flushes a framebuffer to a real terminal.
//!
//! Only rows that changed since the previous frame are rewritten.

use std::io::{self, Write};

use anyhow::Result;
use crossterm::{
    cursor,
    style::{Attribute, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal, QueueableCommand,
};

use crate::fb::{FrameBuffer, Style};

pub struct TerminalRenderer {
    out: io::Stdout,
    previous: Option<FrameBuffer>,
    buf: Vec<u8>,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            out: io::stdout(),
            previous: None,
            buf: Vec::with_capacity(16 * 1024),
        }
    }

    /// Raw mode, alternate screen, hidden cursor
    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.buf.clear();
        self.buf.queue(terminal::EnterAlternateScreen)?;
        self.buf.queue(cursor::Hide)?;
        self.buf.queue(terminal::Clear(terminal::ClearType::All))?;
        self.flush()
    }

    /// Undo everything `enter` did
    pub fn exit(&mut self) -> Result<()> {
        self.buf.clear();
        self.buf.queue(ResetColor)?;
        self.buf.queue(SetAttribute(Attribute::Reset))?;
        self.buf.queue(cursor::Show)?;
        self.buf.queue(terminal::LeaveAlternateScreen)?;
        self.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Force a full redraw on the next frame
    pub fn invalidate(&mut self) {
        self.previous = None;
    }

    pub fn draw(&mut self, frame: &FrameBuffer) -> Result<()> {
        self.buf.clear();
        encode_changed_rows(self.previous.as_ref(), frame, &mut self.buf)?;
        self.flush()?;
        self.previous = Some(frame.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.out.write_all(&self.buf)?;
        self.out.flush()?;
        Ok(())
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode every row of `frame` that differs from `previous` into `out`.
///
/// Without a previous frame (or after a resize) the screen is cleared and
/// every row is written.
pub fn encode_changed_rows(
    previous: Option<&FrameBuffer>,
    frame: &FrameBuffer,
    out: &mut Vec<u8>,
) -> Result<usize> {
    let previous = previous
        .filter(|p| p.width() == frame.width() && p.height() == frame.height());
    if previous.is_none() {
        out.queue(terminal::Clear(terminal::ClearType::All))?;
    }

    let mut written = 0;
    for y in 0..frame.height() {
        let row = frame.row(y);
        if previous.map_or(false, |p| p.row(y) == row) {
            continue;
        }
        out.queue(cursor::MoveTo(0, y))?;
        let mut current: Option<Style> = None;
        for cell in row {
            if current != Some(cell.style) {
                apply_style(out, cell.style)?;
                current = Some(cell.style);
            }
            out.queue(Print(cell.ch))?;
        }
        written += 1;
    }

    out.queue(ResetColor)?;
    out.queue(SetAttribute(Attribute::Reset))?;
    Ok(written)
}

fn apply_style(out: &mut Vec<u8>, style: Style) -> Result<()> {
    out.queue(SetAttribute(Attribute::Reset))?;
    out.queue(SetForegroundColor(style.fg))?;
    out.queue(SetBackgroundColor(style.bg))?;
    if style.bold {
        out.queue(SetAttribute(Attribute::Bold))?;
    }
    if style.dim {
        out.queue(SetAttribute(Attribute::Dim))?;
    }
    Ok(())
}
