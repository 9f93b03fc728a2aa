//! Queued escape emission.
//!
//! Commands accumulate in an in-memory buffer and reach the terminal in one
//! write, keeping redraws atomic with respect to the next key read. The
//! escape set is the fixed wire vocabulary of the editor: clear-to-EOL,
//! attribute set/reset, cursor hide/show, relative motion, and foreground
//! colours.

use crate::Color;
use crossterm::{
    cursor::{Hide, MoveDown, MoveRight, MoveUp, Show},
    queue,
    style::{Attribute, SetAttribute},
    terminal::{Clear, ClearType},
};
use std::io::{self, Write};

#[derive(Debug, Default)]
pub struct Frame {
    buf: Vec<u8>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hide_cursor(&mut self) -> io::Result<()> {
        queue!(self.buf, Hide)
    }

    pub fn show_cursor(&mut self) -> io::Result<()> {
        queue!(self.buf, Show)
    }

    pub fn clear_to_eol(&mut self) -> io::Result<()> {
        queue!(self.buf, Clear(ClearType::UntilNewLine))
    }

    /// SGR reset: drops colour and inverse in one go.
    pub fn reset_attrs(&mut self) -> io::Result<()> {
        queue!(self.buf, SetAttribute(Attribute::Reset))
    }

    /// Reset only the foreground (`CSI 39 m`).
    pub fn reset_foreground(&mut self) -> io::Result<()> {
        queue!(
            self.buf,
            crossterm::style::SetForegroundColor(crossterm::style::Color::Reset)
        )
    }

    pub fn faint(&mut self) -> io::Result<()> {
        queue!(self.buf, SetAttribute(Attribute::Dim))
    }

    pub fn inverse(&mut self) -> io::Result<()> {
        queue!(self.buf, SetAttribute(Attribute::Reverse))
    }

    pub fn move_up(&mut self, n: usize) -> io::Result<()> {
        queue!(self.buf, MoveUp(n as u16))
    }

    pub fn move_down(&mut self, n: usize) -> io::Result<()> {
        queue!(self.buf, MoveDown(n as u16))
    }

    pub fn move_right(&mut self, n: usize) -> io::Result<()> {
        queue!(self.buf, MoveRight(n as u16))
    }

    pub fn cr(&mut self) -> io::Result<()> {
        self.buf.push(b'\r');
        Ok(())
    }

    pub fn text(&mut self, s: &str) -> io::Result<()> {
        self.buf.extend_from_slice(s.as_bytes());
        Ok(())
    }

    /// Literal grapheme bytes from the buffer.
    pub fn bytes(&mut self, b: &[u8]) -> io::Result<()> {
        self.buf.extend_from_slice(b);
        Ok(())
    }

    pub fn color(&mut self, color: Color) -> io::Result<()> {
        color.write(&mut self.buf)
    }

    /// Ship the queued bytes to stdout in a single write.
    pub fn flush(self) -> io::Result<()> {
        let mut out = io::stdout();
        out.write_all(&self.buf)?;
        out.flush()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_bytes_match_the_fixed_vocabulary() {
        let mut f = Frame::new();
        f.hide_cursor().expect("queue");
        f.clear_to_eol().expect("queue");
        f.inverse().expect("queue");
        f.faint().expect("queue");
        f.reset_attrs().expect("queue");
        f.reset_foreground().expect("queue");
        f.move_up(2).expect("queue");
        f.move_right(7).expect("queue");
        f.show_cursor().expect("queue");
        let s = String::from_utf8(f.into_bytes()).expect("utf8");
        assert_eq!(
            s,
            "\x1b[?25l\x1b[K\x1b[7m\x1b[2m\x1b[0m\x1b[39m\x1b[2A\x1b[7C\x1b[?25h"
        );
    }
}
