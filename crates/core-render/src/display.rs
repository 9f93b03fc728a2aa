//! Non-interactive syntax-coloured emission of a whole string.
//!
//! Unlike the line renderer there is no viewport: the callback walks the
//! string from offset 0, each span is printed in its palette colour with the
//! foreground reset afterwards, and a missing or non-advancing span flushes
//! the remainder uncoloured.

use crate::{Frame, Palette, SyntaxFn};
use core_text::TAB_WIDTH;
use std::io;

pub fn display_with_syntax(
    text: &str,
    palette: &Palette,
    mut syntax: Option<&mut SyntaxFn>,
    frame: &mut Frame,
) -> io::Result<()> {
    let mut start = 0;
    while start < text.len() {
        let span = if palette.is_empty() {
            None
        } else {
            syntax.as_mut().and_then(|f| f(text, start))
        };
        match span {
            Some(s) if s.byte_end > start => {
                let mut end = s.byte_end.min(text.len());
                while !text.is_char_boundary(end) {
                    end += 1;
                }
                frame.color(palette.get(s.color_index))?;
                emit_expanded(frame, &text[start..end])?;
                frame.reset_foreground()?;
                start = end;
            }
            _ => {
                emit_expanded(frame, &text[start..])?;
                break;
            }
        }
    }
    Ok(())
}

/// Literal text with tabs rendered as spaces.
fn emit_expanded(frame: &mut Frame, chunk: &str) -> io::Result<()> {
    let mut parts = chunk.split('\t');
    if let Some(first) = parts.next() {
        frame.text(first)?;
    }
    for part in parts {
        frame.text(&" ".repeat(TAB_WIDTH))?;
        frame.text(part)?;
    }
    Ok(())
}
