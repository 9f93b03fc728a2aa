//! Rendering: palette, queued escape emission, viewport, and the redraw
//! passes.
//!
//! The renderer is a pure function of the observable editor state; it never
//! calls back into dispatch. All output for one redraw is queued into a
//! [`Frame`] and flushed in a single write, so everything produced for key
//! event *n* reaches the terminal before event *n+1* is read.

mod color;
mod display;
mod frame;
mod line;
mod viewport;

pub use color::{Color, Palette};
pub use display::display_with_syntax;
pub use frame::Frame;
pub use line::{LineCtx, render_line};
pub use viewport::Viewport;

use core_buffer::LineBuffer;
use core_text::{SplitFn, WidthFn};
use std::io;

/// Half-open colour span reported by the host syntax callback: the buffer
/// bytes `[start, byte_end)` take the palette entry `color_index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntaxSpan {
    pub byte_end: usize,
    pub color_index: usize,
}

/// Host syntax callback: span covering `start`, or `None` to leave the rest
/// uncoloured. A span that fails to advance past `start` is treated as
/// `None`.
pub type SyntaxFn = dyn FnMut(&str, usize) -> Option<SyntaxSpan>;

/// Immutable inputs of one redraw.
pub struct RenderCtx<'a> {
    pub buffer: &'a LineBuffer,
    pub prompt: &'a str,
    pub continuation: &'a str,
    pub palette: &'a Palette,
    pub split: SplitFn,
    pub width: WidthFn,
    /// Current suggestion suffix; the caller passes it only when the cursor
    /// sits at the end of the buffer with no selection active.
    pub ghost: Option<&'a str>,
}

/// Renderer state carried between redraws.
#[derive(Debug)]
pub struct RenderState {
    pub viewport: Viewport,
    /// Terminal row (0-based from the editor origin) the cursor was left on.
    pub term_cursor_row: usize,
    /// Rows the previous redraw painted; excess rows are wiped this pass.
    pub term_lines_drawn: usize,
    /// Whether the last redraw actually displayed the ghost suggestion.
    pub suggestion_shown: bool,
}

impl RenderState {
    pub fn new(screen_cols: usize) -> Self {
        Self {
            viewport: Viewport::new(screen_cols),
            term_cursor_row: 0,
            term_lines_drawn: 0,
            suggestion_shown: false,
        }
    }

    /// Per-read reset: nothing is on screen yet.
    pub fn reset(&mut self) {
        self.viewport.first_col = 0;
        self.term_cursor_row = 0;
        self.term_lines_drawn = 0;
        self.suggestion_shown = false;
    }
}

/// Full redraw. Queues everything into `frame`; the caller flushes.
pub fn render(
    ctx: &RenderCtx<'_>,
    state: &mut RenderState,
    mut syntax: Option<&mut SyntaxFn>,
    frame: &mut Frame,
) -> io::Result<()> {
    let buffer = ctx.buffer;
    frame.hide_cursor()?;

    // return to the editor origin
    frame.cr()?;
    if state.term_cursor_row > 0 {
        frame.move_up(state.term_cursor_row)?;
    }

    // logical cursor position and horizontal scroll
    let cursor_row = buffer.cursor_row();
    let cursor_col = cursor_content_col(ctx, cursor_row);
    state.viewport.scroll_to(cursor_col);

    let line_count = buffer.line_count();
    let selection = buffer.selection_range().map(|s| s.graphemes);
    let cursor_prompt = if cursor_row == 0 {
        ctx.prompt
    } else {
        ctx.continuation
    };
    let rendered_cursor_col = core_text::str_width(cursor_prompt, ctx.split, ctx.width)
        + cursor_col.saturating_sub(state.viewport.first_col);
    let mut ghost_shown = false;

    for row in 0..line_count {
        frame.cr()?;
        let last = row + 1 == line_count;
        let out = render_line(
            &LineCtx {
                buffer,
                row,
                prompt: if row == 0 { ctx.prompt } else { ctx.continuation },
                viewport: &state.viewport,
                palette: ctx.palette,
                selection: selection.clone(),
                split: ctx.split,
                width: ctx.width,
                ghost: if last { ctx.ghost } else { None },
            },
            syntax.as_mut().map(|s| &mut **s),
            frame,
        )?;
        if last {
            ghost_shown = out.ghost_shown;
        } else {
            frame.text("\n")?;
        }
    }

    // wipe rows a taller previous draw left behind
    let extra = state.term_lines_drawn.saturating_sub(line_count);
    for _ in 0..extra {
        frame.text("\n\r")?;
        frame.clear_to_eol()?;
    }

    // final cursor placement
    frame.cr()?;
    let below = (line_count - 1 - cursor_row) + extra;
    if below > 0 {
        frame.move_up(below)?;
    }
    if rendered_cursor_col > 0 {
        frame.move_right(rendered_cursor_col)?;
    }
    state.term_cursor_row = cursor_row;
    state.term_lines_drawn = line_count;
    state.suggestion_shown = ghost_shown;

    frame.show_cursor()?;
    tracing::trace!(
        target: "render",
        lines = line_count,
        cursor_row,
        cursor_col = rendered_cursor_col,
        first_col = state.viewport.first_col,
        ghost_shown,
        "redraw queued"
    );
    Ok(())
}

/// Content column (prompt excluded) of the cursor on its row.
fn cursor_content_col(ctx: &RenderCtx<'_>, cursor_row: usize) -> usize {
    let buffer = ctx.buffer;
    let range = buffer.line_grapheme_range(cursor_row);
    let mut col = 0;
    for g in range.start..buffer.cursor().min(range.end) {
        col += (ctx.width)(buffer.grapheme_bytes(g));
    }
    col
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::{grapheme_width, split_grapheme};

    fn ctx<'a>(buffer: &'a LineBuffer, palette: &'a Palette, ghost: Option<&'a str>) -> RenderCtx<'a> {
        RenderCtx {
            buffer,
            prompt: "> ",
            continuation: ". ",
            palette,
            split: split_grapheme,
            width: grapheme_width,
            ghost,
        }
    }

    fn draw(
        buffer: &LineBuffer,
        state: &mut RenderState,
        ghost: Option<&str>,
    ) -> (Vec<u8>, bool) {
        let palette = Palette::default();
        let mut frame = Frame::new();
        render(&ctx(buffer, &palette, ghost), state, None, &mut frame).expect("render");
        let shown = state.suggestion_shown;
        (frame.into_bytes(), shown)
    }

    fn text_of(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    #[test]
    fn single_line_draw_shape() {
        let mut buffer = LineBuffer::new(split_grapheme);
        buffer.insert("hi").expect("insert");
        let mut state = RenderState::new(40);
        let (bytes, _) = draw(&buffer, &mut state, None);
        let s = text_of(&bytes);
        assert!(s.starts_with("\x1b[?25l"), "hides cursor first: {s:?}");
        assert!(s.ends_with("\x1b[?25h"), "shows cursor last: {s:?}");
        assert!(s.contains("> hi"), "prompt then content: {s:?}");
        assert!(s.contains("\x1b[K"), "clears to eol: {s:?}");
        assert_eq!(state.term_cursor_row, 0);
        assert_eq!(state.term_lines_drawn, 1);
    }

    #[test]
    fn multiline_uses_continuation_prompt() {
        let mut buffer = LineBuffer::new(split_grapheme);
        buffer.insert("ab\ncd").expect("insert");
        let mut state = RenderState::new(40);
        let (bytes, _) = draw(&buffer, &mut state, None);
        let s = text_of(&bytes);
        assert!(s.contains("> ab"));
        assert!(s.contains(". cd"));
        assert_eq!(state.term_cursor_row, 1);
        assert_eq!(state.term_lines_drawn, 2);
    }

    #[test]
    fn shrinking_draw_wipes_stale_rows() {
        let mut buffer = LineBuffer::new(split_grapheme);
        buffer.insert("ab\ncd").expect("insert");
        let mut state = RenderState::new(40);
        draw(&buffer, &mut state, None);
        buffer.clear();
        buffer.insert("x").expect("insert");
        let (bytes, _) = draw(&buffer, &mut state, None);
        let s = text_of(&bytes);
        assert!(s.contains("\n\r\x1b[K"), "stale row erased: {s:?}");
        // cursor climbs back above the wiped row
        assert!(s.contains("\x1b[1A"), "moves back up: {s:?}");
        assert_eq!(state.term_lines_drawn, 1);
    }

    #[test]
    fn ghost_rendered_faint_when_it_fits() {
        let mut buffer = LineBuffer::new(split_grapheme);
        buffer.insert("ty").expect("insert");
        let mut state = RenderState::new(40);
        let (bytes, shown) = draw(&buffer, &mut state, Some("pedef"));
        let s = text_of(&bytes);
        assert!(shown);
        assert!(s.contains("\x1b[2mpedef\x1b[0m"), "faint ghost: {s:?}");
    }

    #[test]
    fn ghost_suppressed_when_too_wide() {
        let mut buffer = LineBuffer::new(split_grapheme);
        buffer.insert("ty").expect("insert");
        let mut state = RenderState::new(6);
        let (bytes, shown) = draw(&buffer, &mut state, Some("pedef-and-more"));
        assert!(!shown);
        assert!(!text_of(&bytes).contains("pedef"));
    }

    #[test]
    fn selection_wrapped_in_inverse_video() {
        let mut buffer = LineBuffer::new(split_grapheme);
        buffer.insert("hello").expect("insert");
        buffer.set_cursor(5);
        buffer.begin_selection();
        buffer.set_cursor(2);
        let mut state = RenderState::new(40);
        let (bytes, _) = draw(&buffer, &mut state, None);
        let s = text_of(&bytes);
        assert!(s.contains("he\x1b[7mllo\x1b[0m"), "inverse run: {s:?}");
    }

    #[test]
    fn viewport_scrolls_to_keep_cursor_visible() {
        let mut buffer = LineBuffer::new(split_grapheme);
        buffer.insert("abcdefghij").expect("insert");
        let mut state = RenderState::new(4);
        let (bytes, _) = draw(&buffer, &mut state, None);
        let s = text_of(&bytes);
        // cursor at col 10, screen of 4: only the tail fits
        assert!(state.viewport.first_col >= 6, "scrolled: {}", state.viewport.first_col);
        assert!(s.contains("ghij") || s.contains("hij"), "tail visible: {s:?}");
        assert!(!s.contains("abcdef"), "head clipped: {s:?}");
    }

    #[test]
    fn tabs_render_as_spaces() {
        let mut buffer = LineBuffer::new(split_grapheme);
        buffer.insert("a\tb").expect("insert");
        let mut state = RenderState::new(40);
        let (bytes, _) = draw(&buffer, &mut state, None);
        let s = text_of(&bytes);
        assert!(s.contains("a  b"), "tab expanded: {s:?}");
        assert!(!text_of(&bytes).contains('\t'));
    }
}
