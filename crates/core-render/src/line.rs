//! Per-line rendering: prompt, viewport clipping, syntax colour, selection
//! inverse video, tab expansion, ghost suggestion, clear-to-EOL.

use crate::{Color, Frame, Palette, SyntaxFn, SyntaxSpan, Viewport};
use core_buffer::LineBuffer;
use core_text::{SplitFn, TAB_WIDTH, WidthFn, str_width};
use std::io;
use std::ops::Range;

pub struct LineCtx<'a> {
    pub buffer: &'a LineBuffer,
    pub row: usize,
    pub prompt: &'a str,
    pub viewport: &'a Viewport,
    pub palette: &'a Palette,
    /// Active selection as a grapheme range over the whole buffer.
    pub selection: Option<Range<usize>>,
    pub split: SplitFn,
    pub width: WidthFn,
    /// Suggestion suffix; the caller passes it only on the final line with
    /// the cursor at the buffer end.
    pub ghost: Option<&'a str>,
}

#[derive(Debug, Default)]
pub struct LineRender {
    pub ghost_shown: bool,
}

pub fn render_line(
    ctx: &LineCtx<'_>,
    mut syntax: Option<&mut SyntaxFn>,
    frame: &mut Frame,
) -> io::Result<LineRender> {
    let buffer = ctx.buffer;
    let vp = ctx.viewport;
    frame.text(ctx.prompt)?;

    let text = buffer.text();
    let range = buffer.line_grapheme_range(ctx.row);

    let mut span: Option<SyntaxSpan> = None;
    let mut syntax_dead = syntax.is_none() || ctx.palette.is_empty();
    let mut cur_color = Color::Default;
    let mut inverse = false;
    let mut col = 0; // logical content column within the line
    let mut used = 0; // visible columns emitted

    for g in range {
        let bytes = buffer.grapheme_bytes(g);
        if bytes == b"\n" {
            break;
        }
        let w = (ctx.width)(bytes);
        if !vp.contains(col, w) {
            if col + w > vp.first_col + vp.screen_cols {
                // next cluster would cross the right edge
                break;
            }
            // still left of the window
            col += w;
            continue;
        }
        col += w;

        let offset = buffer.byte_offset(g);
        if !syntax_dead && span.is_none_or(|s| s.byte_end <= offset) {
            span = match syntax.as_mut().and_then(|f| f(text.as_ref(), offset)) {
                Some(s) if s.byte_end > offset => Some(s),
                // missing or non-advancing span: rest of the line uncoloured
                _ => {
                    syntax_dead = true;
                    None
                }
            };
        }
        let want_color = match span {
            Some(s) if !syntax_dead && offset < s.byte_end => ctx.palette.get(s.color_index),
            _ => Color::Default,
        };
        let want_inverse = ctx.selection.as_ref().is_some_and(|r| r.contains(&g));

        // attribute transitions only
        if want_inverse != inverse {
            if want_inverse {
                frame.inverse()?;
            } else {
                frame.reset_attrs()?;
                cur_color = Color::Default;
            }
            inverse = want_inverse;
        }
        if want_color != cur_color {
            if want_color == Color::Default {
                frame.reset_attrs()?;
                if inverse {
                    frame.inverse()?;
                }
            } else {
                frame.color(want_color)?;
            }
            cur_color = want_color;
        }

        if bytes == b"\t" {
            frame.text(&" ".repeat(TAB_WIDTH))?;
        } else {
            frame.bytes(bytes)?;
        }
        used += w;
    }

    if inverse || cur_color != Color::Default {
        frame.reset_attrs()?;
    }

    let mut out = LineRender::default();
    if let Some(ghost) = ctx.ghost {
        let gw = str_width(ghost, ctx.split, ctx.width);
        if gw > 0 && used + gw <= vp.screen_cols {
            frame.faint()?;
            frame.text(ghost)?;
            frame.reset_attrs()?;
            used += gw;
            out.ghost_shown = true;
        }
    }

    if used < vp.screen_cols {
        frame.clear_to_eol()?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::{grapheme_width, split_grapheme};

    fn rendered(
        content: &str,
        palette: &Palette,
        syntax: Option<&mut SyntaxFn>,
        screen_cols: usize,
    ) -> String {
        let mut buffer = LineBuffer::new(split_grapheme);
        buffer.insert(content).expect("insert");
        let vp = Viewport::new(screen_cols);
        let mut frame = Frame::new();
        render_line(
            &LineCtx {
                buffer: &buffer,
                row: 0,
                prompt: "$ ",
                viewport: &vp,
                palette,
                selection: None,
                split: split_grapheme,
                width: grapheme_width,
                ghost: None,
            },
            syntax,
            &mut frame,
        )
        .expect("render");
        String::from_utf8(frame.into_bytes()).expect("utf8")
    }

    #[test]
    fn plain_line_has_no_attributes() {
        let s = rendered("abc", &Palette::default(), None, 20);
        assert_eq!(s, "$ abc\x1b[K");
    }

    #[test]
    fn syntax_spans_colour_transitions() {
        let palette = Palette::from_codes(&[1, 120]).expect("palette");
        let mut calls = 0usize;
        let mut cb = move |_: &str, start: usize| -> Option<SyntaxSpan> {
            calls += 1;
            match start {
                0 => Some(SyntaxSpan {
                    byte_end: 2,
                    color_index: 0,
                }),
                2 => Some(SyntaxSpan {
                    byte_end: 5,
                    color_index: 1,
                }),
                _ => None,
            }
        };
        let s = rendered("abcde", &palette, Some(&mut cb), 20);
        assert_eq!(s, "$ \x1b[31mab\x1b[38;5;120mcde\x1b[0m\x1b[K");
    }

    #[test]
    fn regressive_span_uncolours_rest() {
        let palette = Palette::from_codes(&[1]).expect("palette");
        let mut cb = |_: &str, _start: usize| -> Option<SyntaxSpan> {
            Some(SyntaxSpan {
                byte_end: 0,
                color_index: 0,
            })
        };
        let s = rendered("abc", &palette, Some(&mut cb), 20);
        assert_eq!(s, "$ abc\x1b[K");
    }

    #[test]
    fn out_of_range_palette_index_is_default() {
        let palette = Palette::from_codes(&[1]).expect("palette");
        let mut cb = |_: &str, start: usize| -> Option<SyntaxSpan> {
            (start == 0).then_some(SyntaxSpan {
                byte_end: 3,
                color_index: 7,
            })
        };
        let s = rendered("abc", &palette, Some(&mut cb), 20);
        assert_eq!(s, "$ abc\x1b[K");
    }

    #[test]
    fn wide_cluster_never_straddles_right_edge() {
        // screen of 3: 'a' + '界' fits, second '界' would cross
        let s = rendered("a\u{754C}\u{754C}", &Palette::default(), None, 3);
        assert_eq!(s, "$ a\u{754C}");
    }

    #[test]
    fn full_width_line_skips_clear() {
        let s = rendered("abc", &Palette::default(), None, 3);
        assert_eq!(s, "$ abc");
    }
}
