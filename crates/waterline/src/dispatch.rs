//! Key dispatch: one key event plus the current modes (selection, history
//! browse, suggestions, multi-line) to a state mutation.
//!
//! Every arm decides three follow-up policies — clear the selection anchor,
//! regenerate the suggestion list, end history browsing — applied in that
//! fixed order after the action. The refresh flag is set unconditionally.

use crate::Error;
use crate::editor::Editor;
use core_input::{KeyCode, KeyEvent, KeyModifiers};

/// Whether the read loop keeps going after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Commit,
}

pub(crate) fn dispatch(ed: &mut Editor, event: KeyEvent) -> Result<Flow, Error> {
    let shift = event.mods.contains(KeyModifiers::SHIFT);
    let ctrl = event.mods.contains(KeyModifiers::CTRL);

    let mut flow = Flow::Continue;
    // defaults shared by most keys; arms override what differs
    let mut clear_selection = true;
    let mut regen = true;
    let mut end_browse = true;

    match event.code {
        KeyCode::Enter if ctrl => {
            ed.buffer.insert("\n")?;
            regen = false;
        }
        KeyCode::Enter => {
            let more = ed
                .multiline
                .as_ref()
                .is_some_and(|cb| cb(ed.buffer.text().as_ref()));
            if more {
                ed.buffer.insert("\n")?;
                regen = false;
            } else {
                flow = Flow::Commit;
                regen = false;
            }
        }
        KeyCode::Char(c) => {
            let mut utf8 = [0u8; 4];
            ed.buffer.insert(c.encode_utf8(&mut utf8))?;
        }
        KeyCode::Tab if shift => {
            if ed.suggestions.has_any() {
                ed.suggestions.advance(-1);
            }
            regen = false;
        }
        KeyCode::Tab => {
            if ed.suggestions.has_any() {
                ed.suggestions.advance(1);
                regen = false;
            } else {
                ed.buffer.insert("\t")?;
            }
        }
        KeyCode::Left if shift => {
            ed.buffer.begin_selection();
            ed.buffer.move_left();
            clear_selection = false;
        }
        KeyCode::Right if shift => {
            ed.buffer.begin_selection();
            ed.buffer.move_right();
            clear_selection = false;
        }
        KeyCode::Right => {
            if ed.suggestion_shown() && ed.suggestions.current().is_some() {
                accept_suggestion(ed)?;
                regen = false;
            } else {
                ed.buffer.move_right();
            }
        }
        KeyCode::Left => ed.buffer.move_left(),
        KeyCode::Up => {
            history_browse(ed, -1)?;
            end_browse = false;
        }
        KeyCode::Down => {
            history_browse(ed, 1)?;
            end_browse = false;
        }
        KeyCode::Home => ed.buffer.move_to_line_start(),
        KeyCode::End => ed.buffer.move_to_line_end(),
        KeyCode::PageUp => ed.buffer.move_to_start(),
        KeyCode::PageDown => ed.buffer.move_to_end(),
        KeyCode::Backspace => {
            ed.buffer.backspace();
            clear_selection = false; // a selection was already consumed
        }
        KeyCode::Ctrl('A') => ed.buffer.move_to_line_start(),
        KeyCode::Ctrl('B') => ed.buffer.move_left(),
        KeyCode::Ctrl('E') => ed.buffer.move_to_line_end(),
        KeyCode::Ctrl('F') => ed.buffer.move_right(),
        KeyCode::Ctrl('C') => {
            ed.buffer.clear();
            flow = Flow::Commit;
            regen = false;
        }
        KeyCode::Ctrl('D') => {
            ed.buffer.clear_selection();
            ed.buffer.delete_current();
        }
        KeyCode::Ctrl('G') => {
            flow = Flow::Commit;
            clear_selection = false;
            regen = false;
            end_browse = false;
        }
        KeyCode::Ctrl('K') => cut_to_line_edge(ed, true)?,
        KeyCode::Ctrl('U') => cut_to_line_edge(ed, false)?,
        KeyCode::Ctrl('N') => {
            history_browse(ed, 1)?;
            regen = false;
            end_browse = false;
        }
        KeyCode::Ctrl('P') => {
            history_browse(ed, -1)?;
            regen = false;
            end_browse = false;
        }
        KeyCode::Ctrl('L') => ed.buffer.clear(),
        KeyCode::Ctrl('O') => {
            ed.buffer.copy_selection(&mut ed.clipboard)?;
        }
        KeyCode::Ctrl('V') | KeyCode::Ctrl('Y') => {
            ed.buffer.paste(&ed.clipboard)?;
        }
        KeyCode::Ctrl('X') => {
            ed.buffer.cut_selection(&mut ed.clipboard)?;
        }
        KeyCode::Ctrl('T') => {
            ed.buffer.transpose();
        }
        KeyCode::Alt('w') | KeyCode::Alt('W') => {
            ed.buffer.copy_selection(&mut ed.clipboard)?;
        }
        KeyCode::Ctrl(_) | KeyCode::Alt(_) | KeyCode::Unknown => {
            // unmapped: no action, no mode changes
            clear_selection = false;
            regen = false;
            end_browse = false;
        }
    }

    if end_browse {
        ed.history.stop_browsing();
    }
    if regen {
        ed.regenerate_suggestions();
    }
    if clear_selection {
        ed.buffer.clear_selection();
    }
    ed.dirty = true;
    Ok(flow)
}

/// Insert the current suggestion suffix at the cursor and drop the list.
fn accept_suggestion(ed: &mut Editor) -> Result<(), Error> {
    if let Some(suffix) = ed.suggestions.current().map(str::to_owned) {
        ed.buffer.insert(&suffix)?;
        ed.suggestions.clear();
    }
    Ok(())
}

/// Load the neighbouring history entry into the buffer, cursor at the end.
/// With nothing to browse the buffer is cleared.
fn history_browse(ed: &mut Editor, delta: isize) -> Result<(), Error> {
    match ed.history.browse(delta).map(str::to_owned) {
        Some(entry) => ed.buffer.set_text(&entry)?,
        None => ed.buffer.clear(),
    }
    Ok(())
}

/// Ctrl-K / Ctrl-U: copy-then-delete from the cursor to the edge of the
/// current line (newline excluded).
fn cut_to_line_edge(ed: &mut Editor, to_end: bool) -> Result<(), Error> {
    let row = ed.buffer.cursor_row();
    let at = ed.buffer.byte_offset(ed.buffer.cursor());
    let (start, end) = if to_end {
        (at, ed.buffer.line_content_end(row).max(at))
    } else {
        (ed.buffer.line_start(row).min(at), at)
    };
    if start == end {
        return Ok(());
    }
    ed.buffer.copy_bytes(start..end, &mut ed.clipboard)?;
    ed.buffer.delete_bytes(start, end);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ed_with(text: &str) -> Editor {
        let mut ed = Editor::new("> ");
        ed.buffer.insert(text).expect("insert");
        ed
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::plain(code)
    }

    #[test]
    fn character_inserts_at_cursor() {
        let mut ed = ed_with("ac");
        ed.buffer.set_cursor(1);
        let flow = dispatch(&mut ed, key(KeyCode::Char('b'))).expect("dispatch");
        assert_eq!(flow, Flow::Continue);
        assert_eq!(ed.buffer_text(), "abc");
        assert!(ed.dirty);
    }

    #[test]
    fn return_commits_without_predicate() {
        let mut ed = ed_with("hi");
        let flow = dispatch(&mut ed, key(KeyCode::Enter)).expect("dispatch");
        assert_eq!(flow, Flow::Commit);
        assert_eq!(ed.buffer_text(), "hi");
    }

    #[test]
    fn return_continues_while_predicate_wants_more() {
        let mut ed = Editor::new("> ");
        ed.set_multiline(
            |text| text.matches('(').count() > text.matches(')').count(),
            Some(". "),
        );
        ed.buffer.insert("(a").expect("insert");
        let flow = dispatch(&mut ed, key(KeyCode::Enter)).expect("dispatch");
        assert_eq!(flow, Flow::Continue);
        assert_eq!(ed.buffer_text(), "(a\n");
        ed.buffer.insert(")").expect("insert");
        let flow = dispatch(&mut ed, key(KeyCode::Enter)).expect("dispatch");
        assert_eq!(flow, Flow::Commit);
    }

    #[test]
    fn ctrl_return_always_inserts_newline() {
        let mut ed = ed_with("a");
        let flow = dispatch(&mut ed, KeyEvent::ctrl(KeyCode::Enter)).expect("dispatch");
        assert_eq!(flow, Flow::Continue);
        assert_eq!(ed.buffer_text(), "a\n");
    }

    #[test]
    fn ctrl_c_clears_then_commits() {
        let mut ed = ed_with("secret");
        let flow = dispatch(&mut ed, key(KeyCode::Ctrl('C'))).expect("dispatch");
        assert_eq!(flow, Flow::Commit);
        assert_eq!(ed.buffer_text(), "");
    }

    #[test]
    fn ctrl_g_commits_as_is() {
        let mut ed = ed_with("keep");
        let flow = dispatch(&mut ed, key(KeyCode::Ctrl('G'))).expect("dispatch");
        assert_eq!(flow, Flow::Commit);
        assert_eq!(ed.buffer_text(), "keep");
    }

    #[test]
    fn shift_arrows_grow_a_selection() {
        let mut ed = ed_with("hello");
        for _ in 0..3 {
            dispatch(&mut ed, KeyEvent::shifted(KeyCode::Left)).expect("dispatch");
        }
        let sel = ed.buffer.selection_range().expect("selection");
        assert_eq!(sel.graphemes, 2..5);
        // a plain motion drops the anchor
        dispatch(&mut ed, key(KeyCode::Left)).expect("dispatch");
        assert!(!ed.buffer.has_selection());
    }

    #[test]
    fn cut_and_paste_through_clipboard() {
        let mut ed = ed_with("hello");
        for _ in 0..3 {
            dispatch(&mut ed, KeyEvent::shifted(KeyCode::Left)).expect("dispatch");
        }
        dispatch(&mut ed, key(KeyCode::Ctrl('X'))).expect("dispatch");
        assert_eq!(ed.buffer_text(), "he");
        assert_eq!(ed.clipboard.as_bytes(), b"llo");
        dispatch(&mut ed, key(KeyCode::Ctrl('V'))).expect("dispatch");
        assert_eq!(ed.buffer_text(), "hello");
    }

    #[test]
    fn ctrl_k_cuts_to_line_end() {
        let mut ed = ed_with("ab\ncd");
        ed.buffer.set_cursor(1);
        dispatch(&mut ed, key(KeyCode::Ctrl('K'))).expect("dispatch");
        assert_eq!(ed.buffer_text(), "a\ncd");
        assert_eq!(ed.clipboard.as_bytes(), b"b");
    }

    #[test]
    fn ctrl_u_cuts_to_line_start() {
        let mut ed = ed_with("ab\ncd");
        ed.buffer.set_cursor(5);
        dispatch(&mut ed, key(KeyCode::Ctrl('U'))).expect("dispatch");
        assert_eq!(ed.buffer_text(), "ab\n");
        assert_eq!(ed.clipboard.as_bytes(), b"cd");
    }

    #[test]
    fn transpose_steps_right() {
        let mut ed = ed_with("ab");
        ed.buffer.set_cursor(1);
        dispatch(&mut ed, key(KeyCode::Ctrl('T'))).expect("dispatch");
        assert_eq!(ed.buffer_text(), "ba");
        assert_eq!(ed.buffer.cursor(), 2);
    }

    #[test]
    fn tab_inserts_literal_tab_without_suggestions() {
        let mut ed = ed_with("");
        dispatch(&mut ed, key(KeyCode::Tab)).expect("dispatch");
        assert_eq!(ed.buffer_text(), "\t");
    }

    #[test]
    fn tab_cycles_suggestions_without_regenerating() {
        let mut ed = Editor::new("> ");
        ed.set_autocomplete(|text, index| {
            const WORDS: [&str; 2] = ["typedef", "typeof"];
            while *index < WORDS.len() {
                let w = WORDS[*index];
                *index += 1;
                if let Some(s) = w.strip_prefix(text) {
                    return Some(s.to_string());
                }
            }
            None
        });
        for c in "ty".chars() {
            dispatch(&mut ed, key(KeyCode::Char(c))).expect("dispatch");
        }
        assert_eq!(ed.suggestions.current(), Some("pedef"));
        dispatch(&mut ed, key(KeyCode::Tab)).expect("dispatch");
        assert_eq!(ed.suggestions.current(), Some("peof"));
        dispatch(&mut ed, KeyEvent::shifted(KeyCode::Tab)).expect("dispatch");
        assert_eq!(ed.suggestions.current(), Some("pedef"));
    }

    #[test]
    fn up_down_browse_history_without_ending_it() {
        let mut ed = Editor::new("> ");
        ed.add_history("a");
        ed.add_history("bb");
        dispatch(&mut ed, key(KeyCode::Up)).expect("dispatch");
        assert_eq!(ed.buffer_text(), "bb");
        assert_eq!(ed.buffer.cursor(), 2);
        assert!(ed.history.is_browsing());
        dispatch(&mut ed, key(KeyCode::Up)).expect("dispatch");
        assert_eq!(ed.buffer_text(), "a");
        dispatch(&mut ed, key(KeyCode::Down)).expect("dispatch");
        assert_eq!(ed.buffer_text(), "bb");
        // editing ends the browse
        dispatch(&mut ed, key(KeyCode::Char('!'))).expect("dispatch");
        assert!(!ed.history.is_browsing());
        assert_eq!(ed.buffer_text(), "bb!");
    }

    #[test]
    fn unknown_keys_change_nothing_but_refresh() {
        let mut ed = ed_with("ab");
        ed.buffer.begin_selection();
        dispatch(&mut ed, key(KeyCode::Unknown)).expect("dispatch");
        assert!(ed.buffer.has_selection());
        assert_eq!(ed.buffer_text(), "ab");
        assert!(ed.dirty);
    }
}
