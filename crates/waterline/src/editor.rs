//! The editor handle: owned state, host configuration, and the read loop.

use crate::dispatch::{Flow, dispatch};
use crate::history::{History, HistoryLimit};
use crate::suggest::Suggestions;
use crate::{CompleteFn, Error, MultilineFn};
use core_buffer::{Clipboard, LineBuffer};
use core_input::{ByteSource, read_event};
use core_render::{Frame, Palette, RenderCtx, RenderState, SyntaxFn, render};
use core_terminal::RawModeGuard;
use core_text::{SplitFn, WidthFn, grapheme_width, split_grapheme, str_width};
use std::io::{self, BufRead};

/// A long-lived interactive line editor.
///
/// Owns the text buffer and indices, clipboard, palette, history and
/// suggestion lists, and the configured host callbacks. One `read_line` call
/// edits one input; state that belongs to a single read is reset on entry.
pub struct Editor {
    pub(crate) prompt: String,
    pub(crate) continuation: Option<String>,
    pub(crate) buffer: LineBuffer,
    pub(crate) clipboard: Clipboard,
    pub(crate) palette: Palette,
    pub(crate) history: History,
    pub(crate) suggestions: Suggestions,
    pub(crate) syntax: Option<Box<SyntaxFn>>,
    pub(crate) complete: Option<Box<CompleteFn>>,
    pub(crate) multiline: Option<Box<MultilineFn>>,
    pub(crate) split: SplitFn,
    pub(crate) width: WidthFn,
    pub(crate) render: RenderState,
    pub(crate) dirty: bool,
    signal_hooks: bool,
}

impl Editor {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            continuation: None,
            buffer: LineBuffer::new(split_grapheme),
            clipboard: Clipboard::new(),
            palette: Palette::default(),
            history: History::new(),
            suggestions: Suggestions::new(),
            syntax: None,
            complete: None,
            multiline: None,
            split: split_grapheme,
            width: grapheme_width,
            render: RenderState::new(79),
            dirty: false,
            signal_hooks: true,
        }
    }

    // ---- host configuration -------------------------------------------------

    pub fn set_history_limit(&mut self, limit: HistoryLimit) {
        self.history.set_limit(limit);
    }

    /// Offer an entry to the history; `true` when it was accepted.
    pub fn add_history(&mut self, entry: &str) -> bool {
        self.history.add(entry)
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Install the colour table consulted by syntax spans. Rejects an empty
    /// palette and keeps the previous one in that case.
    pub fn set_palette(&mut self, codes: &[i32]) -> bool {
        match Palette::from_codes(codes) {
            Some(p) => {
                self.palette = p;
                true
            }
            None => false,
        }
    }

    pub fn set_syntax_color(
        &mut self,
        cb: impl FnMut(&str, usize) -> Option<core_render::SyntaxSpan> + 'static,
    ) {
        self.syntax = Some(Box::new(cb));
    }

    pub fn set_autocomplete(&mut self, cb: impl FnMut(&str, &mut usize) -> Option<String> + 'static) {
        self.complete = Some(Box::new(cb));
    }

    /// Install the multi-line predicate. The continuation prompt defaults to
    /// the main prompt.
    pub fn set_multiline(&mut self, cb: impl Fn(&str) -> bool + 'static, continuation: Option<&str>) {
        self.multiline = Some(Box::new(cb));
        self.continuation = continuation.map(str::to_owned);
    }

    /// Override grapheme segmentation; re-segments the current contents.
    pub fn set_grapheme_splitter(&mut self, split: SplitFn) {
        self.split = split;
        self.buffer.set_splitter(split);
    }

    pub fn set_grapheme_width(&mut self, width: WidthFn) {
        self.width = width;
    }

    /// Opt out of the signal/atexit restore hooks installed on raw-mode
    /// enter.
    pub fn set_signal_hooks(&mut self, install: bool) {
        self.signal_hooks = install;
    }

    // ---- reading ------------------------------------------------------------

    /// Read one line. `Ok(None)` is end of input on a non-interactive stdin;
    /// an interactive EOF commits whatever the buffer holds.
    pub fn read_line(&mut self) -> Result<Option<String>, Error> {
        self.reset_session();
        if !core_terminal::is_tty() {
            return self.read_plain();
        }
        if !core_terminal::is_supported() {
            return self.read_unsupported();
        }

        core_terminal::set_utf8_mode();
        let guard = RawModeGuard::enter(self.signal_hooks)?;
        #[cfg(unix)]
        let mut source = core_input::TtyByteSource::new();
        #[cfg(windows)]
        let mut source = core_input::ConsoleByteSource::new();
        let result = self.edit(&mut source);
        let restored = guard.leave();
        let text = result?;
        restored?;
        Ok(Some(text))
    }

    /// Drive a full edit session from an explicit byte source. Terminal
    /// detection and raw mode are skipped; rendering still goes to stdout.
    /// This is the scripted/testing twin of [`Editor::read_line`].
    pub fn read_line_from(&mut self, source: &mut dyn ByteSource) -> Result<Option<String>, Error> {
        self.reset_session();
        let text = self.edit(source)?;
        Ok(Some(text))
    }

    fn edit(&mut self, source: &mut dyn ByteSource) -> Result<String, Error> {
        self.sync_viewport();
        self.dirty = true;
        self.redraw()?;
        loop {
            let Some(event) = read_event(source)? else {
                // end of input: commit what we have
                break;
            };
            if core_terminal::take_resize() {
                self.sync_viewport();
            }
            match dispatch(self, event)? {
                Flow::Commit => break,
                Flow::Continue => {}
            }
            if self.dirty {
                self.redraw()?;
            }
        }

        // step below the edited block and open a fresh line for the host
        let mut frame = Frame::new();
        let below = self
            .render
            .term_lines_drawn
            .saturating_sub(1)
            .saturating_sub(self.render.term_cursor_row);
        if below > 0 {
            frame.move_down(below)?;
        }
        frame.text("\r\n")?;
        frame.flush()?;

        let text = self.buffer.text().into_owned();
        if self.history.add(&text) {
            tracing::debug!(target: "readline", len = text.len(), "history entry added");
        }
        Ok(text)
    }

    /// Not a terminal: hand back the next stdin line verbatim.
    fn read_plain(&mut self) -> Result<Option<String>, Error> {
        let mut line = String::new();
        let n = io::stdin().lock().read_line(&mut line)?;
        if n == 0 {
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }

    /// Terminal that cannot drive escapes: prompt, then a cooked line read
    /// with trailing control bytes stripped.
    fn read_unsupported(&mut self) -> Result<Option<String>, Error> {
        core_terminal::emit(&self.prompt)?;
        let mut line = String::new();
        let n = io::stdin().lock().read_line(&mut line)?;
        if n == 0 {
            return Ok(None);
        }
        while line.ends_with(|c: char| c.is_control()) {
            line.pop();
        }
        tracing::debug!(target: "readline", "unsupported terminal fallback used");
        Ok(Some(line))
    }

    /// Emit `text` to stdout through the configured syntax callback and
    /// palette, without viewport clipping.
    pub fn display_with_syntax(&mut self, text: &str) -> Result<(), Error> {
        let mut frame = Frame::new();
        core_render::display_with_syntax(text, &self.palette, self.syntax.as_deref_mut(), &mut frame)?;
        frame.flush()?;
        Ok(())
    }

    // ---- internals ----------------------------------------------------------

    /// Per-read reset mandated by the editor lifecycle: empty buffer,
    /// single-sentinel indices, no selection, no browse, no suggestions, and
    /// a zeroed render bookkeeping block.
    fn reset_session(&mut self) {
        self.buffer.clear();
        self.history.stop_browsing();
        self.suggestions.clear();
        self.render.reset();
        self.dirty = false;
    }

    /// Recompute the content viewport from the terminal width and the wider
    /// of the two prompts, with one safety column.
    pub(crate) fn sync_viewport(&mut self) {
        let term = core_terminal::terminal_width();
        let prompt_w = str_width(&self.prompt, self.split, self.width);
        let cont_w = self
            .continuation
            .as_deref()
            .map_or(prompt_w, |c| str_width(c, self.split, self.width));
        self.render.viewport.screen_cols = term.saturating_sub(prompt_w.max(cont_w) + 1).max(1);
        self.dirty = true;
    }

    pub(crate) fn redraw(&mut self) -> Result<(), Error> {
        let ghost = if self.buffer.cursor() == self.buffer.grapheme_count()
            && !self.buffer.has_selection()
        {
            self.suggestions.current()
        } else {
            None
        };
        let ctx = RenderCtx {
            buffer: &self.buffer,
            prompt: &self.prompt,
            continuation: self.continuation.as_deref().unwrap_or(&self.prompt),
            palette: &self.palette,
            split: self.split,
            width: self.width,
            ghost,
        };
        let mut frame = Frame::new();
        render(&ctx, &mut self.render, self.syntax.as_deref_mut(), &mut frame)?;
        frame.flush()?;
        self.dirty = false;
        Ok(())
    }

    /// Rebuild the suggestion list. Gated on the cursor sitting at the end of
    /// the buffer with no active selection; otherwise the list just empties.
    pub(crate) fn regenerate_suggestions(&mut self) {
        self.suggestions.clear();
        if self.buffer.cursor() != self.buffer.grapheme_count() || self.buffer.has_selection() {
            return;
        }
        let Some(cb) = self.complete.as_mut() else {
            return;
        };
        let text = self.buffer.text().into_owned();
        self.suggestions.gather(&text, cb.as_mut());
    }

    // test-facing observers

    /// Current buffer contents (scripted sessions and tests).
    pub fn buffer_text(&self) -> String {
        self.buffer.text().into_owned()
    }

    /// Whether the last redraw actually displayed the ghost suggestion.
    pub fn suggestion_shown(&self) -> bool {
        self.render.suggestion_shown
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("prompt", &self.prompt)
            .field("buffer", &self.buffer)
            .field("history_len", &self.history.len())
            .finish()
    }
}
