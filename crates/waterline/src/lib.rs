//! waterline — an embeddable interactive line editor.
//!
//! A host REPL constructs an [`Editor`], installs whichever callbacks it
//! needs (autocomplete, syntax colour, multi-line continuation, grapheme
//! overrides), and calls [`Editor::read_line`] in a loop. The editor presents
//! the prompt, interprets keystrokes, renders through ANSI escapes, and hands
//! back the committed text; `Ok(None)` is end of input.
//!
//! ```no_run
//! let mut ed = waterline::Editor::new("> ");
//! while let Some(line) = ed.read_line().expect("readline") {
//!     println!("got: {line}");
//! }
//! ```

use std::io::{self, Write};

mod dispatch;
mod editor;
mod history;
mod list;
mod suggest;

pub use core_input::{ByteSource, KeyCode, KeyEvent, KeyModifiers, SliceSource};
pub use core_render::{Color, SyntaxSpan};
pub use core_terminal::{emit, is_supported, is_tty, set_utf8_mode, terminal_width};
pub use core_text::{SplitFn, TAB_WIDTH, WidthFn, grapheme_width, split_grapheme, str_width};
#[cfg(feature = "unicode")]
pub use core_text::unicode;
pub use editor::Editor;
pub use history::{History, HistoryLimit};

/// Autocomplete host callback. Invoked repeatedly with the buffer text and a
/// cursor-opaque enumeration index (starting at 0, advanced by the host);
/// each call returns the *suffix* to append at the cursor, or `None` to end
/// the enumeration.
pub type CompleteFn = dyn FnMut(&str, &mut usize) -> Option<String>;

/// Multi-line host predicate: `true` means the buffer needs another line,
/// so Return inserts a newline instead of committing.
pub type MultilineFn = dyn Fn(&str) -> bool;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An owned allocation could not grow; the editor state is unchanged.
    #[error("allocation failed")]
    OutOfMemory,
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<core_buffer::BufferError> for Error {
    fn from(_: core_buffer::BufferError) -> Self {
        Self::OutOfMemory
    }
}

/// Write one foreground colour escape to stdout, using the packed palette
/// encoding (`-1` default, `0..=15` ANSI, `16..=255` xterm-256, RGB with bit
/// `0x0100_0000`).
pub fn emit_color(code: i32) -> io::Result<()> {
    let mut out = io::stdout();
    Color::from_code(code).write(&mut out)?;
    out.flush()
}
