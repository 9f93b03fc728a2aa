//! Logical key events and the raw-byte decoder.
//!
//! Both platforms feed the same decoder: on unix the byte source is stdin in
//! raw mode; on windows the console event stream is first translated into the
//! equivalent VT byte sequences. Decoding is therefore testable with an
//! in-memory source.

use bitflags::bitflags;

mod decoder;
mod source;

pub use decoder::read_event;
pub use source::SliceSource;
#[cfg(unix)]
pub use source::TtyByteSource;
#[cfg(windows)]
pub use source::console::ConsoleByteSource;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct KeyModifiers: u8 {
        const SHIFT = 0b0000_0001;
        const CTRL  = 0b0000_0010;
    }
}

/// Normalized logical keys surfaced to the dispatch layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Tab,
    Backspace,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    /// Control chord, carrying the uppercase letter (`Ctrl('A')`).
    Ctrl(char),
    Alt(char),
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyEvent {
    pub fn plain(code: KeyCode) -> Self {
        Self {
            code,
            mods: KeyModifiers::empty(),
        }
    }

    pub fn shifted(code: KeyCode) -> Self {
        Self {
            code,
            mods: KeyModifiers::SHIFT,
        }
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            mods: KeyModifiers::CTRL,
        }
    }
}

/// Blocking byte stream feeding the decoder. `None` is end of input.
pub trait ByteSource {
    fn read_byte(&mut self) -> std::io::Result<Option<u8>>;
}
