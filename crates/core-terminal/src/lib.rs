//! Terminal platform layer: raw mode, capability checks, and the restore
//! registry shared with signal handlers.
//!
//! Raw mode is scoped through [`RawModeGuard`] so every exit path from an
//! interactive read (commit, EOF, error, unwind) puts the terminal back.
//! Nested sessions are refcounted; handlers install on the first enter and
//! uninstall on the last leave.

use crossterm::tty::IsTty;
use std::io::{self, Write};

mod registry;

pub use registry::{note_resize, take_resize};

/// `TERM` values that cannot drive the escape-sequence renderer.
const UNSUPPORTED_TERM: [&str; 3] = ["dumb", "cons25", "emacs"];

/// Is standard input an interactive terminal?
pub fn is_tty() -> bool {
    io::stdin().is_tty()
}

fn term_value_supported(term: Option<&str>) -> bool {
    match term {
        Some(t) => !UNSUPPORTED_TERM.iter().any(|u| t.eq_ignore_ascii_case(u)),
        None => true,
    }
}

/// Does the terminal advertised by the environment support the interactive
/// path? Always `true` off unix.
pub fn is_supported() -> bool {
    if cfg!(unix) {
        let term = std::env::var("TERM").ok();
        term_value_supported(term.as_deref())
    } else {
        true
    }
}

/// Current terminal width in columns, 80 when the query fails.
pub fn terminal_width() -> usize {
    match crossterm::terminal::size() {
        Ok((cols, _)) if cols > 0 => cols as usize,
        _ => 80,
    }
}

/// Write a string to stdout and flush it immediately.
pub fn emit(s: &str) -> io::Result<()> {
    let mut out = io::stdout();
    out.write_all(s.as_bytes())?;
    out.flush()
}

/// Switch the console streams to UTF-8.
///
/// On unix the terminal already speaks UTF-8 and raw mode sets 8-bit chars;
/// on windows the crossterm backend writes through the wide console API, so
/// there is nothing to flip on either platform.
pub fn set_utf8_mode() {}

/// RAII raw-mode session. Entering twice nests; the terminal is restored when
/// the last guard drops, even on early return or panic.
#[derive(Debug)]
pub struct RawModeGuard {
    active: bool,
}

impl RawModeGuard {
    /// Enter raw mode. `install_hooks` opts into the signal/atexit restore
    /// handlers; hosts owning their own handlers pass `false`.
    pub fn enter(install_hooks: bool) -> io::Result<Self> {
        registry::enter_raw(install_hooks)?;
        tracing::debug!(target: "term.raw", install_hooks, "raw mode entered");
        Ok(Self { active: true })
    }

    /// Explicit balanced exit; `Drop` covers the implicit paths.
    pub fn leave(mut self) -> io::Result<()> {
        self.active = false;
        let res = registry::leave_raw();
        tracing::debug!(target: "term.raw", "raw mode left");
        res
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if self.active {
            let _ = registry::leave_raw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_terms_rejected() {
        assert!(!term_value_supported(Some("dumb")));
        assert!(!term_value_supported(Some("Emacs")));
        assert!(!term_value_supported(Some("cons25")));
        assert!(term_value_supported(Some("xterm-256color")));
        assert!(term_value_supported(None));
    }

    #[test]
    fn resize_flag_is_take_once() {
        note_resize();
        assert!(take_resize());
        assert!(!take_resize());
    }
}
