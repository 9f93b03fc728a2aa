//! Byte sources backing the decoder.

use crate::ByteSource;
use std::io;
#[cfg(unix)]
use std::io::Read;

/// In-memory source used by tests and scripted sessions.
#[derive(Debug)]
pub struct SliceSource {
    bytes: Vec<u8>,
    at: usize,
}

impl SliceSource {
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
            at: 0,
        }
    }
}

impl ByteSource for SliceSource {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let b = self.bytes.get(self.at).copied();
        if b.is_some() {
            self.at += 1;
        }
        Ok(b)
    }
}

/// Blocking single-byte reads from stdin. Raw mode is the caller's problem;
/// `EINTR` (typically a window resize signal landing mid-read) retries.
#[cfg(unix)]
#[derive(Debug)]
pub struct TtyByteSource {
    stdin: io::Stdin,
}

#[cfg(unix)]
impl TtyByteSource {
    pub fn new() -> Self {
        Self { stdin: io::stdin() }
    }
}

#[cfg(unix)]
impl Default for TtyByteSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
impl ByteSource for TtyByteSource {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        loop {
            match self.stdin.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(windows)]
pub mod console {
    //! Console key events → the VT byte stream the shared decoder expects.
    //!
    //! The console API reports virtual keys rather than bytes; each event is
    //! translated to the same escape sequences a unix terminal would send, so
    //! everything downstream of the source is platform-independent.

    use crate::ByteSource;
    use crossterm::event::{self, Event, KeyCode as CKeyCode, KeyEventKind, KeyModifiers as CMods};
    use std::collections::VecDeque;
    use std::io;

    #[derive(Debug, Default)]
    pub struct ConsoleByteSource {
        queue: VecDeque<u8>,
    }

    impl ConsoleByteSource {
        pub fn new() -> Self {
            Self::default()
        }

        fn push_csi(&mut self, tail: &[u8]) {
            self.queue.extend(b"\x1b[");
            self.queue.extend(tail);
        }

        fn push_char(&mut self, c: char) {
            let mut utf8 = [0u8; 4];
            self.queue.extend(c.encode_utf8(&mut utf8).as_bytes());
        }

        fn translate(&mut self, key: event::KeyEvent) {
            let shift = key.modifiers.contains(CMods::SHIFT);
            let ctrl = key.modifiers.contains(CMods::CONTROL);
            let alt = key.modifiers.contains(CMods::ALT);
            match key.code {
                CKeyCode::Up => self.push_csi(b"A"),
                CKeyCode::Down => self.push_csi(b"B"),
                CKeyCode::Right if shift => self.push_csi(b"1;2C"),
                CKeyCode::Right => self.push_csi(b"C"),
                CKeyCode::Left if shift => self.push_csi(b"1;2D"),
                CKeyCode::Left => self.push_csi(b"D"),
                CKeyCode::Home => self.push_csi(b"H"),
                CKeyCode::End => self.push_csi(b"F"),
                CKeyCode::PageUp => self.push_csi(b"5~"),
                CKeyCode::PageDown => self.push_csi(b"6~"),
                CKeyCode::BackTab => self.push_csi(b"Z"),
                CKeyCode::Tab if shift => self.push_csi(b"Z"),
                CKeyCode::Tab => self.queue.push_back(0x09),
                CKeyCode::Enter if ctrl => self.queue.push_back(0x0A),
                CKeyCode::Enter => self.queue.push_back(0x0D),
                CKeyCode::Backspace => self.queue.push_back(0x7F),
                CKeyCode::Char(c) if ctrl && c.is_ascii_alphabetic() => {
                    self.queue
                        .push_back(c.to_ascii_uppercase() as u8 - b'A' + 1);
                }
                CKeyCode::Char(c) => {
                    if alt {
                        self.queue.push_back(0x1B);
                    }
                    self.push_char(c);
                }
                _ => {}
            }
        }
    }

    impl ByteSource for ConsoleByteSource {
        fn read_byte(&mut self) -> io::Result<Option<u8>> {
            loop {
                if let Some(b) = self.queue.pop_front() {
                    return Ok(Some(b));
                }
                match event::read()? {
                    Event::Key(key) if key.kind != KeyEventKind::Release => {
                        self.translate(key);
                    }
                    Event::Resize(_, _) => core_terminal::note_resize(),
                    _ => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_source_drains_then_eofs() {
        let mut src = SliceSource::new(b"ab");
        assert_eq!(src.read_byte().expect("read"), Some(b'a'));
        assert_eq!(src.read_byte().expect("read"), Some(b'b'));
        assert_eq!(src.read_byte().expect("read"), None);
        assert_eq!(src.read_byte().expect("read"), None);
    }
}
