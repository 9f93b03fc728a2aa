//! Palette model and the foreground escape encoding.

use std::io::{self, Write};

/// A foreground colour as stored in the palette.
///
/// The packed integer form hosts may keep colour tables in decodes via
/// [`Color::from_code`]: `-1` default, `0..=7` basic ANSI, `8..=15` bright
/// ANSI, `16..=255` xterm-256, and bit `0x0100_0000` carrying 24-bit RGB in
/// the low bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    #[default]
    Default,
    /// Basic + bright ANSI, `0..=15`.
    Ansi(u8),
    /// xterm-256 palette entry, `16..=255`.
    Xterm(u8),
    Rgb(u8, u8, u8),
}

const RGB_BIT: i32 = 0x0100_0000;

impl Color {
    pub fn from_code(code: i32) -> Self {
        if code < 0 {
            Self::Default
        } else if code & RGB_BIT != 0 {
            Self::Rgb(
                ((code >> 16) & 0xFF) as u8,
                ((code >> 8) & 0xFF) as u8,
                (code & 0xFF) as u8,
            )
        } else if code <= 15 {
            Self::Ansi(code as u8)
        } else if code <= 255 {
            Self::Xterm(code as u8)
        } else {
            Self::Default
        }
    }

    /// Emit the foreground escape. `Default` writes nothing; the caller
    /// resets attributes when a run of default colour follows a coloured one.
    pub fn write(self, out: &mut impl Write) -> io::Result<()> {
        match self {
            Self::Default => Ok(()),
            Self::Ansi(n) if n < 8 => write!(out, "\x1b[{}m", 30 + u16::from(n)),
            Self::Ansi(n) => write!(out, "\x1b[{}m", 90 + u16::from(n - 8)),
            Self::Xterm(n) => write!(out, "\x1b[38;5;{n}m"),
            Self::Rgb(r, g, b) => write!(out, "\x1b[38;2;{r};{g};{b}m"),
        }
    }
}

/// Host-configured colour table indexed by syntax span colour indices.
/// Out-of-range lookups fall back to the default foreground.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    /// `None` when `colors` is empty; a palette must have at least one entry.
    pub fn new(colors: Vec<Color>) -> Option<Self> {
        if colors.is_empty() {
            None
        } else {
            Some(Self { colors })
        }
    }

    pub fn from_codes(codes: &[i32]) -> Option<Self> {
        Self::new(codes.iter().copied().map(Color::from_code).collect())
    }

    pub fn get(&self, index: usize) -> Color {
        self.colors.get(index).copied().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }
}
