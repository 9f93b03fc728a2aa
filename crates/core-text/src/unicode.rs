//! UAX #29 / East Asian width adapters.
//!
//! Same signatures as the built-in heuristics so a host can hand them to the
//! splitter/width override hooks when conformant segmentation matters more
//! than zero dependencies.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Conformant splitter. Invalid bytes degrade to single-byte progress;
/// a sequence cut off mid-codepoint reports `0` (incomplete).
pub fn split(bytes: &[u8]) -> usize {
    if bytes.is_empty() {
        return 0;
    }
    let text = match core::str::from_utf8(bytes) {
        Ok(t) => t,
        Err(e) if e.valid_up_to() > 0 => {
            match core::str::from_utf8(&bytes[..e.valid_up_to()]) {
                Ok(t) => t,
                Err(_) => return 1,
            }
        }
        Err(e) => {
            return match e.error_len() {
                None => 0, // unexpected end of input: incomplete
                Some(_) => 1,
            };
        }
    };
    text.graphemes(true).next().map_or(0, str::len)
}

/// Conformant width. Tabs keep the editor's fixed tab width.
pub fn width(bytes: &[u8]) -> usize {
    match core::str::from_utf8(bytes) {
        Ok("\t") => crate::TAB_WIDTH,
        Ok(t) => UnicodeWidthStr::width(t),
        Err(_) => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_takes_whole_cluster() {
        let s = "e\u{0301}rest";
        assert_eq!(split(s.as_bytes()), 3);
    }

    #[test]
    fn split_incomplete_reports_zero() {
        let thumbs = "\u{1F44D}".as_bytes();
        assert_eq!(split(&thumbs[..2]), 0);
    }

    #[test]
    fn split_invalid_byte_advances() {
        assert_eq!(split(&[0xFF, b'a']), 1);
    }

    #[test]
    fn width_matrix() {
        assert_eq!(width(b"a"), 1);
        assert_eq!(width("\u{754C}".as_bytes()), 2);
        assert_eq!(width(b"\t"), crate::TAB_WIDTH);
        assert_eq!(width("\u{0301}".as_bytes()), 0);
    }
}
