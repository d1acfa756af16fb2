//! Single-byte text decoding for fonts without a ToUnicode CMap.
//!
//! Simple fonts in practice use WinAnsiEncoding (Windows-1252), so codes
//! 0x80-0x9F follow that table and everything else maps straight onto
//! Latin-1.

/// Decode one byte of a simple-font string.
///
/// Returns `None` for control codes and for the five undefined
/// WinAnsi slots; tab, newline and carriage return come back as a space.
///
/// # Examples
///
/// ```
/// use pdf_spotlight::fonts::encoding::single_byte_to_char;
///
/// assert_eq!(single_byte_to_char(b'U'), Some('U'));
/// assert_eq!(single_byte_to_char(0x96), Some('\u{2013}'));
/// assert_eq!(single_byte_to_char(0x00), None);
/// ```
pub fn single_byte_to_char(code: u8) -> Option<char> {
    match code {
        b'\t' | b'\n' | b'\r' => Some(' '),
        0x00..=0x1F | 0x7F => None,
        0x20..=0x7E => Some(code as char),
        0x80..=0x9F => winansi_high(code),
        0xA0..=0xFF => Some(code as char),
    }
}

fn winansi_high(code: u8) -> Option<char> {
    let ch = match code {
        0x80 => '\u{20AC}', // Euro sign
        0x82 => '\u{201A}',
        0x83 => '\u{0192}',
        0x84 => '\u{201E}',
        0x85 => '\u{2026}', // ellipsis
        0x86 => '\u{2020}',
        0x87 => '\u{2021}',
        0x88 => '\u{02C6}',
        0x89 => '\u{2030}',
        0x8A => '\u{0160}',
        0x8B => '\u{2039}',
        0x8C => '\u{0152}',
        0x8E => '\u{017D}',
        0x91 => '\u{2018}',
        0x92 => '\u{2019}',
        0x93 => '\u{201C}',
        0x94 => '\u{201D}',
        0x95 => '\u{2022}', // bullet
        0x96 => '\u{2013}', // en dash
        0x97 => '\u{2014}', // em dash
        0x98 => '\u{02DC}',
        0x99 => '\u{2122}',
        0x9A => '\u{0161}',
        0x9B => '\u{203A}',
        0x9C => '\u{0153}',
        0x9E => '\u{017E}',
        0x9F => '\u{0178}',
        _ => return None,
    };
    Some(ch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passthrough() {
        let decoded: String = b"UN 1942".iter().filter_map(|b| single_byte_to_char(*b)).collect();
        assert_eq!(decoded, "UN 1942");
    }

    #[test]
    fn test_winansi_range() {
        assert_eq!(single_byte_to_char(0x80), Some('\u{20AC}'));
        assert_eq!(single_byte_to_char(0x97), Some('\u{2014}'));
        assert_eq!(single_byte_to_char(0x81), None);
        assert_eq!(single_byte_to_char(0x9D), None);
    }

    #[test]
    fn test_latin1_and_controls() {
        assert_eq!(single_byte_to_char(0xE9), Some('é'));
        assert_eq!(single_byte_to_char(0xA0), Some('\u{00A0}'));
        assert_eq!(single_byte_to_char(b'\n'), Some(' '));
        assert_eq!(single_byte_to_char(0x07), None);
        assert_eq!(single_byte_to_char(0x7F), None);
    }
}
