//! ToUnicode CMap parser.
//!
//! CMap streams map font character codes to Unicode. They are the only
//! reliable way to recover text from subset and CID-keyed fonts.

use regex::Regex;
use std::collections::HashMap;

/// Character codes (1-4 bytes) to Unicode strings.
pub type CMap = HashMap<u32, String>;

/// Upper bound on the size of one bfrange, against hostile streams.
const MAX_RANGE: u32 = 0xFFFF;

/// Parse a ToUnicode CMap stream.
///
/// Only the `bfchar` and `bfrange` sections matter for text recovery;
/// everything else in the stream is ignored.
///
/// ```text
/// beginbfchar
/// <0041> <0041>
/// endbfchar
/// beginbfrange
/// <0020> <007E> <0020>
/// endbfrange
/// ```
///
/// # Examples
///
/// ```
/// use pdf_spotlight::fonts::parse_tounicode_cmap;
///
/// let cmap = parse_tounicode_cmap(b"beginbfchar\n<0041> <0041>\nendbfchar");
/// assert_eq!(cmap.get(&0x41), Some(&"A".to_string()));
/// ```
pub fn parse_tounicode_cmap(data: &[u8]) -> CMap {
    let mut cmap = HashMap::new();
    let content = String::from_utf8_lossy(data);

    for section in extract_sections(&content, "beginbfchar", "endbfchar") {
        for line in section.lines() {
            if let Some((src, dst)) = parse_bfchar_line(line) {
                log::trace!("ToUnicode bfchar: 0x{:02X} -> {:?}", src, dst);
                cmap.insert(src, dst);
            }
        }
    }

    for section in extract_sections(&content, "beginbfrange", "endbfrange") {
        for line in section.lines() {
            if let Some(mappings) = parse_bfrange_line(line) {
                log::trace!("ToUnicode bfrange: {} mappings parsed", mappings.len());
                cmap.extend(mappings);
            }
        }
    }

    cmap
}

/// Extract sections between begin and end markers.
fn extract_sections<'a>(content: &'a str, begin: &str, end: &str) -> Vec<&'a str> {
    let mut sections = Vec::new();
    let mut remaining = content;

    while let Some(begin_pos) = remaining.find(begin) {
        let after_begin = &remaining[begin_pos + begin.len()..];
        if let Some(end_pos) = after_begin.find(end) {
            sections.push(&after_begin[..end_pos]);
            remaining = &after_begin[end_pos + end.len()..];
        } else {
            break;
        }
    }

    sections
}

/// Decode a destination hex string as UTF-16BE.
///
/// Destinations hold one or more UTF-16 code units, so surrogate pairs and
/// ligatures ("ffi" as three units) come out right. Short odd-length values
/// are treated as a bare code point.
fn decode_destination(hex: &str) -> Option<String> {
    if hex.len() % 4 != 0 {
        let code = u32::from_str_radix(hex, 16).ok()?;
        return char::from_u32(code).map(|ch| ch.to_string());
    }

    let units = (0..hex.len())
        .step_by(4)
        .map(|i| u16::from_str_radix(&hex[i..i + 4], 16))
        .collect::<std::result::Result<Vec<u16>, _>>()
        .ok()?;

    String::from_utf16(&units).ok().filter(|s| !s.is_empty())
}

/// Parse a bfchar line: `<src> <dst>`
fn parse_bfchar_line(line: &str) -> Option<(u32, String)> {
    lazy_static::lazy_static! {
        static ref RE: Regex = Regex::new(r"<([0-9A-Fa-f]+)>\s*<([0-9A-Fa-f]+)>").unwrap();
    }

    let caps = RE.captures(line)?;
    let src = u32::from_str_radix(&caps[1], 16).ok()?;
    let dst = decode_destination(&caps[2])?;
    Some((src, dst))
}

/// Parse a bfrange line.
///
/// Two shapes exist:
/// 1. `<start> <end> <dst>` - sequential mapping starting at dst
/// 2. `<start> <end> [<dst1> <dst2> ...]` - one destination per code
fn parse_bfrange_line(line: &str) -> Option<Vec<(u32, String)>> {
    lazy_static::lazy_static! {
        static ref RE_SEQ: Regex = Regex::new(
            r"<([0-9A-Fa-f]+)>\s*<([0-9A-Fa-f]+)>\s*<([0-9A-Fa-f]+)>"
        ).unwrap();
        static ref RE_ARRAY: Regex = Regex::new(
            r"<([0-9A-Fa-f]+)>\s*<([0-9A-Fa-f]+)>\s*\[((?:\s*<[0-9A-Fa-f]+>\s*)+)\]"
        ).unwrap();
        static ref RE_HEX: Regex = Regex::new(r"<([0-9A-Fa-f]+)>").unwrap();
    }

    if let Some(caps) = RE_ARRAY.captures(line) {
        let start = u32::from_str_radix(&caps[1], 16).ok()?;
        let end = u32::from_str_radix(&caps[2], 16).ok()?;
        let range_size = end.checked_sub(start)?.min(MAX_RANGE) as usize + 1;

        let dst_hexes: Vec<&str> = RE_HEX
            .captures_iter(&caps[3])
            .filter_map(|cap| cap.get(1).map(|m| m.as_str()))
            .collect();

        if dst_hexes.len() != range_size {
            log::warn!(
                "ToUnicode bfrange array size mismatch: expected {} entries for range 0x{:X}-0x{:X}, got {}",
                range_size,
                start,
                end,
                dst_hexes.len()
            );
        }

        let result = dst_hexes
            .iter()
            .take(range_size)
            .enumerate()
            .filter_map(|(i, hex)| Some((start + i as u32, decode_destination(hex)?)))
            .collect();
        return Some(result);
    }

    let caps = RE_SEQ.captures(line)?;
    let start = u32::from_str_radix(&caps[1], 16).ok()?;
    let end = u32::from_str_radix(&caps[2], 16).ok()?;
    let dst_hex = &caps[3];
    let range = end.checked_sub(start)?.min(MAX_RANGE);

    // Sequential ranges increment the last UTF-16 unit of the destination.
    let (prefix, last) = if dst_hex.len() > 4 && dst_hex.len() % 4 == 0 {
        let split = dst_hex.len() - 4;
        (&dst_hex[..split], u32::from_str_radix(&dst_hex[split..], 16).ok()?)
    } else {
        ("", u32::from_str_radix(dst_hex, 16).ok()?)
    };

    let mut result = Vec::with_capacity(range as usize + 1);
    for i in 0..=range {
        let unit = last + i;
        let dst = if prefix.is_empty() {
            char::from_u32(unit).map(|ch| ch.to_string())
        } else {
            decode_destination(&format!("{}{:04X}", prefix, unit & 0xFFFF))
        };
        if let Some(dst) = dst {
            result.push((start + i, dst));
        }
    }
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bfchar_multiple() {
        let data = b"beginbfchar\n<0041> <0041>\n<0042> <0042>\n<0003> <0020>\nendbfchar";
        let cmap = parse_tounicode_cmap(data);
        assert_eq!(cmap.len(), 3);
        assert_eq!(cmap.get(&0x42), Some(&"B".to_string()));
        assert_eq!(cmap.get(&0x03), Some(&" ".to_string()));
    }

    #[test]
    fn test_parse_bfchar_ligature() {
        let cmap = parse_tounicode_cmap(b"beginbfchar\n<0005> <006600660069>\nendbfchar");
        assert_eq!(cmap.get(&0x05), Some(&"ffi".to_string()));
    }

    #[test]
    fn test_parse_bfchar_surrogate_pair() {
        let cmap = parse_tounicode_cmap(b"beginbfchar\n<0010> <D835DF0C>\nendbfchar");
        assert_eq!(cmap.get(&0x10), Some(&"\u{1D70C}".to_string()));
    }

    #[test]
    fn test_parse_bfrange_sequential() {
        let cmap = parse_tounicode_cmap(b"beginbfrange\n<0041> <0043> <0061>\nendbfrange");
        assert_eq!(cmap.get(&0x41), Some(&"a".to_string()));
        assert_eq!(cmap.get(&0x43), Some(&"c".to_string()));
        assert!(!cmap.contains_key(&0x44));
    }

    #[test]
    fn test_parse_bfrange_array() {
        let cmap = parse_tounicode_cmap(
            b"beginbfrange\n<005F> <0061> [<00660066> <00660069> <0055>]\nendbfrange",
        );
        assert_eq!(cmap.get(&0x5F), Some(&"ff".to_string()));
        assert_eq!(cmap.get(&0x60), Some(&"fi".to_string()));
        assert_eq!(cmap.get(&0x61), Some(&"U".to_string()));
    }

    #[test]
    fn test_inverted_range_is_ignored() {
        let cmap = parse_tounicode_cmap(b"beginbfrange\n<0043> <0041> <0061>\nendbfrange");
        assert!(cmap.is_empty());
    }
}
