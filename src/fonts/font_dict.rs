//! Font dictionary parsing.
//!
//! Only the pieces that matter for placing text are read: the glyph width
//! table, the code width (one or two bytes) and the ToUnicode CMap.

use crate::fonts::cmap::{parse_tounicode_cmap, CMap};
use crate::fonts::encoding::single_byte_to_char;
use lopdf::{Dictionary, Document, Object};

/// Width used when a font carries no usable width table (1000ths of em).
pub const DEFAULT_GLYPH_WIDTH: f32 = 500.0;

/// Metrics and decoding information for one font resource.
#[derive(Debug, Clone)]
pub struct FontMetrics {
    /// Base font name (e.g., "Helvetica-Bold")
    pub base_font: String,
    /// Font subtype (e.g., "Type1", "TrueType", "Type0")
    pub subtype: String,
    /// Glyph widths in 1000ths of em, indexed by (code - first_char)
    pub widths: Vec<f32>,
    /// First character code covered by `widths`
    pub first_char: u32,
    /// Width for codes outside `widths`
    pub default_width: f32,
    /// Composite fonts use two-byte codes
    pub two_byte: bool,
    /// ToUnicode CMap, if the font has one
    pub to_unicode: Option<CMap>,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self {
            base_font: String::new(),
            subtype: "Type1".to_string(),
            widths: Vec::new(),
            first_char: 0,
            default_width: DEFAULT_GLYPH_WIDTH,
            two_byte: false,
            to_unicode: None,
        }
    }
}

impl FontMetrics {
    /// Read font metrics from a font dictionary.
    ///
    /// Malformed entries fall back to defaults rather than failing; a font we
    /// cannot measure still yields text, only with approximate widths.
    pub fn from_dict(dict: &Dictionary, doc: &Document) -> Self {
        let name_of = |key: &[u8]| {
            dict.get_deref(key, doc)
                .and_then(Object::as_name)
                .map(|n| String::from_utf8_lossy(n).into_owned())
                .unwrap_or_default()
        };

        let subtype = name_of(b"Subtype");
        let base_font = name_of(b"BaseFont");
        let two_byte = subtype == "Type0";

        let (widths, first_char, default_width) = if two_byte {
            (Vec::new(), 0, composite_default_width(dict, doc))
        } else {
            let widths = dict
                .get_deref(b"Widths", doc)
                .and_then(Object::as_array)
                .map(|arr| arr.iter().filter_map(|w| number(w, doc)).collect())
                .unwrap_or_default();
            let first_char = dict
                .get_deref(b"FirstChar", doc)
                .and_then(Object::as_i64)
                .map(|c| c.max(0) as u32)
                .unwrap_or(0);
            (widths, first_char, DEFAULT_GLYPH_WIDTH)
        };

        let to_unicode = dict
            .get_deref(b"ToUnicode", doc)
            .and_then(Object::as_stream)
            .ok()
            .map(|stream| {
                let data = stream
                    .decompressed_content()
                    .unwrap_or_else(|_| stream.content.clone());
                parse_tounicode_cmap(&data)
            })
            .filter(|cmap| !cmap.is_empty());

        log::debug!(
            "Font '{}' ({}): {} widths from {}, two_byte={}, to_unicode={}",
            base_font,
            subtype,
            widths.len(),
            first_char,
            two_byte,
            to_unicode.is_some()
        );

        Self {
            base_font,
            subtype,
            widths,
            first_char,
            default_width,
            two_byte,
            to_unicode,
        }
    }

    /// Width of a glyph in 1000ths of em.
    pub fn glyph_width(&self, code: u32) -> f32 {
        code.checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize))
            .copied()
            .filter(|w| *w > 0.0)
            .unwrap_or(self.default_width)
    }

    /// Split a shown string into character codes.
    pub fn codes(&self, bytes: &[u8]) -> Vec<u32> {
        if self.two_byte {
            bytes
                .chunks(2)
                .map(|pair| match pair {
                    [hi, lo] => (u32::from(*hi) << 8) | u32::from(*lo),
                    [single] => u32::from(*single),
                    _ => 0,
                })
                .collect()
        } else {
            bytes.iter().map(|b| u32::from(*b)).collect()
        }
    }

    /// Unicode text for one character code.
    pub fn decode_code(&self, code: u32) -> String {
        if let Some(text) = self.to_unicode.as_ref().and_then(|cmap| cmap.get(&code)) {
            return text.clone();
        }
        if self.two_byte {
            return char::from_u32(code).map(String::from).unwrap_or_default();
        }
        single_byte_to_char(code as u8).map(String::from).unwrap_or_default()
    }
}

/// Default width of a composite font (`/DW` on the descendant font).
fn composite_default_width(dict: &Dictionary, doc: &Document) -> f32 {
    dict.get_deref(b"DescendantFonts", doc)
        .and_then(Object::as_array)
        .ok()
        .and_then(|arr| arr.first())
        .and_then(|first| doc.dereference(first).ok())
        .and_then(|(_, obj)| obj.as_dict().ok())
        .and_then(|descendant| descendant.get_deref(b"DW", doc).ok())
        .and_then(|dw| number(dw, doc))
        .unwrap_or(1000.0)
}

fn number(obj: &Object, doc: &Document) -> Option<f32> {
    doc.dereference(obj).ok().and_then(|(_, o)| o.as_float().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};

    #[test]
    fn test_simple_font_widths() {
        let doc = Document::with_version("1.7");
        let dict = dictionary! {
            "Type" => "Font",
            "Subtype" => "TrueType",
            "BaseFont" => "Arial",
            "FirstChar" => 65,
            "Widths" => vec![Object::Integer(667), Object::Integer(0), Object::Real(722.0)],
        };
        let font = FontMetrics::from_dict(&dict, &doc);
        assert_eq!(font.base_font, "Arial");
        assert!(!font.two_byte);
        assert_eq!(font.glyph_width(65), 667.0);
        // zero widths fall back to the default
        assert_eq!(font.glyph_width(66), DEFAULT_GLYPH_WIDTH);
        assert_eq!(font.glyph_width(67), 722.0);
        assert_eq!(font.glyph_width(32), DEFAULT_GLYPH_WIDTH);
    }

    #[test]
    fn test_type0_font_uses_two_byte_codes() {
        let mut doc = Document::with_version("1.7");
        let cmap = Stream::new(
            Dictionary::new(),
            b"beginbfchar\n<0011> <0055>\n<0012> <004E>\nendbfchar".to_vec(),
        );
        let cmap_id = doc.add_object(cmap);
        let dict = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => "NotoSans",
            "ToUnicode" => cmap_id,
        };
        let font = FontMetrics::from_dict(&dict, &doc);
        assert!(font.two_byte);
        let codes = font.codes(&[0x00, 0x11, 0x00, 0x12]);
        assert_eq!(codes, vec![0x11, 0x12]);
        let text: String = codes.iter().map(|c| font.decode_code(*c)).collect();
        assert_eq!(text, "UN");
        assert_eq!(font.glyph_width(0x11), 1000.0);
    }

    #[test]
    fn test_single_byte_decoding_without_cmap() {
        let font = FontMetrics::default();
        let text: String = font.codes(b"UN1203").iter().map(|c| font.decode_code(*c)).collect();
        assert_eq!(text, "UN1203");
    }
}
