//! Page source backed by `lopdf`.
//!
//! `lopdf` handles the file structure (xref, object streams). This module
//! decodes each page content stream, interprets its text operators and
//! reports one run per text-showing operator. A stream that does not decode
//! or parse to its end fails the page.

use crate::content::{count_operators, GraphicsStateStack, Matrix};
use crate::error::{Error, Result};
use crate::fonts::FontMetrics;
use crate::reader::{PageSource, RawPage, RawTextRun};
use lopdf::content::{Content, Operation};
use flate2::read::ZlibDecoder;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// US Letter, used when no MediaBox can be found.
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// TJ adjustments below this (in 1000ths of em) read as a word gap.
const SPACE_ADJUSTMENT_THRESHOLD: f32 = -120.0;

/// Guard against cyclic `/Parent` chains.
const MAX_INHERITANCE_DEPTH: usize = 32;

/// A PDF document read with `lopdf`.
#[derive(Debug)]
pub struct LopdfSource {
    doc: Document,
    pages: Vec<ObjectId>,
}

impl LopdfSource {
    /// Parse a PDF from memory.
    ///
    /// Bytes that `lopdf` cannot load fail with [`Error::CorruptDocument`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(bytes).map_err(|e| Error::CorruptDocument(e.to_string()))?;
        Self::from_document(doc)
    }

    /// Read and parse a PDF file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Wrap an already loaded document.
    ///
    /// Encrypted documents are opened with the empty user password; anything
    /// needing a real password fails with [`Error::UnsupportedEncryption`].
    pub fn from_document(mut doc: Document) -> Result<Self> {
        if doc.is_encrypted() {
            doc.decrypt("").map_err(|e| {
                log::debug!("Empty-password decryption failed: {}", e);
                Error::UnsupportedEncryption
            })?;
        }

        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        log::debug!("Loaded PDF {} with {} pages", doc.version, pages.len());
        Ok(Self { doc, pages })
    }

    /// MediaBox of a page as `[llx, lly, urx, ury]`, following `/Parent` inheritance.
    fn media_box(&self, page: &Dictionary) -> [f32; 4] {
        let mut node = Some(page);
        let mut depth = 0;
        while let Some(dict) = node {
            if let Ok(array) = dict.get_deref(b"MediaBox", &self.doc).and_then(Object::as_array) {
                let values: Vec<f32> = array
                    .iter()
                    .filter_map(|v| self.doc.dereference(v).ok())
                    .filter_map(|(_, v)| v.as_float().ok())
                    .collect();
                if let [x0, y0, x1, y1] = values[..] {
                    return [x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)];
                }
            }
            depth += 1;
            if depth > MAX_INHERITANCE_DEPTH {
                break;
            }
            node = dict.get_deref(b"Parent", &self.doc).and_then(Object::as_dict).ok();
        }
        DEFAULT_MEDIA_BOX
    }

    /// Concatenated, decompressed content streams of a page.
    fn content_data(&self, page: &Dictionary) -> std::result::Result<Vec<u8>, String> {
        let Ok(contents) = page.get(b"Contents") else {
            return Ok(Vec::new());
        };
        let (_, contents) = self
            .doc
            .dereference(contents)
            .map_err(|e| format!("content stream: {}", e))?;

        let parts: Vec<&Object> = match contents {
            Object::Array(items) => items.iter().collect(),
            other => vec![other],
        };

        let mut data = Vec::new();
        for part in parts {
            let stream = self
                .doc
                .dereference(part)
                .and_then(|(_, obj)| obj.as_stream())
                .map_err(|e| format!("content stream: {}", e))?;
            data.extend_from_slice(&decode_stream(stream)?);
            // streams may split tokens only at whitespace
            data.push(b'\n');
        }
        Ok(data)
    }
}

impl PageSource for LopdfSource {
    fn page_count(&self) -> Result<usize> {
        Ok(self.pages.len())
    }

    fn page(&self, page_number: usize) -> Result<RawPage> {
        let fail = |reason: String| Error::PageParseFailure {
            page: page_number,
            reason,
        };

        let page_id = page_number
            .checked_sub(1)
            .and_then(|i| self.pages.get(i))
            .copied()
            .ok_or_else(|| fail(format!("page out of range (document has {})", self.pages.len())))?;
        let page_dict = self.doc.get_dictionary(page_id).map_err(|e| fail(e.to_string()))?;

        let [llx, lly, urx, ury] = self.media_box(page_dict);
        let data = self.content_data(page_dict).map_err(fail)?;
        let content = Content::decode(&data).map_err(|e| fail(e.to_string()))?;
        let expected = count_operators(&data);
        if content.operations.len() != expected {
            return Err(fail(format!(
                "content stream unreadable after {} of {} operators",
                content.operations.len(),
                expected
            )));
        }

        let fonts: HashMap<Vec<u8>, FontMetrics> = self
            .doc
            .get_page_fonts(page_id)
            .into_iter()
            .map(|(name, dict)| (name, FontMetrics::from_dict(dict, &self.doc)))
            .collect();

        let mut collector = RunCollector::new(&fonts);
        for op in &content.operations {
            collector.execute(op);
        }

        let runs: Vec<RawTextRun> = collector
            .runs
            .into_iter()
            .map(|run| RawTextRun {
                x: run.x - llx,
                y: run.y - lly,
                ..run
            })
            .collect();

        log::debug!(
            "Page {}: {} operators, {} fonts, {} runs",
            page_number,
            content.operations.len(),
            fonts.len(),
            runs.len()
        );

        Ok(RawPage {
            width: urx - llx,
            height: ury - lly,
            runs,
        })
    }
}

/// One element of a shown string.
enum ShowItem<'a> {
    Text(&'a [u8]),
    Adjust(f32),
}

/// Content stream interpreter that records text runs.
struct RunCollector<'f> {
    fonts: &'f HashMap<Vec<u8>, FontMetrics>,
    fallback: FontMetrics,
    stack: GraphicsStateStack,
    runs: Vec<RawTextRun>,
}

impl<'f> RunCollector<'f> {
    fn new(fonts: &'f HashMap<Vec<u8>, FontMetrics>) -> Self {
        Self {
            fonts,
            fallback: FontMetrics::default(),
            stack: GraphicsStateStack::new(),
            runs: Vec::new(),
        }
    }

    fn execute(&mut self, op: &Operation) {
        let operands = op.operands.as_slice();
        match op.operator.as_str() {
            "BT" => self.stack.current_mut().begin_text(),
            "Tf" => match operands {
                [name, size] => {
                    let state = self.stack.current_mut();
                    if let Ok(name) = name.as_name() {
                        state.font_name = Some(name.to_vec());
                    }
                    if let Ok(size) = size.as_float() {
                        state.font_size = size;
                    }
                },
                _ => Self::bad_operands(op),
            },
            "Td" | "TD" => match numbers(operands)[..] {
                [tx, ty] => {
                    let state = self.stack.current_mut();
                    if op.operator == "TD" {
                        state.leading = -ty;
                    }
                    state.move_text_position(tx, ty);
                },
                _ => Self::bad_operands(op),
            },
            "Tm" | "cm" => match numbers(operands)[..] {
                [a, b, c, d, e, f] => {
                    let m = Matrix::new(a, b, c, d, e, f);
                    let state = self.stack.current_mut();
                    if op.operator == "Tm" {
                        state.set_text_matrix(m);
                    } else {
                        state.ctm = m.multiply(&state.ctm);
                    }
                },
                _ => Self::bad_operands(op),
            },
            "T*" => self.stack.current_mut().next_line(),
            "TL" | "Tc" | "Tw" | "Tz" | "Ts" => match numbers(operands)[..] {
                [value] => {
                    let state = self.stack.current_mut();
                    match op.operator.as_str() {
                        "TL" => state.leading = value,
                        "Tc" => state.char_space = value,
                        "Tw" => state.word_space = value,
                        "Tz" => state.horizontal_scaling = value,
                        _ => state.text_rise = value,
                    }
                },
                _ => Self::bad_operands(op),
            },
            "Tj" => match operands.first().map(Object::as_str) {
                Some(Ok(bytes)) => self.show(&[ShowItem::Text(bytes)]),
                _ => Self::bad_operands(op),
            },
            "'" => match operands.first().map(Object::as_str) {
                Some(Ok(bytes)) => {
                    self.stack.current_mut().next_line();
                    self.show(&[ShowItem::Text(bytes)]);
                },
                _ => Self::bad_operands(op),
            },
            "\"" => match operands {
                [aw, ac, text] => {
                    let state = self.stack.current_mut();
                    if let (Ok(aw), Ok(ac)) = (aw.as_float(), ac.as_float()) {
                        state.word_space = aw;
                        state.char_space = ac;
                    }
                    state.next_line();
                    if let Ok(bytes) = text.as_str() {
                        self.show(&[ShowItem::Text(bytes)]);
                    }
                },
                _ => Self::bad_operands(op),
            },
            "TJ" => match operands.first().map(Object::as_array) {
                Some(Ok(array)) => {
                    let items: Vec<ShowItem<'_>> = array
                        .iter()
                        .filter_map(|item| match item {
                            Object::String(bytes, _) => Some(ShowItem::Text(bytes)),
                            other => other.as_float().ok().map(ShowItem::Adjust),
                        })
                        .collect();
                    self.show(&items);
                },
                _ => Self::bad_operands(op),
            },
            "q" => self.stack.save(),
            "Q" => self.stack.restore(),
            _ => {},
        }
    }

    /// Show a string, advancing the text matrix, and record it as one run.
    fn show(&mut self, items: &[ShowItem<'_>]) {
        let fonts = self.fonts;
        let font = self
            .stack
            .current()
            .font_name
            .as_ref()
            .and_then(|name| fonts.get(name))
            .unwrap_or(&self.fallback);
        let state = self.stack.current_mut();

        let start = state.rendering_matrix().transform_point(0.0, 0.0);
        let height = state.effective_font_size();
        let scale = state.horizontal_scaling / 100.0;
        let mut text = String::new();

        for item in items {
            match item {
                ShowItem::Text(bytes) => {
                    for code in font.codes(bytes) {
                        text.push_str(&font.decode_code(code));
                        let glyph = font.glyph_width(code) / 1000.0 * state.font_size;
                        let word = if !font.two_byte && code == 32 {
                            state.word_space
                        } else {
                            0.0
                        };
                        state.advance((glyph + state.char_space + word) * scale);
                    }
                },
                ShowItem::Adjust(amount) => {
                    if *amount < SPACE_ADJUSTMENT_THRESHOLD && !text.is_empty() && !text.ends_with(' ') {
                        text.push(' ');
                    }
                    state.advance(-amount / 1000.0 * state.font_size * scale);
                },
            }
        }

        if text.trim().is_empty() {
            return;
        }

        let end = state.rendering_matrix().transform_point(0.0, 0.0);
        let width = ((end.x - start.x).powi(2) + (end.y - start.y).powi(2)).sqrt();
        log::trace!("Run {:?} at ({:.1}, {:.1}) w={:.1} h={:.1}", text, start.x, start.y, width, height);

        self.runs.push(RawTextRun {
            text,
            x: start.x,
            y: start.y,
            width,
            height,
        });
    }

    fn bad_operands(op: &Operation) {
        log::warn!("Skipping '{}' with unexpected operands {:?}", op.operator, op.operands);
    }
}

/// Decoded bytes of one content stream.
///
/// Unfiltered streams are used as stored. A declared filter that fails to
/// decode is an error.
fn decode_stream(stream: &Stream) -> std::result::Result<Vec<u8>, String> {
    if stream.dict.get(b"Filter").is_err() {
        return Ok(stream.content.clone());
    }
    let filters = stream
        .filters()
        .map_err(|e| format!("content stream filter: {}", e))?;

    if stream.dict.get(b"DecodeParms").is_err() && filters.iter().all(|f| f == "FlateDecode") {
        let mut data = stream.content.clone();
        for _ in &filters {
            data = inflate(&data)?;
        }
        return Ok(data);
    }
    stream
        .decompressed_content()
        .map_err(|e| format!("content stream filter {:?}: {}", filters, e))
}

fn inflate(input: &[u8]) -> std::result::Result<Vec<u8>, String> {
    let mut output = Vec::with_capacity(input.len() * 2);
    if !input.is_empty() {
        ZlibDecoder::new(input)
            .read_to_end(&mut output)
            .map_err(|e| format!("FlateDecode: {}", e))?;
    }
    Ok(output)
}

fn numbers(operands: &[Object]) -> Vec<f32> {
    operands.iter().filter_map(|o| o.as_float().ok()).collect()
}
