//! Conversion of matches into highlight rectangles.

use crate::geometry::Rect;
use crate::search::keyword_match::KeywordMatch;
use serde::{Deserialize, Serialize};

/// Display color of a highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightColor {
    /// Reserved for callers (e.g. confirmed items); never produced by the search
    Green,
    /// Confidence above 0.8, including every exact and pattern match
    Yellow,
    /// Lower-confidence fuzzy matches
    Orange,
}

impl HighlightColor {
    /// Color for a match confidence.
    pub fn for_confidence(confidence: f32) -> Self {
        if confidence > 0.8 {
            HighlightColor::Yellow
        } else {
            HighlightColor::Orange
        }
    }
}

/// A rectangle to draw over the rendered page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightArea {
    /// 1-indexed page number
    pub page: usize,
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
    /// Display color
    pub color: HighlightColor,
    /// Keyword (or matched UN-number text) the highlight belongs to
    pub keyword: String,
    /// Identifier, unique within one result list
    pub id: String,
}

impl HighlightArea {
    /// Bounding box of the highlight.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Map a match back onto the runs of its line.
///
/// The line text is the run texts joined by single spaces, so the running
/// character index advances by `len + 1` per run. Within a run every
/// character is given the same width (`run.width / len`). The vertical
/// extent comes from the run holding the first character.
///
/// Returns `None` when the range starts or ends outside every run (for
/// example inside a joining space). The returned area has an empty `id`;
/// ids are assigned once the final result order is known.
pub fn to_highlight_area(m: &KeywordMatch<'_>) -> Option<HighlightArea> {
    let start = m.start_offset;
    let end = start + m.length;
    if m.length == 0 {
        return None;
    }

    let mut current = 0;
    let mut start_run = None;
    for run in &m.line.positions {
        let len = run.char_len();
        let char_width = if len > 0 { run.width / len as f32 } else { 0.0 };

        if start_run.is_none() && current <= start && start < current + len {
            start_run = Some((run, run.x + (start - current) as f32 * char_width));
        }

        if let Some((first, start_x)) = start_run {
            if current < end && end <= current + len {
                let end_x = run.x + (end - current) as f32 * char_width;
                return Some(HighlightArea {
                    page: m.line.page,
                    x: start_x,
                    y: first.y,
                    width: end_x - start_x,
                    height: first.height,
                    color: HighlightColor::for_confidence(m.confidence),
                    keyword: m.keyword.clone(),
                    id: String::new(),
                });
            }
        }

        current += len + 1;
    }

    log::trace!(
        "No runs hold chars {}..{} of line {} (page {})",
        start,
        end,
        m.line_index,
        m.line.page
    );
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::TextPosition;
    use crate::layout::Line;
    use crate::search::keyword_match::MatchKind;

    fn un_line() -> Line {
        Line {
            page: 1,
            anchor_y: 100.0,
            positions: vec![
                TextPosition::new("UN1203", 1, 50.0, 100.0, 60.0, 12.0),
                TextPosition::new("Gasoline", 1, 120.0, 101.0, 80.0, 14.0),
            ],
        }
    }

    fn at<'a>(line: &'a Line, start: usize, length: usize, confidence: f32) -> KeywordMatch<'a> {
        KeywordMatch {
            line,
            line_index: 0,
            start_offset: start,
            length,
            confidence,
            kind: MatchKind::Exact,
            keyword: "kw".to_string(),
        }
    }

    #[test]
    fn test_whole_first_run() {
        let line = un_line();
        let area = to_highlight_area(&at(&line, 0, 6, 1.0)).unwrap();
        assert_eq!(area.page, 1);
        assert_eq!(area.x, 50.0);
        assert_eq!(area.width, 60.0);
        assert_eq!(area.y, 100.0);
        assert_eq!(area.height, 12.0);
        assert_eq!(area.color, HighlightColor::Yellow);
    }

    #[test]
    fn test_inside_second_run() {
        let line = un_line();
        // "soli" in "Gasoline": chars 9..13 of "UN1203 Gasoline"
        let area = to_highlight_area(&at(&line, 9, 4, 0.7)).unwrap();
        assert_eq!(area.x, 140.0);
        assert_eq!(area.width, 40.0);
        assert_eq!(area.y, 101.0);
        assert_eq!(area.color, HighlightColor::Orange);
    }

    #[test]
    fn test_span_across_runs_uses_start_run_height() {
        let line = un_line();
        let area = to_highlight_area(&at(&line, 4, 7, 1.0)).unwrap();
        assert_eq!(area.x, 90.0);
        assert_eq!(area.width, 70.0);
        assert_eq!(area.height, 12.0);
    }

    #[test]
    fn test_unlocatable_ranges() {
        let line = un_line();
        // starts on the joining space
        assert!(to_highlight_area(&at(&line, 6, 3, 1.0)).is_none());
        // runs past the end of the line
        assert!(to_highlight_area(&at(&line, 10, 20, 1.0)).is_none());
        assert!(to_highlight_area(&at(&line, 100, 1, 1.0)).is_none());
        assert!(to_highlight_area(&at(&line, 0, 0, 1.0)).is_none());
    }

    #[test]
    fn test_color_threshold() {
        assert_eq!(HighlightColor::for_confidence(0.81), HighlightColor::Yellow);
        assert_eq!(HighlightColor::for_confidence(0.8), HighlightColor::Orange);
    }

    #[test]
    fn test_color_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&HighlightColor::Yellow).unwrap(), "\"yellow\"");
        let green: HighlightColor = serde_json::from_str("\"green\"").unwrap();
        assert_eq!(green, HighlightColor::Green);
    }
}
