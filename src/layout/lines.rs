//! Grouping of text positions into visual lines.
//!
//! Runs whose top edges lie within a small vertical tolerance of a line's
//! anchor belong to that line. The anchor is the top edge of the first
//! (highest) run of the line, so every member sits in
//! `[anchor, anchor + tolerance)` and any two members are less than the
//! tolerance apart.

use crate::extractors::TextPosition;
use crate::utils::safe_float_cmp;
use std::collections::BTreeMap;

/// Default vertical tolerance for line membership, in page units.
pub const LINE_EPSILON: f32 = 2.0;

/// Runs of one page that share a visual row, ordered left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// 1-indexed page number
    pub page: usize,
    /// Top edge the line was started from
    pub anchor_y: f32,
    /// Members in ascending x order
    pub positions: Vec<TextPosition>,
}

impl Line {
    /// Line text: the member texts joined with single spaces.
    ///
    /// Match offsets and the highlight builder both rely on this exact join.
    pub fn text(&self) -> String {
        self.positions
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the line has no members.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Group positions into lines, per page.
///
/// Positions are stably sorted by top edge; a new line starts whenever a
/// position is `tolerance` or more below the current line's anchor. Each
/// line is then stably sorted by x, so runs with equal coordinates keep
/// their emission order. Pages with no positions have no entry.
///
/// # Examples
///
/// ```
/// use pdf_spotlight::extractors::TextPosition;
/// use pdf_spotlight::layout::{group_by_line, LINE_EPSILON};
///
/// let positions = vec![
///     TextPosition::new("Gasoline", 1, 80.0, 100.5, 48.0, 12.0),
///     TextPosition::new("UN1203", 1, 20.0, 100.0, 36.0, 12.0),
///     TextPosition::new("Class 3", 1, 20.0, 120.0, 42.0, 12.0),
/// ];
/// let lines = group_by_line(&positions, LINE_EPSILON);
/// assert_eq!(lines[&1].len(), 2);
/// assert_eq!(lines[&1][0].text(), "UN1203 Gasoline");
/// ```
pub fn group_by_line(positions: &[TextPosition], tolerance: f32) -> BTreeMap<usize, Vec<Line>> {
    let mut by_page: BTreeMap<usize, Vec<TextPosition>> = BTreeMap::new();
    for pos in positions {
        by_page.entry(pos.page).or_default().push(pos.clone());
    }

    let grouped = group_pages(by_page.into_iter().collect(), tolerance);
    log::debug!(
        "Grouped {} positions into {} lines on {} pages",
        positions.len(),
        grouped.iter().map(|(_, lines)| lines.len()).sum::<usize>(),
        grouped.len()
    );
    grouped.into_iter().collect()
}

#[cfg(feature = "parallel")]
fn group_pages(pages: Vec<(usize, Vec<TextPosition>)>, tolerance: f32) -> Vec<(usize, Vec<Line>)> {
    use rayon::prelude::*;

    pages
        .into_par_iter()
        .map(|(page, positions)| (page, group_page(page, positions, tolerance)))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn group_pages(pages: Vec<(usize, Vec<TextPosition>)>, tolerance: f32) -> Vec<(usize, Vec<Line>)> {
    pages
        .into_iter()
        .map(|(page, positions)| (page, group_page(page, positions, tolerance)))
        .collect()
}

/// Group the positions of a single page.
fn group_page(page: usize, mut positions: Vec<TextPosition>, tolerance: f32) -> Vec<Line> {
    positions.sort_by(|a, b| safe_float_cmp(a.y, b.y));

    let mut lines: Vec<Line> = Vec::new();
    for pos in positions {
        match lines.last_mut() {
            Some(line) if (pos.y - line.anchor_y).abs() < tolerance => line.positions.push(pos),
            _ => lines.push(Line {
                page,
                anchor_y: pos.y,
                positions: vec![pos],
            }),
        }
    }

    for line in &mut lines {
        line.positions.sort_by(|a, b| safe_float_cmp(a.x, b.x));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(text: &str, page: usize, x: f32, y: f32) -> TextPosition {
        TextPosition::new(text, page, x, y, 10.0 * text.len() as f32, 10.0)
    }

    #[test]
    fn test_groups_by_vertical_proximity() {
        let positions = vec![
            pos("Nitrate", 1, 100.0, 50.0),
            pos("Ammonium", 1, 10.0, 51.5),
            pos("UN1942", 1, 10.0, 70.0),
        ];
        let lines = group_by_line(&positions, LINE_EPSILON);
        let page = &lines[&1];
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].text(), "Ammonium Nitrate");
        assert_eq!(page[0].anchor_y, 50.0);
        assert_eq!(page[1].text(), "UN1942");
    }

    #[test]
    fn test_difference_of_exactly_epsilon_starts_new_line() {
        let positions = vec![pos("a", 1, 0.0, 10.0), pos("b", 1, 0.0, 12.0)];
        let lines = group_by_line(&positions, LINE_EPSILON);
        assert_eq!(lines[&1].len(), 2);
    }

    #[test]
    fn test_anchor_does_not_drift() {
        // each step is under epsilon, but the third run is 3 units from the anchor
        let positions = vec![
            pos("a", 1, 0.0, 10.0),
            pos("b", 1, 10.0, 11.5),
            pos("c", 1, 20.0, 13.0),
        ];
        let lines = group_by_line(&positions, LINE_EPSILON);
        let page = &lines[&1];
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].text(), "a b");
        assert_eq!(page[1].text(), "c");
    }

    #[test]
    fn test_pages_are_separate() {
        let positions = vec![pos("one", 2, 0.0, 10.0), pos("two", 1, 0.0, 10.0)];
        let lines = group_by_line(&positions, LINE_EPSILON);
        assert_eq!(lines.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(lines[&1][0].page, 1);
        assert_eq!(lines[&2][0].text(), "one");
    }

    #[test]
    fn test_ties_keep_emission_order() {
        let positions = vec![pos("first", 1, 5.0, 10.0), pos("second", 1, 5.0, 10.0)];
        let lines = group_by_line(&positions, LINE_EPSILON);
        assert_eq!(lines[&1][0].text(), "first second");
    }

    #[test]
    fn test_empty_input() {
        assert!(group_by_line(&[], LINE_EPSILON).is_empty());
    }
}
