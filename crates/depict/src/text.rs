//! # Text Layout
//!
//! Line breaking for canvas text. Everything here is pure: the only input
//! besides the string is a [`WidthCalculator`], so the same code serves a real
//! canvas `measureText` and a fixed-width metric in tests.
//!
//! Offsets are byte offsets into the string and always sit on `char`
//! boundaries.

/// Measures the width of `text[start..end]` (`end` defaults to the end of the
/// string).
pub trait WidthCalculator {
    fn width(&mut self, text: &str, start: usize, end: Option<usize>) -> f32;
}

impl<F> WidthCalculator for F
where
    F: FnMut(&str, usize, Option<usize>) -> f32,
{
    fn width(&mut self, text: &str, start: usize, end: Option<usize>) -> f32 {
        self(text, start, end)
    }
}

/// Moves `start` forward to the next char boundary, clamped to the end.
fn snap_to_char(text: &str, start: usize) -> usize {
    (start..text.len())
        .find(|&i| text.is_char_boundary(i))
        .unwrap_or(text.len())
}

/// Byte offsets of every char boundary in `text[start..]`, both ends included.
fn boundaries(text: &str, start: usize) -> Vec<usize> {
    let mut out: Vec<usize> = text[start..].char_indices().map(|(i, _)| start + i).collect();
    out.push(text.len());
    out
}

/// Finds where the line starting at `start` has to end.
///
/// Returns `text.len()` when the remainder fits. Otherwise binary searches the
/// longest prefix that fits; a line always takes at least one char so callers
/// make progress even when a single glyph is wider than `width`.
fn next_ending(text: &str, width: f32, start: usize, measure: &mut dyn WidthCalculator) -> usize {
    if start >= text.len() || measure.width(text, start, None) <= width {
        return text.len();
    }

    let bounds = boundaries(text, start);
    // bounds[low] fits, bounds[high] does not.
    let mut low = 0;
    let mut high = bounds.len() - 1;
    while high - low > 1 {
        let mid = low + (high - low) / 2;
        if measure.width(text, start, Some(bounds[mid])) > width {
            high = mid;
        } else {
            low = mid;
        }
    }
    bounds[low.max(1)]
}

/// Like [`next_ending`], snapped back to the last space of the line.
fn next_words_ending(
    text: &str,
    width: f32,
    start: usize,
    measure: &mut dyn WidthCalculator,
) -> usize {
    let border = next_ending(text, width, start, measure);
    if border == text.len() {
        return border;
    }
    text[start..border]
        .char_indices()
        .rev()
        .map(|(i, c)| (start + i, c))
        .find(|&(i, c)| i > start && c == ' ')
        .map_or(border, |(i, _)| i)
}

fn ending(
    text: &str,
    width: f32,
    start: usize,
    measure: &mut dyn WidthCalculator,
    word_based: bool,
) -> usize {
    if word_based {
        next_words_ending(text, width, start, measure)
    } else {
        next_ending(text, width, start, measure)
    }
}

fn skip_spaces(text: &str, from: usize) -> usize {
    text[from..]
        .find(|c: char| c != ' ')
        .map_or(text.len(), |i| from + i)
}

/// Cuts `text[start..]` to the longest prefix that fits in `width`.
///
/// A remainder that already fits is returned untouched, even when `ellipsis`
/// is set. Otherwise the cut line gets `...` appended if requested.
///
/// `start` is a byte offset; one that falls inside a char is moved forward
/// to the next char.
pub fn cut_last_line(
    text: &str,
    width: f32,
    start: usize,
    measure: &mut dyn WidthCalculator,
    word_based: bool,
    ellipsis: bool,
) -> String {
    let start = snap_to_char(text, start);
    if start >= text.len() || measure.width(text, start, None) <= width {
        return text[start..].to_string();
    }

    let idx = ending(text, width, start, measure, word_based);
    let mut line = text[start..idx].to_string();
    if ellipsis {
        line.push_str("...");
    }
    line
}

/// Wraps `text` into at most `target_lines` lines of `width`.
///
/// Lines after the first start at the next non-space char and every line is
/// trimmed. Only the last line is produced by [`cut_last_line`], so it alone
/// may carry the ellipsis. Returns early once the text is used up.
pub fn separate_text_into_lines(
    text: &str,
    width: f32,
    measure: &mut dyn WidthCalculator,
    target_lines: usize,
    word_based: bool,
    ellipsis: bool,
) -> Vec<String> {
    let mut lines = Vec::new();
    if target_lines == 0 {
        return lines;
    }

    let mut cursor = 0;
    for i in 0..target_lines - 1 {
        if i > 0 {
            cursor = skip_spaces(text, cursor);
        }
        let idx = ending(text, width, cursor, measure, word_based);
        lines.push(text[cursor..idx].trim().to_string());
        if idx >= text.len() {
            return lines;
        }
        cursor = idx;
    }

    cursor = skip_spaces(text, cursor);
    let last = cut_last_line(text, width, cursor, measure, word_based, ellipsis);
    lines.push(last.trim().to_string());
    lines
}

/// Number of lines of `line_height` that fit in `height`.
pub fn estimate_lines(height: f32, line_height: f32) -> usize {
    if line_height <= 0.0 || height < line_height {
        return 0;
    }
    (height / line_height).floor() as usize
}
