//! Greedy word wrap against a font metric table.
//!
//! Same greedy algorithm the line-fill estimates use: words are appended to
//! the current line until the next one would overflow `max_width_pt`. A word
//! that is wider than a whole line on its own is broken between characters.

use crate::layout::font_metrics::FontMetricTable;

/// Wraps `text` into lines no wider than `max_width_pt` at `size_pt`.
///
/// Whitespace runs collapse to single spaces. Empty or whitespace-only text
/// returns no lines.
pub fn wrap_text(
    text: &str,
    metrics: &FontMetricTable,
    size_pt: f32,
    max_width_pt: f32,
) -> Vec<String> {
    let space_w = metrics.space_width() * size_pt;
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_w = 0.0_f32;

    for word in text.split_whitespace() {
        for piece in split_overlong(word, metrics, size_pt, max_width_pt) {
            let piece_w = metrics.measure_pt(&piece, size_pt);

            if current.is_empty() {
                current = piece;
                current_w = piece_w;
            } else if current_w + space_w + piece_w > max_width_pt {
                lines.push(std::mem::take(&mut current));
                current = piece;
                current_w = piece_w;
            } else {
                current.push(' ');
                current.push_str(&piece);
                current_w += space_w + piece_w;
            }
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Breaks a single word into chunks that each fit on a line.
fn split_overlong(
    word: &str,
    metrics: &FontMetricTable,
    size_pt: f32,
    max_width_pt: f32,
) -> Vec<String> {
    if metrics.measure_pt(word, size_pt) <= max_width_pt {
        return vec![word.to_string()];
    }

    let mut chunks = Vec::new();
    let mut chunk = String::new();
    let mut chunk_w = 0.0_f32;
    for c in word.chars() {
        let w = metrics.char_width(c) * size_pt;
        if !chunk.is_empty() && chunk_w + w > max_width_pt {
            chunks.push(std::mem::take(&mut chunk));
            chunk_w = 0.0;
        }
        chunk.push(c);
        chunk_w += w;
    }
    if !chunk.is_empty() {
        chunks.push(chunk);
    }
    chunks
}
