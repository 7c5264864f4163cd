//! Line reconstruction from positioned text fragments.
//!
//! Fragments arrive in content-stream order, which is not necessarily reading
//! order. A vertical jump larger than the threshold starts a new line; smaller
//! jitter (sub/superscripts, baseline drift) stays on the current line.

use serde::{Deserialize, Serialize};

/// Default vertical distance, in PDF user-space units, that starts a new line.
/// Tuned for typical CV font sizes; multi-column layouts or very small/large
/// fonts may need a different value.
pub const DEFAULT_LINE_BREAK_THRESHOLD: f32 = 5.0;

/// A positioned run of text as emitted by content-stream parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedTextFragment {
    pub text: String,
    pub x: f32,
    pub y: f32,
}

impl PositionedTextFragment {
    pub fn new(text: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
        }
    }
}

/// Reconstructs one page and appends it to `out`.
///
/// Each reconstructed line ends with `\n`; the page ends with one extra `\n`.
pub fn reconstruct_page(fragments: &[PositionedTextFragment], threshold: f32, out: &mut String) {
    let mut last_y: Option<f32> = None;
    let mut line_text = String::new();

    for fragment in fragments {
        if let Some(prev) = last_y {
            if (fragment.y - prev).abs() > threshold {
                out.push_str(&line_text);
                out.push('\n');
                line_text.clear();
            }
        }

        if !line_text.is_empty() && !line_text.ends_with(char::is_whitespace) {
            line_text.push(' ');
        }
        line_text.push_str(&fragment.text);
        last_y = Some(fragment.y);
    }

    if !line_text.is_empty() {
        out.push_str(&line_text);
        out.push('\n');
    }
    out.push('\n');
}

/// Reconstructs every page in order and concatenates the result.
pub fn reconstruct_pages(pages: &[Vec<PositionedTextFragment>], threshold: f32) -> String {
    let mut out = String::new();
    for page in pages {
        reconstruct_page(page, threshold, &mut out);
    }
    out
}
