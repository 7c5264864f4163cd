//! Text Sanitizer: normalizes raw CV text before segmentation.
//!
//! Input comes from three places: pasted text, the PDF extractor, and LLM
//! responses. The sanitizer is the defensive backstop for the prompt contract:
//! it strips introductory commentary, canonicalizes list markers to `•` and
//! caps blank-line runs at one blank line.
//!
//! `sanitize` is total and idempotent: `sanitize(&sanitize(x)) == sanitize(x)`.

use std::sync::LazyLock;

use regex::Regex;

/// The one bullet glyph the rest of the pipeline understands.
pub const CANONICAL_BULLET: char = '•';

// ────────────────────────────────────────────────────────────────────────────
// Patterns
// ────────────────────────────────────────────────────────────────────────────

/// Introductory phrases LLMs put in front of the CV. Anchored at the start.
static PREAMBLE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)^here\s+is\s+(?:my|the|an?)\s+(?:optimized\s+)?version\s+of\s+the\s+cv\b\s*:?\s*",
        r"(?i)^here\s+is\s+(?:my|the|an?)\s+cv\b\s*:?\s*",
        r"(?i)^here\s+is\s+the\s+online\s+version\b\s*:?\s*",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid preamble regex"))
    .collect()
});

/// A list-like line: optional indentation, a marker, then the item text.
/// Glyph markers may touch the text; `-`, `–`, `*` and ordinals need a space.
static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[•·●▪◦‣]\s*|[-–*]\s+|\d{1,2}[.)]\s+)(?P<rest>\S.*)$")
        .expect("valid list marker regex")
});

static BLANK_LINE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid newline run regex"));

/// UTF-8 punctuation that was decoded as Windows-1252 somewhere upstream.
const MOJIBAKE: &[(&str, &str)] = &[
    ("â€¢", "•"),
    ("â€“", "–"),
    ("â€”", "—"),
    ("â€™", "’"),
    ("â€˜", "‘"),
    ("â€œ", "“"),
];

// ────────────────────────────────────────────────────────────────────────────
// Public API
// ────────────────────────────────────────────────────────────────────────────

/// Sanitizes raw CV text into CleanText.
///
/// Empty or whitespace-only input yields an empty string.
pub fn sanitize(raw: &str) -> String {
    let normalized = normalize_characters(raw);
    let body = strip_preamble(&normalized);

    let lines: Vec<String> = body.lines().map(normalize_line).collect();
    let joined = lines.join("\n");

    BLANK_LINE_RUN
        .replace_all(&joined, "\n\n")
        .trim()
        .to_string()
}

/// Removes leading LLM commentary such as "Here is the optimized version of the CV:".
///
/// Stripping repeats while a pattern still matches at the start, so stacked
/// preambles are removed in one pass. Text after the first line of content is
/// never touched.
pub fn strip_preamble(text: &str) -> &str {
    let mut rest = text.trim_start();
    'outer: loop {
        for pattern in PREAMBLE_PATTERNS.iter() {
            if let Some(m) = pattern.find(rest) {
                if m.end() > 0 {
                    rest = rest[m.end()..].trim_start();
                    continue 'outer;
                }
            }
        }
        return rest;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn normalize_characters(raw: &str) -> String {
    let mut text = raw.replace("\r\n", "\n").replace('\r', "\n");
    text = text.replace('\u{00A0}', " ");
    // A repaired glyph can complete another sequence, so repeat until stable.
    // Every replacement shortens the text.
    loop {
        let before = text.len();
        for (broken, fixed) in MOJIBAKE {
            if text.contains(broken) {
                text = text.replace(broken, fixed);
            }
        }
        if text.len() == before {
            return text;
        }
    }
}

/// Trims trailing whitespace and rewrites list markers to the canonical bullet.
fn normalize_line(line: &str) -> String {
    let line = line.trim_end();
    match LIST_MARKER.captures(line) {
        Some(caps) => format!("{CANONICAL_BULLET} {}", &caps["rest"]),
        None => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_returns_empty() {
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn test_whitespace_only_returns_empty() {
        assert_eq!(sanitize("   \n \t "), "");
        assert_eq!(sanitize("   \n   \t   "), "");
    }

    #[test]
    fn test_four_newlines_collapse_to_two() {
        assert_eq!(sanitize("test\n\n\n\ntest"), "test\n\ntest");
    }

    #[test]
    fn test_two_newlines_are_kept() {
        assert_eq!(sanitize("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_whitespace_only_lines_count_as_blank() {
        assert_eq!(sanitize("a\n   \n\t\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_mixed_bullets_become_canonical() {
        let out = sanitize("• Point 1\n- Point 2\n* Point 3");
        assert_eq!(out, "• Point 1\n• Point 2\n• Point 3");
        assert_eq!(out.matches('•').count(), 3);
    }

    #[test]
    fn test_middle_dot_and_ordinals_become_bullets() {
        let out = sanitize("· First\n  1. Second\n2) Third\n·Fourth");
        assert_eq!(out, "• First\n• Second\n• Third\n• Fourth");
    }

    #[test]
    fn test_hyphen_without_space_is_not_a_bullet() {
        assert_eq!(sanitize("-5% churn"), "-5% churn");
        assert_eq!(sanitize("2012 - Present"), "2012 - Present");
    }

    #[test]
    fn test_preamble_removed_case_insensitive() {
        assert_eq!(
            sanitize("Here is the optimized version of the CV:\n\nNOAM NAUMOVSKY"),
            "NOAM NAUMOVSKY"
        );
        assert_eq!(sanitize("here is my CV: JANE DOE"), "JANE DOE");
        assert_eq!(sanitize("Here is an version of the CV\nJANE"), "JANE");
        assert_eq!(sanitize("Here is the online version:\nJANE"), "JANE");
    }

    #[test]
    fn test_preamble_only_stripped_at_start() {
        let text = "JANE DOE\nHere is the CV: not a preamble here";
        assert_eq!(sanitize(text), text);
    }

    #[test]
    fn test_stacked_preambles_are_all_removed() {
        assert_eq!(
            sanitize("Here is the CV:\nHere is the online version:\nJANE"),
            "JANE"
        );
    }

    #[test]
    fn test_mojibake_bullet_repaired() {
        assert_eq!(sanitize("â€¢ Motion Graphics"), "• Motion Graphics");
    }

    #[test]
    fn test_nested_mojibake_repaired_in_one_call() {
        // Repairing the quote completes an en-dash sequence.
        assert_eq!(sanitize("\u{e2}\u{20ac}\u{e2}\u{20ac}\u{153}"), "–");
    }

    #[test]
    fn test_crlf_normalized() {
        assert_eq!(sanitize("A\r\n\r\n\r\n\r\nB\rC"), "A\n\nB\nC");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let corpus = [
            "",
            "   ",
            "test\n\n\n\ntest",
            "• Point 1\n- Point 2\n* Point 3",
            "Here is the CV:\n\n\nJANE\n  - a  \n\n\n\nSKILLS:\n1. Rust\n·Go",
            "Here is the CV: Here is the CV: x",
            "  \u{00A0}indented\r\n\r\n\r\nâ€¢ item\t\n",
            "•",
            "••double",
            "\u{e2}\u{20ac}\u{e2}\u{20ac}\u{153}",
            "2012 â€â€œ Present",
            "NOAM NAUMOVSKY\nTel Aviv, Israel | x@y.com\n\nPROFESSIONAL SUMMARY\nSenior Motion Designer...",
        ];
        for input in corpus {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_clean_text_never_has_three_newlines() {
        let out = sanitize("a\n\n\n\n\n\nb\n \n \n \nc");
        assert!(!out.contains("\n\n\n"));
    }
}
