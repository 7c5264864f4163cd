//! Section Segmenter: splits CleanText into ordered sections.
//!
//! A section boundary is a blank-line run immediately followed by an all-caps
//! heading line. The separator is consumed; the heading line is kept as the
//! first line of the new section. `regex` has no lookahead, so the boundary is
//! found by scanning lines and testing the line after each blank run.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Two or more uppercase letters, spaces or `&`, then end of line or a colon.
static HEADING_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\p{Lu}[\p{Lu} &]+(?::.*)?$").expect("valid heading regex"));

/// A contiguous block of the CV. Section 0 is always the name/contact header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// 0-based position in the document, after empty sections are dropped.
    pub index: usize,
    /// Trimmed, non-empty lines in document order.
    pub raw_lines: Vec<String>,
}

impl Section {
    pub fn is_header(&self) -> bool {
        self.index == 0
    }
}

/// Returns true if `line` looks like an all-caps section heading.
pub fn is_heading_line(line: &str) -> bool {
    HEADING_LINE.is_match(line.trim())
}

/// Splits clean text into sections. Deterministic and order-preserving.
///
/// Non-empty input always yields at least one section.
pub fn segment(clean: &str) -> Vec<Section> {
    let mut blocks: Vec<Vec<String>> = vec![Vec::new()];
    let mut after_blank_run = false;

    for line in clean.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            after_blank_run = true;
            continue;
        }

        let starts_section = after_blank_run && is_heading_line(trimmed);
        after_blank_run = false;

        if starts_section {
            blocks.push(Vec::new());
        }
        if let Some(current) = blocks.last_mut() {
            current.push(trimmed.to_string());
        }
    }

    blocks
        .into_iter()
        .filter(|lines| !lines.is_empty())
        .enumerate()
        .map(|(index, raw_lines)| Section { index, raw_lines })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC_CV: &str = "NOAM NAUMOVSKY\n\
        Tel Aviv, Israel | +972 52 6784960 | noamnau@gmail.com\n\
        \n\
        PROFESSIONAL SUMMARY\n\
        Senior Motion Designer with 10+ years of experience in post-production and gaming.\n\
        \n\
        TECHNICAL SKILLS\n\
        Motion Graphics: Adobe After Effects\n\
        Video Editing: Adobe Premiere Pro, DaVinci Resolve\n\
        3D Modeling: Blender";

    #[test]
    fn test_segment_empty_returns_no_sections() {
        assert!(segment("").is_empty());
        assert!(segment("\n\n  \n").is_empty());
    }

    #[test]
    fn test_segment_basic_cv_three_sections_in_order() {
        let sections = segment(BASIC_CV);
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].raw_lines[0], "NOAM NAUMOVSKY");
        assert_eq!(sections[1].raw_lines[0], "PROFESSIONAL SUMMARY");
        assert_eq!(sections[2].raw_lines[0], "TECHNICAL SKILLS");
        assert_eq!(sections[2].raw_lines.len(), 4);
        for (i, s) in sections.iter().enumerate() {
            assert_eq!(s.index, i);
        }
    }

    #[test]
    fn test_heading_retained_as_first_line() {
        let sections = segment("JANE\n\nEDUCATION\nBSc");
        assert_eq!(sections[1].raw_lines, vec!["EDUCATION", "BSc"]);
    }

    #[test]
    fn test_heading_without_blank_line_does_not_split() {
        let sections = segment("JANE\nEDUCATION\nBSc");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].raw_lines.len(), 3);
    }

    #[test]
    fn test_blank_line_before_mixed_case_does_not_split() {
        let sections = segment("JANE\n\nSKILLS\nRust\n\nSenior engineer notes");
        assert_eq!(sections.len(), 2);
        assert_eq!(
            sections[1].raw_lines,
            vec!["SKILLS", "Rust", "Senior engineer notes"]
        );
    }

    #[test]
    fn test_heading_with_colon_and_ampersand() {
        assert!(is_heading_line("TECHNOLOGIES & CERTIFICATIONS"));
        assert!(is_heading_line("SKILLS:"));
        assert!(is_heading_line("SKILLS: After Effects, Premiere"));
        assert!(is_heading_line("  EXPERIENCE  "));
        assert!(!is_heading_line("Experience"));
        assert!(!is_heading_line("PROFESSIONAL Summary"));
        assert!(!is_heading_line("3D MODELING"));
        assert!(!is_heading_line("• SKILLS"));
    }

    #[test]
    fn test_single_letter_line_is_not_a_heading() {
        assert!(!is_heading_line("A"));
        assert!(is_heading_line("IT"));
        let sections = segment("JANE DOE\n\nA\nGrade");
        assert_eq!(sections.len(), 1);
    }

    #[test]
    fn test_first_section_need_not_be_a_heading() {
        let sections = segment("jane doe\njane@x.com\n\nEXPERIENCE\nWork");
        assert_eq!(sections.len(), 2);
        assert!(sections[0].is_header());
        assert_eq!(sections[0].raw_lines[0], "jane doe");
    }

    #[test]
    fn test_leading_blank_lines_do_not_create_empty_section() {
        let sections = segment("\n\nEXPERIENCE\nWork");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].index, 0);
        assert_eq!(sections[0].raw_lines[0], "EXPERIENCE");
    }

    #[test]
    fn test_segment_is_deterministic() {
        assert_eq!(segment(BASIC_CV), segment(BASIC_CV));
    }
}
