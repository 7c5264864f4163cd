//! Line Classifier: tags each line of a section for the renderers.
//!
//! The header section (index 0) becomes a name line plus one joined contact
//! line. Every other section is classified line by line, first rule wins:
//! heading, bullet, position heading (contains a location marker), plain text.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::text::sanitizer::CANONICAL_BULLET;
use crate::text::segmenter::Section;

/// Separator used when joining the header's contact lines.
pub const CONTACT_SEPARATOR: &str = " | ";

/// Glyphs trimmed from the start of the text that follows a location marker.
const LOCATION_SEPARATORS: &[char] = &['•', '|', ','];

/// A classified line. Serialized with a `kind` tag for API clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ClassifiedLine {
    NameLine { text: String },
    ContactLine { text: String },
    SectionHeading { text: String },
    /// A job title line. `title` precedes the marker, `location` follows it.
    PositionHeading {
        title: String,
        marker: String,
        location: String,
    },
    BulletItem { text: String },
    PlainText { text: String },
}

impl ClassifiedLine {
    /// Location as shown to the reader: `"<marker>, <location>"` or just the marker.
    pub fn display_location(&self) -> Option<String> {
        match self {
            ClassifiedLine::PositionHeading {
                marker, location, ..
            } => Some(if location.is_empty() {
                marker.clone()
            } else {
                format!("{marker}, {location}")
            }),
            _ => None,
        }
    }
}

/// A section after classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedSection {
    pub index: usize,
    pub lines: Vec<ClassifiedLine>,
}

impl ClassifiedSection {
    pub fn is_header(&self) -> bool {
        self.index == 0
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Location matching
// ────────────────────────────────────────────────────────────────────────────

/// Finds the location marker that separates a job title from its location.
///
/// Literal markers and an optional pattern are both searched; the earliest
/// match wins, and on a tie the longer match.
#[derive(Debug, Clone)]
pub struct LocationMatcher {
    markers: Vec<String>,
    pattern: Option<Regex>,
}

impl Default for LocationMatcher {
    fn default() -> Self {
        Self::new(vec!["Tel Aviv, Israel".to_string()], None)
    }
}

impl LocationMatcher {
    pub fn new(markers: Vec<String>, pattern: Option<Regex>) -> Self {
        let markers = markers
            .into_iter()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();
        Self { markers, pattern }
    }

    /// Returns the byte range of the first marker occurrence in `line`.
    pub fn find(&self, line: &str) -> Option<(usize, usize)> {
        let literal = self
            .markers
            .iter()
            .filter_map(|m| line.find(m.as_str()).map(|start| (start, start + m.len())));
        let pattern = self
            .pattern
            .iter()
            .filter_map(|re| re.find(line))
            .filter(|m| !m.is_empty())
            .map(|m| (m.start(), m.end()));

        literal
            .chain(pattern)
            .min_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Classification
// ────────────────────────────────────────────────────────────────────────────

/// Classifies every section of a document.
pub fn classify_sections(sections: &[Section], matcher: &LocationMatcher) -> Vec<ClassifiedSection> {
    sections
        .iter()
        .map(|s| classify_section(s, matcher))
        .collect()
}

/// Classifies one section. Lines that are empty after trimming are skipped.
pub fn classify_section(section: &Section, matcher: &LocationMatcher) -> ClassifiedSection {
    let lines: Vec<&str> = section
        .raw_lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let classified = if section.is_header() {
        classify_header(&lines)
    } else {
        lines
            .iter()
            .enumerate()
            .map(|(i, line)| classify_line(line, i == 0, matcher))
            .collect()
    };

    ClassifiedSection {
        index: section.index,
        lines: classified,
    }
}

fn classify_header(lines: &[&str]) -> Vec<ClassifiedLine> {
    let Some((name, contact)) = lines.split_first() else {
        return Vec::new();
    };

    let mut out = vec![ClassifiedLine::NameLine {
        text: name.to_string(),
    }];
    if !contact.is_empty() {
        out.push(ClassifiedLine::ContactLine {
            text: contact.join(CONTACT_SEPARATOR),
        });
    }
    out
}

/// Classifies a single trimmed, non-empty line of a non-header section.
pub fn classify_line(line: &str, is_first: bool, matcher: &LocationMatcher) -> ClassifiedLine {
    if is_first {
        return ClassifiedLine::SectionHeading {
            text: line.to_string(),
        };
    }

    if let Some(rest) = line.strip_prefix(CANONICAL_BULLET) {
        return ClassifiedLine::BulletItem {
            text: rest.trim_start().to_string(),
        };
    }

    if let Some((start, end)) = matcher.find(line) {
        return ClassifiedLine::PositionHeading {
            title: line[..start].trim().to_string(),
            marker: line[start..end].to_string(),
            location: trim_location_separators(&line[end..]).trim_end().to_string(),
        };
    }

    ClassifiedLine::PlainText {
        text: line.to_string(),
    }
}

/// Drops separator glyphs between a marker and the rest of the line. Dashes
/// count only when a space follows, so "-5 yrs" keeps its sign.
fn trim_location_separators(rest: &str) -> &str {
    let mut rest = rest.trim_start();
    loop {
        let mut chars = rest.chars();
        match chars.next() {
            Some(c) if LOCATION_SEPARATORS.contains(&c) => rest = chars.as_str().trim_start(),
            Some('-' | '–')
                if chars.as_str().is_empty() || chars.as_str().starts_with(char::is_whitespace) =>
            {
                rest = chars.as_str().trim_start()
            }
            _ => return rest,
        }
    }
}
