// CV text pipeline: sanitize → segment → classify.
// Shared by the preview renderer, the PDF renderer and the optimize flow.
// Every function here is pure and total; nothing in this module returns an error.

pub mod classifier;
pub mod sanitizer;
pub mod segmenter;

use serde::{Deserialize, Serialize};

pub use classifier::{ClassifiedLine, ClassifiedSection, LocationMatcher};
pub use sanitizer::sanitize;
pub use segmenter::segment;

/// The fully parsed CV consumed by both renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedCv {
    pub clean_text: String,
    pub sections: Vec<ClassifiedSection>,
}

impl ParsedCv {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Runs raw text through the whole pipeline.
pub fn parse_cv(raw: &str, matcher: &LocationMatcher) -> ParsedCv {
    let clean_text = sanitize(raw);
    let sections = segment(&clean_text);
    let sections = classifier::classify_sections(&sections, matcher);
    ParsedCv {
        clean_text,
        sections,
    }
}
