//! Pagination: turns classified sections into positioned draw operations.
//!
//! Coordinates are in points from the top-left of the page; the PDF writer
//! flips them. Before any line is placed the paginator checks whether it
//! still fits above the bottom margin and starts a new page if not. Text wider
//! than the content width is word-wrapped first.

use serde::{Deserialize, Serialize};

use crate::layout::font_metrics::{get_metrics, FontFace, PageConfig, PT_PER_MM};
use crate::layout::wrap::wrap_text;
use crate::text::{ClassifiedLine, ClassifiedSection};

// ────────────────────────────────────────────────────────────────────────────
// Styles
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub face: FontFace,
    pub size_pt: f32,
}

const NAME: TextStyle = TextStyle {
    face: FontFace::HelveticaBold,
    size_pt: 18.0,
};
const CONTACT: TextStyle = TextStyle {
    face: FontFace::Helvetica,
    size_pt: 11.0,
};
const HEADING: TextStyle = TextStyle {
    face: FontFace::HelveticaBold,
    size_pt: 14.0,
};
const POSITION_TITLE: TextStyle = TextStyle {
    face: FontFace::HelveticaBold,
    size_pt: 12.0,
};
const LOCATION: TextStyle = TextStyle {
    face: FontFace::Helvetica,
    size_pt: 11.0,
};
const BODY: TextStyle = TextStyle {
    face: FontFace::Helvetica,
    size_pt: 12.0,
};

/// Hanging indent for bullet text.
const BULLET_INDENT_PT: f32 = 8.0 * PT_PER_MM;
/// Vertical gap after each section.
const SECTION_GAP_PT: f32 = 12.0;
/// Gap between a heading's underline and the first body line.
const RULE_GAP_PT: f32 = 4.0;

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

/// A single drawing instruction. `y` is the baseline, measured from the top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        style: TextStyle,
        text: String,
    },
    /// Horizontal rule from `x1` to `x2`.
    Rule { x1: f32, x2: f32, y: f32 },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlannedPage {
    pub ops: Vec<DrawOp>,
}

// ────────────────────────────────────────────────────────────────────────────
// Paginator
// ────────────────────────────────────────────────────────────────────────────

/// Lays out every section and returns at least one page.
pub fn paginate(sections: &[ClassifiedSection], config: &PageConfig) -> Vec<PlannedPage> {
    let mut paginator = Paginator::new(config);
    for section in sections {
        paginator.section(section);
    }
    paginator.finish()
}

struct Paginator<'a> {
    config: &'a PageConfig,
    pages: Vec<PlannedPage>,
    /// Top of the next line, from the top of the page.
    y: f32,
}

impl<'a> Paginator<'a> {
    fn new(config: &'a PageConfig) -> Self {
        Self {
            config,
            pages: vec![PlannedPage::default()],
            y: config.margin_top_pt,
        }
    }

    fn finish(self) -> Vec<PlannedPage> {
        self.pages
    }

    fn line_height(&self, style: TextStyle) -> f32 {
        style.size_pt * self.config.line_height_factor
    }

    /// Starts a new page unless `height` more points fit on this one.
    fn ensure_space(&mut self, height: f32) {
        let at_top = (self.y - self.config.margin_top_pt).abs() < f32::EPSILON;
        if !at_top && self.y + height > self.config.bottom_limit() {
            self.pages.push(PlannedPage::default());
            self.y = self.config.margin_top_pt;
        }
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    /// Places one already-wrapped line at `x` and advances the cursor.
    fn line(&mut self, text: String, x: f32, style: TextStyle) {
        self.ensure_space(self.line_height(style));
        self.push(DrawOp::Text {
            x,
            y: self.y + style.size_pt,
            style,
            text,
        });
        self.y += self.line_height(style);
    }

    fn paragraph(&mut self, text: &str, style: TextStyle) {
        let width = self.config.content_width();
        let x = self.config.margin_left_pt;
        for line in wrap_text(text, get_metrics(style.face), style.size_pt, width) {
            self.line(line, x, style);
        }
    }

    fn bullet(&mut self, text: &str) {
        let left = self.config.margin_left_pt;
        let width = self.config.content_width() - BULLET_INDENT_PT;
        let lines = wrap_text(text, get_metrics(BODY.face), BODY.size_pt, width);
        if lines.is_empty() {
            self.line("•".to_string(), left, BODY);
            return;
        }
        for (i, line) in lines.into_iter().enumerate() {
            if i == 0 {
                // Glyph first so extraction reads "• text" on one line.
                self.ensure_space(self.line_height(BODY));
                self.push(DrawOp::Text {
                    x: left,
                    y: self.y + BODY.size_pt,
                    style: BODY,
                    text: "•".to_string(),
                });
            }
            self.line(line, left + BULLET_INDENT_PT, BODY);
        }
    }

    fn heading(&mut self, text: &str) {
        // Keep the heading on the same page as the first body line.
        self.ensure_space(self.line_height(HEADING) + RULE_GAP_PT + self.line_height(BODY));
        self.paragraph(text, HEADING);
        let rule_y = self.y - HEADING.size_pt * 0.1;
        self.push(DrawOp::Rule {
            x1: self.config.margin_left_pt,
            x2: self.config.width_pt - self.config.margin_right_pt,
            y: rule_y,
        });
        self.y += RULE_GAP_PT;
    }

    fn section(&mut self, section: &ClassifiedSection) {
        for line in &section.lines {
            match line {
                ClassifiedLine::NameLine { text } => self.paragraph(text, NAME),
                ClassifiedLine::ContactLine { text } => self.paragraph(text, CONTACT),
                ClassifiedLine::SectionHeading { text } => self.heading(text),
                ClassifiedLine::PositionHeading { title, .. } => {
                    if !title.is_empty() {
                        self.paragraph(title, POSITION_TITLE);
                    }
                    if let Some(location) = line.display_location() {
                        self.paragraph(&location, LOCATION);
                    }
                }
                ClassifiedLine::BulletItem { text } => self.bullet(text),
                ClassifiedLine::PlainText { text } => self.paragraph(text, BODY),
            }
        }
        self.y += SECTION_GAP_PT;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::font_metrics::default_page_config;
    use crate::text::{parse_cv, LocationMatcher};

    fn texts(page: &PlannedPage) -> Vec<&str> {
        page.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                DrawOp::Rule { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_empty_document_has_one_blank_page() {
        let pages = paginate(&[], &default_page_config());
        assert_eq!(pages.len(), 1);
        assert!(pages[0].ops.is_empty());
    }

    #[test]
    fn test_basic_cv_fits_on_one_page_with_rule() {
        let parsed = parse_cv(
            "JANE DOE\njane@x.com\n\nEXPERIENCE\nEngineer Tel Aviv, Israel • 2020 - Present\n• Built things",
            &LocationMatcher::default(),
        );
        let pages = paginate(&parsed.sections, &default_page_config());
        assert_eq!(pages.len(), 1);
        let t = texts(&pages[0]);
        assert_eq!(
            t,
            vec![
                "JANE DOE",
                "jane@x.com",
                "EXPERIENCE",
                "Engineer",
                "Tel Aviv, Israel, 2020 - Present",
                "•",
                "Built things"
            ]
        );
        assert!(pages[0].ops.iter().any(|op| matches!(op, DrawOp::Rule { .. })));
    }

    #[test]
    fn test_long_document_breaks_pages_within_margins() {
        let mut raw = String::from("JANE DOE\n\nEXPERIENCE\n");
        for i in 0..120 {
            raw.push_str(&format!("• Achievement number {i} delivered on time\n"));
        }
        let parsed = parse_cv(&raw, &LocationMatcher::default());
        let config = default_page_config();
        let pages = paginate(&parsed.sections, &config);

        assert!(pages.len() >= 3, "expected several pages, got {}", pages.len());
        for page in &pages {
            for op in &page.ops {
                if let DrawOp::Text { y, .. } = op {
                    assert!(*y <= config.bottom_limit());
                    assert!(*y >= config.margin_top_pt);
                }
            }
        }
    }

    #[test]
    fn test_wrapped_bullet_lines_are_indented() {
        let long = "word ".repeat(60);
        let parsed = parse_cv(
            &format!("JANE\n\nSKILLS\n• {long}"),
            &LocationMatcher::default(),
        );
        let config = default_page_config();
        let pages = paginate(&parsed.sections, &config);
        let bullet_lines: Vec<f32> = pages[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { x, text, .. } if text.starts_with("word") => Some(*x),
                _ => None,
            })
            .collect();
        assert!(bullet_lines.len() > 1);
        assert!(bullet_lines
            .iter()
            .all(|x| (*x - (config.margin_left_pt + BULLET_INDENT_PT)).abs() < 1e-3));
    }
}
