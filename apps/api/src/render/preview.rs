//! HTML preview of a classified CV.
//!
//! Mirrors the PDF layout closely enough for an on-screen check before export.
//! All text goes through `html_escape::encode_text`.

use html_escape::encode_text;

use crate::text::{ClassifiedLine, ClassifiedSection};

const STYLESHEET: &str = r#"
body { font-family: Helvetica, Arial, sans-serif; max-width: 210mm; margin: 20mm auto; padding: 0 25mm; color: #111; }
h1 { font-size: 18pt; margin: 0 0 4pt; }
.contact { font-size: 11pt; color: #333; }
.contact span + span::before { content: " | "; color: #888; }
section { margin-top: 12pt; }
h2 { font-size: 14pt; border-bottom: 1px solid #111; padding-bottom: 2pt; margin: 0 0 4pt; }
.position { margin-top: 6pt; }
.position .title { font-weight: bold; font-size: 12pt; }
.position .location { font-size: 11pt; color: #333; }
.bullet { display: flex; font-size: 12pt; }
.bullet .glyph { flex: 0 0 8mm; }
p { font-size: 12pt; margin: 2pt 0; }
"#;

/// Renders the sections as an HTML fragment suitable for embedding.
pub fn render_fragment(sections: &[ClassifiedSection]) -> String {
    let mut html = String::new();
    for section in sections {
        if section.is_header() {
            render_header(section, &mut html);
        } else {
            render_section(section, &mut html);
        }
    }
    html
}

/// Wraps [`render_fragment`] in a standalone HTML page.
pub fn render_document(sections: &[ClassifiedSection]) -> String {
    let title = sections
        .iter()
        .flat_map(|s| s.lines.iter())
        .find_map(|line| match line {
            ClassifiedLine::NameLine { text } => Some(text.as_str()),
            _ => None,
        })
        .unwrap_or("CV preview");

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
        encode_text(title),
        STYLESHEET,
        render_fragment(sections)
    )
}

fn render_header(section: &ClassifiedSection, html: &mut String) {
    html.push_str("<header>\n");
    for line in &section.lines {
        match line {
            ClassifiedLine::NameLine { text } => {
                html.push_str(&format!("<h1>{}</h1>\n", encode_text(text)));
            }
            ClassifiedLine::ContactLine { text } => {
                html.push_str("<div class=\"contact\">");
                for item in text.split('|').map(str::trim).filter(|s| !s.is_empty()) {
                    html.push_str(&format!("<span>{}</span>", encode_text(item)));
                }
                html.push_str("</div>\n");
            }
            other => render_line(other, html),
        }
    }
    html.push_str("</header>\n");
}

fn render_section(section: &ClassifiedSection, html: &mut String) {
    html.push_str("<section>\n");
    for line in &section.lines {
        render_line(line, html);
    }
    html.push_str("</section>\n");
}

fn render_line(line: &ClassifiedLine, html: &mut String) {
    match line {
        ClassifiedLine::SectionHeading { text } => {
            html.push_str(&format!("<h2>{}</h2>\n", encode_text(text)));
        }
        ClassifiedLine::PositionHeading { title, .. } => {
            html.push_str("<div class=\"position\">");
            if !title.is_empty() {
                html.push_str(&format!("<div class=\"title\">{}</div>", encode_text(title)));
            }
            if let Some(location) = line.display_location() {
                html.push_str(&format!(
                    "<div class=\"location\">{}</div>",
                    encode_text(&location)
                ));
            }
            html.push_str("</div>\n");
        }
        ClassifiedLine::BulletItem { text } => {
            html.push_str(&format!(
                "<div class=\"bullet\"><span class=\"glyph\">•</span><span>{}</span></div>\n",
                encode_text(text)
            ));
        }
        ClassifiedLine::NameLine { text }
        | ClassifiedLine::ContactLine { text }
        | ClassifiedLine::PlainText { text } => {
            html.push_str(&format!("<p>{}</p>\n", encode_text(text)));
        }
    }
}
