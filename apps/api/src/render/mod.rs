// Renderers for a classified CV: HTML preview and paginated PDF.

pub mod pdf;
pub mod preview;

use chrono::{NaiveDate, Utc};

pub use pdf::{write_pdf, RenderError};
pub use preview::{render_document, render_fragment};

/// Download name for an exported PDF, dated today (UTC).
pub fn export_filename() -> String {
    export_filename_for(Utc::now().date_naive())
}

pub fn export_filename_for(date: NaiveDate) -> String {
    format!("optimized-cv-{}.pdf", date.format("%Y-%m-%d"))
}
