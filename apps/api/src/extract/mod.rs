// PDF Text Extractor: uploaded PDF bytes → reconstructed plain text.
// Pages are processed strictly in order; extraction is CPU-bound, so callers
// run it inside tokio::task::spawn_blocking.

#[cfg(test)]
mod fixtures;
pub mod lines;
pub mod source;

use thiserror::Error;
use tracing::{debug, warn};

pub use lines::{PositionedTextFragment, DEFAULT_LINE_BREAK_THRESHOLD};
pub use source::{FragmentSource, LopdfSource};

const PDF_MIME: &str = "application/pdf";
const PDF_SIGNATURE: &[u8] = b"%PDF-";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Expected a PDF file, got '{0}'")]
    InvalidFileType(String),

    #[error("Could not read the PDF: {0}")]
    Parse(String),
}

/// Tunables for line reconstruction.
#[derive(Debug, Clone, Copy)]
pub struct ExtractorConfig {
    /// Vertical delta (PDF units) above which a fragment starts a new line.
    pub line_break_threshold: f32,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            line_break_threshold: DEFAULT_LINE_BREAK_THRESHOLD,
        }
    }
}

/// Output of a successful extraction.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    pub text: String,
    pub page_count: usize,
}

/// Rejects anything that is not a PDF before extraction is attempted.
///
/// A declared content type must be `application/pdf`. Without one (or with
/// `application/octet-stream`) the `%PDF-` signature decides.
pub fn ensure_pdf(content_type: Option<&str>, bytes: &[u8]) -> Result<(), ExtractError> {
    let declared = content_type
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase())
        .filter(|ct| !ct.is_empty());

    match declared.as_deref() {
        Some(PDF_MIME) => Ok(()),
        None | Some("application/octet-stream") if bytes.starts_with(PDF_SIGNATURE) => Ok(()),
        other => Err(ExtractError::InvalidFileType(
            other.unwrap_or("unknown").to_string(),
        )),
    }
}

/// Reconstructs the text of every page of `source`, in page order.
pub fn extract_text(
    source: &dyn FragmentSource,
    config: &ExtractorConfig,
) -> Result<String, ExtractError> {
    let mut out = String::new();
    for page in 1..=source.page_count() {
        let fragments = source.page_fragments(page)?;
        debug!("page {page}: {} fragments", fragments.len());
        lines::reconstruct_page(&fragments, config.line_break_threshold, &mut out);
    }
    Ok(out)
}

/// Extracts text from raw PDF bytes.
///
/// When the positioned pass recovers no readable text (strings it cannot
/// decode, text drawn inside form XObjects), `pdf-extract` gets one attempt
/// before giving up.
pub fn extract_pdf_text(bytes: &[u8], config: &ExtractorConfig) -> Result<ExtractedText, ExtractError> {
    let source = LopdfSource::load_bytes(bytes)?;
    let page_count = source.page_count();
    let text = extract_or_fallback(&source, config, || {
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Parse(e.to_string()))
    })?;
    Ok(ExtractedText { text, page_count })
}

fn extract_or_fallback<F>(
    source: &dyn FragmentSource,
    config: &ExtractorConfig,
    fallback: F,
) -> Result<String, ExtractError>
where
    F: FnOnce() -> Result<String, ExtractError>,
{
    let page_count = source.page_count();
    let text = extract_text(source, config)?;
    if page_count == 0 || is_readable(&text) {
        return Ok(text);
    }

    warn!("Positioned extraction found no readable text in {page_count} page(s); falling back to pdf-extract");
    fallback()
}

/// Readable text has at least one visible character, and visible characters
/// outnumber control and replacement characters.
fn is_readable(text: &str) -> bool {
    let (visible, garbage) = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .fold((0usize, 0usize), |(visible, garbage), c| {
            if c.is_control() || c == char::REPLACEMENT_CHARACTER {
                (visible, garbage + 1)
            } else {
                (visible + 1, garbage)
            }
        });
    visible > garbage
}
