//! Fragment sources: where positioned text fragments come from.
//!
//! `FragmentSource` isolates the line-reconstruction logic from the concrete
//! PDF library. `LopdfSource` walks each page's content stream with `lopdf`,
//! tracking the graphics and text matrices just far enough to know each
//! string's page-space baseline, and decodes strings through the font that
//! `Tf` selected.

use std::collections::HashMap;

use lopdf::content::Content;
use lopdf::{Document, Encoding, Object, ObjectId};
use tracing::debug;

use crate::encoding::decode_pdf_string;
use crate::extract::lines::PositionedTextFragment;
use crate::extract::ExtractError;

/// TJ adjustments (thousandths of an em) larger than this read as a word gap.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Per-page access to positioned text fragments, in page order.
pub trait FragmentSource {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Fragments of the 1-based page `page`, in content-stream order.
    fn page_fragments(&self, page: usize) -> Result<Vec<PositionedTextFragment>, ExtractError>;
}

// ────────────────────────────────────────────────────────────────────────────
// lopdf-backed source
// ────────────────────────────────────────────────────────────────────────────

/// Fragment source backed by `lopdf::Document`.
pub struct LopdfSource {
    doc: Document,
    pages: Vec<ObjectId>,
}

impl LopdfSource {
    /// Parses an in-memory PDF.
    pub fn load_bytes(data: &[u8]) -> Result<Self, ExtractError> {
        let doc = Document::load_mem(data).map_err(|e| ExtractError::Parse(e.to_string()))?;
        if doc.is_encrypted() {
            return Err(ExtractError::Parse(
                "the document is encrypted".to_string(),
            ));
        }
        let pages = doc.get_pages().into_values().collect();
        Ok(Self { doc, pages })
    }

    /// Decoders for the page's fonts, keyed by resource name (`F1`, ...).
    fn page_decoder(&self, page_id: ObjectId) -> FontDecoder<'_> {
        let fonts = match self.doc.get_page_fonts(page_id) {
            Ok(fonts) => fonts,
            Err(e) => {
                debug!("no font resources: {e}");
                return FontDecoder::default();
            }
        };

        let encodings = fonts
            .into_iter()
            .filter(|(_, font)| font.type_is(b"Font"))
            .filter_map(|(name, font)| match font.get_font_encoding(&self.doc) {
                Ok(encoding) => Some((name, encoding)),
                Err(e) => {
                    debug!("font {}: {e}", String::from_utf8_lossy(&name));
                    None
                }
            })
            .collect();

        FontDecoder { encodings }
    }
}

impl FragmentSource for LopdfSource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_fragments(&self, page: usize) -> Result<Vec<PositionedTextFragment>, ExtractError> {
        let page_id = page
            .checked_sub(1)
            .and_then(|i| self.pages.get(i))
            .copied()
            .ok_or_else(|| ExtractError::Parse(format!("page {page} does not exist")))?;

        let raw = self
            .doc
            .get_page_content(page_id)
            .map_err(|e| ExtractError::Parse(format!("page {page}: {e}")))?;
        let content =
            Content::decode(&raw).map_err(|e| ExtractError::Parse(format!("page {page}: {e}")))?;

        let decoder = self.page_decoder(page_id);
        let mut graphics = GraphicsStack::default();
        let mut state = TextState::default();
        let mut fragments = Vec::new();

        for op in &content.operations {
            let operands = &op.operands;
            match op.operator.as_str() {
                "q" => graphics.save(),
                "Q" => graphics.restore(),
                "cm" if operands.len() >= 6 => graphics.concat(matrix_operands(operands)),
                "BT" => state.begin_text(),
                "Tf" => {
                    if let Some(Object::Name(name)) = operands.first() {
                        graphics.current.font = name.clone();
                    }
                }
                "Tm" if operands.len() >= 6 => state.set_matrix(matrix_operands(operands)),
                "Td" if operands.len() >= 2 => {
                    state.move_line(number_or_zero(&operands[0]), number_or_zero(&operands[1]));
                }
                "TD" if operands.len() >= 2 => {
                    let ty = number_or_zero(&operands[1]);
                    state.leading = -ty;
                    state.move_line(number_or_zero(&operands[0]), ty);
                }
                "TL" if !operands.is_empty() => state.leading = number_or_zero(&operands[0]),
                "T*" => state.next_line(),
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        let text = decoder.decode(&graphics.current.font, bytes);
                        state.push(text, &graphics.current.ctm, &mut fragments);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = operands.first() {
                        let text = tj_text(items, |bytes| {
                            decoder.decode(&graphics.current.font, bytes)
                        });
                        state.push(text, &graphics.current.ctm, &mut fragments);
                    }
                }
                "'" => {
                    state.next_line();
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        let text = decoder.decode(&graphics.current.font, bytes);
                        state.push(text, &graphics.current.ctm, &mut fragments);
                    }
                }
                "\"" => {
                    state.next_line();
                    if let Some(Object::String(bytes, _)) = operands.get(2) {
                        let text = decoder.decode(&graphics.current.font, bytes);
                        state.push(text, &graphics.current.ctm, &mut fragments);
                    }
                }
                _ => {}
            }
        }

        Ok(fragments)
    }
}

/// Font encodings of one page.
#[derive(Default)]
struct FontDecoder<'a> {
    encodings: HashMap<Vec<u8>, Encoding<'a>>,
}

impl FontDecoder<'_> {
    /// Decodes through the named font's encoding (simple encodings and
    /// ToUnicode CMaps). Unknown fonts and undecodable strings fall back to
    /// the byte-level guess.
    fn decode(&self, font: &[u8], bytes: &[u8]) -> String {
        self.encodings
            .get(font)
            .and_then(|encoding| Document::decode_text(encoding, bytes).ok())
            .unwrap_or_else(|| decode_pdf_string(bytes))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Graphics and text state
// ────────────────────────────────────────────────────────────────────────────

/// A matrix `[a b c d e f]` in PDF row-vector form.
type Matrix = [f32; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// `m × n`: apply `m`, then `n`.
fn multiply(m: &Matrix, n: &Matrix) -> Matrix {
    [
        m[0] * n[0] + m[1] * n[2],
        m[0] * n[1] + m[1] * n[3],
        m[2] * n[0] + m[3] * n[2],
        m[2] * n[1] + m[3] * n[3],
        m[4] * n[0] + m[5] * n[2] + n[4],
        m[4] * n[1] + m[5] * n[3] + n[5],
    ]
}

/// The parts of the graphics state that `q`/`Q` save and restore.
#[derive(Debug, Clone)]
struct GraphicsState {
    /// Current transformation matrix: user space to page space.
    ctm: Matrix,
    /// Resource name of the font selected by `Tf`.
    font: Vec<u8>,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: IDENTITY,
            font: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
struct GraphicsStack {
    current: GraphicsState,
    saved: Vec<GraphicsState>,
}

impl GraphicsStack {
    fn save(&mut self) {
        self.saved.push(self.current.clone());
    }

    /// An unbalanced `Q` leaves the state as it is.
    fn restore(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.current = state;
        }
    }

    fn concat(&mut self, m: Matrix) {
        self.current.ctm = multiply(&m, &self.current.ctm);
    }
}

/// Text matrix and line matrix, reduced to what positioning needs.
#[derive(Debug, Clone, Copy)]
struct TextState {
    /// Text matrix `[a b c d e f]`.
    tm: Matrix,
    /// Line matrix: start of the current line.
    tlm: Matrix,
    leading: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            tm: IDENTITY,
            tlm: IDENTITY,
            leading: 0.0,
        }
    }
}

impl TextState {
    fn begin_text(&mut self) {
        self.tm = IDENTITY;
        self.tlm = IDENTITY;
    }

    fn set_matrix(&mut self, m: Matrix) {
        self.tm = m;
        self.tlm = m;
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        let [a, b, c, d, e, f] = self.tlm;
        self.tlm = [a, b, c, d, e + tx * a + ty * c, f + tx * b + ty * d];
        self.tm = self.tlm;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }

    /// Page-space origin of the next glyph: the translation of `Tm × CTM`.
    fn origin(&self, ctm: &Matrix) -> (f32, f32) {
        let m = multiply(&self.tm, ctm);
        (m[4], m[5])
    }

    fn push(&self, text: String, ctm: &Matrix, out: &mut Vec<PositionedTextFragment>) {
        if text.trim().is_empty() {
            return;
        }
        let (x, y) = self.origin(ctm);
        out.push(PositionedTextFragment::new(text, x, y));
    }
}

fn number_or_zero(obj: &Object) -> f32 {
    match obj {
        Object::Integer(i) => *i as f32,
        Object::Real(r) => *r as f32,
        _ => 0.0,
    }
}

fn matrix_operands(operands: &[Object]) -> Matrix {
    let mut m = IDENTITY;
    for (slot, operand) in m.iter_mut().zip(operands) {
        *slot = number_or_zero(operand);
    }
    m
}

/// Joins a TJ array, turning large negative kerning into a word space.
fn tj_text(items: &[Object], decode: impl Fn(&[u8]) -> String) -> String {
    let mut combined = String::new();
    for item in items {
        match item {
            Object::String(bytes, _) => combined.push_str(&decode(bytes)),
            Object::Integer(_) | Object::Real(_) => {
                let adjustment = -number_or_zero(item);
                if adjustment > TJ_SPACE_THRESHOLD
                    && !combined.is_empty()
                    && !combined.ends_with(char::is_whitespace)
                {
                    combined.push(' ');
                }
            }
            _ => {}
        }
    }
    combined
}
