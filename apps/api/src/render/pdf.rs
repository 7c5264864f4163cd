//! PDF writer for planned pages.
//!
//! Uses the two standard Type1 fonts (Helvetica, Helvetica-Bold) with
//! WinAnsiEncoding, so no font program is embedded. Layout coordinates are
//! measured from the top of the page and flipped here.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use thiserror::Error;
use tracing::debug;

use crate::encoding::encode_win_ansi;
use crate::layout::{DrawOp, FontFace, PageConfig, PlannedPage};

const RULE_WIDTH_PT: f32 = 0.75;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to encode page content: {0}")]
    Content(#[from] lopdf::Error),

    #[error("failed to write PDF: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes `pages` as a complete PDF document.
pub fn write_pdf(pages: &[PlannedPage], config: &PageConfig) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(font_dictionary(FontFace::Helvetica));
    let bold_id = doc.add_object(font_dictionary(FontFace::HelveticaBold));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            FontFace::Helvetica.resource_name() => regular_id,
            FontFace::HelveticaBold.resource_name() => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let content = Content {
            operations: page_operations(page, config),
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), config.width_pt.into(), config.height_pt.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id: ObjectId = doc.add_object(dictionary! {
        "Producer" => Object::string_literal("cv-optimizer"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    debug!(pages = pages.len(), bytes = out.len(), "PDF written");
    Ok(out)
}

fn font_dictionary(face: FontFace) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => face.base_font(),
        "Encoding" => "WinAnsiEncoding",
    }
}

fn page_operations(page: &PlannedPage, config: &PageConfig) -> Vec<Operation> {
    let mut ops = Vec::new();
    for op in &page.ops {
        match op {
            DrawOp::Text { x, y, style, text } => {
                let baseline = config.height_pt - y;
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new(
                    "Tf",
                    vec![style.face.resource_name().into(), style.size_pt.into()],
                ));
                ops.push(Operation::new("Td", vec![(*x).into(), baseline.into()]));
                ops.push(Operation::new(
                    "Tj",
                    vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
                ));
                ops.push(Operation::new("ET", vec![]));
            }
            DrawOp::Rule { x1, x2, y } => {
                let py = config.height_pt - y;
                ops.push(Operation::new("w", vec![RULE_WIDTH_PT.into()]));
                ops.push(Operation::new("m", vec![(*x1).into(), py.into()]));
                ops.push(Operation::new("l", vec![(*x2).into(), py.into()]));
                ops.push(Operation::new("S", vec![]));
            }
        }
    }
    ops
}
