//! Hand-built one-page PDFs for extraction tests.
//!
//! The crate's own writer only produces WinAnsi Helvetica text placed with
//! `Td`. These fixtures cover what other generators emit: composite fonts
//! with ToUnicode maps, `cm`-placed text and text inside form XObjects.

use lopdf::{dictionary, Dictionary, Document, Object, Stream};

/// ToUnicode CMap mapping 2-byte codes `0001..` to `text`, one char each.
pub fn to_unicode_cmap(text: &str) -> String {
    let entries: Vec<String> = text
        .chars()
        .enumerate()
        .map(|(i, c)| format!("<{:04X}> <{:04X}>", i + 1, c as u32))
        .collect();
    format!(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n\
         <0000> <FFFF>\n\
         endcodespacerange\n\
         {} beginbfchar\n\
         {}\n\
         endbfchar\n\
         endcmap\n\
         CMapName currentdict /CMap defineresource pop\n\
         end\n\
         end\n",
        entries.len(),
        entries.join("\n")
    )
}

/// Hex operand addressing the codes produced by [`to_unicode_cmap`].
pub fn identity_codes(len: usize) -> String {
    let codes: String = (1..=len).map(|i| format!("{i:04X}")).collect();
    format!("<{codes}>")
}

pub struct PdfFixture {
    doc: Document,
    fonts: Dictionary,
    xobjects: Dictionary,
}

impl PdfFixture {
    pub fn new() -> Self {
        Self {
            doc: Document::with_version("1.5"),
            fonts: Dictionary::new(),
            xobjects: Dictionary::new(),
        }
    }

    /// Standard Helvetica with WinAnsiEncoding under resource name `name`.
    pub fn helvetica(mut self, name: &str) -> Self {
        let id = self.doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        self.fonts.set(name, id);
        self
    }

    /// A Type0 font with Identity-H encoding whose ToUnicode map spells `text`.
    pub fn identity_h(mut self, name: &str, text: &str) -> Self {
        let cmap_id = self.doc.add_object(Stream::new(
            dictionary! {},
            to_unicode_cmap(text).into_bytes(),
        ));
        let descendant_id = self.doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType2",
            "BaseFont" => "AAAAAA+Calibri",
            "CIDSystemInfo" => dictionary! {
                "Registry" => Object::string_literal("Adobe"),
                "Ordering" => Object::string_literal("Identity"),
                "Supplement" => 0,
            },
        });
        let id = self.doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => "AAAAAA+Calibri",
            "Encoding" => "Identity-H",
            "DescendantFonts" => vec![descendant_id.into()],
            "ToUnicode" => cmap_id,
        });
        self.fonts.set(name, id);
        self
    }

    /// A form XObject drawn with the page's resources.
    pub fn form(mut self, name: &str, content: &str) -> Self {
        let id = self.doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "BBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            },
            content.as_bytes().to_vec(),
        ));
        self.xobjects.set(name, id);
        self
    }

    /// Saves a single page whose content stream is `content`.
    pub fn build(mut self, content: &str) -> Vec<u8> {
        let pages_id = self.doc.new_object_id();
        let resources_id = self.doc.add_object(dictionary! {
            "Font" => self.fonts,
            "XObject" => self.xobjects,
        });
        let content_id = self
            .doc
            .add_object(Stream::new(dictionary! {}, content.as_bytes().to_vec()));
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        self.doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        self.doc.save_to(&mut out).expect("save fixture");
        out
    }
}
