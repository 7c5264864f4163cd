// HTTP surface for CV text: PDF upload, parsing, HTML preview and PDF export.

pub mod handlers;
