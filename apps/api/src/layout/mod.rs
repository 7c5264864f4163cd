// Layout for the exported PDF: font metrics, word wrap and pagination.
// Pure computation; callers on the async side run it inside spawn_blocking.

pub mod font_metrics;
pub mod paginate;
pub mod wrap;

pub use font_metrics::{default_page_config, FontFace, PageConfig};
pub use paginate::{paginate, DrawOp, PlannedPage, TextStyle};
