// LLM-backed CV optimization: service, session guard and HTTP handler.

pub mod handlers;
pub mod service;
pub mod session;

pub use service::{optimize_cv, OptimizeRequest, OptimizeResponse};
pub use session::SessionGuard;
