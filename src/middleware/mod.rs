//! Cross-cutting request/response concerns.
//!
//! - [`cors`] — origin allow-list for `/api/*`, preflight answers
//! - [`trace`] — one structured event per request with status and latency

pub mod cors;
pub mod trace;

pub use cors::Cors;
