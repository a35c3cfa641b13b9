//! Request handler module
//!
//! Routes `GET /` to the listing presenter and `GET /download/...` to the
//! download server.

pub mod router;

// Re-export main entry point
pub use router::{handle_request, RequestContext};
