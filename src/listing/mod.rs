//! Listing presenter
//!
//! Re-scans the shared directory on every request and renders it as HTML.

pub mod page;
pub mod preview;
pub mod uptime;

pub use page::render_listing;
pub use preview::{classify, Preview};
pub use uptime::format_elapsed;

use std::sync::Arc;

use crate::handler::RequestContext;
use crate::http::{self, HttpResponse};
use crate::logger;
use crate::scanner;
use crate::state::AppState;

/// Serve `GET /`
pub async fn serve_listing(ctx: &RequestContext<'_>, state: &Arc<AppState>) -> HttpResponse {
    let files = match scanner::scan_directory_async(state.root().to_path_buf()).await {
        Ok(files) => files,
        Err(e) => {
            logger::log_error(&format!("Error listing files: {e}"));
            return http::build_500_response("Error listing files");
        }
    };
    logger::log_debug(&format!("Listing {} files", files.len()));

    let uptime = format_elapsed(state.uptime());
    match render_listing(&files, &uptime) {
        Ok(html) => http::build_html_response(html, ctx.is_head),
        Err(e) => {
            logger::log_error(&format!("Error rendering listing page: {e}"));
            http::build_500_response("Error rendering page")
        }
    }
}
