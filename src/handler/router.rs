//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, route
//! matching, dispatching and access logging.

use hyper::header::{self, HeaderMap};
use hyper::{Method, Request};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::download::{self, DOWNLOAD_PREFIX};
use crate::http::{self, HttpResponse};
use crate::listing;
use crate::logger::{self, AccessLogEntry};
use crate::state::AppState;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub if_match: Option<String>,
    pub if_unmodified_since: Option<String>,
    pub if_none_match: Option<String>,
    pub if_modified_since: Option<String>,
    pub if_range: Option<String>,
    pub range_header: Option<String>,
}

impl<'a> RequestContext<'a> {
    pub fn from_parts(path: &'a str, method: &Method, headers: &HeaderMap) -> Self {
        let get = |name: header::HeaderName| header_string(headers, &name);
        Self {
            path,
            is_head: *method == Method::HEAD,
            if_match: get(header::IF_MATCH),
            if_unmodified_since: get(header::IF_UNMODIFIED_SINCE),
            if_none_match: get(header::IF_NONE_MATCH),
            if_modified_since: get(header::IF_MODIFIED_SINCE),
            if_range: get(header::IF_RANGE),
            range_header: get(header::RANGE),
        }
    }
}

/// Main entry point for HTTP request handling
///
/// Request bodies are never read, so any body type is accepted.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<HttpResponse, Infallible> {
    let started = Instant::now();
    let (parts, _) = req.into_parts();
    let method = &parts.method;
    let uri = &parts.uri;

    let response = match check_http_method(method, state.config.http.enable_cors) {
        Some(resp) => resp,
        None => {
            let ctx = RequestContext::from_parts(uri.path(), method, &parts.headers);
            route_request(&ctx, &state).await
        }
    };

    if state.config.logging.access_log {
        let mut entry = AccessLogEntry::new(
            remote_addr.ip().to_string(),
            method.to_string(),
            uri.path().to_string(),
        );
        entry.query = uri.query().map(ToString::to_string);
        entry.http_version = format_version(parts.version);
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        entry.referer = header_string(&parts.headers, &header::REFERER);
        entry.user_agent = header_string(&parts.headers, &header::USER_AGENT);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<HttpResponse> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Route request based on path
async fn route_request(ctx: &RequestContext<'_>, state: &Arc<AppState>) -> HttpResponse {
    if ctx.path == "/" {
        return listing::serve_listing(ctx, state).await;
    }

    if let Some(rest) = ctx.path.strip_prefix(DOWNLOAD_PREFIX) {
        return download::serve_download(ctx, state, rest).await;
    }

    http::build_404_response()
}

fn header_string(headers: &HeaderMap, name: &header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn format_version(version: hyper::Version) -> String {
    match version {
        hyper::Version::HTTP_09 => "0.9",
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        hyper::Version::HTTP_3 => "3",
        _ => "1.1",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_http_method() {
        assert!(check_http_method(&Method::GET, false).is_none());
        assert!(check_http_method(&Method::HEAD, false).is_none());
        assert_eq!(
            check_http_method(&Method::OPTIONS, false).unwrap().status(),
            hyper::StatusCode::NO_CONTENT
        );
        assert_eq!(
            check_http_method(&Method::POST, false).unwrap().status(),
            hyper::StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            check_http_method(&Method::DELETE, false).unwrap().status(),
            hyper::StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[test]
    fn test_request_context_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::RANGE, "bytes=0-9".parse().unwrap());
        headers.insert(header::IF_NONE_MATCH, "\"abc\"".parse().unwrap());
        headers.insert(header::IF_MATCH, "\"def\"".parse().unwrap());

        let ctx = RequestContext::from_parts("/download/a.txt", &Method::HEAD, &headers);
        assert!(ctx.is_head);
        assert_eq!(ctx.range_header.as_deref(), Some("bytes=0-9"));
        assert_eq!(ctx.if_none_match.as_deref(), Some("\"abc\""));
        assert_eq!(ctx.if_match.as_deref(), Some("\"def\""));
        assert_eq!(ctx.if_modified_since, None);
        assert_eq!(ctx.if_unmodified_since, None);
        assert_eq!(ctx.if_range, None);
    }

    #[test]
    fn test_format_version() {
        assert_eq!(format_version(hyper::Version::HTTP_11), "1.1");
        assert_eq!(format_version(hyper::Version::HTTP_10), "1.0");
    }
}
