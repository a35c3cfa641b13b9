//! HTTP response building module
//!
//! Builders for the status responses the server emits. Every response body
//! is an [`UnsyncBoxBody`] so buffered and streamed bodies share one type.

use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::header::{self, HeaderValue};
use hyper::{Response, StatusCode};

use crate::logger;

/// Body type of every response
pub type ResponseBody = UnsyncBoxBody<Bytes, std::io::Error>;

/// Response type produced by the handlers
pub type HttpResponse = Response<ResponseBody>;

pub const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Wrap in-memory data as a response body
pub fn full(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

pub fn empty() -> ResponseBody {
    full(Bytes::new())
}

/// Build a `text/plain` response with the given status
pub fn build_text_response(status: StatusCode, message: &'static str) -> HttpResponse {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(header::CONTENT_LENGTH, message.len())
        .body(full(message))
        .unwrap_or_else(|e| fallback(status, &e))
}

pub fn build_400_response() -> HttpResponse {
    build_text_response(StatusCode::BAD_REQUEST, "400 Bad Request")
}

pub fn build_403_response() -> HttpResponse {
    build_text_response(StatusCode::FORBIDDEN, "403 Forbidden")
}

pub fn build_404_response() -> HttpResponse {
    build_text_response(StatusCode::NOT_FOUND, "404 Not Found")
}

pub fn build_500_response(message: &'static str) -> HttpResponse {
    build_text_response(StatusCode::INTERNAL_SERVER_ERROR, message)
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> HttpResponse {
    let mut resp = build_text_response(StatusCode::METHOD_NOT_ALLOWED, "405 Method Not Allowed");
    resp.headers_mut()
        .insert(header::ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
    resp
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(enable_cors: bool) -> HttpResponse {
    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(header::ALLOW, ALLOWED_METHODS);

    if enable_cors {
        builder = builder
            .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
            .header(header::ACCESS_CONTROL_ALLOW_METHODS, ALLOWED_METHODS)
            .header(header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type, Range")
            .header(header::ACCESS_CONTROL_MAX_AGE, "86400");
    }

    builder
        .body(empty())
        .unwrap_or_else(|e| fallback(StatusCode::NO_CONTENT, &e))
}

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str, last_modified: Option<&str>) -> HttpResponse {
    let mut builder = Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header(header::ETAG, etag);
    if let Some(lm) = last_modified {
        builder = builder.header(header::LAST_MODIFIED, lm);
    }
    builder
        .body(empty())
        .unwrap_or_else(|e| fallback(StatusCode::NOT_MODIFIED, &e))
}

/// Build 412 Precondition Failed response
pub fn build_412_response() -> HttpResponse {
    build_text_response(StatusCode::PRECONDITION_FAILED, "412 Precondition Failed")
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(file_size: u64) -> HttpResponse {
    let mut resp = build_text_response(StatusCode::RANGE_NOT_SATISFIABLE, "Range Not Satisfiable");
    if let Ok(value) = HeaderValue::from_str(&format!("bytes */{file_size}")) {
        resp.headers_mut().insert(header::CONTENT_RANGE, value);
    }
    resp
}

/// Build HTML page response; HEAD keeps the headers and drops the body
pub fn build_html_response(content: String, is_head: bool) -> HttpResponse {
    let content_length = content.len();
    let body = if is_head { empty() } else { full(content) };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
        .header(header::CONTENT_LENGTH, content_length)
        .header(header::CACHE_CONTROL, "no-cache")
        .body(body)
        .unwrap_or_else(|e| fallback(StatusCode::OK, &e))
}

/// Log a builder failure and return a bare response with the intended status
fn fallback(status: StatusCode, error: &hyper::http::Error) -> HttpResponse {
    logger::log_error(&format!("Failed to build {status} response: {error}"));
    let mut resp = Response::new(empty());
    *resp.status_mut() = status;
    resp
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_string(resp: HttpResponse) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_404() {
        let resp = build_404_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(resp).await, "404 Not Found");
    }

    #[test]
    fn test_405_has_allow_header() {
        let resp = build_405_response();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()[header::ALLOW], ALLOWED_METHODS);
    }

    #[test]
    fn test_options_cors() {
        let plain = build_options_response(false);
        assert_eq!(plain.status(), StatusCode::NO_CONTENT);
        assert!(plain.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());

        let cors = build_options_response(true);
        assert_eq!(cors.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[test]
    fn test_416_content_range() {
        let resp = build_416_response(42);
        assert_eq!(resp.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(resp.headers()[header::CONTENT_RANGE], "bytes */42");
    }

    #[tokio::test]
    async fn test_html_head_has_length_but_no_body() {
        let resp = build_html_response("<p>hi</p>".to_string(), true);
        assert_eq!(resp.headers()[header::CONTENT_LENGTH], "9");
        assert_eq!(body_string(resp).await, "");
    }
}
