//! HTTP protocol layer module
//!
//! Range parsing, cache validators, content sniffing and response builders, independent of
//! the listing and download logic that uses them.

pub mod cache;
pub mod range;
pub mod response;
pub mod sniff;

// Re-export commonly used types
pub use range::{parse_range_header, ByteRange, RangeParseResult};
pub use response::{
    build_304_response, build_400_response, build_403_response, build_404_response,
    build_405_response, build_412_response, build_416_response, build_500_response, build_html_response,
    build_options_response, build_text_response, empty, full, HttpResponse, ResponseBody,
};
