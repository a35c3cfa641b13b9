//! Content sniffing for files whose name gives no type
//!
//! Looks at the first [`SNIFF_LEN`] bytes: markup signatures first, then
//! binary magic numbers via `infer`, then a plain-text check.

/// Number of leading bytes inspected
pub const SNIFF_LEN: usize = 512;

const HTML: &str = "text/html; charset=utf-8";
const XML: &str = "text/xml; charset=utf-8";
const TEXT: &str = "text/plain; charset=utf-8";
const OCTET_STREAM: &str = "application/octet-stream";

/// Tags that mark a document as HTML when they open it
const HTML_SIGNATURES: [&[u8]; 17] = [
    b"<!DOCTYPE HTML",
    b"<HTML",
    b"<HEAD",
    b"<SCRIPT",
    b"<IFRAME",
    b"<H1",
    b"<DIV",
    b"<FONT",
    b"<TABLE",
    b"<A",
    b"<STYLE",
    b"<TITLE",
    b"<B",
    b"<BODY",
    b"<BR",
    b"<P",
    b"<!--",
];

/// Pick a Content-Type from the leading bytes of a file
pub fn detect_content_type(data: &[u8]) -> &'static str {
    let data = &data[..data.len().min(SNIFF_LEN)];
    let trimmed = skip_whitespace(data);

    if HTML_SIGNATURES.iter().any(|sig| has_html_signature(trimmed, sig)) {
        return HTML;
    }
    if trimmed.starts_with(b"<?xml") {
        return XML;
    }
    if let Some(kind) = infer::get(data) {
        return kind.mime_type();
    }
    if data.iter().copied().any(is_binary_byte) {
        OCTET_STREAM
    } else {
        TEXT
    }
}

fn skip_whitespace(data: &[u8]) -> &[u8] {
    let start = data
        .iter()
        .position(|b| !matches!(b, b'\t' | b'\n' | 0x0c | b'\r' | b' '))
        .unwrap_or(data.len());
    &data[start..]
}

/// Case-insensitive prefix match followed by a tag-terminating byte
fn has_html_signature(data: &[u8], sig: &[u8]) -> bool {
    data.len() > sig.len()
        && data[..sig.len()].eq_ignore_ascii_case(sig)
        && matches!(data[sig.len()], b' ' | b'>')
}

const fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0b | 0x0e..=0x1a | 0x1c..=0x1f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        assert_eq!(detect_content_type(b"plain text readme\n"), TEXT);
        assert_eq!(detect_content_type("héllo wörld".as_bytes()), TEXT);
        assert_eq!(detect_content_type(b""), TEXT);
    }

    #[test]
    fn test_html() {
        assert_eq!(detect_content_type(b"<!DOCTYPE html><html></html>"), HTML);
        assert_eq!(detect_content_type(b"\n  <html lang=\"en\">"), HTML);
        assert_eq!(detect_content_type(b"<p>hi</p>"), HTML);
        // `<a` must be followed by a space or `>`
        assert_eq!(detect_content_type(b"<abc>"), TEXT);
    }

    #[test]
    fn test_xml() {
        assert_eq!(detect_content_type(b"<?xml version=\"1.0\"?><root/>"), XML);
    }

    #[test]
    fn test_magic_numbers() {
        let png = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 0x0d];
        assert_eq!(detect_content_type(&png), "image/png");
        assert_eq!(detect_content_type(b"%PDF-1.7\n"), "application/pdf");
    }

    #[test]
    fn test_unknown_binary() {
        assert_eq!(detect_content_type(&[0x00, 0x01, 0x02, 0xff]), OCTET_STREAM);
    }
}
