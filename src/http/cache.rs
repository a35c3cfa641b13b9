//! HTTP cache validation module
//!
//! `ETag` / `Last-Modified` generation and conditional request evaluation
//! for files served from disk.

use chrono::{DateTime, Utc};
use std::time::{SystemTime, UNIX_EPOCH};

/// Validators describing one version of a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validators {
    /// Quoted strong `ETag`, e.g. `"1a2b-65f0c3d1"`
    pub etag: String,
    /// Modification time truncated to whole seconds
    pub modified: Option<DateTime<Utc>>,
}

impl Validators {
    /// Derive validators from file size and modification time
    pub fn new(size: u64, modified: Option<SystemTime>) -> Self {
        let modified = modified.and_then(truncate_to_secs);
        let stamp = modified.map_or(0, |m| m.timestamp());
        Self {
            etag: format!("\"{size:x}-{stamp:x}\""),
            modified,
        }
    }

    /// `Last-Modified` header value, if the modification time is known
    pub fn last_modified(&self) -> Option<String> {
        self.modified.map(format_http_date)
    }

    /// Whether a conditional GET/HEAD can be answered with 304
    ///
    /// `If-None-Match` takes precedence; `If-Modified-Since` is only
    /// consulted when it is absent.
    pub fn is_not_modified(
        &self,
        if_none_match: Option<&str>,
        if_modified_since: Option<&str>,
    ) -> bool {
        if let Some(inm) = if_none_match {
            return check_etag_match(Some(inm), &self.etag);
        }
        match (if_modified_since.and_then(parse_http_date), self.modified) {
            (Some(since), Some(modified)) => modified <= since,
            _ => false,
        }
    }

    /// Whether `If-Match` / `If-Unmodified-Since` reject the request (412)
    ///
    /// `If-Match` uses strong comparison and takes precedence;
    /// `If-Unmodified-Since` is only consulted when it is absent.
    pub fn precondition_failed(
        &self,
        if_match: Option<&str>,
        if_unmodified_since: Option<&str>,
    ) -> bool {
        if let Some(im) = if_match {
            return !im
                .split(',')
                .map(str::trim)
                .any(|e| e == "*" || e == self.etag);
        }
        match (if_unmodified_since.and_then(parse_http_date), self.modified) {
            (Some(since), Some(modified)) => modified > since,
            _ => false,
        }
    }

    /// Whether an `If-Range` precondition allows serving a partial response
    pub fn range_allowed(&self, if_range: Option<&str>) -> bool {
        match if_range.map(str::trim) {
            None => true,
            Some(value) if value.starts_with('"') || value.starts_with("W/") => {
                value == self.etag
            }
            Some(value) => match (parse_http_date(value), self.modified) {
                (Some(date), Some(modified)) => modified == date,
                _ => false,
            },
        }
    }
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Supports a single `ETag`, a comma-separated list, weak `W/` prefixes
/// and the `*` wildcard.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag.split(',').map(str::trim).any(|e| {
            e == "*" || e.strip_prefix("W/").unwrap_or(e) == etag
        })
    })
}

/// IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
pub fn format_http_date(time: DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Parse an HTTP date header value
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn truncate_to_secs(time: SystemTime) -> Option<DateTime<Utc>> {
    let secs = time.duration_since(UNIX_EPOCH).ok()?.as_secs();
    DateTime::from_timestamp(i64::try_from(secs).ok()?, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sample() -> Validators {
        // 1994-11-06 08:49:37 UTC plus a fraction that must be dropped
        let mtime = UNIX_EPOCH + Duration::new(784_111_777, 500_000_000);
        Validators::new(1024, Some(mtime))
    }

    #[test]
    fn test_validators() {
        let v = sample();
        assert_eq!(v.etag, format!("\"400-{:x}\"", 784_111_777));
        assert_eq!(
            v.last_modified().as_deref(),
            Some("Sun, 06 Nov 1994 08:49:37 GMT")
        );
    }

    #[test]
    fn test_etag_changes_with_size() {
        let mtime = Some(UNIX_EPOCH + Duration::from_secs(100));
        assert_ne!(Validators::new(1, mtime).etag, Validators::new(2, mtime).etag);
    }

    #[test]
    fn test_check_etag_match() {
        let etag = "\"abc123\"";
        assert!(check_etag_match(Some("\"abc123\""), etag));
        assert!(check_etag_match(Some("\"xyz\", \"abc123\""), etag));
        assert!(check_etag_match(Some("W/\"abc123\""), etag));
        assert!(check_etag_match(Some("*"), etag));
        assert!(!check_etag_match(Some("\"different\""), etag));
        assert!(!check_etag_match(None, etag));
    }

    #[test]
    fn test_if_modified_since() {
        let v = sample();
        assert!(v.is_not_modified(None, Some("Sun, 06 Nov 1994 08:49:37 GMT")));
        assert!(v.is_not_modified(None, Some("Mon, 07 Nov 1994 00:00:00 GMT")));
        assert!(!v.is_not_modified(None, Some("Sat, 05 Nov 1994 00:00:00 GMT")));
        assert!(!v.is_not_modified(None, Some("garbage")));
        assert!(!v.is_not_modified(None, None));
    }

    #[test]
    fn test_if_none_match_takes_precedence() {
        let v = sample();
        let newer = Some("Mon, 07 Nov 1994 00:00:00 GMT");
        assert!(!v.is_not_modified(Some("\"other\""), newer));
        assert!(v.is_not_modified(Some(&v.etag), None));
    }

    #[test]
    fn test_if_match() {
        let v = sample();
        assert!(!v.precondition_failed(None, None));
        assert!(!v.precondition_failed(Some(&v.etag), None));
        assert!(!v.precondition_failed(Some("*"), None));
        assert!(!v.precondition_failed(Some(&format!("\"x\", {}", v.etag)), None));
        assert!(v.precondition_failed(Some("\"stale\""), None));
        // weak tags never match strongly
        assert!(v.precondition_failed(Some(&format!("W/{}", v.etag)), None));
        // If-Match wins over an If-Unmodified-Since that would pass
        assert!(v.precondition_failed(Some("\"stale\""), Some("Mon, 07 Nov 1994 00:00:00 GMT")));
    }

    #[test]
    fn test_if_unmodified_since() {
        let v = sample();
        assert!(!v.precondition_failed(None, Some("Sun, 06 Nov 1994 08:49:37 GMT")));
        assert!(!v.precondition_failed(None, Some("Mon, 07 Nov 1994 00:00:00 GMT")));
        assert!(v.precondition_failed(None, Some("Sat, 05 Nov 1994 00:00:00 GMT")));
        assert!(!v.precondition_failed(None, Some("garbage")));
    }

    #[test]
    fn test_if_range() {
        let v = sample();
        assert!(v.range_allowed(None));
        assert!(v.range_allowed(Some(&v.etag)));
        assert!(!v.range_allowed(Some("\"stale\"")));
        assert!(v.range_allowed(Some("Sun, 06 Nov 1994 08:49:37 GMT")));
        assert!(!v.range_allowed(Some("Sat, 05 Nov 1994 00:00:00 GMT")));
    }

    #[test]
    fn test_unknown_mtime() {
        let v = Validators::new(10, None);
        assert_eq!(v.etag, "\"a-0\"");
        assert_eq!(v.last_modified(), None);
        assert!(!v.is_not_modified(None, Some("Sun, 06 Nov 1994 08:49:37 GMT")));
    }
}
