//! Download server
//!
//! Resolves `/download/<path>` against the shared root, refuses anything
//! that leaves it, and streams the file from disk. Downloads are serialized
//! by the application's download guard, which stays locked until the
//! response body has been fully sent or dropped.

use futures::{Stream, TryStreamExt};
use http_body_util::{BodyExt, StreamBody};
use hyper::body::{Bytes, Frame};
use hyper::header;
use hyper::{Response, StatusCode};
use std::io::{self, SeekFrom};
use std::path::{Component, Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::OwnedMutexGuard;
use tokio_util::io::ReaderStream;

use crate::error::DownloadError;
use crate::handler::RequestContext;
use crate::http::cache::Validators;
use crate::http::sniff;
use crate::http::{self, HttpResponse, RangeParseResult};
use crate::logger;
use crate::state::AppState;

/// Route prefix of the download endpoint
pub const DOWNLOAD_PREFIX: &str = "/download/";

const CHUNK_SIZE: usize = 64 * 1024;

/// Serve `GET /download/<rest>`; `rest` is the still-encoded remainder of the URL path
pub async fn serve_download(
    ctx: &RequestContext<'_>,
    state: &Arc<AppState>,
    rest: &str,
) -> HttpResponse {
    match try_serve(ctx, state, rest).await {
        Ok(resp) => resp,
        Err(e) => {
            match &e {
                DownloadError::InvalidPath(_) | DownloadError::OutsideRoot(_) => {
                    logger::log_warning(&format!("Download refused for '{}': {e}", ctx.path));
                }
                DownloadError::Io(_) | DownloadError::Http(_) => {
                    logger::log_error(&format!("Download failed for '{}': {e}", ctx.path));
                }
                DownloadError::BadEncoding | DownloadError::NotFound(_) => {
                    logger::log_debug(&format!("Download '{}': {e}", ctx.path));
                }
            }
            error_response(&e)
        }
    }
}

async fn try_serve(
    ctx: &RequestContext<'_>,
    state: &Arc<AppState>,
    rest: &str,
) -> Result<HttpResponse, DownloadError> {
    let relative = urlencoding::decode(rest).map_err(|_| DownloadError::BadEncoding)?;
    let candidate = resolve_path(state.root(), &relative)?;

    let guard = state.download_guard().lock_owned().await;

    let path = verify_within_root(state.root(), &candidate, &relative).await?;
    let metadata = fs::metadata(&path).await?;
    if !metadata.is_file() {
        return Err(DownloadError::NotFound(relative.into_owned()));
    }

    let mut file = File::open(&path).await?;
    let size = metadata.len();
    let validators = Validators::new(size, metadata.modified().ok());
    let content_type = match mime_guess::from_path(&path).first() {
        Some(mime) => mime.to_string(),
        None => sniff_content_type(&mut file).await?.to_string(),
    };

    build_file_response(ctx, file, size, &validators, &content_type, guard).await
}

/// Sniff the type from the first bytes of `file`, then rewind it
async fn sniff_content_type(file: &mut File) -> io::Result<&'static str> {
    let mut buf = [0u8; sniff::SNIFF_LEN];
    let mut filled = 0;
    while filled < buf.len() {
        let n = file.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    file.seek(SeekFrom::Start(0)).await?;
    Ok(sniff::detect_content_type(&buf[..filled]))
}

/// Join a decoded relative path onto `root` without touching the filesystem
///
/// Rejects empty paths, absolute components, `..` and NUL bytes.
pub fn resolve_path(root: &Path, relative: &str) -> Result<PathBuf, DownloadError> {
    if relative.contains('\0') {
        return Err(DownloadError::InvalidPath(relative.to_string()));
    }

    let mut result = root.to_path_buf();
    let mut depth = 0usize;
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(name) => {
                result.push(name);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(DownloadError::InvalidPath(relative.to_string()));
            }
        }
    }

    if depth == 0 {
        return Err(DownloadError::NotFound(relative.to_string()));
    }
    Ok(result)
}

/// Canonicalize `candidate` and make sure it is still inside `root`
///
/// `root` must be canonical. Symlinks pointing out of the root are refused.
pub async fn verify_within_root(
    root: &Path,
    candidate: &Path,
    relative: &str,
) -> Result<PathBuf, DownloadError> {
    let canonical = match fs::canonicalize(candidate).await {
        Ok(p) => p,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(DownloadError::NotFound(relative.to_string()));
        }
        Err(e) => return Err(DownloadError::Io(e)),
    };
    if !canonical.starts_with(root) {
        return Err(DownloadError::OutsideRoot(canonical));
    }
    Ok(canonical)
}

async fn build_file_response(
    ctx: &RequestContext<'_>,
    mut file: File,
    size: u64,
    validators: &Validators,
    content_type: &str,
    guard: OwnedMutexGuard<()>,
) -> Result<HttpResponse, DownloadError> {
    let last_modified = validators.last_modified();

    if validators.precondition_failed(ctx.if_match.as_deref(), ctx.if_unmodified_since.as_deref()) {
        return Ok(http::build_412_response());
    }

    if validators.is_not_modified(ctx.if_none_match.as_deref(), ctx.if_modified_since.as_deref())
    {
        return Ok(http::build_304_response(
            &validators.etag,
            last_modified.as_deref(),
        ));
    }

    let range = if validators.range_allowed(ctx.if_range.as_deref()) {
        http::parse_range_header(ctx.range_header.as_deref(), size)
    } else {
        RangeParseResult::None
    };

    let (status, start, length) = match range {
        RangeParseResult::Valid(r) => (StatusCode::PARTIAL_CONTENT, r.start, r.length()),
        RangeParseResult::NotSatisfiable => return Ok(http::build_416_response(size)),
        RangeParseResult::None => (StatusCode::OK, 0, size),
    };

    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, length)
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::ETAG, validators.etag.as_str());
    if let Some(lm) = &last_modified {
        builder = builder.header(header::LAST_MODIFIED, lm.as_str());
    }
    if status == StatusCode::PARTIAL_CONTENT {
        builder = builder.header(
            header::CONTENT_RANGE,
            http::ByteRange {
                start,
                end: start + length - 1,
            }
            .content_range(size),
        );
    }

    let body = if ctx.is_head {
        http::empty()
    } else {
        if start > 0 {
            file.seek(SeekFrom::Start(start)).await?;
        }
        let chunks = ReaderStream::with_capacity(file.take(length), CHUNK_SIZE);
        let guarded = Guarded {
            inner: chunks,
            _guard: guard,
        };
        StreamBody::new(guarded.map_ok(Frame::data)).boxed_unsync()
    };

    Ok(builder.body(body)?)
}

/// Stream wrapper that keeps the download guard locked while it is alive
struct Guarded<S> {
    inner: S,
    _guard: OwnedMutexGuard<()>,
}

impl<S> Stream for Guarded<S>
where
    S: Stream<Item = io::Result<Bytes>> + Unpin,
{
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

fn error_response(error: &DownloadError) -> HttpResponse {
    match error.status_code() {
        StatusCode::BAD_REQUEST => http::build_400_response(),
        StatusCode::FORBIDDEN => http::build_403_response(),
        StatusCode::NOT_FOUND => http::build_404_response(),
        _ => http::build_500_response("500 Internal Server Error"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_path_normal() {
        let root = Path::new("/srv/share");
        assert_eq!(
            resolve_path(root, "sub/b.png").unwrap(),
            PathBuf::from("/srv/share/sub/b.png")
        );
        assert_eq!(
            resolve_path(root, "./a.txt").unwrap(),
            PathBuf::from("/srv/share/a.txt")
        );
    }

    #[test]
    fn test_resolve_path_rejects_traversal() {
        let root = Path::new("/srv/share");
        for bad in ["../etc/passwd", "sub/../../x", "/etc/passwd", "a\0b"] {
            assert!(
                matches!(resolve_path(root, bad), Err(DownloadError::InvalidPath(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_resolve_path_empty() {
        let root = Path::new("/srv/share");
        assert!(matches!(resolve_path(root, ""), Err(DownloadError::NotFound(_))));
        assert!(matches!(resolve_path(root, "."), Err(DownloadError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_verify_within_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::write(root.join("a.txt"), "a").unwrap();

        let ok = verify_within_root(&root, &root.join("a.txt"), "a.txt").await;
        assert_eq!(ok.unwrap(), root.join("a.txt"));

        let missing = verify_within_root(&root, &root.join("nope"), "nope").await;
        assert!(matches!(missing, Err(DownloadError::NotFound(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_verify_detects_symlink_escape() {
        use std::os::unix::fs::symlink;

        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let outside = TempDir::new().unwrap();
        std::fs::write(outside.path().join("secret.txt"), "secret").unwrap();
        symlink(outside.path(), root.join("escape")).unwrap();

        let candidate = resolve_path(&root, "escape/secret.txt").unwrap();
        let result = verify_within_root(&root, &candidate, "escape/secret.txt").await;
        assert!(matches!(result, Err(DownloadError::OutsideRoot(_))));
    }
}
