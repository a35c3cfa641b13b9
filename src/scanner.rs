//! Directory scanning
//!
//! Walks the shared root and produces the relative paths of every regular
//! file below it. The result is recomputed on every call; nothing is cached.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{ScanError, ShareError};
use crate::logger;

/// A regular file, named by its `/`-joined path relative to the root
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileEntry {
    relative: String,
}

impl FileEntry {
    pub fn new(relative: impl Into<String>) -> Self {
        Self {
            relative: relative.into(),
        }
    }

    /// Build an entry from a path below `root`; `None` if `path` is not inside it
    pub fn from_paths(root: &Path, path: &Path) -> Option<Self> {
        let rel = path.strip_prefix(root).ok()?;
        let parts: Vec<String> = rel
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        if parts.is_empty() {
            return None;
        }
        Some(Self::new(parts.join("/")))
    }

    pub fn as_str(&self) -> &str {
        &self.relative
    }

    /// Last path segment
    pub fn file_name(&self) -> &str {
        self.relative
            .rsplit('/')
            .next()
            .unwrap_or(&self.relative)
    }

    /// Lowercased extension without the dot
    pub fn extension(&self) -> Option<String> {
        Path::new(self.file_name())
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }

    /// URL of the download route, each segment percent-encoded
    pub fn download_href(&self) -> String {
        let encoded: Vec<_> = self
            .relative
            .split('/')
            .map(|seg| urlencoding::encode(seg).into_owned())
            .collect();
        format!("{}{}", crate::download::DOWNLOAD_PREFIX, encoded.join("/"))
    }
}

impl fmt::Display for FileEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.relative)
    }
}

/// Canonicalize the configured directory and check it is a directory
pub fn resolve_root(dir: &Path) -> Result<PathBuf, ShareError> {
    let root = dir.canonicalize().map_err(|source| ShareError::RootNotFound {
        path: dir.to_path_buf(),
        source,
    })?;
    if !root.is_dir() {
        return Err(ShareError::RootNotDirectory(root));
    }
    Ok(root)
}

/// Recursively list all regular files under `root`
///
/// Order follows the walk and is not sorted. An error on the root itself
/// aborts the scan; errors on nested entries skip that entry with a warning.
pub fn scan_directory(root: &Path) -> Result<Vec<FileEntry>, ScanError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) if e.depth() == 0 => {
                return Err(ScanError::Root {
                    path: root.to_path_buf(),
                    source: e,
                });
            }
            Err(e) => {
                logger::log_warning(&format!("Skipping unreadable entry: {e}"));
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        if let Some(file) = FileEntry::from_paths(root, entry.path()) {
            files.push(file);
        }
    }

    Ok(files)
}

/// Run [`scan_directory`] on the blocking pool
pub async fn scan_directory_async(root: PathBuf) -> Result<Vec<FileEntry>, ScanError> {
    tokio::task::spawn_blocking(move || scan_directory(&root))
        .await
        .map_err(|e| ScanError::Task(e.to_string()))?
}
