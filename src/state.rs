// Application state
// Built once at startup and shared with every request handler through an Arc

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::config::Config;

/// Process-wide state, immutable after construction
pub struct AppState {
    pub config: Config,
    /// Canonical absolute path of the shared directory
    root: PathBuf,
    started_at: Instant,
    started_wall: DateTime<Local>,
    /// Serializes download bodies against each other
    download_guard: Arc<Mutex<()>>,
}

impl AppState {
    /// `root` must already be canonical (see [`crate::scanner::resolve_root`])
    pub fn new(config: Config, root: PathBuf) -> Self {
        Self {
            config,
            root,
            started_at: Instant::now(),
            started_wall: Local::now(),
            download_guard: Arc::new(Mutex::new(())),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub const fn started_at(&self) -> DateTime<Local> {
        self.started_wall
    }

    pub fn download_guard(&self) -> Arc<Mutex<()>> {
        Arc::clone(&self.download_guard)
    }
}
