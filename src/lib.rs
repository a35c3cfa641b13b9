//! fileshare - share a directory over HTTP on the local network
//!
//! `GET /` lists every regular file under the shared root, and
//! `GET /download/<path>` streams one of them back with range and
//! conditional-request support.

pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod handler;
pub mod http;
pub mod listing;
pub mod logger;
pub mod net;
pub mod scanner;
pub mod server;
pub mod state;

pub use config::Config;
pub use error::ShareError;
pub use state::AppState;
