// Command-line arguments
// Both positional arguments are optional and override the loaded configuration

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "fileshare")]
#[command(about = "Share a directory over HTTP on the local network")]
#[command(version)]
pub struct Cli {
    /// Port to listen on (default: 8080)
    pub port: Option<u16>,

    /// Directory to share (default: ./file)
    pub directory: Option<PathBuf>,
}
