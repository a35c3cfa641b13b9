use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::Notify;

use fileshare::cli::Cli;
use fileshare::config::Config;
use fileshare::error::ShareError;
use fileshare::state::AppState;
use fileshare::{logger, net, scanner, server};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logger::log_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), ShareError> {
    let cli = Cli::parse();
    let cfg = Config::load(&cli)?;
    logger::init(&cfg.logging)?;

    // Worker thread count follows the config, defaulting to CPU cores
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), ShareError> {
    let root = scanner::resolve_root(&cfg.share.directory)?;

    // An unreadable root is fatal at startup; later scans only fail the request
    let files = scanner::scan_directory_async(root.clone()).await?;

    let addr = cfg.socket_addr()?;
    let listener = server::bind_listener(addr, cfg.performance.backlog)?;
    let base_url = net::base_url(addr.port());

    let state = Arc::new(AppState::new(cfg, root));
    logger::log_server_start(&addr, &base_url, &state, files.len());

    let shutdown = Arc::new(Notify::new());
    server::start_signal_handler(Arc::clone(&shutdown));

    server::run(listener, state, shutdown).await;
    Ok(())
}
