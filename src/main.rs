use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use asset_server::config::{self, AppState, Config};
use asset_server::server::{self, ShutdownSignal};
use asset_server::{logger, ServerError};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logger::log_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run() -> asset_server::Result<()> {
    // Relative asset paths resolve the same no matter where the shell is
    let root = enter_executable_dir()?;

    let cfg = Config::load()?;
    logger::init(&cfg)?;

    // Requests are handled one at a time; no worker threads needed
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cfg, root))
}

async fn async_main(cfg: Config, root: PathBuf) -> asset_server::Result<()> {
    let addr = config::listen_addr();
    let listener = server::bind_listener(addr)?;
    let mut signals = ShutdownSignal::register()?;

    logger::print_banner(addr.port());
    logger::log_debug(&format!("Serving {}", root.display()));

    let state = Arc::new(AppState::new(cfg, root));
    server::serve(listener, state, signals.recv()).await;

    logger::print_shutdown();
    Ok(())
}

/// Change the working directory to the one holding this executable
fn enter_executable_dir() -> asset_server::Result<PathBuf> {
    let exe = std::env::current_exe().map_err(|source| ServerError::WorkingDirectory {
        path: PathBuf::from("."),
        source,
    })?;
    let dir = exe
        .parent()
        .map_or_else(|| PathBuf::from("."), PathBuf::from);

    std::env::set_current_dir(&dir).map_err(|source| ServerError::WorkingDirectory {
        path: dir.clone(),
        source,
    })?;

    std::env::current_dir().map_err(|source| ServerError::WorkingDirectory { path: dir, source })
}
