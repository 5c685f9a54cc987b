mod input;
mod render;
mod runtime;
mod ui;
mod upload;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use corkboard_core::config::CoreConfig;
use corkboard_core::logging::init_logging;
use corkboard_core::runtime::CoreRuntime;
use corkboard_core::SessionStorage;

use crate::runtime::run_app;
use crate::ui::App;

/// Live message board in the terminal.
#[derive(Parser)]
#[command(name = "corkboard")]
struct Args {
    /// Data directory for the stored session (defaults to the platform data dir)
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Blob server for image uploads
    #[arg(long)]
    blob_server: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    // Restore the terminal before showing a panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = ui::terminal::restore();
        eprintln!("{panic_info}");
        original_hook(panic_info);
    }));

    let mut config = match args.data_dir {
        Some(dir) => CoreConfig::new(dir),
        None => CoreConfig::default(),
    };
    if let Some(server) = args.blob_server {
        config.blob_server = server;
    }

    let mut core_runtime = CoreRuntime::new(config.clone())?;
    let session = SessionStorage::new(&config.data_dir);
    let mut app = App::new(
        core_runtime.store(),
        core_runtime.handle(),
        session,
        config.blob_server.clone(),
    );

    let mut terminal = ui::terminal::init()?;
    let result = run_app(&mut terminal, &mut app, &mut core_runtime).await;

    core_runtime.shutdown();
    ui::terminal::restore()?;

    if let Err(err) = result {
        eprintln!("Error: {err}");
    }

    Ok(())
}
