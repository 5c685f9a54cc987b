use std::fs::OpenOptions;
use std::sync::Arc;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize tracing. The terminal owns stdout while the TUI runs, so
/// log lines only go anywhere when CORKBOARD_LOG_FILE points at a file;
/// otherwise tracing calls are no-ops. RUST_LOG filters as usual.
pub fn init_logging() {
    let Ok(log_path) = std::env::var("CORKBOARD_LOG_FILE") else {
        return;
    };
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) else {
        eprintln!("failed to open log file: {log_path}");
        return;
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = fmt::layer()
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(file_layer.with_filter(filter))
        .init();
}
