use anyhow::Result;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const ENV_KEY: &str = "FRAGMAP_LOG";

/// Where TUI-mode log events are appended.
pub fn log_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|p| p.join("fragmap").join("fragmap.log"))
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(ENV_KEY).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Log to stderr (report / JSON modes).
pub fn init_stderr() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to initialize logger: {err}"))
}

/// Log to the data-dir file so events never land on the alternate screen.
/// Falls back to discarding events when no data dir is writable.
pub fn init_file() -> Result<()> {
    let file = log_path().and_then(|path| {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        OpenOptions::new().create(true).append(true).open(path).ok()
    });
    let Some(file) = file else {
        return Ok(());
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to initialize file logger: {err}"))
}
