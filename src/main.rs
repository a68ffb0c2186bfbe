mod analyzer;
mod app;
mod collectors;
mod config;
mod error;
mod input;
mod models;
mod store;
mod ui;
mod util;

use analyzer::Analyzer;
use app::App;
use anyhow::{bail, Result};
use clap::{CommandFactory, Parser, ValueEnum};
use clap_complete::Shell;
use collectors::walk::WalkOptions;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use models::extent::BlockSize;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::panic;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
enum RankBy {
    Extents,
    Size,
}

#[derive(Parser, Debug)]
#[command(name = "fragmap", about = "Map file extents onto disk blocks and find fragmented files", version)]
struct Cli {
    /// Directory tree (or single file) to scan
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Number of files in the top lists (default from config)
    #[arg(short = 'n', long)]
    top: Option<usize>,

    /// Ranking for --json / --report top lists
    #[arg(long, value_enum, default_value_t = RankBy::Extents)]
    by: RankBy,

    /// List files overlapping blocks [START, END) and exit
    #[arg(long, num_args = 2, value_names = ["START", "END"])]
    range: Option<Vec<u64>>,

    /// Print a JSON snapshot of the scan and exit
    #[arg(long)]
    json: bool,

    /// With --range, one row per extent; with --json, include every file
    #[arg(short = 'a', long)]
    all: bool,

    /// Print a human-readable fragmentation report and exit
    #[arg(long)]
    report: bool,

    /// Block unit in bytes (default from config, 4096)
    #[arg(short = 'b', long)]
    block_size: Option<u64>,

    /// Initial blocks per map cell
    #[arg(short = 's', long)]
    scale: Option<u64>,

    /// Color theme: default, dracula, gruvbox, nord
    #[arg(short = 't', long)]
    theme: Option<String>,

    /// Print config file path and current values, then exit
    #[arg(long)]
    config: bool,

    /// Print shell completions and exit
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "fragmap", &mut io::stdout());
        return Ok(());
    }

    let headless = cli.json || cli.report || cli.range.is_some() || cli.config;
    if headless {
        util::log::init_stderr()?;
    } else {
        util::log::init_file()?;
    }

    let mut cfg = config::Config::load();
    if let Some(bs) = cli.block_size {
        if BlockSize::new(bs).is_none() {
            bail!("--block-size must be non-zero");
        }
        cfg.general.block_size = bs;
    }
    let top_k = cli.top.unwrap_or(cfg.general.top_k).max(1);

    if cli.config {
        return run_print_config(&cfg);
    }
    if let Some(range) = &cli.range {
        return run_range(&cfg, &cli.path, range[0], range[1], cli.all);
    }
    if cli.json {
        return run_json_snapshot(&cfg, &cli.path, top_k, cli.by, cli.all);
    }
    if cli.report {
        return run_report(&cfg, &cli.path, top_k);
    }

    let theme_name = cli.theme.as_deref().unwrap_or(&cfg.view.theme);
    let initial_theme = ui::theme::ThemeVariant::from_name(theme_name);

    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        original_hook(info);
    }));

    let result = run(cfg, &cli.path, initial_theme, cli.scale, top_k);
    restore_terminal()?;
    result
}

fn scanned(cfg: &config::Config, root: &Path) -> Result<Analyzer> {
    if std::fs::symlink_metadata(root).is_err() {
        bail!("cannot access {}", root.display());
    }
    let walk = WalkOptions { one_file_system: cfg.scan.one_file_system };
    let mut an = Analyzer::new(cfg.block_size(), cfg.scan.sync_before_map, walk);
    an.scan(root);
    Ok(an)
}

fn run_json_snapshot(cfg: &config::Config, root: &Path, top_k: usize, by: RankBy, all: bool) -> Result<()> {
    use serde_json::json;

    let an = scanned(cfg, root)?;
    let top = match by {
        RankBy::Extents => an.top_by_extent_count(top_k),
        RankBy::Size    => an.top_by_size(top_k),
    };
    let by_name = match by {
        RankBy::Extents => "extents",
        RankBy::Size    => "size",
    };

    let mut snapshot = json!({
        "fragmap_version": env!("CARGO_PKG_VERSION"),
        "timestamp":       chrono::Local::now().to_rfc3339(),
        "root":            an.root().map(|p| p.display().to_string()),
        "block_size":      an.block_size().bytes(),
        "device_blocks":   an.device_blocks().ok(),
        "stats":           an.last_scan(),
        "summary":         an.summary(),
        "top": {
            "by":    by_name,
            "files": top,
        },
    });
    if all {
        snapshot["files"] = serde_json::to_value(util::report::all_files(&an))?;
    }

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn run_report(cfg: &config::Config, root: &Path, top_k: usize) -> Result<()> {
    let an = scanned(cfg, root)?;
    print!("{}", util::report::generate(&an, top_k));
    Ok(())
}

fn run_range(cfg: &config::Config, root: &Path, start: u64, end: u64, per_extent: bool) -> Result<()> {
    let an = scanned(cfg, root)?;
    print!("{}", util::report::range_listing(&an, start, end, per_extent));
    Ok(())
}

fn run_print_config(cfg: &config::Config) -> Result<()> {
    let path = config::Config::config_path()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| "(unknown)".to_string());
    let log = util::log::log_path()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| "(disabled)".to_string());
    println!("Config: {}", path);
    println!("Log:    {}", log);
    println!();
    print!("{}", toml::to_string_pretty(cfg)?);
    Ok(())
}

fn run(
    cfg:   config::Config,
    root:  &Path,
    theme: ui::theme::ThemeVariant,
    scale: Option<u64>,
    top_k: usize,
) -> Result<()> {
    if std::fs::symlink_metadata(root).is_err() {
        bail!("cannot access {}", root.display());
    }

    // Scan before taking over the screen; large trees take a while.
    eprintln!("fragmap: scanning {}…", root.display());
    let mut app = App::new(&cfg, root, theme, scale, top_k);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut term = Terminal::new(backend)?;

    app.run(&mut term)?;

    Ok(())
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)?;
    Ok(())
}
