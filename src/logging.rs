use std::env;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use env_logger::{Builder, Target};
use log::LevelFilter;

/// Where the dashboard writes its diagnostic log.
pub fn default_log_path() -> PathBuf {
    if let Ok(path) = env::var("VOLTRIX_LOG_FILE")
        && !path.trim().is_empty()
    {
        return PathBuf::from(path);
    }
    let base = env::var("XDG_STATE_HOME")
        .ok()
        .filter(|dir| !dir.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| env::var("HOME").ok().map(|home| PathBuf::from(home).join(".local/state")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("voltrix_admin").join("voltrix_admin.log")
}

fn builder() -> Builder {
    let mut builder = Builder::new();
    builder.format(|formatter, record| {
        writeln!(
            formatter,
            "{} [{}] ({}): {}",
            Local::now().format("%Y-%m-%d %H:%M:%S %z"),
            record.level(),
            record.target(),
            record.args()
        )
    });

    if let Ok(var) = env::var("RUST_LOG") {
        builder.parse_filters(&var);
    } else {
        builder.filter(None, LevelFilter::Info);
    }
    builder
}

/// Appends to `path`; the terminal belongs to the dashboard while it runs.
pub fn init_file_logger(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log dir {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;

    builder()
        .target(Target::Pipe(Box::new(file)))
        .try_init()
        .context("logger already initialised")
}

pub fn init_stderr_logger() {
    let _ = builder().target(Target::Stderr).try_init();
}
