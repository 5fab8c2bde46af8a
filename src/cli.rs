use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;
use crate::fields::{CompletionModel, DateFormat};

/// Homework tracker with a terminal UI.
/// Data lives in ~/.tugasku, $TUGAS_DIR, or the directory passed via --data-dir.
#[derive(Parser)]
#[command(name = "tugas", version, about = "Personal homework tracker")]
pub struct Cli {
    /// Directory holding tasks.json, completedTasks.json and config.toml.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Override the configured completion model.
    #[arg(long, global = true, value_enum)]
    pub completion_model: Option<CompletionModel>,

    /// Override the configured deadline format.
    #[arg(long, global = true, value_enum)]
    pub date_format: Option<DateFormat>,

    #[command(subcommand)]
    pub command: Commands,
}
