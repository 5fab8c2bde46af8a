//! # TugasKu - homework tracker
//!
//! A small task tracker for school work: each task has a subject, a title and
//! an optional deadline. Tasks can be completed and deleted from a terminal UI
//! or straight from the command line.
//!
//! ## Completion models
//!
//! - **separate-list** (default): completing a task moves it into a completed
//!   list, stamped with the completion date.
//! - **flag**: each task keeps a `completed` flag that is toggled in place.
//!
//! ## Deadline formats
//!
//! - **numeric** (default): `05/03/2025`
//! - **long**: `5 Maret 2025`
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the UI
//! tugas ui
//!
//! # Add a task from the shell
//! tugas add Matematika "Latihan bab 3" --deadline friday
//!
//! # List, complete, delete
//! tugas list --all
//! tugas complete 1741150000000
//! tugas delete 1741150000000 --completed
//! ```
//!
//! Data is stored in `~/.tugasku/` (or `$TUGAS_DIR`, or `--data-dir`) as
//! `tasks.json` and `completedTasks.json`, next to an optional `config.toml`.

use clap::Parser;

pub mod actions;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod dates;
pub mod error;
pub mod fields;
pub mod form;
pub mod logging;
pub mod prompt;
pub mod storage;
pub mod store;
pub mod task;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod date_picker;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod task_form;
    pub mod transition;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use config::{resolve_data_dir, Config};

fn main() {
    let cli = Cli::parse();

    let data_dir = match resolve_data_dir(cli.data_dir.as_deref()) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    match &cli.command {
        Commands::Ui => logging::init_file(&data_dir),
        _ => logging::init_stderr(),
    }

    let config = match Config::load(&data_dir) {
        Ok(config) => config.with_overrides(cli.completion_model, cli.date_format),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Ui => cmd_ui(&data_dir, &config),
        Commands::Add { subject, title, deadline } => {
            cmd_add(&data_dir, &config, subject, title, deadline)
        }
        Commands::List { completed, all } => cmd_list(&data_dir, &config, completed, all),
        Commands::Edit { id, subject, title, deadline, clear_deadline, yes } => {
            cmd_edit(&data_dir, &config, id, subject, title, deadline, clear_deadline, yes)
        }
        Commands::Complete { id, yes } => cmd_complete(&data_dir, &config, id, yes),
        Commands::Delete { id, completed, yes } => cmd_delete(&data_dir, &config, id, completed, yes),
        Commands::Config => cmd_config(&data_dir, &config),
        Commands::Completions { shell } => cmd_completions(shell),
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
