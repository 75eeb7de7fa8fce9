//! `veille` maintenance CLI.
//!
//! # Responsibility
//! - Load the built-in demo catalog into a database file.
//! - Print catalog statistics and verify core linkage.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::path::{Path, PathBuf};
use veille_core::db::open_db;
use veille_core::{default_log_level, init_logging, FactService, SqliteFactRepository};

#[derive(Debug, Parser)]
#[command(name = "veille", version, about = "Maintenance tasks for the Veille fact catalog")]
struct Cli {
    /// SQLite database file, created and migrated when missing.
    #[arg(long, env = "VEILLE_DB_PATH", default_value = "veille.sqlite3", global = true)]
    db_path: PathBuf,

    #[arg(long, env = "VEILLE_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; stderr when unset.
    #[arg(long, env = "VEILLE_LOG_DIR", global = true)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or_else(|| default_log_level())
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replace every stored fact with the built-in catalog.
    LoadFacts,
    /// Print totals per technology.
    Stats,
    /// Print core linkage info.
    Ping,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level(), cli.log_dir.as_deref()).map_err(anyhow::Error::msg)?;

    match cli.command {
        Command::Ping => {
            println!("veille_core ping={}", veille_core::ping());
            println!("veille_core version={}", veille_core::core_version());
        }
        Command::LoadFacts => {
            let conn = open_db(&cli.db_path).with_context(|| open_failure(&cli.db_path))?;
            let service = FactService::new(SqliteFactRepository::try_new(&conn)?);
            let inserted = service.reload_seed_facts()?;
            info!("event=load_facts module=cli status=ok inserted={inserted}");
            println!("{inserted} facts loaded into {}", cli.db_path.display());
        }
        Command::Stats => {
            let conn = open_db(&cli.db_path).with_context(|| open_failure(&cli.db_path))?;
            let service = FactService::new(SqliteFactRepository::try_new(&conn)?);
            let stats = service.stats()?;
            println!("total_facts={}", stats.total_facts);
            for entry in stats.technologies {
                println!("{}\t{}", entry.count, entry.techno);
            }
        }
    }
    Ok(())
}

fn open_failure(path: &Path) -> String {
    format!("failed to open database `{}`", path.display())
}
