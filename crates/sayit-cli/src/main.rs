mod cmd_import;
mod cmd_parse;
mod cmd_sources;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sayit_scrapers::Source;

#[derive(Parser)]
#[command(name = "sayit", version, about = "Import speech transcripts into SayIt")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the transcript sources and their instances
    Sources,
    /// Parse one transcript and print its speeches as JSON lines
    Parse {
        /// Source grammar (scsl, leveson, federal_reserve, philadelphia)
        #[arg(long)]
        source: Source,
        /// Extracted transcript text
        file: PathBuf,
        /// Document date (YYYY-MM-DD), when the file name has none
        #[arg(long)]
        date: Option<String>,
    },
    /// Import transcripts (dry run unless --commit)
    Import {
        /// Source grammar (scsl, leveson, federal_reserve, philadelphia)
        #[arg(long)]
        source: Source,
        /// Extracted transcript texts
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Write to the database
        #[arg(long)]
        commit: bool,
        /// Database path (default: per-user data dir)
        #[arg(long)]
        db: Option<PathBuf>,
        /// JSON config file (default: ./sayit.json if present)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Prefix for instance labels
        #[arg(long)]
        instance_prefix: Option<String>,
    },
    /// Show documents already imported
    Imports {
        /// Database path (default: per-user data dir)
        #[arg(long)]
        db: Option<PathBuf>,
        /// JSON config file (default: ./sayit.json if present)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Sources => cmd_sources::execute(),
        Command::Parse { source, file, date } => {
            cmd_parse::execute(source, &file, date.as_deref())
        }
        Command::Import {
            source,
            files,
            commit,
            db,
            config,
            instance_prefix,
        } => cmd_import::execute(&cmd_import::ImportParams {
            source,
            files: &files,
            commit,
            db: db.as_deref(),
            config: config.as_deref(),
            instance_prefix: instance_prefix.as_deref(),
        }),
        Command::Imports { db, config } => cmd_import::history(db.as_deref(), config.as_deref()),
    }
}
