use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use icpc_scoreboard::logging::init_tracing;
use icpc_scoreboard::services::config_loader::{load_scoreboard_config, resolve_config_path};
use icpc_scoreboard::services::{interpreter, snapshot};

#[derive(Parser)]
#[command(
    name = "icpc-scoreboard",
    version,
    about = "Replay an ICPC contest command stream and print the live scoreboard"
)]
struct Cli {
    /// Command file to replay. Reads stdin when omitted or `-`.
    input: Option<PathBuf>,
    /// TOML config. Defaults to `scoreboard.toml` in the working directory if present.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Write the final standings as JSON to this path.
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config_path = resolve_config_path(cli.config.as_deref());
    let config = load_scoreboard_config(config_path.as_deref())?;
    let _log_guard = init_tracing(&config.logging);

    match &config_path {
        Some(path) => info!("Loaded config from {}", path.display()),
        None => info!("No config file found, using defaults"),
    }

    let stdout = io::stdout();
    let out = BufWriter::new(stdout.lock());
    let mut contest = match cli.input.as_deref() {
        Some(path) if path.as_os_str() != "-" => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open input {}", path.display()))?;
            info!("Replaying {}", path.display());
            interpreter::run(BufReader::new(file), out, &config)?
        }
        _ => interpreter::run(io::stdin().lock(), out, &config)?,
    };

    let snapshot_path = cli
        .snapshot
        .or_else(|| config.snapshot.path.as_ref().map(PathBuf::from));
    if let Some(path) = snapshot_path {
        snapshot::write_snapshot(&path, &mut contest)?;
    }

    Ok(())
}
