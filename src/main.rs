use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use numsed::{compile, format_error, Config};

#[derive(Parser, Debug)]
#[command(name = "numsed")]
#[command(about = "Compile an opcode listing into a script for `sed -n -E`")]
struct Cli {
    /// IR listing to compile
    input: PathBuf,

    /// Write the script here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Dump both registers at every TRACE instruction
    #[arg(long)]
    trace: bool,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "numsed=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let source = match fs::read_to_string(&cli.input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to read {}: {e}", cli.input.display());
            process::exit(1);
        }
    };

    let config = Config { trace: cli.trace };
    let script = match compile(&source, &config) {
        Ok(script) => script,
        Err(e) => {
            eprintln!("{}: {}", cli.input.display(), format_error(&source, &e));
            process::exit(1);
        }
    };

    let written = match &cli.output {
        Some(path) => fs::write(path, &script),
        None => io::stdout().lock().write_all(script.as_bytes()),
    };
    if let Err(e) = written {
        eprintln!("Failed to write script: {e}");
        process::exit(1);
    }
    info!(lines = script.lines().count(), "script written");
}
