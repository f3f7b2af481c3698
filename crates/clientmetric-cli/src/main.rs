//! Client metrics frame inspector.
//!
//! Decodes captured delta frames and replays them into current values.

mod commands;
mod formatter;

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use formatter::OutputFormat;
use tracing_subscriber::EnvFilter;

/// Client metrics frame inspector
#[derive(Parser, Debug)]
#[command(name = "clientmetric")]
#[command(version, about = "Inspect client metrics delta frames")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Output format
    #[arg(long, default_value = "table", value_enum, global = true)]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print every record of every frame
    Decode {
        /// File with one frame per line (reads stdin if omitted)
        input: Option<PathBuf>,
    },
    /// Apply frames in order and print the resulting metric values
    Replay {
        /// File with one frame per line (reads stdin if omitted)
        input: Option<PathBuf>,

        /// Skip malformed frames instead of stopping
        #[arg(long)]
        skip_invalid: bool,
    },
}

/// Info and above for this binary's own events unless `RUST_LOG` says otherwise.
const DEFAULT_LOG_DIRECTIVE: &str = concat!(env!("CARGO_CRATE_NAME"), "=info");

fn log_filter() -> EnvFilter {
    EnvFilter::from_default_env().add_directive(DEFAULT_LOG_DIRECTIVE.parse().unwrap())
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(log_filter())
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let formatter = formatter::create_formatter(args.format);

    let output = match args.command {
        Command::Decode { input } => commands::decode(open_input(input.as_ref())?, &*formatter)?,
        Command::Replay {
            input,
            skip_invalid,
        } => commands::replay(open_input(input.as_ref())?, skip_invalid, &*formatter)?,
    };

    println!("{}", output);
    Ok(())
}

/// Open the input file, or stdin when no path is given.
fn open_input(path: Option<&PathBuf>) -> io::Result<Box<dyn BufRead>> {
    match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "reading frames from file");
            Ok(Box::new(BufReader::new(File::open(path)?)))
        }
        None => Ok(Box::new(io::stdin().lock())),
    }
}
