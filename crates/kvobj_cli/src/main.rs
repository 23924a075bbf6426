//! KvObj CLI
//!
//! Command-line tools for inspecting object-store output frames.
//!
//! # Commands
//!
//! - `decode` - Decode a serialized output frame
//! - `version` - Show version information

mod commands;

use clap::{Parser, Subcommand};
use commands::decode::DecodeMode;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// KvObj command-line tools.
#[derive(Parser)]
#[command(name = "kvobj")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a serialized output frame
    Decode {
        /// How to interpret the frame
        #[arg(short, long, value_enum, default_value_t = DecodeMode::Array)]
        mode: DecodeMode,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Decode from a rented block instead of an inline footer
        #[arg(short, long)]
        rented: bool,

        /// Frame file, or `-` for stdin
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Decode {
            mode,
            format,
            rented,
            input,
        } => {
            commands::decode::run(&input, mode, rented, &format)?;
        }
        Commands::Version => {
            println!("KvObj CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("KvObj Core v{}", kvobj_core::VERSION);
        }
    }

    Ok(())
}
