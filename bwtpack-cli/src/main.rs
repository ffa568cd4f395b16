//! bwtpack CLI - block-sorting compression from the command line
//!
//! Compresses files with the BWT → MTF → RLE → Huffman pipeline, one frame
//! per block.

mod commands;
mod utils;

use clap::{ArgAction, Parser, Subcommand};
use commands::{cmd_compress, cmd_decompress, cmd_info, cmd_test};
use log::LevelFilter;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bwtpack")]
#[command(author, version, about = "Block-sorting compressor (BWT, MTF, RLE, Huffman)")]
#[command(long_about = "
bwtpack splits input into blocks and compresses each one with the
Burrows-Wheeler Transform, Move-to-Front, run-length and Huffman coding.

Examples:
  bwtpack compress notes.txt
  bwtpack compress -b 1048576 -j 4 big.log -o big.bwp
  bwtpack decompress notes.txt.bwp
  bwtpack test notes.txt.bwp
  bwtpack info --json notes.txt.bwp
")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file
    #[command(alias = "c")]
    Compress {
        /// File to compress
        input: PathBuf,

        /// Output file (default: <input>.bwp)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Block size in bytes
        #[arg(short, long, default_value_t = bwtpack::DEFAULT_BLOCK_SIZE)]
        block_size: usize,

        /// Worker threads (0 = one per CPU)
        #[arg(short = 'j', long, default_value_t = 0)]
        threads: usize,

        /// Show progress bar
        #[arg(short = 'P', long)]
        progress: bool,
    },

    /// Decompress a file
    #[command(alias = "d")]
    Decompress {
        /// File to decompress
        input: PathBuf,

        /// Output file (default: input without .bwp, or <input>.out)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Show progress bar
        #[arg(short = 'P', long)]
        progress: bool,
    },

    /// Decode every block and report failures without writing output
    #[command(alias = "t")]
    Test {
        /// Compressed file to test
        input: PathBuf,
    },

    /// Show frame information for a compressed file
    #[command(alias = "i")]
    Info {
        /// Compressed file to inspect
        input: PathBuf,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },
}

fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so they never mix with command output.
    if let Err(e) = TermLogger::init(
        log_level(cli.verbose),
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    let result = match cli.command {
        Commands::Compress {
            input,
            output,
            block_size,
            threads,
            progress,
        } => cmd_compress(&input, output.as_deref(), block_size, threads, progress),
        Commands::Decompress {
            input,
            output,
            progress,
        } => cmd_decompress(&input, output.as_deref(), progress),
        Commands::Test { input } => cmd_test(&input, cli.verbose > 0),
        Commands::Info { input, json } => cmd_info(&input, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
