//! MLB toolchain.
//!
//! ```text
//! USAGE:
//! mlb-rs [OPTIONS] <COMMAND>
//!
//! Commands:
//!   verify  Check a proof against its assumptions and claims
//!
//! Options:
//!   -d, --debug  Trace every executed instruction to stderr
//! ```
//!
//! The three inputs are files holding raw MLB instruction streams, in
//! the order assumptions (gamma), claims, proof. The process exits 0
//! when the proof establishes every claim and 1 otherwise; the
//! rejection reason is logged.

#![warn(bare_trait_objects)]
#![warn(elided_lifetimes_in_paths)]
#![warn(missing_copy_implementations, missing_debug_implementations)]
#![warn(future_incompatible, rust_2018_idioms)]
#![warn(trivial_numeric_casts)]
#![warn(unreachable_pub)]
#![warn(unused)]
#![warn(missing_docs)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{error, info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

#[derive(Debug, Parser)]
#[command(name = "mlb-rs", version, about = "Matching logic proof checker")]
struct Cli {
  /// Trace every executed instruction to stderr.
  #[arg(short, long)]
  debug: bool,
  #[command(subcommand)]
  command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
  /// Check a proof against its assumptions and claims.
  Verify {
    /// The assumptions (gamma) instruction stream.
    gamma: PathBuf,
    /// The claims instruction stream.
    claims: PathBuf,
    /// The proof instruction stream.
    proof: PathBuf,
  },
}

fn read_stream(path: &Path) -> Result<Vec<u8>, ExitCode> {
  std::fs::read(path).map_err(|e| {
    error!("cannot read {}: {e}", path.display());
    ExitCode::from(2)
  })
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  let level = if cli.debug { LevelFilter::Trace } else { LevelFilter::Info };
  let _ = TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto);

  match cli.command {
    Command::Verify { gamma, claims, proof } => {
      let (gamma, claims, proof) =
        match (read_stream(&gamma), read_stream(&claims), read_stream(&proof)) {
          (Ok(g), Ok(c), Ok(p)) => (g, c, p),
          (Err(code), ..) | (_, Err(code), _) | (.., Err(code)) => return code,
        };
      match mlb_kernel::verify_streams(&gamma, &claims, &proof) {
        Ok(()) => {
          info!("proof accepted");
          ExitCode::SUCCESS
        }
        Err(e) => {
          error!("proof rejected: {e}");
          ExitCode::FAILURE
        }
      }
    }
  }
}
