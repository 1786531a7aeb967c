use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// CLI arguments
#[derive(Parser)]
#[command(name = "ember", about = "The Ember language interpreter and Java translator.")]
pub struct Cli {
	/// Program mode
	#[command(subcommand)]
	pub mode: Mode,
}

/// Program mode
#[derive(Subcommand, Debug)]
pub enum Mode {
	/// Interpret a source file; the result of main becomes the exit code
	Run { path: PathBuf },
	/// Emit the Java rendition of a source file to stdout
	Translate { path: PathBuf },
}
