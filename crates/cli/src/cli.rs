use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "tandem")]
#[command(about = "Run selection scenarios described in TOML")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Verbose logging
	#[arg(short, long, global = true)]
	pub verbose: bool,

	/// Subcommand to execute.
	#[command(subcommand)]
	pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
	/// Set up the scenario, run its steps and print every delivered event
	Run {
		/// Scenario file
		#[arg(value_name = "FILE")]
		file: PathBuf,
	},
	/// Validate the items and collections of a scenario without running it
	Check {
		/// Scenario file
		#[arg(value_name = "FILE")]
		file: PathBuf,
	},
}
