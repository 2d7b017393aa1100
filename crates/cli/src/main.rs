//! `tandem` scenario runner.
//!
//! Reads a TOML scenario (items, collections, steps), replays it against a
//! fresh [`tandem_select::Selections`] arena and prints what observers saw.

mod cli;
mod scenario;

use std::path::Path;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Command};
use scenario::{Runner, Scenario};

fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	match cli.command {
		Command::Run { file } => {
			let scenario = load(&file)?;
			let mut runner = Runner::new(&scenario).context("scenario setup failed")?;
			for (index, step) in scenario.steps.iter().enumerate() {
				let lines = runner
					.run_step(step)
					.with_context(|| format!("step {} ({}) failed", index + 1, step.op.name()))?;
				println!("#{} {}", index + 1, step.op.name());
				for line in lines {
					println!("  {line}");
				}
			}
		}
		Command::Check { file } => {
			let scenario = load(&file)?;
			let runner = Runner::new(&scenario).context("scenario setup failed")?;
			println!(
				"ok: {} items, {} collections, {} steps",
				runner.item_count(),
				runner.collection_count(),
				scenario.steps.len()
			);
		}
	}
	Ok(())
}

fn load(path: &Path) -> anyhow::Result<Scenario> {
	let text = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
	let scenario = Scenario::parse(&text).with_context(|| format!("invalid scenario {}", path.display()))?;
	tracing::info!(
		path = %path.display(),
		items = scenario.items.len(),
		collections = scenario.collections.len(),
		steps = scenario.steps.len(),
		"scenario loaded"
	);
	Ok(scenario)
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("tandem_select=trace,debug")
		} else {
			EnvFilter::new("warn")
		}
	});
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}
