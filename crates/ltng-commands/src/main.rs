use std::process::ExitCode;

use clap::Parser;
use ltng_commands::{Cli, init_logging, run};

#[tokio::main]
async fn main() -> ExitCode {
	let cli = Cli::parse();
	if let Err(err) = init_logging(cli.verbose) {
		eprintln!("{err}");
	}

	match run(cli).await {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			tracing::error!("{err}");
			ExitCode::FAILURE
		}
	}
}
