use tracing_subscriber::EnvFilter;

use crate::error::{CommandError, CommandResult};

/// Installs the global tracing subscriber.
///
/// `-v` flags win over `RUST_LOG`; without them `RUST_LOG` is honoured and
/// `info` is the fallback.
pub fn init_logging(verbosity: u8) -> CommandResult<()> {
	let filter = match verbosity {
		0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
		1 => EnvFilter::new("debug"),
		_ => EnvFilter::new("trace"),
	};
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(verbosity > 0)
		.compact()
		.try_init()
		.map_err(|e| CommandError::Logging(e.to_string()))
}
