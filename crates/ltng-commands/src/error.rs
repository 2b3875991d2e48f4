use ltng_conf::Mode;

/// Errors that end a command with a failure exit status.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
	#[error(transparent)]
	Settings(#[from] ltng_conf::SettingsError),

	#[error("build is only supported in ssg mode (current mode: {0})")]
	BuildRequiresSsg(Mode),

	#[error(transparent)]
	Static(#[from] ltng_static::StaticError),

	#[error(transparent)]
	Server(#[from] ltng_server::ServerError),

	#[error(transparent)]
	Transpile(#[from] ltng_transpile::TranspileError),

	#[error("no bundle named {0:?} in the settings")]
	UnknownBundle(String),

	#[error("no bundles configured; add a [[bundle]] table to ltng.toml")]
	NoBundles,

	#[error("cannot resolve listen address {address}")]
	Address {
		address: String,
		#[source]
		source: Option<std::io::Error>,
	},

	#[error("cannot install logger: {0}")]
	Logging(String),

	#[error(transparent)]
	Io(#[from] std::io::Error),
}

pub type CommandResult<T> = Result<T, CommandError>;
