//! Settings errors

use std::path::PathBuf;

/// Errors raised while loading or validating settings.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("cannot read settings file {path}: {source}")]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("invalid settings file {path}: {source}")]
	Parse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("invalid value {value:?} for {name}: {reason}")]
	InvalidEnv {
		name: String,
		value: String,
		reason: String,
	},

	#[error("unknown mode {0:?} (expected csr, ssr or ssg)")]
	UnknownMode(String),

	#[error("invalid settings: {0}")]
	Invalid(String),
}

pub type SettingsResult<T> = Result<T, SettingsError>;
