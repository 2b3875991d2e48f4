//! Error types for page rendering

use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by a [`ScriptEngine`](crate::ScriptEngine).
#[derive(Debug, Error)]
pub enum ScriptError {
	/// The engine could not be set up
	#[error("failed to initialize script engine: {0}")]
	Init(String),

	/// A script threw or failed to parse
	#[error("script {origin} failed: {message}")]
	Execution { origin: String, message: String },

	#[error("failed to read prelude {}: {source}", path.display())]
	Prelude {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

/// Failures that abort a whole render.
///
/// Problems with individual scripts or modules do not abort a render; they are
/// reported as [`Diagnostic`](crate::Diagnostic)s instead.
#[derive(Debug, Error)]
pub enum RenderError {
	#[error("failed to read page {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error(transparent)]
	Engine(#[from] ScriptError),
}

pub type ScriptResult<T> = Result<T, ScriptError>;

pub type RenderResult<T> = Result<T, RenderError>;
