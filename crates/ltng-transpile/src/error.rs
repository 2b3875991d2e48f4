//! Transpiler errors

use std::path::PathBuf;

pub type TranspileResult<T> = Result<T, TranspileError>;

#[derive(Debug, thiserror::Error)]
pub enum TranspileError {
	/// The body of an import map script is not valid JSON
	#[error("Invalid import map: {0}")]
	ImportMap(#[from] serde_json::Error),

	#[error("Failed to read {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}
