//! Error types for static site output

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StaticError {
	/// The output directory could not be created. Fatal for a build.
	#[error("cannot create output directory {}: {source}", path.display())]
	OutputDir {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to read {}: {source}", path.display())]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to write {}: {source}", path.display())]
	Write {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to walk directory: {0}")]
	Walk(#[from] walkdir::Error),

	#[error(transparent)]
	Render(#[from] ltng_render::RenderError),

	/// A bundle target selected no input files
	#[error("bundle '{0}' has no input files")]
	EmptyBundle(String),
}

pub type StaticResult<T> = Result<T, StaticError>;

pub(crate) fn read_to_string(path: &std::path::Path) -> StaticResult<String> {
	std::fs::read_to_string(path).map_err(|source| StaticError::Read {
		path: path.to_path_buf(),
		source,
	})
}

/// Writes `contents`, creating parent directories first.
pub(crate) fn write_file(path: &std::path::Path, contents: impl AsRef<[u8]>) -> StaticResult<()> {
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent).map_err(|source| StaticError::Write {
			path: parent.to_path_buf(),
			source,
		})?;
	}
	std::fs::write(path, contents).map_err(|source| StaticError::Write {
		path: path.to_path_buf(),
		source,
	})
}
