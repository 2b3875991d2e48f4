//! Non-fatal problems collected while rendering a page

use std::fmt;
use std::path::PathBuf;

/// Something that went wrong during a render without aborting it.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
	/// An import map script held invalid JSON and was ignored
	ImportMapInvalid { message: String },

	/// A script or module file does not exist; its load was skipped
	ModuleNotFound {
		specifier: String,
		importer: String,
		path: PathBuf,
	},

	/// Remote scripts are never fetched during a render
	RemoteModuleSkipped { url: String },

	/// A script threw; later scripts still run
	ScriptFailed { origin: String, message: String },

	TranspileWarning {
		file: String,
		line: usize,
		message: String,
	},

	/// The page has no `<body>` element to render into
	MissingBody,

	/// The page has no `<head>` but scripts added head content that was dropped
	MissingHead,
}

impl Diagnostic {
	/// Whether this diagnostic means part of the page did not render.
	pub fn is_error(&self) -> bool {
		matches!(
			self,
			Self::ModuleNotFound { .. } | Self::ScriptFailed { .. } | Self::MissingBody
		)
	}

	fn log(&self) {
		match self {
			Self::ModuleNotFound { path, .. } => {
				tracing::error!(path = %path.display(), "{self}");
			}
			Self::ScriptFailed { origin, .. } => {
				tracing::error!(origin = %origin, "{self}");
			}
			Self::MissingBody => tracing::error!("{self}"),
			Self::RemoteModuleSkipped { .. } => tracing::debug!("{self}"),
			_ => tracing::warn!("{self}"),
		}
	}
}

impl fmt::Display for Diagnostic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::ImportMapInvalid { message } => {
				write!(f, "invalid import map ignored: {message}")
			}
			Self::ModuleNotFound {
				specifier,
				importer,
				path,
			} => write!(
				f,
				"module not found: '{specifier}' imported by {importer} ({})",
				path.display()
			),
			Self::RemoteModuleSkipped { url } => write!(f, "remote module skipped: {url}"),
			Self::ScriptFailed { origin, message } => {
				write!(f, "error running {origin}: {message}")
			}
			Self::TranspileWarning {
				file,
				line,
				message,
			} => write!(f, "{file}:{line}: {message}"),
			Self::MissingBody => f.write_str("page has no <body> element; rendered markup was discarded"),
			Self::MissingHead => f.write_str("page has no <head> element; head additions were discarded"),
		}
	}
}

/// Ordered collection of diagnostics. Each entry is logged when recorded.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
	entries: Vec<Diagnostic>,
}

impl Diagnostics {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, diagnostic: Diagnostic) {
		diagnostic.log();
		self.entries.push(diagnostic);
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
		self.entries.iter()
	}

	pub fn has_errors(&self) -> bool {
		self.entries.iter().any(Diagnostic::is_error)
	}

	pub fn into_vec(self) -> Vec<Diagnostic> {
		self.entries
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_collects_in_order() {
		let mut diagnostics = Diagnostics::new();
		diagnostics.push(Diagnostic::RemoteModuleSkipped {
			url: "https://cdn.example.com/x.js".into(),
		});
		diagnostics.push(Diagnostic::MissingBody);

		assert_eq!(diagnostics.len(), 2);
		assert!(diagnostics.has_errors());
		assert_eq!(
			diagnostics.into_vec(),
			vec![
				Diagnostic::RemoteModuleSkipped {
					url: "https://cdn.example.com/x.js".into()
				},
				Diagnostic::MissingBody,
			]
		);
	}

	#[rstest]
	#[case(Diagnostic::TranspileWarning { file: "a.js".into(), line: 3, message: "nested braces".into() }, "a.js:3: nested braces")]
	#[case(Diagnostic::ScriptFailed { origin: "app.js".into(), message: "Error: boom".into() }, "error running app.js: Error: boom")]
	fn test_display(#[case] diagnostic: Diagnostic, #[case] expected: &str) {
		assert_eq!(diagnostic.to_string(), expected);
	}
}
