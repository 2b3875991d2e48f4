//! Script execution seam
//!
//! The renderer talks to JavaScript only through [`ScriptEngine`]. Every
//! render asks an [`EngineFactory`] for a fresh engine, so no script state
//! survives from one render to the next.
//!
//! What a page can see besides the DOM is passed in explicitly as a
//! [`ScriptEnvironment`] instead of being picked up from the process.

mod boa;
mod host;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use ltng_dom::Document;

use crate::error::{ScriptError, ScriptResult};

pub use boa::{BoaEngine, BoaEngineFactory};

/// A JavaScript sandbox bound to one mock document.
pub trait ScriptEngine {
	/// Runs `source` to completion. `origin` names the script in errors and
	/// logs.
	fn execute(&mut self, source: &str, origin: &str) -> ScriptResult<()>;

	/// Snapshot of the document as mutated so far.
	fn document(&self) -> Document;
}

/// Creates one engine per render.
pub trait EngineFactory: Send + Sync {
	fn create(&self, environment: &ScriptEnvironment) -> ScriptResult<Box<dyn ScriptEngine>>;
}

/// A script evaluated before any page script, such as the framework runtime.
#[derive(Debug, Clone)]
pub struct PreludeScript {
	pub name: String,
	pub source: Arc<str>,
}

/// Everything a page script can observe apart from the document.
///
/// # Examples
///
/// ```
/// use ltng_render::ScriptEnvironment;
///
/// let env = ScriptEnvironment::new()
/// 	.with_location("http://localhost:3000/about.html")
/// 	.with_global("API_BASE", "/api")
/// 	.with_fixed_time(0.0);
/// assert_eq!(env.location(), "http://localhost:3000/about.html");
/// ```
#[derive(Debug, Clone)]
pub struct ScriptEnvironment {
	location: String,
	preludes: Vec<PreludeScript>,
	globals: IndexMap<String, String>,
	random_seed: u32,
	fixed_time: Option<f64>,
}

impl ScriptEnvironment {
	pub fn new() -> Self {
		Self {
			location: "http://localhost/".to_string(),
			preludes: Vec::new(),
			globals: IndexMap::new(),
			random_seed: 0x2545_f491,
			fixed_time: None,
		}
	}

	/// URL exposed as `location`.
	pub fn with_location(mut self, location: impl Into<String>) -> Self {
		self.location = location.into();
		self
	}

	pub fn with_prelude(mut self, name: impl Into<String>, source: impl Into<Arc<str>>) -> Self {
		self.preludes.push(PreludeScript {
			name: name.into(),
			source: source.into(),
		});
		self
	}

	/// Reads a prelude script from disk.
	pub fn with_prelude_file(self, path: &Path) -> ScriptResult<Self> {
		let source = std::fs::read_to_string(path).map_err(|source| ScriptError::Prelude {
			path: path.to_path_buf(),
			source,
		})?;
		Ok(self.with_prelude(path.display().to_string(), source))
	}

	/// A string property defined on `window` before scripts run.
	pub fn with_global(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.globals.insert(name.into(), value.into());
		self
	}

	/// Seed for `crypto.getRandomValues`.
	pub fn with_random_seed(mut self, seed: u32) -> Self {
		self.random_seed = seed;
		self
	}

	/// Pins `Date.now()` to a fixed timestamp in milliseconds.
	pub fn with_fixed_time(mut self, millis: f64) -> Self {
		self.fixed_time = Some(millis);
		self
	}

	pub fn location(&self) -> &str {
		&self.location
	}

	pub fn preludes(&self) -> &[PreludeScript] {
		&self.preludes
	}

	pub fn globals(&self) -> &IndexMap<String, String> {
		&self.globals
	}

	pub fn random_seed(&self) -> u32 {
		self.random_seed
	}

	pub fn fixed_time(&self) -> Option<f64> {
		self.fixed_time
	}

	/// Location for a page file served from `src_dir` under `origin`.
	pub fn location_for(origin: &str, src_dir: &Path, page: &Path) -> String {
		let relative = page
			.strip_prefix(src_dir)
			.map(PathBuf::from)
			.unwrap_or_else(|_| page.file_name().map(PathBuf::from).unwrap_or_default());
		let path = relative
			.components()
			.map(|c| c.as_os_str().to_string_lossy().into_owned())
			.collect::<Vec<_>>()
			.join("/");
		format!("{}/{}", origin.trim_end_matches('/'), path)
	}
}

impl Default for ScriptEnvironment {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("/site/src/index.html", "http://localhost/index.html")]
	#[case("/site/src/docs/intro.html", "http://localhost/docs/intro.html")]
	#[case("/elsewhere/page.html", "http://localhost/page.html")]
	fn test_location_for(#[case] page: &str, #[case] expected: &str) {
		assert_eq!(
			ScriptEnvironment::location_for("http://localhost/", Path::new("/site/src"), Path::new(page)),
			expected
		);
	}
}
