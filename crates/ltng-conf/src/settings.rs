//! Settings values and how layers combine

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{SettingsError, SettingsResult};
use crate::mode::Mode;

/// Default dev server port
pub const DEFAULT_PORT: u16 = 3000;

/// Default dev server bind address
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Everything the server, static build and bundler read.
///
/// Relative paths are taken relative to the working directory; see
/// [`Settings::resolve_paths`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
	pub mode: Mode,
	pub host: String,
	pub port: u16,
	/// Project root; the fallback lookup directory and the base for paths
	/// outside the source directory
	pub root: PathBuf,
	/// Directory holding the HTML pages
	pub src: PathBuf,
	/// Output directory of the static build
	pub dist: PathBuf,
	/// Transpile `.js` files when serving them in CSR mode
	pub transpile_js: bool,
	/// Scripts run before a page's own scripts when rendering
	pub preludes: Vec<PathBuf>,
	/// Origin used for `location` while rendering, e.g. `http://localhost:3000`
	pub origin: Option<String>,
	#[serde(rename = "bundle")]
	pub bundles: Vec<BundleSettings>,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			mode: Mode::default(),
			host: DEFAULT_HOST.to_string(),
			port: DEFAULT_PORT,
			root: PathBuf::from("."),
			src: PathBuf::from("."),
			dist: PathBuf::from("dist"),
			transpile_js: false,
			preludes: Vec::new(),
			origin: None,
			bundles: Vec::new(),
		}
	}
}

/// A `[[bundle]]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BundleSettings {
	pub name: String,
	/// Script files or directories, relative to the project root
	pub inputs: Vec<PathBuf>,
	/// Directories whose stylesheets form the CSS bundle
	#[serde(default)]
	pub css_inputs: Vec<PathBuf>,
	/// Output directory, relative to the project root; defaults to `dist`
	#[serde(default)]
	pub out_dir: Option<PathBuf>,
}

/// Command-line flags layered on top of everything else.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsOverrides {
	pub mode: Option<Mode>,
	pub host: Option<String>,
	pub port: Option<u16>,
	pub root: Option<PathBuf>,
	pub src: Option<PathBuf>,
	pub dist: Option<PathBuf>,
	pub transpile_js: Option<bool>,
	/// Appended after preludes from earlier layers
	pub preludes: Vec<PathBuf>,
	pub origin: Option<String>,
}

impl Settings {
	/// Overlays the environment variables found through `lookup`.
	///
	/// `lookup` receives full variable names (`LTNG_PORT`, ...). Recognised
	/// names are `<prefix>MODE`, `HOST`, `PORT`, `ROOT`, `SRC`, `DIST`,
	/// `TRANSPILE_JS` and `ORIGIN`.
	pub fn apply_env<F>(&mut self, prefix: &str, lookup: F) -> SettingsResult<()>
	where
		F: Fn(&str) -> Option<String>,
	{
		let var = |key: &str| {
			let name = format!("{prefix}{key}");
			lookup(&name).map(|value| (name, value))
		};

		if let Some((name, value)) = var("MODE") {
			self.mode = value.parse().map_err(|_| SettingsError::InvalidEnv {
				name,
				value: value.clone(),
				reason: "expected csr, ssr or ssg".to_string(),
			})?;
		}
		if let Some((_, value)) = var("HOST") {
			self.host = value;
		}
		if let Some((name, value)) = var("PORT") {
			self.port = value.trim().parse().map_err(|e: std::num::ParseIntError| {
				SettingsError::InvalidEnv {
					name,
					value: value.clone(),
					reason: e.to_string(),
				}
			})?;
		}
		if let Some((_, value)) = var("ROOT") {
			self.root = PathBuf::from(value);
		}
		if let Some((_, value)) = var("SRC") {
			self.src = PathBuf::from(value);
		}
		if let Some((_, value)) = var("DIST") {
			self.dist = PathBuf::from(value);
		}
		if let Some((name, value)) = var("TRANSPILE_JS") {
			self.transpile_js = parse_bool(&value).ok_or_else(|| SettingsError::InvalidEnv {
				name,
				value: value.clone(),
				reason: "expected a boolean".to_string(),
			})?;
		}
		if let Some((_, value)) = var("ORIGIN") {
			self.origin = Some(value);
		}
		Ok(())
	}

	pub fn apply_overrides(&mut self, overrides: SettingsOverrides) {
		let SettingsOverrides {
			mode,
			host,
			port,
			root,
			src,
			dist,
			transpile_js,
			preludes,
			origin,
		} = overrides;

		if let Some(mode) = mode {
			self.mode = mode;
		}
		if let Some(host) = host {
			self.host = host;
		}
		if let Some(port) = port {
			self.port = port;
		}
		if let Some(root) = root {
			self.root = root;
		}
		if let Some(src) = src {
			self.src = src;
		}
		if let Some(dist) = dist {
			self.dist = dist;
		}
		if let Some(transpile_js) = transpile_js {
			self.transpile_js = transpile_js;
		}
		self.preludes.extend(preludes);
		if origin.is_some() {
			self.origin = origin;
		}
	}

	/// Makes `root`, `src`, `dist` and prelude paths absolute against `base`.
	///
	/// Bundle inputs stay relative; they are resolved against `root` when
	/// the bundle runs.
	pub fn resolve_paths(&mut self, base: &Path) {
		self.root = base.join(&self.root);
		self.src = base.join(&self.src);
		self.dist = base.join(&self.dist);
		for prelude in &mut self.preludes {
			*prelude = base.join(&*prelude);
		}
	}

	/// Checks values no single layer can check on its own.
	pub fn validate(&self) -> SettingsResult<()> {
		if self.host.trim().is_empty() {
			return Err(SettingsError::Invalid("host must not be empty".to_string()));
		}
		let mut names = HashSet::new();
		for bundle in &self.bundles {
			if bundle.name.trim().is_empty() {
				return Err(SettingsError::Invalid("bundle name must not be empty".to_string()));
			}
			if !names.insert(bundle.name.as_str()) {
				return Err(SettingsError::Invalid(format!(
					"bundle {:?} is declared twice",
					bundle.name
				)));
			}
			if bundle.inputs.is_empty() {
				return Err(SettingsError::Invalid(format!(
					"bundle {:?} has no inputs",
					bundle.name
				)));
			}
		}
		Ok(())
	}

	/// Address the dev server binds, as `host:port`.
	pub fn address(&self) -> String {
		format!("{}:{}", self.host, self.port)
	}

	pub fn bundle(&self, name: &str) -> Option<&BundleSettings> {
		self.bundles.iter().find(|b| b.name == name)
	}
}

fn parse_bool(value: &str) -> Option<bool> {
	match value.trim().to_ascii_lowercase().as_str() {
		"true" | "1" | "yes" | "on" => Some(true),
		"false" | "0" | "no" | "off" => Some(false),
		_ => None,
	}
}
