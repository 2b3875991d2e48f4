//! Loading settings from file and environment

use std::path::{Path, PathBuf};

use crate::error::{SettingsError, SettingsResult};
use crate::settings::Settings;

/// File looked up in the working directory when no path is given
pub const CONFIG_FILE_NAME: &str = "ltng.toml";

/// Prefix of the environment variables read by [`SettingsLoader`]
pub const ENV_PREFIX: &str = "LTNG_";

/// Builds [`Settings`] from defaults, a TOML file and the environment.
///
/// # Examples
///
/// ```no_run
/// use ltng_conf::SettingsLoader;
///
/// let settings = SettingsLoader::new(".")
///     .with_config_file("site/ltng.toml")
///     .load()
///     .unwrap();
/// println!("serving on {}", settings.address());
/// ```
#[derive(Debug, Clone)]
pub struct SettingsLoader {
	base_dir: PathBuf,
	config_file: Option<PathBuf>,
	env_prefix: String,
	read_env: bool,
}

impl SettingsLoader {
	/// Loader rooted at `base_dir`, the directory relative paths resolve
	/// against and where `ltng.toml` is looked up.
	pub fn new(base_dir: impl Into<PathBuf>) -> Self {
		Self {
			base_dir: base_dir.into(),
			config_file: None,
			env_prefix: ENV_PREFIX.to_string(),
			read_env: true,
		}
	}

	/// Reads this file instead of `ltng.toml`. Unlike the default file it
	/// must exist.
	pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
		self.config_file = Some(path.into());
		self
	}

	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	/// Skips environment variables entirely.
	pub fn without_env(mut self) -> Self {
		self.read_env = false;
		self
	}

	/// Defaults, then the settings file, then the environment.
	///
	/// Paths are left as written; call [`Settings::resolve_paths`] once the
	/// command-line layer has been applied.
	pub fn load(&self) -> SettingsResult<Settings> {
		let mut settings = match &self.config_file {
			Some(path) => read_file(&self.base_dir.join(path))?,
			None => {
				let path = self.base_dir.join(CONFIG_FILE_NAME);
				if path.is_file() {
					read_file(&path)?
				} else {
					tracing::debug!(path = %path.display(), "no settings file, using defaults");
					Settings::default()
				}
			}
		};

		if self.read_env {
			settings.apply_env(&self.env_prefix, |name| std::env::var(name).ok())?;
		}
		Ok(settings)
	}
}

fn read_file(path: &Path) -> SettingsResult<Settings> {
	let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
		path: path.to_path_buf(),
		source,
	})?;
	let settings = toml::from_str(&text).map_err(|source| SettingsError::Parse {
		path: path.to_path_buf(),
		source,
	})?;
	tracing::debug!(path = %path.display(), "loaded settings file");
	Ok(settings)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Mode;
	use rstest::*;
	use tempfile::TempDir;

	#[rstest]
	fn test_missing_default_file_uses_defaults() {
		let dir = TempDir::new().unwrap();
		let settings = SettingsLoader::new(dir.path()).without_env().load().unwrap();
		assert_eq!(settings, Settings::default());
	}

	#[rstest]
	fn test_reads_default_file() {
		let dir = TempDir::new().unwrap();
		std::fs::write(dir.path().join(CONFIG_FILE_NAME), "mode = \"ssr\"\nport = 4000\n").unwrap();

		let settings = SettingsLoader::new(dir.path()).without_env().load().unwrap();

		assert_eq!(settings.mode, Mode::Ssr);
		assert_eq!(settings.port, 4000);
	}

	#[rstest]
	fn test_explicit_file_must_exist() {
		let dir = TempDir::new().unwrap();
		let err = SettingsLoader::new(dir.path())
			.with_config_file("custom.toml")
			.without_env()
			.load()
			.unwrap_err();
		assert!(matches!(err, SettingsError::Read { .. }));
	}

	#[rstest]
	fn test_parse_error_names_file() {
		let dir = TempDir::new().unwrap();
		std::fs::write(dir.path().join(CONFIG_FILE_NAME), "port = \"many\"").unwrap();

		let err = SettingsLoader::new(dir.path()).without_env().load().unwrap_err();

		assert!(err.to_string().starts_with("invalid settings file"));
		assert!(err.to_string().contains(CONFIG_FILE_NAME));
	}
}
