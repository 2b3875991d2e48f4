//! # ltng-conf
//!
//! Settings for the ltng dev server, static build and bundler.
//!
//! Values are layered, each layer overriding the one before it:
//!
//! 1. built-in defaults ([`Settings::default`])
//! 2. a TOML file (`ltng.toml` in the working directory, or an explicit path)
//! 3. `LTNG_*` environment variables
//! 4. command-line flags, passed in as [`SettingsOverrides`]
//!
//! ## Example
//!
//! ```
//! use ltng_conf::{Mode, Settings, SettingsOverrides};
//!
//! let mut settings: Settings = toml::from_str(r#"
//! mode = "ssr"
//! port = 8080
//! "#).unwrap();
//! settings.apply_overrides(SettingsOverrides {
//! 	port: Some(4000),
//! 	..Default::default()
//! });
//! assert_eq!(settings.mode, Mode::Ssr);
//! assert_eq!(settings.port, 4000);
//! ```

mod error;
mod loader;
mod mode;
mod settings;

pub use error::{SettingsError, SettingsResult};
pub use loader::{CONFIG_FILE_NAME, ENV_PREFIX, SettingsLoader};
pub use mode::Mode;
pub use settings::{BundleSettings, Settings, SettingsOverrides};
