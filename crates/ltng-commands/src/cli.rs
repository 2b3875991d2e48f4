//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ltng_conf::{Mode, SettingsOverrides};

/// ltng development server and build tool
///
/// Without a subcommand the dev server is started. `--build` renders the
/// site into the output directory instead, and `--serve` builds (in ssg
/// mode) and then serves.
#[derive(Debug, Parser)]
#[command(name = "ltng")]
#[command(about = "Serve, pre-render and bundle ltng projects", long_about = None)]
#[command(version)]
pub struct Cli {
	#[command(subcommand)]
	pub command: Option<Command>,

	/// Render every page into the output directory and exit (ssg mode only)
	#[arg(long, conflicts_with = "serve")]
	pub build: bool,

	/// Build first when in ssg mode, then start the server
	#[arg(long)]
	pub serve: bool,

	/// Serving mode: csr, ssr or ssg
	#[arg(long, value_name = "MODE")]
	pub mode: Option<Mode>,

	/// Port to listen on
	#[arg(long, value_name = "PORT")]
	pub port: Option<u16>,

	/// Address to bind
	#[arg(long, value_name = "HOST")]
	pub host: Option<String>,

	/// Directory holding the pages
	#[arg(long, value_name = "DIR")]
	pub src: Option<PathBuf>,

	/// Output directory of the static build
	#[arg(long, value_name = "DIR")]
	pub dist: Option<PathBuf>,

	/// Project root
	#[arg(long, value_name = "DIR")]
	pub root: Option<PathBuf>,

	/// Settings file (defaults to ./ltng.toml when present)
	#[arg(long, value_name = "PATH")]
	pub config: Option<PathBuf>,

	/// Transpile scripts served in csr mode
	#[arg(long)]
	pub transpile_js: bool,

	/// Script to run before page scripts when rendering (repeatable)
	#[arg(long = "prelude", value_name = "PATH")]
	pub preludes: Vec<PathBuf>,

	/// Origin pages see as their location when rendered
	#[arg(long, value_name = "URL")]
	pub origin: Option<String>,

	/// Verbosity level (can be repeated)
	#[arg(short, long, action = clap::ArgAction::Count)]
	pub verbose: u8,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
	/// Write the script and stylesheet bundles declared in the settings
	Bundle {
		/// Bundles to build (all when omitted)
		#[arg(value_name = "NAME")]
		names: Vec<String>,
	},

	/// Print a module rewritten for classic-script execution
	Transpile {
		#[arg(value_name = "FILE")]
		file: PathBuf,

		/// Object imports are read from and exports written to
		#[arg(long, default_value = "window")]
		scope: String,

		/// Object exports are mirrored onto
		#[arg(long, default_value = "globalThis")]
		global: String,

		/// Drop `loadCSS(new URL(..., import.meta.url).href)` calls
		#[arg(long)]
		strip_load_css: bool,
	},
}

impl Cli {
	/// The settings layer formed by the flags.
	pub fn overrides(&self) -> SettingsOverrides {
		SettingsOverrides {
			mode: self.mode,
			host: self.host.clone(),
			port: self.port,
			root: self.root.clone(),
			src: self.src.clone(),
			dist: self.dist.clone(),
			transpile_js: self.transpile_js.then_some(true),
			preludes: self.preludes.clone(),
			origin: self.origin.clone(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use clap::CommandFactory;
	use rstest::rstest;

	#[rstest]
	fn test_cli_definition_is_valid() {
		Cli::command().debug_assert();
	}

	#[rstest]
	fn test_flags_become_overrides() {
		let cli = Cli::try_parse_from([
			"ltng",
			"--mode=SSR",
			"--port=8080",
			"--src=site",
			"--prelude",
			"a.js",
			"--prelude=b.js",
		])
		.unwrap();

		let overrides = cli.overrides();

		assert_eq!(overrides.mode, Some(Mode::Ssr));
		assert_eq!(overrides.port, Some(8080));
		assert_eq!(overrides.src, Some(PathBuf::from("site")));
		assert_eq!(overrides.transpile_js, None);
		assert_eq!(overrides.preludes, vec![PathBuf::from("a.js"), PathBuf::from("b.js")]);
	}

	#[rstest]
	#[case(&["ltng", "--mode=spa"])]
	#[case(&["ltng", "--port=70000"])]
	#[case(&["ltng", "--build", "--serve"])]
	fn test_rejected_arguments(#[case] args: &[&str]) {
		assert!(Cli::try_parse_from(args).is_err());
	}

	#[rstest]
	fn test_transpile_subcommand() {
		let cli = Cli::try_parse_from(["ltng", "transpile", "app.js", "--scope", "ltng"]).unwrap();
		match cli.command {
			Some(Command::Transpile { file, scope, global, strip_load_css }) => {
				assert_eq!(file, PathBuf::from("app.js"));
				assert_eq!(scope, "ltng");
				assert_eq!(global, "globalThis");
				assert!(!strip_load_css);
			}
			other => panic!("unexpected command: {other:?}"),
		}
	}
}
