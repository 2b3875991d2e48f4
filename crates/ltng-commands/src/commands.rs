//! What each command does

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use ltng_conf::{BundleSettings, Mode, Settings, SettingsLoader};
use ltng_server::{DevHandler, DevServer, ShutdownCoordinator, build_renderer};
use ltng_static::{BuildReport, BundleReport, BundleSpec, ScriptBundler, SiteBuilder};
use ltng_transpile::{TranspileOutput, Transpiler};

use crate::cli::{Cli, Command};
use crate::error::{CommandError, CommandResult};

/// How long shutdown waits for the server to stop accepting
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Defaults, settings file, environment, then flags; paths resolved
/// against `cwd`.
pub fn load_settings(cli: &Cli, cwd: &Path) -> CommandResult<Settings> {
	let mut loader = SettingsLoader::new(cwd);
	if let Some(config) = &cli.config {
		loader = loader.with_config_file(config);
	}
	let mut settings = loader.load()?;
	settings.apply_overrides(cli.overrides());
	settings.resolve_paths(cwd);
	settings.validate()?;
	Ok(settings)
}

/// Runs the command line against the working directory.
pub async fn run(cli: Cli) -> CommandResult<()> {
	let cwd = std::env::current_dir()?;
	let settings = load_settings(&cli, &cwd)?;

	match &cli.command {
		Some(Command::Bundle { names }) => {
			run_bundles(&settings, names)?;
			Ok(())
		}
		Some(Command::Transpile {
			file,
			scope,
			global,
			strip_load_css,
		}) => {
			let output = transpile_file(&cwd.join(file), scope, global, *strip_load_css)?;
			println!("{}", output.code);
			Ok(())
		}
		None if cli.build => {
			build_site(&settings)?;
			Ok(())
		}
		None => {
			if cli.serve && settings.mode == Mode::Ssg {
				build_site(&settings)?;
			}
			serve(&settings).await
		}
	}
}

/// Renders every page into the output directory.
///
/// Pages that fail are logged and listed in the report; only an output
/// directory that cannot be created is an error.
pub fn build_site(settings: &Settings) -> CommandResult<BuildReport> {
	if settings.mode != Mode::Ssg {
		return Err(CommandError::BuildRequiresSsg(settings.mode));
	}
	let builder = SiteBuilder::new(build_renderer(settings)?, &settings.dist);
	let report = builder.build()?;
	if report.is_success() && report.asset_failures() == 0 {
		tracing::info!(
			pages = report.pages.len(),
			assets = report.assets_copied(),
			dist = %settings.dist.display(),
			"build finished"
		);
	} else {
		tracing::warn!(
			pages = report.pages.len(),
			failures = report.failures.len(),
			asset_failures = report.asset_failures(),
			"build finished with failures"
		);
	}
	Ok(report)
}

/// Writes the named bundles, or every configured bundle when `names` is
/// empty.
pub fn run_bundles(settings: &Settings, names: &[String]) -> CommandResult<Vec<BundleReport>> {
	if settings.bundles.is_empty() {
		return Err(CommandError::NoBundles);
	}
	let selected: Vec<&BundleSettings> = if names.is_empty() {
		settings.bundles.iter().collect()
	} else {
		names
			.iter()
			.map(|name| {
				settings
					.bundle(name)
					.ok_or_else(|| CommandError::UnknownBundle(name.clone()))
			})
			.collect::<CommandResult<_>>()?
	};

	let bundler = ScriptBundler::new(&settings.root);
	let mut reports = Vec::with_capacity(selected.len());
	for bundle in selected {
		let out_dir = match &bundle.out_dir {
			Some(dir) => settings.root.join(dir),
			None => settings.dist.clone(),
		};
		reports.push(bundler.bundle(&bundle_spec(bundle), &out_dir)?);
	}
	Ok(reports)
}

fn bundle_spec(bundle: &BundleSettings) -> BundleSpec {
	let spec = bundle
		.inputs
		.iter()
		.fold(BundleSpec::new(&bundle.name), |spec, input| spec.with_input(input));
	bundle
		.css_inputs
		.iter()
		.fold(spec, |spec, input| spec.with_css_input(input))
}

/// Transpiles one file, logging any warnings.
pub fn transpile_file(
	path: &Path,
	scope: &str,
	global: &str,
	strip_load_css: bool,
) -> CommandResult<TranspileOutput> {
	let output = Transpiler::new()
		.with_scope(scope)
		.with_global(global)
		.with_strip_load_css(strip_load_css)
		.transpile_file(path)?;
	for warning in &output.warnings {
		tracing::warn!(file = %path.display(), line = warning.line, "{}", warning.message);
	}
	Ok(output)
}

/// Serves until Ctrl-C.
pub async fn serve(settings: &Settings) -> CommandResult<()> {
	let handler = Arc::new(DevHandler::from_settings(settings)?);
	let addr = resolve_address(&settings.address()).await?;

	let coordinator = ShutdownCoordinator::new(SHUTDOWN_TIMEOUT);
	coordinator.shutdown_on_ctrl_c();

	tracing::info!(
		mode = %settings.mode,
		src = %settings.src.display(),
		"serving in {} mode at http://{}:{}",
		settings.mode.as_str().to_uppercase(),
		settings.host,
		settings.port
	);
	DevServer::new(handler)
		.listen_with_shutdown(addr, coordinator)
		.await?;
	Ok(())
}

async fn resolve_address(address: &str) -> CommandResult<SocketAddr> {
	let mut addrs = tokio::net::lookup_host(address)
		.await
		.map_err(|source| CommandError::Address {
			address: address.to_string(),
			source: Some(source),
		})?;
	addrs.next().ok_or_else(|| CommandError::Address {
		address: address.to_string(),
		source: None,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::path::PathBuf;

	#[rstest]
	fn test_bundle_spec_keeps_inputs() {
		let spec = bundle_spec(&BundleSettings {
			name: "ltng".to_string(),
			inputs: vec![PathBuf::from("ltng-framework.js"), PathBuf::from("components")],
			css_inputs: vec![PathBuf::from("components")],
			out_dir: None,
		});

		assert_eq!(spec.name, "ltng");
		assert_eq!(spec.inputs.len(), 2);
		assert_eq!(spec.css_inputs, vec![PathBuf::from("components")]);
	}

	#[rstest]
	#[tokio::test]
	async fn test_resolve_address() {
		let addr = resolve_address("127.0.0.1:3000").await.unwrap();
		assert_eq!(addr.port(), 3000);
	}

	#[rstest]
	fn test_build_requires_ssg_mode() {
		let err = build_site(&Settings::default()).unwrap_err();
		assert_eq!(
			err.to_string(),
			"build is only supported in ssg mode (current mode: csr)"
		);
	}
}
