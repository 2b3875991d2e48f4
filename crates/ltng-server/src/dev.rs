//! The development request handler

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use http::Method;
use ltng_conf::{Mode, Settings};
use ltng_render::{RenderOptions, Renderer, ScriptEnvironment, rewrite_file_urls_for_server};
use ltng_transpile::{Transpiler, normalize_path};

use crate::content_type::content_type_for;
use crate::error::ServerResult;
use crate::files::{FileLookup, PathRejection, page_or_index, request_file_path};
use crate::handler::Handler;
use crate::message::{Request, Response};

/// Directories and switches the handler needs.
#[derive(Debug, Clone)]
pub struct DevConfig {
	pub mode: Mode,
	pub src_dir: PathBuf,
	pub root_dir: PathBuf,
	pub dist_dir: PathBuf,
	/// Serve scripts transpiled in CSR mode
	pub transpile_js: bool,
}

impl DevConfig {
	/// Expects paths already resolved with [`Settings::resolve_paths`].
	pub fn from_settings(settings: &Settings) -> Self {
		Self {
			mode: settings.mode,
			src_dir: normalize_path(&settings.src),
			root_dir: normalize_path(&settings.root),
			dist_dir: normalize_path(&settings.dist),
			transpile_js: settings.transpile_js,
		}
	}
}

/// Builds the page renderer described by `settings`.
///
/// Prelude files are read here, once. Without a configured origin, pages
/// see `http://localhost:<port>` as theirs. `Date.now()` in page scripts
/// returns the time the renderer was built, so every render of a page is
/// the same.
pub fn build_renderer(settings: &Settings) -> ServerResult<Renderer> {
	let started = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map_or(0.0, |elapsed| elapsed.as_millis() as f64);
	let mut environment = ScriptEnvironment::new().with_fixed_time(started);
	for prelude in &settings.preludes {
		environment = environment.with_prelude_file(prelude)?;
	}
	let origin = settings
		.origin
		.clone()
		.unwrap_or_else(|| format!("http://localhost:{}", settings.port));
	let options = RenderOptions::new(normalize_path(&settings.src), normalize_path(&settings.root))
		.with_environment(environment)
		.with_origin(origin);
	Ok(Renderer::new(options))
}

/// Serves a project in one of the three [`Mode`]s.
///
/// - CSR serves files from the source directory, the project root or a few
///   directories above it.
/// - SSR renders `.html` pages on every request and serves everything else
///   like CSR.
/// - SSG serves the static build output.
pub struct DevHandler {
	config: DevConfig,
	renderer: Arc<Renderer>,
	transpiler: Transpiler,
	client_files: FileLookup,
	page_files: FileLookup,
	built_files: FileLookup,
}

impl DevHandler {
	pub fn new(config: DevConfig, renderer: Renderer) -> Self {
		Self {
			client_files: FileLookup::client_side(&config.src_dir, &config.root_dir),
			page_files: FileLookup::new(vec![config.src_dir.clone(), config.root_dir.clone()]),
			built_files: FileLookup::single(&config.dist_dir),
			renderer: Arc::new(renderer),
			transpiler: Transpiler::new(),
			config,
		}
	}

	pub fn from_settings(settings: &Settings) -> ServerResult<Self> {
		Ok(Self::new(DevConfig::from_settings(settings), build_renderer(settings)?))
	}

	pub fn config(&self) -> &DevConfig {
		&self.config
	}

	async fn serve_client(&self, relative: &Path) -> Response {
		let Some(file) = self.client_files.find(relative) else {
			return Response::not_found();
		};
		let body = match tokio::fs::read(&file).await {
			Ok(body) => body,
			Err(err) => {
				tracing::warn!(path = %file.display(), error = %err, "cannot read file");
				return Response::not_found();
			}
		};

		let content_type = content_type_for(&file);
		if self.config.transpile_js
			&& content_type == "text/javascript"
			&& let Ok(code) = std::str::from_utf8(&body)
		{
			let output = self.transpiler.transpile(code, &file.to_string_lossy());
			for warning in &output.warnings {
				tracing::warn!(path = %file.display(), line = warning.line, "{}", warning.message);
			}
			return Response::ok().with_content_type(content_type).with_body(output.code);
		}
		Response::ok().with_content_type(content_type).with_body(body)
	}

	async fn serve_rendered(&self, relative: &Path) -> Response {
		let relative = page_or_index(relative.to_path_buf());
		let is_page = match relative.extension() {
			Some(ext) => ext == "html",
			None => self
				.page_files
				.find(&relative)
				.is_some_and(|found| found.extension().is_some_and(|ext| ext == "html")),
		};
		if !is_page {
			return self.serve_client(&relative).await;
		}
		let Some(page) = self.page_files.find(&relative) else {
			return Response::not_found();
		};

		let renderer = Arc::clone(&self.renderer);
		let rendered = tokio::task::spawn_blocking(move || {
			let output = renderer.render_file(&page);
			(page, output)
		})
		.await;

		match rendered {
			Ok((page, Ok(output))) => {
				tracing::debug!(
					page = %page.display(),
					diagnostics = output.diagnostics.len(),
					modules = output.loaded_modules.len(),
					"rendered page"
				);
				let html = rewrite_file_urls_for_server(&output.html, &self.config.root_dir);
				Response::ok().with_content_type("text/html").with_body(html)
			}
			Ok((page, Err(err))) => {
				tracing::error!(page = %page.display(), error = %err, "server-side render failed");
				ssr_error()
			}
			Err(err) => {
				tracing::error!(error = %err, "render task failed");
				ssr_error()
			}
		}
	}

	async fn serve_built(&self, relative: &Path) -> Response {
		let Some(file) = self.built_files.find(relative) else {
			return Response::not_found();
		};
		match tokio::fs::read(&file).await {
			Ok(body) => Response::ok()
				.with_content_type(content_type_for(&file))
				.with_body(body),
			Err(err) => {
				tracing::warn!(path = %file.display(), error = %err, "cannot read file");
				Response::not_found()
			}
		}
	}
}

fn ssr_error() -> Response {
	Response::internal_server_error().with_body("SSR Error")
}

#[async_trait]
impl Handler for DevHandler {
	async fn handle(&self, request: Request) -> ServerResult<Response> {
		if request.method != Method::GET && request.method != Method::HEAD {
			return Ok(Response::method_not_allowed());
		}
		let relative = match request_file_path(request.path()) {
			Ok(relative) => relative,
			Err(PathRejection::Traversal) => {
				tracing::warn!(path = request.path(), "refused path with parent segments");
				return Ok(Response::forbidden());
			}
			Err(PathRejection::Malformed) => return Ok(Response::not_found()),
		};

		let response = match self.config.mode {
			Mode::Csr => self.serve_client(&relative).await,
			Mode::Ssr => self.serve_rendered(&relative).await,
			Mode::Ssg => self.serve_built(&relative).await,
		};
		Ok(response)
	}
}
