//! Server-side rendering of a single page
//!
//! A render runs every executable `<script>` of the page against a fresh
//! mock document and splices the result back into the original markup:
//!
//! 1. Import maps are merged (later entries win).
//! 2. Prelude scripts from the [`ScriptEnvironment`] run first.
//! 3. Page scripts run in document order. Module scripts go through the
//!    [`ModuleLoader`]; classic scripts run unmodified.
//! 4. The `<body>` content is replaced by the rendered body followed by the
//!    original script tags that were inside the body.
//! 5. Anything scripts appended to the mock `<head>` is added after the
//!    existing head content.
//!
//! Everything outside those two regions is copied through unchanged.

use std::cmp::Reverse;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ltng_dom::Document;
use ltng_transpile::{
	ImportMap, PathResolver, Resolution, TranspileOptions, Transpiler, normalize_path,
};

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::engine::{BoaEngineFactory, EngineFactory, ScriptEngine, ScriptEnvironment};
use crate::error::{RenderError, RenderResult};
use crate::extract::{RegexScriptExtractor, ScriptExtractor, ScriptKind, ScriptTag};
use crate::loader::ModuleLoader;

/// Project layout and script settings shared by every render.
#[derive(Debug, Clone)]
pub struct RenderOptions {
	/// Directory pages are served from
	pub src_dir: PathBuf,
	/// Project root, used for `/`-rooted paths missing from `src_dir`
	pub root_dir: PathBuf,
	pub transpile: TranspileOptions,
	pub environment: ScriptEnvironment,
	/// When set, `location` is derived per page as `<origin>/<page path>`
	pub origin: Option<String>,
}

impl RenderOptions {
	pub fn new(src_dir: impl Into<PathBuf>, root_dir: impl Into<PathBuf>) -> Self {
		Self {
			src_dir: src_dir.into(),
			root_dir: root_dir.into(),
			transpile: TranspileOptions::default(),
			environment: ScriptEnvironment::default(),
			origin: None,
		}
	}

	pub fn with_transpile_options(mut self, options: TranspileOptions) -> Self {
		self.transpile = options;
		self
	}

	pub fn with_environment(mut self, environment: ScriptEnvironment) -> Self {
		self.environment = environment;
		self
	}

	pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
		self.origin = Some(origin.into());
		self
	}
}

/// Result of rendering one page.
#[derive(Debug, Clone)]
pub struct RenderOutput {
	pub html: String,
	pub diagnostics: Vec<Diagnostic>,
	/// Module files reached during the render, in load order
	pub loaded_modules: Vec<PathBuf>,
	/// The page's merged import map
	pub import_map: ImportMap,
}

impl RenderOutput {
	pub fn has_errors(&self) -> bool {
		self.diagnostics.iter().any(Diagnostic::is_error)
	}
}

/// Renders pages. Cheap to share between threads; every render creates its
/// own engine and module set.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use ltng_render::{RenderOptions, Renderer};
///
/// let renderer = Renderer::new(RenderOptions::new("site/src", "site"));
/// let output = renderer.render_file(Path::new("site/src/index.html"))?;
/// println!("{}", output.html);
/// # Ok::<(), ltng_render::RenderError>(())
/// ```
pub struct Renderer {
	options: RenderOptions,
	resolver: PathResolver,
	transpiler: Transpiler,
	factory: Arc<dyn EngineFactory>,
	extractor: Arc<dyn ScriptExtractor>,
}

impl Renderer {
	/// Creates a renderer using boa and the regex script extractor.
	pub fn new(options: RenderOptions) -> Self {
		Self {
			resolver: PathResolver::new(&options.src_dir, &options.root_dir),
			transpiler: Transpiler::with_options(options.transpile.clone()),
			factory: Arc::new(BoaEngineFactory),
			extractor: Arc::new(RegexScriptExtractor),
			options,
		}
	}

	pub fn with_engine_factory(mut self, factory: Arc<dyn EngineFactory>) -> Self {
		self.factory = factory;
		self
	}

	pub fn with_extractor(mut self, extractor: Arc<dyn ScriptExtractor>) -> Self {
		self.extractor = extractor;
		self
	}

	pub fn options(&self) -> &RenderOptions {
		&self.options
	}

	pub fn resolver(&self) -> &PathResolver {
		&self.resolver
	}

	pub fn extractor(&self) -> &dyn ScriptExtractor {
		self.extractor.as_ref()
	}

	/// Reads and renders the page at `path`.
	pub fn render_file(&self, path: &Path) -> RenderResult<RenderOutput> {
		let html = std::fs::read_to_string(path).map_err(|source| RenderError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		self.render_str(&html, path)
	}

	/// Renders `html` as if it were read from `path`.
	///
	/// Script failures and missing modules end up in
	/// [`RenderOutput::diagnostics`]. Only a failure to create the script
	/// engine is an error.
	pub fn render_str(&self, html: &str, path: &Path) -> RenderResult<RenderOutput> {
		let page = normalize_path(path);
		tracing::debug!(page = %page.display(), "rendering page");

		let mut diagnostics = Diagnostics::new();
		let scripts = self.extractor.scripts(html);
		let import_map = self.import_map(&scripts, &page, &mut diagnostics);

		let environment = self.environment_for(&page);
		let mut engine = self.factory.create(&environment)?;
		for prelude in environment.preludes() {
			if let Err(err) = engine.execute(&prelude.source, &prelude.name) {
				diagnostics.push(Diagnostic::ScriptFailed {
					origin: prelude.name.clone(),
					message: err.to_string(),
				});
			}
		}

		let mut loader = ModuleLoader::new(&self.resolver, &self.transpiler, &import_map);
		for (index, tag) in scripts.iter().enumerate() {
			self.run_script(
				engine.as_mut(),
				&mut loader,
				&import_map,
				tag,
				index,
				&page,
				&mut diagnostics,
			);
		}
		let loaded_modules = loader.into_loaded();

		let document = engine.document();
		let html = self.splice(html, &scripts, &document, &mut diagnostics);

		Ok(RenderOutput {
			html,
			diagnostics: diagnostics.into_vec(),
			loaded_modules,
			import_map,
		})
	}

	fn environment_for(&self, page: &Path) -> ScriptEnvironment {
		match &self.options.origin {
			Some(origin) => self.options.environment.clone().with_location(
				ScriptEnvironment::location_for(origin, self.resolver.src_dir(), page),
			),
			None => self.options.environment.clone(),
		}
	}

	fn import_map(&self, scripts: &[ScriptTag], page: &Path, diagnostics: &mut Diagnostics) -> ImportMap {
		let page_dir = page.parent().unwrap_or(Path::new(""));
		let mut merged = ImportMap::new();
		for tag in scripts.iter().filter(|t| t.kind == ScriptKind::ImportMap) {
			match ImportMap::parse(&tag.inline, page_dir) {
				Ok(map) => merged.merge(map),
				Err(err) => diagnostics.push(Diagnostic::ImportMapInvalid {
					message: err.to_string(),
				}),
			}
		}
		merged
	}

	#[allow(clippy::too_many_arguments)]
	fn run_script(
		&self,
		engine: &mut dyn ScriptEngine,
		loader: &mut ModuleLoader<'_>,
		import_map: &ImportMap,
		tag: &ScriptTag,
		index: usize,
		page: &Path,
		diagnostics: &mut Diagnostics,
	) {
		let page_dir = page.parent().unwrap_or(Path::new(""));
		let page_name = page.display().to_string();
		let origin = format!("{page_name} (script #{})", index + 1);

		match (&tag.kind, &tag.src) {
			(ScriptKind::ImportMap | ScriptKind::Data(_), _) => {}
			(ScriptKind::Module, Some(src)) => {
				loader.load_specifier(engine, page_dir, src, &page_name, diagnostics);
			}
			(ScriptKind::Module, None) => {
				if !tag.inline.trim().is_empty() {
					loader.load_inline(engine, &tag.inline, page, &origin, diagnostics);
				}
			}
			(ScriptKind::Classic, Some(src)) => {
				match self.resolver.resolve(page_dir, src, import_map) {
					Resolution::Remote(url) => {
						diagnostics.push(Diagnostic::RemoteModuleSkipped { url });
					}
					Resolution::Local(path) => match std::fs::read_to_string(&path) {
						Ok(code) => {
							execute(engine, &code, &path.display().to_string(), diagnostics);
						}
						Err(_) => diagnostics.push(Diagnostic::ModuleNotFound {
							specifier: src.clone(),
							importer: page_name,
							path,
						}),
					},
				}
			}
			(ScriptKind::Classic, None) => {
				if !tag.inline.trim().is_empty() {
					execute(engine, &tag.inline, &origin, diagnostics);
				}
			}
		}
	}

	fn splice(
		&self,
		html: &str,
		scripts: &[ScriptTag],
		document: &Document,
		diagnostics: &mut Diagnostics,
	) -> String {
		let mut edits: Vec<(Range<usize>, String)> = Vec::new();

		let body = self.extractor.body_region(html);
		match &body {
			Some(region) => {
				let mut content = document.inner_html(document.body());
				for tag in scripts.iter().filter(|t| region.contains(&t.span)) {
					content.push_str(&tag.raw);
					content.push('\n');
				}
				edits.push((region.inner.clone(), content));
			}
			None => diagnostics.push(Diagnostic::MissingBody),
		}

		let additions = document.inner_html(document.head());
		if !additions.is_empty() {
			let insert_at = self
				.extractor
				.head_region(html)
				.map(|head| head.inner.end)
				.filter(|at| !body.as_ref().is_some_and(|b| b.outer.contains(at)));
			match insert_at {
				Some(at) => edits.push((at..at, additions)),
				None => diagnostics.push(Diagnostic::MissingHead),
			}
		}

		let mut out = html.to_string();
		edits.sort_by_key(|(range, _)| Reverse(range.start));
		for (range, text) in edits {
			out.replace_range(range, &text);
		}
		out
	}
}

fn execute(engine: &mut dyn ScriptEngine, code: &str, origin: &str, diagnostics: &mut Diagnostics) {
	if let Err(err) = engine.execute(code, origin) {
		diagnostics.push(Diagnostic::ScriptFailed {
			origin: origin.to_string(),
			message: err.to_string(),
		});
	}
}
