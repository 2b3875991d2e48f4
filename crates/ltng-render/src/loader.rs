//! ES module loading for a single render
//!
//! Modules are transpiled into flat scripts and executed in dependency order:
//! every dependency a module imports runs before the module itself. A module
//! path runs at most once per loader. A module that is reached again while
//! its own dependencies are still loading is skipped, so import cycles are
//! cut at the first repeated path.

use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use ltng_transpile::{ImportMap, PathResolver, Resolution, Transpiler, scanner};

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::engine::ScriptEngine;

/// Loads modules into one [`ScriptEngine`].
pub struct ModuleLoader<'a> {
	resolver: &'a PathResolver,
	transpiler: &'a Transpiler,
	import_map: &'a ImportMap,
	loaded: IndexSet<PathBuf>,
}

impl<'a> ModuleLoader<'a> {
	pub fn new(resolver: &'a PathResolver, transpiler: &'a Transpiler, import_map: &'a ImportMap) -> Self {
		Self {
			resolver,
			transpiler,
			import_map,
			loaded: IndexSet::new(),
		}
	}

	/// Paths claimed so far, in the order they were first reached.
	pub fn loaded(&self) -> impl Iterator<Item = &Path> {
		self.loaded.iter().map(PathBuf::as_path)
	}

	pub fn is_loaded(&self, path: &Path) -> bool {
		self.loaded.contains(path)
	}

	pub fn into_loaded(self) -> Vec<PathBuf> {
		self.loaded.into_iter().collect()
	}

	/// Resolves `specifier` from `importer_dir` and loads the result.
	pub fn load_specifier(
		&mut self,
		engine: &mut dyn ScriptEngine,
		importer_dir: &Path,
		specifier: &str,
		importer: &str,
		diagnostics: &mut Diagnostics,
	) {
		match self
			.resolver
			.resolve(importer_dir, specifier, self.import_map)
		{
			Resolution::Remote(url) => {
				diagnostics.push(Diagnostic::RemoteModuleSkipped { url });
			}
			Resolution::Local(path) => {
				self.load_file(engine, &path, specifier, importer, diagnostics);
			}
		}
	}

	/// Loads the module at `path` and its dependencies.
	///
	/// The path is claimed before dependencies are visited. A missing file is
	/// reported once and stays claimed.
	pub fn load_file(
		&mut self,
		engine: &mut dyn ScriptEngine,
		path: &Path,
		specifier: &str,
		importer: &str,
		diagnostics: &mut Diagnostics,
	) {
		if !self.loaded.insert(path.to_path_buf()) {
			tracing::trace!(path = %path.display(), "module already loaded");
			return;
		}

		let code = match std::fs::read_to_string(path) {
			Ok(code) => code,
			Err(_) => {
				diagnostics.push(Diagnostic::ModuleNotFound {
					specifier: specifier.to_string(),
					importer: importer.to_string(),
					path: path.to_path_buf(),
				});
				return;
			}
		};
		tracing::debug!(path = %path.display(), "loading module");

		let origin = path.display().to_string();
		let dir = path.parent().unwrap_or(Path::new(""));
		self.load_dependencies(engine, &code, dir, &origin, diagnostics);
		self.run(engine, &code, &origin, &origin, diagnostics);
	}

	/// Loads an inline `<script type="module">` from `page`.
	///
	/// Specifiers resolve against the page's directory and `import.meta.url`
	/// points at the page itself.
	pub fn load_inline(
		&mut self,
		engine: &mut dyn ScriptEngine,
		code: &str,
		page: &Path,
		origin: &str,
		diagnostics: &mut Diagnostics,
	) {
		let dir = page.parent().unwrap_or(Path::new(""));
		self.load_dependencies(engine, code, dir, origin, diagnostics);
		self.run(engine, code, &page.to_string_lossy(), origin, diagnostics);
	}

	fn load_dependencies(
		&mut self,
		engine: &mut dyn ScriptEngine,
		code: &str,
		dir: &Path,
		importer: &str,
		diagnostics: &mut Diagnostics,
	) {
		for specifier in scanner::module_specifiers(code) {
			self.load_specifier(engine, dir, &specifier, importer, diagnostics);
		}
	}

	fn run(
		&self,
		engine: &mut dyn ScriptEngine,
		code: &str,
		filename: &str,
		origin: &str,
		diagnostics: &mut Diagnostics,
	) {
		let output = self.transpiler.transpile(code, filename);
		for warning in output.warnings {
			diagnostics.push(Diagnostic::TranspileWarning {
				file: origin.to_string(),
				line: warning.line,
				message: warning.message,
			});
		}

		let wrapped = wrap_module(&output.code);
		if let Err(err) = engine.execute(&wrapped, origin) {
			diagnostics.push(Diagnostic::ScriptFailed {
				origin: origin.to_string(),
				message: err.to_string(),
			});
		}
	}
}

/// Wraps transpiled module code so its top-level bindings stay private.
pub fn wrap_module(code: &str) -> String {
	format!("(function(){{\n{code}\n}})();")
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::ScriptResult;
	use ltng_dom::Document;
	use rstest::*;
	use std::fs;
	use tempfile::TempDir;

	/// Records executed origins without running anything.
	#[derive(Default)]
	struct RecordingEngine {
		executed: Vec<String>,
	}

	impl ScriptEngine for RecordingEngine {
		fn execute(&mut self, _source: &str, origin: &str) -> ScriptResult<()> {
			self.executed.push(
				Path::new(origin)
					.file_name()
					.map(|n| n.to_string_lossy().into_owned())
					.unwrap_or_else(|| origin.to_string()),
			);
			Ok(())
		}

		fn document(&self) -> Document {
			Document::new()
		}
	}

	#[fixture]
	fn graph() -> TempDir {
		let dir = TempDir::new().unwrap();
		let write = |name: &str, body: &str| fs::write(dir.path().join(name), body).unwrap();
		write("main.js", "import { b } from './b.js';\nimport { c } from './c.js';\n");
		write("b.js", "import { d } from './d.js';\nexport const b = d;\n");
		write("c.js", "import { d } from './d.js';\nexport const c = d;\n");
		write("d.js", "export const d = 1;\n");
		write("cycle-a.js", "import './cycle-b.js';\n");
		write("cycle-b.js", "import './cycle-a.js';\n");
		dir
	}

	#[rstest]
	fn test_dependencies_run_first_and_once(graph: TempDir) {
		let resolver = PathResolver::new(graph.path(), graph.path());
		let transpiler = Transpiler::new();
		let map = ImportMap::new();
		let mut loader = ModuleLoader::new(&resolver, &transpiler, &map);
		let mut engine = RecordingEngine::default();
		let mut diagnostics = Diagnostics::new();

		loader.load_specifier(&mut engine, graph.path(), "./main.js", "page", &mut diagnostics);

		assert_eq!(engine.executed, vec!["d.js", "b.js", "c.js", "main.js"]);
		assert!(diagnostics.is_empty());
	}

	#[rstest]
	fn test_cycle_is_cut(graph: TempDir) {
		let resolver = PathResolver::new(graph.path(), graph.path());
		let transpiler = Transpiler::new();
		let map = ImportMap::new();
		let mut loader = ModuleLoader::new(&resolver, &transpiler, &map);
		let mut engine = RecordingEngine::default();
		let mut diagnostics = Diagnostics::new();

		loader.load_specifier(&mut engine, graph.path(), "./cycle-a.js", "page", &mut diagnostics);

		assert_eq!(engine.executed, vec!["cycle-b.js", "cycle-a.js"]);
		assert_eq!(loader.loaded().count(), 2);
	}

	#[rstest]
	fn test_missing_and_remote_are_reported(graph: TempDir) {
		let resolver = PathResolver::new(graph.path(), graph.path());
		let transpiler = Transpiler::new();
		let map = ImportMap::new();
		let mut loader = ModuleLoader::new(&resolver, &transpiler, &map);
		let mut engine = RecordingEngine::default();
		let mut diagnostics = Diagnostics::new();

		loader.load_inline(
			&mut engine,
			"import './nope.js';\nimport 'https://cdn.example.com/x.js';\n",
			&graph.path().join("index.html"),
			"inline",
			&mut diagnostics,
		);

		let diagnostics = diagnostics.into_vec();
		assert!(matches!(
			&diagnostics[0],
			Diagnostic::ModuleNotFound { specifier, .. } if specifier == "./nope.js"
		));
		assert_eq!(
			diagnostics[1],
			Diagnostic::RemoteModuleSkipped {
				url: "https://cdn.example.com/x.js".into()
			}
		);
		assert_eq!(engine.executed, vec!["inline"]);
	}

	#[rstest]
	fn test_wrap_module() {
		assert_eq!(wrap_module("var a = 1;"), "(function(){\nvar a = 1;\n})();");
	}
}
