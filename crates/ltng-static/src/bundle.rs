//! Flat script and stylesheet bundles
//!
//! A script bundle concatenates module files into one classic script. Each
//! file is transpiled so its exports land on `window`, wrapped in its own
//! function scope and minified. The framework runtime is included verbatim
//! since it defines the globals everything else relies on. CommonJS files
//! get a local `module` object whose exports are copied onto `window`.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use indexmap::IndexSet;
use ltng_transpile::{Transpiler, minify};
use regex::Regex;
use walkdir::WalkDir;

use crate::error::{StaticError, StaticResult, read_to_string, write_file};
use crate::layout::to_url_path;

/// File name of the framework runtime
pub const RUNTIME_FILE: &str = "ltng-framework.js";

/// File name of the component registry, loaded right after the runtime
pub const REGISTRY_FILE: &str = "registry.js";

/// Aggregator file name skipped when walking input directories
pub const INDEX_FILE: &str = "index.js";

static COMMONJS_EXPORT: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?m)\bmodule\.exports\b|^\s*exports\.[A-Za-z_$][\w$]*\s*=")
		.expect("COMMONJS_EXPORT: invalid regex pattern")
});

/// One bundle target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleSpec {
	/// Output base name; the bundle is written as `<name>.min.js`
	pub name: String,
	/// Files or directories to collect scripts from
	pub inputs: Vec<PathBuf>,
	/// Directories whose stylesheets are bundled into `<name>.min.css`
	pub css_inputs: Vec<PathBuf>,
}

impl BundleSpec {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			inputs: Vec::new(),
			css_inputs: Vec::new(),
		}
	}

	pub fn with_input(mut self, input: impl Into<PathBuf>) -> Self {
		self.inputs.push(input.into());
		self
	}

	pub fn with_css_input(mut self, input: impl Into<PathBuf>) -> Self {
		self.css_inputs.push(input.into());
		self
	}

	pub fn script_file_name(&self) -> String {
		format!("{}.min.js", self.name)
	}

	pub fn css_file_name(&self) -> String {
		format!("{}.min.css", self.name)
	}
}

/// What a bundle run produced.
#[derive(Debug, Clone)]
pub struct BundleReport {
	pub script: PathBuf,
	pub files: Vec<PathBuf>,
	pub bytes: usize,
	pub stylesheet: Option<CssReport>,
}

/// Builds script bundles relative to a project root.
pub struct ScriptBundler {
	root_dir: PathBuf,
	transpiler: Transpiler,
}

impl ScriptBundler {
	pub fn new(root_dir: impl Into<PathBuf>) -> Self {
		Self {
			root_dir: root_dir.into(),
			transpiler: Transpiler::new().with_strip_load_css(true),
		}
	}

	/// Script files selected by `spec` in bundle order.
	///
	/// Directories are walked recursively for `.js`/`.mjs` files; test files
	/// (`*.test.js`) and `index.js` aggregators are skipped. Inputs naming a
	/// file are always taken. The runtime comes first, then the
	/// registry, then stories, then everything else by path, with `app.js`
	/// last.
	pub fn collect(&self, spec: &BundleSpec) -> StaticResult<Vec<PathBuf>> {
		let mut files = IndexSet::new();
		for input in &spec.inputs {
			let input = self.root_dir.join(input);
			if input.is_file() {
				files.insert(input);
				continue;
			}
			for entry in WalkDir::new(&input).sort_by_file_name() {
				let entry = entry?;
				if entry.file_type().is_file() && is_bundled_script(entry.path()) {
					files.insert(entry.into_path());
				}
			}
		}
		let mut files: Vec<PathBuf> = files.into_iter().collect();
		files.sort_by(|a, b| compare_bundle_order(a, b));
		Ok(files)
	}

	/// Writes `<name>.min.js` (and `<name>.min.css` when `css_inputs` is set)
	/// into `out_dir`.
	pub fn bundle(&self, spec: &BundleSpec, out_dir: &Path) -> StaticResult<BundleReport> {
		let files = self.collect(spec)?;
		if files.is_empty() {
			return Err(StaticError::EmptyBundle(spec.name.clone()));
		}

		let mut bundle = String::new();
		for file in &files {
			let code = read_to_string(file)?;
			let label = self.label(file);
			tracing::debug!(file = %label, bundle = %spec.name, "bundling script");

			bundle.push_str(&format!("// File: {label}\n"));
			if file_name(file) == RUNTIME_FILE {
				bundle.push_str(&minify(&code));
			} else if is_commonjs(&code) {
				bundle.push_str(&minify(&commonjs_wrapper(&code)));
			} else {
				let output = self.transpiler.transpile(&code, &label);
				for warning in &output.warnings {
					tracing::warn!(file = %label, line = warning.line, "{}", warning.message);
				}
				bundle.push_str(&minify(&format!("(function(){{\n{}\n}})();", output.code)));
			}
			bundle.push('\n');
		}

		let stylesheet = if spec.css_inputs.is_empty() {
			None
		} else {
			let css = CssBundler::new(spec.css_inputs.iter().map(|d| self.root_dir.join(d)).collect())
				.bundle(&out_dir.join(spec.css_file_name()))?;
			bundle.push_str(&css_loader(&spec.css_file_name()));
			bundle.push('\n');
			Some(css)
		};

		let script = out_dir.join(spec.script_file_name());
		write_file(&script, &bundle)?;
		tracing::info!(
			bundle = %script.display(),
			files = files.len(),
			bytes = bundle.len(),
			"wrote script bundle"
		);

		Ok(BundleReport {
			script,
			files,
			bytes: bundle.len(),
			stylesheet,
		})
	}

	fn label(&self, file: &Path) -> String {
		file.strip_prefix(&self.root_dir)
			.map(to_url_path)
			.unwrap_or_else(|_| file.display().to_string())
	}
}

/// Classic-script statement that loads the stylesheet next to the bundle.
fn css_loader(css_file: &str) -> String {
	format!(
		"(function(){{var s=document.currentScript;if(window.loadCSS&&s){{window.loadCSS(new URL('./{css_file}',s.src).href);}}}})();"
	)
}

fn is_commonjs(code: &str) -> bool {
	COMMONJS_EXPORT.is_match(code)
}

/// Runs a CommonJS file in its own scope and publishes its exports.
fn commonjs_wrapper(code: &str) -> String {
	format!(
		"(function(){{\nconst module = {{ exports: {{}} }};\nconst exports = module.exports;\n{code}\nObject.assign(window, module.exports);\n}})();"
	)
}

fn file_name(path: &Path) -> &str {
	path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
}

fn is_bundled_script(path: &Path) -> bool {
	let name = file_name(path);
	(name.ends_with(".js") || name.ends_with(".mjs")) && !name.contains(".test.") && name != INDEX_FILE
}

fn bundle_rank(path: &Path) -> u8 {
	match file_name(path) {
		RUNTIME_FILE => 0,
		REGISTRY_FILE => 1,
		name if name.ends_with(".story.js") => 2,
		"app.js" => 4,
		_ => 3,
	}
}

fn compare_bundle_order(a: &Path, b: &Path) -> Ordering {
	bundle_rank(a).cmp(&bundle_rank(b)).then_with(|| a.cmp(b))
}

/// Result of a stylesheet bundle.
#[derive(Debug, Clone)]
pub struct CssReport {
	pub output: PathBuf,
	pub files: Vec<PathBuf>,
}

/// Concatenates the stylesheets found under a set of directories.
///
/// `theme.css` goes first so the custom properties it declares are defined
/// before anything uses them.
pub struct CssBundler {
	inputs: Vec<PathBuf>,
}

impl CssBundler {
	pub fn new(inputs: Vec<PathBuf>) -> Self {
		Self { inputs }
	}

	pub fn collect(&self) -> StaticResult<Vec<PathBuf>> {
		let mut files = Vec::new();
		for input in &self.inputs {
			for entry in WalkDir::new(input).sort_by_file_name() {
				let entry = entry?;
				if entry.file_type().is_file()
					&& entry.path().extension().is_some_and(|e| e == "css")
				{
					files.push(entry.into_path());
				}
			}
		}
		match files.iter().position(|f| file_name(f) == "theme.css") {
			Some(index) => {
				let theme = files.remove(index);
				files.insert(0, theme);
			}
			None => tracing::warn!("no theme.css found among bundled stylesheets"),
		}
		Ok(files)
	}

	pub fn bundle(&self, output: &Path) -> StaticResult<CssReport> {
		let files = self.collect()?;
		let mut css = String::new();
		for file in &files {
			css.push_str(&read_to_string(file)?);
			css.push('\n');
		}
		write_file(output, &css)?;
		tracing::info!(bundle = %output.display(), files = files.len(), "wrote stylesheet bundle");
		Ok(CssReport {
			output: output.to_path_buf(),
			files,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::*;
	use std::fs;
	use tempfile::TempDir;

	#[fixture]
	fn project() -> TempDir {
		let dir = TempDir::new().unwrap();
		let write = |name: &str, body: &str| {
			let path = dir.path().join(name);
			fs::create_dir_all(path.parent().unwrap()).unwrap();
			fs::write(path, body).unwrap();
		};
		write("ltng-framework.js", "// runtime\nwindow.Body = {};\n");
		write("pkg/app.js", "import { Button } from './components/button.js';\nButton();\n");
		write("pkg/registry.js", "export const registry = {};\n");
		write(
			"pkg/components/button.js",
			"window.loadCSS(new URL('./button.css', import.meta.url).href);\nexport function Button() {\n\t/* render */\n\treturn 1;\n}\n",
		);
		write("pkg/components/button.test.js", "throw new Error('not bundled');\n");
		write("pkg/components/button.story.js", "export const story = 1;\n");
		write("pkg/components/button.css", ".btn { color: var(--fg); }");
		write("pkg/styles/theme.css", ":root { --fg: black; }");
		dir
	}

	#[rstest]
	fn test_collect_order(project: TempDir) {
		let bundler = ScriptBundler::new(project.path());
		let spec = BundleSpec::new("ltng").with_input("ltng-framework.js").with_input("pkg");

		let names: Vec<String> = bundler
			.collect(&spec)
			.unwrap()
			.iter()
			.map(|p| file_name(p).to_string())
			.collect();

		assert_eq!(
			names,
			vec!["ltng-framework.js", "registry.js", "button.story.js", "button.js", "app.js"]
		);
	}

	#[rstest]
	fn test_bundle_writes_minified_script_and_css(project: TempDir) {
		let out = project.path().join("build");
		let bundler = ScriptBundler::new(project.path());
		let spec = BundleSpec::new("ltng")
			.with_input("ltng-framework.js")
			.with_input("pkg")
			.with_css_input("pkg");

		let report = bundler.bundle(&spec, &out).unwrap();
		let script = fs::read_to_string(out.join("ltng.min.js")).unwrap();
		let css = fs::read_to_string(out.join("ltng.min.css")).unwrap();

		assert_eq!(report.files.len(), 5);
		assert!(script.starts_with("// File: ltng-framework.js\nwindow.Body = {};\n"));
		assert!(script.contains("// File: pkg/components/button.js\n(function(){\n"));
		assert!(!script.contains("import.meta"));
		assert!(!script.contains("/* render */"));
		assert!(!script.contains("not bundled"));
		assert!(script.trim_end().ends_with("window.loadCSS(new URL('./ltng.min.css',s.src).href);}})();"));
		assert!(css.starts_with(":root { --fg: black; }\n"));
		assert_eq!(report.stylesheet.unwrap().files.len(), 2);
	}

	#[rstest]
	fn test_commonjs_files_publish_exports(project: TempDir) {
		let write = |name: &str, body: &str| fs::write(project.path().join(name), body).unwrap();
		fs::create_dir_all(project.path().join("lib")).unwrap();
		write("lib/helper.js", "function helper() { return 42; }\nmodule.exports = { helper };\n");
		write("lib/flags.js", "exports.enabled = true;\n");
		write("lib/app.js", "window.out = helper();\n");
		let out = project.path().join("build");

		ScriptBundler::new(project.path())
			.bundle(&BundleSpec::new("lib").with_input("lib"), &out)
			.unwrap();
		let script = fs::read_to_string(out.join("lib.min.js")).unwrap();

		assert!(script.contains(
			"// File: lib/helper.js\n(function(){\nconst module = { exports: {} };\nconst exports = module.exports;\nfunction helper() { return 42; }\nmodule.exports = { helper };\nObject.assign(window, module.exports);\n})();"
		));
		assert!(script.contains("exports.enabled = true;\nObject.assign(window, module.exports);"));
		let app = script.find("// File: lib/app.js\n(function(){\n").unwrap();
		assert!(script[app..].contains("window.out = helper();"));
		assert!(!script[app..].contains("module.exports"));
	}

	#[rstest]
	#[case("module.exports = { a };", true)]
	#[case("exports.a = 1;", true)]
	#[case("export const a = 1;", false)]
	#[case("window.exports = 1;", false)]
	fn test_commonjs_detection(#[case] code: &str, #[case] expected: bool) {
		assert_eq!(is_commonjs(code), expected);
	}

	#[rstest]
	fn test_index_files_are_not_collected(project: TempDir) {
		fs::write(
			project.path().join("pkg/components/index.js"),
			"export * from './button.js';\n",
		)
		.unwrap();
		let bundler = ScriptBundler::new(project.path());

		let walked = bundler.collect(&BundleSpec::new("ltng").with_input("pkg")).unwrap();
		let named = bundler
			.collect(&BundleSpec::new("ltng").with_input("pkg/components/index.js"))
			.unwrap();

		assert!(walked.iter().all(|p| file_name(p) != INDEX_FILE));
		assert_eq!(named, vec![project.path().join("pkg/components/index.js")]);
	}

	#[rstest]
	fn test_empty_bundle_is_an_error(project: TempDir) {
		let bundler = ScriptBundler::new(project.path());
		let err = bundler
			.bundle(&BundleSpec::new("none").with_input("missing-dir"), project.path())
			.unwrap_err();
		assert!(matches!(err, StaticError::Walk(_) | StaticError::EmptyBundle(_)));
	}
}
