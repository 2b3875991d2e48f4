//! End-to-end renders of small sites with the boa engine.

use std::fs;
use std::path::PathBuf;

use ltng_render::{
	Diagnostic, RenderOptions, Renderer, ScriptEnvironment, rewrite_file_urls_for_server,
};
use rstest::*;
use tempfile::TempDir;

struct Site {
	dir: TempDir,
}

impl Site {
	fn src(&self) -> PathBuf {
		self.dir.path().join("src")
	}

	fn write(&self, name: &str, contents: &str) -> PathBuf {
		let path = self.src().join(name);
		fs::create_dir_all(path.parent().unwrap()).unwrap();
		fs::write(&path, contents).unwrap();
		path
	}

	fn renderer(&self) -> Renderer {
		Renderer::new(
			RenderOptions::new(self.src(), self.dir.path())
				.with_environment(ScriptEnvironment::new().with_fixed_time(0.0)),
		)
	}
}

#[fixture]
fn site() -> Site {
	let dir = TempDir::new().unwrap();
	fs::create_dir_all(dir.path().join("src")).unwrap();
	Site { dir }
}

fn page(head: &str, body: &str) -> String {
	format!("<!doctype html>\n<html>\n<head><title>T</title>{head}</head>\n<body>{body}</body>\n</html>\n")
}

#[rstest]
fn test_inline_classic_script_renders_and_is_kept(site: Site) {
	let script = "<script>const h = document.createElement('h1'); h.textContent = 'Hi'; document.body.appendChild(h);</script>";
	let path = site.write("index.html", &page("", script));

	let output = site.renderer().render_file(&path).unwrap();

	assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
	assert!(output.html.contains(&format!("<body><h1>Hi</h1>{script}\n</body>")));
	assert!(output.html.starts_with("<!doctype html>\n<html>\n<head><title>T</title></head>"));
	assert!(output.html.ends_with("</body>\n</html>\n"));
}

#[rstest]
fn test_shared_dependency_runs_once(site: Site) {
	site.write("d.js", "window.count = (window.count || 0) + 1;\nexport const d = 1;\n");
	site.write("b.js", "import { d } from './d.js';\nexport const b = d;\n");
	site.write("c.js", "import { d } from './d.js';\nexport const c = d;\n");
	let path = site.write(
		"index.html",
		&page(
			"",
			"<script type=\"module\">import { b } from './b.js';\nimport { c } from './c.js';\ndocument.body.textContent = window.count + ':' + (b + c);</script>",
		),
	);

	let output = site.renderer().render_file(&path).unwrap();

	assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
	assert!(output.html.contains("<body>1:2<script type=\"module\">"));
	let names: Vec<_> = output
		.loaded_modules
		.iter()
		.map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
		.collect();
	assert_eq!(names, vec!["b.js", "d.js", "c.js"]);
}

#[rstest]
fn test_renders_are_isolated_and_repeatable(site: Site) {
	let path = site.write(
		"index.html",
		&page(
			"",
			"<script>window.runs = (window.runs || 0) + 1;\nconst bytes = crypto.getRandomValues(new Uint8Array(4));\ndocument.body.textContent = [window.runs, Array.from(bytes).join('.'), Date.now()].join('|');</script>",
		),
	);
	let renderer = site.renderer();

	let first = renderer.render_file(&path).unwrap();
	let second = renderer.render_file(&path).unwrap();

	assert_eq!(first.html, second.html);
	assert!(first.html.contains("<body>1|"));
}

#[rstest]
fn test_missing_module_does_not_stop_the_render(site: Site) {
	let path = site.write(
		"index.html",
		&page(
			"",
			"<script type=\"module\" src=\"./missing.js\"></script><script>document.body.appendChild(document.createTextNode('ok'));</script>",
		),
	);

	let output = site.renderer().render_file(&path).unwrap();

	assert!(output.diagnostics.iter().any(|d| matches!(
		d,
		Diagnostic::ModuleNotFound { specifier, .. } if specifier == "./missing.js"
	)));
	assert!(output.html.contains("<body>ok<script"));
}

#[rstest]
fn test_failing_script_is_reported_and_later_scripts_run(site: Site) {
	let path = site.write(
		"index.html",
		&page(
			"",
			"<script>throw new Error('broken');</script><script>document.body.appendChild(document.createTextNode('after'));</script>",
		),
	);

	let output = site.renderer().render_file(&path).unwrap();

	assert!(output.diagnostics.iter().any(|d| matches!(
		d,
		Diagnostic::ScriptFailed { message, .. } if message.contains("broken")
	)));
	assert!(output.html.contains("<body>after<script>throw"));
}

#[rstest]
fn test_later_import_map_entry_wins(site: Site) {
	site.write("a.js", "document.body.textContent = 'a';\n");
	site.write("b.js", "document.body.textContent = 'b';\n");
	let path = site.write(
		"index.html",
		&page(
			"<script type=\"importmap\">{\"imports\": {\"lib\": \"./a.js\"}}</script><script type=\"importmap\">{\"imports\": {\"lib\": \"./b.js\"}}</script>",
			"<script type=\"module\">import 'lib';</script>",
		),
	);

	let output = site.renderer().render_file(&path).unwrap();

	assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
	assert!(output.html.contains("<body>b<script type=\"module\">"));
	assert!(output.import_map.get("lib").is_some());
}

#[rstest]
fn test_invalid_import_map_is_ignored(site: Site) {
	let path = site.write(
		"index.html",
		&page(
			"<script type=\"importmap\">{ not json</script>",
			"<script>document.body.textContent = 'fine';</script>",
		),
	);

	let output = site.renderer().render_file(&path).unwrap();

	assert!(matches!(
		output.diagnostics.as_slice(),
		[Diagnostic::ImportMapInvalid { .. }]
	));
	assert!(output.html.contains("<body>fine<script>"));
}

#[rstest]
fn test_head_additions_are_appended(site: Site) {
	let path = site.write(
		"index.html",
		&page(
			"<meta charset=\"utf-8\">",
			"<script type=\"module\">const link = document.createElement('link');\nlink.rel = 'stylesheet';\nlink.href = new URL('./button.css', import.meta.url).href;\ndocument.head.appendChild(link);</script>",
		),
	);

	let output = site.renderer().render_file(&path).unwrap();
	let html = rewrite_file_urls_for_server(&output.html, site.dir.path());

	assert!(
		html.contains("<head><title>T</title><meta charset=\"utf-8\"><link rel=\"stylesheet\" href=\"/src/button.css\" /></head>"),
		"{html}"
	);
}

#[rstest]
fn test_page_without_body_is_reported(site: Site) {
	let html = "<html><head></head><script>document.title = 'x';</script></html>";
	let output = site
		.renderer()
		.render_str(html, &site.src().join("fragment.html"))
		.unwrap();

	assert_eq!(output.diagnostics, vec![Diagnostic::MissingBody]);
	assert_eq!(output.html, html);
}

#[rstest]
fn test_data_scripts_are_not_executed(site: Site) {
	let path = site.write(
		"index.html",
		&page(
			"",
			"<script type=\"text/template\">document.body.textContent = 'no';</script>",
		),
	);

	let output = site.renderer().render_file(&path).unwrap();

	assert!(output.diagnostics.is_empty());
	assert!(output.html.contains("<body><script type=\"text/template\">"));
}

#[rstest]
fn test_location_follows_origin(site: Site) {
	let path = site.write(
		"docs/intro.html",
		&page("", "<script>document.body.textContent = location.pathname;</script>"),
	);
	let renderer = Renderer::new(
		RenderOptions::new(site.src(), site.dir.path()).with_origin("http://localhost:3000"),
	);

	let output = renderer.render_file(&path).unwrap();

	assert!(output.html.contains("<body>/docs/intro.html<script>"));
}

#[rstest]
fn test_missing_page_is_an_error(site: Site) {
	assert!(
		site.renderer()
			.render_file(&site.src().join("nope.html"))
			.is_err()
	);
}
