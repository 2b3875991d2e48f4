//! Resolution, scanning and transpilation of a small module graph on disk.

use std::fs;
use std::path::Path;

use ltng_transpile::{ImportMap, PathResolver, Resolution, Transpiler, normalize_path, scanner};
use rstest::*;
use tempfile::TempDir;

#[fixture]
fn site() -> TempDir {
	let dir = TempDir::new().unwrap();
	let src = dir.path().join("src");
	fs::create_dir_all(src.join("components")).unwrap();
	fs::write(
		src.join("components/button.js"),
		"window.loadCSS(new URL('./button.css', import.meta.url).href);\nexport function Button(label) {\n\treturn label;\n}\n",
	)
	.unwrap();
	fs::write(
		src.join("components/index.js"),
		"export * from './button.js';\nexport const version = '1';\n",
	)
	.unwrap();
	fs::write(
		src.join("app.js"),
		"import { Button } from 'ltng-components';\nimport './analytics.js';\ndocument.body.appendChild(Button('Go'));\n",
	)
	.unwrap();
	dir
}

#[rstest]
fn test_import_map_drives_dependency_resolution(site: TempDir) {
	let src = site.path().join("src");
	let resolver = PathResolver::new(&src, site.path());
	let map = ImportMap::parse(
		r#"{"imports": {"ltng-components": "./components/index.js"}}"#,
		&src,
	)
	.unwrap();

	let app = fs::read_to_string(src.join("app.js")).unwrap();
	let resolved: Vec<Resolution> = scanner::module_specifiers(&app)
		.iter()
		.map(|spec| resolver.resolve(&src, spec, &map))
		.collect();

	let src = normalize_path(&src);
	assert_eq!(
		resolved,
		vec![
			Resolution::Local(src.join("components/index.js")),
			Resolution::Local(src.join("analytics.js")),
		]
	);
}

#[rstest]
fn test_transpile_file_uses_path_for_import_meta(site: TempDir) {
	let path = site.path().join("src/components/button.js");
	let out = Transpiler::new().transpile_file(&path).unwrap();

	assert!(out.warnings.is_empty());
	assert!(out.code.contains("window.Button = globalThis.Button = Button;"));
	assert!(out.code.contains("file:///"));
	assert!(!out.code.contains("import.meta"));
	assert_eq!(
		scanner::asset_urls(&fs::read_to_string(&path).unwrap()),
		vec!["./button.css"]
	);
}

#[rstest]
fn test_bundle_transpile_strips_css_loader(site: TempDir) {
	let path = site.path().join("src/components/button.js");
	let out = Transpiler::new()
		.with_strip_load_css(true)
		.transpile_file(&path)
		.unwrap();
	assert!(!out.code.contains("loadCSS"));
	// Line count is preserved
	assert_eq!(
		out.code.lines().count(),
		fs::read_to_string(&path).unwrap().lines().count()
	);
}

#[rstest]
fn test_missing_file_is_an_error() {
	let err = Transpiler::new()
		.transpile_file(Path::new("/definitely/not/here.js"))
		.unwrap_err();
	assert!(err.to_string().contains("here.js"));
}
