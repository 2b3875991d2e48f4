//! Discovering the files a page needs at runtime

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use indexmap::IndexSet;
use ltng_transpile::{ImportMap, PathResolver, Resolution, is_remote_specifier, scanner};
use regex::Regex;

use crate::error::{StaticError, StaticResult};
use crate::layout::OutputLayout;

static ASSET_TAG: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r#"(?is)<(?:script|link)\b[^>]*?\b(?:src|href)\s*=\s*["']([^"']*)["'][^>]*>"#)
		.expect("ASSET_TAG: invalid regex pattern")
});

/// Outcome of [`AssetSet::copy_into`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetCopy {
	/// Destinations written, in discovery order
	pub copied: Vec<PathBuf>,
	/// Sources that could not be copied, with the reason
	pub failed: Vec<(PathBuf, String)>,
}

/// De-duplicated source files in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetSet {
	paths: IndexSet<PathBuf>,
}

impl AssetSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds `path`, returning false if it was already present.
	pub fn insert(&mut self, path: PathBuf) -> bool {
		self.paths.insert(path)
	}

	pub fn contains(&self, path: &Path) -> bool {
		self.paths.contains(path)
	}

	pub fn len(&self) -> usize {
		self.paths.len()
	}

	pub fn is_empty(&self) -> bool {
		self.paths.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Path> {
		self.paths.iter().map(PathBuf::as_path)
	}

	/// Copies every asset to its place under `layout`'s output directory.
	///
	/// A failed copy is logged and recorded; the remaining assets are still
	/// copied.
	pub fn copy_into(&self, layout: &OutputLayout) -> AssetCopy {
		let mut result = AssetCopy::default();
		for source in &self.paths {
			let dest = layout.destination(source);
			if dest == *source {
				continue;
			}
			match copy_asset(source, &dest) {
				Ok(()) => {
					tracing::debug!(from = %source.display(), to = %dest.display(), "copied asset");
					result.copied.push(dest);
				}
				Err(err) => {
					tracing::warn!(asset = %source.display(), error = %err, "failed to copy asset");
					result.failed.push((source.clone(), err.to_string()));
				}
			}
		}
		result
	}
}

fn copy_asset(source: &Path, dest: &Path) -> StaticResult<()> {
	if let Some(parent) = dest.parent() {
		std::fs::create_dir_all(parent).map_err(|e| StaticError::Write {
			path: parent.to_path_buf(),
			source: e,
		})?;
	}
	std::fs::copy(source, dest).map_err(|e| StaticError::Write {
		path: dest.to_path_buf(),
		source: e,
	})?;
	Ok(())
}

impl<'a> IntoIterator for &'a AssetSet {
	type Item = &'a PathBuf;
	type IntoIter = indexmap::set::Iter<'a, PathBuf>;

	fn into_iter(self) -> Self::IntoIter {
		self.paths.iter()
	}
}

/// Finds the files a page references, directly or through its modules.
///
/// Starting points are `<script src>` and `<link href>` targets of the
/// original page plus every local import map target. JavaScript files among
/// them are followed through their module specifiers,
/// `new URL('…', import.meta.url)` references and `loadCSS('…')` calls. Only
/// files that exist are collected.
pub struct AssetScanner<'a> {
	resolver: &'a PathResolver,
}

impl<'a> AssetScanner<'a> {
	pub fn new(resolver: &'a PathResolver) -> Self {
		Self { resolver }
	}

	pub fn scan_page(&self, original_html: &str, page: &Path, import_map: &ImportMap) -> AssetSet {
		let page_dir = page.parent().unwrap_or(Path::new(""));
		let empty = ImportMap::new();
		let mut roots = Vec::new();

		for caps in ASSET_TAG.captures_iter(original_html) {
			let reference = caps[1].trim();
			if reference.is_empty() || is_remote_specifier(reference) {
				continue;
			}
			if let Resolution::Local(path) = self.resolver.resolve(page_dir, reference, &empty) {
				roots.push(path);
			}
		}
		for (_, target) in import_map.iter() {
			if is_remote_specifier(&target.target) {
				continue;
			}
			if let Resolution::Local(path) =
				self.resolver.resolve(&target.base_dir, &target.target, &empty)
			{
				roots.push(path);
			}
		}

		let mut assets = AssetSet::new();
		for path in roots {
			self.visit(path, page_dir, import_map, &mut assets);
		}
		tracing::debug!(page = %page.display(), count = assets.len(), "scanned assets");
		assets
	}

	fn visit(&self, path: PathBuf, page_dir: &Path, import_map: &ImportMap, assets: &mut AssetSet) {
		if !path.is_file() || assets.contains(&path) {
			return;
		}
		let is_script = matches!(
			path.extension().and_then(|e| e.to_str()),
			Some("js" | "mjs")
		);
		assets.insert(path.clone());
		if !is_script {
			return;
		}

		let Ok(code) = std::fs::read_to_string(&path) else {
			return;
		};
		let dir = path.parent().unwrap_or(Path::new(""));
		let empty = ImportMap::new();

		for specifier in scanner::module_specifiers(&code) {
			if let Resolution::Local(dep) = self.resolver.resolve(dir, &specifier, import_map) {
				tracing::trace!(specifier = %specifier, path = %dep.display(), "scanned dependency");
				self.visit(dep, page_dir, import_map, assets);
			}
		}
		for url in scanner::asset_urls(&code) {
			if let Resolution::Local(asset) = self.resolver.resolve(dir, &url, &empty) {
				self.visit(asset, page_dir, import_map, assets);
			}
		}
		// loadCSS hrefs are resolved by the browser against the page
		for href in scanner::css_loads(&code) {
			if let Resolution::Local(css) = self.resolver.resolve(page_dir, &href, &empty) {
				self.visit(css, page_dir, import_map, assets);
			}
		}
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
		write("src/app.js", "import { Button } from 'ui';\nimport './missing.js';\n");
		write(
			"pkg/ui/button.js",
			"window.loadCSS(new URL('./button.css', import.meta.url).href);\nexport const Button = 1;\n",
		);
		write("pkg/ui/button.css", ".btn {}");
		write("src/style.css", "body {}");
		dir
	}

	#[rstest]
	fn test_scan_follows_modules_and_assets(project: TempDir) {
		let root = ltng_transpile::normalize_path(project.path());
		let src = root.join("src");
		let resolver = PathResolver::new(&src, &root);
		let map = ImportMap::parse(r#"{"imports": {"ui": "../pkg/ui/button.js"}}"#, &src).unwrap();
		let html = r#"<head><link rel="stylesheet" href="./style.css"><script src="https://cdn.example.com/x.js"></script></head>
<body><script type="module" src="./app.js"></script></body>"#;

		let assets = AssetScanner::new(&resolver).scan_page(html, &src.join("index.html"), &map);

		let found: Vec<PathBuf> = assets.iter().map(Path::to_path_buf).collect();
		assert_eq!(
			found,
			vec![
				src.join("style.css"),
				src.join("app.js"),
				root.join("pkg/ui/button.js"),
				root.join("pkg/ui/button.css"),
			]
		);
	}

	#[rstest]
	fn test_copy_into_mirrors_layout(project: TempDir) {
		let root = ltng_transpile::normalize_path(project.path());
		let layout = OutputLayout::new(root.join("src"), &root, root.join("dist"));
		let mut assets = AssetSet::new();
		assets.insert(root.join("src/style.css"));
		assets.insert(root.join("pkg/ui/button.css"));

		let result = assets.copy_into(&layout);

		assert_eq!(
			result.copied,
			vec![root.join("dist/style.css"), root.join("dist/pkg/ui/button.css")]
		);
		assert!(result.failed.is_empty());
		assert_eq!(fs::read_to_string(root.join("dist/pkg/ui/button.css")).unwrap(), ".btn {}");
	}

	#[rstest]
	fn test_copy_into_continues_after_failure(project: TempDir) {
		let root = ltng_transpile::normalize_path(project.path());
		let layout = OutputLayout::new(root.join("src"), &root, root.join("dist"));
		let mut assets = AssetSet::new();
		assets.insert(root.join("src/gone.css"));
		assets.insert(root.join("src/style.css"));

		let result = assets.copy_into(&layout);

		assert_eq!(result.copied, vec![root.join("dist/style.css")]);
		assert_eq!(result.failed.len(), 1);
		assert_eq!(result.failed[0].0, root.join("src/gone.css"));
		assert!(result.failed[0].1.contains("gone.css"), "{}", result.failed[0].1);
	}
}
