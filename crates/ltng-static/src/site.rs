//! Static site generation

use std::path::{Path, PathBuf};

use ltng_render::{Diagnostic, Renderer};
use walkdir::WalkDir;

use crate::assets::AssetScanner;
use crate::error::{StaticError, StaticResult, read_to_string, write_file};
use crate::layout::OutputLayout;
use crate::rewrite::rewrite_page;

/// Outcome of one rendered page.
#[derive(Debug, Clone)]
pub struct PageReport {
	pub source: PathBuf,
	pub output: PathBuf,
	pub diagnostics: Vec<Diagnostic>,
	pub assets: Vec<PathBuf>,
	/// Assets that could not be copied, with the reason
	pub asset_failures: Vec<(PathBuf, String)>,
}

/// Summary of a whole build.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
	pub pages: Vec<PageReport>,
	/// Pages that could not be rendered or written, with the reason
	pub failures: Vec<(PathBuf, String)>,
}

impl BuildReport {
	pub fn is_success(&self) -> bool {
		self.failures.is_empty()
	}

	pub fn assets_copied(&self) -> usize {
		self.pages.iter().map(|p| p.assets.len()).sum()
	}

	pub fn asset_failures(&self) -> usize {
		self.pages.iter().map(|p| p.asset_failures.len()).sum()
	}
}

/// Renders every page under the source directory into the output directory.
///
/// Pages render one after another. A page that fails is logged and recorded
/// in the [`BuildReport`]; the build carries on with the next page. Only an
/// output directory that cannot be created stops the build.
pub struct SiteBuilder {
	renderer: Renderer,
	layout: OutputLayout,
}

impl SiteBuilder {
	pub fn new(renderer: Renderer, dist_dir: impl Into<PathBuf>) -> Self {
		let options = renderer.options();
		let layout = OutputLayout::new(&options.src_dir, &options.root_dir, dist_dir);
		Self { renderer, layout }
	}

	pub fn layout(&self) -> &OutputLayout {
		&self.layout
	}

	/// `.html` files under the source directory, sorted by path. The output
	/// directory is skipped when it lives inside the sources.
	pub fn discover_pages(&self) -> StaticResult<Vec<PathBuf>> {
		let dist = self.layout.dist_dir();
		let mut pages = Vec::new();
		let walker = WalkDir::new(self.layout.src_dir())
			.sort_by_file_name()
			.into_iter()
			.filter_entry(|entry| !entry.path().starts_with(dist));
		for entry in walker {
			let entry = entry?;
			if entry.file_type().is_file()
				&& entry.path().extension().is_some_and(|ext| ext == "html")
			{
				pages.push(ltng_transpile::normalize_path(entry.path()));
			}
		}
		Ok(pages)
	}

	pub fn build(&self) -> StaticResult<BuildReport> {
		let dist = self.layout.dist_dir();
		std::fs::create_dir_all(dist).map_err(|source| StaticError::OutputDir {
			path: dist.to_path_buf(),
			source,
		})?;
		tracing::info!(
			src = %self.layout.src_dir().display(),
			dist = %dist.display(),
			"building static site"
		);

		let mut report = BuildReport::default();
		for page in self.discover_pages()? {
			match self.build_page(&page) {
				Ok(page_report) => {
					tracing::info!(
						page = %page.display(),
						assets = page_report.assets.len(),
						asset_failures = page_report.asset_failures.len(),
						"rendered page"
					);
					report.pages.push(page_report);
				}
				Err(err) => {
					tracing::error!(page = %page.display(), error = %err, "failed to build page");
					report.failures.push((page, err.to_string()));
				}
			}
		}

		tracing::info!(
			pages = report.pages.len(),
			failures = report.failures.len(),
			asset_failures = report.asset_failures(),
			"static build complete"
		);
		Ok(report)
	}

	/// Renders, rewrites and writes one page, then copies what it references.
	///
	/// Assets that cannot be copied are listed in the report instead of
	/// failing the page.
	pub fn build_page(&self, page: &Path) -> StaticResult<PageReport> {
		let original = read_to_string(page)?;
		let rendered = self.renderer.render_str(&original, page)?;

		let output = self.layout.destination(page);
		let html = rewrite_page(&rendered.html, page, &self.layout);
		write_file(&output, html)?;

		let assets = AssetScanner::new(self.renderer.resolver()).scan_page(
			&original,
			page,
			&rendered.import_map,
		);
		let copy = assets.copy_into(&self.layout);

		Ok(PageReport {
			source: page.to_path_buf(),
			output,
			diagnostics: rendered.diagnostics,
			assets: copy.copied,
			asset_failures: copy.failed,
		})
	}
}
