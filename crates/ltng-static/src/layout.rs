//! Mapping source files to their place in the output directory

use std::path::{Component, Path, PathBuf};

use ltng_transpile::{normalize_path, relative_path};

/// Source, project and output directories of a static build.
///
/// Files under `src_dir` keep their position relative to `src_dir`. Other
/// files, such as shared libraries next to the sources, keep their position
/// relative to `root_dir`.
///
/// # Examples
///
/// ```
/// use std::path::{Path, PathBuf};
/// use ltng_static::OutputLayout;
///
/// let layout = OutputLayout::new("/site/src", "/site", "/site/dist");
/// assert_eq!(
/// 	layout.destination(Path::new("/site/src/js/app.js")),
/// 	PathBuf::from("/site/dist/js/app.js")
/// );
/// assert_eq!(
/// 	layout.destination(Path::new("/site/pkg/button.js")),
/// 	PathBuf::from("/site/dist/pkg/button.js")
/// );
/// assert_eq!(
/// 	layout.relative_href(Path::new("/site/src/docs/a.html"), Path::new("/site/pkg/button.js")),
/// 	"../pkg/button.js"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
	src_dir: PathBuf,
	root_dir: PathBuf,
	dist_dir: PathBuf,
}

impl OutputLayout {
	pub fn new(
		src_dir: impl Into<PathBuf>,
		root_dir: impl Into<PathBuf>,
		dist_dir: impl Into<PathBuf>,
	) -> Self {
		Self {
			src_dir: normalize_path(&src_dir.into()),
			root_dir: normalize_path(&root_dir.into()),
			dist_dir: normalize_path(&dist_dir.into()),
		}
	}

	pub fn src_dir(&self) -> &Path {
		&self.src_dir
	}

	pub fn root_dir(&self) -> &Path {
		&self.root_dir
	}

	pub fn dist_dir(&self) -> &Path {
		&self.dist_dir
	}

	/// Where `source` is written in the output directory.
	///
	/// Paths outside both `src_dir` and `root_dir` drop their leading `..`
	/// components so they never escape `dist_dir`.
	pub fn destination(&self, source: &Path) -> PathBuf {
		let source = normalize_path(source);
		if let Ok(rel) = source.strip_prefix(&self.src_dir) {
			return self.dist_dir.join(rel);
		}
		if let Ok(rel) = source.strip_prefix(&self.root_dir) {
			return self.dist_dir.join(rel);
		}
		let rel: PathBuf = relative_path(&self.root_dir, &source)
			.components()
			.skip_while(|c| matches!(c, Component::ParentDir))
			.collect();
		self.dist_dir.join(rel)
	}

	/// Link from the output of `page` to the output of `asset`, both given as
	/// source paths. Always starts with `./` or `../`.
	pub fn relative_href(&self, page: &Path, asset: &Path) -> String {
		let page_out = self.destination(page);
		let from = page_out.parent().unwrap_or(&self.dist_dir);
		let href = to_url_path(&relative_path(from, &self.destination(asset)));
		if href.starts_with('.') {
			href
		} else {
			format!("./{href}")
		}
	}
}

/// Joins path components with `/`.
pub(crate) fn to_url_path(path: &Path) -> String {
	path.components()
		.map(|c| c.as_os_str().to_string_lossy().into_owned())
		.collect::<Vec<_>>()
		.join("/")
}
