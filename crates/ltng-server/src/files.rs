//! Mapping request paths onto files

use std::path::{Component, Path, PathBuf};

use ltng_transpile::normalize_path;
use percent_encoding::percent_decode_str;

/// How many directories above the project root are searched in CSR mode
pub const PARENT_SEARCH_DEPTH: usize = 3;

/// A request path that was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathRejection {
	/// The decoded path contains a `..` segment
	Traversal,
	/// The path is not valid UTF-8 once decoded, or contains a NUL byte
	Malformed,
}

/// Turns a URL path into a relative file path.
///
/// The path is percent-decoded and split on `/`. Empty and `.` segments are
/// dropped. `/` maps to an empty path.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use ltng_server::{PathRejection, request_file_path};
///
/// assert_eq!(request_file_path("/pkg/my%20ui.js"), Ok(PathBuf::from("pkg/my ui.js")));
/// assert_eq!(request_file_path("/a/%2e%2e/b"), Err(PathRejection::Traversal));
/// ```
pub fn request_file_path(url_path: &str) -> Result<PathBuf, PathRejection> {
	let decoded = percent_decode_str(url_path)
		.decode_utf8()
		.map_err(|_| PathRejection::Malformed)?;
	if decoded.contains('\0') {
		return Err(PathRejection::Malformed);
	}

	let mut path = PathBuf::new();
	for segment in decoded.split(['/', '\\']) {
		match segment {
			"" | "." => {}
			".." => return Err(PathRejection::Traversal),
			segment => path.push(segment),
		}
	}
	// a segment like `C:` would make the path absolute on Windows
	if path.components().any(|c| !matches!(c, Component::Normal(_))) {
		return Err(PathRejection::Malformed);
	}
	Ok(path)
}

/// `index.html` for the site root, otherwise `path` unchanged.
pub(crate) fn page_or_index(path: PathBuf) -> PathBuf {
	if path.as_os_str().is_empty() {
		PathBuf::from("index.html")
	} else {
		path
	}
}

/// Ordered directories a request path is looked up in.
#[derive(Debug, Clone)]
pub struct FileLookup {
	dirs: Vec<PathBuf>,
}

impl FileLookup {
	pub fn new(dirs: Vec<PathBuf>) -> Self {
		let mut unique: Vec<PathBuf> = Vec::with_capacity(dirs.len());
		for dir in dirs {
			let dir = normalize_path(&dir);
			if !unique.contains(&dir) {
				unique.push(dir);
			}
		}
		Self { dirs: unique }
	}

	/// Source directory, then project root, then up to
	/// [`PARENT_SEARCH_DEPTH`] directories above the root.
	pub fn client_side(src_dir: &Path, root_dir: &Path) -> Self {
		let mut dirs = vec![src_dir.to_path_buf(), root_dir.to_path_buf()];
		let root = normalize_path(root_dir);
		dirs.extend(root.ancestors().skip(1).take(PARENT_SEARCH_DEPTH).map(Path::to_path_buf));
		Self::new(dirs)
	}

	pub fn single(dir: &Path) -> Self {
		Self::new(vec![dir.to_path_buf()])
	}

	pub fn dirs(&self) -> &[PathBuf] {
		&self.dirs
	}

	/// First existing file for `relative`.
	///
	/// The site root maps to `index.html`. A path without an extension
	/// first tries `<path>.html` in the first directory, so `/about` serves
	/// `about.html`. A directory serves its `index.html`.
	pub fn find(&self, relative: &Path) -> Option<PathBuf> {
		let relative = self.clean_url(page_or_index(relative.to_path_buf()));
		self.dirs.iter().find_map(|dir| {
			let candidate = dir.join(&relative);
			if candidate.is_file() {
				return Some(candidate);
			}
			let index = candidate.join("index.html");
			index.is_file().then_some(index)
		})
	}

	fn clean_url(&self, relative: PathBuf) -> PathBuf {
		if relative.extension().is_some() {
			return relative;
		}
		let mut html = relative.clone().into_os_string();
		html.push(".html");
		let html = PathBuf::from(html);
		match self.dirs.first() {
			Some(first) if first.join(&html).is_file() => html,
			_ => relative,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::*;
	use std::fs;
	use tempfile::TempDir;

	#[rstest]
	#[case("/", "")]
	#[case("/index.html", "index.html")]
	#[case("//pkg/./ui.js", "pkg/ui.js")]
	#[case("/blog/", "blog")]
	fn test_request_file_path(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(request_file_path(input), Ok(PathBuf::from(expected)));
	}

	#[rstest]
	#[case("/../etc/passwd", PathRejection::Traversal)]
	#[case("/pkg/%2E%2E/x", PathRejection::Traversal)]
	#[case("/a\\..\\b", PathRejection::Traversal)]
	#[case("/a%00b", PathRejection::Malformed)]
	#[case("/%ff", PathRejection::Malformed)]
	fn test_rejected_paths(#[case] input: &str, #[case] expected: PathRejection) {
		assert_eq!(request_file_path(input), Err(expected));
	}

	#[fixture]
	fn tree() -> TempDir {
		let dir = TempDir::new().unwrap();
		for (name, body) in [
			("work/app/src/index.html", "home"),
			("work/app/src/about.html", "about"),
			("work/app/src/docs/index.html", "docs"),
			("work/app/pkg/ui.js", "ui"),
			("work/shared/theme.css", "theme"),
		] {
			let path = dir.path().join(name);
			fs::create_dir_all(path.parent().unwrap()).unwrap();
			fs::write(path, body).unwrap();
		}
		dir
	}

	#[rstest]
	#[case("", "work/app/src/index.html")]
	#[case("about", "work/app/src/about.html")]
	#[case("docs", "work/app/src/docs/index.html")]
	#[case("pkg/ui.js", "work/app/pkg/ui.js")]
	#[case("shared/theme.css", "work/shared/theme.css")]
	fn test_client_side_lookup(tree: TempDir, #[case] request: &str, #[case] expected: &str) {
		let root = normalize_path(&tree.path().join("work/app"));
		let lookup = FileLookup::client_side(&root.join("src"), &root);

		assert_eq!(
			lookup.find(Path::new(request)),
			Some(normalize_path(&tree.path().join(expected)))
		);
	}

	#[rstest]
	fn test_lookup_miss(tree: TempDir) {
		let lookup = FileLookup::single(&tree.path().join("work/app/src"));
		assert_eq!(lookup.find(Path::new("pkg/ui.js")), None);
	}

	#[rstest]
	fn test_parent_search_is_bounded() {
		let lookup = FileLookup::client_side(Path::new("/a/b/c/d/e/src"), Path::new("/a/b/c/d/e"));
		assert_eq!(
			lookup.dirs(),
			&[
				PathBuf::from("/a/b/c/d/e/src"),
				PathBuf::from("/a/b/c/d/e"),
				PathBuf::from("/a/b/c/d"),
				PathBuf::from("/a/b/c"),
				PathBuf::from("/a/b"),
			]
		);
	}
}
