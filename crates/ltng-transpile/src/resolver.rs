//! Module specifier resolution

use std::path::{Component, Path, PathBuf};

use crate::import_map::ImportMap;

/// Outcome of resolving a specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
	/// A file on disk. Existence is not checked.
	Local(PathBuf),
	/// A URL the server never fetches.
	Remote(String),
}

impl Resolution {
	pub fn local(&self) -> Option<&Path> {
		match self {
			Resolution::Local(path) => Some(path),
			Resolution::Remote(_) => None,
		}
	}
}

/// Returns true for specifiers that point off the local filesystem.
pub fn is_remote_specifier(specifier: &str) -> bool {
	let lower = specifier.to_ascii_lowercase();
	lower.starts_with("http://")
		|| lower.starts_with("https://")
		|| lower.starts_with("//")
		|| lower.starts_with("data:")
		|| lower.starts_with("blob:")
}

/// Lexically removes `.` and `..` components without touching the disk.
///
/// # Examples
///
/// ```
/// use std::path::{Path, PathBuf};
/// use ltng_transpile::normalize_path;
///
/// assert_eq!(normalize_path(Path::new("/a/b/../c/./d.js")), PathBuf::from("/a/c/d.js"));
/// ```
pub fn normalize_path(path: &Path) -> PathBuf {
	let mut out = PathBuf::new();
	for component in path.components() {
		match component {
			Component::CurDir => {}
			Component::ParentDir => {
				if !out.pop() {
					out.push("..");
				}
			}
			other => out.push(other.as_os_str()),
		}
	}
	out
}

/// Lexical path from directory `from` to `to`, using `..` where needed.
///
/// Both paths are normalized first and are expected to be absolute.
///
/// # Examples
///
/// ```
/// use std::path::{Path, PathBuf};
/// use ltng_transpile::relative_path;
///
/// assert_eq!(
/// 	relative_path(Path::new("/site/dist/docs"), Path::new("/site/dist/js/app.js")),
/// 	PathBuf::from("../js/app.js")
/// );
/// ```
pub fn relative_path(from: &Path, to: &Path) -> PathBuf {
	let from = normalize_path(from);
	let to = normalize_path(to);
	let from: Vec<_> = from.components().collect();
	let to: Vec<_> = to.components().collect();
	let shared = from
		.iter()
		.zip(to.iter())
		.take_while(|(a, b)| a == b)
		.count();

	let mut out = PathBuf::new();
	for _ in shared..from.len() {
		out.push("..");
	}
	for component in &to[shared..] {
		out.push(component.as_os_str());
	}
	out
}

/// Resolves module specifiers for one project.
///
/// `src_dir` is the directory pages are served from and `root_dir` the
/// project root. A specifier starting with `/` is a server-rooted URL path:
/// it is looked up under `src_dir` first and falls back to `root_dir`.
#[derive(Debug, Clone)]
pub struct PathResolver {
	src_dir: PathBuf,
	root_dir: PathBuf,
}

impl PathResolver {
	pub fn new(src_dir: impl Into<PathBuf>, root_dir: impl Into<PathBuf>) -> Self {
		Self {
			src_dir: normalize_path(&src_dir.into()),
			root_dir: normalize_path(&root_dir.into()),
		}
	}

	pub fn src_dir(&self) -> &Path {
		&self.src_dir
	}

	pub fn root_dir(&self) -> &Path {
		&self.root_dir
	}

	/// Resolves `specifier` as imported from a file in `importer_dir`.
	///
	/// The import map is consulted first; its relative targets resolve
	/// against the directory of the declaring document. Without a map entry
	/// the specifier resolves relative to `importer_dir`.
	pub fn resolve(&self, importer_dir: &Path, specifier: &str, import_map: &ImportMap) -> Resolution {
		match import_map.lookup(specifier) {
			Some((target, base_dir)) => {
				tracing::trace!(specifier, target = %target, "import map hit");
				self.resolve_target(base_dir, &target)
			}
			None => self.resolve_target(importer_dir, specifier),
		}
	}

	fn resolve_target(&self, base_dir: &Path, target: &str) -> Resolution {
		if is_remote_specifier(target) {
			return Resolution::Remote(target.to_string());
		}
		if let Some(path) = target.strip_prefix("file://") {
			return Resolution::Local(normalize_path(Path::new(path)));
		}
		let target = strip_query(target);
		if target.starts_with('/') {
			return Resolution::Local(self.resolve_rooted(target));
		}
		Resolution::Local(normalize_path(&base_dir.join(target)))
	}

	/// Maps a server-rooted URL path (`/app/main.js`) to a file.
	///
	/// Absolute filesystem paths already inside the project root are kept
	/// as they are.
	pub fn resolve_rooted(&self, url_path: &str) -> PathBuf {
		let as_path = normalize_path(Path::new(url_path));
		if as_path.starts_with(&self.root_dir) && self.root_dir != Path::new("/") {
			return as_path;
		}

		let relative = url_path.trim_start_matches('/');
		let in_src = normalize_path(&self.src_dir.join(relative));
		if in_src.exists() {
			return in_src;
		}
		let in_root = normalize_path(&self.root_dir.join(relative));
		if in_root.exists() { in_root } else { in_src }
	}
}

fn strip_query(target: &str) -> &str {
	target.split(['?', '#']).next().unwrap_or(target)
}
