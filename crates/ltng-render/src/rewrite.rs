//! `file://` URL rewriting for pages served by the dev server

use std::path::Path;
use std::sync::LazyLock;

use ltng_transpile::{normalize_path, relative_path};
use regex::{Captures, Regex};

static QUOTED_FILE_URL: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r#"["']file://([^"']*)["']"#).expect("QUOTED_FILE_URL: invalid regex pattern")
});

/// Rewrites quoted `file://` URLs in rendered markup into server paths.
///
/// Rendering resolves `import.meta.url` to `file://` URLs, which a browser
/// cannot load from an `http` page. Files under `root_dir` become `/`-rooted
/// paths; files outside it keep a `..`-prefixed relative path. The rewritten
/// value is always double-quoted.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use ltng_render::rewrite_file_urls_for_server;
///
/// let html = r#"<link rel="stylesheet" href="file:///site/src/button.css">"#;
/// assert_eq!(
/// 	rewrite_file_urls_for_server(html, Path::new("/site")),
/// 	r#"<link rel="stylesheet" href="/src/button.css">"#
/// );
/// ```
pub fn rewrite_file_urls_for_server(html: &str, root_dir: &Path) -> String {
	let root = normalize_path(root_dir);
	QUOTED_FILE_URL
		.replace_all(html, |caps: &Captures| {
			let path = caps[1].split(['?', '#']).next().unwrap_or_default();
			let absolute = normalize_path(Path::new(&format!("/{}", path.trim_start_matches('/'))));
			let relative = relative_path(&root, &absolute)
				.components()
				.map(|c| c.as_os_str().to_string_lossy().into_owned())
				.collect::<Vec<_>>()
				.join("/");
			if relative.starts_with("..") {
				format!("\"{relative}\"")
			} else {
				format!("\"/{relative}\"")
			}
		})
		.into_owned()
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("src='file:///site/src/a.js'", "src=\"/src/a.js\"")]
	#[case("href=\"file:///site/shared/x.css?v=1\"", "href=\"/shared/x.css\"")]
	#[case("href=\"file:///other/x.css\"", "href=\"../other/x.css\"")]
	#[case("href=\"https://cdn.example.com/x.css\"", "href=\"https://cdn.example.com/x.css\"")]
	fn test_rewrite(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(rewrite_file_urls_for_server(input, Path::new("/site")), expected);
	}
}
