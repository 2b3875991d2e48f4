//! Rewriting page references for the output directory

use std::ops::Range;
use std::path::Path;
use std::sync::LazyLock;

use ltng_render::{RegexScriptExtractor, ScriptExtractor, ScriptKind};
use ltng_transpile::{is_remote_specifier, normalize_path};
use regex::{Captures, Regex};

use crate::layout::OutputLayout;

static URL_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r#"(?i)\b(src|href)\s*=\s*["']([^"']*)["']"#)
		.expect("URL_ATTRIBUTE: invalid regex pattern")
});

static QUOTED_FILE_URL: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r#"["'](file://[^"']*)["']"#).expect("QUOTED_FILE_URL: invalid regex pattern")
});

const UNTOUCHED_PREFIXES: &[&str] = &["#", "/", "mailto:", "javascript:", "tel:"];

/// Rewrites a rendered page so its references work from the output directory.
///
/// Import map targets, `src`/`href` attribute values and quoted `file://`
/// URLs all become `./`-relative links from the page's output location to the
/// asset's output location. Remote URLs, fragments, `/`-rooted paths and
/// `mailto:`/`javascript:` links are left alone.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use ltng_static::{OutputLayout, rewrite_page};
///
/// let layout = OutputLayout::new("/site/src", "/site", "/site/dist");
/// let html = r#"<script src="../pkg/app.js"></script><a href="https://example.com">x</a>"#;
/// assert_eq!(
/// 	rewrite_page(html, Path::new("/site/src/index.html"), &layout),
/// 	r#"<script src="./pkg/app.js"></script><a href="https://example.com">x</a>"#
/// );
/// ```
pub fn rewrite_page(html: &str, page: &Path, layout: &OutputLayout) -> String {
	let rewriter = Rewriter { page, layout };
	let html = rewriter.import_maps(html);
	let html = URL_ATTRIBUTE.replace_all(&html, |caps: &Captures| {
		match rewriter.reference(&caps[2]) {
			Some(href) => format!("{}=\"{}\"", &caps[1], href),
			None => caps[0].to_string(),
		}
	});
	QUOTED_FILE_URL
		.replace_all(&html, |caps: &Captures| match rewriter.reference(&caps[1]) {
			Some(href) => format!("\"{href}\""),
			None => caps[0].to_string(),
		})
		.into_owned()
}

struct Rewriter<'a> {
	page: &'a Path,
	layout: &'a OutputLayout,
}

impl Rewriter<'_> {
	/// New value for `reference`, or `None` to leave it as written.
	fn reference(&self, reference: &str) -> Option<String> {
		let reference = reference.trim();
		if reference.is_empty() || is_remote_specifier(reference) {
			return None;
		}

		let (target, suffix) = match reference.find(['?', '#']) {
			Some(at) => reference.split_at(at),
			None => (reference, ""),
		};
		let source = if let Some(path) = target.strip_prefix("file://") {
			normalize_path(Path::new(&format!("/{}", path.trim_start_matches('/'))))
		} else if UNTOUCHED_PREFIXES.iter().any(|p| reference.starts_with(p)) {
			return None;
		} else {
			let dir = self.page.parent().unwrap_or(Path::new(""));
			normalize_path(&dir.join(target))
		};

		let mut href = self.layout.relative_href(self.page, &source);
		if target.ends_with('/') && !href.ends_with('/') {
			href.push('/');
		}
		href.push_str(suffix);
		Some(href)
	}

	/// Rewrites the targets inside every import map script.
	fn import_maps(&self, html: &str) -> String {
		let mut edits: Vec<(Range<usize>, String)> = RegexScriptExtractor
			.scripts(html)
			.into_iter()
			.filter(|tag| tag.kind == ScriptKind::ImportMap)
			.filter_map(|tag| Some((tag.span, self.import_map(&tag.inline)?)))
			.collect();

		let mut out = html.to_string();
		edits.sort_by_key(|(span, _)| std::cmp::Reverse(span.start));
		for (span, replacement) in edits {
			out.replace_range(span, &replacement);
		}
		out
	}

	fn import_map(&self, json: &str) -> Option<String> {
		let mut map: serde_json::Value = match serde_json::from_str(json) {
			Ok(map) => map,
			Err(err) => {
				tracing::warn!(page = %self.page.display(), error = %err, "leaving invalid import map unchanged");
				return None;
			}
		};
		if let Some(imports) = map.get_mut("imports").and_then(|v| v.as_object_mut()) {
			for value in imports.values_mut() {
				let Some(target) = value.as_str() else {
					continue;
				};
				if let Some(href) = self.reference(target) {
					*value = serde_json::Value::String(href);
				}
			}
		}
		let pretty = serde_json::to_string_pretty(&map).ok()?;
		Some(format!("<script type=\"importmap\">\n{pretty}\n</script>"))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn layout() -> OutputLayout {
		OutputLayout::new("/site/src", "/site", "/site/dist")
	}

	#[rstest]
	#[case(r#"<link href="../style.css?v=3">"#, r#"<link href="../style.css?v=3">"#)]
	#[case(r#"<img src='../img/logo.png'>"#, r#"<img src="../img/logo.png">"#)]
	#[case(r#"<script src="./app.js">"#, r#"<script src="./app.js">"#)]
	#[case(r#"<a href="/about">"#, r#"<a href="/about">"#)]
	#[case(r##"<a href="#top">"##, r##"<a href="#top">"##)]
	#[case(r#"<a href="mailto:a@b.c">"#, r#"<a href="mailto:a@b.c">"#)]
	#[case(r#"<script src="//cdn.example.com/x.js">"#, r#"<script src="//cdn.example.com/x.js">"#)]
	#[case(r#"<link href="file:///site/pkg/ui.css">"#, r#"<link href="../pkg/ui.css">"#)]
	fn test_rewrite_nested_page(#[case] input: &str, #[case] expected: &str) {
		let page = Path::new("/site/src/blog/post.html");
		assert_eq!(rewrite_page(input, page, &layout()), expected);
	}

	#[rstest]
	fn test_import_map_targets_are_rewritten() {
		let html = "<head><script type=\"importmap\">{\"imports\": {\"ui\": \"../pkg/ui/index.js\", \"lib/\": \"./vendor/lib/\", \"cdn\": \"https://cdn.example.com/x.js\"}}</script></head>";
		let out = rewrite_page(html, Path::new("/site/src/index.html"), &layout());

		let json = out
			.trim_start_matches("<head><script type=\"importmap\">\n")
			.trim_end_matches("\n</script></head>");
		let map: serde_json::Value = serde_json::from_str(json).unwrap();
		assert_eq!(map["imports"]["ui"], "./pkg/ui/index.js");
		assert_eq!(map["imports"]["lib/"], "./vendor/lib/");
		assert_eq!(map["imports"]["cdn"], "https://cdn.example.com/x.js");
	}

	#[rstest]
	fn test_file_urls_outside_attributes() {
		let html = "<div style=\"--x: 1\" data-css='file:///site/src/a.css'></div>";
		assert_eq!(
			rewrite_page(html, Path::new("/site/src/index.html"), &layout()),
			"<div style=\"--x: 1\" data-css=\"./a.css\"></div>"
		);
	}
}
