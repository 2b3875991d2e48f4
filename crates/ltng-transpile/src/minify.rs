//! Line-oriented minification for bundles

use std::sync::LazyLock;

use regex::Regex;

static BLOCK_COMMENT: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("BLOCK_COMMENT: invalid regex pattern"));

static LINE_COMMENT: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?m)^\s*//.*$").expect("LINE_COMMENT: invalid regex pattern"));

/// Removes block comments and whole-line `//` comments, trims every line and
/// drops empty lines. Line breaks between statements are kept, so code that
/// relies on automatic semicolon insertion keeps working.
///
/// # Examples
///
/// ```
/// use ltng_transpile::minify;
///
/// let code = "/* header */\nfunction a() {\n    // note\n    return 1;\n}\n\n";
/// assert_eq!(minify(code), "function a() {\nreturn 1;\n}");
/// ```
pub fn minify(code: &str) -> String {
	let without_blocks = BLOCK_COMMENT.replace_all(code, "");
	let without_lines = LINE_COMMENT.replace_all(&without_blocks, "");
	without_lines
		.lines()
		.map(str::trim)
		.filter(|line| !line.is_empty())
		.collect::<Vec<_>>()
		.join("\n")
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_trailing_comments_are_kept() {
		// Only whole-line comments are removed; a trailing `//` may be inside a string.
		assert_eq!(minify("const u = 'http://x'; // end"), "const u = 'http://x'; // end");
	}

	#[rstest]
	fn test_file_markers_are_stripped() {
		let bundle = "// File: a.js\n(function(){\n  var a = 1;\n})();\n";
		assert_eq!(minify(bundle), "(function(){\nvar a = 1;\n})();");
	}
}
