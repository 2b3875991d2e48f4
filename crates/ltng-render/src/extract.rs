//! Locating `<script>`, `<head>` and `<body>` in page markup
//!
//! Pages are scanned with regular expressions rather than parsed. Markup that
//! hides `</script>` inside a string literal or comments out a script tag will
//! confuse the scan.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

static SCRIPT_TAG: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?is)<script\b([^>]*)>(.*?)</script\s*>")
		.expect("SCRIPT_TAG: invalid regex pattern")
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r#"(?i)([a-z_:][-a-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#)
		.expect("ATTRIBUTE: invalid regex pattern")
});

// Greedy so a `</body>` inside an inline script does not end the region early
static BODY: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?is)<body\b[^>]*>(.*)</body\s*>").expect("BODY: invalid regex pattern")
});

static HEAD: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?is)<head\b[^>]*>(.*?)</head\s*>").expect("HEAD: invalid regex pattern")
});

const JAVASCRIPT_TYPES: &[&str] = &[
	"text/javascript",
	"application/javascript",
	"application/x-javascript",
	"text/ecmascript",
	"application/ecmascript",
	"text/jscript",
];

/// How a script tag is treated during a render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptKind {
	/// Plain script, executed as-is
	Classic,
	/// `type="module"`, transpiled and loaded with its dependencies
	Module,
	/// `type="importmap"`
	ImportMap,
	/// Any other type, such as JSON data blocks. Never executed.
	Data(String),
}

impl ScriptKind {
	fn from_type(ty: Option<&str>) -> Self {
		let Some(ty) = ty.map(|t| t.trim().to_ascii_lowercase()) else {
			return Self::Classic;
		};
		match ty.as_str() {
			"" => Self::Classic,
			"module" => Self::Module,
			"importmap" => Self::ImportMap,
			t if JAVASCRIPT_TYPES.contains(&t) => Self::Classic,
			_ => Self::Data(ty),
		}
	}

	pub fn is_executable(&self) -> bool {
		matches!(self, Self::Classic | Self::Module)
	}
}

/// One `<script>` element as it appears in the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptTag {
	pub kind: ScriptKind,
	pub src: Option<String>,
	/// Text between the open and close tags
	pub inline: String,
	/// The whole element, verbatim
	pub raw: String,
	/// Byte range of `raw` within the page
	pub span: Range<usize>,
}

/// Byte ranges of an element within the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
	/// Open tag through close tag
	pub outer: Range<usize>,
	/// Between the open and close tags
	pub inner: Range<usize>,
}

impl Region {
	pub fn contains(&self, span: &Range<usize>) -> bool {
		self.outer.start <= span.start && span.end <= self.outer.end
	}
}

/// Finds scripts and the head/body regions in a page.
pub trait ScriptExtractor: Send + Sync {
	/// Every script tag in document order.
	fn scripts(&self, html: &str) -> Vec<ScriptTag>;

	fn body_region(&self, html: &str) -> Option<Region>;

	fn head_region(&self, html: &str) -> Option<Region>;

	/// Contents of each `<script type="importmap">`, in document order.
	fn import_maps(&self, html: &str) -> Vec<String> {
		self.scripts(html)
			.into_iter()
			.filter(|tag| tag.kind == ScriptKind::ImportMap)
			.map(|tag| tag.inline)
			.collect()
	}
}

/// [`ScriptExtractor`] built on regular expressions.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegexScriptExtractor;

impl RegexScriptExtractor {
	pub fn new() -> Self {
		Self
	}
}

fn region(pattern: &Regex, html: &str) -> Option<Region> {
	let caps = pattern.captures(html)?;
	let outer = caps.get(0)?;
	let inner = caps.get(1)?;
	Some(Region {
		outer: outer.range(),
		inner: inner.range(),
	})
}

/// Looks up an attribute in the attribute text of an open tag.
///
/// Names are matched case-insensitively. Attributes without a value yield an
/// empty string.
///
/// # Examples
///
/// ```
/// use ltng_render::extract::attribute;
///
/// let attrs = r#" type="module" src='./app.js' defer"#;
/// assert_eq!(attribute(attrs, "SRC").as_deref(), Some("./app.js"));
/// assert_eq!(attribute(attrs, "defer").as_deref(), Some(""));
/// assert_eq!(attribute(attrs, "async"), None);
/// ```
pub fn attribute(attrs: &str, name: &str) -> Option<String> {
	ATTRIBUTE.captures_iter(attrs).find_map(|caps| {
		if !caps[1].eq_ignore_ascii_case(name) {
			return None;
		}
		let value = caps
			.get(2)
			.or_else(|| caps.get(3))
			.or_else(|| caps.get(4))
			.map_or("", |m| m.as_str());
		Some(value.to_string())
	})
}

impl ScriptExtractor for RegexScriptExtractor {
	fn scripts(&self, html: &str) -> Vec<ScriptTag> {
		SCRIPT_TAG
			.captures_iter(html)
			.filter_map(|caps| {
				let whole = caps.get(0)?;
				let attrs = caps.get(1).map_or("", |m| m.as_str());
				Some(ScriptTag {
					kind: ScriptKind::from_type(attribute(attrs, "type").as_deref()),
					src: attribute(attrs, "src").filter(|s| !s.trim().is_empty()),
					inline: caps.get(2).map_or("", |m| m.as_str()).to_string(),
					raw: whole.as_str().to_string(),
					span: whole.range(),
				})
			})
			.collect()
	}

	fn body_region(&self, html: &str) -> Option<Region> {
		region(&BODY, html)
	}

	fn head_region(&self, html: &str) -> Option<Region> {
		region(&HEAD, html)
	}
}
