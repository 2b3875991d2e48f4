//! ES module to global-scope rewriting
//!
//! The transpiler removes `import` and `export` statements from module
//! source and replaces them with property reads and writes on a scope
//! object. Exported bindings are also mirrored onto a global object so that
//! modules loaded later can see them regardless of the scope they use.
//!
//! | Source | Output (scope `window`, global `globalThis`) |
//! |--------|-----------------------------------------------|
//! | `import { a, b as c } from 'x'` | `var a = window.a; var c = window.b;` |
//! | `import D from 'x'` | `var D = window.default;` |
//! | `import * as ns from 'x'` | `var ns = window;` |
//! | `import 'x'` | removed |
//! | `export const A = 1` | `const A = window.A = globalThis.A = 1` |
//! | `export let a = 1, b` | `let a = window.a = globalThis.a = 1, b`, `b` mirrored after the body |
//! | `export function f() {}` | declaration kept, `window.f = globalThis.f = f;` prologue |
//! | `export class K {}` | `const K = window.K = globalThis.K = class K {}` |
//! | `export default e` | `window.default = globalThis.default = e` |
//! | `export default function F() {}` | declaration kept, `window.default = globalThis.default = F;` prologue |
//! | `export default class K {}` | `const K = window.default = globalThis.default = class K {}` |
//! | `export { a, b as c }` | `window.a = globalThis.a = a; window.c = globalThis.c = b;` |
//! | `export * from 'x'` | removed, the loader runs `x` first |
//! | `import.meta` | `({ url: "file:///path/to/file.js" })` |
//!
//! Each rewrite keeps the number of lines of the text it replaces so that
//! line numbers in script errors still point at the original source.

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, NoExpand, Regex};

use crate::error::{TranspileError, TranspileResult};

static LOAD_CSS_CALL: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r#"(?:window\.)?loadCSS\(\s*new\s+URL\(\s*(?:'[^']*'|"[^"]*"|`[^`]*`)\s*,\s*import\.meta\.url\s*\)\.href\s*\)\s*;?"#,
	)
	.expect("LOAD_CSS_CALL: invalid regex pattern")
});

static IMPORT_FROM: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r#"(?m)^(?P<indent>[ \t]*)import\s*(?P<clause>[\w$]+\s*,\s*\{[^}]*\}|[\w$]+\s*,\s*\*\s*as\s+[\w$]+|\{[^}]*\}|\*\s*as\s+[\w$]+|[\w$]+)\s*from\s*['"][^'"\n]*['"][ \t]*;?"#,
	)
	.expect("IMPORT_FROM: invalid regex pattern")
});

static IMPORT_SIDE_EFFECT: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r#"(?m)^(?P<indent>[ \t]*)import\s*['"][^'"\n]*['"][ \t]*;?"#)
		.expect("IMPORT_SIDE_EFFECT: invalid regex pattern")
});

static IMPORT_META: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\bimport\.meta\b").expect("IMPORT_META: invalid regex pattern"));

static EXPORT_STAR: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r#"(?m)^(?P<indent>[ \t]*)export\s*\*\s*(?:as\s+(?P<ns>[\w$]+)\s+)?from\s*['"][^'"\n]*['"][ \t]*;?"#,
	)
	.expect("EXPORT_STAR: invalid regex pattern")
});

static EXPORT_LIST: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r#"(?m)^(?P<indent>[ \t]*)export\s*\{(?P<list>[^}]*)\}(?P<from>\s*from\s*['"][^'"\n]*['"])?[ \t]*;?"#,
	)
	.expect("EXPORT_LIST: invalid regex pattern")
});

static EXPORT_DEFAULT: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?m)^(?P<indent>[ \t]*)export\s+default\s+")
		.expect("EXPORT_DEFAULT: invalid regex pattern")
});

static EXPORT_DEFAULT_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"(?m)^(?P<indent>[ \t]*)export\s+default\s+(?:(?P<function>(?:async\s+)?function\s*\*?\s*(?P<fname>[\w$]+))|class\s+(?P<cname>[\w$]+))",
	)
	.expect("EXPORT_DEFAULT_DECLARATION: invalid regex pattern")
});

static EXPORT_FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?m)^(?P<indent>[ \t]*)export\s+(?P<decl>(?:async\s+)?function\s*\*?\s*(?P<name>[\w$]+))")
		.expect("EXPORT_FUNCTION: invalid regex pattern")
});

static EXPORT_CLASS: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?m)^(?P<indent>[ \t]*)export\s+class\s+(?P<name>[\w$]+)")
		.expect("EXPORT_CLASS: invalid regex pattern")
});

static EXPORT_BINDING: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"(?m)^(?P<indent>[ \t]*)export\s+(?P<kw>const|let|var)\s+(?:(?P<name>[\w$]+)(?P<init>\s*=[ \t]*)?|(?P<pattern>\{[^}]*\}|\[[^\]]*\]))",
	)
	.expect("EXPORT_BINDING: invalid regex pattern")
});

static RESIDUAL_MODULE_SYNTAX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?m)^[ \t]*(?P<kw>import|export)(?:\s+[\w${*]|\s*[{*])")
		.expect("RESIDUAL_MODULE_SYNTAX: invalid regex pattern")
});

/// Scope names that always exist in both the browser and the sandbox.
const BUILTIN_SCOPES: &[&str] = &["window", "self", "globalThis", "global"];

/// Builds the `file://` URL used for `import.meta.url`.
///
/// # Examples
///
/// ```
/// use ltng_transpile::file_url;
///
/// assert_eq!(file_url("/site/app.js"), "file:///site/app.js");
/// assert_eq!(file_url("app.js"), "file:///app.js");
/// ```
pub fn file_url(filename: &str) -> String {
	let normalized = filename.replace('\\', "/");
	format!("file:///{}", normalized.trim_start_matches('/'))
}

/// Rewriting options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranspileOptions {
	/// Object imports are read from and exports are written to.
	pub scope: String,
	/// Object exports are mirrored onto for cross-module visibility.
	pub global: String,
	/// Remove `loadCSS(new URL(..., import.meta.url).href)` calls.
	pub strip_load_css: bool,
}

impl Default for TranspileOptions {
	fn default() -> Self {
		Self {
			scope: "window".to_string(),
			global: "globalThis".to_string(),
			strip_load_css: false,
		}
	}
}

/// A construct the regex rules may have rewritten incorrectly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranspileWarning {
	/// 1-based line in the original source.
	pub line: usize,
	pub message: String,
}

impl fmt::Display for TranspileWarning {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "line {}: {}", self.line, self.message)
	}
}

/// Rewritten source plus anything that looked suspicious.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranspileOutput {
	pub code: String,
	pub warnings: Vec<TranspileWarning>,
}

/// Rewrites ES module syntax into scope assignments.
///
/// # Examples
///
/// ```
/// use ltng_transpile::Transpiler;
///
/// let out = Transpiler::new().transpile(
/// 	"import { Div as Box } from 'ltng-components';\nexport const size = 2;",
/// 	"app.js",
/// );
/// assert!(out.warnings.is_empty());
/// assert_eq!(
/// 	out.code,
/// 	"var Box = window.Div;\nconst size = window.size = globalThis.size = 2;"
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct Transpiler {
	options: TranspileOptions,
}

impl Transpiler {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_options(options: TranspileOptions) -> Self {
		Self { options }
	}

	pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
		self.options.scope = scope.into();
		self
	}

	pub fn with_global(mut self, global: impl Into<String>) -> Self {
		self.options.global = global.into();
		self
	}

	pub fn with_strip_load_css(mut self, strip: bool) -> Self {
		self.options.strip_load_css = strip;
		self
	}

	pub fn options(&self) -> &TranspileOptions {
		&self.options
	}

	/// Reads and transpiles a file, using its path for `import.meta.url`.
	pub fn transpile_file(&self, path: &Path) -> TranspileResult<TranspileOutput> {
		let code = std::fs::read_to_string(path).map_err(|source| TranspileError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		Ok(self.transpile(&code, &path.to_string_lossy()))
	}

	/// `scope.NAME = global.NAME = ` with the global part dropped when both
	/// objects are the same.
	fn mirror_target(&self, name: &str) -> String {
		let TranspileOptions { scope, global, .. } = &self.options;
		if scope == global {
			format!("{scope}.{name} = ")
		} else {
			format!("{scope}.{name} = {global}.{name} = ")
		}
	}

	fn mirror_statement(&self, name: &str, value: &str) -> String {
		format!("{}{};", self.mirror_target(name), value)
	}

	/// Rewrites `code`. `filename` only feeds `import.meta.url`.
	pub fn transpile(&self, code: &str, filename: &str) -> TranspileOutput {
		let mut warnings = Vec::new();
		let mut hoisted: Vec<String> = Vec::new();
		let mut trailing: Vec<String> = Vec::new();
		let scope = self.options.scope.as_str();

		let mut out = if self.options.strip_load_css {
			LOAD_CSS_CALL
				.replace_all(code, |caps: &Captures| keep_lines("", &caps[0]))
				.into_owned()
		} else {
			code.to_string()
		};

		// Imports
		out = IMPORT_FROM
			.replace_all(&out, |caps: &Captures| {
				let whole = caps.get(0).map_or("", |m| m.as_str());
				let line = line_of(code, whole);
				let clause = &caps["clause"];
				check_braces(clause, line, "import", &mut warnings);
				let bindings = import_bindings(clause)
					.into_iter()
					.map(|(local, source)| match source {
						Some(name) => format!("var {local} = {scope}.{name};"),
						None => format!("var {local} = {scope};"),
					})
					.collect::<Vec<_>>()
					.join(" ");
				keep_lines(&format!("{}{}", &caps["indent"], bindings), whole)
			})
			.into_owned();
		out = IMPORT_SIDE_EFFECT
			.replace_all(&out, |caps: &Captures| keep_lines(&caps["indent"], &caps[0]))
			.into_owned();

		let meta = format!("({{ url: \"{}\" }})", file_url(filename).replace('"', "\\\""));
		out = IMPORT_META
			.replace_all(&out, NoExpand(&meta))
			.into_owned();

		// Exports
		out = EXPORT_STAR
			.replace_all(&out, |caps: &Captures| {
				let text = match caps.name("ns") {
					Some(ns) => self.mirror_statement(ns.as_str(), scope),
					None => String::new(),
				};
				keep_lines(&format!("{}{}", &caps["indent"], text), &caps[0])
			})
			.into_owned();

		out = EXPORT_LIST
			.replace_all(&out, |caps: &Captures| {
				let whole = &caps[0];
				let line = line_of(code, whole);
				let list = &caps["list"];
				check_braces(list, line, "export", &mut warnings);
				let reexport = caps.name("from").is_some();
				let statements = split_specifiers(list)
					.into_iter()
					.map(|(original, alias)| {
						let value = if reexport {
							format!("{scope}.{original}")
						} else {
							original
						};
						self.mirror_statement(&alias, &value)
					})
					.collect::<Vec<_>>()
					.join(" ");
				keep_lines(&format!("{}{}", &caps["indent"], statements), whole)
			})
			.into_owned();

		out = EXPORT_DEFAULT_DECLARATION
			.replace_all(&out, |caps: &Captures| {
				let indent = &caps["indent"];
				match (caps.name("function"), caps.name("fname"), caps.name("cname")) {
					(Some(function), Some(name), _) => {
						hoisted.push(self.mirror_statement("default", name.as_str()));
						format!("{indent}{}", function.as_str())
					}
					(_, _, Some(name)) => {
						let name = name.as_str();
						format!("{indent}const {name} = {}class {name}", self.mirror_target("default"))
					}
					_ => caps[0].to_string(),
				}
			})
			.into_owned();

		out = EXPORT_DEFAULT
			.replace_all(&out, |caps: &Captures| {
				format!("{}{}", &caps["indent"], self.mirror_target("default"))
			})
			.into_owned();

		out = EXPORT_FUNCTION
			.replace_all(&out, |caps: &Captures| {
				hoisted.push(self.mirror_statement(&caps["name"], &caps["name"]));
				format!("{}{}", &caps["indent"], &caps["decl"])
			})
			.into_owned();

		out = EXPORT_CLASS
			.replace_all(&out, |caps: &Captures| {
				let name = &caps["name"];
				format!(
					"{}const {name} = {}class {name}",
					&caps["indent"],
					self.mirror_target(name)
				)
			})
			.into_owned();

		let source = std::mem::take(&mut out);
		out = EXPORT_BINDING
			.replace_all(&source, |caps: &Captures| {
				let indent = &caps["indent"];
				let kw = &caps["kw"];
				if let Some(name) = caps.name("name") {
					let name = name.as_str();
					let whole = caps.get(0).map_or(0..0, |m| m.range());
					let line = line_of(code, &source[whole.start..whole.end]);
					for head in later_declarators(&source[whole.end..]) {
						if is_identifier(&head) {
							trailing.push(self.mirror_statement(&head, &head));
						} else {
							warnings.push(TranspileWarning {
								line,
								message: format!("declarator `{head}` after the first is not exported"),
							});
						}
					}
					if caps.name("init").is_some() {
						return format!("{indent}{kw} {name} = {}", self.mirror_target(name));
					}
					trailing.push(self.mirror_statement(name, name));
					return format!("{indent}{kw} {name}");
				}

				let pattern = caps.name("pattern").map_or("", |m| m.as_str());
				let line = line_of(code, &caps[0]);
				warnings.push(TranspileWarning {
					line,
					message: format!(
						"destructuring export `{}` is mirrored after the module body",
						pattern.split_whitespace().collect::<Vec<_>>().join(" ")
					),
				});
				check_braces(pattern, line, "export", &mut warnings);
				for name in pattern_bindings(pattern) {
					trailing.push(self.mirror_statement(&name, &name));
				}
				keep_lines(&format!("{indent}{kw} {}", pattern.replace('\n', " ")), &caps[0])
			})
			.into_owned();

		for caps in RESIDUAL_MODULE_SYNTAX.captures_iter(&out) {
			let offset = caps.get(0).map_or(0, |m| m.start());
			warnings.push(TranspileWarning {
				line: out[..offset].matches('\n').count() + 1,
				message: format!("unrecognized `{}` statement left in output", &caps["kw"]),
			});
		}

		let mut prologue = String::new();
		let TranspileOptions { scope, global, .. } = &self.options;
		if scope != global && is_identifier(scope) && !BUILTIN_SCOPES.contains(&scope.as_str()) {
			prologue.push_str(&format!(
				"if (typeof {scope} === 'undefined') {{ {global}.{scope} = {{}}; }} "
			));
		}
		for statement in &hoisted {
			prologue.push_str(statement);
			prologue.push(' ');
		}
		if !prologue.is_empty() {
			// The prologue shares the first line so line numbers stay aligned.
			out = format!("{}{}", prologue, out);
		}
		if !trailing.is_empty() {
			out.push('\n');
			out.push_str(&trailing.join(" "));
		}

		for warning in &warnings {
			tracing::warn!(file = filename, line = warning.line, "{}", warning.message);
		}

		TranspileOutput { code: out, warnings }
	}
}

/// Heads of the declarators following the first one in a `const`/`let`/`var`
/// statement, e.g. `b` and `c` for `a = f(1, 2), b = 2, c;`.
///
/// `rest` starts inside the first declarator. Commas nested in brackets,
/// string literals or comments are skipped and scanning stops at the end of
/// the statement. A head that is not an identifier is a destructuring
/// pattern.
fn later_declarators(rest: &str) -> Vec<String> {
	let mut heads = Vec::new();
	let mut depth = 0usize;
	let mut quote: Option<char> = None;
	let mut skip_until = 0;
	let mut chars = rest.char_indices();
	while let Some((i, c)) = chars.next() {
		if i < skip_until {
			continue;
		}
		if let Some(open) = quote {
			if c == '\\' {
				chars.next();
			} else if c == open {
				quote = None;
			}
			continue;
		}
		match c {
			'\'' | '"' | '`' => quote = Some(c),
			'/' if rest[i + 1..].starts_with('/') => {
				skip_until = rest[i..].find('\n').map_or(rest.len(), |end| i + end);
			}
			'/' if rest[i + 1..].starts_with('*') => {
				skip_until = rest[i + 2..].find("*/").map_or(rest.len(), |end| i + 2 + end + 2);
			}
			'(' | '[' | '{' => depth += 1,
			')' | ']' | '}' => match depth.checked_sub(1) {
				Some(outer) => depth = outer,
				None => break,
			},
			';' if depth == 0 => break,
			'\n' if depth == 0 && !continues_after(&rest[..i], &rest[i..]) => break,
			',' if depth == 0 => heads.push(declarator_head(&rest[i + 1..])),
			_ => {}
		}
	}
	heads
}

/// Whether a statement carries on over the line break between `before` and
/// `after`.
fn continues_after(before: &str, after: &str) -> bool {
	let last = before.trim_end().chars().last();
	let next = after.trim_start().chars().next();
	matches!(last, Some(',' | '=' | '+' | '-' | '*' | '%' | '&' | '|' | '^' | '?' | ':' | '<' | '>' | '!'))
		|| matches!(next, Some(',' | '.' | '?' | ':' | '+' | '*' | '&' | '|'))
}

fn declarator_head(text: &str) -> String {
	let text = text.trim_start();
	let end = text
		.find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
		.unwrap_or(text.len());
	if end > 0 {
		return text[..end].to_string();
	}
	text.split(['=', ',', ';', '\n'])
		.next()
		.unwrap_or_default()
		.trim()
		.to_string()
}

/// Pads `replacement` with the newlines `original` spanned.
fn keep_lines(replacement: &str, original: &str) -> String {
	let newlines = original
		.matches('\n')
		.count()
		.saturating_sub(replacement.matches('\n').count());
	let mut out = String::with_capacity(replacement.len() + newlines);
	out.push_str(replacement);
	out.extend(std::iter::repeat_n('\n', newlines));
	out
}

/// 1-based line of the first occurrence of `needle` in `code`.
fn line_of(code: &str, needle: &str) -> usize {
	code.find(needle)
		.map_or(0, |offset| code[..offset].matches('\n').count())
		+ 1
}

fn is_identifier(name: &str) -> bool {
	let mut chars = name.chars();
	chars
		.next()
		.is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
		&& chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

fn check_braces(clause: &str, line: usize, keyword: &str, warnings: &mut Vec<TranspileWarning>) {
	let inner = clause.find('{').map_or("", |start| &clause[start + 1..]);
	if inner.contains('{') || inner.contains('(') {
		warnings.push(TranspileWarning {
			line,
			message: format!("nested braces in `{keyword}` clause; output may be incomplete"),
		});
	}
}

/// Splits `a, b as c` into `(original, alias)` pairs.
fn split_specifiers(list: &str) -> Vec<(String, String)> {
	list.split(',')
		.map(str::trim)
		.filter(|part| !part.is_empty())
		.map(|part| match part.split_once(" as ") {
			Some((original, alias)) => (original.trim().to_string(), alias.trim().to_string()),
			None => (part.to_string(), part.to_string()),
		})
		.collect()
}

/// Local bindings introduced by an import clause. `None` as the source
/// means the whole scope object.
fn import_bindings(clause: &str) -> Vec<(String, Option<String>)> {
	let mut bindings = Vec::new();
	let mut rest = clause.trim();

	if !rest.starts_with('{') && !rest.starts_with('*') {
		let (default, tail) = rest.split_once(',').unwrap_or((rest, ""));
		bindings.push((default.trim().to_string(), Some("default".to_string())));
		rest = tail.trim();
	}

	if let Some(ns) = rest.strip_prefix('*') {
		let local = ns.trim().trim_start_matches("as").trim();
		bindings.push((local.to_string(), None));
	} else if let Some(list) = rest.strip_prefix('{') {
		let list = list.trim_end_matches('}');
		for (original, alias) in split_specifiers(list) {
			bindings.push((alias, Some(original)));
		}
	}
	bindings
}

/// Identifiers bound by a flat destructuring pattern such as
/// `{ a, b: c, d = 1, ...e }` or `[x, , y]`.
fn pattern_bindings(pattern: &str) -> Vec<String> {
	let inner = pattern
		.trim()
		.trim_start_matches(['{', '['])
		.trim_end_matches(['}', ']']);
	let mut names: Vec<String> = Vec::new();
	for part in inner.split(',') {
		let part = part.trim().trim_start_matches("...");
		// `{ key: local }` binds `local`
		let local = part.rsplit_once(':').map_or(part, |(_, local)| local);
		let local = local.split('=').next().unwrap_or("").trim();
		if is_identifier(local) && !names.iter().any(|n| n == local) {
			names.push(local.to_string());
		}
	}
	names
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::*;

	fn transpile(code: &str) -> TranspileOutput {
		Transpiler::new().transpile(code, "/site/app.js")
	}

	#[rstest]
	#[case("import { a, b as c } from './x.js';", "var a = window.a; var c = window.b;")]
	#[case("import Main from \"./main.js\"", "var Main = window.default;")]
	#[case("import * as ns from './x.js';", "var ns = window;")]
	#[case(
		"import Main, { helper } from './x.js';",
		"var Main = window.default; var helper = window.helper;"
	)]
	#[case("import './side-effect.js';", "")]
	fn test_import_rules(#[case] input: &str, #[case] expected: &str) {
		let out = transpile(input);
		assert_eq!(out.code, expected);
		assert!(out.warnings.is_empty());
	}

	#[rstest]
	fn test_multiline_import_keeps_line_count() {
		let out = transpile("import {\n\tone,\n\ttwo\n} from 'x'\nfoo()");
		assert_eq!(out.code, "var one = window.one; var two = window.two;\n\n\n\nfoo()");
	}

	#[rstest]
	#[case("export const A = 1;", "const A = window.A = globalThis.A = 1;")]
	#[case("export let b=2", "let b = window.b = globalThis.b = 2")]
	#[case("export var c = 'x'", "var c = window.c = globalThis.c = 'x'")]
	#[case(
		"export class Card extends Base {}",
		"const Card = window.Card = globalThis.Card = class Card extends Base {}"
	)]
	#[case("export default Card;", "window.default = globalThis.default = Card;")]
	#[case(
		"export { a, b as c };",
		"window.a = globalThis.a = a; window.c = globalThis.c = b;"
	)]
	#[case(
		"export { Button } from './button.js';",
		"window.Button = globalThis.Button = window.Button;"
	)]
	#[case("export * from './all.js';", "")]
	fn test_export_rules(#[case] input: &str, #[case] expected: &str) {
		let out = transpile(input);
		assert_eq!(out.code, expected);
		assert!(out.warnings.is_empty(), "{:?}", out.warnings);
	}

	#[rstest]
	fn test_export_function_is_hoisted() {
		let out = transpile("export function greet(name) {\n\treturn name;\n}");
		assert_eq!(
			out.code,
			"window.greet = globalThis.greet = greet; function greet(name) {\n\treturn name;\n}"
		);
	}

	#[rstest]
	fn test_export_async_function() {
		let out = transpile("export async function load() {}");
		assert_eq!(
			out.code,
			"window.load = globalThis.load = load; async function load() {}"
		);
	}

	#[rstest]
	fn test_same_scope_and_global_assigns_once() {
		let out = Transpiler::new()
			.with_global("window")
			.transpile("export const A = 1", "a.js");
		assert_eq!(out.code, "const A = window.A = 1");
	}

	#[rstest]
	fn test_custom_scope_gets_guard() {
		let out = Transpiler::new()
			.with_scope("LTNG")
			.transpile("import { x } from 'y'", "a.js");
		assert_eq!(
			out.code,
			"if (typeof LTNG === 'undefined') { globalThis.LTNG = {}; } var x = LTNG.x;"
		);
	}

	#[rstest]
	fn test_import_meta_rewritten() {
		let out = transpile("const u = new URL('./a.css', import.meta.url);");
		assert_eq!(
			out.code,
			"const u = new URL('./a.css', ({ url: \"file:///site/app.js\" }).url);"
		);
	}

	#[rstest]
	fn test_strip_load_css() {
		let out = Transpiler::new().with_strip_load_css(true).transpile(
			"window.loadCSS(new URL('./card.css', import.meta.url).href);\nexport const Card = 1",
			"card.js",
		);
		assert_eq!(out.code, "\nconst Card = window.Card = globalThis.Card = 1");
	}

	#[rstest]
	fn test_destructuring_export_warns_and_mirrors() {
		let out = transpile("export const { a, b: renamed, ...rest } = source;");
		assert_eq!(out.warnings.len(), 1);
		assert!(out.code.starts_with("const { a, b: renamed, ...rest } = source;"));
		assert!(out.code.ends_with(
			"window.a = globalThis.a = a; window.renamed = globalThis.renamed = renamed; window.rest = globalThis.rest = rest;"
		));
	}

	#[rstest]
	fn test_every_declarator_is_exported() {
		let out = transpile("export const a = 1, b = 2;\nexport let c, d = [1, 2];");
		assert_eq!(
			out.code,
			"const a = window.a = globalThis.a = 1, b = 2;\nlet c, d = [1, 2];\nwindow.b = globalThis.b = b; window.d = globalThis.d = d; window.c = globalThis.c = c;"
		);
		assert!(out.warnings.is_empty(), "{:?}", out.warnings);
	}

	#[rstest]
	#[case("export const add = (a, b) => a + b;")]
	#[case("export const pair = { first: 1, second: 'x, y' };")]
	#[case("export const n = 1 // one, two\nfoo(a, b);")]
	#[case("export const list = [\n\t1,\n\t2,\n];")]
	fn test_nested_commas_are_not_declarators(#[case] input: &str) {
		let out = transpile(input);
		assert!(!out.code.contains("\nwindow."), "{}", out.code);
		assert!(out.warnings.is_empty());
	}

	#[rstest]
	fn test_destructured_later_declarator_warns() {
		let out = transpile("export const a = 1, { b } = source;");
		assert_eq!(
			out.warnings,
			vec![TranspileWarning {
				line: 1,
				message: "declarator `{ b }` after the first is not exported".to_string()
			}]
		);
	}

	#[rstest]
	fn test_named_default_function_keeps_binding() {
		let out = transpile("export default function App() {\n\treturn 1;\n}\nApp.ready = true;");
		assert_eq!(
			out.code,
			"window.default = globalThis.default = App; function App() {\n\treturn 1;\n}\nApp.ready = true;"
		);
	}

	#[rstest]
	fn test_named_default_class_keeps_binding() {
		let out = transpile("export default class Store {}");
		assert_eq!(
			out.code,
			"const Store = window.default = globalThis.default = class Store {}"
		);
	}

	#[rstest]
	fn test_uninitialized_export_mirrored_at_end() {
		let out = transpile("export let counter;\ncounter = 3;");
		assert_eq!(
			out.code,
			"let counter;\ncounter = 3;\nwindow.counter = globalThis.counter = counter;"
		);
	}

	#[rstest]
	fn test_nested_braces_warn() {
		let out = transpile("import { a, { b } } from 'x';");
		assert!(!out.warnings.is_empty());
		assert_eq!(out.warnings[0].line, 1);
	}

	#[rstest]
	fn test_unrecognized_statement_warns() {
		let out = transpile("const a = 1;\nexport * as;");
		assert_eq!(
			out.warnings,
			vec![TranspileWarning {
				line: 2,
				message: "unrecognized `export` statement left in output".to_string()
			}]
		);
	}

	#[rstest]
	fn test_dynamic_import_is_untouched() {
		let out = transpile("const m = await import('./lazy.js');");
		assert_eq!(out.code, "const m = await import('./lazy.js');");
		assert!(out.warnings.is_empty());
	}

	#[rstest]
	fn test_output_has_no_module_keywords() {
		let source = "import { h } from 'ltng';\nimport './x.js';\nexport const A = h;\nexport function f() {}\nexport default f;\nexport { A as B };";
		let out = transpile(source);
		assert!(!RESIDUAL_MODULE_SYNTAX.is_match(&out.code));
		assert!(out.warnings.is_empty());
	}
}
