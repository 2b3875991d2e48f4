//! Text scanning for module dependencies and asset references
//!
//! These scanners run over source text without executing it. Specifiers
//! inside comments or string literals that merely look like imports are
//! reported too; callers treat unresolvable results as diagnostics.

use std::sync::LazyLock;

use regex::Regex;

static MODULE_SPECIFIER: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r#"\b(?:import|export)(?:\s+|\s*\{|\s*\*)[^;'"]*?\bfrom\s*['"]([^'"\n]+)['"]|\bimport\s*['"]([^'"\n]+)['"]"#,
	)
	.expect("MODULE_SPECIFIER: invalid regex pattern")
});

static IMPORT_META_URL: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r#"new\s+URL\(\s*['"`]([^'"`]+)['"`]\s*,\s*import\.meta\.url\s*\)"#)
		.expect("IMPORT_META_URL: invalid regex pattern")
});

static LOAD_CSS_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r#"\bloadCSS\(\s*['"`]([^'"`]+)['"`]\s*\)"#)
		.expect("LOAD_CSS_LITERAL: invalid regex pattern")
});

fn collect(re: &Regex, code: &str) -> Vec<String> {
	let mut found: Vec<String> = Vec::new();
	for caps in re.captures_iter(code) {
		let Some(m) = caps.iter().skip(1).flatten().next() else {
			continue;
		};
		let value = m.as_str().to_string();
		if !found.contains(&value) {
			found.push(value);
		}
	}
	found
}

/// Static `import ... from`, `export ... from` and side-effect `import`
/// specifiers, in source order and without duplicates.
///
/// # Examples
///
/// ```
/// use ltng_transpile::scanner::module_specifiers;
///
/// let code = "import { a } from './a.js';\nexport * from \"./b.js\";\nimport './c.js';";
/// assert_eq!(module_specifiers(code), vec!["./a.js", "./b.js", "./c.js"]);
/// ```
pub fn module_specifiers(code: &str) -> Vec<String> {
	collect(&MODULE_SPECIFIER, code)
}

/// Targets of `new URL('...', import.meta.url)`.
pub fn asset_urls(code: &str) -> Vec<String> {
	collect(&IMPORT_META_URL, code)
}

/// String literal arguments of `loadCSS('...')`.
pub fn css_loads(code: &str) -> Vec<String> {
	collect(&LOAD_CSS_LITERAL, code)
}
