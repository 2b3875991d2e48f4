//! Import maps
//!
//! An import map comes from a `<script type="importmap">` block and maps bare
//! specifiers to paths. Relative targets are resolved against the directory
//! of the document that declared them, so every entry remembers that
//! directory.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::TranspileResult;

#[derive(Debug, Deserialize)]
struct RawImportMap {
	#[serde(default)]
	imports: IndexMap<String, String>,
}

/// Target of one import map entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportTarget {
	pub target: String,
	/// Directory of the document that declared the entry.
	pub base_dir: PathBuf,
}

/// Specifier overrides for one document.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use ltng_transpile::ImportMap;
///
/// let map = ImportMap::parse(
/// 	r#"{"imports": {"ltng-components": "./components/index.js", "lib/": "./vendor/lib/"}}"#,
/// 	Path::new("/site"),
/// )
/// .unwrap();
///
/// let (target, base) = map.lookup("ltng-components").unwrap();
/// assert_eq!(target, "./components/index.js");
/// assert_eq!(base, Path::new("/site"));
///
/// let (target, _) = map.lookup("lib/dates.js").unwrap();
/// assert_eq!(target, "./vendor/lib/dates.js");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportMap {
	entries: IndexMap<String, ImportTarget>,
}

impl ImportMap {
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses the JSON body of an import map script.
	pub fn parse(json: &str, base_dir: &Path) -> TranspileResult<Self> {
		let raw: RawImportMap = serde_json::from_str(json)?;
		let entries = raw
			.imports
			.into_iter()
			.map(|(specifier, target)| {
				(
					specifier,
					ImportTarget {
						target,
						base_dir: base_dir.to_path_buf(),
					},
				)
			})
			.collect();
		Ok(Self { entries })
	}

	/// Adds one entry, replacing an existing entry for the same specifier.
	pub fn insert(&mut self, specifier: impl Into<String>, target: impl Into<String>, base_dir: &Path) {
		self.entries.insert(
			specifier.into(),
			ImportTarget {
				target: target.into(),
				base_dir: base_dir.to_path_buf(),
			},
		);
	}

	/// Merges `other` into `self`. Later entries win for duplicate keys.
	pub fn merge(&mut self, other: ImportMap) {
		for (specifier, target) in other.entries {
			self.entries.insert(specifier, target);
		}
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn get(&self, specifier: &str) -> Option<&ImportTarget> {
		self.entries.get(specifier)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &ImportTarget)> {
		self.entries.iter().map(|(k, v)| (k.as_str(), v))
	}

	/// Maps `specifier` to its target string and declaring directory.
	///
	/// Exact entries win. Otherwise the longest key ending in `/` that
	/// prefixes the specifier is used and the remainder is appended to its
	/// target.
	pub fn lookup(&self, specifier: &str) -> Option<(String, &Path)> {
		if let Some(entry) = self.entries.get(specifier) {
			return Some((entry.target.clone(), entry.base_dir.as_path()));
		}

		self.entries
			.iter()
			.filter(|(key, _)| key.ends_with('/') && specifier.starts_with(key.as_str()))
			.max_by_key(|(key, _)| key.len())
			.map(|(key, entry)| {
				(
					format!("{}{}", entry.target, &specifier[key.len()..]),
					entry.base_dir.as_path(),
				)
			})
	}

	/// Serializes the map back into import map JSON.
	pub fn to_json(&self) -> String {
		let imports: IndexMap<&str, &str> = self
			.entries
			.iter()
			.map(|(k, v)| (k.as_str(), v.target.as_str()))
			.collect();
		let value = serde_json::json!({ "imports": imports });
		serde_json::to_string_pretty(&value).unwrap_or_else(|_| String::from("{\"imports\":{}}"))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_parse_keeps_declaration_order() {
		let map = ImportMap::parse(
			r#"{"imports": {"b": "./b.js", "a": "./a.js"}}"#,
			Path::new("/www"),
		)
		.unwrap();
		let keys: Vec<&str> = map.iter().map(|(k, _)| k).collect();
		assert_eq!(keys, vec!["b", "a"]);
	}

	#[rstest]
	fn test_parse_without_imports_is_empty() {
		let map = ImportMap::parse(r#"{"scopes": {}}"#, Path::new("/")).unwrap();
		assert!(map.is_empty());
	}

	#[rstest]
	fn test_parse_invalid_json() {
		assert!(ImportMap::parse("{ imports: ", Path::new("/")).is_err());
	}

	#[rstest]
	fn test_merge_is_last_wins() {
		let mut first = ImportMap::new();
		first.insert("ui", "./old/ui.js", Path::new("/a"));
		first.insert("keep", "./keep.js", Path::new("/a"));

		let mut second = ImportMap::new();
		second.insert("ui", "./new/ui.js", Path::new("/b"));

		first.merge(second);

		let ui = first.get("ui").unwrap();
		assert_eq!(ui.target, "./new/ui.js");
		assert_eq!(ui.base_dir, Path::new("/b"));
		assert!(first.get("keep").is_some());
	}

	#[rstest]
	#[case("lib/x.js", Some("/vendor/deep/x.js"))]
	#[case("lib/other/y.js", Some("/vendor/other/y.js"))]
	#[case("libx", None)]
	fn test_longest_prefix_wins(#[case] specifier: &str, #[case] expected: Option<&str>) {
		let mut map = ImportMap::new();
		map.insert("lib/", "/vendor/deep/", Path::new("/"));
		map.insert("lib/other/", "/vendor/other/", Path::new("/"));
		let resolved = map.lookup(specifier).map(|(t, _)| t);
		assert_eq!(resolved.as_deref(), expected);
	}

	#[rstest]
	fn test_to_json_round_trips_targets() {
		let mut map = ImportMap::new();
		map.insert("app", "./app.js", Path::new("/"));
		let reparsed = ImportMap::parse(&map.to_json(), Path::new("/")).unwrap();
		assert_eq!(reparsed.get("app").unwrap().target, "./app.js");
	}
}
