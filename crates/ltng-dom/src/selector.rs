//! Partial CSS selector support
//!
//! Only compound selectors are understood: an optional tag name followed by
//! any number of `#id`, `.class`, `[attr]` and `[attr="value"]` parts.
//! Combinators, pseudo-classes and selector lists are not supported and make
//! [`Selector::parse`] return `None`.

use crate::node::Element;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
	Id(String),
	Class(String),
	Attr { name: String, value: Option<String> },
}

/// A parsed compound selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
	tag: Option<String>,
	parts: Vec<Part>,
}

impl Selector {
	/// Parses a compound selector.
	///
	/// # Examples
	///
	/// ```
	/// use ltng_dom::Selector;
	///
	/// assert!(Selector::parse(r#"link[href="/app.css"]"#).is_some());
	/// assert!(Selector::parse("div.card#main").is_some());
	/// assert!(Selector::parse("ul > li").is_none());
	/// ```
	pub fn parse(input: &str) -> Option<Self> {
		let input = input.trim();
		if input.is_empty() {
			return None;
		}

		let mut chars = input.char_indices().peekable();
		let mut tag = None;
		let mut parts = Vec::new();

		let ident_end = |s: &str, start: usize| -> usize {
			s[start..]
				.find(|c: char| !(c.is_alphanumeric() || c == '-' || c == '_'))
				.map_or(s.len(), |off| start + off)
		};

		if let Some(&(_, c)) = chars.peek()
			&& (c.is_alphabetic() || c == '*')
		{
			let end = if c == '*' { 1 } else { ident_end(input, 0) };
			if c != '*' {
				tag = Some(input[..end].to_ascii_lowercase());
			}
			while chars.peek().is_some_and(|(i, _)| *i < end) {
				chars.next();
			}
		}

		while let Some((i, c)) = chars.next() {
			match c {
				'#' | '.' => {
					let end = ident_end(input, i + 1);
					if end == i + 1 {
						return None;
					}
					let name = input[i + 1..end].to_string();
					parts.push(if c == '#' {
						Part::Id(name)
					} else {
						Part::Class(name)
					});
					while chars.peek().is_some_and(|(j, _)| *j < end) {
						chars.next();
					}
				}
				'[' => {
					let close = input[i..].find(']')? + i;
					parts.push(parse_attr(&input[i + 1..close])?);
					while chars.peek().is_some_and(|(j, _)| *j <= close) {
						chars.next();
					}
				}
				_ => return None,
			}
		}

		Some(Self { tag, parts })
	}

	pub fn matches(&self, el: &Element) -> bool {
		if let Some(tag) = &self.tag
			&& *tag != el.tag
		{
			return false;
		}
		self.parts.iter().all(|part| match part {
			Part::Id(id) => el.attributes.get("id").is_some_and(|v| v == id),
			Part::Class(class) => el.has_class(class),
			Part::Attr { name, value: None } => el.attributes.contains_key(name),
			Part::Attr {
				name,
				value: Some(expected),
			} => el.attributes.get(name).is_some_and(|v| v == expected),
		})
	}
}

fn parse_attr(body: &str) -> Option<Part> {
	let (name, value) = match body.split_once('=') {
		Some((name, raw)) => {
			let raw = raw.trim();
			let unquoted = raw
				.strip_prefix('"')
				.and_then(|r| r.strip_suffix('"'))
				.or_else(|| raw.strip_prefix('\'').and_then(|r| r.strip_suffix('\'')))
				.unwrap_or(raw);
			(name.trim(), Some(unquoted.to_string()))
		}
		None => (body.trim(), None),
	};
	if name.is_empty() || name.contains(char::is_whitespace) {
		return None;
	}
	Some(Part::Attr {
		name: name.to_string(),
		value,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn element(tag: &str, attrs: &[(&str, &str)]) -> Element {
		let mut el = Element::new(tag);
		for (k, v) in attrs {
			el.attributes.insert(k.to_string(), v.to_string());
		}
		el
	}

	#[rstest]
	#[case("div", true)]
	#[case("span", false)]
	#[case("#main", true)]
	#[case(".card", true)]
	#[case(".missing", false)]
	#[case("div.card#main", true)]
	#[case("[data-x]", true)]
	#[case("[data-x='1']", true)]
	#[case(r#"div[data-x="2"]"#, false)]
	#[case("*", true)]
	fn test_selector_matching(#[case] selector: &str, #[case] expected: bool) {
		let el = element(
			"div",
			&[("id", "main"), ("class", "card wide"), ("data-x", "1")],
		);
		let parsed = Selector::parse(selector).unwrap();
		assert_eq!(parsed.matches(&el), expected);
	}

	#[rstest]
	#[case("")]
	#[case("ul li")]
	#[case("a:hover")]
	#[case("a, b")]
	#[case("[unterminated")]
	#[case("#")]
	fn test_unsupported_selectors(#[case] selector: &str) {
		assert_eq!(Selector::parse(selector), None);
	}
}
