//! Tree to HTML serialization

use crate::document::Document;
use crate::node::{Element, NodeId, NodeKind, is_void_element};

/// Escapes text content.
///
/// # Examples
///
/// ```
/// use ltng_dom::escape_text;
///
/// assert_eq!(escape_text("a < b & c"), "a &lt; b &amp; c");
/// ```
pub fn escape_text(text: &str) -> String {
	let mut result = String::with_capacity(text.len() + 8);
	for ch in text.chars() {
		match ch {
			'&' => result.push_str("&amp;"),
			'<' => result.push_str("&lt;"),
			'>' => result.push_str("&gt;"),
			_ => result.push(ch),
		}
	}
	result
}

/// Escapes a double-quoted attribute value.
pub fn escape_attribute(value: &str) -> String {
	let mut result = String::with_capacity(value.len() + 8);
	for ch in value.chars() {
		match ch {
			'&' => result.push_str("&amp;"),
			'"' => result.push_str("&quot;"),
			_ => result.push(ch),
		}
	}
	result
}

/// Converts a camelCase style property into its CSS name.
///
/// # Examples
///
/// ```
/// use ltng_dom::kebab_case;
///
/// assert_eq!(kebab_case("backgroundColor"), "background-color");
/// assert_eq!(kebab_case("--accent"), "--accent");
/// ```
pub fn kebab_case(property: &str) -> String {
	let mut out = String::with_capacity(property.len() + 4);
	for ch in property.chars() {
		if ch.is_ascii_uppercase() {
			out.push('-');
			out.push(ch.to_ascii_lowercase());
		} else {
			out.push(ch);
		}
	}
	out
}

fn style_declarations(el: &Element) -> Option<String> {
	if el.style.is_empty() {
		return None;
	}
	let declarations: Vec<String> = el
		.style
		.iter()
		.map(|(k, v)| format!("{}:{}", kebab_case(k), v))
		.collect();
	Some(declarations.join(";"))
}

fn write_open_tag(el: &Element, out: &mut String) {
	out.push('<');
	out.push_str(&el.tag);

	let mut style = style_declarations(el);
	for (name, value) in &el.attributes {
		let value = match (name.as_str(), style.take()) {
			("style", Some(declared)) if !value.is_empty() => {
				format!("{};{}", value.trim_end_matches(';'), declared)
			}
			("style", Some(declared)) => declared,
			(_, pending) => {
				style = pending;
				value.clone()
			}
		};
		out.push(' ');
		out.push_str(name);
		out.push_str("=\"");
		out.push_str(&escape_attribute(&value));
		out.push('"');
	}
	if let Some(declared) = style {
		out.push_str(" style=\"");
		out.push_str(&escape_attribute(&declared));
		out.push('"');
	}
}

pub(crate) fn write_node(doc: &Document, id: NodeId, out: &mut String) {
	match doc.kind(id) {
		Some(NodeKind::Text(text)) => out.push_str(&escape_text(text)),
		Some(NodeKind::Raw(html)) => out.push_str(html),
		Some(NodeKind::Element(el)) => {
			write_open_tag(el, out);
			if is_void_element(&el.tag) {
				out.push_str(" />");
				return;
			}
			out.push('>');
			for child in doc.children(id) {
				write_node(doc, *child, out);
			}
			out.push_str("</");
			out.push_str(&el.tag);
			out.push('>');
		}
		None => {}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_void_elements_self_close() {
		let mut doc = Document::new();
		let img = doc.create_element("img");
		doc.set_attribute(img, "src", "/logo.png").unwrap();
		assert_eq!(doc.outer_html(img), r#"<img src="/logo.png" />"#);
	}

	#[rstest]
	fn test_style_map_serialized_after_attributes() {
		let mut doc = Document::new();
		let div = doc.create_element("div");
		doc.set_style(div, "backgroundColor", "red").unwrap();
		doc.set_attribute(div, "id", "box").unwrap();
		doc.set_style(div, "marginTop", "4px").unwrap();
		assert_eq!(
			doc.outer_html(div),
			r#"<div id="box" style="background-color:red;margin-top:4px"></div>"#
		);
	}

	#[rstest]
	fn test_style_attribute_merged_with_declarations() {
		let mut doc = Document::new();
		let div = doc.create_element("div");
		doc.set_attribute(div, "style", "color:blue;").unwrap();
		doc.set_style(div, "fontSize", "2em").unwrap();
		assert_eq!(
			doc.outer_html(div),
			r#"<div style="color:blue;font-size:2em"></div>"#
		);
	}

	#[rstest]
	fn test_text_and_attributes_escaped() {
		let mut doc = Document::new();
		let p = doc.create_element("p");
		doc.set_attribute(p, "title", r#"say "hi""#).unwrap();
		let text = doc.create_text_node("1 < 2");
		doc.append_child(p, text).unwrap();
		assert_eq!(
			doc.outer_html(p),
			r#"<p title="say &quot;hi&quot;">1 &lt; 2</p>"#
		);
	}

	#[rstest]
	fn test_raw_markup_emitted_verbatim() {
		let mut doc = Document::new();
		let div = doc.create_element("div");
		doc.set_inner_html(div, "<em>x</em>").unwrap();
		assert_eq!(doc.inner_html(div), "<em>x</em>");
	}
}
