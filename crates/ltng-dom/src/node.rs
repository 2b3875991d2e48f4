//! Node types stored in the document arena

use std::fmt;

use indexmap::IndexMap;

/// Tags serialized in self-closing form.
pub const VOID_ELEMENTS: &[&str] = &[
	"area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
	"wbr",
];

/// Returns true when `tag` is serialized as `<tag ... />`.
pub fn is_void_element(tag: &str) -> bool {
	VOID_ELEMENTS.contains(&tag)
}

/// Index of a node inside its [`Document`](crate::Document).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
	/// Raw arena index, used to hand nodes across the script bridge.
	pub fn index(self) -> usize {
		self.0
	}

	/// Rebuilds an id from a raw index. Validity is checked by the document.
	pub fn from_index(index: usize) -> Self {
		Self(index)
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Element payload: lower-cased tag name, attributes and inline style.
///
/// Attributes and style declarations keep insertion order so that
/// serialization is stable across renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
	pub tag: String,
	pub attributes: IndexMap<String, String>,
	pub style: IndexMap<String, String>,
}

impl Element {
	pub fn new(tag: &str) -> Self {
		Self {
			tag: tag.to_ascii_lowercase(),
			..Default::default()
		}
	}

	/// Whitespace separated tokens of the `class` attribute.
	pub fn classes(&self) -> impl Iterator<Item = &str> {
		self.attributes
			.get("class")
			.map(|c| c.split_whitespace())
			.into_iter()
			.flatten()
	}

	pub fn has_class(&self, class: &str) -> bool {
		self.classes().any(|c| c == class)
	}
}

/// What a node holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
	Element(Element),
	Text(String),
	/// Pre-serialized markup assigned through `innerHTML`, emitted verbatim.
	Raw(String),
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
	pub kind: NodeKind,
	pub parent: Option<NodeId>,
	pub children: Vec<NodeId>,
}

impl NodeData {
	pub fn new(kind: NodeKind) -> Self {
		Self {
			kind,
			parent: None,
			children: Vec::new(),
		}
	}
}
