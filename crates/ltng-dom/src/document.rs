//! Document arena and tree operations

use crate::error::{DomError, DomResult};
use crate::node::{Element, NodeData, NodeId, NodeKind};
use crate::selector::Selector;
use crate::serialize;

/// Mock document owning one `head`, one `body` and every node created
/// through it.
///
/// Nodes are never freed; removed nodes stay in the arena detached from the
/// tree so that ids held by scripts remain valid until the render ends.
#[derive(Debug, Clone)]
pub struct Document {
	nodes: Vec<NodeData>,
	head: NodeId,
	body: NodeId,
}

impl Document {
	/// Creates a document with an empty `head` and `body`.
	pub fn new() -> Self {
		let mut doc = Self {
			nodes: Vec::with_capacity(64),
			head: NodeId(0),
			body: NodeId(1),
		};
		doc.push(NodeKind::Element(Element::new("head")));
		doc.push(NodeKind::Element(Element::new("body")));
		doc
	}

	fn push(&mut self, kind: NodeKind) -> NodeId {
		let id = NodeId(self.nodes.len());
		self.nodes.push(NodeData::new(kind));
		id
	}

	pub fn head(&self) -> NodeId {
		self.head
	}

	pub fn body(&self) -> NodeId {
		self.body
	}

	/// Number of nodes ever allocated, attached or not.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn contains(&self, id: NodeId) -> bool {
		id.0 < self.nodes.len()
	}

	fn data(&self, id: NodeId) -> DomResult<&NodeData> {
		self.nodes.get(id.0).ok_or(DomError::UnknownNode(id))
	}

	fn data_mut(&mut self, id: NodeId) -> DomResult<&mut NodeData> {
		self.nodes.get_mut(id.0).ok_or(DomError::UnknownNode(id))
	}

	/// Creates a detached element.
	///
	/// `body` and `head` are singletons: asking for either returns the
	/// document's own node instead of a new one.
	pub fn create_element(&mut self, tag: &str) -> NodeId {
		match tag.to_ascii_lowercase().as_str() {
			"body" => self.body,
			"head" => self.head,
			_ => self.push(NodeKind::Element(Element::new(tag))),
		}
	}

	pub fn create_text_node(&mut self, text: &str) -> NodeId {
		self.push(NodeKind::Text(text.to_string()))
	}

	/// Creates a detached node whose markup is emitted verbatim.
	pub fn create_raw(&mut self, html: &str) -> NodeId {
		self.push(NodeKind::Raw(html.to_string()))
	}

	pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
		self.nodes.get(id.0).map(|n| &n.kind)
	}

	pub fn element(&self, id: NodeId) -> Option<&Element> {
		match self.kind(id) {
			Some(NodeKind::Element(el)) => Some(el),
			_ => None,
		}
	}

	fn element_mut(&mut self, id: NodeId) -> DomResult<&mut Element> {
		match &mut self.data_mut(id)?.kind {
			NodeKind::Element(el) => Ok(el),
			_ => Err(DomError::NotAnElement(id)),
		}
	}

	/// Lower-cased tag name, `None` for text and raw nodes.
	pub fn tag_name(&self, id: NodeId) -> Option<&str> {
		self.element(id).map(|el| el.tag.as_str())
	}

	pub fn parent(&self, id: NodeId) -> Option<NodeId> {
		self.nodes.get(id.0).and_then(|n| n.parent)
	}

	pub fn children(&self, id: NodeId) -> &[NodeId] {
		self.nodes
			.get(id.0)
			.map(|n| n.children.as_slice())
			.unwrap_or(&[])
	}

	/// Returns true if `ancestor` is `node` or one of its ancestors.
	pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
		let mut current = Some(node);
		while let Some(id) = current {
			if id == ancestor {
				return true;
			}
			current = self.parent(id);
		}
		false
	}

	/// Appends `child` as the last child of `parent` and returns `child`.
	///
	/// A child that already has a parent is detached from it first.
	pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
		self.data(child)?;
		if !matches!(self.data(parent)?.kind, NodeKind::Element(_))
			|| self.is_inclusive_ancestor(child, parent)
			|| child == self.head
			|| child == self.body
		{
			return Err(DomError::Hierarchy { parent, child });
		}

		self.detach(child);
		self.data_mut(parent)?.children.push(child);
		self.data_mut(child)?.parent = Some(parent);
		Ok(child)
	}

	/// Unlinks `id` from its parent and clears its parent reference.
	///
	/// The `head` and `body` singletons cannot be removed.
	pub fn remove(&mut self, id: NodeId) -> DomResult<()> {
		self.data(id)?;
		if id == self.head || id == self.body {
			tracing::debug!(node = %id, "ignoring removal of document root element");
			return Ok(());
		}
		self.detach(id);
		Ok(())
	}

	fn detach(&mut self, id: NodeId) {
		if let Some(parent) = self.nodes[id.0].parent.take() {
			self.nodes[parent.0].children.retain(|c| *c != id);
		}
	}

	/// Detaches every child of `id`.
	pub fn clear_children(&mut self, id: NodeId) -> DomResult<()> {
		let children = std::mem::take(&mut self.data_mut(id)?.children);
		for child in children {
			self.nodes[child.0].parent = None;
		}
		Ok(())
	}

	pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
		self.element_mut(id)?
			.attributes
			.insert(name.to_string(), value.to_string());
		Ok(())
	}

	pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
		self.element(id)
			.and_then(|el| el.attributes.get(name))
			.map(String::as_str)
	}

	pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> DomResult<()> {
		self.element_mut(id)?.attributes.shift_remove(name);
		Ok(())
	}

	/// Sets an inline style declaration. An empty value removes it.
	pub fn set_style(&mut self, id: NodeId, property: &str, value: &str) -> DomResult<()> {
		let style = &mut self.element_mut(id)?.style;
		if value.is_empty() {
			style.shift_remove(property);
		} else {
			style.insert(property.to_string(), value.to_string());
		}
		Ok(())
	}

	pub fn get_style(&self, id: NodeId, property: &str) -> Option<&str> {
		self.element(id)
			.and_then(|el| el.style.get(property))
			.map(String::as_str)
	}

	/// Adds class tokens, keeping existing order and dropping duplicates.
	pub fn add_class(&mut self, id: NodeId, classes: &[&str]) -> DomResult<()> {
		let el = self.element_mut(id)?;
		let mut tokens: Vec<String> = el.classes().map(str::to_string).collect();
		for class in classes.iter().flat_map(|c| c.split_whitespace()) {
			if !tokens.iter().any(|t| t == class) {
				tokens.push(class.to_string());
			}
		}
		el.attributes.insert("class".to_string(), tokens.join(" "));
		Ok(())
	}

	pub fn remove_class(&mut self, id: NodeId, classes: &[&str]) -> DomResult<()> {
		let el = self.element_mut(id)?;
		if !el.attributes.contains_key("class") {
			return Ok(());
		}
		let tokens: Vec<&str> = el.classes().filter(|c| !classes.contains(c)).collect();
		let joined = tokens.join(" ");
		el.attributes.insert("class".to_string(), joined);
		Ok(())
	}

	pub fn has_class(&self, id: NodeId, class: &str) -> bool {
		self.element(id).is_some_and(|el| el.has_class(class))
	}

	/// Concatenated text of every descendant text node.
	pub fn text_content(&self, id: NodeId) -> String {
		let mut out = String::new();
		self.collect_text(id, &mut out);
		out
	}

	fn collect_text(&self, id: NodeId, out: &mut String) {
		match self.kind(id) {
			Some(NodeKind::Text(text)) => out.push_str(text),
			Some(NodeKind::Element(_)) => {
				for child in self.children(id) {
					self.collect_text(*child, out);
				}
			}
			_ => {}
		}
	}

	/// Replaces the children of an element with a single text node, or
	/// overwrites the content of a text node.
	pub fn set_text_content(&mut self, id: NodeId, text: &str) -> DomResult<()> {
		if let NodeKind::Text(content) = &mut self.data_mut(id)?.kind {
			*content = text.to_string();
			return Ok(());
		}
		self.clear_children(id)?;
		if !text.is_empty() {
			let node = self.create_text_node(text);
			self.append_child(id, node)?;
		}
		Ok(())
	}

	/// Replaces the children of an element with verbatim markup.
	pub fn set_inner_html(&mut self, id: NodeId, html: &str) -> DomResult<()> {
		self.element_mut(id)?;
		self.clear_children(id)?;
		if !html.is_empty() {
			let node = self.create_raw(html);
			self.append_child(id, node)?;
		}
		Ok(())
	}

	/// Depth-first pre-order walk of the subtree rooted at `root`.
	pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
		let mut out = Vec::new();
		let mut stack = vec![root];
		while let Some(id) = stack.pop() {
			out.push(id);
			stack.extend(self.children(id).iter().rev().copied());
		}
		out
	}

	/// Elements in search order: body subtree first, then head subtree.
	fn search_order(&self) -> impl Iterator<Item = NodeId> + '_ {
		self.descendants(self.body)
			.into_iter()
			.chain(self.descendants(self.head))
			.filter(|id| self.element(*id).is_some())
	}

	/// Finds the first element whose `id` attribute equals `id`, searching
	/// the body before the head.
	pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
		self.search_order()
			.find(|node| self.get_attribute(*node, "id") == Some(id))
	}

	/// First element matching a simple compound selector.
	///
	/// Unsupported selector syntax yields `None` rather than an error.
	pub fn query_selector(&self, selector: &str) -> Option<NodeId> {
		let selector = Selector::parse(selector)?;
		self.search_order().find(|node| self.matches(*node, &selector))
	}

	/// Every element matching a simple compound selector, in search order.
	pub fn query_selector_all(&self, selector: &str) -> Vec<NodeId> {
		match Selector::parse(selector) {
			Some(selector) => self
				.search_order()
				.filter(|node| self.matches(*node, &selector))
				.collect(),
			None => Vec::new(),
		}
	}

	/// Matching elements strictly below `root`, in pre-order.
	///
	/// Works for subtrees not yet attached to the document.
	pub fn query_selector_all_within(&self, root: NodeId, selector: &str) -> Vec<NodeId> {
		let Some(selector) = Selector::parse(selector) else {
			return Vec::new();
		};
		self.descendants(root)
			.into_iter()
			.skip(1)
			.filter(|node| self.matches(*node, &selector))
			.collect()
	}

	pub fn matches(&self, id: NodeId, selector: &Selector) -> bool {
		self.element(id).is_some_and(|el| selector.matches(el))
	}

	/// Markup of the node itself and its subtree.
	pub fn outer_html(&self, id: NodeId) -> String {
		let mut out = String::new();
		serialize::write_node(self, id, &mut out);
		out
	}

	/// Markup of the children of `id`.
	pub fn inner_html(&self, id: NodeId) -> String {
		let mut out = String::new();
		for child in self.children(id) {
			serialize::write_node(self, *child, &mut out);
		}
		out
	}
}

impl Default for Document {
	fn default() -> Self {
		Self::new()
	}
}
