//! Mock DOM for server-side rendering
//!
//! A small arena-backed document tree that page scripts mutate while they
//! run on the server. The tree is serialized back into HTML once every
//! script has executed.
//!
//! # Ownership
//!
//! A [`Document`] owns every node. Nodes are addressed by [`NodeId`] and each
//! node has at most one parent; appending a node that already has a parent
//! moves it. The document always owns exactly one `head` and one `body`.
//!
//! # Examples
//!
//! ```
//! use ltng_dom::Document;
//!
//! let mut doc = Document::new();
//! let div = doc.create_element("div");
//! doc.set_attribute(div, "class", "card").unwrap();
//! let text = doc.create_text_node("Hello");
//! doc.append_child(div, text).unwrap();
//! doc.append_child(doc.body(), div).unwrap();
//!
//! assert_eq!(doc.inner_html(doc.body()), r#"<div class="card">Hello</div>"#);
//! ```

mod document;
mod error;
mod node;
mod selector;
mod serialize;

pub use document::Document;
pub use error::{DomError, DomResult};
pub use node::{Element, NodeId, NodeKind, VOID_ELEMENTS, is_void_element};
pub use selector::Selector;
pub use serialize::{escape_attribute, escape_text, kebab_case};
