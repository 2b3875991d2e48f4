//! Native functions behind the JavaScript DOM wrappers
//!
//! Nodes cross the boundary as numeric ids. All arguments are converted to
//! Rust values before the document is borrowed, because conversions may call
//! back into script code.

use std::cell::RefCell;
use std::rc::Rc;

use boa_engine::object::ObjectInitializer;
use boa_engine::object::builtins::JsArray;
use boa_engine::property::Attribute;
use boa_engine::{
	Context, JsArgs, JsError, JsNativeError, JsResult, JsString, JsValue, NativeFunction, js_string,
};
use boa_gc::{Finalize, Trace};
use ltng_dom::{DomError, Document, NodeId, NodeKind};

/// Shared handle to the document captured by every host function.
#[derive(Clone, Trace, Finalize)]
pub(super) struct DomHandle {
	#[unsafe_ignore_trace]
	dom: Rc<RefCell<Document>>,
}

impl DomHandle {
	pub(super) fn new(dom: Rc<RefCell<Document>>) -> Self {
		Self { dom }
	}
}

type HostFn = fn(&JsValue, &[JsValue], &DomHandle, &mut Context) -> JsResult<JsValue>;

const HOST_FUNCTIONS: &[(&str, usize, HostFn)] = &[
	("createElement", 1, create_element),
	("createTextNode", 1, create_text_node),
	("head", 0, head),
	("body", 0, body),
	("kind", 1, kind),
	("tagName", 1, tag_name),
	("parent", 1, parent),
	("children", 1, children),
	("contains", 2, contains),
	("appendChild", 2, append_child),
	("remove", 1, remove),
	("setAttribute", 3, set_attribute),
	("getAttribute", 2, get_attribute),
	("removeAttribute", 2, remove_attribute),
	("attributeNames", 1, attribute_names),
	("setStyle", 3, set_style),
	("getStyle", 2, get_style),
	("addClass", 2, add_class),
	("removeClass", 2, remove_class),
	("hasClass", 2, has_class),
	("textContent", 1, text_content),
	("setTextContent", 2, set_text_content),
	("innerHtml", 1, inner_html),
	("setInnerHtml", 2, set_inner_html),
	("outerHtml", 1, outer_html),
	("querySelector", 1, query_selector),
	("querySelectorAll", 1, query_selector_all),
	("querySelectorAllWithin", 2, query_selector_all_within),
	("getElementById", 1, get_element_by_id),
	("log", 2, log),
];

/// Installs the `__ltng_host` object on the global scope.
pub(super) fn register(context: &mut Context, handle: DomHandle) -> JsResult<()> {
	let mut host = ObjectInitializer::new(context);
	for (name, length, function) in HOST_FUNCTIONS {
		host.function(
			NativeFunction::from_copy_closure_with_captures(*function, handle.clone()),
			JsString::from(*name),
			*length,
		);
	}
	let host = host.build();
	context.register_global_property(js_string!("__ltng_host"), host, Attribute::all())
}

fn type_error(message: impl Into<String>) -> JsError {
	let message: String = message.into();
	JsNativeError::typ().with_message(message).into()
}

fn dom_error(err: DomError) -> JsError {
	type_error(err.to_string())
}

fn string_arg(args: &[JsValue], index: usize, ctx: &mut Context) -> JsResult<String> {
	Ok(args
		.get_or_undefined(index)
		.to_string(ctx)?
		.to_std_string_escaped())
}

fn node_arg(args: &[JsValue], index: usize, handle: &DomHandle) -> JsResult<NodeId> {
	let value = args.get_or_undefined(index);
	let Some(raw) = value.as_number() else {
		return Err(type_error("expected a node id"));
	};
	if raw < 0.0 || raw.fract() != 0.0 {
		return Err(type_error(format!("invalid node id {raw}")));
	}
	let id = NodeId::from_index(raw as usize);
	if !handle.dom.borrow().contains(id) {
		return Err(dom_error(DomError::UnknownNode(id)));
	}
	Ok(id)
}

fn node_value(id: NodeId) -> JsValue {
	JsValue::from(id.index() as f64)
}

fn optional_node(id: Option<NodeId>) -> JsValue {
	id.map_or_else(JsValue::null, node_value)
}

fn string_value(value: &str) -> JsValue {
	JsValue::from(JsString::from(value))
}

fn node_list(ids: Vec<NodeId>, ctx: &mut Context) -> JsValue {
	JsArray::from_iter(ids.into_iter().map(node_value), ctx).into()
}

fn create_element(_: &JsValue, args: &[JsValue], handle: &DomHandle, ctx: &mut Context) -> JsResult<JsValue> {
	let tag = string_arg(args, 0, ctx)?;
	Ok(node_value(handle.dom.borrow_mut().create_element(&tag)))
}

fn create_text_node(_: &JsValue, args: &[JsValue], handle: &DomHandle, ctx: &mut Context) -> JsResult<JsValue> {
	let text = string_arg(args, 0, ctx)?;
	Ok(node_value(handle.dom.borrow_mut().create_text_node(&text)))
}

fn head(_: &JsValue, _: &[JsValue], handle: &DomHandle, _: &mut Context) -> JsResult<JsValue> {
	Ok(node_value(handle.dom.borrow().head()))
}

fn body(_: &JsValue, _: &[JsValue], handle: &DomHandle, _: &mut Context) -> JsResult<JsValue> {
	Ok(node_value(handle.dom.borrow().body()))
}

fn kind(_: &JsValue, args: &[JsValue], handle: &DomHandle, _: &mut Context) -> JsResult<JsValue> {
	let id = node_arg(args, 0, handle)?;
	let name = match handle.dom.borrow().kind(id) {
		Some(NodeKind::Element(_)) => "element",
		Some(NodeKind::Text(_)) => "text",
		Some(NodeKind::Raw(_)) | None => "raw",
	};
	Ok(string_value(name))
}

fn tag_name(_: &JsValue, args: &[JsValue], handle: &DomHandle, _: &mut Context) -> JsResult<JsValue> {
	let id = node_arg(args, 0, handle)?;
	Ok(handle
		.dom
		.borrow()
		.tag_name(id)
		.map_or_else(JsValue::null, string_value))
}

fn parent(_: &JsValue, args: &[JsValue], handle: &DomHandle, _: &mut Context) -> JsResult<JsValue> {
	let id = node_arg(args, 0, handle)?;
	Ok(optional_node(handle.dom.borrow().parent(id)))
}

fn children(_: &JsValue, args: &[JsValue], handle: &DomHandle, ctx: &mut Context) -> JsResult<JsValue> {
	let id = node_arg(args, 0, handle)?;
	let ids = handle.dom.borrow().children(id).to_vec();
	Ok(node_list(ids, ctx))
}

fn contains(_: &JsValue, args: &[JsValue], handle: &DomHandle, _: &mut Context) -> JsResult<JsValue> {
	let ancestor = node_arg(args, 0, handle)?;
	let node = node_arg(args, 1, handle)?;
	Ok(JsValue::from(
		handle.dom.borrow().is_inclusive_ancestor(ancestor, node),
	))
}

fn append_child(_: &JsValue, args: &[JsValue], handle: &DomHandle, _: &mut Context) -> JsResult<JsValue> {
	let parent = node_arg(args, 0, handle)?;
	let child = node_arg(args, 1, handle)?;
	let child = handle
		.dom
		.borrow_mut()
		.append_child(parent, child)
		.map_err(dom_error)?;
	Ok(node_value(child))
}

fn remove(_: &JsValue, args: &[JsValue], handle: &DomHandle, _: &mut Context) -> JsResult<JsValue> {
	let id = node_arg(args, 0, handle)?;
	handle.dom.borrow_mut().remove(id).map_err(dom_error)?;
	Ok(JsValue::undefined())
}

fn set_attribute(_: &JsValue, args: &[JsValue], handle: &DomHandle, ctx: &mut Context) -> JsResult<JsValue> {
	let id = node_arg(args, 0, handle)?;
	let name = string_arg(args, 1, ctx)?;
	let value = string_arg(args, 2, ctx)?;
	handle
		.dom
		.borrow_mut()
		.set_attribute(id, &name, &value)
		.map_err(dom_error)?;
	Ok(JsValue::undefined())
}

fn get_attribute(_: &JsValue, args: &[JsValue], handle: &DomHandle, ctx: &mut Context) -> JsResult<JsValue> {
	let id = node_arg(args, 0, handle)?;
	let name = string_arg(args, 1, ctx)?;
	Ok(handle
		.dom
		.borrow()
		.get_attribute(id, &name)
		.map_or_else(JsValue::null, string_value))
}

fn remove_attribute(_: &JsValue, args: &[JsValue], handle: &DomHandle, ctx: &mut Context) -> JsResult<JsValue> {
	let id = node_arg(args, 0, handle)?;
	let name = string_arg(args, 1, ctx)?;
	handle
		.dom
		.borrow_mut()
		.remove_attribute(id, &name)
		.map_err(dom_error)?;
	Ok(JsValue::undefined())
}

fn attribute_names(_: &JsValue, args: &[JsValue], handle: &DomHandle, ctx: &mut Context) -> JsResult<JsValue> {
	let id = node_arg(args, 0, handle)?;
	let names: Vec<JsValue> = handle
		.dom
		.borrow()
		.element(id)
		.map(|el| el.attributes.keys().map(|k| string_value(k)).collect())
		.unwrap_or_default();
	Ok(JsArray::from_iter(names, ctx).into())
}

fn set_style(_: &JsValue, args: &[JsValue], handle: &DomHandle, ctx: &mut Context) -> JsResult<JsValue> {
	let id = node_arg(args, 0, handle)?;
	let property = string_arg(args, 1, ctx)?;
	let value = string_arg(args, 2, ctx)?;
	handle
		.dom
		.borrow_mut()
		.set_style(id, &property, &value)
		.map_err(dom_error)?;
	Ok(JsValue::undefined())
}

fn get_style(_: &JsValue, args: &[JsValue], handle: &DomHandle, ctx: &mut Context) -> JsResult<JsValue> {
	let id = node_arg(args, 0, handle)?;
	let property = string_arg(args, 1, ctx)?;
	Ok(string_value(
		handle.dom.borrow().get_style(id, &property).unwrap_or(""),
	))
}

fn add_class(_: &JsValue, args: &[JsValue], handle: &DomHandle, ctx: &mut Context) -> JsResult<JsValue> {
	let id = node_arg(args, 0, handle)?;
	let classes = string_arg(args, 1, ctx)?;
	let tokens: Vec<&str> = classes.split_whitespace().collect();
	handle
		.dom
		.borrow_mut()
		.add_class(id, &tokens)
		.map_err(dom_error)?;
	Ok(JsValue::undefined())
}

fn remove_class(_: &JsValue, args: &[JsValue], handle: &DomHandle, ctx: &mut Context) -> JsResult<JsValue> {
	let id = node_arg(args, 0, handle)?;
	let classes = string_arg(args, 1, ctx)?;
	let tokens: Vec<&str> = classes.split_whitespace().collect();
	handle
		.dom
		.borrow_mut()
		.remove_class(id, &tokens)
		.map_err(dom_error)?;
	Ok(JsValue::undefined())
}

fn has_class(_: &JsValue, args: &[JsValue], handle: &DomHandle, ctx: &mut Context) -> JsResult<JsValue> {
	let id = node_arg(args, 0, handle)?;
	let class = string_arg(args, 1, ctx)?;
	Ok(JsValue::from(handle.dom.borrow().has_class(id, &class)))
}

fn text_content(_: &JsValue, args: &[JsValue], handle: &DomHandle, _: &mut Context) -> JsResult<JsValue> {
	let id = node_arg(args, 0, handle)?;
	Ok(string_value(&handle.dom.borrow().text_content(id)))
}

fn set_text_content(_: &JsValue, args: &[JsValue], handle: &DomHandle, ctx: &mut Context) -> JsResult<JsValue> {
	let id = node_arg(args, 0, handle)?;
	let text = string_arg(args, 1, ctx)?;
	handle
		.dom
		.borrow_mut()
		.set_text_content(id, &text)
		.map_err(dom_error)?;
	Ok(JsValue::undefined())
}

fn inner_html(_: &JsValue, args: &[JsValue], handle: &DomHandle, _: &mut Context) -> JsResult<JsValue> {
	let id = node_arg(args, 0, handle)?;
	Ok(string_value(&handle.dom.borrow().inner_html(id)))
}

fn set_inner_html(_: &JsValue, args: &[JsValue], handle: &DomHandle, ctx: &mut Context) -> JsResult<JsValue> {
	let id = node_arg(args, 0, handle)?;
	let html = string_arg(args, 1, ctx)?;
	handle
		.dom
		.borrow_mut()
		.set_inner_html(id, &html)
		.map_err(dom_error)?;
	Ok(JsValue::undefined())
}

fn outer_html(_: &JsValue, args: &[JsValue], handle: &DomHandle, _: &mut Context) -> JsResult<JsValue> {
	let id = node_arg(args, 0, handle)?;
	Ok(string_value(&handle.dom.borrow().outer_html(id)))
}

fn query_selector(_: &JsValue, args: &[JsValue], handle: &DomHandle, ctx: &mut Context) -> JsResult<JsValue> {
	let selector = string_arg(args, 0, ctx)?;
	Ok(optional_node(handle.dom.borrow().query_selector(&selector)))
}

fn query_selector_all(_: &JsValue, args: &[JsValue], handle: &DomHandle, ctx: &mut Context) -> JsResult<JsValue> {
	let selector = string_arg(args, 0, ctx)?;
	let ids = handle.dom.borrow().query_selector_all(&selector);
	Ok(node_list(ids, ctx))
}

fn query_selector_all_within(
	_: &JsValue,
	args: &[JsValue],
	handle: &DomHandle,
	ctx: &mut Context,
) -> JsResult<JsValue> {
	let root = node_arg(args, 0, handle)?;
	let selector = string_arg(args, 1, ctx)?;
	let ids = handle.dom.borrow().query_selector_all_within(root, &selector);
	Ok(node_list(ids, ctx))
}

fn get_element_by_id(_: &JsValue, args: &[JsValue], handle: &DomHandle, ctx: &mut Context) -> JsResult<JsValue> {
	let id = string_arg(args, 0, ctx)?;
	Ok(optional_node(handle.dom.borrow().get_element_by_id(&id)))
}

fn log(_: &JsValue, args: &[JsValue], _: &DomHandle, ctx: &mut Context) -> JsResult<JsValue> {
	let level = string_arg(args, 0, ctx)?;
	let message = string_arg(args, 1, ctx)?;
	match level.as_str() {
		"error" => tracing::error!(target: "ltng::console", "{message}"),
		"warn" => tracing::warn!(target: "ltng::console", "{message}"),
		"debug" => tracing::debug!(target: "ltng::console", "{message}"),
		"trace" => tracing::trace!(target: "ltng::console", "{message}"),
		_ => tracing::info!(target: "ltng::console", "{message}"),
	}
	Ok(JsValue::undefined())
}
