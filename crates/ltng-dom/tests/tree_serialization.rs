//! Building and serializing a component-like tree through the public API.

use ltng_dom::Document;
use rstest::rstest;

#[rstest]
fn test_card_component_renders_into_body() {
	let mut doc = Document::new();
	let body = doc.body();

	let card = doc.create_element("div");
	doc.add_class(card, &["card"]).unwrap();
	doc.set_style(card, "borderRadius", "8px").unwrap();

	let title = doc.create_element("h2");
	doc.set_text_content(title, "Welcome").unwrap();
	doc.append_child(card, title).unwrap();

	let divider = doc.create_element("hr");
	doc.append_child(card, divider).unwrap();

	let button = doc.create_element("button");
	doc.set_attribute(button, "type", "button").unwrap();
	let label = doc.create_text_node("Go");
	doc.append_child(button, label).unwrap();
	doc.append_child(card, button).unwrap();

	doc.append_child(body, card).unwrap();

	assert_eq!(
		doc.inner_html(body),
		concat!(
			r#"<div class="card" style="border-radius:8px">"#,
			"<h2>Welcome</h2>",
			"<hr />",
			r#"<button type="button">Go</button>"#,
			"</div>"
		)
	);
	assert_eq!(doc.query_selector(".card"), Some(card));
	assert_eq!(doc.text_content(card), "WelcomeGo");
}

#[rstest]
fn test_removed_subtree_is_not_serialized() {
	let mut doc = Document::new();
	let body = doc.body();
	let keep = doc.create_element("main");
	let drop = doc.create_element("aside");
	doc.append_child(body, keep).unwrap();
	doc.append_child(body, drop).unwrap();

	doc.remove(drop).unwrap();

	assert_eq!(doc.inner_html(body), "<main></main>");
	assert_eq!(doc.outer_html(body), "<body><main></main></body>");
}
