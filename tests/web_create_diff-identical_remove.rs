#![cfg(target_arch = "wasm32")]

use std::sync::Once;
use vdom_patch::{builder::text, h, web::WebDocument, Differ, Namespace, Node, Previous, Props};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{window, HtmlBodyElement};

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn text_node() {
	test_create_diff_identical_remove(|| text("Hello vdom-patch text!"), "Hello vdom-patch text!");
}

#[wasm_bindgen_test]
fn multiple_text_nodes() {
	test_create_diff_identical_remove(|| h("span", ["Hello vdom-patch", " multiple ", "nodes!"]), "<span>Hello vdom-patch multiple nodes!</span>");
}

#[wasm_bindgen_test]
fn keyed() {
	test_create_diff_identical_remove(
		|| {
			h(
				"ul",
				[
					h("li", (Props::new().key(0), "Hello vdom-patch")),
					h("li", (Props::new().key(1), " keyed ")),
					h("li", (Props::new().key(2), " nodes.")),
				],
			)
		},
		"<ul><li>Hello vdom-patch</li><li> keyed </li><li> nodes.</li></ul>",
	);
}

#[wasm_bindgen_test]
fn holes() {
	test_create_diff_identical_remove(|| h("p", [None, Some(text("between")), None]), "<p>between</p>");
}

#[wasm_bindgen_test]
fn minimal_div() {
	test_create_diff_identical_remove(|| h("div", ()), "<div></div>");
}

#[wasm_bindgen_test]
fn attributes_and_classes() {
	test_create_diff_identical_remove(
		|| h("button#test-button.primary", Props::new().attr("type", "button").attr("disabled", true).attr("hidden", false)),
		r#"<button disabled="" id="test-button" type="button" class="primary"></button>"#,
	);
}

#[wasm_bindgen_test]
fn other_namespace() {
	test_create_diff_identical_remove(|| h("math", Props::new().namespace(Namespace::Other("http://www.w3.org/1998/Math/MathML".to_owned()))), "<math></math>");
}

#[wasm_bindgen_test]
fn minimal_svg() {
	test_create_diff_identical_remove(|| h("svg", ()), "<svg></svg>");
}

static LOG_INITIALIZED: Once = Once::new();

fn test_create_diff_identical_remove(vdom: impl Fn() -> Node<web_sys::Node>, expected_html: &str) {
	LOG_INITIALIZED.call_once(tracing_wasm::set_as_global_default);

	let document = window().unwrap().document().unwrap();
	let body = document.body().unwrap().dyn_into::<HtmlBodyElement>().unwrap();
	let container = document.create_element("div").unwrap();
	body.append_child(&container).unwrap();

	let mut differ = Differ::new(WebDocument::new(document));

	let created = differ.patch(Previous::Element(container.clone().into()), h("div", [vdom()]));
	assert_eq!(container.inner_html(), expected_html);

	let identical = differ.patch(created, h("div", [vdom()]));
	assert_eq!(container.inner_html(), expected_html);

	let removed = differ.patch(identical, h("div", ()));
	assert_eq!(container.inner_html(), "");
	assert_eq!(removed.host(), Some(&container.clone().into()));

	container.remove();
}
