//! A [`Document`] backed by a real browser DOM, through [`web_sys`].

use crate::{
	document::{Document, NodeKind},
	loggable,
	node::{AttributeValue, Namespace},
};
use tracing::{error, instrument, warn};
use wasm_bindgen::JsCast;

/// Wraps a [`web_sys::Document`]. Handles are [`web_sys::Node`]s.
///
/// DOM exceptions are logged as errors and the respective operation is skipped.
#[derive(Debug, Clone)]
pub struct WebDocument {
	document: web_sys::Document,
}

impl WebDocument {
	#[must_use]
	pub fn new(document: web_sys::Document) -> Self {
		Self { document }
	}

	#[must_use]
	pub fn document(&self) -> &web_sys::Document {
		&self.document
	}
}

fn as_element<'a>(node: &'a web_sys::Node, operation: &str) -> Option<&'a web_sys::Element> {
	let element = node.dyn_ref::<web_sys::Element>();
	if element.is_none() {
		error!("Expected `web_sys::Element` to {} but found {:?}.", operation, node);
	}
	element
}

impl Document for WebDocument {
	type Handle = web_sys::Node;

	#[instrument(skip(self))]
	fn create_element(&mut self, name: &str, namespace: &Namespace) -> web_sys::Node {
		let element = match namespace {
			Namespace::Html => self.document.create_element(name),
			namespace => self.document.create_element_ns(Some(namespace.uri()), name),
		};
		match element {
			Ok(element) => element.into(),
			Err(error) => {
				// Keeps positions intact for the rest of the patch.
				error!("Failed to create element <{}>: {:?}. Substituting a comment.", name, error);
				self.document.create_comment(name).into()
			}
		}
	}

	fn create_text_node(&mut self, text: &str) -> web_sys::Node {
		self.document.create_text_node(text).into()
	}

	fn set_attribute(&mut self, element: &web_sys::Node, name: &str, value: &AttributeValue) {
		if let Some(element) = as_element(element, "set an attribute on") {
			let rendered = value.render();
			let result = match &rendered {
				Some(rendered) => element.set_attribute(name, rendered),
				None => element.remove_attribute(name),
			};
			if let Err(error) = result {
				let rendered = rendered.as_deref().map(loggable);
				error!("Could not set attribute {:?} to {:?}: {:?}", name, rendered, error)
			}
		}
	}

	fn remove_attribute(&mut self, element: &web_sys::Node, name: &str) {
		if let Some(element) = as_element(element, "remove an attribute from") {
			if let Err(error) = element.remove_attribute(name) {
				warn!("Could not remove attribute {:?}: {:?}", name, error)
			}
		}
	}

	fn add_class(&mut self, element: &web_sys::Node, name: &str) {
		if let Some(element) = as_element(element, "add a class to") {
			if let Err(error) = element.class_list().add_1(name) {
				error!("Could not add class {:?}: {:?}", name, error)
			}
		}
	}

	fn remove_class(&mut self, element: &web_sys::Node, name: &str) {
		if let Some(element) = as_element(element, "remove a class from") {
			if let Err(error) = element.class_list().remove_1(name) {
				warn!("Could not remove class {:?}: {:?}", name, error)
			}
		}
	}

	fn set_text_content(&mut self, node: &web_sys::Node, text: &str) {
		node.set_text_content(Some(text))
	}

	fn insert_before(&mut self, parent: &web_sys::Node, child: &web_sys::Node, reference: Option<&web_sys::Node>) {
		if let Err(error) = parent.insert_before(child, reference) {
			error!("Failed to insert node: {:?}", error)
		}
	}

	fn remove_child(&mut self, parent: &web_sys::Node, child: &web_sys::Node) {
		if let Err(error) = parent.remove_child(child) {
			error!("Failed to remove node: {:?}", error)
		}
	}

	fn parent_node(&self, node: &web_sys::Node) -> Option<web_sys::Node> {
		node.parent_node()
	}

	fn next_sibling(&self, node: &web_sys::Node) -> Option<web_sys::Node> {
		node.next_sibling()
	}

	fn node_kind(&self, node: &web_sys::Node) -> NodeKind {
		match node.node_type() {
			web_sys::Node::ELEMENT_NODE => NodeKind::Element,
			web_sys::Node::TEXT_NODE => NodeKind::Text,
			_ => NodeKind::Other,
		}
	}

	fn tag_name(&self, element: &web_sys::Node) -> String {
		element.dyn_ref::<web_sys::Element>().map_or_else(|| element.node_name(), web_sys::Element::tag_name)
	}

	fn namespace(&self, element: &web_sys::Node) -> Namespace {
		element
			.dyn_ref::<web_sys::Element>()
			.and_then(web_sys::Element::namespace_uri)
			.map_or(Namespace::Html, |uri| Namespace::from_uri(&uri))
	}

	fn attributes(&self, element: &web_sys::Node) -> Vec<(String, String)> {
		let attributes = match as_element(element, "read attributes of") {
			Some(element) => element.attributes(),
			None => return Vec::new(),
		};
		(0..attributes.length())
			.filter_map(|i| attributes.item(i))
			.map(|attribute| (attribute.name(), attribute.value()))
			.collect()
	}

	fn class_list(&self, element: &web_sys::Node) -> Vec<String> {
		let class_list = match as_element(element, "read classes of") {
			Some(element) => element.class_list(),
			None => return Vec::new(),
		};
		(0..class_list.length()).filter_map(|i| class_list.item(i)).collect()
	}

	fn child_nodes(&self, node: &web_sys::Node) -> Vec<web_sys::Node> {
		let child_nodes = node.child_nodes();
		(0..child_nodes.length()).filter_map(|i| child_nodes.item(i)).collect()
	}

	fn text_content(&self, node: &web_sys::Node) -> String {
		node.text_content().unwrap_or_default()
	}
}
