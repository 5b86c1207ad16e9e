//! Building [`Node`]s from existing host content.

use crate::{
	diff::DEFAULT_DEPTH_LIMIT,
	document::{Document, NodeKind},
	node::{AttributeValue, Attributes, Classes, Content, Element, Namespace, Node, Text},
	selector,
};
use tracing::{error, instrument, trace};

/// Mirrors the host subtree at `node` as a [`Node`] bound to it, so that a following patch reconciles against it.
///
/// Host nodes that are neither elements nor text are kept as [`Node::Opaque`], which the differ leaves in place.
/// So are children more than [`DEFAULT_DEPTH_LIMIT`] levels down.
#[instrument(level = "trace", skip(document))]
pub fn adopt<D: Document>(document: &D, node: D::Handle) -> Node<D::Handle> {
	adopt_to_depth(document, node, DEFAULT_DEPTH_LIMIT)
}

/// Like [`adopt`], but descends at most `depth_limit` levels of children.
pub fn adopt_to_depth<D: Document>(document: &D, node: D::Handle, depth_limit: usize) -> Node<D::Handle> {
	match document.node_kind(&node) {
		NodeKind::Element => Node::Element(element_to_depth(document, node, depth_limit)),
		NodeKind::Text => adopt_text(document, node),
		NodeKind::Other => {
			trace!("Keeping unmodelled host node as opaque.");
			Node::Opaque(node)
		}
	}
}

/// Like [`adopt`], but for an element and including all of its attributes and descendants.
pub fn adopt_element<D: Document>(document: &D, element: D::Handle) -> Element<D::Handle> {
	element_to_depth(document, element, DEFAULT_DEPTH_LIMIT)
}

fn element_to_depth<D: Document>(document: &D, element: D::Handle, depth: usize) -> Element<D::Handle> {
	let child_nodes = document.child_nodes(&element);
	let children = if depth == 0 {
		if !child_nodes.is_empty() {
			error!("Depth limit reached. Keeping {} children as opaque.", child_nodes.len());
		}
		child_nodes.into_iter().map(Node::Opaque).collect()
	} else {
		child_nodes.into_iter().map(|child| adopt_to_depth(document, child, depth - 1)).collect()
	};
	Element {
		content: Content::Children(children),
		attributes: adopt_attributes(document, &element),
		..adopt_shell(document, element)
	}
}

/// Adopts only the root of a host subtree: its tag, id and classes.
///
/// The existing children are not described, so patching against the result appends new children after them.
pub(crate) fn adopt_root<D: Document>(document: &D, node: D::Handle) -> Node<D::Handle> {
	match document.node_kind(&node) {
		NodeKind::Element => {
			let id = id_of(document, &node);
			let mut element = adopt_shell(document, node);
			if let Some(id) = id {
				element.attributes.insert("id".to_owned(), AttributeValue::Text(id));
			}
			Node::Element(element)
		}
		NodeKind::Text => adopt_text(document, node),
		NodeKind::Other => Node::Opaque(node),
	}
}

fn adopt_text<D: Document>(document: &D, node: D::Handle) -> Node<D::Handle> {
	Node::Text(Text {
		text: document.text_content(&node),
		host: Some(node),
	})
}

/// Tag, selector, namespace and classes, without attributes or content.
fn adopt_shell<D: Document>(document: &D, element: D::Handle) -> Element<D::Handle> {
	let namespace = document.namespace(&element);
	let name = match namespace {
		// Host HTML tag names are upper case.
		Namespace::Html => document.tag_name(&element).to_ascii_lowercase(),
		_ => document.tag_name(&element),
	};
	let classes = document.class_list(&element);
	let id = id_of(document, &element);

	Element {
		selector: selector::render(&name, id.as_deref(), classes.iter().map(String::as_str)),
		name,
		namespace: match namespace {
			Namespace::Html | Namespace::Svg => None,
			other @ Namespace::Other(_) => Some(other),
		},
		key: None,
		classes: classes.into_iter().map(|class| (class, true)).collect::<Classes>(),
		attributes: Attributes::new(),
		content: Content::default(),
		host: Some(element),
	}
}

fn id_of<D: Document>(document: &D, element: &D::Handle) -> Option<String> {
	document.attributes(element).into_iter().find(|(name, _)| name == "id").map(|(_, value)| value).filter(|id| !id.is_empty())
}

/// Classes are tracked separately, so the `class` attribute is skipped.
fn adopt_attributes<D: Document>(document: &D, element: &D::Handle) -> Attributes {
	document
		.attributes(element)
		.into_iter()
		.filter(|(name, _)| name != "class")
		.map(|(name, value)| (name, AttributeValue::Text(value)))
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::memory::MemoryDocument;

	#[test]
	fn root_adoption_is_shallow() {
		let mut document = MemoryDocument::new();
		let root = document.create_element("section", &Namespace::Html);
		document.set_attribute(&root, "id", &"main".into());
		document.set_attribute(&root, "title", &"ignored".into());
		document.add_class(&root, "wide");
		let child = document.create_text_node("kept");
		document.append_child(&root, &child);

		let adopted = adopt_root(&document, root);
		let element = adopted.as_element().expect("element");
		assert_eq!(element.selector(), "section#main.wide");
		assert_eq!(element.attributes().len(), 1);
		assert!(element.children().is_empty());
		assert_eq!(adopted.host(), Some(&root));
	}

	#[test]
	fn deep_adoption_keeps_other_namespaces_explicit() {
		let mut document = MemoryDocument::new();
		let math = Namespace::Other("http://www.w3.org/1998/Math/MathML".to_owned());
		let root = document.create_element("math", &math);
		let svg = document.create_element("svg", &Namespace::Svg);
		let comment = document.create_comment("opaque");
		document.append_child(&root, &svg);
		document.append_child(&root, &comment);

		let element = adopt_element(&document, root);
		assert_eq!(element.namespace(), Some(&math));
		assert_eq!(element.children()[0].as_element().map(Element::namespace), Some(None));
		assert!(matches!(&element.children()[1], Node::Opaque(handle) if *handle == comment));
	}
}
