//! Hyperscript-style construction of [`Node`] trees.
//!
//! ```
//! use vdom_patch::builder::{h, Props};
//! use vdom_patch::node::Node;
//!
//! let list: Node<()> = h("ul#list.compact", [
//! 	h("li", (Props::new().key("one"), "one")),
//! 	h("li", (Props::new().key("two"), "two")),
//! ]);
//! assert_eq!(list.as_element().unwrap().children().len(), 2);
//! ```

use crate::{
	node::{AttributeValue, Attributes, ClassMap, Classes, Content, Element, Key, Namespace, Node, Text},
	selector,
};
use tracing::trace;

/// Properties of an element. Everything is optional.
#[derive(Debug, Clone, Default)]
pub struct Props {
	key: Option<Key>,
	namespace: Option<Namespace>,
	classes: Option<Classes>,
	attributes: Attributes,
	text: Option<String>,
}

impl Props {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn key(mut self, key: impl Into<Key>) -> Self {
		self.key = Some(key.into());
		self
	}

	/// Overrides the inherited namespace for this element and its descendants.
	#[must_use]
	pub fn namespace(mut self, namespace: Namespace) -> Self {
		self.namespace = Some(namespace);
		self
	}

	/// Uses a (possibly shared) class map.
	///
	/// Sharing the same [`Classes`] between two generations of an element skips class diffing for it.
	#[must_use]
	pub fn classes(mut self, classes: impl Into<Classes>) -> Self {
		self.classes = Some(classes.into());
		self
	}

	/// Sets a single class membership, unsharing the class map if necessary.
	#[must_use]
	pub fn class(mut self, name: impl Into<String>, on: bool) -> Self {
		let mut map = self.classes.as_ref().map(|classes| classes.map().clone()).unwrap_or_default();
		map.insert(name.into(), on);
		self.classes = Some(map.into());
		self
	}

	#[must_use]
	pub fn attr(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
		self.attributes.insert(name.into(), value.into());
		self
	}

	#[must_use]
	pub fn id(self, id: impl Into<String>) -> Self {
		self.attr("id", id.into())
	}

	/// Inline text content. Ignored if the element also receives children.
	#[must_use]
	pub fn text(mut self, text: impl Into<String>) -> Self {
		self.text = Some(text.into());
		self
	}
}

/// Any single child argument, before normalization.
#[derive(Debug)]
pub enum Child<E> {
	Node(Node<E>),
	Text(String),
	List(Vec<Child<E>>),
	Hole,
}

impl<E> From<Node<E>> for Child<E> {
	fn from(node: Node<E>) -> Self {
		Child::Node(node)
	}
}

impl<E> From<&str> for Child<E> {
	fn from(text: &str) -> Self {
		Child::Text(text.to_owned())
	}
}

impl<E> From<String> for Child<E> {
	fn from(text: String) -> Self {
		Child::Text(text)
	}
}

impl<E> From<()> for Child<E> {
	fn from((): ()) -> Self {
		Child::Hole
	}
}

impl<E, T: Into<Child<E>>> From<Option<T>> for Child<E> {
	fn from(child: Option<T>) -> Self {
		child.map_or(Child::Hole, Into::into)
	}
}

impl<E, T: Into<Child<E>>> From<Vec<T>> for Child<E> {
	fn from(children: Vec<T>) -> Self {
		Child::List(children.into_iter().map(Into::into).collect())
	}
}

impl<E, T: Into<Child<E>>, const N: usize> From<[T; N]> for Child<E> {
	fn from(children: [T; N]) -> Self {
		Child::List(IntoIterator::into_iter(children).map(Into::into).collect())
	}
}

macro_rules! primitive_children {
	($($primitive:ty),*$(,)?) => {$(
		impl<E> From<$primitive> for Child<E> {
			fn from(primitive: $primitive) -> Self {
				Child::Text(primitive.to_string())
			}
		}
	)*};
}
primitive_children!(i8, i16, i32, i64, u8, u16, u32, u64, usize, f32, f64, char);

impl<E> Child<E> {
	fn flatten_into(self, children: &mut Vec<Node<E>>) {
		match self {
			Child::Node(node) => children.push(node),
			Child::Text(content) => children.push(text(content)),
			Child::List(list) => {
				for child in list {
					child.flatten_into(children)
				}
			}
			Child::Hole => children.push(Node::Hole),
		}
	}
}

/// The combined properties-and-children argument of [`h`].
///
/// Converts from `()`, [`Props`], a `(Props, children)` pair or any children argument alone.
#[derive(Debug)]
pub struct Input<E> {
	props: Props,
	children: Option<Child<E>>,
}

impl<E> From<()> for Input<E> {
	fn from((): ()) -> Self {
		Self { props: Props::new(), children: None }
	}
}

impl<E> From<Props> for Input<E> {
	fn from(props: Props) -> Self {
		Self { props, children: None }
	}
}

impl<E, C: Into<Child<E>>> From<(Props, C)> for Input<E> {
	fn from((props, children): (Props, C)) -> Self {
		Self { props, children: Some(children.into()) }
	}
}

impl<E> From<Node<E>> for Input<E> {
	fn from(node: Node<E>) -> Self {
		Self { props: Props::new(), children: Some(node.into()) }
	}
}

impl<E> From<&str> for Input<E> {
	fn from(text: &str) -> Self {
		Self { props: Props::new(), children: Some(text.into()) }
	}
}

impl<E> From<String> for Input<E> {
	fn from(text: String) -> Self {
		Self { props: Props::new(), children: Some(text.into()) }
	}
}

impl<E, T: Into<Child<E>>> From<Vec<T>> for Input<E> {
	fn from(children: Vec<T>) -> Self {
		Self { props: Props::new(), children: Some(children.into()) }
	}
}

impl<E, T: Into<Child<E>>, const N: usize> From<[T; N]> for Input<E> {
	fn from(children: [T; N]) -> Self {
		Self { props: Props::new(), children: Some(children.into()) }
	}
}

/// Builds an element node from a selector like `div#id.a.b` plus properties and/or children.
///
/// Nested child lists are flattened. Holes are kept in place so that the differ can skip them.
/// A bare string is shorthand for a single text child.
///
/// An `svg` base tag switches itself and its descendants into the SVG namespace while patching.
#[must_use]
pub fn h<E>(selector: &str, input: impl Into<Input<E>>) -> Node<E> {
	let Input { props, children } = input.into();
	let Props { key, namespace, classes, mut attributes, text: inline_text } = props;
	let parsed = selector::parse(selector);

	if let Some(id) = parsed.id {
		attributes.insert("id".to_owned(), AttributeValue::Text(id.to_owned()));
	}

	let classes = match (classes, parsed.classes.is_empty()) {
		(Some(classes), true) => classes,
		(None, true) => Classes::default(),
		(classes, false) => {
			let mut map: ClassMap = classes.map(|classes| classes.map().clone()).unwrap_or_default();
			for class in parsed.classes {
				map.insert(class.to_owned(), true);
			}
			map.into()
		}
	};

	let mut flattened = Vec::new();
	if let Some(children) = children {
		children.flatten_into(&mut flattened)
	}
	let content = match inline_text {
		Some(inline_text) if flattened.is_empty() => Content::Text(inline_text),
		Some(_) => {
			trace!(selector, "Ignoring inline text in favour of children.");
			Content::Children(flattened)
		}
		None => Content::Children(flattened),
	};

	Node::Element(Element {
		selector: selector.to_owned(),
		name: parsed.name.to_owned(),
		namespace,
		key,
		classes,
		attributes,
		content,
		host: None,
	})
}

/// Builds a standalone text node.
#[must_use]
pub fn text<E>(content: impl Into<String>) -> Node<E> {
	Node::Text(Text { text: content.into(), host: None })
}

#[cfg(test)]
mod tests {
	use super::*;

	fn element(node: &Node<()>) -> &Element<()> {
		node.as_element().expect("element")
	}

	fn texts(node: &Node<()>) -> Vec<Option<&str>> {
		element(node).children().iter().map(|child| child.as_text().map(Text::text)).collect()
	}

	#[test]
	fn bare_string_is_a_text_child() {
		let node = h("div", "I am a string");
		assert_eq!(texts(&node), vec![Some("I am a string")]);
	}

	#[test]
	fn selector_sugar() {
		let node = h::<()>("div#unique.a.b", ());
		let element = element(&node);
		assert_eq!(element.name(), "div");
		assert_eq!(element.selector(), "div#unique.a.b");
		assert_eq!(element.attributes().get("id"), Some(&AttributeValue::Text("unique".to_owned())));
		assert_eq!(element.classes().enabled().collect::<Vec<_>>(), vec!["a", "b"]);
	}

	#[test]
	fn explicit_classes_cannot_remove_selector_classes() {
		let node = h::<()>("i.has", Props::new().class("classes", true).class("has", false).class("not", false));
		let classes = element(&node).classes();
		assert!(classes.contains("has"));
		assert!(classes.contains("classes"));
		assert!(!classes.contains("not"));
	}

	#[test]
	fn shared_classes_stay_shared_without_selector_classes() {
		let shared: Classes = vec![("i", true), ("horse", false)].into_iter().collect();
		let a = h::<()>("i", Props::new().classes(shared.clone()));
		let b = h::<()>("i.x", Props::new().classes(shared.clone()));
		assert!(element(&a).classes().ptr_eq(&shared));
		assert!(!element(&b).classes().ptr_eq(&shared));
	}

	#[test]
	fn nested_lists_and_holes() {
		let node = h("p", vec![Child::from("a"), Child::from(vec![Some("b"), None]), Child::Hole, Child::from(vec![vec!["c"]])]);
		assert_eq!(texts(&node), vec![Some("a"), Some("b"), None, None, Some("c")]);
		assert!(element(&node).children()[2].is_hole());
		assert!(element(&node).children()[3].is_hole());
	}

	#[test]
	fn primitives_become_text() {
		let node = h("p", (Props::new(), [1_u32, 2]));
		assert_eq!(texts(&node), vec![Some("1"), Some("2")]);
	}

	#[test]
	fn inline_text() {
		let node = h::<()>("p", Props::new().text("inline"));
		assert!(matches!(element(&node).content(), Content::Text(text) if text == "inline"));
		let node = h("p", (Props::new().text("inline"), "child"));
		assert_eq!(texts(&node), vec![Some("child")]);
	}

	#[test]
	fn key_and_namespace() {
		let node = h::<()>("div", Props::new().key("k").namespace(Namespace::Other("whatever".to_owned())));
		assert_eq!(element(&node).key(), Some(&Key::from("k")));
		assert_eq!(element(&node).namespace(), Some(&Namespace::Other("whatever".to_owned())));
	}
}
