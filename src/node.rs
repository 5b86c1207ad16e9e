//! The declarative tree model that the [`Differ`](`crate::diff::Differ`) consumes.
//!
//! A [`Node`] is a pure description until it has been passed through [`Differ::patch`](`crate::diff::Differ::patch`)
//! or [`adopt`](`crate::adopt::adopt`), after which it additionally owns the host handle of the host node it describes.
//! That handle moves into the next generation's node whenever the two are [the same](`same_node`), and is dropped otherwise.

use core::fmt::{self, Debug, Formatter};
use std::{collections::BTreeMap, rc::Rc};

/// One entry of a children sequence.
#[derive(Debug, Clone)]
pub enum Node<E> {
	Element(Element<E>),
	Text(Text<E>),
	/// An absent child. Never materialized and invisible to the list-diff.
	Hole,
	/// A host node of a kind this model doesn't describe (comments, processing instructions…), found during adoption.
	///
	/// The differ leaves these where they are.
	Opaque(E),
}

impl<E> Node<E> {
	#[must_use]
	pub fn is_hole(&self) -> bool {
		matches!(self, Node::Hole)
	}

	/// The host node this [`Node`] is bound to, if it was materialized or adopted.
	#[must_use]
	pub fn host(&self) -> Option<&E> {
		match self {
			Node::Element(element) => element.host.as_ref(),
			Node::Text(text) => text.host.as_ref(),
			Node::Hole => None,
			Node::Opaque(host) => Some(host),
		}
	}

	#[must_use]
	pub fn key(&self) -> Option<&Key> {
		match self {
			Node::Element(element) => element.key.as_ref(),
			Node::Text(_) | Node::Hole | Node::Opaque(_) => None,
		}
	}

	#[must_use]
	pub fn as_element(&self) -> Option<&Element<E>> {
		match self {
			Node::Element(element) => Some(element),
			_ => None,
		}
	}

	#[must_use]
	pub fn as_text(&self) -> Option<&Text<E>> {
		match self {
			Node::Text(text) => Some(text),
			_ => None,
		}
	}

	pub(crate) fn is_modelled(&self) -> bool {
		matches!(self, Node::Element(_) | Node::Text(_))
	}
}

/// Whether `a` and `b` describe the same logical host node, so that `a`'s host node can be patched into `b`.
///
/// Elements match if their keys (including both being absent), selectors and explicit namespaces are equal.
/// Any two text nodes match. [`Node::Hole`] and [`Node::Opaque`] never match anything.
#[must_use]
pub fn same_node<E>(a: &Node<E>, b: &Node<E>) -> bool {
	match (a, b) {
		(Node::Element(a), Node::Element(b)) => a.key == b.key && a.selector == b.selector && a.namespace == b.namespace,
		(Node::Text(_), Node::Text(_)) => true,
		_ => false,
	}
}

#[derive(Debug, Clone)]
pub struct Element<E> {
	pub(crate) selector: String,
	pub(crate) name: String,
	pub(crate) namespace: Option<Namespace>,
	pub(crate) key: Option<Key>,
	pub(crate) classes: Classes,
	pub(crate) attributes: Attributes,
	pub(crate) content: Content<E>,
	pub(crate) host: Option<E>,
}

impl<E> Element<E> {
	/// The full selector this element was built from, for example `div#main.wide`. Part of the element's identity.
	#[must_use]
	pub fn selector(&self) -> &str {
		&self.selector
	}

	/// The base tag name, for example `div`.
	#[must_use]
	pub fn name(&self) -> &str {
		&self.name
	}

	/// The explicitly requested namespace, if any. Otherwise, the namespace is inherited while patching.
	#[must_use]
	pub fn namespace(&self) -> Option<&Namespace> {
		self.namespace.as_ref()
	}

	#[must_use]
	pub fn key(&self) -> Option<&Key> {
		self.key.as_ref()
	}

	#[must_use]
	pub fn classes(&self) -> &Classes {
		&self.classes
	}

	#[must_use]
	pub fn attributes(&self) -> &Attributes {
		&self.attributes
	}

	#[must_use]
	pub fn content(&self) -> &Content<E> {
		&self.content
	}

	/// The element's children, or an empty slice if it has inline text instead.
	#[must_use]
	pub fn children(&self) -> &[Node<E>] {
		match &self.content {
			Content::Children(children) => children,
			Content::Text(_) => &[],
		}
	}

	#[must_use]
	pub fn host(&self) -> Option<&E> {
		self.host.as_ref()
	}
}

#[derive(Debug, Clone)]
pub struct Text<E> {
	pub(crate) text: String,
	pub(crate) host: Option<E>,
}

impl<E> Text<E> {
	#[must_use]
	pub fn text(&self) -> &str {
		&self.text
	}

	#[must_use]
	pub fn host(&self) -> Option<&E> {
		self.host.as_ref()
	}
}

/// An element's content. Children and inline text are mutually exclusive.
#[derive(Debug, Clone)]
pub enum Content<E> {
	Children(Vec<Node<E>>),
	Text(String),
}

impl<E> Default for Content<E> {
	fn default() -> Self {
		Content::Children(Vec::new())
	}
}

/// A stable identity token for an element among its siblings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
	Str(Rc<str>),
	Int(i64),
}

impl From<&str> for Key {
	fn from(key: &str) -> Self {
		Key::Str(key.into())
	}
}

impl From<String> for Key {
	fn from(key: String) -> Self {
		Key::Str(key.into())
	}
}

macro_rules! int_keys {
	($($int:ty),*$(,)?) => {$(
		impl From<$int> for Key {
			fn from(key: $int) -> Self {
				#[allow(clippy::cast_possible_wrap)]
				Key::Int(key as i64)
			}
		}
	)*};
}
int_keys!(i8, i16, i32, i64, u8, u16, u32, usize);

impl fmt::Display for Key {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Key::Str(key) => f.write_str(key),
			Key::Int(key) => write!(f, "{}", key),
		}
	}
}

pub const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Namespace {
	Html,
	Svg,
	Other(String),
}

impl Namespace {
	#[must_use]
	pub fn from_uri(uri: &str) -> Self {
		match uri {
			HTML_NAMESPACE => Namespace::Html,
			SVG_NAMESPACE => Namespace::Svg,
			other => Namespace::Other(other.to_owned()),
		}
	}

	#[must_use]
	pub fn uri(&self) -> &str {
		match self {
			Namespace::Html => HTML_NAMESPACE,
			Namespace::Svg => SVG_NAMESPACE,
			Namespace::Other(uri) => uri,
		}
	}
}

impl Default for Namespace {
	fn default() -> Self {
		Namespace::Html
	}
}

pub type ClassMap = BTreeMap<String, bool>;

/// A shared class membership map.
///
/// Cloning a [`Classes`] shares it. When the old and new element of a patch hold the same shared map,
/// class diffing is skipped entirely, even if the map would disagree with the host element.
#[derive(Clone, Default, PartialEq)]
pub struct Classes(Rc<ClassMap>);

impl Classes {
	#[must_use]
	pub fn new(map: ClassMap) -> Self {
		Self(Rc::new(map))
	}

	#[must_use]
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}

	/// Whether `name` is switched on.
	#[must_use]
	pub fn contains(&self, name: &str) -> bool {
		self.0.get(name).copied().unwrap_or(false)
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
		self.0.iter().map(|(name, &on)| (name.as_str(), on))
	}

	/// Names of the classes that are switched on, in order.
	pub fn enabled(&self) -> impl Iterator<Item = &str> {
		self.iter().filter(|&(_, on)| on).map(|(name, _)| name)
	}

	pub(crate) fn map(&self) -> &ClassMap {
		&self.0
	}
}

impl From<ClassMap> for Classes {
	fn from(map: ClassMap) -> Self {
		Self::new(map)
	}
}

impl<S: Into<String>> core::iter::FromIterator<(S, bool)> for Classes {
	fn from_iter<I: IntoIterator<Item = (S, bool)>>(iter: I) -> Self {
		Self::new(iter.into_iter().map(|(name, on)| (name.into(), on)).collect())
	}
}

impl Debug for Classes {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_map().entries(self.0.iter()).finish()
	}
}

pub type Attributes = BTreeMap<String, AttributeValue>;

/// An attribute value. Structured values are rendered by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
	Text(String),
	/// `true` is rendered as a present but empty attribute, `false` as an absent one.
	Bool(bool),
	/// Rendered as `name: value;` declarations.
	Style(BTreeMap<String, String>),
}

impl AttributeValue {
	/// The attribute's string form, or [`None`] if the attribute should be absent.
	#[must_use]
	pub fn render(&self) -> Option<String> {
		match self {
			AttributeValue::Text(text) => Some(text.clone()),
			AttributeValue::Bool(true) => Some(String::new()),
			AttributeValue::Bool(false) => None,
			AttributeValue::Style(declarations) => Some(
				declarations
					.iter()
					.map(|(name, value)| format!("{}: {};", name, value))
					.collect::<Vec<_>>()
					.join(" "),
			),
		}
	}
}

impl From<&str> for AttributeValue {
	fn from(text: &str) -> Self {
		AttributeValue::Text(text.to_owned())
	}
}

impl From<String> for AttributeValue {
	fn from(text: String) -> Self {
		AttributeValue::Text(text)
	}
}

impl From<bool> for AttributeValue {
	fn from(present: bool) -> Self {
		AttributeValue::Bool(present)
	}
}

impl From<BTreeMap<String, String>> for AttributeValue {
	fn from(declarations: BTreeMap<String, String>) -> Self {
		AttributeValue::Style(declarations)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn element(selector: &str, key: Option<Key>, namespace: Option<Namespace>) -> Node<()> {
		Node::Element(Element {
			selector: selector.to_owned(),
			name: selector.to_owned(),
			namespace,
			key,
			classes: Classes::default(),
			attributes: Attributes::new(),
			content: Content::default(),
			host: None,
		})
	}

	#[test]
	fn identity_needs_key_and_selector() {
		assert!(same_node(&element("div", None, None), &element("div", None, None)));
		assert!(same_node(&element("div", Some(1.into()), None), &element("div", Some(1.into()), None)));
		assert!(!same_node(&element("div", Some(1.into()), None), &element("div", None, None)));
		assert!(!same_node(&element("div", Some(1.into()), None), &element("div", Some("1".into()), None)));
		assert!(!same_node(&element("div", None, None), &element("span", None, None)));
		assert!(!same_node(&element("div", None, None), &element("div", None, Some(Namespace::Svg))));
	}

	#[test]
	fn holes_match_nothing() {
		let text = Node::<()>::Text(Text { text: "a".to_owned(), host: None });
		assert!(same_node(&text, &Node::Text(Text { text: "b".to_owned(), host: None })));
		assert!(!same_node(&Node::<()>::Hole, &Node::Hole));
		assert!(!same_node(&text, &Node::Hole));
		assert!(!same_node(&Node::Opaque(()), &Node::Opaque(())));
	}

	#[test]
	fn attribute_rendering() {
		assert_eq!(AttributeValue::Bool(true).render().as_deref(), Some(""));
		assert_eq!(AttributeValue::Bool(false).render(), None);
		let style: BTreeMap<_, _> = vec![("opacity".to_owned(), "0.5".to_owned()), ("color".to_owned(), "red".to_owned())].into_iter().collect();
		assert_eq!(AttributeValue::Style(style).render().as_deref(), Some("color: red; opacity: 0.5;"));
	}

	#[test]
	fn shared_classes() {
		let classes: Classes = vec![("a", true), ("b", false)].into_iter().collect();
		let shared = classes.clone();
		assert!(classes.ptr_eq(&shared));
		assert!(!classes.ptr_eq(&vec![("a", true), ("b", false)].into_iter().collect()));
		assert!(classes.contains("a"));
		assert!(!classes.contains("b"));
		assert_eq!(classes.enabled().collect::<Vec<_>>(), vec!["a"]);
	}
}
