use crate::{
	adopt,
	document::{Document, NodeKind},
	key_maps::KeyMapPool,
	loggable,
	node::{same_node, Attributes, Classes, Content, Element, Namespace, Node, Text},
};
use core::mem;
use std::collections::VecDeque;
use tracing::{error, instrument, trace, trace_span, warn};

/// How many levels of children [`Differ`] and [`adopt`](`crate::adopt::adopt`) descend into by default.
pub const DEFAULT_DEPTH_LIMIT: usize = 256;

/// What a [`Differ::patch`] call starts from.
#[derive(Debug)]
pub enum Previous<E> {
	/// The result of the previous patch (or of [`adopt`](`crate::adopt::adopt`)).
	Node(Node<E>),
	/// A host node that was never patched before.
	///
	/// Only its tag, id and classes are adopted. Its existing children are left alone and new children are appended after them.
	Element(E),
}

impl<E> From<Node<E>> for Previous<E> {
	fn from(node: Node<E>) -> Self {
		Previous::Node(node)
	}
}

/// Patches a [`Document`] from one generation of [`Node`] trees to the next.
///
/// # Correct use
///
/// Always pass the [`Node`] returned by the previous [`Differ::patch`] call as the next `old` value,
/// and don't modify the patched host subtree other than through this [`Differ`] in between.
///
/// Unmodelled host nodes (see [`Node::Opaque`]) and children that were present before a [`Previous::Element`] adoption are an exception to this:
/// The list-diff leaves them in place. Replacing an element's children with inline text still clears them.
///
/// # Depth limit
///
/// Creating, patching and adopting descend at most [`Differ::depth_limit`] levels of children.
/// Deeper content is logged as an error and skipped, rather than overflowing the stack.
#[derive(Debug)]
pub struct Differ<D: Document> {
	document: D,
	verify_host: bool,
	depth_limit: usize,
	key_maps: KeyMapPool,
}

enum Step {
	Heads,
	Tails,
	HeadToTail,
	TailToHead,
	Lookup,
}

impl<D: Document> Differ<D> {
	#[must_use]
	pub fn new(document: D) -> Self {
		Self {
			document,
			verify_host: cfg!(debug_assertions),
			depth_limit: DEFAULT_DEPTH_LIMIT,
			key_maps: KeyMapPool::new(),
		}
	}

	/// Whether to read back text data and tag names before patching them, and log discrepancies.
	///
	/// Defaults to on with `debug_assertions` and off otherwise.
	#[must_use]
	pub fn verify_host(mut self, enabled: bool) -> Self {
		self.verify_host = enabled;
		self
	}

	/// How many levels of children to descend into before giving up on a subtree. Defaults to [`DEFAULT_DEPTH_LIMIT`].
	///
	/// Children below the limit are neither created nor updated. When adopting, they are kept as [`Node::Opaque`].
	#[must_use]
	pub fn depth_limit(mut self, depth_limit: usize) -> Self {
		self.depth_limit = depth_limit;
		self
	}

	#[must_use]
	pub fn document(&self) -> &D {
		&self.document
	}

	pub fn document_mut(&mut self) -> &mut D {
		&mut self.document
	}

	#[must_use]
	pub fn into_document(self) -> D {
		self.document
	}

	/// See [`adopt::adopt`]. Uses this [`Differ`]'s depth limit.
	#[must_use]
	pub fn adopt(&self, node: D::Handle) -> Node<D::Handle> {
		adopt::adopt_to_depth(&self.document, node, self.depth_limit)
	}

	/// Materializes `node` without inserting it anywhere.
	pub fn create(&mut self, node: Node<D::Handle>) -> Node<D::Handle> {
		self.create_in(node, &Namespace::Html, self.depth_limit)
	}

	/// Patches the host subtree described by `old` so that it matches `new`, and returns `new` bound to the host.
	///
	/// If `old` and `new` aren't [the same node](`same_node`), `new` is materialized in place of `old`.
	#[instrument(skip_all)]
	pub fn patch(&mut self, old: impl Into<Previous<D::Handle>>, new: Node<D::Handle>) -> Node<D::Handle> {
		let old = match old.into() {
			Previous::Node(old) => old,
			Previous::Element(element) => {
				trace!(?element, "Adopting root.");
				adopt::adopt_root(&self.document, element)
			}
		};

		let host = match old.host() {
			Some(host) => host.clone(),
			None => {
				warn!("The previous node was never mounted. Creating a detached tree instead.");
				return self.create(new);
			}
		};
		let parent = self.document.parent_node(&host);
		let context = self.context_of(parent.as_ref());

		if same_node(&old, &new) {
			return self.patch_same(old, new, &context, self.depth_limit);
		}

		let span = trace_span!("Replacing root", ?host);
		let _enter = span.enter();
		let new = self.create_in(new, &context, self.depth_limit);
		match parent {
			Some(parent) => {
				if let Some(new_host) = new.host() {
					self.document.insert_before(&parent, new_host, Some(&host));
				}
				self.document.remove_child(&parent, &host);
			}
			None => trace!("The previous root is detached. Leaving its replacement detached too."),
		}
		new
	}

	/// The namespace children of `parent` inherit.
	fn context_of(&self, parent: Option<&D::Handle>) -> Namespace {
		match parent {
			Some(parent) if self.document.node_kind(parent) == NodeKind::Element => match self.document.namespace(parent) {
				Namespace::Svg if self.document.tag_name(parent) == "foreignObject" => Namespace::Html,
				namespace => namespace,
			},
			_ => Namespace::Html,
		}
	}

	/// `depth` is the number of child levels below `node` that may still be created.
	fn create_in(&mut self, node: Node<D::Handle>, context: &Namespace, depth: usize) -> Node<D::Handle> {
		match node {
			Node::Element(element) => Node::Element(self.create_element(element, context, depth)),
			Node::Text(mut text) => {
				let span = trace_span!("Creating text node", text = loggable(&text.text));
				let _enter = span.enter();
				text.host = Some(self.document.create_text_node(&text.text));
				Node::Text(text)
			}
			node @ Node::Hole | node @ Node::Opaque(_) => node,
		}
	}

	fn create_element(&mut self, mut element: Element<D::Handle>, context: &Namespace, depth: usize) -> Element<D::Handle> {
		let namespace = namespace_of(&element, context);
		let span = trace_span!("Creating element", selector = %element.selector, ?namespace);
		let _enter = span.enter();

		let host = self.document.create_element(&element.name, &namespace);
		for (name, value) in &element.attributes {
			self.document.set_attribute(&host, name, value)
		}
		for class in element.classes.enabled() {
			self.document.add_class(&host, class)
		}

		let child_context = child_context(&element, namespace);
		element.content = match mem::take(&mut element.content) {
			Content::Text(text) => {
				if !text.is_empty() {
					self.document.set_text_content(&host, &text)
				}
				Content::Text(text)
			}
			Content::Children(children) => Content::Children(self.create_children(&host, children, &child_context, None, depth)),
		};
		element.host = Some(host);
		element
	}

	fn create_children(
		&mut self,
		parent: &D::Handle,
		children: impl IntoIterator<Item = Node<D::Handle>>,
		context: &Namespace,
		reference: Option<&D::Handle>,
		depth: usize,
	) -> Vec<Node<D::Handle>> {
		if depth == 0 {
			error!("Depth limit reached. Not creating children.");
			return Vec::new();
		}

		children
			.into_iter()
			.filter(|child| !child.is_hole())
			.map(|child| {
				let child = self.create_in(child, context, depth - 1);
				if let Some(host) = child.host() {
					self.document.insert_before(parent, host, reference)
				}
				child
			})
			.collect()
	}

	/// Patches `old` into `new` in place. The two must be [the same node](`same_node`).
	fn patch_same(&mut self, old: Node<D::Handle>, new: Node<D::Handle>, context: &Namespace, depth: usize) -> Node<D::Handle> {
		match (old, new) {
			(Node::Element(old), Node::Element(new)) => Node::Element(self.patch_element(old, new, context, depth)),
			(Node::Text(old), Node::Text(new)) => Node::Text(self.patch_text(old, new)),
			_ => unreachable!("vdom-patch bug: `patch_same` called with nodes that aren't the same"),
		}
	}

	fn patch_text(&mut self, old: Text<D::Handle>, mut new: Text<D::Handle>) -> Text<D::Handle> {
		let span = trace_span!("Diffing text node", old = loggable(&old.text), new = loggable(&new.text));
		let _enter = span.enter();
		let host = mounted(old.host);

		let mut drifted = false;
		if self.verify_host {
			let found = self.document.text_content(&host);
			if found != old.text {
				warn!("Unexpected text data: Expected {:?} but found {:?}. Overwriting.", loggable(&old.text), loggable(&found));
				drifted = true;
			}
		}
		if drifted || old.text != new.text {
			self.document.set_text_content(&host, &new.text)
		}

		new.host = Some(host);
		new
	}

	fn patch_element(&mut self, old: Element<D::Handle>, mut new: Element<D::Handle>, context: &Namespace, depth: usize) -> Element<D::Handle> {
		let Element {
			classes: old_classes,
			attributes: old_attributes,
			content: old_content,
			host,
			..
		} = old;
		let host = mounted(host);
		let span = trace_span!("Diffing element", selector = %new.selector, ?host);
		let _enter = span.enter();

		if self.verify_host {
			let found = self.document.tag_name(&host);
			if !found.eq_ignore_ascii_case(&new.name) {
				error!("Expected to update <{}> but found <{}>. Patching it anyway.", new.name, found);
			}
		}

		self.update_classes(&host, &old_classes, &new.classes);
		self.update_attributes(&host, &old_attributes, &new.attributes);

		let child_context = child_context(&new, namespace_of(&new, context));
		new.content = match (old_content, mem::take(&mut new.content)) {
			(Content::Children(old_children), Content::Children(new_children)) => Content::Children(self.diff_children(&host, old_children, new_children, &child_context, depth)),
			(Content::Text(old_text), Content::Text(new_text)) => {
				if old_text != new_text {
					self.document.set_text_content(&host, &new_text)
				}
				Content::Text(new_text)
			}
			(Content::Children(old_children), Content::Text(new_text)) => {
				trace!("Replacing children with text.");
				if !new_text.is_empty() || old_children.iter().any(Node::is_modelled) {
					self.document.set_text_content(&host, &new_text)
				}
				Content::Text(new_text)
			}
			(Content::Text(old_text), Content::Children(new_children)) => {
				trace!("Replacing text with children.");
				if !old_text.is_empty() {
					self.document.set_text_content(&host, "")
				}
				Content::Children(self.create_children(&host, new_children, &child_context, None, depth))
			}
		};

		new.host = Some(host);
		new
	}

	fn update_classes(&mut self, host: &D::Handle, old: &Classes, new: &Classes) {
		if old.ptr_eq(new) {
			return trace!("Class map is shared. Skipping class diff.");
		}
		for name in old.enabled() {
			if !new.contains(name) {
				self.document.remove_class(host, name)
			}
		}
		for name in new.enabled() {
			if !old.contains(name) {
				self.document.add_class(host, name)
			}
		}
	}

	fn update_attributes(&mut self, host: &D::Handle, old: &Attributes, new: &Attributes) {
		for (name, value) in new {
			if old.get(name) != Some(value) {
				trace!(name = %name, "Setting attribute.");
				self.document.set_attribute(host, name, value)
			}
		}
		for name in old.keys() {
			if !new.contains_key(name) {
				trace!(name = %name, "Removing attribute.");
				self.document.remove_attribute(host, name)
			}
		}
	}

	/// The keyed list-diff.
	///
	/// Holes are dropped and opaque nodes are left in place up front.
	/// Then, unprocessed ranges are narrowed from both ends by matching heads and tails (straight and crosswise),
	/// falling back to a lazily built key map and finally creation.
	/// The first matching check wins.
	#[allow(clippy::too_many_lines)]
	fn diff_children(&mut self, parent: &D::Handle, old: Vec<Node<D::Handle>>, new: Vec<Node<D::Handle>>, context: &Namespace, depth: usize) -> Vec<Node<D::Handle>> {
		if depth == 0 {
			// The host keeps its current children, so the old description stays accurate.
			error!("Depth limit reached. Not updating children.");
			return old;
		}
		let child_depth = depth - 1;

		// `None` marks slots consumed through the key map.
		let mut old: Vec<Option<Node<D::Handle>>> = old.into_iter().filter(Node::is_modelled).map(Some).collect();
		let mut new: VecDeque<Node<D::Handle>> = new.into_iter().filter(|node| !node.is_hole()).collect();

		let span = trace_span!("Diffing children", old_len = old.len(), new_len = new.len());
		let _enter = span.enter();

		let mut head = Vec::with_capacity(new.len());
		let mut tail = Vec::new(); // Reversed.
		let mut key_map = None;
		let (mut old_start, mut old_end) = (0, old.len());

		while old_start < old_end {
			let (old_first, old_last) = match (&old[old_start], &old[old_end - 1]) {
				(None, _) => {
					old_start += 1;
					continue;
				}
				(_, None) => {
					old_end -= 1;
					continue;
				}
				(Some(old_first), Some(old_last)) => (old_first, old_last),
			};
			let (new_first, new_last) = match (new.front(), new.back()) {
				(Some(new_first), Some(new_last)) => (new_first, new_last),
				_ => break,
			};

			let step = if same_node(old_first, new_first) {
				Step::Heads
			} else if same_node(old_last, new_last) {
				Step::Tails
			} else if same_node(old_first, new_last) {
				Step::HeadToTail
			} else if same_node(old_last, new_first) {
				Step::TailToHead
			} else {
				Step::Lookup
			};

			match step {
				Step::Heads => {
					if let (Some(old_node), Some(new_node)) = (old[old_start].take(), new.pop_front()) {
						head.push(self.patch_same(old_node, new_node, context, child_depth));
					}
					old_start += 1;
				}

				Step::Tails => {
					if let (Some(old_node), Some(new_node)) = (old[old_end - 1].take(), new.pop_back()) {
						tail.push(self.patch_same(old_node, new_node, context, child_depth));
					}
					old_end -= 1;
				}

				Step::HeadToTail => {
					let reference = old_last.host().and_then(|host| self.document.next_sibling(host));
					if let (Some(old_node), Some(new_node)) = (old[old_start].take(), new.pop_back()) {
						trace!("Moving node towards the end.");
						let node = self.patch_same(old_node, new_node, context, child_depth);
						if let Some(host) = node.host() {
							self.document.insert_before(parent, host, reference.as_ref())
						}
						tail.push(node);
					}
					old_start += 1;
				}

				Step::TailToHead => {
					let reference = old_first.host().cloned();
					if let (Some(old_node), Some(new_node)) = (old[old_end - 1].take(), new.pop_front()) {
						trace!("Moving node towards the start.");
						let node = self.patch_same(old_node, new_node, context, child_depth);
						if let Some(host) = node.host() {
							self.document.insert_before(parent, host, reference.as_ref())
						}
						head.push(node);
					}
					old_end -= 1;
				}

				Step::Lookup => {
					let reference = old_first.host().cloned();
					let key_map = key_map.get_or_insert_with(|| {
						let mut key_map = self.key_maps.take();
						for (i, slot) in old.iter().enumerate().take(old_end).skip(old_start) {
							if let Some(key) = slot.as_ref().and_then(Node::key) {
								key_map.insert(key.clone(), i);
							}
						}
						trace!(keys = key_map.len(), "Built key map.");
						key_map
					});
					let index = new_first.key().and_then(|key| key_map.get(key).copied()).filter(|&i| old[i].as_ref().map_or(false, |old_node| same_node(old_node, new_first)));

					if let Some(new_node) = new.pop_front() {
						let node = match index.and_then(|i| old[i].take()) {
							Some(old_node) => {
								trace!(key = ?new_node.key(), "Found node by key.");
								self.patch_same(old_node, new_node, context, child_depth)
							}
							None => self.create_in(new_node, context, child_depth),
						};
						if let Some(host) = node.host() {
							self.document.insert_before(parent, host, reference.as_ref())
						}
						head.push(node);
					}
				}
			}
		}

		if let Some(key_map) = key_map {
			self.key_maps.give_back(key_map)
		}

		if old_start >= old_end {
			let reference = tail.last().and_then(Node::host).cloned();
			let created = self.create_children(parent, new, context, reference.as_ref(), depth);
			head.extend(created);
		} else {
			for slot in &mut old[old_start..old_end] {
				if let Some(node) = slot.take() {
					self.remove(parent, node)
				}
			}
		}

		head.extend(tail.into_iter().rev());
		head
	}

	fn remove(&mut self, parent: &D::Handle, node: Node<D::Handle>) {
		match node {
			Node::Element(Element { host: Some(host), selector, .. }) => {
				let span = trace_span!("Removing element", %selector, ?host);
				let _enter = span.enter();
				self.document.remove_child(parent, &host)
			}
			Node::Text(Text { host: Some(host), text }) => {
				let span = trace_span!("Removing text node", text = loggable(&text), ?host);
				let _enter = span.enter();
				self.document.remove_child(parent, &host)
			}
			Node::Opaque(_) => trace!("Leaving opaque node in place."),
			Node::Element(_) | Node::Text(_) | Node::Hole => (),
		}
	}
}

/// The namespace `element` is created in.
fn namespace_of<E>(element: &Element<E>, context: &Namespace) -> Namespace {
	match &element.namespace {
		Some(namespace) => namespace.clone(),
		None if element.name == "svg" => Namespace::Svg,
		None => context.clone(),
	}
}

/// The namespace `element`'s children inherit.
fn child_context<E>(element: &Element<E>, namespace: Namespace) -> Namespace {
	if element.name == "foreignObject" {
		Namespace::Html
	} else {
		namespace
	}
}

fn mounted<E>(host: Option<E>) -> E {
	host.unwrap_or_else(|| panic!("vdom-patch bug: Tried to patch a node that was never mounted"))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::builder::{h, Props};

	fn element(node: &Node<()>) -> &Element<()> {
		node.as_element().expect("element")
	}

	#[test]
	fn namespace_resolution() {
		let svg = h::<()>("svg.icon", ());
		let circle = h::<()>("circle", ());
		let foreign_object = h::<()>("foreignObject", ());
		let custom = h::<()>("div", Props::new().namespace(Namespace::Other("urn:custom".to_owned())));

		assert_eq!(namespace_of(element(&svg), &Namespace::Html), Namespace::Svg);
		assert_eq!(namespace_of(element(&circle), &Namespace::Svg), Namespace::Svg);
		assert_eq!(namespace_of(element(&circle), &Namespace::Html), Namespace::Html);
		assert_eq!(namespace_of(element(&custom), &Namespace::Svg), Namespace::Other("urn:custom".to_owned()));
		assert_eq!(child_context(element(&foreign_object), Namespace::Svg), Namespace::Html);
		assert_eq!(child_context(element(&circle), Namespace::Svg), Namespace::Svg);
	}
}
