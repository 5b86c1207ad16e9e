//! An in-memory [`Document`], for tests and hosts without a DOM.
//!
//! Handles are generation-checked arena indices: Once a node is removed through [`Document::remove_child`],
//! its slot (and those of its descendants) may be reused, and the old handle panics on use instead of aliasing the new node.
//! Every mutation is recorded, so tests can assert on exactly what a patch did.

use crate::{
	document::{Document, NodeKind},
	loggable,
	node::{AttributeValue, Namespace},
};
use core::fmt::{self, Display, Formatter};
use std::collections::BTreeMap;
use tracing::{error, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoryHandle {
	index: u32,
	generation: u32,
}

impl Display for MemoryHandle {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "#{}v{}", self.index, self.generation)
	}
}

/// A recorded host mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
	CreateElement { node: MemoryHandle, name: String, namespace: Namespace },
	CreateText { node: MemoryHandle, text: String },
	CreateComment { node: MemoryHandle },
	SetAttribute { node: MemoryHandle, name: String, value: AttributeValue },
	RemoveAttribute { node: MemoryHandle, name: String },
	AddClass { node: MemoryHandle, name: String },
	RemoveClass { node: MemoryHandle, name: String },
	SetTextContent { node: MemoryHandle, text: String },
	InsertBefore { parent: MemoryHandle, child: MemoryHandle, reference: Option<MemoryHandle> },
	RemoveChild { parent: MemoryHandle, child: MemoryHandle },
}

#[derive(Debug, Clone)]
enum Data {
	Element {
		name: String,
		namespace: Namespace,
		attributes: BTreeMap<String, String>,
		classes: Vec<String>,
	},
	Text(String),
	Comment(String),
}

#[derive(Debug)]
struct Entry {
	data: Data,
	parent: Option<MemoryHandle>,
	children: Vec<MemoryHandle>,
}

#[derive(Debug, Default)]
struct Slot {
	generation: u32,
	entry: Option<Entry>,
}

#[derive(Debug, Default)]
pub struct MemoryDocument {
	slots: Vec<Slot>,
	free: Vec<u32>,
	mutations: Vec<Mutation>,
}

impl MemoryDocument {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a comment node, which the differ treats as opaque.
	pub fn create_comment(&mut self, data: &str) -> MemoryHandle {
		let node = self.allocate(Data::Comment(data.to_owned()));
		self.record(Mutation::CreateComment { node });
		node
	}

	/// Shorthand for [`Document::insert_before`] without reference.
	pub fn append_child(&mut self, parent: &MemoryHandle, child: &MemoryHandle) {
		self.insert_before(parent, child, None)
	}

	/// Whether `node` still refers to a node that hasn't been removed.
	#[must_use]
	pub fn is_live(&self, node: &MemoryHandle) -> bool {
		self.slots.get(node.index as usize).map_or(false, |slot| slot.generation == node.generation && slot.entry.is_some())
	}

	/// The mutations recorded so far.
	#[must_use]
	pub fn mutations(&self) -> &[Mutation] {
		&self.mutations
	}

	/// Returns and forgets the mutations recorded so far.
	pub fn take_mutations(&mut self) -> Vec<Mutation> {
		std::mem::take(&mut self.mutations)
	}

	/// The child nodes of `node`, including text and comments.
	#[must_use]
	pub fn children(&self, node: &MemoryHandle) -> &[MemoryHandle] {
		&self.entry(node).children
	}

	/// The element children of `node`.
	#[must_use]
	pub fn element_children(&self, node: &MemoryHandle) -> Vec<MemoryHandle> {
		self.children(node).iter().copied().filter(|child| matches!(self.entry(child).data, Data::Element { .. })).collect()
	}

	#[must_use]
	pub fn attribute(&self, element: &MemoryHandle, name: &str) -> Option<&str> {
		match &self.entry(element).data {
			Data::Element { attributes, .. } => attributes.get(name).map(String::as_str),
			Data::Text(_) | Data::Comment(_) => None,
		}
	}

	#[must_use]
	pub fn has_class(&self, element: &MemoryHandle, name: &str) -> bool {
		match &self.entry(element).data {
			Data::Element { classes, .. } => classes.iter().any(|class| class == name),
			Data::Text(_) | Data::Comment(_) => false,
		}
	}

	/// Serializes the children of `node` as markup. Not escaped, for assertions only.
	#[must_use]
	pub fn inner_html(&self, node: &MemoryHandle) -> String {
		let mut html = String::new();
		for child in self.children(node) {
			self.write_html(child, &mut html)
		}
		html
	}

	/// Serializes `node` as markup. Not escaped, for assertions only.
	#[must_use]
	pub fn outer_html(&self, node: &MemoryHandle) -> String {
		let mut html = String::new();
		self.write_html(node, &mut html);
		html
	}

	fn write_html(&self, node: &MemoryHandle, html: &mut String) {
		let entry = self.entry(node);
		match &entry.data {
			Data::Element { name, attributes, classes, .. } => {
				html.push('<');
				html.push_str(name);
				for (attribute, value) in attributes {
					html.push_str(&format!(" {}=\"{}\"", attribute, value));
				}
				if !classes.is_empty() {
					html.push_str(&format!(" class=\"{}\"", classes.join(" ")));
				}
				html.push('>');
				for child in &entry.children {
					self.write_html(child, html)
				}
				html.push_str(&format!("</{}>", name));
			}
			Data::Text(text) => html.push_str(text),
			Data::Comment(comment) => html.push_str(&format!("<!--{}-->", comment)),
		}
	}

	fn record(&mut self, mutation: Mutation) {
		trace!(?mutation, "Recording mutation.");
		self.mutations.push(mutation)
	}

	fn allocate(&mut self, data: Data) -> MemoryHandle {
		let entry = Entry { data, parent: None, children: Vec::new() };
		match self.free.pop() {
			Some(index) => {
				let slot = &mut self.slots[index as usize];
				slot.entry = Some(entry);
				MemoryHandle { index, generation: slot.generation }
			}
			None => {
				#[allow(clippy::cast_possible_truncation)]
				let index = self.slots.len() as u32;
				self.slots.push(Slot { generation: 0, entry: Some(entry) });
				MemoryHandle { index, generation: 0 }
			}
		}
	}

	/// Frees `node` and its descendants. Their handles go stale.
	fn release(&mut self, node: MemoryHandle) {
		let mut pending = vec![node];
		while let Some(node) = pending.pop() {
			let slot = &mut self.slots[node.index as usize];
			if let Some(entry) = slot.entry.take() {
				slot.generation = slot.generation.wrapping_add(1);
				self.free.push(node.index);
				pending.extend(entry.children)
			}
		}
	}

	fn entry(&self, node: &MemoryHandle) -> &Entry {
		match self.slots.get(node.index as usize) {
			Some(Slot { generation, entry: Some(entry) }) if *generation == node.generation => entry,
			_ => panic!("Stale or foreign `MemoryHandle` {}", node),
		}
	}

	fn entry_mut(&mut self, node: &MemoryHandle) -> &mut Entry {
		match self.slots.get_mut(node.index as usize) {
			Some(Slot { generation, entry: Some(entry) }) if *generation == node.generation => entry,
			_ => panic!("Stale or foreign `MemoryHandle` {}", node),
		}
	}

	fn detach(&mut self, child: &MemoryHandle) {
		if let Some(parent) = self.entry_mut(child).parent.take() {
			self.entry_mut(&parent).children.retain(|sibling| sibling != child)
		}
	}

	fn element_data(&mut self, element: &MemoryHandle) -> Option<(&mut BTreeMap<String, String>, &mut Vec<String>)> {
		match &mut self.entry_mut(element).data {
			Data::Element { attributes, classes, .. } => Some((attributes, classes)),
			Data::Text(_) | Data::Comment(_) => {
				error!("Expected element but found {}.", element);
				None
			}
		}
	}
}

impl Document for MemoryDocument {
	type Handle = MemoryHandle;

	fn create_element(&mut self, name: &str, namespace: &Namespace) -> MemoryHandle {
		let node = self.allocate(Data::Element {
			name: name.to_owned(),
			namespace: namespace.clone(),
			attributes: BTreeMap::new(),
			classes: Vec::new(),
		});
		self.record(Mutation::CreateElement {
			node,
			name: name.to_owned(),
			namespace: namespace.clone(),
		});
		node
	}

	fn create_text_node(&mut self, text: &str) -> MemoryHandle {
		let node = self.allocate(Data::Text(text.to_owned()));
		self.record(Mutation::CreateText { node, text: text.to_owned() });
		node
	}

	fn set_attribute(&mut self, element: &MemoryHandle, name: &str, value: &AttributeValue) {
		let rendered = value.render();
		if let Some((attributes, _)) = self.element_data(element) {
			match rendered {
				Some(rendered) => attributes.insert(name.to_owned(), rendered),
				None => attributes.remove(name),
			};
			self.record(Mutation::SetAttribute {
				node: *element,
				name: name.to_owned(),
				value: value.clone(),
			})
		}
	}

	fn remove_attribute(&mut self, element: &MemoryHandle, name: &str) {
		if let Some((attributes, _)) = self.element_data(element) {
			attributes.remove(name);
			self.record(Mutation::RemoveAttribute { node: *element, name: name.to_owned() })
		}
	}

	fn add_class(&mut self, element: &MemoryHandle, name: &str) {
		if let Some((_, classes)) = self.element_data(element) {
			if !classes.iter().any(|class| class == name) {
				classes.push(name.to_owned())
			}
			self.record(Mutation::AddClass { node: *element, name: name.to_owned() })
		}
	}

	fn remove_class(&mut self, element: &MemoryHandle, name: &str) {
		if let Some((_, classes)) = self.element_data(element) {
			classes.retain(|class| class != name);
			self.record(Mutation::RemoveClass { node: *element, name: name.to_owned() })
		}
	}

	fn set_text_content(&mut self, node: &MemoryHandle, text: &str) {
		trace!(%node, text = loggable(text), "Setting text content.");
		if let Data::Text(data) | Data::Comment(data) = &mut self.entry_mut(node).data {
			*data = text.to_owned();
		} else {
			let children = std::mem::take(&mut self.entry_mut(node).children);
			for child in children {
				self.release(child)
			}
			if !text.is_empty() {
				let child = self.allocate(Data::Text(text.to_owned()));
				self.entry_mut(&child).parent = Some(*node);
				self.entry_mut(node).children.push(child);
			}
		}
		self.record(Mutation::SetTextContent { node: *node, text: text.to_owned() })
	}

	fn insert_before(&mut self, parent: &MemoryHandle, child: &MemoryHandle, reference: Option<&MemoryHandle>) {
		if parent == child {
			return error!("Tried to insert {} into itself.", child);
		}
		if let Some(reference) = reference {
			if self.entry(reference).parent != Some(*parent) {
				return error!("Reference node {} is not a child of {}. Skipping insertion of {}.", reference, parent, child);
			}
		}

		self.detach(child);
		let siblings = &mut self.entry_mut(parent).children;
		let index = reference.and_then(|reference| siblings.iter().position(|sibling| sibling == reference)).unwrap_or_else(|| siblings.len());
		siblings.insert(index, *child);
		self.entry_mut(child).parent = Some(*parent);
		self.record(Mutation::InsertBefore {
			parent: *parent,
			child: *child,
			reference: reference.copied(),
		})
	}

	fn remove_child(&mut self, parent: &MemoryHandle, child: &MemoryHandle) {
		if self.entry(child).parent != Some(*parent) {
			return error!("{} is not a child of {}. Not removing it.", child, parent);
		}
		self.detach(child);
		self.release(*child);
		self.record(Mutation::RemoveChild { parent: *parent, child: *child })
	}

	fn parent_node(&self, node: &MemoryHandle) -> Option<MemoryHandle> {
		self.entry(node).parent
	}

	fn next_sibling(&self, node: &MemoryHandle) -> Option<MemoryHandle> {
		let parent = self.entry(node).parent?;
		let siblings = &self.entry(&parent).children;
		let index = siblings.iter().position(|sibling| sibling == node)?;
		siblings.get(index + 1).copied()
	}

	fn node_kind(&self, node: &MemoryHandle) -> NodeKind {
		match self.entry(node).data {
			Data::Element { .. } => NodeKind::Element,
			Data::Text(_) => NodeKind::Text,
			Data::Comment(_) => NodeKind::Other,
		}
	}

	fn tag_name(&self, element: &MemoryHandle) -> String {
		match &self.entry(element).data {
			Data::Element { name, .. } => name.clone(),
			Data::Text(_) => "#text".to_owned(),
			Data::Comment(_) => "#comment".to_owned(),
		}
	}

	fn namespace(&self, element: &MemoryHandle) -> Namespace {
		match &self.entry(element).data {
			Data::Element { namespace, .. } => namespace.clone(),
			Data::Text(_) | Data::Comment(_) => Namespace::Html,
		}
	}

	fn attributes(&self, element: &MemoryHandle) -> Vec<(String, String)> {
		match &self.entry(element).data {
			Data::Element { attributes, classes, .. } => {
				let mut pairs: Vec<_> = attributes.iter().map(|(name, value)| (name.clone(), value.clone())).collect();
				if !classes.is_empty() {
					pairs.push(("class".to_owned(), classes.join(" ")));
				}
				pairs
			}
			Data::Text(_) | Data::Comment(_) => Vec::new(),
		}
	}

	fn class_list(&self, element: &MemoryHandle) -> Vec<String> {
		match &self.entry(element).data {
			Data::Element { classes, .. } => classes.clone(),
			Data::Text(_) | Data::Comment(_) => Vec::new(),
		}
	}

	fn child_nodes(&self, node: &MemoryHandle) -> Vec<MemoryHandle> {
		self.children(node).to_vec()
	}

	fn text_content(&self, node: &MemoryHandle) -> String {
		let entry = self.entry(node);
		match &entry.data {
			Data::Text(text) | Data::Comment(text) => text.clone(),
			Data::Element { .. } => entry
				.children
				.iter()
				.filter(|child| !matches!(self.entry(child).data, Data::Comment(_)))
				.map(|child| self.text_content(child))
				.collect(),
		}
	}
}
