use crate::node::{AttributeValue, Namespace};
use core::fmt::Debug;

/// What kind of host node a handle refers to, as far as adoption is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
	Element,
	Text,
	/// Comments, processing instructions, document fragments…
	Other,
}

/// The live host tree the [`Differ`](`crate::diff::Differ`) patches.
///
/// Implemented by [`WebDocument`](`crate::web::WebDocument`) for browsers
/// and by [`MemoryDocument`](`crate::memory::MemoryDocument`) for tests and non-browser hosts.
///
/// Mutations are infallible at this boundary. Implementations that can fail should log and skip the failed operation.
///
/// # Correct use
///
/// Handles passed in must have been produced by the same document and not have been removed through [`Document::remove_child`] since.
/// Implementations may panic otherwise.
pub trait Document {
	type Handle: Clone + PartialEq + Debug;

	fn create_element(&mut self, name: &str, namespace: &Namespace) -> Self::Handle;
	fn create_text_node(&mut self, text: &str) -> Self::Handle;

	/// Sets `name` on `element`. An [`AttributeValue`] that renders as absent removes the attribute instead.
	fn set_attribute(&mut self, element: &Self::Handle, name: &str, value: &AttributeValue);
	fn remove_attribute(&mut self, element: &Self::Handle, name: &str);

	fn add_class(&mut self, element: &Self::Handle, name: &str);
	fn remove_class(&mut self, element: &Self::Handle, name: &str);

	/// Replaces the text data of a text node, or all children of an element.
	fn set_text_content(&mut self, node: &Self::Handle, text: &str);

	/// Inserts `child` into `parent` before `reference`, or appends it if `reference` is [`None`].
	///
	/// `child` is moved if it is already attached somewhere.
	fn insert_before(&mut self, parent: &Self::Handle, child: &Self::Handle, reference: Option<&Self::Handle>);
	fn remove_child(&mut self, parent: &Self::Handle, child: &Self::Handle);

	fn parent_node(&self, node: &Self::Handle) -> Option<Self::Handle>;
	fn next_sibling(&self, node: &Self::Handle) -> Option<Self::Handle>;

	// Read-back for adoption.
	fn node_kind(&self, node: &Self::Handle) -> NodeKind;
	fn tag_name(&self, element: &Self::Handle) -> String;
	fn namespace(&self, element: &Self::Handle) -> Namespace;
	/// All attributes of `element` as name-value pairs, in host order.
	fn attributes(&self, element: &Self::Handle) -> Vec<(String, String)>;
	fn class_list(&self, element: &Self::Handle) -> Vec<String>;
	fn child_nodes(&self, node: &Self::Handle) -> Vec<Self::Handle>;
	fn text_content(&self, node: &Self::Handle) -> String;
}
