//! A keyed virtual-tree differ.
//!
//! Build [`Node`](`node::Node`) trees with [`h`](`builder::h`), then let a [`Differ`](`diff::Differ`) patch a [`Document`](`document::Document`)
//! from each generation to the next. The host can be a browser DOM ([`web::WebDocument`]) or an in-memory tree ([`memory::MemoryDocument`]).
//!
//! Existing host content can be taken over either shallowly, by passing its root as [`Previous::Element`](`diff::Previous::Element`),
//! or completely, through [`adopt`](`adopt::adopt`).

#![doc(html_root_url = "https://docs.rs/vdom-patch/0.0.1")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod adopt;
pub mod builder;
pub mod diff;
pub mod document;
mod key_maps;
pub mod memory;
pub mod node;
pub mod selector;
pub mod web;

pub use builder::{h, text, Props};
pub use diff::{Differ, Previous};
pub use document::Document;
pub use node::{Key, Namespace, Node};

/// Text content and attribute values only make it into logs with the `dangerous-logging` feature.
pub(crate) fn loggable(value: &str) -> &str {
	if cfg!(feature = "dangerous-logging") {
		value
	} else {
		"[redacted]"
	}
}
