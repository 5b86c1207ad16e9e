//! `tag#id.class` selector sugar.

/// A parsed selector. Borrowed from the selector string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector<'a> {
	pub name: &'a str,
	pub id: Option<&'a str>,
	pub classes: Vec<&'a str>,
}

/// Splits `selector` into base tag, id and classes.
///
/// `#` and `.` segments may appear in any order. Empty segments are ignored, a repeated id replaces the earlier one,
/// and a missing base tag becomes `div`.
#[must_use]
pub fn parse(selector: &str) -> Selector<'_> {
	let name_end = selector.find(|c: char| c == '#' || c == '.').unwrap_or_else(|| selector.len());
	let name = match &selector[..name_end] {
		"" => "div",
		name => name,
	};

	let mut id = None;
	let mut classes = Vec::new();
	let mut rest = &selector[name_end..];
	while let Some(sigil) = rest.chars().next() {
		let segment = &rest[1..];
		let end = segment.find(|c: char| c == '#' || c == '.').unwrap_or_else(|| segment.len());
		let (value, tail) = segment.split_at(end);
		if !value.is_empty() {
			if sigil == '#' {
				id = Some(value)
			} else if !classes.contains(&value) {
				classes.push(value)
			}
		}
		rest = tail;
	}

	Selector { name, id, classes }
}

/// Renders a selector in canonical order: tag, then id, then classes.
#[must_use]
pub fn render<'a>(name: &str, id: Option<&str>, classes: impl IntoIterator<Item = &'a str>) -> String {
	let mut selector = name.to_owned();
	if let Some(id) = id.filter(|id| !id.is_empty()) {
		selector.push('#');
		selector.push_str(id);
	}
	for class in classes {
		if !class.is_empty() {
			selector.push('.');
			selector.push_str(class);
		}
	}
	selector
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn plain_tag() {
		assert_eq!(parse("span"), Selector { name: "span", id: None, classes: vec![] });
	}

	#[test]
	fn id_and_classes() {
		assert_eq!(parse("div#id.a.b"), Selector { name: "div", id: Some("id"), classes: vec!["a", "b"] });
		assert_eq!(parse("i.am.a.class"), Selector { name: "i", id: None, classes: vec!["am", "a", "class"] });
		assert_eq!(parse("g.a#late.b"), Selector { name: "g", id: Some("late"), classes: vec!["a", "b"] });
	}

	#[test]
	fn sparse_selectors() {
		assert_eq!(parse(""), Selector { name: "div", id: None, classes: vec![] });
		assert_eq!(parse("#only"), Selector { name: "div", id: Some("only"), classes: vec![] });
		assert_eq!(parse("p..a.#"), Selector { name: "p", id: None, classes: vec!["a"] });
		assert_eq!(parse("p.a.a"), Selector { name: "p", id: None, classes: vec!["a"] });
	}

	#[test]
	fn canonical_rendering() {
		assert_eq!(render("div", Some("id"), vec!["class"]), "div#id.class");
		assert_eq!(render("svg", Some(""), vec![]), "svg");
		assert_eq!(render("span", None, vec!["a", "", "b"]), "span.a.b");
	}
}
