//! Exclusive XML Canonicalization 1.0 (without comments).
//!
//! Namespace declarations are emitted only where a prefix is visibly utilized by the element
//! or one of its attributes and an output ancestor has not already rendered the same binding.
//! Declarations are sorted by prefix with the default namespace first, attributes by namespace
//! URI then local name, and empty elements are written as start/end tag pairs.

// self
use crate::{
	_prelude::*,
	error::XmlError,
	xml::{self, Element, NamespaceScope, Node},
};

/// Canonicalizes `element` as the apex of a document subset.
pub fn canonicalize(element: &Element) -> Result<String, XmlError> {
	canonicalize_with(element, &Options::default())
}

/// Canonicalizes `element`, omitting the `excluded` subtree (identified by address).
///
/// Used by the enveloped-signature transform to drop the signature element itself.
pub fn canonicalize_excluding(
	element: &Element,
	excluded: Option<&Element>,
) -> Result<String, XmlError> {
	canonicalize_with(element, &Options { excluded, ..Default::default() })
}

/// Settings for one canonicalization pass.
#[derive(Clone, Debug, Default)]
pub struct Options<'a> {
	/// Bindings in scope on the apex from its ancestors.
	pub inherited: Option<&'a NamespaceScope>,
	/// `InclusiveNamespaces` prefix list; `#default` names the default namespace.
	pub inclusive_prefixes: &'a [String],
	/// Subtree left out of the output.
	pub excluded: Option<&'a Element>,
}

/// Canonicalizes `element` with explicit [`Options`].
pub fn canonicalize_with(element: &Element, options: &Options) -> Result<String, XmlError> {
	let mut out = String::new();
	let empty = NamespaceScope::new();
	let inherited = options.inherited.unwrap_or(&empty);

	write_element(element, &NamespaceScope::new(), inherited, options, &mut out)?;

	Ok(out)
}

fn write_element(
	element: &Element,
	rendered: &NamespaceScope,
	inherited: &NamespaceScope,
	options: &Options,
	out: &mut String,
) -> Result<(), XmlError> {
	if options.excluded.is_some_and(|skip| std::ptr::eq(skip, element)) {
		return Ok(());
	}

	let scope = element.scope_from(inherited);
	let mut rendered = rendered.clone();
	let mut decls = BTreeMap::<String, String>::new();
	let prefix = element.prefix.clone().unwrap_or_default();
	let uri = element.namespace.clone().unwrap_or_default();

	if prefix.is_empty() && uri.is_empty() {
		if rendered.get("").is_some_and(|current| !current.is_empty()) {
			decls.insert(String::new(), String::new());
		}
	} else if rendered.get(&prefix) != Some(&uri) {
		decls.insert(prefix, uri);
	}

	for attr in &element.attributes {
		let (Some(prefix), Some(uri)) = (&attr.prefix, &attr.namespace) else { continue };

		if prefix != "xml" && rendered.get(prefix) != Some(uri) {
			decls.insert(prefix.clone(), uri.clone());
		}
	}
	for listed in options.inclusive_prefixes {
		let prefix = if listed == "#default" { "" } else { listed.as_str() };

		let Some(uri) = scope.get(prefix) else { continue };

		if rendered.get(prefix) != Some(uri) && !(prefix.is_empty() && uri.is_empty()) {
			decls.insert(prefix.to_owned(), uri.clone());
		}
	}

	rendered.extend(decls.iter().map(|(prefix, uri)| (prefix.clone(), uri.clone())));

	let name = element.qualified_name();

	out.push('<');
	out.push_str(&name);

	for (prefix, uri) in &decls {
		if prefix.is_empty() {
			out.push_str(" xmlns=\"");
		} else {
			out.push_str(" xmlns:");
			out.push_str(prefix);
			out.push_str("=\"");
		}

		escape_attr(uri, out);
		out.push('"');
	}

	let mut attributes = element.attributes.iter().collect::<Vec<_>>();

	attributes.sort_by(|a, b| {
		(a.namespace.as_deref().unwrap_or_default(), a.local.as_str())
			.cmp(&(b.namespace.as_deref().unwrap_or_default(), b.local.as_str()))
	});

	for attr in attributes {
		out.push(' ');
		out.push_str(&attr.qualified_name());
		out.push_str("=\"");
		escape_attr(&attr.value, out);
		out.push('"');
	}

	out.push('>');

	for node in &element.children {
		match node {
			Node::Element(child) => write_element(child, &rendered, &scope, options, out)?,
			Node::Text(text) => escape_text(text, out),
			Node::Fragment(fragment) => {
				let mut fragment_scope = scope.clone();

				for decl in fragment.namespaces() {
					fragment_scope.insert(decl.prefix.clone(), decl.uri.clone());
				}

				let parsed = xml::parse_in_scope(fragment.xml(), &fragment_scope)?;

				write_element(&parsed, &rendered, &fragment_scope, options, out)?;
			},
		}
	}

	out.push_str("</");
	out.push_str(&name);
	out.push('>');

	Ok(())
}

/// Escapes character data the way canonical XML requires.
pub fn escape_text(text: &str, out: &mut String) {
	for c in text.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'\r' => out.push_str("&#xD;"),
			_ => out.push(c),
		}
	}
}

/// Escapes an attribute value the way canonical XML requires.
pub fn escape_attr(value: &str, out: &mut String) {
	for c in value.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'"' => out.push_str("&quot;"),
			'\t' => out.push_str("&#x9;"),
			'\n' => out.push_str("&#xA;"),
			'\r' => out.push_str("&#xD;"),
			_ => out.push(c),
		}
	}
}
