//! quick-xml driven parser that resolves namespaces and records element byte spans.

// std
use std::borrow::Cow;
// crates.io
use quick_xml::{
	Reader,
	escape,
	events::{BytesStart, Event},
};
// self
use crate::{
	_prelude::*,
	error::XmlError,
	xml::{Attribute, Element, NamespaceDecl, NamespaceScope, Node, XML_NAMESPACE},
};

/// Parses a document and returns its root element.
pub fn parse(xml: &str) -> Result<Element, XmlError> {
	parse_in_scope(xml, &NamespaceScope::new())
}

/// Parses XML whose free prefixes resolve against `inherited`.
///
/// Every element keeps the byte range it occupies in `xml`, so callers can slice the exact
/// source text of any subtree. Character data and attribute values are end-of-line
/// normalized the way an XML processor must (XML 1.0 sections 2.11 and 3.3.3) before
/// references are expanded. DOCTYPE declarations are rejected.
pub fn parse_in_scope(xml: &str, inherited: &NamespaceScope) -> Result<Element, XmlError> {
	let mut reader = Reader::from_str(xml);
	let mut stack: Vec<(Element, NamespaceScope, usize)> = Vec::new();
	let mut root = None;

	loop {
		let start = position(&reader);
		let event = reader.read_event().map_err(syntax)?;

		match event {
			Event::Start(tag) => {
				let scope = stack.last().map_or(inherited, |(_, scope, _)| scope);
				let (element, scope) = open(&tag, scope)?;

				stack.push((element, scope, start));
			},
			Event::Empty(tag) => {
				let scope = stack.last().map_or(inherited, |(_, scope, _)| scope);
				let (mut element, _) = open(&tag, scope)?;

				element.span = Some(start..position(&reader));

				attach(&mut stack, &mut root, element)?;
			},
			Event::End(_) => {
				let (mut element, _, begin) =
					stack.pop().ok_or_else(|| syntax("unbalanced end tag"))?;

				element.span = Some(begin..position(&reader));

				attach(&mut stack, &mut root, element)?;
			},
			Event::Text(text) => {
				let raw = std::str::from_utf8(&text).map_err(syntax)?;
				let normalized = normalize_line_endings(raw);
				let text = escape::unescape(&normalized).map_err(syntax)?;

				push_text(&mut stack, &text)?;
			},
			Event::CData(data) => {
				let raw = std::str::from_utf8(&data).map_err(syntax)?;

				push_text(&mut stack, &normalize_line_endings(raw))?;
			},
			Event::DocType(_) => return Err(XmlError::DoctypeForbidden),
			Event::Eof => break,
			Event::Decl(_) | Event::PI(_) | Event::Comment(_) => {},
		}
	}

	if !stack.is_empty() {
		return Err(syntax("unclosed element"));
	}

	root.ok_or(XmlError::NoRoot)
}

fn position(reader: &Reader<&[u8]>) -> usize {
	reader.buffer_position() as usize
}

fn syntax(e: impl Display) -> XmlError {
	XmlError::Syntax { message: e.to_string() }
}

fn open(tag: &BytesStart, inherited: &NamespaceScope) -> Result<(Element, NamespaceScope), XmlError> {
	let name = std::str::from_utf8(tag.name().as_ref()).map_err(syntax)?.to_owned();
	let mut scope = inherited.clone();
	let mut element = Element::default();
	let mut raw_attrs = Vec::new();

	for attr in tag.attributes() {
		let attr = attr.map_err(syntax)?;
		let key = std::str::from_utf8(attr.key.as_ref()).map_err(syntax)?.to_owned();
		let raw = std::str::from_utf8(&attr.value).map_err(syntax)?;
		let value = escape::unescape(&normalize_attribute(raw)).map_err(syntax)?.into_owned();

		if key == "xmlns" {
			scope.insert(String::new(), value.clone());
			element.namespaces.push(NamespaceDecl::new("", value));
		} else if let Some(prefix) = key.strip_prefix("xmlns:") {
			scope.insert(prefix.to_owned(), value.clone());
			element.namespaces.push(NamespaceDecl::new(prefix, value));
		} else {
			raw_attrs.push((key, value));
		}
	}

	let (prefix, local) = split(&name);

	element.namespace = resolve(&scope, prefix.unwrap_or_default())?
		.filter(|uri| !uri.is_empty());
	element.prefix = prefix.map(str::to_owned);
	element.local = local.to_owned();

	for (key, value) in raw_attrs {
		let (prefix, local) = split(&key);
		let namespace = match prefix {
			Some(prefix) => resolve(&scope, prefix)?,
			None => None,
		};

		element.attributes.push(Attribute {
			prefix: prefix.map(str::to_owned),
			local: local.to_owned(),
			namespace,
			value,
		});
	}

	Ok((element, scope))
}

/// Translates `\r\n` and lone `\r` to `\n`.
fn normalize_line_endings(raw: &str) -> Cow<'_, str> {
	if !raw.contains('\r') {
		return Cow::Borrowed(raw);
	}

	Cow::Owned(raw.replace("\r\n", "\n").replace('\r', "\n"))
}

/// Attribute-value normalization for CDATA-typed attributes: every literal whitespace
/// character becomes a space, a `\r\n` pair counting as one. Character references are
/// expanded afterwards, so `&#xA;` and friends survive.
fn normalize_attribute(raw: &str) -> Cow<'_, str> {
	if !raw.contains(['\t', '\n', '\r']) {
		return Cow::Borrowed(raw);
	}

	Cow::Owned(normalize_line_endings(raw).replace(['\t', '\n'], " "))
}

fn split(name: &str) -> (Option<&str>, &str) {
	match name.split_once(':') {
		Some((prefix, local)) => (Some(prefix), local),
		None => (None, name),
	}
}

fn resolve(scope: &NamespaceScope, prefix: &str) -> Result<Option<String>, XmlError> {
	if prefix == "xml" {
		return Ok(Some(XML_NAMESPACE.to_owned()));
	}

	match scope.get(prefix) {
		Some(uri) => Ok(Some(uri.clone())),
		None if prefix.is_empty() => Ok(None),
		None => Err(XmlError::UnboundPrefix { prefix: prefix.to_owned() }),
	}
}

fn attach(
	stack: &mut [(Element, NamespaceScope, usize)],
	root: &mut Option<Element>,
	element: Element,
) -> Result<(), XmlError> {
	match stack.last_mut() {
		Some((parent, _, _)) => parent.children.push(Node::Element(element)),
		None if root.is_none() => *root = Some(element),
		None => return Err(syntax("multiple root elements")),
	}

	Ok(())
}

fn push_text(stack: &mut [(Element, NamespaceScope, usize)], text: &str) -> Result<(), XmlError> {
	match stack.last_mut() {
		Some((parent, _, _)) => {
			if let Some(Node::Text(previous)) = parent.children.last_mut() {
				previous.push_str(text);
			} else {
				parent.children.push(Node::Text(text.to_owned()));
			}
		},
		None if text.trim().is_empty() => {},
		None => return Err(syntax("text outside the root element")),
	}

	Ok(())
}
