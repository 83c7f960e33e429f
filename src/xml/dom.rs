//! Namespace-aware element tree used for SOAP messages and signatures.

// std
use std::{collections::BTreeSet, ops::Range};
// self
use crate::{
	_prelude::*,
	xml::{self, c14n},
};

/// Reserved `xml` prefix namespace.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// In-scope prefix bindings keyed by prefix (`""` is the default namespace).
pub type NamespaceScope = BTreeMap<String, String>;

/// A namespace declaration carried by an element (`prefix` is empty for `xmlns="..."`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceDecl {
	/// Declared prefix; empty for the default namespace.
	pub prefix: String,
	/// Namespace URI.
	pub uri: String,
}
impl NamespaceDecl {
	/// Creates a declaration binding `prefix` to `uri`.
	pub fn new(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
		Self { prefix: prefix.into(), uri: uri.into() }
	}
}

/// An attribute with its resolved namespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
	/// Prefix as written, if any.
	pub prefix: Option<String>,
	/// Local name.
	pub local: String,
	/// Resolved namespace URI (unprefixed attributes have none).
	pub namespace: Option<String>,
	/// Unescaped value.
	pub value: String,
}
impl Attribute {
	/// Returns `prefix:local` or `local`.
	pub fn qualified_name(&self) -> String {
		match &self.prefix {
			Some(prefix) => format!("{prefix}:{}", self.local),
			None => self.local.clone(),
		}
	}
}

/// Verbatim XML kept byte-for-byte, together with the namespace bindings it relies on.
///
/// Fragments are serialized without modification so embedded signatures stay valid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fragment {
	xml: Arc<str>,
	namespaces: Arc<[NamespaceDecl]>,
}
impl Fragment {
	/// Wraps raw XML and the bindings that were in scope where it was captured.
	pub fn new(xml: impl Into<Arc<str>>, namespaces: impl Into<Arc<[NamespaceDecl]>>) -> Self {
		Self { xml: xml.into(), namespaces: namespaces.into() }
	}

	/// Raw XML text.
	pub fn xml(&self) -> &str {
		&self.xml
	}

	/// Inherited namespace bindings.
	pub fn namespaces(&self) -> &[NamespaceDecl] {
		&self.namespaces
	}
	/// Prefixes the fragment resolves through bindings it does not declare itself, or `None`
	/// when the fragment does not parse.
	fn outer_prefixes(&self) -> Option<BTreeSet<String>> {
		let scope: NamespaceScope =
			self.namespaces.iter().map(|decl| (decl.prefix.clone(), decl.uri.clone())).collect();
		let root = xml::parse_in_scope(&self.xml, &scope).ok()?;
		let mut used = BTreeSet::new();

		root.collect_outer_prefixes(&BTreeSet::new(), &mut used);

		Some(used)
	}
}

/// Child node of an [`Element`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
	/// Nested element.
	Element(Element),
	/// Character data (unescaped).
	Text(String),
	/// Verbatim XML.
	Fragment(Fragment),
}
impl From<Element> for Node {
	fn from(value: Element) -> Self {
		Self::Element(value)
	}
}
impl From<Fragment> for Node {
	fn from(value: Fragment) -> Self {
		Self::Fragment(value)
	}
}

/// XML element with resolved namespaces and, when parsed, its byte span in the source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
	/// Prefix as written, if any.
	pub prefix: Option<String>,
	/// Local name.
	pub local: String,
	/// Resolved namespace URI.
	pub namespace: Option<String>,
	/// Namespace declarations made on this element.
	pub namespaces: Vec<NamespaceDecl>,
	/// Attributes in document order.
	pub attributes: Vec<Attribute>,
	/// Child nodes in document order.
	pub children: Vec<Node>,
	pub(crate) span: Option<Range<usize>>,
}
impl Element {
	/// Creates `prefix:local` in `namespace`; the prefix is not declared.
	pub fn new(prefix: &str, local: &str, namespace: &str) -> Self {
		Self {
			prefix: Some(prefix.to_owned()),
			local: local.to_owned(),
			namespace: Some(namespace.to_owned()),
			..Default::default()
		}
	}

	/// Creates `prefix:local` in `namespace` and declares the prefix on it.
	pub fn declared(prefix: &str, local: &str, namespace: &str) -> Self {
		Self::new(prefix, local, namespace).with_namespace(prefix, namespace)
	}

	/// Adds a namespace declaration.
	pub fn with_namespace(mut self, prefix: &str, uri: &str) -> Self {
		self.declare_namespace(prefix, uri);

		self
	}

	/// Adds or replaces a namespace declaration.
	pub fn declare_namespace(&mut self, prefix: &str, uri: &str) {
		match self.namespaces.iter_mut().find(|decl| decl.prefix == prefix) {
			Some(decl) => decl.uri = uri.to_owned(),
			None => self.namespaces.push(NamespaceDecl::new(prefix, uri)),
		}
	}

	/// Adds an unqualified attribute.
	pub fn with_attr(mut self, local: &str, value: impl Into<String>) -> Self {
		self.set_attr(None, local, value);

		self
	}

	/// Adds a namespace-qualified attribute.
	pub fn with_ns_attr(
		mut self,
		prefix: &str,
		local: &str,
		namespace: &str,
		value: impl Into<String>,
	) -> Self {
		self.set_attr(Some((prefix, namespace)), local, value);

		self
	}

	/// Sets an attribute, replacing one with the same namespace and local name.
	pub fn set_attr(
		&mut self,
		qualified: Option<(&str, &str)>,
		local: &str,
		value: impl Into<String>,
	) {
		let value = value.into();
		let namespace = qualified.map(|(_, ns)| ns);

		if let Some(attr) = self
			.attributes
			.iter_mut()
			.find(|attr| attr.local == local && attr.namespace.as_deref() == namespace)
		{
			attr.value = value;

			return;
		}

		self.attributes.push(Attribute {
			prefix: qualified.map(|(prefix, _)| prefix.to_owned()),
			local: local.to_owned(),
			namespace: namespace.map(str::to_owned),
			value,
		});
	}

	/// Appends a child element.
	pub fn with_child(mut self, child: Element) -> Self {
		self.children.push(Node::Element(child));

		self
	}

	/// Appends a text node.
	pub fn with_text(mut self, text: impl Into<String>) -> Self {
		self.children.push(Node::Text(text.into()));

		self
	}

	/// Appends any node.
	pub fn push(&mut self, node: impl Into<Node>) {
		self.children.push(node.into());
	}

	/// Returns `prefix:local` or `local`.
	pub fn qualified_name(&self) -> String {
		match &self.prefix {
			Some(prefix) => format!("{prefix}:{}", self.local),
			None => self.local.clone(),
		}
	}

	/// Checks namespace and local name.
	pub fn is(&self, namespace: &str, local: &str) -> bool {
		self.local == local && self.namespace.as_deref() == Some(namespace)
	}

	/// Looks up an unqualified attribute.
	pub fn attr(&self, local: &str) -> Option<&str> {
		self.attributes
			.iter()
			.find(|attr| attr.namespace.is_none() && attr.local == local)
			.map(|attr| attr.value.as_str())
	}

	/// Looks up a namespace-qualified attribute.
	pub fn attr_ns(&self, namespace: &str, local: &str) -> Option<&str> {
		self.attributes
			.iter()
			.find(|attr| attr.local == local && attr.namespace.as_deref() == Some(namespace))
			.map(|attr| attr.value.as_str())
	}

	/// Iterates over child elements.
	pub fn elements(&self) -> impl Iterator<Item = &Element> {
		self.children.iter().filter_map(|node| match node {
			Node::Element(element) => Some(element),
			_ => None,
		})
	}

	/// Iterates mutably over child elements.
	pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
		self.children.iter_mut().filter_map(|node| match node {
			Node::Element(element) => Some(element),
			_ => None,
		})
	}

	/// First child element with the given name.
	pub fn child(&self, namespace: &str, local: &str) -> Option<&Element> {
		self.elements().find(|element| element.is(namespace, local))
	}

	/// First child element with the given name, mutably.
	pub fn child_mut(&mut self, namespace: &str, local: &str) -> Option<&mut Element> {
		self.elements_mut().find(|element| element.is(namespace, local))
	}

	/// Concatenated text of the direct text children.
	pub fn text(&self) -> String {
		self.children
			.iter()
			.filter_map(|node| match node {
				Node::Text(text) => Some(text.as_str()),
				_ => None,
			})
			.collect()
	}

	/// Byte range of this element in the parsed source, when it came from the parser.
	pub fn span(&self) -> Option<Range<usize>> {
		self.span.clone()
	}

	/// Value of the first identifier attribute (`wsu:Id`, `ID`, or `Id`).
	pub fn id(&self, wsu_namespace: &str) -> Option<&str> {
		self.attr_ns(wsu_namespace, "Id").or_else(|| self.attr("ID")).or_else(|| self.attr("Id"))
	}

	/// Depth-first search over this element and its descendants.
	///
	/// The callback receives each element and the namespace bindings in scope on it.
	pub fn find<'a, F>(
		&'a self,
		inherited: &NamespaceScope,
		pred: &mut F,
	) -> Option<(&'a Element, NamespaceScope)>
	where
		F: FnMut(&Element) -> bool,
	{
		let scope = self.scope_from(inherited);

		if pred(self) {
			return Some((self, scope));
		}

		self.elements().find_map(|child| child.find(&scope, pred))
	}

	/// Collects every element matching `pred`, in document order.
	pub fn find_all<'a, F>(&'a self, pred: &mut F, found: &mut Vec<&'a Element>)
	where
		F: FnMut(&Element) -> bool,
	{
		if pred(self) {
			found.push(self);
		}

		for child in self.elements() {
			child.find_all(pred, found);
		}
	}

	/// Bindings in scope on this element given those inherited from its ancestors.
	pub fn scope_from(&self, inherited: &NamespaceScope) -> NamespaceScope {
		let mut scope = inherited.clone();

		for decl in &self.namespaces {
			scope.insert(decl.prefix.clone(), decl.uri.clone());
		}

		scope
	}

	/// Prefix bindings this element's own name and attributes resolve through.
	fn bindings_in_use(&self) -> impl Iterator<Item = (&str, &str)> {
		let own = self
			.namespace
			.as_deref()
			.map(|namespace| (self.prefix.as_deref().unwrap_or_default(), namespace));
		let attributes = self.attributes.iter().filter_map(|attr| {
			match (attr.prefix.as_deref(), attr.namespace.as_deref()) {
				(Some(prefix), Some(namespace)) if prefix != "xml" => Some((prefix, namespace)),
				_ => None,
			}
		});

		own.into_iter().chain(attributes)
	}

	fn collect_outer_prefixes(&self, declared: &BTreeSet<String>, used: &mut BTreeSet<String>) {
		let mut declared = declared.clone();

		declared.extend(self.namespaces.iter().map(|decl| decl.prefix.clone()));

		let names = self.bindings_in_use().map(|(prefix, _)| prefix);
		// QName-valued attributes such as `xsi:type="xs:string"`.
		let values = self.attributes.iter().filter_map(|attr| {
			attr.value.split_once(':').map(|(prefix, _)| prefix).filter(|prefix| {
				!prefix.is_empty() && !prefix.contains(|c: char| c.is_whitespace() || c == '/')
			})
		});

		for prefix in names.chain(values) {
			if !declared.contains(prefix) {
				used.insert(prefix.to_owned());
			}
		}
		for child in self.elements() {
			child.collect_outer_prefixes(&declared, used);
		}
	}

	/// Serializes the element; fragments are written verbatim.
	pub fn to_xml(&self) -> String {
		let mut out = String::new();

		self.write(&NamespaceScope::new(), &mut out);

		out
	}

	fn write(&self, inherited: &NamespaceScope, out: &mut String) {
		let mut scope = self.scope_from(inherited);
		let mut decls = self.namespaces.clone();

		// An ancestor may have rebound one of our prefixes for a verbatim sibling.
		for (prefix, namespace) in self.bindings_in_use() {
			if scope.get(prefix).is_some_and(|bound| bound != namespace) {
				scope.insert(prefix.to_owned(), namespace.to_owned());
				decls.push(NamespaceDecl::new(prefix, namespace));
			}
		}

		// Bindings a verbatim child relies on must be in scope before it is written.
		let mut hoisted = NamespaceScope::new();

		for node in &self.children {
			let Node::Fragment(fragment) = node else { continue };
			let used = fragment.outer_prefixes();

			for decl in fragment.namespaces() {
				if used.as_ref().is_some_and(|used| !used.contains(&decl.prefix))
					|| scope.get(&decl.prefix) == Some(&decl.uri)
					|| hoisted.contains_key(&decl.prefix)
					|| self.bindings_in_use().any(|(prefix, _)| prefix == decl.prefix)
				{
					continue;
				}

				hoisted.insert(decl.prefix.clone(), decl.uri.clone());
				scope.insert(decl.prefix.clone(), decl.uri.clone());
				decls.retain(|existing| existing.prefix != decl.prefix);
				decls.push(decl.clone());
			}
		}

		let name = self.qualified_name();

		out.push('<');
		out.push_str(&name);

		for decl in &decls {
			if decl.prefix.is_empty() {
				out.push_str(" xmlns=\"");
			} else {
				out.push_str(" xmlns:");
				out.push_str(&decl.prefix);
				out.push_str("=\"");
			}

			c14n::escape_attr(&decl.uri, out);
			out.push('"');
		}
		for attr in &self.attributes {
			out.push(' ');
			out.push_str(&attr.qualified_name());
			out.push_str("=\"");
			c14n::escape_attr(&attr.value, out);
			out.push('"');
		}

		if self.children.is_empty() {
			out.push_str("/>");

			return;
		}

		out.push('>');

		for node in &self.children {
			match node {
				Node::Element(element) => element.write(&scope, out),
				Node::Text(text) => c14n::escape_text(text, out),
				Node::Fragment(fragment) => out.push_str(fragment.xml()),
			}
		}

		out.push_str("</");
		out.push_str(&name);
		out.push('>');
	}
}
