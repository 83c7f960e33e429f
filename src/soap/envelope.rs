// self
use crate::{
	_prelude::*,
	error::XmlError,
	ns,
	xml::{self, Element, NamespaceScope, Node},
};

/// SOAP 1.1 message.
///
/// The `wsse:Security` header block is held apart from the other header blocks so handlers
/// can reach it directly; it is always serialized as the first child of `soapenv:Header`.
/// Envelopes parsed from a response keep their source text so byte-exact subtrees can be
/// sliced out of it.
#[derive(Clone, Debug)]
pub struct SoapEnvelope {
	shell: Element,
	header: Element,
	security: Option<Element>,
	body: Element,
	source: Option<Arc<str>>,
}
impl SoapEnvelope {
	/// Creates a request envelope whose body carries `payload`.
	pub fn new(payload: Element) -> Self {
		let shell = Element::declared(ns::SOAP_ENV_PREFIX, "Envelope", ns::SOAP_ENV)
			.with_namespace(ns::WSSE_PREFIX, ns::WSSE)
			.with_namespace(ns::WSSE11_PREFIX, ns::WSSE11)
			.with_namespace(ns::WSU_PREFIX, ns::WSU)
			.with_namespace(ns::WST_PREFIX, ns::WST);

		Self {
			shell,
			header: Element::new(ns::SOAP_ENV_PREFIX, "Header", ns::SOAP_ENV),
			security: None,
			body: Element::new(ns::SOAP_ENV_PREFIX, "Body", ns::SOAP_ENV).with_child(payload),
			source: None,
		}
	}

	/// Parses a response envelope.
	pub fn parse(source: impl Into<Arc<str>>) -> Result<Self, XmlError> {
		let source = source.into();
		let mut shell = xml::parse(&source)?;

		if !shell.is(ns::SOAP_ENV, "Envelope") {
			return Err(XmlError::UnexpectedRoot { expected: "Envelope", found: shell.local });
		}

		let mut header = None;
		let mut body = None;

		for node in std::mem::take(&mut shell.children) {
			match node {
				Node::Element(element) if element.is(ns::SOAP_ENV, "Header") && header.is_none() =>
					header = Some(element),
				Node::Element(element) if element.is(ns::SOAP_ENV, "Body") && body.is_none() =>
					body = Some(element),
				_ => {},
			}
		}

		let mut header =
			header.unwrap_or_else(|| Element::new(ns::SOAP_ENV_PREFIX, "Header", ns::SOAP_ENV));
		let security = header
			.children
			.iter()
			.position(|node| matches!(node, Node::Element(e) if e.is(ns::WSSE, "Security")))
			.and_then(|index| match header.children.remove(index) {
				Node::Element(security) => Some(security),
				_ => None,
			});

		Ok(Self {
			shell,
			header,
			security,
			body: body.ok_or(XmlError::MissingElement { name: "Body" })?,
			source: Some(source),
		})
	}

	/// Source text of a parsed envelope.
	pub fn source(&self) -> Option<&str> {
		self.source.as_deref()
	}

	/// `soapenv:Header` without the security block.
	pub fn header(&self) -> &Element {
		&self.header
	}

	/// `soapenv:Body`.
	pub fn body(&self) -> &Element {
		&self.body
	}

	/// Mutable `soapenv:Body`.
	pub fn body_mut(&mut self) -> &mut Element {
		&mut self.body
	}

	/// The `wsse:Security` header block, if present.
	pub fn security(&self) -> Option<&Element> {
		self.security.as_ref()
	}

	/// Mutable `wsse:Security` header block, if present.
	pub fn security_mut(&mut self) -> Option<&mut Element> {
		self.security.as_mut()
	}

	/// Returns the `wsse:Security` header block, creating it on first use.
	pub fn ensure_security(&mut self) -> &mut Element {
		self.security.get_or_insert_with(|| {
			Element::new(ns::WSSE_PREFIX, "Security", ns::WSSE).with_ns_attr(
				ns::SOAP_ENV_PREFIX,
				"mustUnderstand",
				ns::SOAP_ENV,
				"1",
			)
		})
	}

	/// Namespace bindings in scope on the body element.
	pub fn body_scope(&self) -> NamespaceScope {
		self.body.scope_from(&self.shell.scope_from(&NamespaceScope::new()))
	}

	/// SOAP fault carried by the body, if any.
	pub fn fault(&self) -> Option<SoapFault> {
		let fault = self.body.child(ns::SOAP_ENV, "Fault")?;
		let text = |local: &str| {
			fault.elements().find(|e| e.local == local).map(|e| e.text().trim().to_owned())
		};

		Some(SoapFault {
			code: text("faultcode").unwrap_or_default(),
			reason: text("faultstring").unwrap_or_default(),
		})
	}

	/// Serializes the whole envelope.
	pub fn to_xml(&self) -> String {
		let mut envelope = self.shell.clone();
		let mut header = self.header.clone();

		if let Some(security) = &self.security {
			header.children.insert(0, Node::Element(security.clone()));
		}

		envelope.children = vec![Node::Element(header), Node::Element(self.body.clone())];

		envelope.to_xml()
	}
}

/// SOAP 1.1 fault details.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SoapFault {
	/// `faultcode` text.
	pub code: String,
	/// `faultstring` text.
	pub reason: String,
}
