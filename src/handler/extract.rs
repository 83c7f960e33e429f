// self
use crate::{
	_prelude::*,
	error::TokenError,
	handler::SoapHandler,
	ns,
	obs,
	soap::SoapEnvelope,
	token::Token,
	xml::{Element, NamespaceDecl, NamespaceScope},
};

/// Shared cell an extractor publishes its result into.
#[derive(Clone, Debug)]
pub struct ExtractionSlot<T>(Arc<Mutex<Option<T>>>);
impl<T> Default for ExtractionSlot<T> {
	fn default() -> Self {
		Self(Arc::new(Mutex::new(None)))
	}
}
impl<T> ExtractionSlot<T>
where
	T: Clone,
{
	/// Replaces the stored value.
	pub fn store(&self, value: Option<T>) {
		*self.0.lock() = value;
	}

	/// Returns the stored value, leaving the slot empty.
	pub fn take(&self) -> Option<T> {
		self.0.lock().take()
	}

	/// Returns a copy of the stored value.
	pub fn get(&self) -> Option<T> {
		self.0.lock().clone()
	}
}

/// Captures the SAML assertion from an Issue or Renew response.
///
/// Accepts a bare `RequestSecurityTokenResponse` or one wrapped in a
/// `RequestSecurityTokenResponseCollection`. The assertion is sliced out of the response
/// text byte for byte, together with every namespace binding in scope around it. A response
/// without the expected structure, or whose assertion is not a SAML 2.0 assertion with an
/// `ID`, leaves the slot empty; that is not an error.
#[derive(Clone, Debug, Default)]
pub struct TokenExtractor {
	slot: ExtractionSlot<Token>,
}
impl TokenExtractor {
	/// Creates an extractor with an empty slot.
	pub fn new() -> Self {
		Self::default()
	}

	/// Handle to the slot the extracted token is published into.
	pub fn slot(&self) -> ExtractionSlot<Token> {
		self.slot.clone()
	}

	/// Extracts the assertion from `envelope` without touching the slot.
	pub fn extract(envelope: &SoapEnvelope) -> Option<Token> {
		let (response, scope) = match locate_response(envelope) {
			Ok(found) => found,
			Err(missing) => {
				obs::record_extraction_miss("token", missing);

				return None;
			},
		};
		let Some(requested) = first_named(response, "RequestedSecurityToken") else {
			obs::record_extraction_miss("token", "RequestedSecurityToken");

			return None;
		};
		let Some(assertion) = first_named(requested, "Assertion") else {
			obs::record_extraction_miss("token", "Assertion");

			return None;
		};
		let scope = requested.scope_from(&response.scope_from(&scope));
		let xml = match (envelope.source(), assertion.span()) {
			(Some(source), Some(span)) => source.get(span).map(str::to_owned),
			_ => None,
		}
		.unwrap_or_else(|| assertion.to_xml());
		let namespaces = scope.into_iter().map(|(prefix, uri)| NamespaceDecl::new(prefix, uri)).collect();

		match Token::with_namespaces(xml, namespaces) {
			Ok(token) => Some(token),
			Err(TokenError::MissingId) => {
				obs::record_extraction_miss("token", "Assertion/@ID");

				None
			},
			Err(_) => {
				obs::record_extraction_miss("token", "Assertion");

				None
			},
		}
	}
}
impl SoapHandler for TokenExtractor {
	fn name(&self) -> &'static str {
		"token_extractor"
	}

	fn handle_inbound(&self, envelope: &SoapEnvelope) -> Result<()> {
		self.slot.store(Self::extract(envelope));

		Ok(())
	}
}

/// Reads the `wst:Status/wst:Code` of a Validate response.
#[derive(Clone, Debug, Default)]
pub struct StatusExtractor {
	slot: ExtractionSlot<String>,
}
impl StatusExtractor {
	/// Creates an extractor with an empty slot.
	pub fn new() -> Self {
		Self::default()
	}

	/// Handle to the slot the status code is published into.
	pub fn slot(&self) -> ExtractionSlot<String> {
		self.slot.clone()
	}

	/// Extracts the status code from `envelope`.
	pub fn extract(envelope: &SoapEnvelope) -> Option<String> {
		let (response, _) = match locate_response(envelope) {
			Ok(found) => found,
			Err(missing) => {
				obs::record_extraction_miss("status", missing);

				return None;
			},
		};
		let code = first_named(response, "Status")
			.and_then(|status| first_named(status, "Code"))
			.map(|code| code.text().trim().to_owned());

		if code.is_none() {
			obs::record_extraction_miss("status", "Status/Code");
		}

		code
	}

	/// Whether a status code reports a valid token.
	pub fn is_valid_code(code: &str) -> bool {
		code.eq_ignore_ascii_case(ns::STATUS_VALID)
	}
}
impl SoapHandler for StatusExtractor {
	fn name(&self) -> &'static str {
		"status_extractor"
	}

	fn handle_inbound(&self, envelope: &SoapEnvelope) -> Result<()> {
		self.slot.store(Self::extract(envelope));

		Ok(())
	}
}

/// Finds the `RequestSecurityTokenResponse` in a response body, unwrapping an optional
/// collection, and returns it with the bindings in scope on its parent.
fn locate_response(envelope: &SoapEnvelope) -> Result<(&Element, NamespaceScope), &'static str> {
	let body = envelope.body();
	let mut scope = envelope.body_scope();
	let first = body.elements().next().ok_or("RequestSecurityTokenResponse")?;
	let response = if first.local.eq_ignore_ascii_case("RequestSecurityTokenResponseCollection") {
		scope = first.scope_from(&scope);

		first_named(first, "RequestSecurityTokenResponse").ok_or("RequestSecurityTokenResponse")?
	} else {
		first
	};

	if !response.local.eq_ignore_ascii_case("RequestSecurityTokenResponse") {
		return Err("RequestSecurityTokenResponse");
	}

	Ok((response, scope))
}

/// First child element whose local name matches, ignoring ASCII case and namespace.
fn first_named<'a>(parent: &'a Element, local: &str) -> Option<&'a Element> {
	parent.elements().find(|element| element.local.eq_ignore_ascii_case(local))
}
