// self
use crate::{
	_prelude::*,
	credentials::PrivateKey,
	error::SigningPreconditionError,
	ns, obs,
	signer::{KeyBinding, RequestSigner, SigningContext},
	soap::SoapEnvelope,
	token::Token,
	xml::Element,
};

/// Signer whose key is identified by a holder-of-key assertion the STS issued earlier.
pub type AssertionKeyedSigner = RequestSigner<AssertionReference>;
impl RequestSigner<AssertionReference> {
	/// Creates a signer referencing the assertion with `assertion_id`.
	///
	/// Fails when the id is empty, before anything is sent.
	pub fn new(
		key: PrivateKey,
		assertion_id: impl Into<String>,
	) -> Result<Self, SigningPreconditionError> {
		Ok(Self::with_binding(key, AssertionReference::new(assertion_id)?))
	}

	/// Creates a signer referencing `token`.
	pub fn for_token(key: PrivateKey, token: &Token) -> Result<Self> {
		Ok(Self::new(key, token.assertion_id()?)?)
	}
}

/// `wsse:SecurityTokenReference` to a SAML 2.0 assertion by `KeyIdentifier`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssertionReference {
	assertion_id: String,
}
impl AssertionReference {
	/// Creates a reference to `assertion_id`.
	pub fn new(assertion_id: impl Into<String>) -> Result<Self, SigningPreconditionError> {
		let assertion_id = assertion_id.into();

		if assertion_id.trim().is_empty() {
			let e = SigningPreconditionError::EmptyAssertionId;

			obs::record_signing_abort("assertion_keyed_signer", &e);

			return Err(e);
		}

		Ok(Self { assertion_id })
	}

	/// Referenced assertion id.
	pub fn assertion_id(&self) -> &str {
		&self.assertion_id
	}
}
impl KeyBinding for AssertionReference {
	fn name(&self) -> &'static str {
		"assertion_keyed_signer"
	}

	fn key_info(&self, _: &mut SoapEnvelope, _: &mut SigningContext) -> Result<Vec<Element>> {
		let reference = Element::new(ns::WSSE_PREFIX, "SecurityTokenReference", ns::WSSE)
			.with_ns_attr(ns::WSSE11_PREFIX, "TokenType", ns::WSSE11, ns::SAML_TOKEN_TYPE)
			.with_child(
				Element::new(ns::WSSE_PREFIX, "KeyIdentifier", ns::WSSE)
					.with_attr("ValueType", ns::SAML_KEY_ID_TYPE)
					.with_text(self.assertion_id.clone()),
			);

		Ok(vec![reference])
	}
}
