//! `wst:RequestSecurityToken` bodies for the Issue, Renew, and Validate bindings.

// self
use crate::{
	_prelude::*,
	ns,
	soap::format_instant,
	token::Token,
	xml::Element,
};

/// STS operation a request targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestKind {
	/// Acquire a new token.
	Issue,
	/// Extend the validity of a token.
	Renew,
	/// Ask the STS whether a token is still valid.
	Validate,
}
impl RequestKind {
	/// `wst:RequestType` URI.
	pub const fn request_type(self) -> &'static str {
		match self {
			Self::Issue => ns::REQUEST_ISSUE,
			Self::Renew => ns::REQUEST_RENEW,
			Self::Validate => ns::REQUEST_VALIDATE,
		}
	}

	/// HTTP `SOAPAction` header value.
	pub const fn soap_action(self) -> &'static str {
		match self {
			Self::Issue => "http://docs.oasis-open.org/ws-sx/ws-trust/200512/RST/Issue",
			Self::Renew => "http://docs.oasis-open.org/ws-sx/ws-trust/200512/RST/Renew",
			Self::Validate => "http://docs.oasis-open.org/ws-sx/ws-trust/200512/RST/Validate",
		}
	}
}

/// Confirmation type requested for an issued token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyType {
	/// Possession of the token suffices.
	Bearer,
	/// The token is bound to the requester's public key.
	PublicKey,
}
impl KeyType {
	/// `wst:KeyType` URI.
	pub const fn uri(self) -> &'static str {
		match self {
			Self::Bearer => ns::KEY_TYPE_BEARER,
			Self::PublicKey => ns::KEY_TYPE_PUBLIC_KEY,
		}
	}
}

/// Requested token validity window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lifetime {
	/// Start of validity.
	pub created: OffsetDateTime,
	/// End of validity.
	pub expires: OffsetDateTime,
}
impl Lifetime {
	/// Window of `length` starting at `now`.
	pub fn starting_at(now: OffsetDateTime, length: Duration) -> Self {
		Self { created: now, expires: now + length }
	}

	fn to_element(self) -> Element {
		Element::new(ns::WST_PREFIX, "Lifetime", ns::WST)
			.with_child(
				Element::new(ns::WSU_PREFIX, "Created", ns::WSU)
					.with_text(format_instant(self.created)),
			)
			.with_child(
				Element::new(ns::WSU_PREFIX, "Expires", ns::WSU)
					.with_text(format_instant(self.expires)),
			)
	}
}

/// Issue request.
///
/// Holder-of-key requests ask for a renewable token; bearer requests do not. Both ask for a
/// delegatable token signed with rsa-sha256.
pub fn issue(key_type: KeyType, lifetime: Lifetime) -> Element {
	let allow_renewal = matches!(key_type, KeyType::PublicKey);

	request(RequestKind::Issue, ns::SAML2_TOKEN_TYPE)
		.with_child(lifetime.to_element())
		.with_child(
			wst("Renewing")
				.with_attr("Allow", allow_renewal.to_string())
				.with_attr("OK", "false"),
		)
		.with_child(wst("Delegatable").with_text("true"))
		.with_child(wst("KeyType").with_text(key_type.uri()))
		.with_child(wst("SignatureAlgorithm").with_text(ns::RSA_SHA256))
}

/// Renew request carrying `token` verbatim as the renew target.
pub fn renew(token: &Token, lifetime: Lifetime) -> Element {
	let mut target = wst("RenewTarget");

	target.push(token.to_fragment());

	request(RequestKind::Renew, ns::SAML2_TOKEN_TYPE)
		.with_child(lifetime.to_element())
		.with_child(target)
}

/// Validate request carrying `token` verbatim as the validate target.
pub fn validate(token: &Token) -> Element {
	let mut target = wst("ValidateTarget");

	target.push(token.to_fragment());

	request(RequestKind::Validate, ns::STATUS_TOKEN_TYPE).with_child(target)
}

fn request(kind: RequestKind, token_type: &str) -> Element {
	wst("RequestSecurityToken")
		.with_child(wst("TokenType").with_text(token_type))
		.with_child(wst("RequestType").with_text(kind.request_type()))
}

fn wst(local: &str) -> Element {
	Element::new(ns::WST_PREFIX, local, ns::WST)
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;

	const SIGNED_ASSERTION: &str = include_str!("../../tests/fixtures/signed_assertion.xml");

	fn lifetime() -> Lifetime {
		Lifetime::starting_at(datetime!(2026-10-18 10:00 UTC), Duration::minutes(30))
	}

	fn texts(element: &Element) -> Vec<(String, String)> {
		element.elements().map(|child| (child.local.clone(), child.text())).collect()
	}

	#[test]
	fn holder_of_key_issue_requests_renewable_public_key_token() {
		let rst = issue(KeyType::PublicKey, lifetime());
		let renewing = rst.child(ns::WST, "Renewing").expect("Issue request should carry Renewing.");
		let lifetime = rst.child(ns::WST, "Lifetime").expect("Issue request should carry Lifetime.");

		assert_eq!(
			texts(&rst).into_iter().map(|(name, _)| name).collect::<Vec<_>>(),
			[
				"TokenType",
				"RequestType",
				"Lifetime",
				"Renewing",
				"Delegatable",
				"KeyType",
				"SignatureAlgorithm"
			]
		);
		assert_eq!(renewing.attr("Allow"), Some("true"));
		assert_eq!(renewing.attr("OK"), Some("false"));
		assert_eq!(
			rst.child(ns::WST, "KeyType").map(Element::text).as_deref(),
			Some(ns::KEY_TYPE_PUBLIC_KEY)
		);
		assert_eq!(
			texts(lifetime),
			[
				("Created".to_owned(), "2026-10-18T10:00:00.000Z".to_owned()),
				("Expires".to_owned(), "2026-10-18T10:30:00.000Z".to_owned())
			]
		);
	}

	#[test]
	fn bearer_issue_is_not_renewable() {
		let rst = issue(KeyType::Bearer, lifetime());

		assert_eq!(rst.child(ns::WST, "Renewing").and_then(|e| e.attr("Allow")), Some("false"));
		assert_eq!(
			rst.child(ns::WST, "KeyType").map(Element::text).as_deref(),
			Some(ns::KEY_TYPE_BEARER)
		);
	}

	#[test]
	fn renew_and_validate_embed_the_assertion_verbatim() {
		let token = Token::from_xml(SIGNED_ASSERTION).expect("Fixture assertion should load.");
		let renew = renew(&token, lifetime()).to_xml();
		let validate = validate(&token);

		assert!(renew.contains(SIGNED_ASSERTION.trim()));
		assert!(validate.to_xml().contains(SIGNED_ASSERTION.trim()));
		assert_eq!(
			validate.child(ns::WST, "TokenType").map(Element::text).as_deref(),
			Some(ns::STATUS_TOKEN_TYPE)
		);
		assert_eq!(RequestKind::Validate.request_type(), ns::REQUEST_VALIDATE);
	}
}
