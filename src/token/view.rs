// crates.io
use time::format_description::well_known::Rfc3339;
// self
use crate::{
	_prelude::*,
	credentials::Certificate,
	error::TokenError,
	ns,
	xml::{self, Element, NamespaceScope},
};

/// How the subject proves entitlement to the assertion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfirmationMethod {
	/// Possession of the assertion suffices.
	Bearer,
	/// Requests must be signed with the key bound to the assertion.
	HolderOfKey,
	/// Any other confirmation method URI.
	Other(String),
}
impl ConfirmationMethod {
	fn from_uri(uri: &str) -> Self {
		match uri {
			ns::CM_BEARER => Self::Bearer,
			ns::CM_HOLDER_OF_KEY => Self::HolderOfKey,
			other => Self::Other(other.to_owned()),
		}
	}
}

/// Fields read from an assertion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenView {
	/// Assertion `ID`.
	pub id: String,
	/// Issuer entity id.
	pub issuer: Option<String>,
	/// Subject `NameID` value.
	pub subject: Option<String>,
	/// Subject confirmation method.
	pub confirmation: ConfirmationMethod,
	/// Certificate bound by a holder-of-key confirmation.
	pub confirmation_certificate: Option<Certificate>,
	/// `IssueInstant`.
	pub issue_instant: OffsetDateTime,
	/// `Conditions/@NotBefore`.
	pub not_before: Option<OffsetDateTime>,
	/// `Conditions/@NotOnOrAfter`.
	pub not_on_or_after: Option<OffsetDateTime>,
	/// Audience restrictions.
	pub audiences: Vec<String>,
	/// Whether the assertion carries an enveloped signature.
	pub signed: bool,
}
impl TokenView {
	pub(crate) fn parse(raw: &str, scope: &NamespaceScope) -> Result<Self, TokenError> {
		let root = xml::parse_in_scope(raw, scope)?;

		if !root.is(ns::SAML2, "Assertion") {
			return Err(TokenError::NotAnAssertion);
		}

		let id = root.attr("ID").filter(|id| !id.is_empty()).ok_or(TokenError::MissingId)?;
		let issue_instant = timestamp(&root, "IssueInstant")?.ok_or(
			TokenError::InvalidTimestamp { attribute: "IssueInstant" },
		)?;
		let subject = root.child(ns::SAML2, "Subject");
		let confirmation = subject.and_then(|subject| subject.child(ns::SAML2, "SubjectConfirmation"));
		let conditions = root.child(ns::SAML2, "Conditions");
		let confirmation_certificate = confirmation
			.and_then(|confirmation| confirmation.child(ns::SAML2, "SubjectConfirmationData"))
			.and_then(|data| data.child(ns::DS, "KeyInfo"))
			.and_then(|key_info| key_info.child(ns::DS, "X509Data"))
			.and_then(|data| data.child(ns::DS, "X509Certificate"))
			.map(|certificate| Certificate::from_base64(&certificate.text()))
			.transpose()
			.map_err(|_| TokenError::InvalidConfirmationCertificate)?;
		let audiences = conditions
			.into_iter()
			.flat_map(|conditions| conditions.elements())
			.filter(|restriction| restriction.is(ns::SAML2, "AudienceRestriction"))
			.flat_map(|restriction| restriction.elements())
			.filter(|audience| audience.is(ns::SAML2, "Audience"))
			.map(|audience| audience.text().trim().to_owned())
			.collect();

		Ok(Self {
			id: id.to_owned(),
			issuer: root.child(ns::SAML2, "Issuer").map(|issuer| issuer.text().trim().to_owned()),
			subject: subject
				.and_then(|subject| subject.child(ns::SAML2, "NameID"))
				.map(|name| name.text().trim().to_owned()),
			confirmation: ConfirmationMethod::from_uri(
				confirmation.and_then(|confirmation| confirmation.attr("Method")).unwrap_or_default(),
			),
			confirmation_certificate,
			issue_instant,
			not_before: conditions.map(|c| timestamp(c, "NotBefore")).transpose()?.flatten(),
			not_on_or_after: conditions.map(|c| timestamp(c, "NotOnOrAfter")).transpose()?.flatten(),
			audiences,
			signed: root.child(ns::DS, "Signature").is_some(),
		})
	}

	/// Checks the validity window at `now`, widened by `clock_tolerance` on both ends.
	pub fn is_active_at(&self, now: OffsetDateTime, clock_tolerance: Duration) -> bool {
		let started = self.not_before.is_none_or(|not_before| now + clock_tolerance >= not_before);
		let unexpired =
			self.not_on_or_after.is_none_or(|not_on_or_after| now - clock_tolerance < not_on_or_after);

		started && unexpired
	}
}

fn timestamp(element: &Element, attribute: &'static str) -> Result<Option<OffsetDateTime>, TokenError> {
	element
		.attr(attribute)
		.map(|value| {
			OffsetDateTime::parse(value.trim(), &Rfc3339)
				.map_err(|_| TokenError::InvalidTimestamp { attribute })
		})
		.transpose()
}
