//! SAML 2.0 assertion tokens kept as byte-exact XML.
//!
//! A [`Token`] stores the assertion exactly as the STS sent it, plus the namespace bindings
//! that were in scope around it. The bytes are never regenerated from a parsed model, because
//! the STS signature inside the assertion covers them. Structured fields are available through
//! [`Token::view`], parsed on first use.

mod view;

pub use view::*;

// std
use std::sync::OnceLock;
// self
use crate::{
	_prelude::*,
	credentials::Certificate,
	dsig::{self, VerifiedSignature},
	error::{CryptoError, TokenError},
	ns,
	xml::{self, Fragment, NamespaceDecl, NamespaceScope},
};

/// Opaque SAML 2.0 assertion handle.
///
/// Equality compares the raw XML. `Debug` prints only the assertion id and confirmation
/// method, since bearer assertions are credentials.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "TokenRepr", into = "TokenRepr")]
pub struct Token {
	xml: Arc<str>,
	namespaces: Arc<[NamespaceDecl]>,
	view: Arc<OnceLock<Result<TokenView, TokenError>>>,
}
impl Token {
	/// Wraps caller-supplied assertion XML, checking it is a SAML 2.0 assertion with an id.
	pub fn from_xml(xml: impl Into<String>) -> Result<Self, TokenError> {
		Self::with_namespaces(xml, Vec::new())
	}

	/// Like [`Token::from_xml`] for an assertion that relies on bindings declared outside it.
	pub fn with_namespaces(
		xml: impl Into<String>,
		namespaces: Vec<NamespaceDecl>,
	) -> Result<Self, TokenError> {
		let token = Self {
			xml: Arc::from(xml.into()),
			namespaces: namespaces.into(),
			view: Default::default(),
		};

		token.view()?;

		Ok(token)
	}

	/// The assertion exactly as received.
	pub fn as_xml(&self) -> &str {
		&self.xml
	}

	/// Namespace bindings the assertion inherited from its original context.
	pub fn namespaces(&self) -> &[NamespaceDecl] {
		&self.namespaces
	}

	/// Structured view, parsed once and cached.
	pub fn view(&self) -> Result<&TokenView, TokenError> {
		self.view
			.get_or_init(|| TokenView::parse(&self.xml, &self.scope()))
			.as_ref()
			.map_err(Clone::clone)
	}

	/// Assertion `ID`.
	pub fn assertion_id(&self) -> Result<&str, TokenError> {
		self.view().map(|view| view.id.as_str())
	}

	/// Subject confirmation method.
	pub fn confirmation(&self) -> Result<&ConfirmationMethod, TokenError> {
		self.view().map(|view| &view.confirmation)
	}

	/// Checks the validity window at `now`, widened by `clock_tolerance` on both ends.
	pub fn is_active_at(
		&self,
		now: OffsetDateTime,
		clock_tolerance: Duration,
	) -> Result<bool, TokenError> {
		self.view().map(|view| view.is_active_at(now, clock_tolerance))
	}

	/// Verifies the STS signature embedded in the assertion against any of `trusted`.
	///
	/// The signature must reference the assertion itself.
	pub fn verify_signature(&self, trusted: &[Certificate]) -> Result<VerifiedSignature> {
		let scope = self.scope();
		let root = xml::parse_in_scope(&self.xml, &scope).map_err(TokenError::from)?;
		let id = self.assertion_id()?;
		let signature = root.child(ns::DS, "Signature").ok_or_else(|| {
			CryptoError::MalformedSignature { message: "assertion is not signed".into() }
		})?;
		let mut last = CryptoError::MalformedSignature { message: "no trusted certificates".into() };

		for certificate in trusted {
			match dsig::verify_in_scope(&root, &scope, signature, &certificate.public_key()?) {
				Ok(verified) if verified.reference_ids.iter().any(|covered| covered == id) =>
					return Ok(verified),
				Ok(_) =>
					last = CryptoError::MalformedSignature {
						message: "signature does not cover the assertion".into(),
					},
				Err(e) => last = e,
			}
		}

		Err(last.into())
	}

	/// Verbatim node for embedding the assertion in an outgoing message.
	pub(crate) fn to_fragment(&self) -> Fragment {
		Fragment::new(self.xml.clone(), self.namespaces.clone())
	}

	fn scope(&self) -> NamespaceScope {
		self.namespaces.iter().map(|decl| (decl.prefix.clone(), decl.uri.clone())).collect()
	}
}
impl PartialEq for Token {
	fn eq(&self, other: &Self) -> bool {
		self.xml == other.xml && self.namespaces == other.namespaces
	}
}
impl Eq for Token {}
impl Debug for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let mut debug = f.debug_struct("Token");

		match self.view() {
			Ok(view) => debug.field("id", &view.id).field("confirmation", &view.confirmation),
			Err(e) => debug.field("error", &e),
		};

		debug.finish_non_exhaustive()
	}
}

#[derive(Serialize, Deserialize)]
struct TokenRepr {
	xml: String,
	#[serde(default)]
	namespaces: Vec<NamespaceDecl>,
}
impl TryFrom<TokenRepr> for Token {
	type Error = TokenError;

	fn try_from(value: TokenRepr) -> Result<Self, Self::Error> {
		Self::with_namespaces(value.xml, value.namespaces)
	}
}
impl From<Token> for TokenRepr {
	fn from(value: Token) -> Self {
		Self { xml: value.xml.to_string(), namespaces: value.namespaces.to_vec() }
	}
}
