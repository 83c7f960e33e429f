//! Authenticator variants and the handler chains they assemble.
//!
//! Each variant describes one way of obtaining a token from the STS. Chains are built fresh
//! for every call, so an authenticator can be shared across tasks without locking.
//!
//! | Variant | Outbound handlers | Token confirmation |
//! | --- | --- | --- |
//! | [`BearerTokenAuthenticator`] | timestamp, username token | bearer |
//! | [`HokTokenAuthenticator`] | timestamp, username token, certificate-keyed signature | holder-of-key |
//! | [`HokTokenForTokenAuthenticator`] | timestamp, existing assertion, assertion-keyed signature | holder-of-key |

// self
use crate::{
	_prelude::*,
	credentials::{Certificate, SigningCredentials, UserCredentials},
	error::SigningPreconditionError,
	handler::{AssertionInjector, CredentialInjector, HandlerChain, TimestampInjector, TokenExtractor},
	obs::OperationKind,
	signer::{AssertionKeyedSigner, CertificateKeyedSigner},
	soap::rst::{self, KeyType, Lifetime},
	token::{ConfirmationMethod, Token},
	xml::Element,
};

/// Token lifetime requested when the caller does not choose one.
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::minutes(30);

/// Issues bearer tokens from a username and password. Requests are never signed.
#[derive(Clone, Debug)]
pub struct BearerTokenAuthenticator {
	credentials: UserCredentials,
	token_lifetime: Duration,
}
impl BearerTokenAuthenticator {
	/// Creates an authenticator requesting [`DEFAULT_TOKEN_LIFETIME`].
	pub fn new(credentials: UserCredentials) -> Self {
		Self { credentials, token_lifetime: DEFAULT_TOKEN_LIFETIME }
	}

	/// Overrides the requested token lifetime.
	pub fn with_token_lifetime(mut self, lifetime: Duration) -> Self {
		self.token_lifetime = lifetime;

		self
	}
}

/// Issues holder-of-key tokens bound to a key pair, authenticating with a username and
/// password.
#[derive(Clone, Debug)]
pub struct HokTokenAuthenticator {
	credentials: UserCredentials,
	signing: SigningCredentials,
	token_lifetime: Duration,
}
impl HokTokenAuthenticator {
	/// Creates an authenticator requesting [`DEFAULT_TOKEN_LIFETIME`].
	pub fn new(credentials: UserCredentials, signing: SigningCredentials) -> Self {
		Self { credentials, signing, token_lifetime: DEFAULT_TOKEN_LIFETIME }
	}

	/// Overrides the requested token lifetime.
	pub fn with_token_lifetime(mut self, lifetime: Duration) -> Self {
		self.token_lifetime = lifetime;

		self
	}
}

/// Exchanges a holder-of-key token for a fresh one, proving possession of the bound key.
#[derive(Clone, Debug)]
pub struct HokTokenForTokenAuthenticator {
	token: Token,
	signing: SigningCredentials,
	token_lifetime: Duration,
}
impl HokTokenForTokenAuthenticator {
	/// Creates an authenticator requesting [`DEFAULT_TOKEN_LIFETIME`].
	///
	/// Fails when `token` is not a holder-of-key assertion, or when it confirms a certificate
	/// whose key is not the one in `signing`.
	pub fn new(token: Token, signing: SigningCredentials) -> Result<Self> {
		let view = token.view()?;

		if view.confirmation != ConfirmationMethod::HolderOfKey {
			return Err(SigningPreconditionError::NotHolderOfKey.into());
		}

		ensure_key_bound(&token, &signing)?;

		Ok(Self { token, signing, token_lifetime: DEFAULT_TOKEN_LIFETIME })
	}

	/// Overrides the requested token lifetime.
	pub fn with_token_lifetime(mut self, lifetime: Duration) -> Self {
		self.token_lifetime = lifetime;

		self
	}

	/// Token presented to the STS.
	pub fn token(&self) -> &Token {
		&self.token
	}
}

/// Closed set of token acquisition flows accepted by [`StsClient::login`](crate::sts::StsClient::login).
#[derive(Clone, Debug)]
pub enum Authenticator {
	/// Username and password, bearer token.
	Bearer(BearerTokenAuthenticator),
	/// Username, password, and key pair, holder-of-key token.
	HokFromCredentials(HokTokenAuthenticator),
	/// Existing holder-of-key token and its key pair, holder-of-key token.
	HokFromToken(HokTokenForTokenAuthenticator),
}
impl Authenticator {
	/// Operation label used for spans and metrics.
	pub fn kind(&self) -> OperationKind {
		match self {
			Self::Bearer(_) => OperationKind::BearerIssue,
			Self::HokFromCredentials(_) => OperationKind::HolderOfKeyIssue,
			Self::HokFromToken(_) => OperationKind::HolderOfKeyExchange,
		}
	}

	/// Requested token lifetime.
	pub fn token_lifetime(&self) -> Duration {
		match self {
			Self::Bearer(inner) => inner.token_lifetime,
			Self::HokFromCredentials(inner) => inner.token_lifetime,
			Self::HokFromToken(inner) => inner.token_lifetime,
		}
	}

	/// Confirmation type asked of the STS.
	pub fn key_type(&self) -> KeyType {
		match self {
			Self::Bearer(_) => KeyType::Bearer,
			Self::HokFromCredentials(_) | Self::HokFromToken(_) => KeyType::PublicKey,
		}
	}

	/// Issue request body for a call made at `now`.
	pub fn request(&self, now: OffsetDateTime) -> Element {
		rst::issue(self.key_type(), Lifetime::starting_at(now, self.token_lifetime()))
	}

	/// Assembles the handler chain for one call, publishing the token into `extractor`.
	///
	/// Signer construction happens here, so a missing assertion id surfaces before anything
	/// is sent.
	pub fn handler_chain(
		&self,
		request_validity: Duration,
		extractor: &TokenExtractor,
	) -> Result<HandlerChain> {
		let mut chain = HandlerChain::new();

		chain.add(TimestampInjector::new(request_validity));

		match self {
			Self::Bearer(inner) => {
				chain.add(CredentialInjector::new(inner.credentials.clone()));
			},
			Self::HokFromCredentials(inner) => {
				chain
					.add(CredentialInjector::new(inner.credentials.clone()))
					.add(CertificateKeyedSigner::new(&inner.signing));
			},
			Self::HokFromToken(inner) => {
				let signer =
					AssertionKeyedSigner::for_token(inner.signing.private_key().clone(), &inner.token)?;

				chain.add(AssertionInjector::new(inner.token.clone())).add(signer);
			},
		}

		chain.add(extractor.clone());

		Ok(chain)
	}
}
impl From<BearerTokenAuthenticator> for Authenticator {
	fn from(value: BearerTokenAuthenticator) -> Self {
		Self::Bearer(value)
	}
}
impl From<HokTokenAuthenticator> for Authenticator {
	fn from(value: HokTokenAuthenticator) -> Self {
		Self::HokFromCredentials(value)
	}
}
impl From<HokTokenForTokenAuthenticator> for Authenticator {
	fn from(value: HokTokenForTokenAuthenticator) -> Self {
		Self::HokFromToken(value)
	}
}

/// Checks that `signing` holds the key confirmed by `token`, when the token names one.
pub(crate) fn ensure_key_bound(token: &Token, signing: &SigningCredentials) -> Result<()> {
	let bound = token
		.view()?
		.confirmation_certificate
		.as_ref()
		.map(Certificate::public_key)
		.transpose()?;

	if bound.is_some_and(|key| key != signing.private_key().public_key()) {
		return Err(SigningPreconditionError::KeyNotBoundToToken.into());
	}

	Ok(())
}
