//! WS-Security request signing.
//!
//! A [`RequestSigner`] signs the SOAP body and the security timestamp of an outgoing request
//! with exclusive canonicalization, RSA-SHA512, and SHA-512 digests, then appends the
//! `ds:Signature` to the `wsse:Security` header. How the STS learns which key signed the
//! request is delegated to a [`KeyBinding`]:
//!
//! - [`AssertionKeyedSigner`] references a previously issued holder-of-key assertion by id.
//! - [`CertificateKeyedSigner`] embeds the X.509 certificate and asks the STS to bind the new
//!   token to it.

mod assertion;
mod certificate;

pub use assertion::*;
pub use certificate::*;

// self
use crate::{
	_prelude::*,
	credentials::PrivateKey,
	dsig::{self, DigestAlgorithm, ReferenceTarget, SignatureAlgorithm, SignatureSpec},
	error::SigningPreconditionError,
	handler::SoapHandler,
	ns, obs,
	soap::{self, SoapEnvelope},
	xml::Element,
};

/// Per-call signing state.
///
/// Built fresh for every signing operation and discarded afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SigningContext {
	/// `wsu:Id` of the SOAP body.
	pub body_id: String,
	/// `wsu:Id` of the security timestamp.
	pub timestamp_id: String,
	/// `Id` of the `ds:Signature`, when the key binding needs one.
	pub signature_id: Option<String>,
}

/// Strategy that tells the STS which key backs a signature.
pub trait KeyBinding: Send + Sync {
	/// Stable label used in logs.
	fn name(&self) -> &'static str;

	/// Adds whatever the binding needs to the envelope and returns the `ds:KeyInfo` children.
	///
	/// Runs before digests are computed, so body changes made here are covered by the
	/// signature.
	fn key_info(
		&self,
		envelope: &mut SoapEnvelope,
		context: &mut SigningContext,
	) -> Result<Vec<Element>>;
}

/// Signs outgoing requests with a private key and a [`KeyBinding`].
#[derive(Clone, Debug)]
pub struct RequestSigner<B> {
	key: PrivateKey,
	binding: B,
}
impl<B> RequestSigner<B>
where
	B: KeyBinding,
{
	/// Pairs a signing key with a key binding strategy.
	pub fn with_binding(key: PrivateKey, binding: B) -> Self {
		Self { key, binding }
	}

	/// Key binding strategy.
	pub fn binding(&self) -> &B {
		&self.binding
	}

	/// Signs `envelope` in place and returns the identifiers used.
	///
	/// Fails without touching the envelope when the security header or its single timestamp
	/// is missing.
	pub fn sign(&self, envelope: &mut SoapEnvelope) -> Result<SigningContext> {
		let timestamp_id = match prepare_timestamp(envelope) {
			Ok(id) => id,
			Err(e) => {
				obs::record_signing_abort(self.binding.name(), &e);

				return Err(e.into());
			},
		};
		let body_id = match envelope.body().attr_ns(ns::WSU, "Id") {
			Some(id) => id.to_owned(),
			None => {
				let id = soap::fresh_id();

				envelope.body_mut().set_attr(Some((ns::WSU_PREFIX, ns::WSU)), "Id", id.clone());

				id
			},
		};
		let mut context = SigningContext { body_id, timestamp_id, signature_id: None };
		let key_info = self.binding.key_info(envelope, &mut context)?;
		let signature = {
			let timestamp = envelope
				.security()
				.and_then(|security| find_timestamp(security, &context.timestamp_id))
				.ok_or(SigningPreconditionError::MissingTimestamp)?;

			dsig::sign(
				&SignatureSpec {
					references: vec![
						ReferenceTarget { id: &context.body_id, element: envelope.body() },
						ReferenceTarget { id: &context.timestamp_id, element: timestamp },
					],
					algorithm: SignatureAlgorithm::RsaSha512,
					digest: DigestAlgorithm::Sha512,
					key_info,
					id: context.signature_id.as_deref(),
				},
				&self.key,
			)?
		};

		envelope.ensure_security().push(signature);

		Ok(context)
	}
}
impl<B> SoapHandler for RequestSigner<B>
where
	B: KeyBinding,
{
	fn name(&self) -> &'static str {
		self.binding.name()
	}

	fn handle_outbound(&self, envelope: &mut SoapEnvelope) -> Result<()> {
		self.sign(envelope).map(|_| ())
	}
}

/// Ensures exactly one timestamp exists in the security header and returns its `wsu:Id`,
/// assigning a fresh one when absent.
fn prepare_timestamp(envelope: &mut SoapEnvelope) -> Result<String, SigningPreconditionError> {
	let security =
		envelope.security_mut().ok_or(SigningPreconditionError::MissingSecurityHeader)?;
	let mut timestamps = security.elements_mut().filter(|e| e.is(ns::WSU, "Timestamp"));
	let timestamp = timestamps.next().ok_or(SigningPreconditionError::MissingTimestamp)?;

	if timestamps.next().is_some() {
		return Err(SigningPreconditionError::DuplicateTimestamp);
	}

	match timestamp.attr_ns(ns::WSU, "Id") {
		Some(id) => Ok(id.to_owned()),
		None => {
			let id = soap::fresh_id();

			timestamp.set_attr(Some((ns::WSU_PREFIX, ns::WSU)), "Id", id.clone());

			Ok(id)
		},
	}
}

fn find_timestamp<'a>(security: &'a Element, id: &str) -> Option<&'a Element> {
	security
		.elements()
		.find(|element| element.is(ns::WSU, "Timestamp") && element.attr_ns(ns::WSU, "Id") == Some(id))
}
