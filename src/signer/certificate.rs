// self
use crate::{
	_prelude::*,
	credentials::{Certificate, SigningCredentials},
	ns,
	signer::{KeyBinding, RequestSigner, SigningContext},
	soap::{self, SoapEnvelope},
	xml::Element,
};

/// Signer that embeds its X.509 certificate and asks the STS to bind the new token to it.
pub type CertificateKeyedSigner = RequestSigner<CertificateReference>;
impl RequestSigner<CertificateReference> {
	/// Creates a signer from a matched key and certificate.
	pub fn new(credentials: &SigningCredentials) -> Self {
		Self::with_binding(
			credentials.private_key().clone(),
			CertificateReference::new(credentials.certificate().clone()),
		)
	}
}

/// `wsse:BinarySecurityToken` carrying the signer certificate, plus a `wst:UseKey` in the
/// body pointing at the signature.
#[derive(Clone, Debug)]
pub struct CertificateReference {
	certificate: Certificate,
}
impl CertificateReference {
	/// Creates a binding presenting `certificate`.
	pub fn new(certificate: Certificate) -> Self {
		Self { certificate }
	}

	/// Presented certificate.
	pub fn certificate(&self) -> &Certificate {
		&self.certificate
	}
}
impl KeyBinding for CertificateReference {
	fn name(&self) -> &'static str {
		"certificate_keyed_signer"
	}

	fn key_info(
		&self,
		envelope: &mut SoapEnvelope,
		context: &mut SigningContext,
	) -> Result<Vec<Element>> {
		let signature_id = soap::fresh_id();
		let token_id = soap::fresh_id();

		envelope
			.body_mut()
			.push(Element::new(ns::WST_PREFIX, "UseKey", ns::WST).with_attr("Sig", signature_id.clone()));
		envelope.ensure_security().push(
			Element::new(ns::WSSE_PREFIX, "BinarySecurityToken", ns::WSSE)
				.with_attr("EncodingType", ns::BASE64_BINARY)
				.with_attr("ValueType", ns::X509_V3)
				.with_ns_attr(ns::WSU_PREFIX, "Id", ns::WSU, token_id.clone())
				.with_text(self.certificate.to_base64()),
		);

		context.signature_id = Some(signature_id);

		Ok(vec![
			Element::new(ns::WSSE_PREFIX, "SecurityTokenReference", ns::WSSE).with_child(
				Element::new(ns::WSSE_PREFIX, "Reference", ns::WSSE)
					.with_attr("URI", format!("#{token_id}"))
					.with_attr("ValueType", ns::X509_V3),
			),
		])
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		credentials::PrivateKey,
		dsig,
		handler::TimestampInjector,
		xml::{self, NamespaceScope},
	};

	const SOLUTION_KEY: &str = include_str!("../../tests/fixtures/solution.key");
	const SOLUTION_CRT: &str = include_str!("../../tests/fixtures/solution.crt");

	fn credentials() -> SigningCredentials {
		SigningCredentials::new(
			PrivateKey::from_pem(SOLUTION_KEY).expect("Fixture key should decode."),
			Certificate::from_pem(SOLUTION_CRT).expect("Fixture certificate should decode."),
		)
		.expect("Fixture key and certificate should match.")
	}

	#[test]
	fn use_key_and_binary_token_are_linked_to_the_signature() {
		let credentials = credentials();
		let signer = CertificateKeyedSigner::new(&credentials);
		let mut envelope =
			SoapEnvelope::new(Element::new(ns::WST_PREFIX, "RequestSecurityToken", ns::WST));

		TimestampInjector::default().stamp(&mut envelope, OffsetDateTime::now_utc());

		let context = signer.sign(&mut envelope).expect("Signing should succeed.");
		let signature_id = context.signature_id.clone().expect("Certificate signer sets an id.");
		let root = xml::parse(&envelope.to_xml()).expect("Signed envelope should parse.");
		let scope = NamespaceScope::new();
		let (use_key, _) = root
			.find(&scope, &mut |element: &Element| element.is(ns::WST, "UseKey"))
			.expect("UseKey should be in the body.");
		let (token, _) = root
			.find(&scope, &mut |element: &Element| element.is(ns::WSSE, "BinarySecurityToken"))
			.expect("BinarySecurityToken should be in the security header.");
		let (signature, _) = root
			.find(&scope, &mut |element: &Element| element.is(ns::DS, "Signature"))
			.expect("Signature should be present.");
		let (reference, _) = signature
			.find(&scope, &mut |element: &Element| element.is(ns::WSSE, "Reference"))
			.expect("KeyInfo should reference the binary token.");
		let token_id = token.attr_ns(ns::WSU, "Id").expect("Binary token should carry an id.");
		let embedded = Certificate::from_base64(&token.text()).expect("Embedded certificate should decode.");

		assert_eq!(use_key.attr("Sig"), Some(signature_id.as_str()));
		assert_eq!(signature.attr("Id"), Some(signature_id.as_str()));
		assert_eq!(reference.attr("URI"), Some(format!("#{token_id}").as_str()));
		assert_eq!(token.attr("ValueType"), Some(ns::X509_V3));
		assert_eq!(token.attr("EncodingType"), Some(ns::BASE64_BINARY));
		assert_eq!(embedded.der(), credentials.certificate().der());

		dsig::verify(&root, signature, &embedded.public_key().expect("RSA key expected."))
			.expect("Signature should verify with the embedded certificate, UseKey included.");
	}
}
