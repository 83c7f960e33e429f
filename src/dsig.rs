//! XML-DSig assembly and verification for same-document references.
//!
//! Signatures built here always use exclusive canonicalization for both `SignedInfo` and the
//! reference transforms. Verification additionally understands the enveloped-signature
//! transform and `InclusiveNamespaces` prefix lists so STS-signed assertions can be checked.

mod algorithm;
mod verify;

pub use algorithm::*;
pub use verify::*;

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
// self
use crate::{
	_prelude::*,
	credentials::PrivateKey,
	error::CryptoError,
	ns,
	xml::{Element, c14n},
};

/// A same-document element to cover with a `ds:Reference`.
#[derive(Clone, Copy, Debug)]
pub struct ReferenceTarget<'a> {
	/// Identifier the reference URI points at (without `#`).
	pub id: &'a str,
	/// The referenced element as it will appear on the wire.
	pub element: &'a Element,
}

/// Inputs for [`sign`].
#[derive(Clone, Debug)]
pub struct SignatureSpec<'a> {
	/// Elements covered by the signature, in reference order.
	pub references: Vec<ReferenceTarget<'a>>,
	/// Signature method.
	pub algorithm: SignatureAlgorithm,
	/// Reference digest method.
	pub digest: DigestAlgorithm,
	/// `ds:KeyInfo` children.
	pub key_info: Vec<Element>,
	/// `Id` attribute of the `ds:Signature` element.
	pub id: Option<&'a str>,
}

/// Builds a complete `ds:Signature` element.
///
/// Each reference is canonicalized with exclusive c14n as a document subset apex, so the
/// result only depends on the referenced element and not on where it sits in the message.
pub fn sign(spec: &SignatureSpec, key: &PrivateKey) -> Result<Element, CryptoError> {
	let mut signed_info = Element::new(ns::DS_PREFIX, "SignedInfo", ns::DS)
		.with_child(
			Element::new(ns::DS_PREFIX, "CanonicalizationMethod", ns::DS)
				.with_attr("Algorithm", ns::EXC_C14N),
		)
		.with_child(
			Element::new(ns::DS_PREFIX, "SignatureMethod", ns::DS)
				.with_attr("Algorithm", spec.algorithm.uri()),
		);

	for target in &spec.references {
		let canonical = c14n::canonicalize(target.element)?;
		let digest = spec.digest.digest(canonical.as_bytes());

		signed_info.push(reference(target.id, spec.digest, &digest));
	}

	let canonical = c14n::canonicalize(&signed_info)?;
	let value = key.sign(spec.algorithm, canonical.as_bytes())?;
	let mut key_info = Element::new(ns::DS_PREFIX, "KeyInfo", ns::DS);

	for child in &spec.key_info {
		key_info.push(child.clone());
	}

	let mut signature = Element::declared(ns::DS_PREFIX, "Signature", ns::DS);

	if let Some(id) = spec.id {
		signature.set_attr(None, "Id", id);
	}

	Ok(signature
		.with_child(signed_info)
		.with_child(
			Element::new(ns::DS_PREFIX, "SignatureValue", ns::DS).with_text(STANDARD.encode(value)),
		)
		.with_child(key_info))
}

fn reference(id: &str, digest: DigestAlgorithm, value: &[u8]) -> Element {
	Element::new(ns::DS_PREFIX, "Reference", ns::DS)
		.with_attr("URI", format!("#{id}"))
		.with_child(
			Element::new(ns::DS_PREFIX, "Transforms", ns::DS).with_child(
				Element::new(ns::DS_PREFIX, "Transform", ns::DS).with_attr("Algorithm", ns::EXC_C14N),
			),
		)
		.with_child(
			Element::new(ns::DS_PREFIX, "DigestMethod", ns::DS).with_attr("Algorithm", digest.uri()),
		)
		.with_child(
			Element::new(ns::DS_PREFIX, "DigestValue", ns::DS).with_text(STANDARD.encode(value)),
		)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::xml::{self, NamespaceScope};

	const SOLUTION_KEY: &str = include_str!("../tests/fixtures/solution.key");

	#[test]
	fn signature_over_serialized_document_verifies() {
		let key = PrivateKey::from_pem(SOLUTION_KEY).expect("Fixture key should decode.");
		let payload = Element::declared("p", "Payload", "urn:p")
			.with_attr("Id", "_payload")
			.with_child(Element::new("p", "Value", "urn:p").with_text("a & b"));
		let signature = sign(
			&SignatureSpec {
				references: vec![ReferenceTarget { id: "_payload", element: &payload }],
				algorithm: SignatureAlgorithm::RsaSha512,
				digest: DigestAlgorithm::Sha512,
				key_info: Vec::new(),
				id: Some("_sig"),
			},
			&key,
		)
		.expect("Signing should succeed.");
		let document = Element::declared("d", "Doc", "urn:d").with_child(payload).with_child(signature);
		let parsed = xml::parse(&document.to_xml()).expect("Signed document should parse.");
		let (signature, _) = parsed
			.find(&NamespaceScope::new(), &mut |element: &Element| element.is(ns::DS, "Signature"))
			.expect("Signature should be present.");
		let verified = verify(&parsed, signature, &key.public_key())
			.expect("Signature should verify after a serialize/parse round trip.");

		assert_eq!(verified.reference_ids, vec!["_payload".to_owned()]);
		assert_eq!(verified.algorithm, SignatureAlgorithm::RsaSha512);
	}
}
