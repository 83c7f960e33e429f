// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use rsa::{
	RsaPublicKey,
	pkcs1v15::{Signature, VerifyingKey},
	signature::Verifier,
};
use sha2::{Sha256, Sha512};
// self
use crate::{
	_prelude::*,
	dsig::{DigestAlgorithm, SignatureAlgorithm},
	error::CryptoError,
	ns,
	xml::{
		Element, NamespaceScope,
		c14n::{self, Options},
	},
};

/// Outcome of a successful [`verify`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedSignature {
	/// Signature method that was checked.
	pub algorithm: SignatureAlgorithm,
	/// Identifiers of the referenced elements, in reference order.
	pub reference_ids: Vec<String>,
}

/// Verifies `signature` (an element inside `root`) against `key`.
///
/// Every reference must resolve to exactly one element of `root` by `wsu:Id`, `ID`, or `Id`;
/// duplicate identifiers are rejected so a wrapped copy cannot stand in for the signed element.
pub fn verify(
	root: &Element,
	signature: &Element,
	key: &RsaPublicKey,
) -> Result<VerifiedSignature, CryptoError> {
	verify_in_scope(root, &NamespaceScope::new(), signature, key)
}

/// Like [`verify`] for a `root` whose ancestors bind `inherited`.
pub fn verify_in_scope(
	root: &Element,
	inherited: &NamespaceScope,
	signature: &Element,
	key: &RsaPublicKey,
) -> Result<VerifiedSignature, CryptoError> {
	let signed_info = signature
		.child(ns::DS, "SignedInfo")
		.ok_or_else(|| malformed("missing SignedInfo"))?;
	let c14n_method = signed_info
		.child(ns::DS, "CanonicalizationMethod")
		.ok_or_else(|| malformed("missing CanonicalizationMethod"))?;

	ensure_exclusive(c14n_method)?;

	let algorithm = SignatureAlgorithm::from_uri(
		signed_info
			.child(ns::DS, "SignatureMethod")
			.and_then(|method| method.attr("Algorithm"))
			.ok_or_else(|| malformed("missing SignatureMethod"))?,
	)?;
	let mut reference_ids = Vec::new();

	for reference in signed_info.elements().filter(|element| element.is(ns::DS, "Reference")) {
		reference_ids.push(verify_reference(root, inherited, signature, reference)?);
	}

	if reference_ids.is_empty() {
		return Err(malformed("SignedInfo has no references"));
	}

	let (_, signed_info_scope) = root
		.find(inherited, &mut |element: &Element| std::ptr::eq(element, signed_info))
		.ok_or_else(|| malformed("signature is not part of the document"))?;
	let prefixes = inclusive_prefixes(c14n_method);
	let canonical = c14n::canonicalize_with(
		signed_info,
		&Options { inherited: Some(&signed_info_scope), inclusive_prefixes: &prefixes, excluded: None },
	)?;
	let value = decode(
		&signature
			.child(ns::DS, "SignatureValue")
			.ok_or_else(|| malformed("missing SignatureValue"))?
			.text(),
	)?;
	let value = Signature::try_from(value.as_slice()).map_err(|_| CryptoError::SignatureMismatch)?;
	let verified = match algorithm {
		SignatureAlgorithm::RsaSha256 =>
			VerifyingKey::<Sha256>::new(key.clone()).verify(canonical.as_bytes(), &value),
		SignatureAlgorithm::RsaSha512 =>
			VerifyingKey::<Sha512>::new(key.clone()).verify(canonical.as_bytes(), &value),
	};

	verified.map_err(|_| CryptoError::SignatureMismatch)?;

	Ok(VerifiedSignature { algorithm, reference_ids })
}

fn verify_reference(
	root: &Element,
	inherited: &NamespaceScope,
	signature: &Element,
	reference: &Element,
) -> Result<String, CryptoError> {
	let uri = reference.attr("URI").unwrap_or_default();
	let id = uri
		.strip_prefix('#')
		.filter(|id| !id.is_empty())
		.ok_or_else(|| malformed("only same-document id references are supported"))?;
	let mut matches = Vec::new();

	root.find_all(&mut |element: &Element| element.id(ns::WSU) == Some(id), &mut matches);

	let target = match matches.as_slice() {
		[target] => *target,
		[] => return Err(malformed(&format!("reference `{uri}` does not resolve"))),
		_ => return Err(malformed(&format!("identifier `{id}` is not unique"))),
	};
	let (_, scope) = root
		.find(inherited, &mut |element: &Element| std::ptr::eq(element, target))
		.ok_or_else(|| malformed("reference target is not part of the document"))?;
	let mut excluded = None;
	let mut prefixes = None;

	for transform in reference
		.child(ns::DS, "Transforms")
		.into_iter()
		.flat_map(|transforms| transforms.elements())
	{
		match transform.attr("Algorithm").unwrap_or_default() {
			ns::ENVELOPED_SIGNATURE => excluded = Some(signature),
			ns::EXC_C14N => prefixes = Some(inclusive_prefixes(transform)),
			other => return Err(CryptoError::UnsupportedAlgorithm { uri: other.to_owned() }),
		}
	}

	let prefixes = prefixes.ok_or_else(|| malformed("reference lacks an exclusive c14n transform"))?;
	let canonical = c14n::canonicalize_with(
		target,
		&Options { inherited: Some(&scope), inclusive_prefixes: &prefixes, excluded },
	)?;
	let digest = DigestAlgorithm::from_uri(
		reference
			.child(ns::DS, "DigestMethod")
			.and_then(|method| method.attr("Algorithm"))
			.ok_or_else(|| malformed("missing DigestMethod"))?,
	)?;
	let expected = decode(
		&reference
			.child(ns::DS, "DigestValue")
			.ok_or_else(|| malformed("missing DigestValue"))?
			.text(),
	)?;

	if digest.digest(canonical.as_bytes()) != expected {
		return Err(CryptoError::DigestMismatch { uri: uri.to_owned() });
	}

	Ok(id.to_owned())
}

fn ensure_exclusive(method: &Element) -> Result<(), CryptoError> {
	match method.attr("Algorithm") {
		Some(ns::EXC_C14N) => Ok(()),
		Some(other) => Err(CryptoError::UnsupportedAlgorithm { uri: other.to_owned() }),
		None => Err(malformed("canonicalization method has no algorithm")),
	}
}

fn inclusive_prefixes(method: &Element) -> Vec<String> {
	method
		.child(ns::EXC_C14N, "InclusiveNamespaces")
		.and_then(|inclusive| inclusive.attr("PrefixList"))
		.map(|list| list.split_whitespace().map(str::to_owned).collect())
		.unwrap_or_default()
}

fn decode(text: &str) -> Result<Vec<u8>, CryptoError> {
	let compact = text.split_whitespace().collect::<String>();

	STANDARD.decode(compact).map_err(|e| malformed(&format!("invalid base64: {e}")))
}

fn malformed(message: &str) -> CryptoError {
	CryptoError::MalformedSignature { message: message.to_owned() }
}
