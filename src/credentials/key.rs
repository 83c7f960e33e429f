//! RSA private key handling.

// crates.io
use rsa::{
	RsaPrivateKey, RsaPublicKey,
	pkcs1::DecodeRsaPrivateKey,
	pkcs1v15::SigningKey,
	pkcs8::DecodePrivateKey,
	signature::{SignatureEncoding, Signer},
};
use sha2::{Sha256, Sha512};
// self
use crate::{_prelude::*, dsig::SignatureAlgorithm, error::CryptoError};

/// RSA private key used to sign outgoing requests. `Debug` never prints key material.
#[derive(Clone)]
pub struct PrivateKey(Arc<RsaPrivateKey>);
impl PrivateKey {
	/// Decodes a PEM key, accepting `PRIVATE KEY` (PKCS#8) and `RSA PRIVATE KEY` (PKCS#1).
	pub fn from_pem(pem: &str) -> Result<Self, CryptoError> {
		RsaPrivateKey::from_pkcs8_pem(pem)
			.or_else(|pkcs8| RsaPrivateKey::from_pkcs1_pem(pem).map_err(|_| pkcs8))
			.map(Self::from)
			.map_err(|e| CryptoError::InvalidPrivateKey { message: e.to_string() })
	}

	/// Decodes a DER key in PKCS#8 or PKCS#1 form.
	pub fn from_der(der: &[u8]) -> Result<Self, CryptoError> {
		RsaPrivateKey::from_pkcs8_der(der)
			.or_else(|pkcs8| RsaPrivateKey::from_pkcs1_der(der).map_err(|_| pkcs8))
			.map(Self::from)
			.map_err(|e| CryptoError::InvalidPrivateKey { message: e.to_string() })
	}

	/// Public half of the key.
	pub fn public_key(&self) -> RsaPublicKey {
		self.0.to_public_key()
	}

	/// Produces a PKCS#1 v1.5 signature over `data`.
	pub fn sign(&self, algorithm: SignatureAlgorithm, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
		let key = RsaPrivateKey::clone(&self.0);
		let signature = match algorithm {
			SignatureAlgorithm::RsaSha256 =>
				SigningKey::<Sha256>::new(key).try_sign(data).map(|s| s.to_vec()),
			SignatureAlgorithm::RsaSha512 =>
				SigningKey::<Sha512>::new(key).try_sign(data).map(|s| s.to_vec()),
		};

		signature.map_err(|source| CryptoError::Sign { source })
	}
}
impl From<RsaPrivateKey> for PrivateKey {
	fn from(value: RsaPrivateKey) -> Self {
		Self(Arc::new(value))
	}
}
impl Debug for PrivateKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("PrivateKey").field(&"<redacted>").finish()
	}
}
