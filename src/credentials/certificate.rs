//! X.509 certificates presented to, or trusted from, the STS.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use rsa::{RsaPublicKey, pkcs8::DecodePublicKey};
use x509_parser::{parse_x509_certificate, pem::parse_x509_pem};
// self
use crate::{_prelude::*, error::CryptoError};

/// DER-encoded X.509 certificate validated at construction.
///
/// Serializes as a PEM string so certificates can live in configuration files.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Certificate {
	der: Arc<[u8]>,
	subject: Arc<str>,
	spki: Arc<[u8]>,
}
impl Certificate {
	/// Decodes a DER certificate.
	pub fn from_der(der: impl Into<Vec<u8>>) -> Result<Self, CryptoError> {
		let der = der.into();
		let (subject, spki) = {
			let (_, parsed) = parse_x509_certificate(&der)
				.map_err(|e| CryptoError::InvalidCertificate { message: e.to_string() })?;

			(parsed.subject().to_string(), parsed.public_key().raw.to_vec())
		};

		Ok(Self { der: der.into(), subject: subject.into(), spki: spki.into() })
	}

	/// Decodes the first `CERTIFICATE` block of a PEM document.
	pub fn from_pem(pem: &str) -> Result<Self, CryptoError> {
		let (_, block) = parse_x509_pem(pem.as_bytes())
			.map_err(|e| CryptoError::InvalidCertificate { message: e.to_string() })?;

		if block.label != "CERTIFICATE" {
			return Err(CryptoError::InvalidCertificate {
				message: format!("unexpected PEM label `{}`", block.label),
			});
		}

		Self::from_der(block.contents)
	}

	/// Decodes base64 DER as carried in `BinarySecurityToken` or `ds:X509Certificate`.
	pub fn from_base64(encoded: &str) -> Result<Self, CryptoError> {
		let compact = encoded.split_whitespace().collect::<String>();
		let der = STANDARD
			.decode(compact)
			.map_err(|e| CryptoError::InvalidCertificate { message: e.to_string() })?;

		Self::from_der(der)
	}

	/// Raw DER bytes.
	pub fn der(&self) -> &[u8] {
		&self.der
	}

	/// Subject distinguished name.
	pub fn subject(&self) -> &str {
		&self.subject
	}

	/// Single-line base64 of the DER bytes.
	pub fn to_base64(&self) -> String {
		STANDARD.encode(&self.der)
	}

	/// PEM encoding with 64-column lines.
	pub fn to_pem(&self) -> String {
		let encoded = self.to_base64();
		let mut pem = String::from("-----BEGIN CERTIFICATE-----\n");

		for line in encoded.as_bytes().chunks(64) {
			pem.push_str(&String::from_utf8_lossy(line));
			pem.push('\n');
		}

		pem.push_str("-----END CERTIFICATE-----\n");

		pem
	}

	/// RSA public key from the certificate's SubjectPublicKeyInfo.
	pub fn public_key(&self) -> Result<RsaPublicKey, CryptoError> {
		RsaPublicKey::from_public_key_der(&self.spki)
			.map_err(|e| CryptoError::InvalidCertificate { message: e.to_string() })
	}
}
impl TryFrom<String> for Certificate {
	type Error = CryptoError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::from_pem(&value)
	}
}
impl From<Certificate> for String {
	fn from(value: Certificate) -> Self {
		value.to_pem()
	}
}
impl Debug for Certificate {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Certificate").field("subject", &self.subject).finish()
	}
}
