// crates.io
use sha2::{Digest, Sha256, Sha512};
// self
use crate::{error::CryptoError, ns};

/// Supported `ds:SignatureMethod` algorithms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignatureAlgorithm {
	/// RSA PKCS#1 v1.5 with SHA-256.
	RsaSha256,
	/// RSA PKCS#1 v1.5 with SHA-512.
	RsaSha512,
}
impl SignatureAlgorithm {
	/// Algorithm URI.
	pub const fn uri(self) -> &'static str {
		match self {
			Self::RsaSha256 => ns::RSA_SHA256,
			Self::RsaSha512 => ns::RSA_SHA512,
		}
	}

	/// Resolves an algorithm URI.
	pub fn from_uri(uri: &str) -> Result<Self, CryptoError> {
		match uri {
			ns::RSA_SHA256 => Ok(Self::RsaSha256),
			ns::RSA_SHA512 => Ok(Self::RsaSha512),
			_ => Err(CryptoError::UnsupportedAlgorithm { uri: uri.to_owned() }),
		}
	}
}

/// Supported `ds:DigestMethod` algorithms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DigestAlgorithm {
	/// SHA-256.
	Sha256,
	/// SHA-512.
	Sha512,
}
impl DigestAlgorithm {
	/// Algorithm URI.
	pub const fn uri(self) -> &'static str {
		match self {
			Self::Sha256 => ns::SHA256,
			Self::Sha512 => ns::SHA512,
		}
	}

	/// Resolves an algorithm URI.
	pub fn from_uri(uri: &str) -> Result<Self, CryptoError> {
		match uri {
			ns::SHA256 => Ok(Self::Sha256),
			ns::SHA512 => Ok(Self::Sha512),
			_ => Err(CryptoError::UnsupportedAlgorithm { uri: uri.to_owned() }),
		}
	}

	/// Hashes `data`.
	pub fn digest(self, data: &[u8]) -> Vec<u8> {
		match self {
			Self::Sha256 => Sha256::digest(data).to_vec(),
			Self::Sha512 => Sha512::digest(data).to_vec(),
		}
	}
}
