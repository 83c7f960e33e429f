//! Caller-supplied credentials: username/password pairs and RSA key + X.509 certificate pairs.

mod certificate;
mod key;
mod password;

pub use certificate::*;
pub use key::*;
pub use password::*;

// self
use crate::{_prelude::*, error::CryptoError};

/// Username and plaintext password presented in a `wsse:UsernameToken`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserCredentials {
	/// Account name.
	pub username: String,
	/// Account password.
	pub password: Password,
}
impl UserCredentials {
	/// Creates a credential pair.
	pub fn new(username: impl Into<String>, password: impl Into<Password>) -> Self {
		Self { username: username.into(), password: password.into() }
	}
}

/// Private key and the certificate that carries its public half.
///
/// Construction checks that both belong together, so a signature made with the key always
/// verifies against the certificate sent alongside it.
#[derive(Clone, Debug)]
pub struct SigningCredentials {
	private_key: PrivateKey,
	certificate: Certificate,
}
impl SigningCredentials {
	/// Pairs a key with its certificate.
	pub fn new(private_key: PrivateKey, certificate: Certificate) -> Result<Self, CryptoError> {
		if certificate.public_key()? != private_key.public_key() {
			return Err(CryptoError::KeyMismatch);
		}

		Ok(Self { private_key, certificate })
	}

	/// Signing key.
	pub fn private_key(&self) -> &PrivateKey {
		&self.private_key
	}

	/// Certificate presented to the STS.
	pub fn certificate(&self) -> &Certificate {
		&self.certificate
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const SOLUTION_KEY: &str = include_str!("../tests/fixtures/solution.key");
	const SOLUTION_CRT: &str = include_str!("../tests/fixtures/solution.crt");
	const OTHER_KEY: &str = include_str!("../tests/fixtures/other.key");

	#[test]
	fn signing_credentials_require_matching_pair() {
		let certificate =
			Certificate::from_pem(SOLUTION_CRT).expect("Fixture certificate should decode.");
		let key = PrivateKey::from_pem(SOLUTION_KEY).expect("Fixture key should decode.");
		let other = PrivateKey::from_pem(OTHER_KEY).expect("Second fixture key should decode.");

		assert!(SigningCredentials::new(key, certificate.clone()).is_ok());
		assert!(matches!(
			SigningCredentials::new(other, certificate),
			Err(CryptoError::KeyMismatch)
		));
	}

	#[test]
	fn user_credentials_redact_password() {
		let credentials = UserCredentials::new("administrator@vsphere.local", "hunter2");

		assert!(!format!("{credentials:?}").contains("hunter2"));
		assert_eq!(credentials.password.expose(), "hunter2");
	}
}
