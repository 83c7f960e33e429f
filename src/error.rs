//! Client-level error types shared across handlers, signers, transports, and the STS facade.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// An STS response that simply lacks a token is not an error; operations that extract tokens
/// return `Ok(None)` for that case.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Required signing input is missing; the request was never sent.
	#[error(transparent)]
	SigningPrecondition(#[from] SigningPreconditionError),
	/// Key, certificate, canonicalization, or signature construction failure.
	#[error(transparent)]
	Crypto(#[from] CryptoError),
	/// Transport failure (DNS, TCP, TLS, unreadable response).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Caller-supplied token is not a usable SAML 2.0 assertion.
	#[error(transparent)]
	Token(#[from] TokenError),

	/// The STS answered with a SOAP fault.
	#[error("STS returned a SOAP fault `{code}`: {reason}.")]
	Fault {
		/// Fault code as sent by the STS (qualified name text).
		code: String,
		/// Human-readable fault string.
		reason: String,
	},
}

/// Signing inputs that must exist before a signature can be assembled.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum SigningPreconditionError {
	/// The outgoing message carries no `wsse:Security` header.
	#[error("Outgoing message has no WS-Security header to sign.")]
	MissingSecurityHeader,
	/// No `wsu:Timestamp` exists in the security header.
	#[error("Outgoing message has no WS-Security timestamp to reference.")]
	MissingTimestamp,
	/// More than one `wsu:Timestamp` exists in the security header.
	#[error("Outgoing message carries more than one WS-Security timestamp.")]
	DuplicateTimestamp,
	/// Assertion-keyed signing requires a non-empty assertion id.
	#[error("Assertion id must not be empty.")]
	EmptyAssertionId,
	/// Token exchange requires a holder-of-key token.
	#[error("Token is not a holder-of-key assertion.")]
	NotHolderOfKey,
	/// Signing key does not match the certificate confirmed by the token.
	#[error("Signing key is not the key bound to the token.")]
	KeyNotBoundToToken,
}

/// Cryptographic and XML construction failures.
#[derive(Debug, ThisError)]
pub enum CryptoError {
	/// Private key bytes could not be decoded.
	#[error("Private key could not be decoded: {message}.")]
	InvalidPrivateKey {
		/// Decoder message.
		message: String,
	},
	/// Certificate bytes could not be decoded.
	#[error("Certificate could not be decoded: {message}.")]
	InvalidCertificate {
		/// Decoder message.
		message: String,
	},
	/// The private key does not belong to the certificate.
	#[error("Private key does not match the certificate public key.")]
	KeyMismatch,
	/// RSA signing failed.
	#[error("RSA signing failed.")]
	Sign {
		/// Underlying signature failure.
		#[source]
		source: rsa::signature::Error,
	},
	/// XML could not be canonicalized or parsed.
	#[error("XML processing failed.")]
	Xml(#[from] XmlError),
	/// Algorithm identifier is not supported.
	#[error("Algorithm `{uri}` is not supported.")]
	UnsupportedAlgorithm {
		/// Algorithm URI.
		uri: String,
	},
	/// Signature structure is incomplete or ambiguous.
	#[error("Signature is malformed: {message}.")]
	MalformedSignature {
		/// Which part is malformed.
		message: String,
	},
	/// A reference digest did not match.
	#[error("Digest mismatch for reference `{uri}`.")]
	DigestMismatch {
		/// Reference URI.
		uri: String,
	},
	/// The signature value did not verify.
	#[error("Signature value does not verify against the supplied key.")]
	SignatureMismatch,
}

/// XML syntax and structure failures.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum XmlError {
	/// The tokenizer rejected the input.
	#[error("XML is not well-formed: {message}.")]
	Syntax {
		/// Tokenizer message.
		message: String,
	},
	/// A prefix was used without a namespace declaration in scope.
	#[error("Prefix `{prefix}` is not bound to a namespace.")]
	UnboundPrefix {
		/// Unbound prefix.
		prefix: String,
	},
	/// Document type declarations are refused.
	#[error("DOCTYPE declarations are not accepted.")]
	DoctypeForbidden,
	/// The document has no root element.
	#[error("XML document has no root element.")]
	NoRoot,
	/// A required element is absent.
	#[error("Required element `{name}` is missing.")]
	MissingElement {
		/// Local name of the missing element.
		name: &'static str,
	},
	/// The root element is not what the caller expected.
	#[error("Expected root element `{expected}`, found `{found}`.")]
	UnexpectedRoot {
		/// Expected local name.
		expected: &'static str,
		/// Found local name.
		found: String,
	},
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Endpoint settings do not form a valid STS URL.
	#[error("Endpoint configuration is invalid: {reason}.")]
	InvalidEndpoint {
		/// What is wrong with the endpoint.
		reason: String,
	},
	/// Configuration document could not be parsed.
	#[error("Configuration document is malformed.")]
	Parse {
		/// Structured parsing failure with the failing path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO, unreadable responses).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the STS.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the STS.")]
	Io(#[from] std::io::Error),
	/// The STS answered with a non-success status and no SOAP fault.
	#[error("STS returned HTTP status {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
	},
	/// The response body is not a SOAP envelope.
	#[error("STS response is not a SOAP envelope.")]
	MalformedEnvelope {
		/// Parsing failure.
		#[source]
		source: XmlError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Token parsing failures.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum TokenError {
	/// Token bytes are not well-formed XML.
	#[error("Token is not well-formed XML.")]
	Xml(#[from] XmlError),
	/// Root element is not a SAML 2.0 assertion.
	#[error("Token root element is not a SAML 2.0 Assertion.")]
	NotAnAssertion,
	/// The assertion has no `ID` attribute.
	#[error("Assertion has no ID attribute.")]
	MissingId,
	/// The holder-of-key confirmation certificate could not be decoded.
	#[error("Assertion carries an undecodable confirmation certificate.")]
	InvalidConfirmationCertificate,
	/// A timestamp attribute could not be parsed.
	#[error("Assertion attribute `{attribute}` is not a valid timestamp.")]
	InvalidTimestamp {
		/// Attribute name.
		attribute: &'static str,
	},
}
