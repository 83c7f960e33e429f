//! Namespace URIs, prefixes, and algorithm identifiers used on the wire.

/// SOAP 1.1 envelope namespace.
pub const SOAP_ENV: &str = "http://schemas.xmlsoap.org/soap/envelope/";
/// WS-Security 1.0 extension namespace.
pub const WSSE: &str =
	"http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd";
/// WS-Security 1.1 extension namespace.
pub const WSSE11: &str = "http://docs.oasis-open.org/wss/oasis-wss-wssecurity-secext-1.1.xsd";
/// WS-Security utility namespace (`wsu:Id`, `wsu:Timestamp`).
pub const WSU: &str =
	"http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd";
/// WS-Trust 1.3/1.4 namespace.
pub const WST: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512";
/// SAML 2.0 assertion namespace.
pub const SAML2: &str = "urn:oasis:names:tc:SAML:2.0:assertion";
/// XML-DSig namespace.
pub const DS: &str = "http://www.w3.org/2000/09/xmldsig#";

/// Prefix bound to [`SOAP_ENV`].
pub const SOAP_ENV_PREFIX: &str = "soapenv";
/// Prefix bound to [`WSSE`].
pub const WSSE_PREFIX: &str = "wsse";
/// Prefix bound to [`WSSE11`].
pub const WSSE11_PREFIX: &str = "wsse11";
/// Prefix bound to [`WSU`].
pub const WSU_PREFIX: &str = "wsu";
/// Prefix bound to [`WST`].
pub const WST_PREFIX: &str = "wst";
/// Prefix bound to [`DS`].
pub const DS_PREFIX: &str = "ds";

/// Exclusive XML Canonicalization 1.0 without comments.
pub const EXC_C14N: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";
/// Enveloped-signature transform.
pub const ENVELOPED_SIGNATURE: &str = "http://www.w3.org/2000/09/xmldsig#enveloped-signature";
/// RSA PKCS#1 v1.5 with SHA-512.
pub const RSA_SHA512: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha512";
/// RSA PKCS#1 v1.5 with SHA-256.
pub const RSA_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256";
/// SHA-512 digest.
pub const SHA512: &str = "http://www.w3.org/2001/04/xmlenc#sha512";
/// SHA-256 digest.
pub const SHA256: &str = "http://www.w3.org/2001/04/xmlenc#sha256";

/// `KeyIdentifier` value type referencing a SAML 2.0 assertion by id.
pub const SAML_KEY_ID_TYPE: &str =
	"http://docs.oasis-open.org/wss/oasis-wss-saml-token-profile-1.1#SAMLID";
/// `wsse11:TokenType` of a SAML 2.0 token reference.
pub const SAML_TOKEN_TYPE: &str =
	"http://docs.oasis-open.org/wss/oasis-wss-saml-token-profile-1.1#SAMLV2.0";
/// `BinarySecurityToken` value type for X.509v3 certificates.
pub const X509_V3: &str =
	"http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-x509-token-profile-1.0#X509v3";
/// `BinarySecurityToken` encoding type.
pub const BASE64_BINARY: &str =
	"http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-soap-message-security-1.0#Base64Binary";

/// WS-Trust token type requested on issue and renew.
pub const SAML2_TOKEN_TYPE: &str = "urn:oasis:names:tc:SAML:2.0:assertion";
/// WS-Trust token type requested on validate.
pub const STATUS_TOKEN_TYPE: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512/RSTR/Status";
/// Status code reported for a valid token.
pub const STATUS_VALID: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512/status/valid";
/// Issue request type.
pub const REQUEST_ISSUE: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512/Issue";
/// Renew request type.
pub const REQUEST_RENEW: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512/Renew";
/// Validate request type.
pub const REQUEST_VALIDATE: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512/Validate";
/// Key type for holder-of-key tokens.
pub const KEY_TYPE_PUBLIC_KEY: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512/PublicKey";
/// Key type for bearer tokens.
pub const KEY_TYPE_BEARER: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512/Bearer";

/// SAML subject confirmation method for bearer tokens.
pub const CM_BEARER: &str = "urn:oasis:names:tc:SAML:2.0:cm:bearer";
/// SAML subject confirmation method for holder-of-key tokens.
pub const CM_HOLDER_OF_KEY: &str = "urn:oasis:names:tc:SAML:2.0:cm:holder-of-key";
