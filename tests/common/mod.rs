//! Fake STS transport and assertion builders shared by the integration suites.

#![allow(dead_code)]

// std
use std::future;
// self
use wstrust_sts_client::{
	_preludet::*,
	config::EndpointConfig,
	credentials::{Certificate, PrivateKey, SigningCredentials, UserCredentials},
	dsig::{self, VerifiedSignature},
	error::TransportError,
	http::{SoapRequest, SoapResponse, SoapTransport, TransportFuture},
	ns,
	soap::{self, SoapEnvelope},
	sts::StsClient,
	xml::{self, Element, NamespaceScope},
};

pub const SOLUTION_KEY: &str = include_str!("../fixtures/solution.key");
pub const SOLUTION_CRT: &str = include_str!("../fixtures/solution.crt");
pub const STS_CRT: &str = include_str!("../fixtures/sts.crt");
pub const SIGNED_ASSERTION: &str = include_str!("../fixtures/signed_assertion.xml");
pub const SIGNED_ASSERTION_ID: &str = "_5b2e7c0a-4f7e-4a53-9d0e-2f3c1a9e8b71";

type Responder =
	Box<dyn Fn(&SoapRequest) -> Result<SoapResponse, TransportError> + Send + Sync>;

/// In-process STS that records every request and answers through a closure.
pub struct FakeSts {
	requests: Mutex<Vec<SoapRequest>>,
	responder: Responder,
}
impl FakeSts {
	pub fn new(
		responder: impl 'static + Fn(&SoapRequest) -> Result<SoapResponse, TransportError> + Send + Sync,
	) -> Arc<Self> {
		Arc::new(Self { requests: Mutex::new(Vec::new()), responder: Box::new(responder) })
	}

	/// Answers every request with `status` and `body`.
	pub fn replying(status: u16, body: impl Into<String>) -> Arc<Self> {
		let body = body.into();

		Self::new(move |_| Ok(SoapResponse { status, body: body.clone() }))
	}

	pub fn requests(&self) -> Vec<SoapRequest> {
		self.requests.lock().clone()
	}

	pub fn request_count(&self) -> usize {
		self.requests.lock().len()
	}
}
impl SoapTransport for FakeSts {
	fn post(&self, request: SoapRequest) -> TransportFuture<'_> {
		let response = (self.responder)(&request);

		self.requests.lock().push(request);

		Box::pin(future::ready(response))
	}
}

/// Client for `sts.example.com` posting through `fake`.
pub fn client(fake: &Arc<FakeSts>) -> StsClient<FakeSts> {
	StsClient::with_transport(EndpointConfig::new("sts.example.com"), fake.clone())
		.expect("Test endpoint configuration should be valid.")
}

pub fn solution_signing() -> SigningCredentials {
	SigningCredentials::new(
		PrivateKey::from_pem(SOLUTION_KEY).expect("Solution key fixture should decode."),
		solution_certificate(),
	)
	.expect("Solution key should match its certificate.")
}

pub fn solution_certificate() -> Certificate {
	Certificate::from_pem(SOLUTION_CRT).expect("Solution certificate fixture should decode.")
}

pub fn sts_certificate() -> Certificate {
	Certificate::from_pem(STS_CRT).expect("STS certificate fixture should decode.")
}

pub fn user() -> UserCredentials {
	UserCredentials::new("administrator@vsphere.local", "s3cr3t!")
}

/// Unsigned holder-of-key assertion confirming `certificate`, valid until `not_on_or_after`.
pub fn hok_assertion(id: &str, certificate: &Certificate, not_on_or_after: OffsetDateTime) -> String {
	let issued = not_on_or_after - Duration::minutes(30);

	format!(
		"<saml2:Assertion xmlns:saml2=\"{saml}\" xmlns:ds=\"{ds}\" xmlns:xs=\"http://www.w3.org/2001/XMLSchema\" ID=\"{id}\" IssueInstant=\"{issued}\" Version=\"2.0\">\
		<saml2:Issuer>https://sts.example.com/websso/SAML2/Metadata/vsphere.local</saml2:Issuer>\
		<saml2:Subject><saml2:NameID>administrator@vsphere.local</saml2:NameID>\
		<saml2:SubjectConfirmation Method=\"{method}\"><saml2:SubjectConfirmationData>\
		<ds:KeyInfo><ds:X509Data><ds:X509Certificate>{certificate}</ds:X509Certificate></ds:X509Data></ds:KeyInfo>\
		</saml2:SubjectConfirmationData></saml2:SubjectConfirmation></saml2:Subject>\
		<saml2:Conditions NotBefore=\"{issued}\" NotOnOrAfter=\"{expires}\">\
		<saml2:AudienceRestriction><saml2:Audience>urn:vmomi</saml2:Audience></saml2:AudienceRestriction>\
		</saml2:Conditions></saml2:Assertion>",
		saml = ns::SAML2,
		ds = ns::DS,
		method = ns::CM_HOLDER_OF_KEY,
		certificate = certificate.to_base64(),
		issued = soap::format_instant(issued),
		expires = soap::format_instant(not_on_or_after),
	)
}

/// Single `RequestSecurityTokenResponse` carrying `token` verbatim.
pub fn single_response(token: &str) -> String {
	envelope(&format!(
		"<wst:RequestSecurityTokenResponse><wst:TokenType>{}</wst:TokenType>\
		<wst:RequestedSecurityToken>{token}</wst:RequestedSecurityToken>\
		</wst:RequestSecurityTokenResponse>",
		ns::SAML2_TOKEN_TYPE
	))
}

/// `RequestSecurityTokenResponseCollection` wrapping one response that carries `token`.
pub fn collection_response(token: &str) -> String {
	envelope(&format!(
		"<wst:RequestSecurityTokenResponseCollection>\
		<wst:RequestSecurityTokenResponse><wst:TokenType>{}</wst:TokenType>\
		<wst:RequestedSecurityToken>{token}</wst:RequestedSecurityToken>\
		</wst:RequestSecurityTokenResponse></wst:RequestSecurityTokenResponseCollection>",
		ns::SAML2_TOKEN_TYPE
	))
}

/// Response without a requested token.
pub fn empty_response() -> String {
	envelope("<wst:RequestSecurityTokenResponse><wst:Context>none</wst:Context></wst:RequestSecurityTokenResponse>")
}

/// Validate response reporting `code`.
pub fn status_response(code: &str) -> String {
	envelope(&format!(
		"<wst:RequestSecurityTokenResponse><wst:TokenType>{}</wst:TokenType>\
		<wst:Status><wst:Code>{code}</wst:Code></wst:Status></wst:RequestSecurityTokenResponse>",
		ns::STATUS_TOKEN_TYPE
	))
}

pub fn fault_response(code: &str, reason: &str) -> String {
	format!(
		"<S:Envelope xmlns:S=\"{}\"><S:Body><S:Fault><faultcode>{code}</faultcode>\
		<faultstring>{reason}</faultstring></S:Fault></S:Body></S:Envelope>",
		ns::SOAP_ENV
	)
}

fn envelope(payload: &str) -> String {
	format!(
		"<S:Envelope xmlns:S=\"{}\" xmlns:wst=\"{}\"><S:Header/><S:Body>{payload}</S:Body></S:Envelope>",
		ns::SOAP_ENV,
		ns::WST
	)
}

/// Parses a recorded request.
pub fn parse_request(request: &SoapRequest) -> SoapEnvelope {
	SoapEnvelope::parse(request.body.clone()).expect("Recorded request should be a SOAP envelope.")
}

/// Verifies the request signature against `certificate`'s key.
pub fn verify_request(request: &SoapRequest, certificate: &Certificate) -> VerifiedSignature {
	let root = xml::parse(&request.body).expect("Recorded request should parse.");
	let (signature, _) = root
		.find(&NamespaceScope::new(), &mut |element: &Element| element.is(ns::DS, "Signature"))
		.expect("Signed request should carry a signature.");

	dsig::verify(
		&root,
		signature,
		&certificate.public_key().expect("Certificate should carry an RSA key."),
	)
	.expect("Request signature should verify.")
}
