mod common;

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
// self
use common::*;
use wstrust_sts_client::{
	_preludet::*,
	dsig::{self, DigestAlgorithm},
	error::SigningPreconditionError,
	http::SoapResponse,
	ns,
	soap::rst::RequestKind,
	token::Token,
	xml::{
		self, Element, NamespaceScope,
		c14n::{self, Options},
	},
};

// `DigestValue` the STS computed over the LF-encoded signed assertion.
const SIGNED_ASSERTION_DIGEST: &str = "uuKpUXIHBiA29RrudBfwB6BZS6d4r1+WPlqSUv2yodA=";

fn held_token(expires: OffsetDateTime) -> Token {
	Token::from_xml(hok_assertion("_held", &solution_certificate(), expires))
		.expect("Holder-of-key assertion should parse.")
}

fn element_in<'a>(root: &'a Element, namespace: &str, local: &str) -> &'a Element {
	root.find(&NamespaceScope::new(), &mut |element: &Element| element.is(namespace, local))
		.map(|(element, _)| element)
		.expect("Requested element should be present.")
}

#[tokio::test]
async fn renew_extends_validity_with_a_certificate_signed_request() {
	let now = OffsetDateTime::now_utc();
	let held = held_token(now + Duration::minutes(5));
	let certificate = solution_certificate();
	let fake = FakeSts::new(move |_| {
		let renewed = hok_assertion("_renewed", &certificate, now + Duration::hours(2));

		Ok(SoapResponse { status: 200, body: collection_response(&renewed) })
	});
	let renewed = client(&fake)
		.renew(&held, &solution_signing(), Some(Duration::hours(2)))
		.await
		.expect("Renewal should succeed.")
		.expect("Renewal response should carry a token.");
	let before = held.view().expect("Held token should parse.").not_on_or_after;
	let after = renewed.view().expect("Renewed token should parse.").not_on_or_after;

	assert!(after > before);
	assert_eq!(renewed.assertion_id().expect("Renewed token should expose its id."), "_renewed");

	let requests = fake.requests();
	let request = &requests[0];
	let root = xml::parse(&request.body).expect("Recorded request should parse.");
	let verified = verify_request(request, &solution_certificate());
	let use_key = element_in(&root, ns::WST, "UseKey");
	let signature = element_in(&root, ns::DS, "Signature");

	assert_eq!(request.action, RequestKind::Renew.soap_action());
	assert_eq!(verified.reference_ids.len(), 2);
	assert_eq!(use_key.attr("Sig"), signature.attr("Id"));
	assert_eq!(element_in(&root, ns::WST, "RequestType").text(), ns::REQUEST_RENEW);
	assert!(request.body.contains(held.as_xml()));
	assert!(element_in(&root, ns::WST, "RenewTarget").child(ns::SAML2, "Assertion").is_some());
}

#[tokio::test]
async fn renew_of_crlf_encoded_assertion_signs_its_line_feed_form() {
	let crlf = SIGNED_ASSERTION.trim_end().replace('\n', "\r\n");
	let held = Token::from_xml(crlf.clone()).expect("CRLF assertion should parse.");
	let fake = FakeSts::replying(200, empty_response());
	let renewed = client(&fake)
		.renew(&held, &solution_signing(), None)
		.await
		.expect("Renewal should succeed.");

	assert!(renewed.is_none());

	let requests = fake.requests();
	let request = &requests[0];

	assert!(request.body.contains(&crlf));

	verify_request(request, &solution_certificate());

	// The body digest must be the one a peer computes after XML line-end normalization.
	let normalized = xml::parse(&request.body.replace("\r\n", "\n"))
		.expect("Normalized request should parse.");
	let (body, scope) = normalized
		.find(&NamespaceScope::new(), &mut |element: &Element| element.is(ns::SOAP_ENV, "Body"))
		.expect("Request should carry a body.");
	let body_id = body.attr_ns(ns::WSU, "Id").expect("Signed body should carry an identifier.");
	let reference = normalized
		.find(&NamespaceScope::new(), &mut |element: &Element| {
			element.is(ns::DS, "Reference")
				&& element.attr("URI") == Some(format!("#{body_id}").as_str())
		})
		.map(|(element, _)| element)
		.expect("Signature should reference the body.");
	let algorithm = DigestAlgorithm::from_uri(
		reference
			.child(ns::DS, "DigestMethod")
			.and_then(|method| method.attr("Algorithm"))
			.expect("Reference should name its digest method."),
	)
	.expect("Digest method should be supported.");
	let canonical = c14n::canonicalize_with(
		body,
		&Options { inherited: Some(&scope), inclusive_prefixes: &[], excluded: None },
	)
	.expect("Body should canonicalize.");

	assert!(!canonical.contains('\r'));
	assert_eq!(
		reference.child(ns::DS, "DigestValue").map(|value| value.text()),
		Some(STANDARD.encode(algorithm.digest(canonical.as_bytes())))
	);

	// The embedded assertion still matches the digest the STS computed over the LF original.
	let sent = xml::parse(&request.body).expect("Recorded request should parse.");
	let assertion = element_in(&sent, ns::WST, "RenewTarget")
		.child(ns::SAML2, "Assertion")
		.expect("Renew target should carry the assertion.");
	let signature = assertion.child(ns::DS, "Signature").expect("Assertion should be signed.");
	let digest_value = element_in(signature, ns::DS, "DigestValue").text();

	assert_eq!(digest_value, SIGNED_ASSERTION_DIGEST);

	let verified = dsig::verify(
		&sent,
		signature,
		&sts_certificate().public_key().expect("Certificate should carry an RSA key."),
	)
	.expect("CRLF assertion should verify against the STS digest.");

	assert_eq!(verified.reference_ids, vec![SIGNED_ASSERTION_ID.to_owned()]);
}

#[tokio::test]
async fn renew_with_unbound_key_is_refused_locally() {
	let foreign = Token::from_xml(hok_assertion(
		"_foreign",
		&sts_certificate(),
		OffsetDateTime::now_utc() + Duration::minutes(5),
	))
	.expect("Holder-of-key assertion should parse.");
	let fake = FakeSts::replying(200, empty_response());
	let result = client(&fake).renew(&foreign, &solution_signing(), None).await;

	assert!(matches!(
		result,
		Err(Error::SigningPrecondition(SigningPreconditionError::KeyNotBoundToToken))
	));
	assert_eq!(fake.request_count(), 0);
}

#[tokio::test]
async fn validate_is_unsigned_and_idempotent() {
	let held = held_token(OffsetDateTime::now_utc() + Duration::minutes(30));
	let fake = FakeSts::replying(200, status_response(ns::STATUS_VALID));
	let client = client(&fake);

	assert!(client.validate(&held).await.expect("First validation should succeed."));
	assert!(client.validate(&held).await.expect("Second validation should succeed."));

	let requests = fake.requests();

	assert_eq!(requests.len(), 2);

	for request in &requests {
		let envelope = parse_request(request);
		let security = envelope.security().expect("Validate request should carry a timestamp.");
		let root = xml::parse(&request.body).expect("Recorded request should parse.");

		assert_eq!(request.action, RequestKind::Validate.soap_action());
		assert!(security.child(ns::WSU, "Timestamp").is_some());
		assert!(security.child(ns::DS, "Signature").is_none());
		assert_eq!(element_in(&root, ns::WST, "TokenType").text(), ns::STATUS_TOKEN_TYPE);
		assert!(request.body.contains(held.as_xml()));
	}
}

#[tokio::test]
async fn validate_reports_invalid_and_missing_status_as_false() {
	let held = held_token(OffsetDateTime::now_utc() + Duration::minutes(30));
	let invalid = client(&FakeSts::replying(
		200,
		status_response("http://docs.oasis-open.org/ws-sx/ws-trust/200512/status/invalid"),
	));
	let missing = client(&FakeSts::replying(200, empty_response()));
	let shouting = client(&FakeSts::replying(200, status_response(&ns::STATUS_VALID.to_uppercase())));

	assert!(!invalid.validate(&held).await.expect("Validation should succeed."));
	assert!(!missing.validate(&held).await.expect("Validation should succeed."));
	assert!(shouting.validate(&held).await.expect("Validation should succeed."));
}
