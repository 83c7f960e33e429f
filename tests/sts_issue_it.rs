mod common;

// self
use common::*;
use wstrust_sts_client::{
	_preludet::*,
	authn::{
		Authenticator, BearerTokenAuthenticator, HokTokenAuthenticator,
		HokTokenForTokenAuthenticator,
	},
	error::{SigningPreconditionError, TransportError},
	handler::HandlerChain,
	http::{SoapRequest, SoapResponse},
	ns,
	signer::CertificateKeyedSigner,
	soap::{
		self,
		rst::{self, KeyType, Lifetime, RequestKind},
	},
	token::{ConfirmationMethod, Token},
	xml::{self, Element, NamespaceScope},
};

fn hok_sts() -> Arc<FakeSts> {
	let certificate = solution_certificate();

	FakeSts::new(move |_| {
		let assertion = hok_assertion(
			&soap::fresh_id(),
			&certificate,
			OffsetDateTime::now_utc() + Duration::minutes(30),
		);

		Ok(SoapResponse { status: 200, body: single_response(&assertion) })
	})
}

fn security_children(request: &SoapRequest) -> Vec<(String, String)> {
	parse_request(request)
		.security()
		.expect("Request should carry a security header.")
		.elements()
		.map(|element| {
			(element.namespace.clone().unwrap_or_default(), element.local.clone())
		})
		.collect()
}

fn find_text(request: &SoapRequest, namespace: &str, local: &str) -> String {
	let root = xml::parse(&request.body).expect("Recorded request should parse.");
	let (element, _) = root
		.find(&NamespaceScope::new(), &mut |element: &Element| element.is(namespace, local))
		.expect("Requested element should be present.");

	element.text()
}

#[tokio::test]
async fn bearer_login_sends_credentials_and_returns_token_verbatim() {
	let fake = FakeSts::replying(200, single_response(SIGNED_ASSERTION));
	let client = client(&fake);
	let authenticator = Authenticator::from(BearerTokenAuthenticator::new(user()));
	let token = client
		.login(&authenticator)
		.await
		.expect("Bearer login should succeed.")
		.expect("Response should carry a token.");

	assert_eq!(token.as_xml(), SIGNED_ASSERTION);
	assert_eq!(token.assertion_id().expect("Token should expose its id."), SIGNED_ASSERTION_ID);
	token
		.verify_signature(&[sts_certificate()])
		.expect("STS signature should survive extraction.");

	let requests = fake.requests();

	assert_eq!(requests.len(), 1);
	assert_eq!(requests[0].action, RequestKind::Issue.soap_action());
	assert_eq!(requests[0].url.as_str(), "https://sts.example.com/sts/STSService");
	assert_eq!(
		security_children(&requests[0]),
		vec![
			(ns::WSU.to_owned(), "Timestamp".to_owned()),
			(ns::WSSE.to_owned(), "UsernameToken".to_owned()),
		]
	);
	assert_eq!(find_text(&requests[0], ns::WSSE, "Username"), "administrator@vsphere.local");
	assert_eq!(find_text(&requests[0], ns::WST, "KeyType"), ns::KEY_TYPE_BEARER);
}

#[tokio::test]
async fn both_response_shapes_yield_identical_tokens() {
	let single = client(&FakeSts::replying(200, single_response(SIGNED_ASSERTION)));
	let collection = client(&FakeSts::replying(200, collection_response(SIGNED_ASSERTION)));
	let authenticator = Authenticator::from(BearerTokenAuthenticator::new(user()));
	let from_single = single
		.login(&authenticator)
		.await
		.expect("Single-response login should succeed.")
		.expect("Single response should carry a token.");
	let from_collection = collection
		.login(&authenticator)
		.await
		.expect("Collection login should succeed.")
		.expect("Collection response should carry a token.");

	assert_eq!(from_single.as_xml(), from_collection.as_xml());
	assert_eq!(from_single.as_xml().as_bytes(), SIGNED_ASSERTION.as_bytes());
	from_collection
		.verify_signature(&[sts_certificate()])
		.expect("STS signature should verify for the collection shape.");
}

#[tokio::test]
async fn response_without_token_is_not_an_error() {
	let fake = FakeSts::replying(200, empty_response());
	let authenticator = Authenticator::from(BearerTokenAuthenticator::new(user()));

	assert!(
		client(&fake)
			.login(&authenticator)
			.await
			.expect("Login without a token should still succeed.")
			.is_none()
	);
}

#[tokio::test]
async fn holder_of_key_login_signs_body_and_timestamp() {
	let fake = hok_sts();
	let authenticator =
		Authenticator::from(HokTokenAuthenticator::new(user(), solution_signing()));
	let token = client(&fake)
		.login(&authenticator)
		.await
		.expect("Holder-of-key login should succeed.")
		.expect("Response should carry a token.");

	assert_eq!(
		token.confirmation().expect("Token should parse."),
		&ConfirmationMethod::HolderOfKey
	);

	let requests = fake.requests();
	let verified = verify_request(&requests[0], &solution_certificate());
	let envelope = parse_request(&requests[0]);
	let body_id = envelope.body().attr_ns(ns::WSU, "Id").expect("Body should carry a wsu:Id.");

	assert_eq!(verified.reference_ids.len(), 2);
	assert_eq!(verified.reference_ids[0], body_id);
	assert_eq!(
		security_children(&requests[0]),
		vec![
			(ns::WSU.to_owned(), "Timestamp".to_owned()),
			(ns::WSSE.to_owned(), "UsernameToken".to_owned()),
			(ns::WSSE.to_owned(), "BinarySecurityToken".to_owned()),
			(ns::DS.to_owned(), "Signature".to_owned()),
		]
	);
	assert_eq!(find_text(&requests[0], ns::WST, "KeyType"), ns::KEY_TYPE_PUBLIC_KEY);
	assert_eq!(
		find_text(&requests[0], ns::WSSE, "BinarySecurityToken"),
		solution_certificate().to_base64()
	);
}

#[tokio::test]
async fn sequential_requests_use_fresh_identifiers() {
	let fake = hok_sts();
	let client = client(&fake);
	let authenticator =
		Authenticator::from(HokTokenAuthenticator::new(user(), solution_signing()));

	for _ in 0..3 {
		client.login(&authenticator).await.expect("Holder-of-key login should succeed.");
	}

	let mut ids = Vec::new();

	for request in fake.requests() {
		ids.extend(verify_request(&request, &solution_certificate()).reference_ids);
	}

	let distinct = ids.iter().collect::<std::collections::BTreeSet<_>>();

	assert_eq!(ids.len(), 6);
	assert_eq!(distinct.len(), ids.len());
}

#[tokio::test]
async fn concurrent_logins_share_one_client() {
	let fake = hok_sts();
	let client = client(&fake);
	let authenticator =
		Authenticator::from(HokTokenAuthenticator::new(user(), solution_signing()));
	let (first, second) = tokio::join!(client.login(&authenticator), client.login(&authenticator));

	assert!(first.expect("First login should succeed.").is_some());
	assert!(second.expect("Second login should succeed.").is_some());
	assert_eq!(fake.request_count(), 2);
}

#[tokio::test]
async fn token_exchange_embeds_assertion_and_signs_with_its_key() {
	let held = Token::from_xml(hok_assertion(
		"_held-assertion",
		&solution_certificate(),
		OffsetDateTime::now_utc() + Duration::minutes(30),
	))
	.expect("Holder-of-key assertion should parse.");
	let fake = hok_sts();
	let authenticator = Authenticator::from(
		HokTokenForTokenAuthenticator::new(held.clone(), solution_signing())
			.expect("Token should be bound to the solution key."),
	);

	client(&fake)
		.login(&authenticator)
		.await
		.expect("Token exchange should succeed.")
		.expect("Response should carry a token.");

	let requests = fake.requests();

	verify_request(&requests[0], &solution_certificate());

	assert!(requests[0].body.contains(held.as_xml()));
	assert_eq!(find_text(&requests[0], ns::WSSE, "KeyIdentifier"), "_held-assertion");
	assert_eq!(
		security_children(&requests[0]),
		vec![
			(ns::WSU.to_owned(), "Timestamp".to_owned()),
			(ns::SAML2.to_owned(), "Assertion".to_owned()),
			(ns::DS.to_owned(), "Signature".to_owned()),
		]
	);
}

#[test]
fn token_exchange_rejects_unusable_tokens() {
	let bearer = Token::from_xml(SIGNED_ASSERTION).expect("Bearer fixture should parse.");
	let foreign = Token::from_xml(hok_assertion(
		"_foreign",
		&sts_certificate(),
		OffsetDateTime::now_utc() + Duration::minutes(30),
	))
	.expect("Holder-of-key assertion should parse.");

	assert!(matches!(
		HokTokenForTokenAuthenticator::new(bearer, solution_signing()),
		Err(Error::SigningPrecondition(SigningPreconditionError::NotHolderOfKey))
	));
	assert!(matches!(
		HokTokenForTokenAuthenticator::new(foreign, solution_signing()),
		Err(Error::SigningPrecondition(SigningPreconditionError::KeyNotBoundToToken))
	));
}

#[tokio::test]
async fn signing_precondition_fails_before_any_network_call() {
	let fake = hok_sts();
	let chain = HandlerChain::new().with(CertificateKeyedSigner::new(&solution_signing()));
	let request = rst::issue(
		KeyType::PublicKey,
		Lifetime::starting_at(OffsetDateTime::now_utc(), Duration::minutes(30)),
	);
	let result = client(&fake).invoke(RequestKind::Issue, request, &chain).await;

	assert!(matches!(
		result,
		Err(Error::SigningPrecondition(SigningPreconditionError::MissingSecurityHeader))
	));
	assert_eq!(fake.request_count(), 0);
}

#[tokio::test]
async fn soap_faults_and_http_failures_map_to_errors() {
	let authenticator = Authenticator::from(BearerTokenAuthenticator::new(user()));
	let fault = client(&FakeSts::replying(500, fault_response("S:Client", "Authentication failed")))
		.login(&authenticator)
		.await;

	assert!(matches!(
		fault,
		Err(Error::Fault { code, reason }) if code == "S:Client" && reason == "Authentication failed"
	));

	let unavailable =
		client(&FakeSts::replying(503, "Service Unavailable")).login(&authenticator).await;

	assert!(matches!(
		unavailable,
		Err(Error::Transport(TransportError::Status { status: 503 }))
	));

	let garbage = client(&FakeSts::replying(200, "not a soap message")).login(&authenticator).await;

	assert!(matches!(
		garbage,
		Err(Error::Transport(TransportError::MalformedEnvelope { .. }))
	));

	let unreachable = client(&FakeSts::new(|_| {
		Err(TransportError::Io(std::io::Error::other("connection reset")))
	}))
	.login(&authenticator)
	.await;

	assert!(matches!(unreachable, Err(Error::Transport(TransportError::Io(_)))));
}
