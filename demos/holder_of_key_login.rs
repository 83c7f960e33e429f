//! Acquires a holder-of-key token with a signed request, exchanges it for a delegated token,
//! then renews and validates the result against a mocked STS.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use time::{Duration, OffsetDateTime};
// self
use wstrust_sts_client::{
	authn::{Authenticator, HokTokenAuthenticator, HokTokenForTokenAuthenticator},
	config::{DEFAULT_PATH, EndpointConfig, TlsTrust},
	credentials::{Certificate, PrivateKey, SigningCredentials, UserCredentials},
	ns,
	soap::{self, rst::RequestKind},
	sts::StsClient,
};

const SOLUTION_KEY: &str = include_str!("../tests/fixtures/solution.key");
const SOLUTION_CRT: &str = include_str!("../tests/fixtures/solution.crt");

fn envelope(payload: &str) -> String {
	format!(
		"<S:Envelope xmlns:S=\"{}\" xmlns:wst=\"{}\"><S:Body>{payload}</S:Body></S:Envelope>",
		ns::SOAP_ENV,
		ns::WST,
	)
}

fn hok_response(id: &str, certificate: &Certificate, lifetime: Duration) -> String {
	let now = OffsetDateTime::now_utc();
	let issued = soap::format_instant(now);
	let expires = soap::format_instant(now + lifetime);

	envelope(&format!(
		"<wst:RequestSecurityTokenResponse><wst:RequestedSecurityToken>\
		<saml2:Assertion xmlns:saml2=\"{saml}\" xmlns:ds=\"{ds}\" ID=\"{id}\" IssueInstant=\"{issued}\" Version=\"2.0\">\
		<saml2:Subject><saml2:NameID>administrator@vsphere.local</saml2:NameID>\
		<saml2:SubjectConfirmation Method=\"{method}\"><saml2:SubjectConfirmationData>\
		<ds:KeyInfo><ds:X509Data><ds:X509Certificate>{certificate}</ds:X509Certificate></ds:X509Data></ds:KeyInfo>\
		</saml2:SubjectConfirmationData></saml2:SubjectConfirmation></saml2:Subject>\
		<saml2:Conditions NotBefore=\"{issued}\" NotOnOrAfter=\"{expires}\"/>\
		</saml2:Assertion></wst:RequestedSecurityToken></wst:RequestSecurityTokenResponse>",
		saml = ns::SAML2,
		ds = ns::DS,
		method = ns::CM_HOLDER_OF_KEY,
		certificate = certificate.to_base64(),
	))
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let signing = SigningCredentials::new(
		PrivateKey::from_pem(SOLUTION_KEY)?,
		Certificate::from_pem(SOLUTION_CRT)?,
	)?;
	let issued_body = hok_response("_demo-issued", signing.certificate(), Duration::minutes(30));
	let renewed_body = hok_response("_demo-renewed", signing.certificate(), Duration::hours(8));
	let server = MockServer::start_async().await;
	let issue_mock = server
		.mock_async(move |when, then| {
			when.method(POST)
				.path(DEFAULT_PATH)
				.header("SOAPAction", RequestKind::Issue.soap_action());
			then.status(200).body(issued_body);
		})
		.await;
	let renew_mock = server
		.mock_async(move |when, then| {
			when.method(POST)
				.path(DEFAULT_PATH)
				.header("SOAPAction", RequestKind::Renew.soap_action());
			then.status(200).body(renewed_body);
		})
		.await;
	let validate_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(DEFAULT_PATH)
				.header("SOAPAction", RequestKind::Validate.soap_action());
			then.status(200).body(envelope(&format!(
				"<wst:RequestSecurityTokenResponse><wst:Status><wst:Code>{}</wst:Code></wst:Status>\
				</wst:RequestSecurityTokenResponse>",
				ns::STATUS_VALID,
			)));
		})
		.await;
	let config = EndpointConfig::new(server.host())
		.with_port(server.port())
		.with_tls(TlsTrust::AcceptInvalidCertificates);
	let client = StsClient::new(config)?;
	let credentials = UserCredentials::new("administrator@vsphere.local", "demo-password");
	let Some(issued) = client
		.login(&Authenticator::from(HokTokenAuthenticator::new(credentials, signing.clone())))
		.await?
	else {
		println!("STS answered without a token.");

		return Ok(());
	};

	println!("Issued holder-of-key assertion {}.", issued.assertion_id()?);

	let exchange = HokTokenForTokenAuthenticator::new(issued, signing.clone())?;

	if let Some(delegated) = client.login(&Authenticator::from(exchange)).await? {
		println!("Exchanged for assertion {}.", delegated.assertion_id()?);

		if let Some(renewed) = client.renew(&delegated, &signing, Some(Duration::hours(8))).await? {
			println!("Renewed until {:?}.", renewed.view()?.not_on_or_after);
			println!("STS reports the renewed token valid: {}.", client.validate(&renewed).await?);
		}
	}

	issue_mock.assert_calls_async(2).await;
	renew_mock.assert_async().await;
	validate_mock.assert_async().await;

	Ok(())
}
