//! Acquires a bearer token from a mocked STS with username/password credentials over the
//! default reqwest transport.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use wstrust_sts_client::{
	authn::{Authenticator, BearerTokenAuthenticator},
	config::{DEFAULT_PATH, EndpointConfig, TlsTrust},
	credentials::UserCredentials,
	ns,
	sts::StsClient,
};

const ASSERTION: &str = include_str!("../tests/fixtures/signed_assertion.xml");

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let sts_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(DEFAULT_PATH);
			then.status(200).header("content-type", "text/xml; charset=utf-8").body(format!(
				"<S:Envelope xmlns:S=\"{}\" xmlns:wst=\"{}\"><S:Body>\
				<wst:RequestSecurityTokenResponseCollection><wst:RequestSecurityTokenResponse>\
				<wst:RequestedSecurityToken>{ASSERTION}</wst:RequestedSecurityToken>\
				</wst:RequestSecurityTokenResponse></wst:RequestSecurityTokenResponseCollection>\
				</S:Body></S:Envelope>",
				ns::SOAP_ENV,
				ns::WST,
			));
		})
		.await;
	let config = EndpointConfig::new(server.host())
		.with_port(server.port())
		.with_tls(TlsTrust::AcceptInvalidCertificates);
	let client = StsClient::new(config)?;
	let authenticator = Authenticator::from(BearerTokenAuthenticator::new(UserCredentials::new(
		"administrator@vsphere.local",
		"demo-password",
	)));

	match client.login(&authenticator).await? {
		Some(token) => {
			let view = token.view()?;

			println!("Issued assertion {} for {:?}.", view.id, view.subject);
			println!("Valid until {:?}.", view.not_on_or_after);
		},
		None => println!("STS answered without a token."),
	}

	sts_mock.assert_async().await;

	Ok(())
}
