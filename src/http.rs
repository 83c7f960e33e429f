//! Transport primitives for SOAP exchanges with the STS.
//!
//! [`SoapTransport`] is the client's only dependency on an HTTP stack. The bundled
//! [`ReqwestTransport`] posts `text/xml` bodies with a `SOAPAction` header, never follows
//! redirects, and applies the TLS trust and timeout from [`EndpointConfig`].

// self
use crate::{_prelude::*, config::EndpointConfig, error::TransportError};
#[cfg(feature = "reqwest")]
use crate::{config::TlsTrust, error::ConfigError};

/// Boxed future returned by [`SoapTransport::post`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<SoapResponse, TransportError>> + 'a + Send>>;

/// Outgoing SOAP request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SoapRequest {
	/// STS endpoint.
	pub url: Url,
	/// `SOAPAction` header value.
	pub action: &'static str,
	/// Serialized envelope.
	pub body: String,
}

/// Raw SOAP response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SoapResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response body text.
	pub body: String,
}
impl SoapResponse {
	/// Whether the status is in the 2xx range.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Abstraction over HTTP stacks able to post SOAP envelopes.
///
/// Implementations must be `Send + Sync + 'static` so one transport can serve concurrent
/// calls, and their futures must be `Send` so callers can move them across executors.
/// Failures to reach the STS are reported as [`TransportError`]; any HTTP response,
/// including SOAP faults delivered with status 500, is returned as a [`SoapResponse`].
pub trait SoapTransport
where
	Self: 'static + Send + Sync,
{
	/// Posts `request` and resolves with the response.
	fn post(&self, request: SoapRequest) -> TransportFuture<'_>;
}
impl<T> SoapTransport for Arc<T>
where
	T: ?Sized + SoapTransport,
{
	fn post(&self, request: SoapRequest) -> TransportFuture<'_> {
		(**self).post(request)
	}
}

/// reqwest-backed [`SoapTransport`].
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestTransport(ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing client. Configure it to not follow redirects.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client honoring the trust and timeout settings of `config`.
	pub fn from_config(config: &EndpointConfig) -> Result<Self, ConfigError> {
		let mut builder = ReqwestClient::builder().redirect(reqwest::redirect::Policy::none());

		match &config.tls {
			TlsTrust::System => {},
			TlsTrust::Custom { roots } => {
				builder = builder.tls_built_in_root_certs(false);

				for root in roots {
					builder = builder.add_root_certificate(reqwest::Certificate::from_der(root.der())?);
				}
			},
			TlsTrust::AcceptInvalidCertificates => {
				builder =
					builder.danger_accept_invalid_certs(true).danger_accept_invalid_hostnames(true);
			},
		}

		if let Some(timeout) = config.timeout {
			let timeout = std::time::Duration::try_from(timeout).map_err(|_| {
				ConfigError::InvalidEndpoint { reason: "timeout must be positive".into() }
			})?;

			builder = builder.timeout(timeout);
		}

		Ok(Self(builder.build()?))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl SoapTransport for ReqwestTransport {
	fn post(&self, request: SoapRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			let response = self
				.0
				.post(request.url)
				.header(reqwest::header::CONTENT_TYPE, "text/xml; charset=utf-8")
				.header("SOAPAction", request.action)
				.body(request.body)
				.send()
				.await?;
			let status = response.status().as_u16();
			let body = response.text().await?;

			Ok::<_, TransportError>(SoapResponse { status, body })
		})
	}
}

/// Builds the request for `config`'s endpoint.
pub(crate) fn request_for(
	config: &EndpointConfig,
	action: &'static str,
	body: String,
) -> Result<SoapRequest> {
	Ok(SoapRequest { url: config.url()?, action, body })
}
