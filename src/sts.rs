//! STS client facade.
//!
//! [`StsClient`] owns the endpoint configuration and a transport. Every operation assembles
//! its own handler chain, runs the outbound handlers, posts the envelope, maps SOAP faults
//! and HTTP failures, then runs the inbound handlers over the parsed response.

mod login;
mod renew;
mod validate;

// self
use crate::{
	_prelude::*,
	config::EndpointConfig,
	error::TransportError,
	handler::HandlerChain,
	http::{self, SoapTransport},
	obs::{self, OperationKind, OperationOutcome},
	soap::{SoapEnvelope, rst::RequestKind},
	token::Token,
	xml::Element,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

/// Client specialized for the crate's default reqwest transport.
#[cfg(feature = "reqwest")]
pub type ReqwestStsClient = StsClient<ReqwestTransport>;

/// Client of a single Security Token Service.
///
/// Cloning is cheap; clones share the configuration and transport. No mutable state is kept
/// between calls.
pub struct StsClient<T>
where
	T: ?Sized + SoapTransport,
{
	config: Arc<EndpointConfig>,
	transport: Arc<T>,
}
impl<T> StsClient<T>
where
	T: ?Sized + SoapTransport,
{
	/// Creates a client that posts through `transport`.
	pub fn with_transport(config: EndpointConfig, transport: impl Into<Arc<T>>) -> Result<Self> {
		config.validate()?;

		Ok(Self { config: Arc::new(config), transport: transport.into() })
	}

	/// Endpoint configuration.
	pub fn config(&self) -> &EndpointConfig {
		&self.config
	}

	/// Runs one SOAP exchange through `chain` and returns the parsed response.
	///
	/// SOAP faults become [`Error::Fault`]; other non-2xx responses become
	/// [`TransportError::Status`]. Inbound handlers only see successful responses.
	pub async fn invoke(
		&self,
		kind: RequestKind,
		payload: Element,
		chain: &HandlerChain,
	) -> Result<SoapEnvelope> {
		let snapshot = chain.snapshot();
		let mut envelope = SoapEnvelope::new(payload);

		snapshot.process_outbound(&mut envelope)?;

		let request = http::request_for(&self.config, kind.soap_action(), envelope.to_xml())?;
		let response = self.transport.post(request).await?;
		let success = response.is_success();
		let status = response.status;
		let envelope = match SoapEnvelope::parse(response.body) {
			Ok(envelope) => envelope,
			Err(_) if !success => return Err(TransportError::Status { status }.into()),
			Err(source) => return Err(TransportError::MalformedEnvelope { source }.into()),
		};

		if let Some(fault) = envelope.fault() {
			return Err(Error::Fault { code: fault.code, reason: fault.reason });
		}
		if !success {
			return Err(TransportError::Status { status }.into());
		}

		snapshot.process_inbound(&envelope)?;

		Ok(envelope)
	}
}
#[cfg(feature = "reqwest")]
impl StsClient<ReqwestTransport> {
	/// Creates a client with a reqwest transport built from `config`.
	pub fn new(config: EndpointConfig) -> Result<Self> {
		let transport = ReqwestTransport::from_config(&config)?;

		Self::with_transport(config, transport)
	}
}
impl<T> Clone for StsClient<T>
where
	T: ?Sized + SoapTransport,
{
	fn clone(&self) -> Self {
		Self { config: self.config.clone(), transport: self.transport.clone() }
	}
}
impl<T> Debug for StsClient<T>
where
	T: ?Sized + SoapTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StsClient").field("config", &self.config).finish_non_exhaustive()
	}
}

fn record_token_outcome(kind: OperationKind, result: &Result<Option<Token>>) {
	let outcome = match result {
		Ok(Some(_)) => OperationOutcome::Success,
		Ok(None) => OperationOutcome::Empty,
		Err(_) => OperationOutcome::Failure,
	};

	obs::record_operation_outcome(kind, outcome);
}
