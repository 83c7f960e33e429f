// self
use crate::{error::SigningPreconditionError, obs::OperationKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOperation<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOperation<F> = F;

/// A span builder used by STS operations.
#[derive(Clone, Debug)]
pub struct OperationSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OperationSpan {
	/// Creates a new span tagged with the provided operation kind + stage.
	pub fn new(kind: OperationKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("wstrust.operation", operation = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOperation<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Logs a signing attempt that stopped because an input was missing.
pub fn record_signing_abort(signer: &'static str, reason: &SigningPreconditionError) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(signer, %reason, "Request signing aborted.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (signer, reason);
	}
}

/// Logs an STS response that did not contain the expected element.
pub fn log_extraction_miss(extractor: &'static str, missing: &str) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(extractor, missing, "STS response did not contain the expected element.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (extractor, missing);
	}
}
