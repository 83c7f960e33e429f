// self
use crate::{
	_prelude::*,
	handler::{HandlerChain, StatusExtractor, TimestampInjector},
	http::SoapTransport,
	obs::{self, OperationKind, OperationOutcome, OperationSpan},
	soap::rst::{self, RequestKind},
	sts::StsClient,
	token::Token,
};

impl<T> StsClient<T>
where
	T: ?Sized + SoapTransport,
{
	/// Asks the STS whether `token` is currently valid.
	///
	/// The request is not signed. A response without a status code counts as invalid.
	pub async fn validate(&self, token: &Token) -> Result<bool> {
		const KIND: OperationKind = OperationKind::Validate;

		let span = OperationSpan::new(KIND, "validate");

		obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

		let result = span
			.instrument(async move {
				let extractor = StatusExtractor::new();
				let chain = HandlerChain::new()
					.with(TimestampInjector::new(self.config.request_validity))
					.with(extractor.clone());

				self.invoke(RequestKind::Validate, rst::validate(token), &chain).await?;

				Ok(extractor
					.slot()
					.take()
					.is_some_and(|code| StatusExtractor::is_valid_code(&code)))
			})
			.await;

		match &result {
			Ok(_) => obs::record_operation_outcome(KIND, OperationOutcome::Success),
			Err(_) => obs::record_operation_outcome(KIND, OperationOutcome::Failure),
		}

		result
	}
}
