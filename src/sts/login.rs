// self
use crate::{
	_prelude::*,
	authn::Authenticator,
	handler::TokenExtractor,
	http::SoapTransport,
	obs::{self, OperationOutcome, OperationSpan},
	soap::rst::RequestKind,
	sts::{self, StsClient},
	token::Token,
};

impl<T> StsClient<T>
where
	T: ?Sized + SoapTransport,
{
	/// Acquires a token with `authenticator`.
	///
	/// Returns `Ok(None)` when the STS answered without a token in the expected place.
	pub async fn login(&self, authenticator: &Authenticator) -> Result<Option<Token>> {
		let kind = authenticator.kind();
		let span = OperationSpan::new(kind, "login");

		obs::record_operation_outcome(kind, OperationOutcome::Attempt);

		let result = span
			.instrument(async move {
				let extractor = TokenExtractor::new();
				let chain =
					authenticator.handler_chain(self.config.request_validity, &extractor)?;
				let request = authenticator.request(OffsetDateTime::now_utc());

				self.invoke(RequestKind::Issue, request, &chain).await?;

				Ok(extractor.slot().take())
			})
			.await;

		sts::record_token_outcome(kind, &result);

		result
	}
}
