// self
use crate::{
	_prelude::*,
	authn::{self, DEFAULT_TOKEN_LIFETIME},
	credentials::SigningCredentials,
	handler::{HandlerChain, TimestampInjector, TokenExtractor},
	http::SoapTransport,
	obs::{self, OperationKind, OperationOutcome, OperationSpan},
	signer::CertificateKeyedSigner,
	soap::rst::{self, Lifetime, RequestKind},
	sts::{self, StsClient},
	token::Token,
};

impl<T> StsClient<T>
where
	T: ?Sized + SoapTransport,
{
	/// Renews `token`, signing the request with the key pair it is bound to.
	///
	/// `lifetime` is the extended validity requested; [`DEFAULT_TOKEN_LIFETIME`] when `None`.
	/// Returns `Ok(None)` when the STS answered without a token.
	pub async fn renew(
		&self,
		token: &Token,
		signing: &SigningCredentials,
		lifetime: Option<Duration>,
	) -> Result<Option<Token>> {
		const KIND: OperationKind = OperationKind::Renew;

		let span = OperationSpan::new(KIND, "renew");

		obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

		let result = span
			.instrument(async move {
				authn::ensure_key_bound(token, signing)?;

				let extractor = TokenExtractor::new();
				let chain = HandlerChain::new()
					.with(TimestampInjector::new(self.config.request_validity))
					.with(CertificateKeyedSigner::new(signing))
					.with(extractor.clone());
				let request = rst::renew(
					token,
					Lifetime::starting_at(
						OffsetDateTime::now_utc(),
						lifetime.unwrap_or(DEFAULT_TOKEN_LIFETIME),
					),
				);

				self.invoke(RequestKind::Renew, request, &chain).await?;

				Ok(extractor.slot().take())
			})
			.await;

		sts::record_token_outcome(KIND, &result);

		result
	}
}
