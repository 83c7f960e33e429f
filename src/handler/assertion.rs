// self
use crate::{_prelude::*, handler::SoapHandler, soap::SoapEnvelope, token::Token};

/// Places an existing assertion verbatim in outgoing security headers.
///
/// Used when exchanging a holder-of-key token, so the STS can resolve the signature's
/// `KeyIdentifier` against the presented assertion.
#[derive(Clone, Debug)]
pub struct AssertionInjector {
	token: Token,
}
impl AssertionInjector {
	/// Creates an injector presenting `token`.
	pub fn new(token: Token) -> Self {
		Self { token }
	}
}
impl SoapHandler for AssertionInjector {
	fn name(&self) -> &'static str {
		"assertion"
	}

	fn handle_outbound(&self, envelope: &mut SoapEnvelope) -> Result<()> {
		envelope.ensure_security().push(self.token.to_fragment());

		Ok(())
	}
}
