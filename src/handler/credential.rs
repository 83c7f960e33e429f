// self
use crate::{
	_prelude::*,
	credentials::UserCredentials,
	handler::SoapHandler,
	ns,
	soap::SoapEnvelope,
	xml::Element,
};

/// `wsse:Password` type for plaintext passwords.
pub const PASSWORD_TEXT: &str = "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-username-token-profile-1.0#PasswordText";

/// Appends a `wsse:UsernameToken` with a plaintext password to outgoing security headers.
#[derive(Clone, Debug)]
pub struct CredentialInjector {
	credentials: UserCredentials,
}
impl CredentialInjector {
	/// Creates an injector presenting `credentials`.
	pub fn new(credentials: UserCredentials) -> Self {
		Self { credentials }
	}

	fn username_token(&self) -> Element {
		Element::new(ns::WSSE_PREFIX, "UsernameToken", ns::WSSE)
			.with_child(
				Element::new(ns::WSSE_PREFIX, "Username", ns::WSSE)
					.with_text(self.credentials.username.clone()),
			)
			.with_child(
				Element::new(ns::WSSE_PREFIX, "Password", ns::WSSE)
					.with_attr("Type", PASSWORD_TEXT)
					.with_text(self.credentials.password.expose()),
			)
	}
}
impl SoapHandler for CredentialInjector {
	fn name(&self) -> &'static str {
		"credentials"
	}

	fn handle_outbound(&self, envelope: &mut SoapEnvelope) -> Result<()> {
		envelope.ensure_security().push(self.username_token());

		Ok(())
	}
}
