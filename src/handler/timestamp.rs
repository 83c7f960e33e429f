// self
use crate::{
	_prelude::*,
	handler::SoapHandler,
	ns,
	soap::{self, SoapEnvelope},
	xml::Element,
};

/// Default validity window of an outgoing request.
pub const DEFAULT_REQUEST_VALIDITY: Duration = Duration::minutes(10);

/// Appends a `wsu:Timestamp` (`Created`/`Expires`, UTC) to outgoing security headers.
///
/// Every stamp carries a fresh `wsu:Id`, which the request signer reuses as the timestamp
/// reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimestampInjector {
	validity: Duration,
}
impl TimestampInjector {
	/// Creates an injector whose stamps expire `validity` after creation.
	pub fn new(validity: Duration) -> Self {
		Self { validity }
	}

	/// Configured validity window.
	pub fn validity(&self) -> Duration {
		self.validity
	}

	/// Stamps `envelope` as created at `now` and returns the timestamp id.
	pub fn stamp(&self, envelope: &mut SoapEnvelope, now: OffsetDateTime) -> String {
		let id = soap::fresh_id();
		let timestamp = Element::new(ns::WSU_PREFIX, "Timestamp", ns::WSU)
			.with_ns_attr(ns::WSU_PREFIX, "Id", ns::WSU, id.clone())
			.with_child(
				Element::new(ns::WSU_PREFIX, "Created", ns::WSU).with_text(soap::format_instant(now)),
			)
			.with_child(
				Element::new(ns::WSU_PREFIX, "Expires", ns::WSU)
					.with_text(soap::format_instant(now + self.validity)),
			);

		envelope.ensure_security().push(timestamp);

		id
	}
}
impl Default for TimestampInjector {
	fn default() -> Self {
		Self::new(DEFAULT_REQUEST_VALIDITY)
	}
}
impl SoapHandler for TimestampInjector {
	fn name(&self) -> &'static str {
		"timestamp"
	}

	fn handle_outbound(&self, envelope: &mut SoapEnvelope) -> Result<()> {
		self.stamp(envelope, OffsetDateTime::now_utc());

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;

	fn envelope() -> SoapEnvelope {
		SoapEnvelope::new(Element::new(ns::WST_PREFIX, "RequestSecurityToken", ns::WST))
	}

	#[test]
	fn stamp_renders_utc_window_with_returned_id() {
		let mut envelope = envelope();
		let id = TimestampInjector::new(Duration::minutes(5))
			.stamp(&mut envelope, datetime!(2026-10-18 14:00 +02:00));
		let timestamp = envelope
			.security()
			.and_then(|security| security.child(ns::WSU, "Timestamp"))
			.expect("Timestamp should be appended to the security header.");

		assert_eq!(timestamp.attr_ns(ns::WSU, "Id"), Some(id.as_str()));
		assert_eq!(
			timestamp.child(ns::WSU, "Created").map(Element::text).as_deref(),
			Some("2026-10-18T12:00:00.000Z")
		);
		assert_eq!(
			timestamp.child(ns::WSU, "Expires").map(Element::text).as_deref(),
			Some("2026-10-18T12:05:00.000Z")
		);
	}

	#[test]
	fn sequential_stamps_never_share_an_id() {
		let injector = TimestampInjector::default();
		let first = injector.stamp(&mut envelope(), OffsetDateTime::now_utc());
		let second = injector.stamp(&mut envelope(), OffsetDateTime::now_utc());

		assert_ne!(first, second);
		assert_eq!(injector.validity(), Duration::minutes(10));
	}
}
