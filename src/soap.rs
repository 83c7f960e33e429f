//! SOAP 1.1 envelopes and the WS-Trust request bodies sent to the STS.

pub mod rst;

mod envelope;

pub use envelope::*;

// self
use crate::_prelude::*;

/// Formats an instant as `yyyy-MM-ddTHH:mm:ss.SSSZ` in UTC, the form used by WS-Security
/// timestamps and WS-Trust lifetimes.
pub fn format_instant(instant: OffsetDateTime) -> String {
	let utc = instant.to_offset(time::UtcOffset::UTC);

	format!(
		"{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
		utc.year(),
		u8::from(utc.month()),
		utc.day(),
		utc.hour(),
		utc.minute(),
		utc.second(),
		utc.millisecond(),
	)
}

/// Generates a fresh XML identifier (`_` followed by a random UUID).
pub fn fresh_id() -> String {
	format!("_{}", uuid::Uuid::new_v4())
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;

	#[test]
	fn instants_render_in_utc_with_milliseconds() {
		assert_eq!(
			format_instant(datetime!(2026-10-18 12:34:56.789 +02:00)),
			"2026-10-18T10:34:56.789Z"
		);
		assert_eq!(format_instant(datetime!(2026-01-02 03:04:05 UTC)), "2026-01-02T03:04:05.000Z");
	}

	#[test]
	fn fresh_ids_are_unique_ncnames() {
		let first = fresh_id();
		let second = fresh_id();

		assert_ne!(first, second);
		assert!(first.starts_with('_'));
		assert_eq!(first.len(), 37);
	}
}
