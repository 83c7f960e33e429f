//! Optional observability helpers for STS operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `wstrust.operation` with the `operation`
//!   and `stage` (call site) fields, plus `warn`/`debug` events for signing aborts and
//!   extraction misses.
//! - Enable `metrics` to increment the `wstrust_operation_total` counter for every
//!   attempt/success/empty/failure, labeled by `operation` + `outcome`, and the
//!   `wstrust_extraction_miss_total` counter labeled by `extractor`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// STS operations observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
	/// Bearer token issued from a username and password.
	BearerIssue,
	/// Holder-of-key token issued from a username, password, and key pair.
	HolderOfKeyIssue,
	/// Holder-of-key token issued in exchange for an existing one.
	HolderOfKeyExchange,
	/// Token renewal.
	Renew,
	/// Token validation.
	Validate,
}
impl OperationKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationKind::BearerIssue => "bearer_issue",
			OperationKind::HolderOfKeyIssue => "holder_of_key_issue",
			OperationKind::HolderOfKeyExchange => "holder_of_key_exchange",
			OperationKind::Renew => "renew",
			OperationKind::Validate => "validate",
		}
	}
}
impl Display for OperationKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationOutcome {
	/// Entry to an STS operation.
	Attempt,
	/// The STS answered and the expected result was extracted.
	Success,
	/// The STS answered but no token could be extracted.
	Empty,
	/// Failure propagated back to the caller.
	Failure,
}
impl OperationOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationOutcome::Attempt => "attempt",
			OperationOutcome::Success => "success",
			OperationOutcome::Empty => "empty",
			OperationOutcome::Failure => "failure",
		}
	}
}
impl Display for OperationOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Logs and counts an STS response that lacked the element `extractor` looks for.
pub fn record_extraction_miss(extractor: &'static str, missing: &str) {
	log_extraction_miss(extractor, missing);
	count_extraction_miss(extractor);
}
