//! Counters for STS round trips.
//!
//! `wstrust_operation_total` counts every Issue, Renew, and Validate call per stage, so
//! `attempt - success - empty - failure` is the number of calls still in flight.
//! `wstrust_extraction_miss_total` counts STS responses that answered without the element an
//! extractor looks for, labeled by extractor (`token` or `status`).

// self
use crate::obs::{OperationKind, OperationOutcome};

/// Counts one stage of an STS operation.
pub fn record_operation_outcome(kind: OperationKind, outcome: OperationOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"wstrust_operation_total",
			"operation" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Counts an STS response the named extractor found nothing in.
pub fn count_extraction_miss(extractor: &'static str) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("wstrust_extraction_miss_total", "extractor" => extractor).increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = extractor;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn counters_accept_every_label() {
		for kind in [
			OperationKind::BearerIssue,
			OperationKind::HolderOfKeyIssue,
			OperationKind::HolderOfKeyExchange,
			OperationKind::Renew,
			OperationKind::Validate,
		] {
			record_operation_outcome(kind, OperationOutcome::Attempt);
			record_operation_outcome(kind, OperationOutcome::Failure);
		}

		count_extraction_miss("token");
		count_extraction_miss("status");
	}
}
