// self
use crate::obs::{FlowKind, FlowOutcome};

/// Records a login flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"review_api_bdd_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records the outcome of a single scenario step (when enabled).
pub fn record_step_outcome(outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("review_api_bdd_step_total", "outcome" => outcome.as_str()).increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = outcome;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recorders_are_safe_without_a_global_recorder() {
		record_flow_outcome(FlowKind::AuthorizationCode, FlowOutcome::Failure);
		record_step_outcome(FlowOutcome::Success);
	}
}
