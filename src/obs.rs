//! Optional observability helpers for lifecycle and query flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured `ledgerlink.flow` events carrying the `flow`
//!   (operation) and `outcome` fields.
//! - Enable `metrics` to increment the `ledgerlink_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`.

// self
use crate::_prelude::*;

/// Flow kinds observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Authorization-code exchange.
	Exchange,
	/// Refresh-token rotation.
	Refresh,
	/// Refresh-token revocation.
	Revoke,
	/// Pagination lookahead probe.
	Probe,
}
impl FlowKind {
	/// Returns a stable label suitable for event or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Exchange => "exchange",
			FlowKind::Refresh => "refresh",
			FlowKind::Revoke => "revoke",
			FlowKind::Probe => "probe",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a flow helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller (or absorbed, for the probe).
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for event or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Records one flow observation through whichever sinks are enabled.
pub fn record_flow(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "tracing")]
	tracing::debug!(flow = kind.as_str(), outcome = outcome.as_str(), "ledgerlink.flow");
	#[cfg(feature = "metrics")]
	metrics::counter!(
		"ledgerlink_flow_total",
		"flow" => kind.as_str(),
		"outcome" => outcome.as_str(),
	)
	.increment(1);
	#[cfg(not(any(feature = "tracing", feature = "metrics")))]
	let _ = (kind, outcome);
}
