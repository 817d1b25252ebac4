//! Crate-level error types shared by the lifecycle manager, query builder, and probe.
//!
//! [`Error`] is `Clone`: refresh waiters attached to a single in-flight operation all
//! observe the identical outcome, so failure sources are held behind [`Arc`] instead of
//! the more common boxed trait object.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type SharedError = Arc<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Clone, Debug, ThisError)]
pub enum Error {
	/// No token has ever been acquired by the manager.
	#[error("No token has been acquired; complete the authorization-code flow first.")]
	NotAuthenticated,
	/// The authorization-code exchange was rejected by the token endpoint.
	#[error("Authorization-code exchange was rejected (HTTP {status}): {body}")]
	ExchangeFailed {
		/// HTTP status returned by the token endpoint.
		status: u16,
		/// Raw upstream error body, surfaced verbatim.
		body: String,
	},
	/// The refresh was rejected for a non-expiry reason; the caller may retry.
	#[error("Token refresh was rejected (HTTP {status}): {body}")]
	RefreshFailed {
		/// HTTP status returned by the token endpoint.
		status: u16,
		/// Raw upstream error body, surfaced verbatim.
		body: String,
	},
	/// The refresh token itself has expired; the current credential is unrecoverable.
	#[error("The refresh token has expired; restart the authorization-code flow.")]
	RefreshTokenExpired,
	/// The revocation endpoint rejected the request.
	#[error("Token revocation was rejected (HTTP {status}): {body}")]
	RevokeFailed {
		/// HTTP status returned by the revocation endpoint.
		status: u16,
		/// Raw upstream error body, surfaced verbatim.
		body: String,
	},
	/// A 2xx response was missing expected fields or was not valid JSON.
	#[error(transparent)]
	Malformed(#[from] MalformedResponse),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
}

/// A well-formed HTTP status paired with a body that could not be decoded.
///
/// Carries the JSON path that failed so callers can tell which field the upstream
/// omitted or mistyped.
#[derive(Clone, Debug, ThisError)]
#[error("Token endpoint returned a malformed body.")]
pub struct MalformedResponse {
	/// Structured parsing failure, including the JSON path that failed.
	#[source]
	pub source: Arc<serde_path_to_error::Error<serde_json::Error>>,
}
impl MalformedResponse {
	/// Wraps a path-annotated deserialization failure.
	pub fn new(source: serde_path_to_error::Error<serde_json::Error>) -> Self {
		Self { source: Arc::new(source) }
	}
}

/// Transport-level failures (network, IO).
#[derive(Clone, Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the upstream endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: SharedError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Arc::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Configuration and validation failures raised before any network access.
#[derive(Clone, Debug, ThisError)]
pub enum ConfigError {
	/// Environment contains a URL that does not parse.
	#[error("Environment endpoint URL is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// An identifier failed validation.
	#[error(transparent)]
	InvalidIdentifier(#[from] crate::auth::IdentifierError),
	/// A scope set failed validation.
	#[error(transparent)]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
}
