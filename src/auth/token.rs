//! Bearer-credential record with independent access and refresh expiries.

// self
use crate::{
	_prelude::*,
	auth::{RealmId, Secret},
};

/// Immutable bearer-credential record bound to one company realm.
///
/// A token is created by exchanging an authorization code, wholesale-replaced by a
/// refresh, and held exclusively by one lifecycle manager; it has no independent
/// lifecycle of its own. The two expiries are independent: the access token goes stale
/// within the hour while the refresh token survives for months.
///
/// Serializable so callers can persist credential state externally between process
/// runs; this crate never persists anything itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
	/// Token type reported by the endpoint (in practice always `bearer`).
	pub token_type: String,
	/// Access token secret; callers must avoid logging it.
	pub access_token: Secret,
	/// Instant the access token stops being usable.
	pub access_expires_at: OffsetDateTime,
	/// Refresh token secret used solely to mint a new access token.
	pub refresh_token: Secret,
	/// Instant the refresh token stops being usable.
	pub refresh_expires_at: OffsetDateTime,
	/// Company realm bound to this credential pair.
	pub realm: RealmId,
}
impl Token {
	/// Returns true while the access token remains usable at `instant`.
	///
	/// The margin shrinks the window so a token is not treated as valid when it would
	/// expire mid-request.
	pub fn access_valid_at(&self, instant: OffsetDateTime, margin: Duration) -> bool {
		instant + margin < self.access_expires_at
	}

	/// Returns true while the refresh token remains usable at `instant`.
	pub fn refresh_valid_at(&self, instant: OffsetDateTime) -> bool {
		instant < self.refresh_expires_at
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn fixture() -> Token {
		Token {
			token_type: "bearer".into(),
			access_token: Secret::new("at-1"),
			access_expires_at: macros::datetime!(2025-01-01 01:00 UTC),
			refresh_token: Secret::new("rt-1"),
			refresh_expires_at: macros::datetime!(2025-01-02 00:00 UTC),
			realm: RealmId::new("9130000000000").expect("Realm fixture should be valid."),
		}
	}

	#[test]
	fn access_validity_honors_margin() {
		let token = fixture();
		let just_before = macros::datetime!(2025-01-01 00:59:30 UTC);

		assert!(token.access_valid_at(just_before, Duration::ZERO));
		assert!(
			!token.access_valid_at(just_before, Duration::seconds(60)),
			"A token expiring within the margin must not count as valid.",
		);
		assert!(!token.access_valid_at(macros::datetime!(2025-01-01 01:00 UTC), Duration::ZERO));
	}

	#[test]
	fn refresh_validity_is_margin_free() {
		let token = fixture();

		assert!(token.refresh_valid_at(macros::datetime!(2025-01-01 23:59 UTC)));
		assert!(!token.refresh_valid_at(macros::datetime!(2025-01-02 00:00 UTC)));
	}

	#[test]
	fn debug_output_redacts_secrets() {
		let rendered = format!("{:?}", fixture());

		assert!(!rendered.contains("at-1"));
		assert!(!rendered.contains("rt-1"));
		assert!(rendered.contains("<redacted>"));
	}
}
