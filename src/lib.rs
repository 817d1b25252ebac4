//! Async core for the QuickBooks Online accounting API—expiry-aware token lifecycle with
//! single-flight refreshes, literal-syntax query construction, and lookahead pagination probing.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod clock;
pub mod env;
pub mod error;
pub mod http;
pub mod manager;
pub mod obs;
pub mod query;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{ClientId, RealmId, ScopeSet, Secret, Token},
		clock::{Clock, ManualClock},
		env::ApiEnvironment,
		http::ReqwestTransport,
		manager::TokenManager,
	};

	/// Manager type alias used by reqwest-backed integration tests.
	pub type ReqwestTestManager = TokenManager<ReqwestTransport>;

	/// Builds a reqwest transport that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_transport() -> ReqwestTransport {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure reqwest client for tests.");

		ReqwestTransport::with_client(client)
	}

	/// Builds an [`ApiEnvironment`] whose endpoints all point at a mock server base URL.
	pub fn test_environment(base: &str) -> ApiEnvironment {
		ApiEnvironment::custom(
			&format!("{base}/authorize"),
			&format!("{base}/token"),
			&format!("{base}/revoke"),
			base,
		)
		.expect("Test environment should build from mock server URLs.")
	}

	/// Constructs a [`TokenManager`] wired to the insecure test transport and a manual clock.
	pub fn build_test_manager(env: ApiEnvironment, clock: Arc<ManualClock>) -> ReqwestTestManager {
		let client_id =
			ClientId::new("client-test").expect("Client identifier fixture should be valid.");
		let scopes = ScopeSet::new(["com.intuit.quickbooks.accounting"])
			.expect("Scope fixture should be valid.");
		let redirect_uri = Url::parse("https://example.com/callback")
			.expect("Redirect URI fixture should parse successfully.");

		TokenManager::with_transport(
			env,
			client_id,
			"secret-test",
			redirect_uri,
			scopes,
			test_reqwest_transport(),
		)
		.with_clock(clock as Arc<dyn Clock>)
	}

	/// Builds a token fixture with the provided expiries, bound to `realm`.
	pub fn seed_token(
		realm: &str,
		access_expires_at: OffsetDateTime,
		refresh_expires_at: OffsetDateTime,
	) -> Token {
		Token {
			token_type: "bearer".into(),
			access_token: Secret::new("access-seed"),
			access_expires_at,
			refresh_token: Secret::new("refresh-seed"),
			refresh_expires_at,
			realm: RealmId::new(realm).expect("Realm fixture should be valid."),
		}
	}
}

mod _prelude {
	pub use std::{
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {httpmock as _, ledgerlink as _};
