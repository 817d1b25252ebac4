//! Lookahead pagination probe.
//!
//! The probe is advisory, never authoritative: it issues one extra request for the
//! next page window and reports whether anything came back, without keeping a cursor.
//! Every failure along the way absorbs to `false` so a broken probe can never be
//! mistaken for an authoritative empty result.

// self
use crate::{
	_prelude::*,
	auth::Token,
	env::ApiEnvironment,
	http::ApiTransport,
	obs::{self, FlowKind, FlowOutcome},
	query::QueryBuilder,
};

/// Page size assumed when the caller's query does not set `maxresults`.
const DEFAULT_PAGE_SIZE: i64 = 100;

/// Decides whether a further page of results would be non-empty.
///
/// Stateless between calls. Each probe derives the lookahead window from the caller's
/// query by advancing `startposition` one full page past the current window.
pub struct PaginationProbe<T>
where
	T: ?Sized + ApiTransport,
{
	transport: Arc<T>,
	env: ApiEnvironment,
}
impl<T> PaginationProbe<T>
where
	T: ?Sized + ApiTransport,
{
	/// Creates a probe sharing the caller's transport.
	pub fn new(env: ApiEnvironment, transport: impl Into<Arc<T>>) -> Self {
		Self { transport: transport.into(), env }
	}

	/// Reports whether the page after `query`'s window holds any results.
	///
	/// Runs only when the query opted into automatic pagination checks via
	/// [`SearchOptions::with_auto_paginate`](crate::query::SearchOptions::with_auto_paginate);
	/// otherwise returns `false` with zero network access. Transport failures, non-2xx
	/// statuses, and malformed bodies all absorb to `false`.
	pub async fn has_next_page(&self, token: &Token, query: &QueryBuilder) -> bool {
		if !query.options().auto_paginate() {
			return false;
		}

		obs::record_flow(FlowKind::Probe, FlowOutcome::Attempt);

		match self.lookahead(token, query).await {
			Some(has_more) => {
				obs::record_flow(FlowKind::Probe, FlowOutcome::Success);

				has_more
			},
			None => {
				obs::record_flow(FlowKind::Probe, FlowOutcome::Failure);

				false
			},
		}
	}

	async fn lookahead(&self, token: &Token, query: &QueryBuilder) -> Option<bool> {
		let options = query.options();
		let page = options.max_results().unwrap_or(DEFAULT_PAGE_SIZE);
		let start = options.start_position().unwrap_or(0);
		// The lookahead window begins one full page past the caller's window.
		let lookahead = query.clone().search_options(
			options.clone().with_start_position(start + page).with_max_results(page),
		);
		let url = lookahead.build(&self.env.company_base(&token.realm));
		let response = self.transport.get_bearer(&url, token.access_token.expose()).await.ok()?;

		if !response.is_success() {
			return None;
		}

		let body: serde_json::Value = serde_json::from_slice(&response.body).ok()?;

		Some(contains_results(&body))
	}
}
impl<T> Debug for PaginationProbe<T>
where
	T: ?Sized + ApiTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PaginationProbe").field("env", &self.env).finish()
	}
}

/// True when the response's `QueryResponse` section holds at least one entity row.
fn contains_results(body: &serde_json::Value) -> bool {
	body.get("QueryResponse").and_then(serde_json::Value::as_object).is_some_and(|section| {
		section.values().any(|value| value.as_array().is_some_and(|rows| !rows.is_empty()))
	})
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::VecDeque;
	// crates.io
	use time::macros;
	// self
	use super::*;
	use crate::{
		auth::{RealmId, Secret},
		error::TransportError,
		http::{HttpResponseParts, TransportFuture},
		query::{Entity, SearchOptions},
	};

	struct StubTransport {
		responses: Mutex<VecDeque<HttpResponseParts>>,
		requests: Mutex<Vec<String>>,
	}
	impl StubTransport {
		fn with_responses(responses: impl IntoIterator<Item = HttpResponseParts>) -> Arc<Self> {
			Arc::new(Self {
				responses: Mutex::new(responses.into_iter().collect()),
				requests: Mutex::new(Vec::new()),
			})
		}

		fn requests(&self) -> Vec<String> {
			self.requests.lock().clone()
		}
	}
	impl ApiTransport for StubTransport {
		fn post_form<'a>(
			&'a self,
			url: &'a str,
			_form: &'a [(&'a str, &'a str)],
		) -> TransportFuture<'a, HttpResponseParts> {
			Box::pin(async move {
				self.requests.lock().push(url.to_owned());

				Err(TransportError::network(std::io::Error::other("probe never posts")))
			})
		}

		fn get_bearer<'a>(
			&'a self,
			url: &'a str,
			_access_token: &'a str,
		) -> TransportFuture<'a, HttpResponseParts> {
			Box::pin(async move {
				self.requests.lock().push(url.to_owned());

				self.responses.lock().pop_front().ok_or_else(|| {
					TransportError::network(std::io::Error::other("no scripted response"))
				})
			})
		}
	}

	fn token() -> Token {
		Token {
			token_type: "bearer".into(),
			access_token: Secret::new("at-probe"),
			access_expires_at: macros::datetime!(2025-03-01 01:00 UTC),
			refresh_token: Secret::new("rt-probe"),
			refresh_expires_at: macros::datetime!(2025-06-01 00:00 UTC),
			realm: RealmId::new("4620816365").expect("Realm fixture should be valid."),
		}
	}

	fn env() -> ApiEnvironment {
		ApiEnvironment::custom(
			"https://auth.test/oauth2",
			"https://token.test/bearer",
			"https://token.test/revoke",
			"https://api.test",
		)
		.expect("Probe test environment should build.")
	}

	fn page(status: u16, body: &str) -> HttpResponseParts {
		HttpResponseParts { status, body: body.as_bytes().to_vec() }
	}

	#[tokio::test]
	async fn opt_out_skips_the_network_entirely() {
		let transport = StubTransport::with_responses([]);
		let probe: PaginationProbe<StubTransport> = PaginationProbe::new(env(), transport.clone());
		let query = QueryBuilder::new(Entity::Invoice);

		assert!(!probe.has_next_page(&token(), &query).await);
		assert!(transport.requests().is_empty());
	}

	#[tokio::test]
	async fn lookahead_advances_start_by_one_page() {
		let transport =
			StubTransport::with_responses([page(200, "{\"QueryResponse\":{\"Invoice\":[{}]}}")]);
		let probe: PaginationProbe<StubTransport> = PaginationProbe::new(env(), transport.clone());
		let query = QueryBuilder::new(Entity::Invoice).search_options(
			SearchOptions::new().with_start_position(1).with_max_results(25).with_auto_paginate(true),
		);

		assert!(probe.has_next_page(&token(), &query).await);

		let requests = transport.requests();

		assert_eq!(requests.len(), 1);
		assert_eq!(
			requests[0],
			"https://api.test/v3/company/4620816365/query?query=select * from invoice startposition 26 maxresults 25",
		);
	}

	#[tokio::test]
	async fn default_page_size_applies_when_unset() {
		let transport = StubTransport::with_responses([page(200, "{\"QueryResponse\":{}}")]);
		let probe: PaginationProbe<StubTransport> = PaginationProbe::new(env(), transport.clone());
		let query = QueryBuilder::new(Entity::Bill)
			.search_options(SearchOptions::new().with_auto_paginate(true));

		assert!(!probe.has_next_page(&token(), &query).await);
		assert!(transport.requests()[0].ends_with("startposition 100 maxresults 100"));
	}

	#[tokio::test]
	async fn upstream_failure_absorbs_to_false() {
		let transport = StubTransport::with_responses([page(500, "oops")]);
		let probe: PaginationProbe<StubTransport> = PaginationProbe::new(env(), transport.clone());
		let query = QueryBuilder::new(Entity::Invoice)
			.search_options(SearchOptions::new().with_auto_paginate(true));

		assert!(!probe.has_next_page(&token(), &query).await);
	}

	#[tokio::test]
	async fn malformed_body_absorbs_to_false() {
		let transport = StubTransport::with_responses([page(200, "<html>not json</html>")]);
		let probe: PaginationProbe<StubTransport> = PaginationProbe::new(env(), transport.clone());
		let query = QueryBuilder::new(Entity::Invoice)
			.search_options(SearchOptions::new().with_auto_paginate(true));

		assert!(!probe.has_next_page(&token(), &query).await);
	}

	#[tokio::test]
	async fn transport_error_absorbs_to_false() {
		let transport = StubTransport::with_responses([]);
		let probe: PaginationProbe<StubTransport> = PaginationProbe::new(env(), transport.clone());
		let query = QueryBuilder::new(Entity::Invoice)
			.search_options(SearchOptions::new().with_auto_paginate(true));

		assert!(!probe.has_next_page(&token(), &query).await);
		assert_eq!(transport.requests().len(), 1);
	}

	#[test]
	fn result_detection_checks_every_entity_array() {
		let populated: serde_json::Value =
			serde_json::from_str("{\"QueryResponse\":{\"startPosition\":1,\"Bill\":[{\"Id\":\"1\"}]}}")
				.expect("Fixture JSON should parse.");
		let empty: serde_json::Value =
			serde_json::from_str("{\"QueryResponse\":{\"startPosition\":1,\"Bill\":[]}}")
				.expect("Fixture JSON should parse.");
		let missing: serde_json::Value =
			serde_json::from_str("{\"time\":\"2025-03-01T00:00:00Z\"}")
				.expect("Fixture JSON should parse.");

		assert!(contains_results(&populated));
		assert!(!contains_results(&empty));
		assert!(!contains_results(&missing));
	}
}
