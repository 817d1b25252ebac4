//! Authorization-request construction for the browser-redirect leg of the
//! authorization-code flow.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	auth::{ClientId, ScopeSet},
};

const STATE_LEN: usize = 32;

/// Ephemeral hand-off describing one authorization redirect.
///
/// Produced on demand and never persisted by this crate. The caller must hold on to
/// [`state`](Self::state) and compare it against the value the provider echoes back on
/// the redirect; nothing in this core sees the callback, so state validation is the
/// callback handler's responsibility.
#[derive(Clone, Debug)]
pub struct AuthorizationRequest {
	/// Client identifier embedded in the URL.
	pub client_id: ClientId,
	/// Requested scope set.
	pub scopes: ScopeSet,
	/// Redirect URI the provider will send the user back to.
	pub redirect_uri: Url,
	/// Freshly generated antiforgery state value.
	pub state: String,
	/// Fully rendered authorization URL callers should send end-users to.
	///
	/// Kept as a plain string: the scope parameter carries literal spaces, which a
	/// parsed [`Url`] would re-encode.
	pub authorize_url: String,
}
impl AuthorizationRequest {
	pub(crate) fn generate(
		endpoint: &Url,
		client_id: ClientId,
		scopes: ScopeSet,
		redirect_uri: Url,
	) -> Self {
		let state = random_state();
		let authorize_url =
			render_authorize_url(endpoint, &client_id, &scopes, &redirect_uri, &state);

		Self { client_id, scopes, redirect_uri, state, authorize_url }
	}
}

fn render_authorize_url(
	endpoint: &Url,
	client_id: &ClientId,
	scopes: &ScopeSet,
	redirect_uri: &Url,
	state: &str,
) -> String {
	let mut url = endpoint.clone();

	{
		let mut pairs = url.query_pairs_mut();

		pairs.append_pair("client_id", client_id.as_ref());
		pairs.append_pair("redirect_uri", redirect_uri.as_str());
		pairs.append_pair("response_type", "code");
	}

	// The provider expects the scope list joined with literal spaces rather than `+`
	// or `%20`, so the final two parameters bypass the form encoder. The state value
	// is alphanumeric and needs no escaping.
	let mut rendered = String::from(url);

	rendered.push_str("&scope=");
	rendered.push_str(&scopes.join());
	rendered.push_str("&state=");
	rendered.push_str(state);

	rendered
}

fn random_state() -> String {
	rand::rng().sample_iter(Alphanumeric).take(STATE_LEN).map(char::from).collect()
}
