//! Token lifecycle management: code exchange, expiry-aware caching, and single-flight
//! refresh coordination.
//!
//! The manager owns zero-or-one [`Token`] and is the sole serializer of every mutation
//! to it. The upstream provider invalidates the prior refresh token on every rotation,
//! so an unsynchronized second refresh would desynchronize the manager's belief about
//! its own credential; every caller therefore funnels through one awaitable guard, and
//! callers that arrive while a rotation is in flight receive that rotation's outcome
//! instead of starting another round trip.

// self
use crate::{
	_prelude::*,
	auth::{AuthorizationRequest, ClientId, RealmId, ScopeSet, Secret, Token},
	clock::{Clock, SystemClock},
	env::ApiEnvironment,
	error::MalformedResponse,
	http::ApiTransport,
	obs::{self, FlowKind, FlowOutcome},
};
#[cfg(feature = "reqwest")]
use crate::http::ReqwestTransport;

/// Safety margin subtracted from the access expiry so a token is never handed out when
/// it would expire mid-request.
const DEFAULT_EXPIRY_MARGIN: Duration = Duration::seconds(60);

#[cfg(feature = "reqwest")]
/// Manager specialized for the crate's default reqwest transport.
pub type ReqwestTokenManager = TokenManager<ReqwestTransport>;

/// Wire shape of a successful token endpoint response.
///
/// The realm is deliberately absent: the provider delivers it as a query parameter on
/// the OAuth callback, never in the response body.
#[derive(Debug, Deserialize)]
struct TokenEndpointResponse {
	token_type: String,
	access_token: String,
	expires_in: i64,
	refresh_token: String,
	x_refresh_token_expires_in: i64,
}

/// Mutable lifecycle state guarded by the manager's state lock.
struct ManagerState {
	token: Option<Token>,
	/// Count of completed refresh attempts, successful or not.
	refresh_epoch: u64,
	/// Outcome of the most recent refresh, stamped with the epoch it produced.
	last_refresh: Option<(u64, Result<Token>)>,
}

/// Owns the credential for one linked company and coordinates every token flow.
///
/// The manager is deliberately not `Clone`: it is the exclusive owner of the held
/// token. Share it behind an [`Arc`] instead.
pub struct TokenManager<T>
where
	T: ?Sized + ApiTransport,
{
	transport: Arc<T>,
	env: ApiEnvironment,
	client_id: ClientId,
	client_secret: Secret,
	redirect_uri: Url,
	scopes: ScopeSet,
	clock: Arc<dyn Clock>,
	expiry_margin: Duration,
	state: Mutex<ManagerState>,
	refresh_guard: AsyncMutex<()>,
}
impl<T> TokenManager<T>
where
	T: ?Sized + ApiTransport,
{
	/// Creates a manager that uses the caller-provided transport.
	pub fn with_transport(
		env: ApiEnvironment,
		client_id: ClientId,
		client_secret: impl Into<Secret>,
		redirect_uri: Url,
		scopes: ScopeSet,
		transport: impl Into<Arc<T>>,
	) -> Self {
		Self {
			transport: transport.into(),
			env,
			client_id,
			client_secret: client_secret.into(),
			redirect_uri,
			scopes,
			clock: Arc::new(SystemClock),
			expiry_margin: DEFAULT_EXPIRY_MARGIN,
			state: Mutex::new(ManagerState { token: None, refresh_epoch: 0, last_refresh: None }),
			refresh_guard: AsyncMutex::new(()),
		}
	}

	/// Replaces the time source used for expiry decisions.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// Overrides the safety margin applied to access-token expiry checks (defaults to
	/// 60 seconds). Negative values are treated as zero.
	pub fn with_expiry_margin(mut self, margin: Duration) -> Self {
		self.expiry_margin = if margin.is_negative() { Duration::ZERO } else { margin };

		self
	}

	/// Restores caller-persisted credential state into the manager.
	pub fn with_token(self, token: Token) -> Self {
		self.state.lock().token = Some(token);

		self
	}

	/// Snapshot of the held token for external persistence; no expiry check, no
	/// network access.
	pub fn authenticated_token(&self) -> Option<Token> {
		self.state.lock().token.clone()
	}

	/// Renders a fresh authorization URL plus its antiforgery state.
	///
	/// Pure: no network access, no state change. The returned state must be compared
	/// against the value echoed back on the redirect by the caller's callback handler;
	/// this core never sees the callback.
	pub fn generate_auth_url(&self) -> AuthorizationRequest {
		AuthorizationRequest::generate(
			self.env.authorization_endpoint(),
			self.client_id.clone(),
			self.scopes.clone(),
			self.redirect_uri.clone(),
		)
	}

	/// Exchanges an authorization code for a fresh token pair and binds it to `realm`.
	///
	/// Valid whether or not a token is already held; a second exchange re-links the
	/// manager to whichever company the new code authorizes. On a non-2xx response the
	/// held state is untouched and the raw error body is surfaced verbatim.
	pub async fn exchange_code(&self, code: &str, realm: RealmId) -> Result<Token> {
		obs::record_flow(FlowKind::Exchange, FlowOutcome::Attempt);

		let result = self.exchange_once(code, realm).await;

		match &result {
			Ok(_) => obs::record_flow(FlowKind::Exchange, FlowOutcome::Success),
			Err(_) => obs::record_flow(FlowKind::Exchange, FlowOutcome::Failure),
		}

		result
	}

	/// Returns a currently valid token, refreshing first if the held one has expired.
	///
	/// The common path is synchronous-in-effect: a held token whose access expiry
	/// (minus the safety margin) is still ahead is returned immediately with zero
	/// network access.
	pub async fn get_token(&self) -> Result<Token> {
		let now = self.clock.now();

		{
			let state = self.state.lock();
			let token = state.token.as_ref().ok_or(Error::NotAuthenticated)?;

			if token.access_valid_at(now, self.expiry_margin) {
				return Ok(token.clone());
			}
		}

		self.refresh_coordinated(false).await
	}

	/// Rotates the token pair unconditionally.
	///
	/// An expired refresh token fails with [`Error::RefreshTokenExpired`] before any
	/// network access and reverts the manager to its unauthenticated state; the caller
	/// must restart the authorization-code flow. Any other rejection keeps the stale
	/// token held so a later call can retry.
	pub async fn refresh(&self) -> Result<Token> {
		self.refresh_coordinated(true).await
	}

	/// Revokes the held refresh token upstream and clears the credential on success.
	pub async fn revoke(&self) -> Result<()> {
		obs::record_flow(FlowKind::Revoke, FlowOutcome::Attempt);

		let result = self.revoke_once().await;

		match &result {
			Ok(()) => obs::record_flow(FlowKind::Revoke, FlowOutcome::Success),
			Err(_) => obs::record_flow(FlowKind::Revoke, FlowOutcome::Failure),
		}

		result
	}

	async fn exchange_once(&self, code: &str, realm: RealmId) -> Result<Token> {
		let response = self
			.transport
			.post_form(self.env.token_endpoint().as_str(), &[
				("grant_type", "authorization_code"),
				("code", code),
				("redirect_uri", self.redirect_uri.as_str()),
				("client_id", self.client_id.as_ref()),
				("client_secret", self.client_secret.expose()),
			])
			.await?;

		if !response.is_success() {
			return Err(Error::ExchangeFailed {
				status: response.status,
				body: response.body_text(),
			});
		}

		let token = decode_token(&response.body, self.clock.now(), realm)?;

		self.state.lock().token = Some(token.clone());

		Ok(token)
	}

	async fn refresh_coordinated(&self, force: bool) -> Result<Token> {
		obs::record_flow(FlowKind::Refresh, FlowOutcome::Attempt);

		let result = self.refresh_locked(force).await;

		match &result {
			Ok(_) => obs::record_flow(FlowKind::Refresh, FlowOutcome::Success),
			Err(_) => obs::record_flow(FlowKind::Refresh, FlowOutcome::Failure),
		}

		result
	}

	async fn refresh_locked(&self, force: bool) -> Result<Token> {
		let observed_epoch = self.state.lock().refresh_epoch;
		// While this guard is held the manager is in its refresh-in-flight state;
		// exactly one network rotation runs at a time.
		let _singleflight = self.refresh_guard.lock().await;

		{
			let state = self.state.lock();

			// A rotation completed while this caller was parked on the guard; hand
			// back that rotation's outcome instead of issuing a second round trip.
			if let Some(outcome) = replayable_outcome(&state, observed_epoch) {
				return outcome;
			}

			let cached =
				if force { None } else { self.cached_valid_token(&state, self.clock.now()) };

			if let Some(token) = cached {
				return Ok(token);
			}
		}

		let outcome = self.refresh_once().await;

		{
			let mut state = self.state.lock();

			state.refresh_epoch += 1;
			state.last_refresh = Some((state.refresh_epoch, outcome.clone()));
		}

		outcome
	}

	async fn refresh_once(&self) -> Result<Token> {
		let now = self.clock.now();
		let (refresh_secret, realm) = {
			let mut state = self.state.lock();
			let token = state.token.as_ref().ok_or(Error::NotAuthenticated)?;

			if !token.refresh_valid_at(now) {
				// Terminal for this credential; only a fresh authorization code can
				// re-link the company.
				state.token = None;

				return Err(Error::RefreshTokenExpired);
			}

			(token.refresh_token.clone(), token.realm.clone())
		};
		let response = self
			.transport
			.post_form(self.env.token_endpoint().as_str(), &[
				("grant_type", "refresh_token"),
				("refresh_token", refresh_secret.expose()),
				("client_id", self.client_id.as_ref()),
				("client_secret", self.client_secret.expose()),
			])
			.await?;

		if !response.is_success() {
			// The stale pair stays held so the next call retries rather than silently
			// reusing a known-bad access token.
			return Err(Error::RefreshFailed {
				status: response.status,
				body: response.body_text(),
			});
		}

		// The refresh response omits the realm; it carries over unchanged.
		let token = decode_token(&response.body, self.clock.now(), realm)?;

		self.state.lock().token = Some(token.clone());

		Ok(token)
	}

	async fn revoke_once(&self) -> Result<()> {
		let refresh_secret = {
			let state = self.state.lock();

			state
				.token
				.as_ref()
				.map(|token| token.refresh_token.clone())
				.ok_or(Error::NotAuthenticated)?
		};
		let response = self
			.transport
			.post_form(self.env.revocation_endpoint().as_str(), &[
				("token", refresh_secret.expose()),
				("client_id", self.client_id.as_ref()),
				("client_secret", self.client_secret.expose()),
			])
			.await?;

		if !response.is_success() {
			return Err(Error::RevokeFailed { status: response.status, body: response.body_text() });
		}

		self.state.lock().token = None;

		Ok(())
	}

	fn cached_valid_token(&self, state: &ManagerState, now: OffsetDateTime) -> Option<Token> {
		state.token.as_ref().filter(|token| token.access_valid_at(now, self.expiry_margin)).cloned()
	}
}
#[cfg(feature = "reqwest")]
impl TokenManager<ReqwestTransport> {
	/// Creates a manager backed by the crate's default reqwest transport.
	pub fn new(
		env: ApiEnvironment,
		client_id: ClientId,
		client_secret: impl Into<Secret>,
		redirect_uri: Url,
		scopes: ScopeSet,
	) -> Self {
		Self::with_transport(
			env,
			client_id,
			client_secret,
			redirect_uri,
			scopes,
			ReqwestTransport::default(),
		)
	}
}
impl<T> Debug for TokenManager<T>
where
	T: ?Sized + ApiTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenManager")
			.field("client_id", &self.client_id)
			.field("redirect_uri", &self.redirect_uri)
			.field("scopes", &self.scopes)
			.field("expiry_margin", &self.expiry_margin)
			.field("authenticated", &self.state.lock().token.is_some())
			.finish()
	}
}

fn replayable_outcome(state: &ManagerState, observed_epoch: u64) -> Option<Result<Token>> {
	match &state.last_refresh {
		Some((epoch, outcome)) if *epoch > observed_epoch => Some(outcome.clone()),
		_ => None,
	}
}

fn decode_token(body: &[u8], now: OffsetDateTime, realm: RealmId) -> Result<Token> {
	let mut deserializer = serde_json::Deserializer::from_slice(body);
	let response: TokenEndpointResponse =
		serde_path_to_error::deserialize(&mut deserializer).map_err(MalformedResponse::new)?;

	Ok(Token {
		token_type: response.token_type,
		access_token: Secret::from(response.access_token),
		access_expires_at: now + Duration::seconds(response.expires_in),
		refresh_token: Secret::from(response.refresh_token),
		refresh_expires_at: now + Duration::seconds(response.x_refresh_token_expires_in),
		realm,
	})
}
