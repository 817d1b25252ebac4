//! Deployment environment descriptors for the upstream API.

// self
use crate::{_prelude::*, auth::RealmId, error::ConfigError};

const AUTHORIZATION_ENDPOINT: &str = "https://appcenter.intuit.com/connect/oauth2";
const TOKEN_ENDPOINT: &str = "https://oauth.platform.intuit.com/oauth2/v1/tokens/bearer";
const REVOCATION_ENDPOINT: &str = "https://developer.api.intuit.com/v2/oauth2/tokens/revoke";
const PRODUCTION_API_BASE: &str = "https://quickbooks.api.intuit.com";
const SANDBOX_API_BASE: &str = "https://sandbox-quickbooks.api.intuit.com";

/// Validated endpoint set for one deployment environment.
///
/// The OAuth endpoints are shared between sandbox and production; only the resource API
/// base differs. [`custom`](Self::custom) exists for tests and self-hosted gateways.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiEnvironment {
	authorization: Url,
	token: Url,
	revocation: Url,
	api_base: Url,
}
impl ApiEnvironment {
	/// Production environment with the provider's live endpoints.
	pub fn production() -> Self {
		Self::from_static(PRODUCTION_API_BASE)
	}

	/// Sandbox environment for development companies.
	pub fn sandbox() -> Self {
		Self::from_static(SANDBOX_API_BASE)
	}

	/// Builds an environment from caller-supplied endpoint URLs.
	pub fn custom(
		authorization: &str,
		token: &str,
		revocation: &str,
		api_base: &str,
	) -> Result<Self, ConfigError> {
		Ok(Self {
			authorization: parse_endpoint(authorization)?,
			token: parse_endpoint(token)?,
			revocation: parse_endpoint(revocation)?,
			api_base: parse_endpoint(api_base)?,
		})
	}

	fn from_static(api_base: &'static str) -> Self {
		Self::custom(AUTHORIZATION_ENDPOINT, TOKEN_ENDPOINT, REVOCATION_ENDPOINT, api_base)
			.expect("static endpoint URLs parse")
	}

	/// Authorization endpoint used by the browser-redirect leg.
	pub fn authorization_endpoint(&self) -> &Url {
		&self.authorization
	}

	/// Token endpoint used for exchanges and refreshes.
	pub fn token_endpoint(&self) -> &Url {
		&self.token
	}

	/// Revocation endpoint for retiring refresh tokens.
	pub fn revocation_endpoint(&self) -> &Url {
		&self.revocation
	}

	/// Resource endpoint base for one company realm.
	///
	/// Returned as a plain string because query paths appended to it carry literal
	/// spaces that a parsed [`Url`] would re-encode.
	pub fn company_base(&self, realm: &RealmId) -> String {
		format!("{}/v3/company/{realm}", self.api_base.as_str().trim_end_matches('/'))
	}
}

fn parse_endpoint(value: &str) -> Result<Url, ConfigError> {
	Url::parse(value).map_err(|source| ConfigError::InvalidEndpoint { source })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn well_known_environments_build() {
		let production = ApiEnvironment::production();
		let sandbox = ApiEnvironment::sandbox();

		assert_eq!(production.token_endpoint(), sandbox.token_endpoint());
		assert_ne!(production.api_base, sandbox.api_base);
	}

	#[test]
	fn company_base_embeds_the_realm() {
		let realm = RealmId::new("4620816365").expect("Realm fixture should be valid.");

		assert_eq!(
			ApiEnvironment::sandbox().company_base(&realm),
			"https://sandbox-quickbooks.api.intuit.com/v3/company/4620816365",
		);
	}

	#[test]
	fn custom_rejects_unparsable_urls() {
		let err = ApiEnvironment::custom("not a url", TOKEN_ENDPOINT, REVOCATION_ENDPOINT, SANDBOX_API_BASE)
			.expect_err("Invalid URLs must be rejected.");

		assert!(matches!(err, ConfigError::InvalidEndpoint { .. }));
	}
}
