//! Transport primitives for token-endpoint and resource-query calls.
//!
//! The [`ApiTransport`] trait is the crate's only dependency on an HTTP stack. The
//! lifecycle manager and the pagination probe hold an implementation behind an [`Arc`]
//! and never see transport-specific types; tests substitute in-memory stubs the same
//! way. The default [`ReqwestTransport`] lives behind the `reqwest` feature.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// self
use crate::{_prelude::*, error::TransportError};

/// Boxed future returned by transport methods.
///
/// Boxing keeps the trait object-safe so callers can share one transport across the
/// manager and any number of probes. The future must be `Send` so flows can hop
/// executors.
pub type TransportFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, TransportError>> + 'a + Send>>;

/// Status and raw body captured from one upstream response.
///
/// Bodies stay as raw bytes until a flow decides how to decode them; error bodies are
/// surfaced to callers verbatim rather than parsed.
#[derive(Clone, Debug)]
pub struct HttpResponseParts {
	/// HTTP status code.
	pub status: u16,
	/// Raw response body bytes.
	pub body: Vec<u8>,
}
impl HttpResponseParts {
	/// Returns true when the status is in the 2xx range.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Lossy UTF-8 view of the body, used when surfacing upstream error text.
	pub fn body_text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}

/// Abstraction over HTTP transports capable of executing the crate's two request
/// shapes: form-encoded POSTs to the OAuth endpoints and bearer-authorized GETs to the
/// resource query endpoint.
///
/// Implementations must be `Send + Sync + 'static` so one instance can serve
/// concurrent flows without wrappers. Non-2xx statuses are not transport errors;
/// implementations return them as [`HttpResponseParts`] and flows decide what a given
/// status means.
pub trait ApiTransport
where
	Self: 'static + Send + Sync,
{
	/// POSTs a form-encoded body and captures the response.
	fn post_form<'a>(
		&'a self,
		url: &'a str,
		form: &'a [(&'a str, &'a str)],
	) -> TransportFuture<'a, HttpResponseParts>;

	/// GETs a resource with a bearer credential and captures the response.
	fn get_bearer<'a>(
		&'a self,
		url: &'a str,
		access_token: &'a str,
	) -> TransportFuture<'a, HttpResponseParts>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Token requests must not follow redirects, matching OAuth 2.0 guidance that token
/// endpoints return results directly; configure any custom [`ReqwestClient`]
/// accordingly before wrapping it.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiTransport for ReqwestTransport {
	fn post_form<'a>(
		&'a self,
		url: &'a str,
		form: &'a [(&'a str, &'a str)],
	) -> TransportFuture<'a, HttpResponseParts> {
		Box::pin(async move {
			let response = self
				.0
				.post(url)
				.header(reqwest::header::ACCEPT, "application/json")
				.form(form)
				.send()
				.await
				.map_err(TransportError::from)?;
			let status = response.status().as_u16();
			let body = response.bytes().await.map_err(TransportError::from)?.to_vec();

			Ok(HttpResponseParts { status, body })
		})
	}

	fn get_bearer<'a>(
		&'a self,
		url: &'a str,
		access_token: &'a str,
	) -> TransportFuture<'a, HttpResponseParts> {
		Box::pin(async move {
			let response = self
				.0
				.get(url)
				.header(reqwest::header::ACCEPT, "application/json")
				.bearer_auth(access_token)
				.send()
				.await
				.map_err(TransportError::from)?;
			let status = response.status().as_u16();
			let body = response.bytes().await.map_err(TransportError::from)?.to_vec();

			Ok(HttpResponseParts { status, body })
		})
	}
}
