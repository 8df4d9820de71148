//! The production [`SessionProvider`], backed by the managed authentication service.
//!
//! All calls go over HTTP to the core instance named by
//! [`config::connection::Config`]. Session verification is a single POST per request; the
//! provider's own protocol surface (sign-in/up, refresh, ...) is relayed verbatim, except that
//! sign-in requests get the configured client credentials injected so secrets never leave the
//! backend.

use axum::async_trait;
use axum::body::{Body, Bytes};
use axum::extract::Request;
use axum::http::{header, request, HeaderMap, HeaderName, HeaderValue, Uri};
use axum::response::Response;
use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{Rejection, SessionContext, SessionProvider, Subject, Validated};
use crate::config;
use crate::config::identity::IdentityProvider;
use crate::Error;

/// The HTTP cookie that stores the user's access token.
pub const ACCESS_TOKEN_COOKIE: &str = "sAccessToken";

/// Maximum accepted body size for relayed protocol requests.
const PROXY_BODY_LIMIT: usize = 1024 * 1024;

/// Checks whether a header describes the connection rather than the payload, and therefore must
/// not be relayed.
fn is_hop_by_hop(name: &HeaderName) -> bool {
	*name == header::HOST
		|| *name == header::CONNECTION
		|| *name == header::CONTENT_LENGTH
		|| *name == header::TRANSFER_ENCODING
}

/// A [`SessionProvider`] talking to the managed service over HTTP.
pub struct RemoteProvider {
	/// HTTP client for reaching the core instance.
	http_client: reqwest::Client,

	/// Where the core instance lives.
	connection: config::connection::Config,

	/// Social-login credentials injected into relayed sign-in requests.
	identity_providers: Vec<IdentityProvider>,
}

impl RemoteProvider {
	/// Creates a new [`RemoteProvider`] from the gateway configuration.
	pub fn new(http_client: reqwest::Client, config: &crate::Config) -> Self {
		Self {
			http_client,
			connection: config.connection.clone(),
			identity_providers: config.identity_providers.clone(),
		}
	}

	/// Builds the URL for a path on the core instance.
	fn endpoint(&self, path: &str) -> Url {
		let mut url = self.connection.uri.clone();
		let joined = format!(
			"{}/{}",
			url.path().trim_end_matches('/'),
			path.trim_start_matches('/'),
		);

		url.set_path(&joined);
		url
	}

	/// Injects the configured client credentials into a relayed sign-in request body.
	///
	/// Frontends only send the third-party id (and optionally a client type); the matching
	/// secret is configuration on this side. Bodies that are not sign-in requests, or that
	/// already carry a client id, pass through untouched.
	fn enrich_signin_body(&self, path: &str, bytes: Bytes) -> Bytes {
		if !path.ends_with("/signinup") {
			return bytes;
		}

		let Ok(mut json) = serde_json::from_slice::<serde_json::Value>(&bytes) else {
			return bytes;
		};

		let Some(object) = json.as_object_mut() else {
			return bytes;
		};

		if object.contains_key("clientId") {
			return bytes;
		}

		let Some(third_party_id) = object
			.get("thirdPartyId")
			.and_then(serde_json::Value::as_str)
			.map(ToOwned::to_owned)
		else {
			return bytes;
		};

		let client_type = object
			.get("clientType")
			.and_then(serde_json::Value::as_str)
			.map(ToOwned::to_owned);

		let Some(client) = self
			.identity_providers
			.iter()
			.find(|provider| provider.id == third_party_id)
			.and_then(|provider| provider.client(client_type.as_deref()))
		else {
			tracing::debug!(provider = %third_party_id, "sign-in for an unconfigured provider");
			return bytes;
		};

		object.insert("clientId".to_owned(), client.client_id.clone().into());
		object.insert("clientSecret".to_owned(), client.client_secret.clone().into());

		serde_json::to_vec(&json).map(Bytes::from).unwrap_or(bytes)
	}

	/// Attaches the gateway's API key, if one is configured.
	fn with_api_key(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
		match self.connection.api_key.as_deref() {
			Some(key) => request.header("api-key", key),
			None => request,
		}
	}
}

#[async_trait]
impl SessionProvider for RemoteProvider {
	#[tracing::instrument(level = "debug", skip_all, err(Debug, level = "debug"))]
	async fn validate_session(&self, request: &request::Parts) -> Result<Validated, Rejection> {
		let access_token = extract_credential(request).ok_or(Rejection::MissingCredential)?;

		let response = self
			.with_api_key(self.http_client.post(self.endpoint("recipe/session/verify")))
			.json(&VerifyRequest { access_token: &access_token })
			.send()
			.await
			.map_err(|err| Rejection::Transport(err.to_string()))?;

		if !response.status().is_success() {
			return Err(Rejection::InvalidSession);
		}

		let body = response
			.json::<VerifyResponse>()
			.await
			.map_err(|err| Rejection::Transport(err.to_string()))?;

		if body.status != VerifyStatus::Ok {
			return Err(Rejection::InvalidSession);
		}

		let session = body
			.session
			.ok_or_else(|| Rejection::Transport(String::from("verify response had no session")))?;

		let context = SessionContext::new(
			Subject::from(session.user_id),
			session.handle,
			session.user_data_in_jwt,
		);

		let mut response_headers = HeaderMap::new();

		// The core may rotate the access token as part of verification; relay the new one as
		// a cookie so the caller's session stays alive.
		if let Some(rotated) = body.access_token {
			let cookie = Cookie::build((ACCESS_TOKEN_COOKIE, rotated.token))
				.path("/")
				.http_only(true)
				.same_site(SameSite::Lax)
				.build();

			let cookie = cookie
				.encoded()
				.to_string()
				.parse::<HeaderValue>()
				.expect("valid cookie");

			response_headers.append(header::SET_COOKIE, cookie);
		}

		Ok(Validated { context, response_headers })
	}

	fn required_cors_headers(&self) -> Vec<HeaderName> {
		vec![
			HeaderName::from_static("rid"),
			HeaderName::from_static("fdi-version"),
			HeaderName::from_static("anti-csrf"),
			HeaderName::from_static("st-auth-mode"),
		]
	}

	#[tracing::instrument(level = "debug", skip(self, request), err(Debug))]
	async fn handle_protocol_request(
		&self,
		uri: &Uri,
		request: Request,
	) -> crate::Result<Response> {
		let (parts, body) = request.into_parts();
		let bytes = axum::body::to_bytes(body, PROXY_BODY_LIMIT)
			.await
			.map_err(Error::InvalidRequestBody)?;

		let bytes = self.enrich_signin_body(uri.path(), bytes);

		let mut url = self.endpoint(uri.path());
		url.set_query(uri.query());

		let mut forwarded = HeaderMap::with_capacity(parts.headers.len());

		for (name, value) in &parts.headers {
			if !is_hop_by_hop(name) {
				forwarded.append(name, value.clone());
			}
		}

		let upstream = self
			.with_api_key(self.http_client.request(parts.method, url))
			.headers(forwarded)
			.body(bytes)
			.send()
			.await?;

		let status = upstream.status();
		let headers = upstream.headers().clone();
		let body = upstream.bytes().await?;

		let mut response = Response::new(Body::from(body));
		*response.status_mut() = status;

		for (name, value) in &headers {
			if !is_hop_by_hop(name) {
				response.headers_mut().append(name, value.clone());
			}
		}

		Ok(response)
	}
}

/// Extracts the session credential from a request, if one is present.
///
/// The access token travels either in the [`ACCESS_TOKEN_COOKIE`] cookie or as a bearer token
/// in the `Authorization` header.
fn extract_credential(request: &request::Parts) -> Option<String> {
	for header in request.headers.get_all(header::COOKIE) {
		let Ok(raw) = header.to_str() else {
			continue;
		};

		for cookie in Cookie::split_parse(raw).flatten() {
			if cookie.name() == ACCESS_TOKEN_COOKIE {
				return Some(cookie.value().to_owned());
			}
		}
	}

	request
		.headers
		.get(header::AUTHORIZATION)?
		.to_str()
		.ok()?
		.strip_prefix("Bearer ")
		.map(|token| token.trim().to_owned())
}

/// The request body for a session verification call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyRequest<'a> {
	/// The raw access token extracted from the inbound request.
	access_token: &'a str,
}

/// The possible outcomes of a verification call.
#[derive(Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum VerifyStatus {
	/// The session is valid.
	Ok,

	/// The session does not exist or has been revoked.
	UnauthorisedError,

	/// The access token needs to be refreshed before it can be used.
	TryRefreshTokenError,

	/// A status this gateway does not know about; treated as not-valid.
	#[serde(other)]
	Unknown,
}

/// The response body of a session verification call.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyResponse {
	/// The verification outcome.
	status: VerifyStatus,

	/// Details about the verified session; present when `status` is `OK`.
	#[serde(default)]
	session: Option<VerifiedSession>,

	/// A rotated access token, when the core decided to refresh it.
	#[serde(default)]
	access_token: Option<RotatedToken>,
}

/// The session details inside a successful verification response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifiedSession {
	/// The provider's handle for the session.
	handle: String,

	/// The user the session belongs to.
	user_id: String,

	/// The access token claims.
	#[serde(rename = "userDataInJWT", default)]
	user_data_in_jwt: serde_json::Value,
}

/// A rotated access token.
#[derive(Debug, Deserialize)]
struct RotatedToken {
	/// The new token value.
	token: String,
}
