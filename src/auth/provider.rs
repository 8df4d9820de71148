//! The seam between the gateway and the external authentication provider.
//!
//! The provider is modelled as an injected capability: everything the middleware chain needs
//! from it is behind the [`SessionProvider`] trait, so the gateway and guard can be tested
//! against a fake implementation without any network dependency. The production implementation
//! is [`RemoteProvider`].
//!
//! [`RemoteProvider`]: crate::auth::RemoteProvider

use axum::async_trait;
use axum::extract::Request;
use axum::http::{request, HeaderMap, HeaderName, Uri};
use axum::response::Response;
use thiserror::Error as ThisError;

use super::SessionContext;

/// An external authentication provider.
///
/// Implementations own all session state and cryptography. The gateway only ever asks three
/// questions: "is this request's session valid?", "which CORS headers does your protocol
/// need?", and "here is a request for your own protocol surface, answer it".
#[async_trait]
pub trait SessionProvider: Send + Sync + 'static {
	/// Validates the session credential carried by `request`, if any.
	///
	/// This is the only suspension point in the request pipeline; implementations may perform
	/// network calls. Transport failures must be reported as [`Rejection::Transport`], never
	/// panics, and must not be retried here.
	async fn validate_session(&self, request: &request::Parts) -> Result<Validated, Rejection>;

	/// Returns the request headers the provider's frontend protocol uses.
	///
	/// These are added to the CORS allow-list at startup so browsers may send them.
	fn required_cors_headers(&self) -> Vec<HeaderName>;

	/// Answers a request to the provider's own protocol surface (sign-in/up, token refresh,
	/// ...), mounted under the configured API base path.
	///
	/// `uri` is the original request URI, before any router nesting stripped the base path.
	async fn handle_protocol_request(
		&self,
		uri: &Uri,
		request: Request,
	) -> crate::Result<Response>;
}

/// The result of a successful session validation.
#[derive(Debug, Clone)]
pub struct Validated {
	/// The validated session.
	pub context: SessionContext,

	/// Headers the provider wants appended to the final response, e.g. a `Set-Cookie` for a
	/// refreshed access token.
	pub response_headers: HeaderMap,
}

impl Validated {
	/// Creates a [`Validated`] without any response headers.
	pub fn new(context: SessionContext) -> Self {
		Self { context, response_headers: HeaderMap::new() }
	}
}

/// The reasons a session validation can fail.
///
/// All of these terminate only the request they occurred in. From the caller's perspective they
/// are indistinguishable authentication failures; the distinction exists for logging.
#[derive(Debug, ThisError)]
pub enum Rejection {
	/// The request carried no session credential at all.
	#[error("no session credential was provided")]
	MissingCredential,

	/// The request carried a credential, but the provider did not accept it.
	#[error("session is missing, invalid, or expired")]
	InvalidSession,

	/// The session itself is valid, but one of its claims failed validation.
	#[error("session claim `{claim}` failed validation")]
	FailedClaim {
		/// The failing validator's identifier.
		claim: String,
	},

	/// The provider could not be reached, or answered with something unintelligible.
	#[error("failed to reach the authentication provider: {0}")]
	Transport(String),
}
