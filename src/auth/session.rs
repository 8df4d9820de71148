//! Validated session context.
//!
//! A [`SessionContext`] is produced by a successful [`SessionProvider::validate_session()`] call
//! and is scoped to a single request: the gateway middleware inserts it into the request's
//! extensions, handlers extract it from there, and it is dropped when the request completes.
//! Nothing here is persisted.
//!
//! [`SessionContext`] also acts as an [extractor] via its [`FromRequestParts`] implementation,
//! so handlers behind the route guard can simply take it as an argument.
//!
//! [extractor]: axum::extract
//! [`SessionProvider::validate_session()`]: crate::auth::SessionProvider::validate_session

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request;
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

use crate::middleware;

/// An opaque handle to the user a session belongs to.
///
/// The gateway never interprets this value; it is whatever identifier the external provider
/// uses for its accounts.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, From, Serialize, Deserialize)]
#[from(forward)]
pub struct Subject(String);

/// The validated session attached to a request.
#[derive(Debug, Clone, Serialize)]
pub struct SessionContext {
	/// The user this session belongs to.
	subject: Subject,

	/// The provider's handle for this particular session.
	session_handle: String,

	/// The session's access token claims.
	///
	/// Opaque to the gateway except for claim validators configured on the middleware.
	access_token_payload: serde_json::Value,
}

impl SessionContext {
	/// Creates a new [`SessionContext`].
	pub fn new(
		subject: Subject,
		session_handle: impl Into<String>,
		access_token_payload: serde_json::Value,
	) -> Self {
		Self {
			subject,
			session_handle: session_handle.into(),
			access_token_payload,
		}
	}

	/// Returns the user this session belongs to.
	pub fn subject(&self) -> &Subject {
		&self.subject
	}

	/// Returns the provider's handle for this session.
	pub fn session_handle(&self) -> &str {
		&self.session_handle
	}

	/// Returns the session's access token claims.
	pub fn access_token_payload(&self) -> &serde_json::Value {
		&self.access_token_payload
	}
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionContext
where
	S: Send + Sync,
{
	type Rejection = middleware::Error;

	async fn from_request_parts(
		parts: &mut request::Parts,
		_state: &S,
	) -> Result<Self, Self::Rejection> {
		parts
			.extensions
			.get::<Self>()
			.cloned()
			.ok_or(middleware::Error::MissingSession)
	}
}
