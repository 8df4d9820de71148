//! Errors produced by the middleware chain.

use std::result::Result as StdResult;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error as ThisError;

use crate::auth::Rejection;

/// Type alias for a [`Result<T, E>`] with its `E` parameter set to [`Error`].
pub type Result<T> = StdResult<T, Error>;

/// Any errors that can occur while middleware functions are executing.
///
/// Every variant maps to a 401-class response: per the gateway's failure semantics, transport
/// errors towards the provider are indistinguishable from invalid sessions as far as the caller
/// is concerned.
#[derive(Debug, ThisError)]
pub enum Error {
	/// A protected route was hit without a validated session attached.
	#[error("you must be logged in to access this resource")]
	MissingSession,

	/// The session gateway rejected the request.
	#[error(transparent)]
	Rejected(#[from] Rejection),
}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		// Transport details are for the logs, not for the caller.
		let message = match self {
			Error::Rejected(Rejection::Transport(_)) => {
				String::from("session could not be verified")
			}
			ref other => other.to_string(),
		};

		(StatusCode::UNAUTHORIZED, Json(json!({ "message": message }))).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn every_variant_is_unauthorized() {
		for error in [
			Error::MissingSession,
			Error::Rejected(Rejection::MissingCredential),
			Error::Rejected(Rejection::InvalidSession),
			Error::Rejected(Rejection::Transport(String::from("connection refused"))),
		] {
			assert_eq!(error.into_response().status(), StatusCode::UNAUTHORIZED);
		}
	}
}
