//! Runtime errors.
//!
//! This module exposes the [`Error`] type used by request handlers for bubbling up errors, and a
//! [`Result`] type alias with [`Error`] as the default `E` parameter.
//!
//! [`Error`] implements [`IntoResponse`], which means it can be returned from HTTP handlers,
//! middleware, etc. Per-request errors only ever terminate the request they occurred in; the only
//! errors that may take down the process are configuration errors at startup (see
//! [`config::Error`]).
//!
//! [`config::Error`]: crate::config::Error

use std::result::Result as StdResult;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error as ThisError;

/// Type alias for a [`Result<T, E>`] with its `E` parameter set to [`Error`].
pub type Result<T, E = Error> = StdResult<T, E>;

/// Any errors that can occur while request handlers are executing.
#[derive(Debug, ThisError)]
pub enum Error {
	/// The request body could not be read.
	#[error("request body could not be read: {0}")]
	InvalidRequestBody(axum::Error),

	/// An outbound call to the authentication provider failed.
	#[error("authentication provider request failed: {0}")]
	Upstream(#[from] reqwest::Error),
}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let json = json!({ "message": self.to_string() });
		let code = match self {
			Error::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
			Error::Upstream(_) => StatusCode::BAD_GATEWAY,
		};

		(code, Json(json)).into_response()
	}
}
