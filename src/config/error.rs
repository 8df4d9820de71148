//! Errors that can occur while constructing the gateway's [`Config`].
//!
//! [`Config`]: crate::config::Config

use std::result::Result as StdResult;

use thiserror::Error as ThisError;

/// Type alias for a [`Result<T, E>`] with its `E` parameter set to [`Error`].
pub type Result<T> = StdResult<T, Error>;

/// Any errors that can occur while constructing the gateway's [`Config`].
///
/// These are the only errors that are allowed to escalate to process termination; everything
/// else is handled per-request.
///
/// [`Config`]: crate::config::Config
#[derive(Debug, ThisError)]
#[non_exhaustive]
pub enum Error {
	/// An environment variable was missing or unparseable.
	#[error(transparent)]
	Environment(#[from] crate::env::Error),

	/// A CORS origin could not be used as an HTTP header value.
	#[error("`{origin}` is not a valid CORS origin")]
	InvalidOrigin {
		/// The offending origin.
		origin: String,
	},

	/// A base path was not mountable.
	#[error("base path `{path}` must start with `/` and must not end with one")]
	InvalidBasePath {
		/// The offending path.
		path: String,
	},

	/// The identity provider list was not valid JSON.
	#[error("failed to parse identity provider list: {0}")]
	InvalidProviderList(#[from] serde_json::Error),

	/// An identity provider was declared without any client credentials.
	#[error("identity provider `{provider}` has no client credentials")]
	EmptyClientList {
		/// The provider's identifier.
		provider: String,
	},

	/// An identity provider client had a blank id or secret.
	#[error("identity provider `{provider}` has a client with blank credentials")]
	BlankCredentials {
		/// The provider's identifier.
		provider: String,
	},
}
