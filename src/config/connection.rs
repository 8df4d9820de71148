//! Connection details for the external authentication provider.

use std::fmt;

use url::Url;

use super::Result;
use crate::env;

/// Configuration for communicating with the authentication provider's core service.
#[derive(Clone)]
pub struct Config {
	/// The provider's connection endpoint.
	pub uri: Url,

	/// API key to authenticate the gateway itself against the provider, if the provider
	/// instance has one configured.
	pub api_key: Option<String>,
}

impl Config {
	/// Creates a new [`Config`] instance by parsing relevant environment variables.
	pub fn new() -> Result<Self> {
		let uri = env::get::<Url>("YOKU_AUTH_CONNECTION_URI")?;
		let api_key = env::get_opt::<String>("YOKU_AUTH_API_KEY")?;

		Ok(Self { uri, api_key })
	}
}

impl fmt::Debug for Config {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Connection Config")
			.field("uri", &self.uri.as_str())
			.field("api_key", &"…")
			.finish()
	}
}
