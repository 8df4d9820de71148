//! Application metadata.
//!
//! These values describe the application to the external authentication provider: how it is
//! named, where its API lives, and where its website lives. The provider uses them to build
//! redirect URLs and scope its cookies; the gateway itself only uses
//! [`api_base_path`] to mount the provider's protocol surface.
//!
//! [`api_base_path`]: Config::api_base_path

use url::Url;

use super::{Error, Result};
use crate::env;

/// Application metadata shared with the authentication provider.
#[derive(Debug, Clone)]
pub struct Config {
	/// The application's display name.
	pub name: String,

	/// The public URL of the API.
	pub api_domain: Url,

	/// The public URL of the website that talks to the API.
	pub website_domain: Url,

	/// Path under [`api_domain`] where the provider's protocol endpoints are mounted.
	///
	/// [`api_domain`]: Config::api_domain
	pub api_base_path: String,

	/// Path under [`website_domain`] where the login UI lives.
	///
	/// [`website_domain`]: Config::website_domain
	pub website_base_path: String,
}

impl Config {
	/// Creates a new [`Config`] instance by parsing relevant environment variables.
	pub fn new() -> Result<Self> {
		let name = env::get::<String>("YOKU_API_NAME")?;
		let api_domain = env::get::<Url>("YOKU_API_DOMAIN")?;
		let website_domain = env::get::<Url>("YOKU_WEBSITE_DOMAIN")?;
		let api_base_path = base_path(env::get_or("YOKU_API_BASE_PATH", "/auth")?)?;
		let website_base_path = base_path(env::get_or("YOKU_WEBSITE_BASE_PATH", "/auth")?)?;

		Ok(Self { name, api_domain, website_domain, api_base_path, website_base_path })
	}
}

/// Validates that a base path is mountable, i.e. starts with `/` and does not end with one.
///
/// Both the bare root and trailing slashes are rejected here, at configuration time, because
/// they would otherwise panic later when the router nests the provider's protocol surface.
fn base_path(path: String) -> Result<String> {
	if !path.starts_with('/') || path.ends_with('/') {
		return Err(Error::InvalidBasePath { path });
	}

	Ok(path)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn base_paths_must_be_mountable() {
		assert!(base_path(String::from("/auth")).is_ok());

		for invalid in ["auth", "/", "/auth/"] {
			assert!(matches!(
				base_path(String::from(invalid)),
				Err(Error::InvalidBasePath { .. }),
			), "`{invalid}` should have been rejected");
		}
	}
}
