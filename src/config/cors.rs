//! The CORS allow-list.

use axum::http::HeaderValue;

use super::{Error, Result};
use crate::env;

/// Origins that are allowed to make credentialed cross-origin requests.
#[derive(Debug, Clone)]
pub struct Config {
	/// The allowed origins, pre-validated as header values.
	pub allowed_origins: Vec<HeaderValue>,
}

impl Config {
	/// Creates a new [`Config`] instance by parsing relevant environment variables.
	pub fn new() -> Result<Self> {
		let raw = env::get::<String>("YOKU_CORS_ALLOWED_ORIGINS")?;

		Self::from_list(&raw)
	}

	/// Parses a comma-separated origin list.
	pub fn from_list(raw: &str) -> Result<Self> {
		let allowed_origins = raw
			.split(',')
			.map(str::trim)
			.filter(|origin| !origin.is_empty())
			.map(parse_origin)
			.collect::<Result<Vec<_>>>()?;

		Ok(Self { allowed_origins })
	}
}

/// Validates a single origin.
///
/// Origins are matched byte-for-byte against the `Origin` request header, so they must not carry
/// a trailing slash or a path.
fn parse_origin(origin: &str) -> Result<HeaderValue> {
	let parsed = origin
		.parse::<url::Url>()
		.map_err(|_| Error::InvalidOrigin { origin: origin.to_owned() })?;

	if !matches!(parsed.scheme(), "http" | "https") || parsed.path() != "/" {
		return Err(Error::InvalidOrigin { origin: origin.to_owned() });
	}

	origin
		.trim_end_matches('/')
		.parse::<HeaderValue>()
		.map_err(|_| Error::InvalidOrigin { origin: origin.to_owned() })
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_a_comma_separated_list() {
		let config = Config::from_list("http://localhost:3000, https://yoku.app").unwrap();

		assert_eq!(config.allowed_origins, [
			HeaderValue::from_static("http://localhost:3000"),
			HeaderValue::from_static("https://yoku.app"),
		]);
	}

	#[test]
	fn rejects_origins_with_paths() {
		assert!(matches!(
			Config::from_list("http://localhost:3000/app"),
			Err(Error::InvalidOrigin { .. }),
		));
	}

	#[test]
	fn rejects_non_http_schemes() {
		assert!(matches!(
			Config::from_list("ftp://localhost:3000"),
			Err(Error::InvalidOrigin { .. }),
		));
	}
}
