//! Social-login identity providers.
//!
//! Each descriptor names one third-party login option (e.g. `google`) and carries one or more
//! client credential sets. Multiple clients per provider are supported so that e.g. a web client
//! and a mobile client can share a provider.
//!
//! The list is static configuration: it is parsed from the `YOKU_AUTH_PROVIDERS` environment
//! variable as JSON, validated once at startup, and never mutated afterwards. A provider with an
//! empty client list is a fatal configuration error. An empty list of providers overall is
//! accepted; such a deployment simply offers no social logins.

use std::fmt;

use serde::Deserialize;

use super::{Error, Result};

/// One configured third-party login option.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityProvider {
	/// The provider's own identifier, e.g. `google` or `github`.
	pub id: String,

	/// Client credential sets registered with this provider.
	pub clients: Vec<ClientCredentials>,
}

impl IdentityProvider {
	/// Picks the client credentials for a given client type.
	///
	/// When no `client_type` is requested, the provider must have exactly one client for the
	/// choice to be unambiguous; with multiple clients the first one is used.
	pub fn client(&self, client_type: Option<&str>) -> Option<&ClientCredentials> {
		match client_type {
			None => self.clients.first(),
			Some(ty) => self
				.clients
				.iter()
				.find(|client| client.client_type.as_deref() == Some(ty)),
		}
	}
}

/// A single client id / client secret pair.
#[derive(Clone, Deserialize)]
pub struct ClientCredentials {
	/// The OAuth client ID.
	pub client_id: String,

	/// The OAuth client secret.
	pub client_secret: String,

	/// Distinguishes multiple clients of the same provider, e.g. `web` vs `mobile`.
	#[serde(default)]
	pub client_type: Option<String>,
}

impl fmt::Debug for ClientCredentials {
	// The secret must never end up in logs.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ClientCredentials")
			.field("client_id", &self.client_id)
			.field("client_secret", &"…")
			.field("client_type", &self.client_type)
			.finish()
	}
}

/// Reads the identity provider list from the environment.
pub(super) fn from_env() -> Result<Vec<IdentityProvider>> {
	let raw = crate::env::get_opt::<String>("YOKU_AUTH_PROVIDERS")?;

	match raw.as_deref() {
		None | Some("") => Ok(Vec::new()),
		Some(json) => parse(json),
	}
}

/// Parses and validates a JSON identity provider list.
pub fn parse(json: &str) -> Result<Vec<IdentityProvider>> {
	let providers = serde_json::from_str::<Vec<IdentityProvider>>(json)?;

	for provider in &providers {
		if provider.clients.is_empty() {
			return Err(Error::EmptyClientList { provider: provider.id.clone() });
		}

		for client in &provider.clients {
			if client.client_id.trim().is_empty() || client.client_secret.trim().is_empty() {
				return Err(Error::BlankCredentials { provider: provider.id.clone() });
			}
		}
	}

	Ok(providers)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_multiple_clients_per_provider() {
		let providers = parse(
			r#"[{
				"id": "google",
				"clients": [
					{ "client_id": "web-id", "client_secret": "web-secret", "client_type": "web" },
					{ "client_id": "mobile-id", "client_secret": "mobile-secret", "client_type": "mobile" }
				]
			}]"#,
		)
		.unwrap();

		assert_eq!(providers.len(), 1);
		assert_eq!(providers[0].id, "google");
		assert_eq!(providers[0].client(Some("mobile")).unwrap().client_id, "mobile-id");
		assert_eq!(providers[0].client(None).unwrap().client_id, "web-id");
	}

	#[test]
	fn empty_client_list_is_rejected() {
		let result = parse(r#"[{ "id": "github", "clients": [] }]"#);

		assert!(matches!(result, Err(Error::EmptyClientList { ref provider }) if provider == "github"));
	}

	#[test]
	fn blank_credentials_are_rejected() {
		let result = parse(r#"[{ "id": "github", "clients": [{ "client_id": "", "client_secret": "x" }] }]"#);

		assert!(matches!(result, Err(Error::BlankCredentials { .. })));
	}

	#[test]
	fn zero_providers_are_accepted() {
		assert!(parse("[]").unwrap().is_empty());
	}

	#[test]
	fn debug_never_prints_the_secret() {
		let providers = parse(
			r#"[{ "id": "google", "clients": [{ "client_id": "id", "client_secret": "hunter2" }] }]"#,
		)
		.unwrap();

		let debug = format!("{providers:?}");

		assert!(!debug.contains("hunter2"));
	}
}
