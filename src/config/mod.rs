//! The gateway's startup configuration.
//!
//! [`Config`] is constructed exactly once, during process bootstrap, by reading environment
//! variables. It is immutable afterwards and shared read-only across all request tasks. If any
//! part of it is missing or malformed, [`Config::new()`] returns an error and the process must
//! not begin serving traffic.
//!
//! See the `.env.example` file in the root of the repository for all the relevant variables and
//! example values.

use std::net::{Ipv4Addr, SocketAddrV4};

use crate::env;

mod error;
pub use error::{Error, Result};

pub mod app;
pub mod connection;
pub mod cors;
pub mod identity;

/// The gateway configuration.
#[derive(Debug)]
pub struct Config {
	/// Address to open a TCP socket on.
	pub socket_addr: SocketAddrV4,

	/// Application metadata.
	pub app: app::Config,

	/// Connection details for the external authentication provider.
	pub connection: connection::Config,

	/// The CORS allow-list.
	pub cors: cors::Config,

	/// The configured social-login identity providers.
	pub identity_providers: Vec<identity::IdentityProvider>,
}

impl Config {
	/// Creates a new [`Config`] instance by parsing relevant environment variables.
	///
	/// All validation happens here. Once this function returns `Ok`, the configuration is
	/// structurally sound and the server may start accepting connections.
	pub fn new() -> Result<Self> {
		let ip_addr = env::get::<Ipv4Addr>("YOKU_API_IP")?;
		let port = env::get::<u16>("YOKU_API_PORT")?;
		let socket_addr = SocketAddrV4::new(ip_addr, port);

		let app = app::Config::new()?;
		let connection = connection::Config::new()?;
		let cors = cors::Config::new()?;
		let identity_providers = identity::from_env()?;

		Ok(Self { socket_addr, app, connection, cors, identity_providers })
	}
}
