//! The gateway's main application state.
//!
//! This is initialized once on startup, and then passed around the application by axum.

use std::sync::Arc;

use anyhow::Context;
use derive_more::Debug;

use crate::auth::{RemoteProvider, SessionProvider};

/// The main application state.
///
/// A `'static` reference to this is passed around the application. Everything in here is
/// immutable after startup, so no locking is needed for concurrent access.
#[derive(Debug)]
pub struct State {
	/// The gateway configuration.
	pub config: crate::Config,

	/// The external authentication provider.
	#[debug(skip)]
	pub provider: Arc<dyn SessionProvider>,
}

impl State {
	/// Creates a new [`State`] object and leaks it on the heap.
	///
	/// **This function should only ever be called once; it leaks memory.**
	pub fn new(config: crate::Config) -> anyhow::Result<&'static Self> {
		let http_client = reqwest::Client::builder()
			.build()
			.context("build http client")?;

		let provider = Arc::new(RemoteProvider::new(http_client, &config));

		Ok(Self::with_provider(config, provider))
	}

	/// Creates a new [`State`] with a custom [`SessionProvider`].
	///
	/// This is the seam that lets tests run the full middleware chain against a fake provider
	/// without any network dependency.
	pub fn with_provider(
		config: crate::Config,
		provider: Arc<dyn SessionProvider>,
	) -> &'static Self {
		Box::leak(Box::new(Self { config, provider }))
	}
}
