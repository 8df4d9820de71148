#![doc = include_str!("../README.md")]

use std::future::Future;
use std::net::SocketAddr;

use anyhow::Context;
use axum::extract::connect_info::IntoMakeServiceWithConnectInfo;
use axum::extract::ConnectInfo;
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;

mod error;
pub use error::{Error, Result};

mod env;

pub mod config;
pub use config::Config;

mod state;
pub use state::State;


pub mod logging;
pub mod auth;
pub mod middleware;
pub mod routes;

#[allow(clippy::missing_docs_in_private_items)]
type Server = axum::serve::Serve<
	IntoMakeServiceWithConnectInfo<Router, SocketAddr>,
	axum::middleware::AddExtension<Router, ConnectInfo<SocketAddr>>,
>;

/// Run the gateway.
///
/// This function will not exit until a SIGINT signal is received.
/// If you want to supply a custom signal for graceful shutdown, use [`run_until()`] instead.
pub async fn run(config: Config) -> anyhow::Result<()> {
	server(config)
		.await
		.context("build http server")?
		.with_graceful_shutdown(sigint())
		.await
		.context("run http server")
}

/// Run the gateway until a given future completes.
///
/// This function is the same as [`run()`], except that it also waits for the provided `until`
/// future, and shuts down the server when that future resolves.
pub async fn run_until<Until>(config: Config, until: Until) -> anyhow::Result<()>
where
	Until: Future<Output = ()> + Send + 'static,
{
	server(config)
		.await
		.context("build http server")?
		.with_graceful_shutdown(async move {
			tokio::select! {
				() = until => {}
				() = sigint() => {}
			}
		})
		.await
		.context("run http server")
}

/// Runs the necessary setup for the gateway and returns a future that will run the server when
/// polled.
///
/// See [`run()`] and [`run_until()`].
async fn server(config: Config) -> anyhow::Result<Server> {
	tracing::debug!(addr = %config.socket_addr, "establishing TCP connection");

	let tcp_listener = TcpListener::bind(config.socket_addr)
		.await
		.context("bind tcp socket")?;

	let addr = tcp_listener.local_addr().context("get tcp addr")?;
	tracing::info!(%addr, prod = cfg!(feature = "production"), "listening for requests");

	let state = State::new(config).context("initialize state")?;

	tracing::info! {
		target: "yoku_api::audit_log",
		app = %state.config.app.name,
		provider.endpoint = %state.config.connection.uri,
		provider.base_path = %state.config.app.api_base_path,
		"initializing gateway service",
	};

	let service = routes::router(state).into_make_service_with_connect_info::<SocketAddr>();

	Ok(axum::serve(tcp_listener, service))
}

/// Waits for a SIGINT signal from the operating system.
#[tracing::instrument(name = "runtime::signals")]
async fn sigint() {
	let signal_result = signal::ctrl_c().await;

	if let Err(err) = signal_result {
		tracing::error!(target: "yoku_api::audit_log", "failed to receive SIGINT: {err}");
	} else {
		tracing::warn!(target: "yoku_api::audit_log", "received SIGINT; shutting down...");
	}
}
