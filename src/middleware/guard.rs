//! The route guard.
//!
//! A narrower middleware than the session gate, applied per-route via
//! [`Router::route_layer()`]: it requires that a [`SessionContext`] was already attached by the
//! gate, and rejects the request otherwise. It performs no validation of its own beyond
//! presence-checking, which is exactly why it must run *after* the session gate in the chain,
//! never before.
//!
//! [`Router::route_layer()`]: axum::Router::route_layer

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::auth::SessionContext;
use crate::middleware::{Error, Result};

/// Middleware that rejects requests without a validated session.
///
/// Apply with [`axum::middleware::from_fn`] on protected routes.
#[tracing::instrument(level = "debug", skip(request, next), err(Debug, level = "debug"))]
pub async fn require_session(request: Request, next: Next) -> Result<Response> {
	if request.extensions().get::<SessionContext>().is_none() {
		return Err(Error::MissingSession);
	}

	Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::sync::Arc;

	use axum::body::Body;
	use axum::http::{Request, StatusCode};
	use axum::{routing, Router};
	use tower::ServiceExt;

	use super::*;

	fn guarded_router(handler_calls: Arc<AtomicUsize>) -> Router {
		Router::new()
			.route(
				"/protected",
				routing::get(move || {
					handler_calls.fetch_add(1, Ordering::SeqCst);
					async { "ok" }
				}),
			)
			.route_layer(axum::middleware::from_fn(require_session))
	}

	#[tokio::test]
	async fn rejects_without_an_upstream_gate() {
		// No session gate in this chain at all: the guard must reject every request, since
		// it never validates anything itself.
		let handler_calls = Arc::new(AtomicUsize::new(0));
		let router = guarded_router(Arc::clone(&handler_calls));

		let response = router
			.oneshot(Request::get("/protected").body(Body::empty()).unwrap())
			.await
			.unwrap();

		assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
		assert_eq!(handler_calls.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn forwards_when_a_session_is_attached() {
		let handler_calls = Arc::new(AtomicUsize::new(0));
		let router = guarded_router(Arc::clone(&handler_calls));

		let mut request = Request::get("/protected").body(Body::empty()).unwrap();
		request.extensions_mut().insert(crate::test::session());

		let response = router.oneshot(request).await.unwrap();

		assert_eq!(response.status(), StatusCode::OK);
		assert_eq!(handler_calls.load(Ordering::SeqCst), 1);
	}
}
