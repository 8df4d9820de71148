//! Route registration.
//!
//! Which routes are protected is explicit policy here, not something inferred elsewhere: `/` is
//! public, `/me` sits behind the [route guard], and everything under the configured API base
//! path belongs to the external provider's protocol surface and is relayed as-is. Applications
//! extending the gateway add their routes here and decide per route whether to apply the guard.
//!
//! Layer ordering (outermost first): trace, CORS, then the session gate. The gate runs in
//! "optional" mode for the whole application tree, so public routes work anonymously while the
//! guard can rely on a [`SessionContext`] having been attached whenever one exists.
//!
//! [route guard]: crate::middleware::guard
//! [`SessionContext`]: crate::auth::SessionContext

use std::sync::Arc;

use axum::extract::{OriginalUri, Request, State};
use axum::response::Response;
use axum::{routing, Json, Router};

use crate::auth::SessionContext;
use crate::middleware::{self, SessionGateLayer};

/// Returns the gateway's router.
pub fn router(state: &'static crate::State) -> Router {
	let session_gate = SessionGateLayer::optional(Arc::clone(&state.provider));

	let protected = Router::new()
		.route("/me", routing::get(session_info))
		.route_layer(axum::middleware::from_fn(middleware::guard::require_session));

	let provider_protocol = Router::new()
		.fallback(relay_to_provider)
		.with_state(state);

	Router::new()
		.route("/", routing::get(|| async { "Yoku API" }))
		.merge(protected)
		.layer(session_gate)
		.nest(&state.config.app.api_base_path, provider_protocol)
		.layer(middleware::cors::layer(&state.config.cors, &*state.provider))
		.layer(middleware::logging::layer!())
}

/// Echoes the caller's validated session.
async fn session_info(session: SessionContext) -> Json<SessionContext> {
	Json(session)
}

/// Relays a request on the provider's protocol surface to the managed service.
async fn relay_to_provider(
	State(state): State<&'static crate::State>,
	OriginalUri(uri): OriginalUri,
	request: Request,
) -> crate::Result<Response> {
	state.provider.handle_protocol_request(&uri, request).await
}

#[cfg(test)]
mod tests {
	use axum::body::Body;
	use axum::http::{Request, StatusCode};
	use http_body_util::BodyExt;
	use tower::ServiceExt;

	use super::*;
	use crate::test::{self, FakeOutcome, FakeProvider};

	fn gateway(outcome: FakeOutcome) -> Router {
		let provider = FakeProvider::new(outcome);
		let state = crate::State::with_provider(test::config(), provider);

		router(state)
	}

	#[tokio::test]
	async fn the_root_route_is_public() {
		let response = gateway(FakeOutcome::MissingCredential)
			.oneshot(Request::get("/").body(Body::empty()).unwrap())
			.await
			.unwrap();

		assert_eq!(response.status(), StatusCode::OK);
	}

	#[tokio::test]
	async fn me_requires_a_session() {
		let response = gateway(FakeOutcome::MissingCredential)
			.oneshot(Request::get("/me").body(Body::empty()).unwrap())
			.await
			.unwrap();

		assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
	}

	#[tokio::test]
	async fn me_echoes_the_session() {
		let response = gateway(FakeOutcome::Valid)
			.oneshot(Request::get("/me").body(Body::empty()).unwrap())
			.await
			.unwrap();

		assert_eq!(response.status(), StatusCode::OK);

		let body = response.into_body().collect().await.unwrap().to_bytes();
		let json = serde_json::from_slice::<serde_json::Value>(&body).unwrap();

		assert_eq!(json["subject"], test::session().subject().to_string());
	}

	#[tokio::test]
	async fn provider_protocol_requests_are_relayed() {
		let response = gateway(FakeOutcome::MissingCredential)
			.oneshot(Request::post("/auth/signinup").body(Body::empty()).unwrap())
			.await
			.unwrap();

		assert_eq!(response.status(), StatusCode::OK);

		let body = response.into_body().collect().await.unwrap().to_bytes();

		assert_eq!(body.as_ref(), b"provider protocol");
	}
}
