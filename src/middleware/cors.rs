//! CORS middleware.
//!
//! Applied before anything auth-related. The header allow-list is not hardcoded: whatever the
//! provider's frontend protocol needs is obtained from [`SessionProvider::required_cors_headers()`]
//! at startup and merged with `content-type`.

use axum::http::{header, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::auth::SessionProvider;
use crate::config;

/// Creates the gateway's CORS layer.
pub fn layer(config: &config::cors::Config, provider: &dyn SessionProvider) -> CorsLayer {
	let mut allow_headers = vec![header::CONTENT_TYPE];
	allow_headers.extend(provider.required_cors_headers());

	CorsLayer::new()
		.allow_methods([
			Method::GET,
			Method::POST,
			Method::DELETE,
			Method::PUT,
			Method::OPTIONS,
		])
		.allow_credentials(true)
		.allow_headers(allow_headers)
		.allow_origin(AllowOrigin::list(config.allowed_origins.iter().cloned()))
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::sync::Arc;

	use axum::body::Body;
	use axum::http::{header, HeaderValue, Request, StatusCode};
	use axum::{routing, Router};
	use tower::ServiceExt;

	use super::*;
	use crate::test::{FakeOutcome, FakeProvider};

	const ALLOWED_ORIGIN: &str = "http://localhost:3000";

	fn router(handler_calls: Arc<AtomicUsize>) -> Router {
		let config = config::cors::Config::from_list(ALLOWED_ORIGIN).unwrap();
		let provider = FakeProvider::new(FakeOutcome::Valid);

		Router::new()
			.route(
				"/",
				routing::post(move || {
					handler_calls.fetch_add(1, Ordering::SeqCst);
					async { "ok" }
				}),
			)
			.layer(layer(&config, &*provider))
	}

	#[tokio::test]
	async fn preflight_answers_without_reaching_handlers() {
		let handler_calls = Arc::new(AtomicUsize::new(0));
		let router = router(Arc::clone(&handler_calls));

		let request = Request::options("/")
			.header(header::ORIGIN, ALLOWED_ORIGIN)
			.header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
			.header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type,rid")
			.body(Body::empty())
			.unwrap();

		let response = router.oneshot(request).await.unwrap();

		assert_eq!(response.status(), StatusCode::OK);
		assert_eq!(handler_calls.load(Ordering::SeqCst), 0);

		assert_eq!(
			response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
			Some(&HeaderValue::from_static(ALLOWED_ORIGIN)),
		);

		let methods = response
			.headers()
			.get(header::ACCESS_CONTROL_ALLOW_METHODS)
			.and_then(|value| value.to_str().ok())
			.unwrap();

		for method in ["GET", "POST", "DELETE", "PUT", "OPTIONS"] {
			assert!(methods.contains(method), "{method} missing from {methods}");
		}

		let headers = response
			.headers()
			.get(header::ACCESS_CONTROL_ALLOW_HEADERS)
			.and_then(|value| value.to_str().ok())
			.unwrap();

		assert!(headers.contains("content-type"));
		assert!(headers.contains("rid"));

		assert_eq!(
			response.headers().get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS),
			Some(&HeaderValue::from_static("true")),
		);
	}

	#[tokio::test]
	async fn disallowed_origins_get_no_allow_origin_header() {
		let handler_calls = Arc::new(AtomicUsize::new(0));
		let router = router(Arc::clone(&handler_calls));

		let request = Request::post("/")
			.header(header::ORIGIN, "https://evil.example")
			.body(Body::empty())
			.unwrap();

		let response = router.oneshot(request).await.unwrap();

		assert_eq!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN), None);
	}
}
