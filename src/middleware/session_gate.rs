//! The session gateway middleware.
//!
//! This is the [`tower::Service`] that intercepts every inbound request before application
//! handlers run, delegates session validation to the external provider, and branches on the
//! resulting [`Gate`] verdict:
//!
//!   - [`Gate::Continue`]: the request is forwarded with a [`SessionContext`] attached to its
//!     extensions; any headers the provider issued during validation (e.g. a rotated access
//!     token cookie) are appended to the final response.
//!   - [`Gate::ContinueAnonymous`]: the request is forwarded without a session.
//!   - [`Gate::Halt`]: the inner service is never polled; an unauthorized response is written
//!     and nothing else touches it.
//!
//! [`SessionContext`]: crate::auth::SessionContext

use std::sync::Arc;
use std::task::{self, Poll};

use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use futures::future::BoxFuture;

use crate::auth::{gate, ClaimValidator, Gate, SessionProvider, VerifySession};
use crate::middleware::Error;

/// A layer producing the [`SessionGate`] middleware.
#[derive(Clone)]
pub struct SessionGateLayer {
	/// The external authentication provider.
	provider: Arc<dyn SessionProvider>,

	/// The verification options for this route tree.
	options: VerifySession,

	/// Claim validators applied to every validated session, unless overridden in `options`.
	global_claim_validators: Arc<[Arc<dyn ClaimValidator>]>,
}

impl SessionGateLayer {
	/// Creates a gate that rejects requests without a valid session.
	pub fn new(provider: Arc<dyn SessionProvider>) -> Self {
		Self::with_options(provider, VerifySession::required())
	}

	/// Creates a gate that forwards requests without a valid session anonymously.
	pub fn optional(provider: Arc<dyn SessionProvider>) -> Self {
		Self::with_options(provider, VerifySession::optional())
	}

	/// Creates a gate with custom [`VerifySession`] options.
	pub fn with_options(provider: Arc<dyn SessionProvider>, options: VerifySession) -> Self {
		Self {
			provider,
			options,
			global_claim_validators: Arc::from(Vec::new()),
		}
	}

	/// Sets the gateway-wide claim validators.
	pub fn with_global_claim_validators(
		mut self,
		validators: Vec<Arc<dyn ClaimValidator>>,
	) -> Self {
		self.global_claim_validators = Arc::from(validators);
		self
	}
}

impl<S> tower::Layer<S> for SessionGateLayer {
	type Service = SessionGate<S>;

	fn layer(&self, inner: S) -> Self::Service {
		SessionGate {
			provider: Arc::clone(&self.provider),
			options: self.options.clone(),
			global_claim_validators: Arc::clone(&self.global_claim_validators),
			inner,
		}
	}
}

/// The middleware created by [`SessionGateLayer`].
#[derive(Clone)]
pub struct SessionGate<S> {
	/// The external authentication provider.
	provider: Arc<dyn SessionProvider>,

	/// The verification options for this route tree.
	options: VerifySession,

	/// Claim validators applied to every validated session, unless overridden in `options`.
	global_claim_validators: Arc<[Arc<dyn ClaimValidator>]>,

	/// The inner service.
	inner: S,
}

impl<S> tower::Service<Request> for SessionGate<S>
where
	S: tower::Service<Request, Response = Response> + Clone + Send + 'static,
	S::Future: Send,
	S::Error: Send,
{
	type Response = Response;
	type Error = S::Error;
	type Future = BoxFuture<'static, Result<Response, S::Error>>;

	fn poll_ready(&mut self, cx: &mut task::Context<'_>) -> Poll<Result<(), Self::Error>> {
		self.inner.poll_ready(cx)
	}

	fn call(&mut self, req: Request) -> Self::Future {
		let provider = Arc::clone(&self.provider);
		let options = self.options.clone();
		let validators = Arc::clone(&self.global_claim_validators);
		let inner = self.inner.clone();

		Box::pin(svc_impl(provider, options, validators, inner, req))
	}
}

/// The relevant implementation of `<SessionGate as tower::Service>::call()`.
#[tracing::instrument(
	level = "debug",
	skip_all,
	fields(method = %req.method(), uri = %req.uri()),
)]
async fn svc_impl<S>(
	provider: Arc<dyn SessionProvider>,
	options: VerifySession,
	validators: Arc<[Arc<dyn ClaimValidator>]>,
	mut inner: S,
	req: Request,
) -> Result<Response, S::Error>
where
	S: tower::Service<Request, Response = Response> + Send,
	S::Future: Send,
{
	let (parts, body) = req.into_parts();

	match gate::evaluate(&*provider, &options, &validators, &parts).await {
		Gate::Halt(rejection) => {
			tracing::debug!(%rejection, "halting request at the session gate");

			Ok(Error::from(rejection).into_response())
		}
		Gate::ContinueAnonymous => inner.call(Request::from_parts(parts, body)).await,
		Gate::Continue(validated) => {
			let mut req = Request::from_parts(parts, body);
			req.extensions_mut().insert(validated.context);

			let mut response = inner.call(req).await?;

			// The provider already wrote these during validation; append, never overwrite,
			// so nothing the handler set gets clobbered.
			for (name, value) in &validated.response_headers {
				response.headers_mut().append(name, value.clone());
			}

			Ok(response)
		}
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::Ordering;

	use axum::body::Body;
	use axum::http::{header, Request, StatusCode};
	use axum::{routing, Router};
	use http_body_util::BodyExt;
	use tower::ServiceExt;

	use super::*;
	use crate::auth::SessionContext;
	use crate::test::{self, FakeOutcome, FakeProvider};

	fn router(layer: SessionGateLayer) -> Router {
		Router::new()
			.route(
				"/whoami",
				routing::get(|session: Option<axum::Extension<SessionContext>>| async move {
					match session {
						Some(axum::Extension(session)) => session.subject().to_string(),
						None => String::from("anonymous"),
					}
				}),
			)
			.layer(layer)
	}

	#[tokio::test]
	async fn required_gate_rejects_credentialless_requests() {
		let provider = FakeProvider::new(FakeOutcome::MissingCredential);
		let router = router(SessionGateLayer::new(Arc::clone(&provider) as _));

		let response = router
			.oneshot(Request::get("/whoami").body(Body::empty()).unwrap())
			.await
			.unwrap();

		assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
		assert_eq!(provider.validations.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn valid_session_reaches_the_handler_exactly_once() {
		let provider = FakeProvider::new(FakeOutcome::Valid);
		let router = router(SessionGateLayer::new(Arc::clone(&provider) as _));

		let response = router
			.oneshot(Request::get("/whoami").body(Body::empty()).unwrap())
			.await
			.unwrap();

		assert_eq!(response.status(), StatusCode::OK);
		assert_eq!(provider.validations.load(Ordering::SeqCst), 1);

		let body = response.into_body().collect().await.unwrap().to_bytes();

		assert_eq!(body.as_ref(), test::session().subject().to_string().as_bytes());
	}

	#[tokio::test]
	async fn optional_gate_forwards_anonymously() {
		let provider = FakeProvider::new(FakeOutcome::MissingCredential);
		let router = router(SessionGateLayer::optional(Arc::clone(&provider) as _));

		let response = router
			.oneshot(Request::get("/whoami").body(Body::empty()).unwrap())
			.await
			.unwrap();

		assert_eq!(response.status(), StatusCode::OK);

		let body = response.into_body().collect().await.unwrap().to_bytes();

		assert_eq!(body.as_ref(), b"anonymous");
	}

	#[tokio::test]
	async fn provider_refresh_headers_are_appended() {
		let provider = FakeProvider::new(FakeOutcome::ValidWithRefresh);
		let router = router(SessionGateLayer::new(Arc::clone(&provider) as _));

		let response = router
			.oneshot(Request::get("/whoami").body(Body::empty()).unwrap())
			.await
			.unwrap();

		assert_eq!(response.status(), StatusCode::OK);

		let cookie = response
			.headers()
			.get(header::SET_COOKIE)
			.and_then(|value| value.to_str().ok())
			.unwrap();

		assert!(cookie.contains("sAccessToken="));
	}

	#[tokio::test]
	async fn transport_failure_is_unauthorized_not_5xx() {
		let provider = FakeProvider::new(FakeOutcome::Unreachable);
		let router = router(SessionGateLayer::new(Arc::clone(&provider) as _));

		let response = router
			.oneshot(Request::get("/whoami").body(Body::empty()).unwrap())
			.await
			.unwrap();

		assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

		let body = response.into_body().collect().await.unwrap().to_bytes();
		let json = serde_json::from_slice::<serde_json::Value>(&body).unwrap();

		// Transport details stay in the logs.
		assert_eq!(json["message"], "session could not be verified");
	}

	#[tokio::test]
	async fn halted_requests_never_reach_the_inner_service() {
		let provider = FakeProvider::new(FakeOutcome::Invalid);

		let handler_calls = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
		let counter = std::sync::Arc::clone(&handler_calls);

		let router = Router::new()
			.route(
				"/",
				routing::get(move || {
					counter.fetch_add(1, Ordering::SeqCst);
					async { "ok" }
				}),
			)
			.layer(SessionGateLayer::new(Arc::clone(&provider) as _));

		let response = router
			.oneshot(Request::get("/").body(Body::empty()).unwrap())
			.await
			.unwrap();

		assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
		assert_eq!(handler_calls.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn failing_claims_halt_the_request() {
		let provider = FakeProvider::new(FakeOutcome::Valid);
		let layer = SessionGateLayer::new(Arc::clone(&provider) as _)
			.with_global_claim_validators(vec![Arc::new(test::RejectAllClaims)]);

		let response = router(layer)
			.oneshot(Request::get("/whoami").body(Body::empty()).unwrap())
			.await
			.unwrap();

		assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
	}
}
