//! The gateway's three-way verdict.
//!
//! Instead of an imperative "abort" buried inside a callback, the gateway step produces an
//! explicit [`Gate`] value and the middleware drives the pipeline off it. Per request, the
//! state machine is `Unvalidated -> {Validated, Anonymous, Rejected}`: [`Gate::Continue`] and
//! [`Gate::ContinueAnonymous`] both permit continuation, [`Gate::Halt`] is terminal.

use std::fmt;
use std::sync::Arc;

use axum::http::request;

use super::{Rejection, SessionProvider, Validated};

/// Options recognized by the session gateway for a given route tree.
#[derive(Clone, Default)]
pub struct VerifySession {
	/// Whether absence of a valid session should immediately reject the request.
	///
	/// When `false`, requests without a session are forwarded anonymously, i.e. without a
	/// [`SessionContext`] attached.
	///
	/// [`SessionContext`]: crate::auth::SessionContext
	pub session_required: bool,

	/// Custom claim checks that replace the gateway's global validators wholesale.
	pub override_global_claim_validators: Option<Vec<Arc<dyn ClaimValidator>>>,
}

impl VerifySession {
	/// Options that reject requests without a valid session.
	pub fn required() -> Self {
		Self { session_required: true, override_global_claim_validators: None }
	}

	/// Options that forward requests without a valid session anonymously.
	pub fn optional() -> Self {
		Self { session_required: false, override_global_claim_validators: None }
	}
}

impl fmt::Debug for VerifySession {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("VerifySession")
			.field("session_required", &self.session_required)
			.field(
				"override_global_claim_validators",
				&self
					.override_global_claim_validators
					.as_ref()
					.map(|validators| validators.iter().map(|v| v.id().to_owned()).collect::<Vec<_>>()),
			)
			.finish()
	}
}

/// A check against the access token claims of an otherwise valid session.
pub trait ClaimValidator: Send + Sync + 'static {
	/// An identifier for this validator, used in rejection messages and logs.
	fn id(&self) -> &str;

	/// Returns whether `claims` are acceptable.
	fn validate(&self, claims: &serde_json::Value) -> bool;
}

/// The gateway's verdict for a single request.
#[derive(Debug)]
pub enum Gate {
	/// A valid session exists; forward the request with it attached.
	Continue(Validated),

	/// No valid session exists, but none is required; forward the request without one.
	ContinueAnonymous,

	/// The pipeline must stop. No downstream handler may run; the response is an
	/// unauthorized rejection built from the carried reason.
	Halt(Rejection),
}

/// Evaluates the gateway step for one request.
///
/// `globals` are the gateway-wide claim validators; `options` may override them per route tree.
#[tracing::instrument(level = "debug", skip(provider, globals, request), ret(level = "debug"))]
pub async fn evaluate(
	provider: &dyn SessionProvider,
	options: &VerifySession,
	globals: &[Arc<dyn ClaimValidator>],
	request: &request::Parts,
) -> Gate {
	let validated = match provider.validate_session(request).await {
		Ok(validated) => validated,
		Err(rejection) => {
			if let Rejection::Transport(ref reason) = rejection {
				tracing::warn! {
					target: "yoku_api::audit_log",
					%reason,
					"provider unreachable during session validation",
				};
			}

			return if options.session_required {
				Gate::Halt(rejection)
			} else {
				Gate::ContinueAnonymous
			};
		}
	};

	let validators = options
		.override_global_claim_validators
		.as_deref()
		.unwrap_or(globals);

	// A session that exists but carries unacceptable claims is rejected even on anonymous
	// routes; "no session" and "bad session" are different things.
	for validator in validators {
		if !validator.validate(validated.context.access_token_payload()) {
			return Gate::Halt(Rejection::FailedClaim { claim: validator.id().to_owned() });
		}
	}

	Gate::Continue(validated)
}
