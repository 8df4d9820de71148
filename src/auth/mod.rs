//! Everything related to authentication.
//!
//! There is no authentication *logic* in this crate: token formats, OAuth flows, and session
//! state all live inside an external managed service. What lives here is the seam to that
//! service, the [`SessionProvider`] trait, plus the types that flow through it:
//! [`SessionContext`] for validated requests, [`Rejection`] for everything else, and the
//! three-way [`Gate`] verdict the middleware branches on.

mod session;

#[doc(inline)]
pub use session::{SessionContext, Subject};

mod provider;

#[doc(inline)]
pub use provider::{Rejection, SessionProvider, Validated};

pub mod gate;

#[doc(inline)]
pub use gate::{ClaimValidator, Gate, VerifySession};

mod remote;

#[doc(inline)]
pub use remote::RemoteProvider;
