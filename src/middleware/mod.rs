//! This module contains the gateway's middleware.
//!
//! Middlewares are implemented as [tower services].
//! This means they can integrate with [`axum`], our HTTP framework, but are
//! also re-usable independently of that.
//!
//! Ordering in the chain matters: CORS runs first, then the session gate, and [`guard`] only
//! ever runs behind the gate. The guard does no validation of its own, so a chain without the
//! gate upstream rejects every request.
//!
//! [tower services]: tower::Service

pub(crate) mod logging;

pub mod cors;
pub mod guard;
pub mod session_gate;

pub use session_gate::SessionGateLayer;

mod error;
pub use error::{Error, Result};
