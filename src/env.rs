//! Typed access to environment variables.

use std::fmt::Debug;
use std::result::Result as StdResult;
use std::str::FromStr;

use thiserror::Error as ThisError;

#[allow(clippy::missing_docs_in_private_items)]
pub(crate) type Result<T> = StdResult<T, Error>;

/// Any errors that can occur while reading environment variables.
#[derive(Debug, ThisError)]
pub enum Error {
	/// A required variable was not set.
	#[error("missing environment variable `{var}`")]
	Missing {
		/// The variable we tried to read.
		var: &'static str,
	},

	/// A variable was set, but could not be parsed into the desired type.
	#[error("failed to parse environment variable `{var}`: {message}")]
	Parse {
		/// The variable we tried to read.
		var: &'static str,

		/// The parser's error message.
		message: String,
	},
}

/// Reads the environment variable `var` and parses it into a `T`.
pub(crate) fn get<T>(var: &'static str) -> Result<T>
where
	T: FromStr,
	<T as FromStr>::Err: std::error::Error,
{
	std::env::var(var)
		.map_err(|_| Error::Missing { var })?
		.parse::<T>()
		.map_err(|err| Error::Parse { var, message: err.to_string() })
}

/// Reads the environment variable `var` if it is set.
///
/// Returns `None` if the variable is missing, and an error only if it is set but unparseable.
pub(crate) fn get_opt<T>(var: &'static str) -> Result<Option<T>>
where
	T: FromStr,
	<T as FromStr>::Err: std::error::Error,
{
	match std::env::var(var) {
		Ok(raw) => raw
			.parse::<T>()
			.map(Some)
			.map_err(|err| Error::Parse { var, message: err.to_string() }),
		Err(_) => Ok(None),
	}
}

/// Reads the environment variable `var`, falling back to `default` if it is not set.
pub(crate) fn get_or<T>(var: &'static str, default: impl Into<T>) -> Result<T>
where
	T: FromStr,
	<T as FromStr>::Err: std::error::Error,
{
	get_opt(var).map(|value| value.unwrap_or_else(|| default.into()))
}
