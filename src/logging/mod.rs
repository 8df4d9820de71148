//! Log-capturing facilities.

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod stderr;
mod files;

/// Initializes [`tracing-subscriber`].
///
/// Logs always go to STDERR; when `YOKU_API_LOG_DIR` is set, they additionally go to daily
/// rolling files in that directory as JSON.
///
/// NOTE: the returned [`WorkerGuard`] (if any) performs cleanup for the tracing layer that
///       emits logs to files, which means it has to stay alive until the program exits!
///
/// [`tracing-subscriber`]: tracing_subscriber
pub fn init() -> anyhow::Result<Option<WorkerGuard>> {
	let registry = tracing_subscriber::registry().with(stderr::layer());

	match files::layer().context("files layer")? {
		None => {
			registry.init();
			Ok(None)
		}
		Some((files_layer, guard, log_dir)) => {
			registry.with(files_layer).init();

			tracing::info! {
				target: "yoku_api::audit_log",
				dir = %log_dir.display(),
				"initialized file logging",
			};

			Ok(Some(guard))
		}
	}
}
