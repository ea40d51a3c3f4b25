use std::path::Path;

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize tracing for a host process.
///
/// `RUST_LOG` overrides the default filter. With a `log_dir`, events are
/// additionally written to a daily-rolling file there; the returned guard
/// must be kept alive for the file writer to flush.
pub fn init_logging(log_dir: Option<&Path>, verbose: bool) -> Result<Option<WorkerGuard>> {
    let default_filter = if verbose {
        "manikin=debug,warn"
    } else {
        "manikin=info,warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let registry = tracing_subscriber::registry().with(filter);

    match log_dir {
        Some(dir) => {
            let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, "manikin.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            registry
                .with(fmt::layer().with_target(true))
                .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
                .init();
            Ok(Some(guard))
        }
        None => {
            registry.with(fmt::layer().with_target(true)).init();
            Ok(None)
        }
    }
}
