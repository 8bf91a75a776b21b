// Logging setup for creature-notifier

use std::sync::OnceLock;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use super::config::{ConfigError, LoggingSettings};

// Non-blocking writers flush on drop, so their guards live until exit
static LOG_GUARD: OnceLock<Vec<WorkerGuard>> = OnceLock::new();

/// Install the global subscriber described by `[logging]`.
///
/// `verbose` forces the stderr layer on and lowers this crate to DEBUG so
/// every filter decision is traced. An unusable `log_file` is reported as a
/// `ConfigError` before anything is installed.
pub fn init_logging(settings: &LoggingSettings, verbose: bool) -> Result<(), ConfigError> {
    let mut guards = Vec::new();

    let file_layer = match settings.file_path()? {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
            let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .filename_prefix(name.unwrap_or_default())
                .build(dir.unwrap_or_else(|| std::path::Path::new(".")))
                .map_err(|e| {
                    ConfigError::Invalid(format!("logging.log_file {}: {e}", path.display()))
                })?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            guards.push(guard);

            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_target(false),
            )
        }
        None => None,
    };

    // stdout carries dry-run output, so the console layer goes to stderr
    let console_layer = (settings.console || verbose).then(|| {
        let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
        guards.push(guard);
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(file_layer)
        .with(console_layer)
        .init();

    let _ = LOG_GUARD.set(guards);
    Ok(())
}

/// `RUST_LOG` if set, INFO otherwise; `verbose` adds `creature_notifier=debug`
fn env_filter(verbose: bool) -> EnvFilter {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();
    match "creature_notifier=debug".parse() {
        Ok(directive) if verbose => filter.add_directive(directive),
        _ => filter,
    }
}
