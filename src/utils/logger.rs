use snafu::{ResultExt, Snafu};
use std::path::Path;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Could not init log file: {}", source))]
    InitLog { source: std::io::Error },

    #[snafu(display("Could not bridge the log crate: {}", source))]
    LogBridge { source: tracing_log::log::SetLoggerError },

    #[snafu(display("Could not set the global subscriber: {}", source))]
    GlobalSubscriber {
        source: tracing::subscriber::SetGlobalDefaultError,
    },
}

/// Installs a Bunyan JSON subscriber filtered by RUST_LOG.
///
/// Without a path, logs go to stdout. A directory gets a daily rolling file,
/// any other path is opened in append mode. The returned guard must be kept
/// alive for the whole program, it flushes the non blocking writer on drop.
pub fn logger_init<P: AsRef<Path>>(
    path: Option<P>,
) -> Result<tracing_appender::non_blocking::WorkerGuard, Error> {
    LogTracer::init().context(LogBridgeSnafu)?;

    let filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info,churchfinder=debug".to_owned());

    let app_name = concat!(env!("CARGO_PKG_NAME"), "-", env!("CARGO_PKG_VERSION")).to_string();

    let (non_blocking, guard) = match path {
        None => tracing_appender::non_blocking(std::io::stdout()),
        Some(path) if path.as_ref().is_dir() => {
            let file_appender = tracing_appender::rolling::daily(path, "finder.log");
            tracing_appender::non_blocking(file_appender)
        }
        Some(path) => tracing_appender::non_blocking(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path.as_ref())
                .context(InitLogSnafu)?,
        ),
    };

    let bunyan_formatting_layer = BunyanFormattingLayer::new(app_name, non_blocking);
    let subscriber = Registry::default()
        .with(EnvFilter::new(&filter))
        .with(JsonStorageLayer)
        .with(bunyan_formatting_layer);
    tracing::subscriber::set_global_default(subscriber).context(GlobalSubscriberSnafu)?;
    Ok(guard)
}
