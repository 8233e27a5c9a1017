use billa_core::config::LoggingSettings;
use billa_infrastructure::BillaPaths;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over the configured level. Console output goes to stderr
/// so command output on stdout stays clean. With file logging on, a daily
/// rolling file is written under the logs directory; the returned guard must
/// be held until exit to flush it.
pub fn init_logging(settings: &LoggingSettings, paths: &BillaPaths) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    let (file_layer, guard) = match settings.file_logging.then(|| paths.logs_dir()) {
        Some(Ok(dir)) => {
            let appender = tracing_appender::rolling::daily(dir, "billa.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        Some(Err(e)) => {
            eprintln!("File logging disabled: {}", e);
            (None, None)
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .init();

    guard
}
