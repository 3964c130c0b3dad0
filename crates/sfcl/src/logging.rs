use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::Registry;

use crate::args::GlobalArgs;

/// Install the tracing subscriber.
///
/// Logs go to stderr and, with `--log-file`, to that file as well.
/// `RUST_LOG` wins over the level picked from `-q`/`-v`.
///
/// The returned guard must be kept alive for file logging to flush.
pub fn init_tracing(args: &GlobalArgs) -> Option<WorkerGuard> {
    let level = match (args.quiet, args.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_filter(filter());

    let (file_layer, guard) = match &args.log_file {
        Some(path) => {
            let directory = path.parent().map_or(".", |dir| {
                if dir.as_str().is_empty() {
                    "."
                } else {
                    dir.as_str()
                }
            });
            let file_name = path.file_name().unwrap_or("sfcl.log");
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_thread_ids(true)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    Registry::default().with(stderr_layer).with(file_layer).init();

    guard
}
