//! Output formatting and logging utilities

use std::fmt;
use std::fs::File;
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::{
    filter::LevelFilter, fmt::format::Writer, fmt::layer, fmt::time::FormatTime,
    layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry,
};

/// Time since the batch started, as `minutes:seconds.millis`.
struct ElapsedTimer {
    start: Instant,
}

impl ElapsedTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

fn write_elapsed(w: &mut Writer<'_>, elapsed: Duration) -> fmt::Result {
    let total_seconds = elapsed.as_secs();
    write!(
        w,
        "{:>4}:{:02}.{:03}",
        total_seconds / 60,
        total_seconds % 60,
        elapsed.subsec_millis()
    )
}

impl FormatTime for ElapsedTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write_elapsed(w, self.start.elapsed())
    }
}

/// Setup logging to file or stdout. `verbose` enables debug messages.
///
/// A subscriber that is already installed is kept.
pub fn setup_output(output_path: Option<&String>, verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    match output_path {
        Some(path) => match File::create(path) {
            Ok(log) => {
                let file_layer = layer()
                    .with_writer(log)
                    .with_timer(ElapsedTimer::new())
                    .with_ansi(false)
                    .with_filter(level);
                if Registry::default().with(file_layer).try_init().is_ok() {
                    info!("Output will be written to: {}", path);
                }
            }
            Err(err) => eprintln!("Could not create output file {}: {}", path, err),
        },
        None => {
            let stdout_layer = layer()
                .with_writer(std::io::stdout)
                .with_timer(ElapsedTimer::new())
                .with_ansi(true)
                .with_filter(level);
            if Registry::default().with(stdout_layer).try_init().is_ok() {
                info!("Output will be printed to stdout");
            }
        }
    }
}

/// Summary line of a batch: failures out of `ntests` values or entries.
pub fn print_results(nfailed: usize, ntests: usize) {
    info!("*************************************************");
    info!("Failed {} / {} tests", nfailed, ntests);
    info!("*************************************************");
}
