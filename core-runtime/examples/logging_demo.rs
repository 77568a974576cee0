//! Logging setup demonstration
//!
//! Run with:
//! ```bash
//! # Pretty format (default in debug)
//! cargo run -p core-runtime --example logging_demo
//!
//! # JSON format
//! cargo run -p core-runtime --example logging_demo -- json
//!
//! # Compact format with a custom filter
//! cargo run -p core-runtime --example logging_demo -- compact "core_playback=trace"
//! ```

use core_runtime::logging::{init_logging, LogFormat, LogLevel, LoggingConfig};
use std::env;
use tracing::{debug, info, instrument, trace};

fn main() {
    let args: Vec<String> = env::args().collect();

    let format = match args.get(1).map(String::as_str) {
        Some("json") => LogFormat::Json,
        Some("compact") => LogFormat::Compact,
        Some("pretty") => LogFormat::Pretty,
        _ => LogFormat::default(),
    };

    let mut config = LoggingConfig::default()
        .with_format(format)
        .with_level(LogLevel::Trace)
        .with_thread_info(true);

    if let Some(filter) = args.get(2) {
        config = config.with_filter(filter.clone());
    }

    if let Err(e) = init_logging(config) {
        eprintln!("{}", e);
        return;
    }

    info!(format = ?format, "Logging initialized");
    simulate_track(3);
    info!("Demo complete");
}

#[instrument]
fn simulate_track(chunks: usize) {
    info!("Track loaded");
    for index in 0..chunks {
        trace!(target: "core_playback", index, frames = 4096, "Holding buffer");
    }
    debug!(target: "core_playback", "Decoder confirmed seek");
    debug!(target: "core_playback", "Sink not ready at end of track, end of stream deferred");
}
