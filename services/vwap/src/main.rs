use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use vwap_service::aggregator::VwapAggregator;
use vwap_service::pipeline::{self, DEFAULT_QUEUE_CAPACITY};
use vwap_service::report::{ReportFormat, ReportWriter};

/// Hourly per-security VWAP reports from a NASDAQ ITCH 5.0 feed file.
#[derive(Parser, Debug)]
#[command(name = "vwap", version)]
struct Args {
    /// Report file format
    #[arg(value_enum)]
    format: ReportFormat,

    /// Path to the binary ITCH feed
    input: PathBuf,

    /// Directory for per-hour report files (created if missing)
    output_dir: PathBuf,

    /// Bound on the in-flight message queue
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY)]
    queue_capacity: usize,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    info!(
        input = %args.input.display(),
        output = %args.output_dir.display(),
        "starting VWAP service"
    );

    let reports = ReportWriter::new(&args.output_dir, args.format).with_context(|| {
        format!(
            "creating output directory {}",
            args.output_dir.display()
        )
    })?;
    let mut aggregator = VwapAggregator::new(reports);

    let file = File::open(&args.input)
        .with_context(|| format!("opening feed {}", args.input.display()))?;
    let stats = pipeline::run(
        BufReader::new(file),
        &mut aggregator,
        args.queue_capacity,
    )?;

    info!(
        frames = stats.frames_decoded,
        unknown = stats.unknown_skipped,
        applied = stats.messages_applied,
        dropped = stats.messages_dropped,
        reports = aggregator.reports_written(),
        "feed complete"
    );
    Ok(())
}
