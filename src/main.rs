use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use dzt_render::config::{self, ProcessConfig, RenderConfig};
use dzt_render::processor;

const DEFAULT_OUTPUT_DIR: &str = "JPG_Output_Final";

/// Decode GSSI DZT radar recordings and export grayscale profile images
#[derive(Parser, Debug)]
#[command(name = "dzt-render")]
#[command(version, about, long_about = None)]
struct Args {
    /// DZT file, or directory to scan for *.dzt files
    #[arg(value_name = "INPUT", default_value = ".")]
    input: PathBuf,

    /// Output directory for images [default: <input dir>/JPG_Output_Final]
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Scans per meter to use when the header value is zero or negative
    #[arg(short, long, default_value_t = config::DEFAULT_SCANS_PER_METER)]
    scans_per_meter: f64,

    /// Lines at least this long (meters) are split into windows
    #[arg(short, long, default_value_t = config::DEFAULT_LENGTH_THRESHOLD_M)]
    length_threshold: f64,

    /// Traces per image when splitting long lines
    #[arg(short, long, default_value_t = config::DEFAULT_WINDOW_TRACES)]
    window_traces: usize,

    /// Image resolution; each figure is 16 x 8 inches at this DPI
    #[arg(long, default_value_t = config::DEFAULT_DPI)]
    dpi: u16,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let render = RenderConfig::new(args.length_threshold, args.window_traces, args.dpi)?;
    let config = ProcessConfig::new(args.scans_per_meter, render)?;

    let (inputs, input_dir) = if args.input.is_dir() {
        (processor::find_recordings(&args.input)?, args.input.clone())
    } else {
        let parent = args.input.parent().unwrap_or(Path::new(".")).to_path_buf();
        (vec![args.input.clone()], parent)
    };

    if inputs.is_empty() {
        warn!("No .dzt files found in {}", input_dir.display());
        return Ok(());
    }

    // Create output directory if it doesn't exist
    let output_dir = args.output_dir.unwrap_or_else(|| input_dir.join(DEFAULT_OUTPUT_DIR));
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("failed to create output directory {}", output_dir.display()))?;

    info!("Processing {} recording(s) into {}", inputs.len(), output_dir.display());
    let summary = processor::process_inputs(&inputs, &output_dir, &config);

    info!(
        "Done: {} processed, {} failed, {} image(s) written",
        summary.processed, summary.failed, summary.images_written
    );
    Ok(())
}
