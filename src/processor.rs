use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, error, info, info_span};

use crate::config::{ProcessConfig, RenderConfig};
use crate::error::RenderError;
use crate::input::{read_dzt, AmplitudeMatrix, Amplitudes, RecordingMetadata, Sample};
use crate::output::{generate_filename, write_jpeg};
use crate::render::{
    intensity_limit, plan_windows, render_figure, title, to_grayscale, WindowKind, CLIP_PERCENTILE,
};

const RECORDING_EXTENSION: &str = "dzt";

/// Outcome of one successfully processed recording
#[derive(Debug)]
pub struct FileReport {
    pub metadata: RecordingMetadata,
    pub images: Vec<PathBuf>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub failed: usize,
    pub images_written: usize,
}

/// List `.dzt` files directly inside `dir` (case-insensitive), sorted by path
pub fn find_recordings(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("failed to list directory {}", dir.display()))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_recording = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(RECORDING_EXTENSION));
        if is_recording && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Decode one recording and write its profile image(s) into `output_dir`
pub fn process_file(
    input_path: &Path,
    output_dir: &Path,
    config: &ProcessConfig,
) -> Result<FileReport> {
    let (amplitudes, metadata) = read_dzt(input_path, config.default_scans_per_meter())
        .with_context(|| format!("failed to decode {}", input_path.display()))?;

    info!(
        traces = metadata.trace_count,
        length_m = %format!("{:.2}", metadata.total_length_m),
        "data read"
    );

    let base_name = input_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "recording".to_string());

    let render = config.render();
    let images = match &amplitudes {
        Amplitudes::Int16(m) => render_matrix(m, &metadata, &base_name, output_dir, render),
        Amplitudes::Int32(m) => render_matrix(m, &metadata, &base_name, output_dir, render),
    }
    .with_context(|| format!("failed to render {}", input_path.display()))?;

    Ok(FileReport { metadata, images })
}

fn render_matrix<T: Sample>(
    matrix: &AmplitudeMatrix<T>,
    metadata: &RecordingMetadata,
    base_name: &str,
    output_dir: &Path,
    config: &RenderConfig,
) -> Result<Vec<PathBuf>, RenderError> {
    let windows = plan_windows(metadata, config);
    if windows.iter().any(|w| w.kind == WindowKind::Full) {
        info!(
            "line length {:.2} m < {} m, exporting a single image",
            metadata.total_length_m,
            config.length_threshold_m()
        );
    } else {
        info!(
            "line length {:.2} m >= {} m, splitting into {} windows",
            metadata.total_length_m,
            config.length_threshold_m(),
            windows.len()
        );
    }

    let mut written = Vec::with_capacity(windows.len());
    for window in &windows {
        let view = matrix
            .traces(window.traces.clone())
            .ok_or_else(|| RenderError::TraceRange {
                start: window.traces.start,
                end: window.traces.end,
                trace_count: metadata.trace_count,
            })?;

        let limit = intensity_limit(view.values(), CLIP_PERCENTILE);
        let image = render_figure(&to_grayscale(&view, limit), config.dpi());

        let path = output_dir.join(generate_filename(base_name, window));
        debug!(title = %title(base_name, window, metadata), limit, "rendering window");
        write_jpeg(&path, &image, config.dpi())?;
        info!("image saved: {}", path.display());
        written.push(path);
    }
    Ok(written)
}

/// Process every input in turn. A failing file is logged and skipped.
pub fn process_inputs(
    inputs: &[PathBuf],
    output_dir: &Path,
    config: &ProcessConfig,
) -> BatchSummary {
    let mut summary = BatchSummary::default();

    for path in inputs {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let _span = info_span!("recording", file = %name).entered();

        match process_file(path, output_dir, config) {
            Ok(report) => {
                summary.processed += 1;
                summary.images_written += report.images.len();
                info!("processed successfully");
            }
            Err(e) => {
                summary.failed += 1;
                error!("{:#}", e);
            }
        }
    }

    summary
}
