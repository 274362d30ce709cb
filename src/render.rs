use std::ops::Range;

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};

use crate::config::RenderConfig;
use crate::input::{MatrixView, RecordingMetadata, Sample};

/// Percentile of absolute amplitude mapped to full black/white
pub const CLIP_PERCENTILE: f64 = 99.0;

/// Exported figure size in inches; pixel size is this times the DPI
pub const FIGURE_WIDTH_IN: f64 = 16.0;
pub const FIGURE_HEIGHT_IN: f64 = 8.0;
const COLORBAR_WIDTH_IN: f64 = 0.4;
const COLORBAR_GAP_IN: f64 = 0.1;
const BACKGROUND: Luma<u8> = Luma([255]);

/// Which part of a profile an image covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowKind {
    Full,
    /// 1-based window number
    Window(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderWindow {
    pub kind: WindowKind,
    pub traces: Range<usize>,
}

/// Decide which images to produce for a recording.
///
/// Lines shorter than the length threshold become one image; longer lines are
/// cut into consecutive windows of `window_traces` traces, the last one possibly shorter.
pub fn plan_windows(metadata: &RecordingMetadata, config: &RenderConfig) -> Vec<RenderWindow> {
    let total = metadata.trace_count;
    if metadata.total_length_m < config.length_threshold_m() {
        return vec![RenderWindow {
            kind: WindowKind::Full,
            traces: 0..total,
        }];
    }

    let width = config.window_traces();
    (0..total)
        .step_by(width)
        .enumerate()
        .map(|(i, start)| RenderWindow {
            kind: WindowKind::Window(i + 1),
            traces: start..(start + width).min(total),
        })
        .collect()
}

/// Symmetric intensity limit: the given percentile of |amplitude|.
///
/// Uses linear interpolation between ranks. Falls back to 1.0 when the data is all zero.
pub fn intensity_limit<T: Sample>(values: &[T], percentile: f64) -> f64 {
    if values.is_empty() {
        return 1.0;
    }
    let mut magnitudes: Vec<f64> = values.iter().map(|&v| v.into().abs()).collect();
    magnitudes.sort_by(f64::total_cmp);

    let rank = (percentile / 100.0).clamp(0.0, 1.0) * (magnitudes.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let limit = magnitudes[lower] + (magnitudes[upper] - magnitudes[lower]) * (rank - lower as f64);

    if limit > 0.0 {
        limit
    } else {
        1.0
    }
}

/// Map one amplitude onto 0..=255 over `[-limit, limit]`
fn gray_level(value: f64, limit: f64) -> u8 {
    let scaled = (value + limit) / (2.0 * limit);
    (scaled.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Render a trace window as a grayscale image: x = trace, y = sample
pub fn to_grayscale<T: Sample>(view: &MatrixView<'_, T>, limit: f64) -> GrayImage {
    let (samples, traces) = view.shape();
    let mut img = GrayImage::new(traces as u32, samples as u32);
    for (x, column) in view.columns().enumerate() {
        for (y, &value) in column.iter().enumerate() {
            img.put_pixel(x as u32, y as u32, Luma([gray_level(value.into(), limit)]));
        }
    }
    img
}

fn inches_to_px(inches: f64, dpi: u16) -> u32 {
    (inches * dpi as f64).round().max(1.0) as u32
}

/// Pixel dimensions of a figure at `dpi`
pub fn figure_size(dpi: u16) -> (u32, u32) {
    (
        inches_to_px(FIGURE_WIDTH_IN, dpi),
        inches_to_px(FIGURE_HEIGHT_IN, dpi),
    )
}

/// Place a profile on a fixed-size figure.
///
/// The profile is stretched over the plot area regardless of its trace count,
/// with a colour bar strip on the right running from `+limit` (white, top)
/// to `-limit` (black, bottom).
pub fn render_figure(profile: &GrayImage, dpi: u16) -> GrayImage {
    let (width, height) = figure_size(dpi);
    let bar = inches_to_px(COLORBAR_WIDTH_IN, dpi);
    let gap = inches_to_px(COLORBAR_GAP_IN, dpi);
    let plot_width = width.saturating_sub(bar + gap).max(1);

    let mut figure = GrayImage::from_pixel(width, height, BACKGROUND);
    if profile.width() > 0 && profile.height() > 0 {
        let plot = imageops::resize(profile, plot_width, height, FilterType::Triangle);
        imageops::replace(&mut figure, &plot, 0, 0);
    }

    for y in 0..height {
        let level = colorbar_level(y, height);
        for x in width.saturating_sub(bar)..width {
            figure.put_pixel(x, y, Luma([level]));
        }
    }
    figure
}

fn colorbar_level(row: u32, height: u32) -> u8 {
    if height <= 1 {
        return u8::MAX;
    }
    let fraction = 1.0 - row as f64 / (height - 1) as f64;
    (fraction * 255.0).round() as u8
}

/// Human-readable image title
pub fn title(base_name: &str, window: &RenderWindow, metadata: &RecordingMetadata) -> String {
    match window.kind {
        WindowKind::Full => format!(
            "GPR Profile: {} (Length: {:.2} m)",
            base_name, metadata.total_length_m
        ),
        WindowKind::Window(i) => format!("GPR Profile: {} - Window {}", base_name, i),
    }
}
