use std::io;

use thiserror::Error;

/// Reasons a single recording cannot be decoded.
///
/// Each variant is scoped to one file; a batch run logs it and moves on.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("header is {len} bytes, expected at least {expected}")]
    TruncatedHeader { len: usize, expected: usize },

    #[error(
        "invalid header parameters: \
         samples_per_trace={samples_per_trace}, bits_per_sample={bits_per_sample}"
    )]
    InvalidHeaderParameters {
        samples_per_trace: i16,
        bits_per_sample: i16,
    },

    #[error("{bits}-bit samples are not supported for data reads")]
    UnsupportedSampleWidth { bits: u16 },

    #[error(
        "no complete traces: data region is {data_len} bytes, one trace needs {bytes_per_trace}"
    )]
    EmptyRecording { data_len: u64, bytes_per_trace: u64 },

    #[error("failed to read sample data")]
    DataReadFailure(#[source] io::Error),

    #[error("failed to open recording")]
    Open(#[source] io::Error),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to encode image")]
    Image(#[from] image::ImageError),

    #[error("failed to write image")]
    Io(#[from] io::Error),

    #[error("trace window {start}..{end} is outside 0..{trace_count}")]
    TraceRange {
        start: usize,
        end: usize,
        trace_count: usize,
    },
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: String },

    #[error("{name} must be at most {max}, got {value}")]
    TooLarge {
        name: &'static str,
        value: String,
        max: String,
    },
}
