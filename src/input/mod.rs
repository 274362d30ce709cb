pub mod dzt;
pub mod header;
pub mod matrix;

use std::ops::Range;
use std::slice::ChunksExact;

pub use dzt::read_dzt;
pub use matrix::Sample;

/// Sample width declared by the header. Only these three values pass validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitsPerSample {
    Eight,
    Sixteen,
    ThirtyTwo,
}

impl BitsPerSample {
    pub fn from_raw(bits: i16) -> Option<Self> {
        match bits {
            8 => Some(BitsPerSample::Eight),
            16 => Some(BitsPerSample::Sixteen),
            32 => Some(BitsPerSample::ThirtyTwo),
            _ => None,
        }
    }

    pub fn bits(&self) -> u16 {
        match self {
            BitsPerSample::Eight => 8,
            BitsPerSample::Sixteen => 16,
            BitsPerSample::ThirtyTwo => 32,
        }
    }

    pub fn bytes_per_sample(&self) -> usize {
        self.bits() as usize / 8
    }
}

/// Where the horizontal sampling density came from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScanDensitySource {
    Header,
    /// Header value was not a positive number; the caller's default was used
    Fallback { decoded: f32 },
}

/// Header-only metadata, before the data region has been measured
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderMetadata {
    pub samples_per_trace: usize,
    pub bits_per_sample: BitsPerSample,
    pub scans_per_meter: f64,
    pub scan_density_source: ScanDensitySource,
}

impl HeaderMetadata {
    pub fn bytes_per_trace(&self) -> u64 {
        (self.samples_per_trace * self.bits_per_sample.bytes_per_sample()) as u64
    }

    /// Attach the trace count measured from the data region
    pub fn complete(&self, trace_count: usize) -> RecordingMetadata {
        RecordingMetadata {
            samples_per_trace: self.samples_per_trace,
            bits_per_sample: self.bits_per_sample,
            scans_per_meter: self.scans_per_meter,
            scan_density_source: self.scan_density_source,
            trace_count,
            total_length_m: trace_count as f64 / self.scans_per_meter,
        }
    }
}

/// Metadata about one decoded recording
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingMetadata {
    pub samples_per_trace: usize,
    pub bits_per_sample: BitsPerSample,
    pub scans_per_meter: f64,
    pub scan_density_source: ScanDensitySource,
    pub trace_count: usize,
    pub total_length_m: f64,
}

/// Amplitude samples indexed `[sample, trace]`.
///
/// Storage is column-major: every trace is one contiguous run of
/// `samples_per_trace` values, traces in stream order.
#[derive(Debug, Clone, PartialEq)]
pub struct AmplitudeMatrix<T> {
    samples_per_trace: usize,
    data: Vec<T>,
}

impl<T: Copy> AmplitudeMatrix<T> {
    /// `data.len()` must be a whole number of traces; any tail is dropped
    pub fn from_column_major(samples_per_trace: usize, mut data: Vec<T>) -> Self {
        let whole = if samples_per_trace == 0 {
            0
        } else {
            data.len() / samples_per_trace * samples_per_trace
        };
        data.truncate(whole);
        Self {
            samples_per_trace,
            data,
        }
    }

    /// `(samples_per_trace, trace_count)`
    pub fn shape(&self) -> (usize, usize) {
        self.view().shape()
    }

    pub fn get(&self, sample: usize, trace: usize) -> Option<T> {
        self.view().get(sample, trace)
    }

    pub fn trace(&self, trace: usize) -> Option<&[T]> {
        let start = trace.checked_mul(self.samples_per_trace)?;
        self.data.get(start..start + self.samples_per_trace)
    }

    pub fn view(&self) -> MatrixView<'_, T> {
        MatrixView {
            samples_per_trace: self.samples_per_trace,
            data: &self.data,
        }
    }

    /// Borrow a contiguous window of traces without copying
    pub fn traces(&self, traces: Range<usize>) -> Option<MatrixView<'_, T>> {
        if traces.start > traces.end {
            return None;
        }
        let start = traces.start.checked_mul(self.samples_per_trace)?;
        let end = traces.end.checked_mul(self.samples_per_trace)?;
        Some(MatrixView {
            samples_per_trace: self.samples_per_trace,
            data: self.data.get(start..end)?,
        })
    }
}

/// Borrowed trace window over an [`AmplitudeMatrix`]
#[derive(Debug, Clone, Copy)]
pub struct MatrixView<'a, T> {
    samples_per_trace: usize,
    data: &'a [T],
}

impl<'a, T: Copy> MatrixView<'a, T> {
    pub fn shape(&self) -> (usize, usize) {
        let traces = if self.samples_per_trace == 0 {
            0
        } else {
            self.data.len() / self.samples_per_trace
        };
        (self.samples_per_trace, traces)
    }

    pub fn get(&self, sample: usize, trace: usize) -> Option<T> {
        if sample >= self.samples_per_trace {
            return None;
        }
        let index = trace.checked_mul(self.samples_per_trace)? + sample;
        self.data.get(index).copied()
    }

    /// All samples in column-major order
    pub fn values(&self) -> &'a [T] {
        self.data
    }

    /// Iterate traces (columns) in order
    pub fn columns(&self) -> ChunksExact<'a, T> {
        self.data.chunks_exact(self.samples_per_trace.max(1))
    }
}

/// Decoded sample matrix at the width the recording was stored with
#[derive(Debug, Clone, PartialEq)]
pub enum Amplitudes {
    Int16(AmplitudeMatrix<i16>),
    Int32(AmplitudeMatrix<i32>),
}

impl Amplitudes {
    pub fn shape(&self) -> (usize, usize) {
        match self {
            Amplitudes::Int16(m) => m.shape(),
            Amplitudes::Int32(m) => m.shape(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn sequential(samples_per_trace: usize, traces: usize) -> AmplitudeMatrix<i16> {
        let data = (0..(samples_per_trace * traces) as i16).collect();
        AmplitudeMatrix::from_column_major(samples_per_trace, data)
    }

    #[test]
    fn column_major_fill() {
        let matrix = sequential(2, 3);
        assert_eq!(matrix.shape(), (2, 3));
        assert_eq!(matrix.trace(0), Some(&[0, 1][..]));
        assert_eq!(matrix.trace(1), Some(&[2, 3][..]));
        assert_eq!(matrix.trace(2), Some(&[4, 5][..]));
        assert_eq!(matrix.trace(3), None);
        for t in 0..3 {
            for s in 0..2 {
                assert_eq!(matrix.get(s, t), Some((t * 2 + s) as i16));
            }
        }
        assert_eq!(matrix.get(2, 0), None);
    }

    #[test]
    fn trace_window_borrows_contiguous_columns() {
        let matrix = sequential(4, 5);
        let view = matrix.traces(1..3).expect("window in range");
        assert_eq!(view.shape(), (4, 2));
        assert_eq!(view.get(0, 0), Some(4));
        assert_eq!(view.get(3, 1), Some(11));
        assert_eq!(view.values().as_ptr(), matrix.trace(1).unwrap().as_ptr());
        let columns: Vec<_> = view.columns().collect();
        assert_eq!(columns, vec![&[4, 5, 6, 7][..], &[8, 9, 10, 11][..]]);
    }

    #[test]
    fn trace_window_out_of_range() {
        let matrix = sequential(4, 5);
        assert!(matrix.traces(4..6).is_none());
        assert!(matrix.traces(3..2).is_none());
        assert_eq!(matrix.traces(5..5).map(|v| v.shape()), Some((4, 0)));
    }

    #[test]
    fn completed_metadata_derives_length() {
        let header = HeaderMetadata {
            samples_per_trace: 512,
            bits_per_sample: BitsPerSample::Sixteen,
            scans_per_meter: 40.0,
            scan_density_source: ScanDensitySource::Header,
        };
        assert_eq!(header.bytes_per_trace(), 1024);
        let metadata = header.complete(1000);
        assert_eq!(metadata.trace_count, 1000);
        assert!((metadata.total_length_m - 25.0).abs() < 1e-12);
    }

    #[test]
    fn bits_per_sample_values() {
        assert_eq!(BitsPerSample::from_raw(8), Some(BitsPerSample::Eight));
        assert_eq!(BitsPerSample::from_raw(32).map(|b| b.bytes_per_sample()), Some(4));
        assert_eq!(BitsPerSample::from_raw(24), None);
        assert_eq!(BitsPerSample::from_raw(-16), None);
    }
}
