use std::io::Read;

use tracing::debug;

use super::{AmplitudeMatrix, Amplitudes, BitsPerSample, HeaderMetadata, RecordingMetadata};
use crate::error::DecodeError;

/// Signed little-endian sample type stored in the data region
pub trait Sample: Copy + Into<f64> {
    const BYTES: usize;

    /// `bytes` is exactly `BYTES` long
    fn from_le_slice(bytes: &[u8]) -> Self;
}

impl Sample for i16 {
    const BYTES: usize = 2;

    fn from_le_slice(bytes: &[u8]) -> Self {
        i16::from_le_bytes([bytes[0], bytes[1]])
    }
}

impl Sample for i32 {
    const BYTES: usize = 4;

    fn from_le_slice(bytes: &[u8]) -> Self {
        i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

/// Number of complete traces in `data_len` bytes; a trailing partial trace is dropped
pub fn trace_count(data_len: u64, header: &HeaderMetadata) -> u64 {
    data_len / header.bytes_per_trace()
}

/// Read every complete trace from `reader` and reshape into `[sample, trace]`.
///
/// `data_len` is the size of the data region the reader is positioned at.
/// Nothing is returned on a short read; the partial buffer is dropped.
pub fn read_matrix<R: Read>(
    reader: &mut R,
    data_len: u64,
    header: &HeaderMetadata,
) -> Result<(Amplitudes, RecordingMetadata), DecodeError> {
    let bytes_per_trace = header.bytes_per_trace();
    let traces = trace_count(data_len, header);
    if traces == 0 {
        return Err(DecodeError::EmptyRecording {
            data_len,
            bytes_per_trace,
        });
    }
    let traces = traces as usize;

    debug!(
        traces,
        discarded_bytes = data_len % bytes_per_trace,
        "reading sample data"
    );

    let spt = header.samples_per_trace;
    let amplitudes = match header.bits_per_sample {
        BitsPerSample::Sixteen => Amplitudes::Int16(read_samples(reader, spt, traces)?),
        BitsPerSample::ThirtyTwo => Amplitudes::Int32(read_samples(reader, spt, traces)?),
        BitsPerSample::Eight => {
            return Err(DecodeError::UnsupportedSampleWidth {
                bits: header.bits_per_sample.bits(),
            })
        }
    };

    Ok((amplitudes, header.complete(traces)))
}

fn read_samples<T: Sample, R: Read>(
    reader: &mut R,
    samples_per_trace: usize,
    traces: usize,
) -> Result<AmplitudeMatrix<T>, DecodeError> {
    let mut buffer = vec![0u8; samples_per_trace * traces * T::BYTES];
    reader
        .read_exact(&mut buffer)
        .map_err(DecodeError::DataReadFailure)?;

    let data = buffer.chunks_exact(T::BYTES).map(T::from_le_slice).collect();
    Ok(AmplitudeMatrix::from_column_major(samples_per_trace, data))
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor};

    use proptest::prelude::*;

    use super::*;
    use crate::input::ScanDensitySource;

    fn header(
        samples_per_trace: usize,
        bits: BitsPerSample,
        scans_per_meter: f64,
    ) -> HeaderMetadata {
        HeaderMetadata {
            samples_per_trace,
            bits_per_sample: bits,
            scans_per_meter,
            scan_density_source: ScanDensitySource::Header,
        }
    }

    fn le_i16(samples: impl IntoIterator<Item = i16>) -> Vec<u8> {
        samples.into_iter().flat_map(i16::to_le_bytes).collect()
    }

    #[test]
    fn reshapes_column_major() {
        let data = le_i16(0..6);
        let (amplitudes, metadata) = read_matrix(
            &mut Cursor::new(&data),
            data.len() as u64,
            &header(2, BitsPerSample::Sixteen, 1.0),
        )
        .unwrap();

        let Amplitudes::Int16(matrix) = amplitudes else {
            panic!("expected 16-bit matrix");
        };
        assert_eq!(matrix.shape(), (2, 3));
        assert_eq!(matrix.trace(0), Some(&[0, 1][..]));
        assert_eq!(matrix.trace(1), Some(&[2, 3][..]));
        assert_eq!(matrix.trace(2), Some(&[4, 5][..]));
        assert_eq!(metadata.trace_count, 3);
    }

    #[test]
    fn samples_are_signed_little_endian() {
        let data = vec![0xFF, 0xFF, 0x00, 0x80, 0x34, 0x12];
        let (amplitudes, _) = read_matrix(
            &mut Cursor::new(&data),
            data.len() as u64,
            &header(3, BitsPerSample::Sixteen, 1.0),
        )
        .unwrap();
        assert_eq!(
            amplitudes,
            Amplitudes::Int16(AmplitudeMatrix::from_column_major(3, vec![-1, i16::MIN, 0x1234]))
        );
    }

    #[test]
    fn reads_32_bit_samples() {
        let data: Vec<u8> = [-7i32, 70_000, i32::MAX, 0]
            .into_iter()
            .flat_map(i32::to_le_bytes)
            .collect();
        let (amplitudes, metadata) = read_matrix(
            &mut Cursor::new(&data),
            data.len() as u64,
            &header(2, BitsPerSample::ThirtyTwo, 10.0),
        )
        .unwrap();
        let Amplitudes::Int32(matrix) = amplitudes else {
            panic!("expected 32-bit matrix");
        };
        assert_eq!(matrix.get(1, 0), Some(70_000));
        assert_eq!(matrix.get(0, 1), Some(i32::MAX));
        assert_eq!(metadata.trace_count, 2);
        assert!((metadata.total_length_m - 0.2).abs() < 1e-12);
    }

    #[test]
    fn eight_bit_fails_closed() {
        let data = vec![1u8; 16];
        let result = read_matrix(
            &mut Cursor::new(&data),
            data.len() as u64,
            &header(4, BitsPerSample::Eight, 1.0),
        );
        assert!(matches!(
            result,
            Err(DecodeError::UnsupportedSampleWidth { bits: 8 })
        ));
    }

    #[test]
    fn less_than_one_trace_is_empty() {
        let data = vec![0u8; 7];
        let result = read_matrix(
            &mut Cursor::new(&data),
            data.len() as u64,
            &header(4, BitsPerSample::Sixteen, 1.0),
        );
        match result {
            Err(DecodeError::EmptyRecording {
                data_len,
                bytes_per_trace,
            }) => {
                assert_eq!(data_len, 7);
                assert_eq!(bytes_per_trace, 8);
            }
            other => panic!("expected EmptyRecording, got {other:?}"),
        }
    }

    #[test]
    fn short_read_is_data_read_failure() {
        // Claims more data than the reader holds
        let data = le_i16(0..4);
        let result = read_matrix(
            &mut Cursor::new(&data),
            64,
            &header(4, BitsPerSample::Sixteen, 1.0),
        );
        match result {
            Err(DecodeError::DataReadFailure(e)) => {
                assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof)
            }
            other => panic!("expected DataReadFailure, got {other:?}"),
        }
    }

    proptest! {
        #[test]
        fn trace_count_is_floor_of_data_len(
            samples_per_trace in 1usize..16,
            traces in 0usize..8,
            junk in 0usize..64,
        ) {
            let bytes_per_trace = samples_per_trace * 2;
            let junk = junk % bytes_per_trace;
            let total = samples_per_trace * traces;
            let mut data = le_i16((0..total).map(|i| i as i16));
            data.extend(std::iter::repeat(0xAB).take(junk));

            let result = read_matrix(
                &mut Cursor::new(&data),
                data.len() as u64,
                &header(samples_per_trace, BitsPerSample::Sixteen, 50.0),
            );

            if traces == 0 {
                let is_empty = matches!(result, Err(DecodeError::EmptyRecording { .. }));
                prop_assert!(is_empty);
            } else {
                let (amplitudes, metadata) = result.unwrap();
                prop_assert_eq!(metadata.trace_count, traces);
                prop_assert_eq!(amplitudes.shape(), (samples_per_trace, traces));
                let Amplitudes::Int16(matrix) = amplitudes else {
                    panic!("expected 16-bit matrix");
                };
                // junk bytes (0xABAB) never reach the matrix
                let last = matrix.get(samples_per_trace - 1, traces - 1);
                prop_assert_eq!(last, Some(total as i16 - 1));
                prop_assert!((metadata.total_length_m - traces as f64 / 50.0).abs() < 1e-12);
            }
        }
    }
}
