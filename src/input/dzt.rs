use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::header::{self, HEADER_LEN};
use super::matrix::read_matrix;
use super::{Amplitudes, RecordingMetadata};
use crate::error::DecodeError;

/// Decode a whole recording from `reader`.
///
/// `total_len` is the byte length of the recording, header included.
/// The header is validated before any sample data is touched.
pub fn read_recording<R: Read>(
    mut reader: R,
    total_len: u64,
    default_scans_per_meter: f64,
) -> Result<(Amplitudes, RecordingMetadata), DecodeError> {
    let mut header_block = Vec::with_capacity(HEADER_LEN);
    reader
        .by_ref()
        .take(HEADER_LEN as u64)
        .read_to_end(&mut header_block)
        .map_err(DecodeError::DataReadFailure)?;

    let header = header::decode(&header_block, default_scans_per_meter)?;
    let data_len = total_len.saturating_sub(HEADER_LEN as u64);
    read_matrix(&mut reader, data_len, &header)
}

/// Open and decode a DZT file. The file handle is closed before returning.
pub fn read_dzt<P: AsRef<Path>>(
    path: P,
    default_scans_per_meter: f64,
) -> Result<(Amplitudes, RecordingMetadata), DecodeError> {
    let file = File::open(path).map_err(DecodeError::Open)?;
    let len = file.metadata().map_err(DecodeError::Open)?.len();
    read_recording(BufReader::new(file), len, default_scans_per_meter)
}
