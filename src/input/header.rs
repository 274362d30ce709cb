//! DZT header decoding.
//!
//! Only four fields of the 1024-byte header are interpreted. Their positions
//! live in [`DZT_LAYOUT`]; nothing else in the crate reads header offsets.

use std::marker::PhantomData;

use tracing::{debug, warn};

use super::{BitsPerSample, HeaderMetadata, ScanDensitySource};
use crate::error::DecodeError;

/// Size of the fixed header block; the data region starts right after it
pub const HEADER_LEN: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

/// Scalar type that can be pulled out of the header
pub trait FieldType: Sized {
    const WIDTH: usize;

    /// `bytes` is exactly `WIDTH` long
    fn decode(bytes: &[u8], endian: Endian) -> Self;
}

impl FieldType for i16 {
    const WIDTH: usize = 2;

    fn decode(bytes: &[u8], endian: Endian) -> Self {
        let raw = [bytes[0], bytes[1]];
        match endian {
            Endian::Little => i16::from_le_bytes(raw),
            Endian::Big => i16::from_be_bytes(raw),
        }
    }
}

impl FieldType for f32 {
    const WIDTH: usize = 4;

    fn decode(bytes: &[u8], endian: Endian) -> Self {
        let raw = [bytes[0], bytes[1], bytes[2], bytes[3]];
        match endian {
            Endian::Little => f32::from_le_bytes(raw),
            Endian::Big => f32::from_be_bytes(raw),
        }
    }
}

/// One header field: where it sits, how it is encoded
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec<T> {
    pub offset: usize,
    pub endian: Endian,
    _type: PhantomData<T>,
}

impl<T: FieldType> FieldSpec<T> {
    pub const fn new(offset: usize, endian: Endian) -> Self {
        Self {
            offset,
            endian,
            _type: PhantomData,
        }
    }

    pub fn width(&self) -> usize {
        T::WIDTH
    }

    /// Caller guarantees `header.len() >= HEADER_LEN`
    fn read(&self, header: &[u8]) -> T {
        T::decode(&header[self.offset..self.offset + T::WIDTH], self.endian)
    }
}

/// Every interpreted header field in one place
#[derive(Debug, Clone, Copy)]
pub struct HeaderLayout {
    /// Logged only, never kept in the metadata
    pub channel_count: FieldSpec<i16>,
    pub samples_per_trace: FieldSpec<i16>,
    pub bits_per_sample: FieldSpec<i16>,
    pub scans_per_meter: FieldSpec<f32>,
}

pub const DZT_LAYOUT: HeaderLayout = HeaderLayout {
    channel_count: FieldSpec::new(51, Endian::Big),
    samples_per_trace: FieldSpec::new(4, Endian::Little),
    bits_per_sample: FieldSpec::new(6, Endian::Little),
    scans_per_meter: FieldSpec::new(40, Endian::Little),
};

/// Field values exactly as stored, before validation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawHeader {
    pub channel_count: i16,
    pub samples_per_trace: i16,
    pub bits_per_sample: i16,
    pub scans_per_meter: f32,
}

impl HeaderLayout {
    fn read(&self, header: &[u8]) -> RawHeader {
        RawHeader {
            channel_count: self.channel_count.read(header),
            samples_per_trace: self.samples_per_trace.read(header),
            bits_per_sample: self.bits_per_sample.read(header),
            scans_per_meter: self.scans_per_meter.read(header),
        }
    }
}

/// Extract the raw field values from a header block
pub fn read_raw(header: &[u8]) -> Result<RawHeader, DecodeError> {
    if header.len() < HEADER_LEN {
        return Err(DecodeError::TruncatedHeader {
            len: header.len(),
            expected: HEADER_LEN,
        });
    }
    Ok(DZT_LAYOUT.read(header))
}

/// Decode and validate the header block.
///
/// A non-positive (or non-finite) scans-per-meter value is replaced with
/// `default_scans_per_meter`; the substitution is logged and recorded in
/// [`HeaderMetadata::scan_density_source`].
pub fn decode(
    header: &[u8],
    default_scans_per_meter: f64,
) -> Result<HeaderMetadata, DecodeError> {
    let raw = read_raw(header)?;

    debug!(
        channels = raw.channel_count,
        samples_per_trace = raw.samples_per_trace,
        bits_per_sample = raw.bits_per_sample,
        scans_per_meter = raw.scans_per_meter,
        "decoded header fields"
    );

    let invalid = || DecodeError::InvalidHeaderParameters {
        samples_per_trace: raw.samples_per_trace,
        bits_per_sample: raw.bits_per_sample,
    };
    let samples_per_trace = match usize::try_from(raw.samples_per_trace) {
        Ok(n) if n > 0 => n,
        _ => return Err(invalid()),
    };
    let bits_per_sample = BitsPerSample::from_raw(raw.bits_per_sample).ok_or_else(invalid)?;

    let decoded = raw.scans_per_meter;
    let (scans_per_meter, scan_density_source) = if decoded.is_finite() && decoded > 0.0 {
        (decoded as f64, ScanDensitySource::Header)
    } else {
        warn!(
            decoded,
            fallback = default_scans_per_meter,
            "scans per meter in header is not positive, using default"
        );
        (default_scans_per_meter, ScanDensitySource::Fallback { decoded })
    };

    Ok(HeaderMetadata {
        samples_per_trace,
        bits_per_sample,
        scans_per_meter,
        scan_density_source,
    })
}
