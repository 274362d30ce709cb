//! Decoder for GSSI DZT ground-penetrating-radar recordings.
//!
//! [`input`] turns a recording into an [`input::AmplitudeMatrix`] plus
//! [`input::RecordingMetadata`]; [`render`] and [`output`] turn that into
//! grayscale JPEG profiles; [`processor`] drives a batch of files.

pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod processor;
pub mod render;
