use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::jpeg::{JpegEncoder, PixelDensity};
use image::GrayImage;

use crate::error::RenderError;
use crate::render::{RenderWindow, WindowKind};

const JPEG_QUALITY: u8 = 90;

/// Write a grayscale profile as JPEG, tagging it with the requested DPI
pub fn write_jpeg<P: AsRef<Path>>(path: P, image: &GrayImage, dpi: u16) -> Result<(), RenderError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let mut encoder = JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY);
    encoder.set_pixel_density(PixelDensity::dpi(dpi));
    encoder.encode_image(image)?;

    writer.flush()?;
    Ok(())
}

/// Generate output filename for one rendered window
pub fn generate_filename(base_name: &str, window: &RenderWindow) -> String {
    match window.kind {
        WindowKind::Full => format!("{}_full.jpg", base_name),
        WindowKind::Window(index) => format!("{}_window_{:03}.jpg", base_name, index),
    }
}

#[cfg(test)]
mod tests {
    use image::{GenericImageView, Luma};

    use super::*;

    #[test]
    fn filenames() {
        let full = RenderWindow {
            kind: WindowKind::Full,
            traces: 0..10,
        };
        assert_eq!(generate_filename("LINE001", &full), "LINE001_full.jpg");
        let window = RenderWindow {
            kind: WindowKind::Window(7),
            traces: 0..10,
        };
        assert_eq!(generate_filename("LINE001", &window), "LINE001_window_007.jpg");
        let window = RenderWindow {
            kind: WindowKind::Window(1234),
            traces: 0..10,
        };
        assert_eq!(generate_filename("a", &window), "a_window_1234.jpg");
    }

    #[test]
    fn writes_readable_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile_full.jpg");
        let img = GrayImage::from_fn(40, 20, |x, _| Luma([(x * 6) as u8]));

        write_jpeg(&path, &img, 300).unwrap();

        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.dimensions(), (40, 20));
    }

    #[test]
    fn missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("x.jpg");
        let img = GrayImage::new(4, 4);
        assert!(matches!(write_jpeg(&path, &img, 300), Err(RenderError::Io(_))));
    }
}
