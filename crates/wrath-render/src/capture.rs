//! Frame capture and the background screenshot writer

use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use wrath_core::{Result, WrathError};

/// Encoding used for screenshots
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
    Bmp,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Bmp => "bmp",
        }
    }

    fn encoding(self) -> image::ImageFormat {
        match self {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Bmp => image::ImageFormat::Bmp,
        }
    }
}

/// Owned RGBA8 snapshot of the framebuffer, rows stored bottom-up as read back
/// from the GPU.
#[derive(Debug, Clone)]
pub struct FrameCapture {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl FrameCapture {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(WrathError::Capture(format!(
                "{width}x{height} capture needs {expected} bytes, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Rows reordered top-down, as image files store them
    fn into_top_down(self) -> Vec<u8> {
        let row = self.width as usize * 4;
        if row == 0 {
            return self.pixels;
        }
        self.pixels
            .chunks_exact(row)
            .rev()
            .flatten()
            .copied()
            .collect()
    }

    fn encode(self, path: &Path, format: ImageFormat) -> Result<()> {
        let (width, height) = (self.width, self.height);
        let img = image::RgbaImage::from_raw(width, height, self.into_top_down())
            .ok_or_else(|| WrathError::Capture("pixel buffer does not match size".into()))?;
        let result = match format {
            // JPEG has no alpha channel
            ImageFormat::Jpeg => image::DynamicImage::ImageRgba8(img)
                .to_rgb8()
                .save_with_format(path, format.encoding()),
            _ => img.save_with_format(path, format.encoding()),
        };
        result.map_err(|e| WrathError::Capture(format!("{}: {e}", path.display())))
    }
}

/// Write a capture to `dir/<name>.<ext>` on a background thread.
///
/// The thread creates `dir` if needed and logs the outcome. The returned
/// handle may be joined for the written path or simply dropped.
pub fn save_screenshot(
    capture: FrameCapture,
    dir: &Path,
    name: &str,
    format: ImageFormat,
) -> JoinHandle<Result<PathBuf>> {
    let path = dir.join(format!("{name}.{}", format.extension()));
    let dir = dir.to_path_buf();
    std::thread::spawn(move || {
        let result = std::fs::create_dir_all(&dir)
            .map_err(WrathError::from)
            .and_then(|()| capture.encode(&path, format));
        match result {
            Ok(()) => {
                log::info!("Saved screenshot to {}", path.display());
                Ok(path)
            }
            Err(e) => {
                log::error!("Failed to save screenshot: {e}");
                Err(e)
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2x2: bottom row red, top row blue
    fn two_by_two() -> FrameCapture {
        let red = [255, 0, 0, 255];
        let blue = [0, 0, 255, 255];
        let pixels = [red, red, blue, blue].concat();
        FrameCapture::new(2, 2, pixels).unwrap()
    }

    #[test]
    fn test_rejects_mismatched_buffer() {
        let err = FrameCapture::new(4, 4, vec![0; 10]).unwrap_err();
        assert!(matches!(err, WrathError::Capture(_)));
    }

    #[test]
    fn test_png_is_written_top_down() {
        let dir = tempfile::tempdir().unwrap();
        let shots = dir.path().join("shots");
        let path = save_screenshot(two_by_two(), &shots, "frame", ImageFormat::Png)
            .join()
            .unwrap()
            .unwrap();

        assert_eq!(path, shots.join("frame.png"));
        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (2, 2));
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 255, 255]);
        assert_eq!(img.get_pixel(1, 1).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_jpeg_and_bmp_are_written() {
        let dir = tempfile::tempdir().unwrap();
        for format in [ImageFormat::Jpeg, ImageFormat::Bmp] {
            let path = save_screenshot(two_by_two(), dir.path(), "frame", format)
                .join()
                .unwrap()
                .unwrap();
            assert!(path.exists());
            assert_eq!(path.extension().unwrap(), format.extension());
        }
    }
}
