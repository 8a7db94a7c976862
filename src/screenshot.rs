//! PNG export of the PPU frame buffer.

use std::path::Path;

use image::RgbaImage;
use thiserror::Error;

use crate::ppu::{BYTES_PER_PIXEL, NES_HEIGHT, NES_WIDTH};

const FRAME_BYTES: usize = NES_WIDTH * NES_HEIGHT * BYTES_PER_PIXEL;

#[derive(Debug, Error)]
pub enum ScreenshotError {
    #[error("frame buffer holds {0} bytes, expected 256x240 RGBA")]
    BadFrameSize(usize),
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Copy a 256x240 RGBA frame into an image buffer.
pub fn frame_to_image(frame: &[u8]) -> Result<RgbaImage, ScreenshotError> {
    RgbaImage::from_raw(NES_WIDTH as u32, NES_HEIGHT as u32, frame.to_vec())
        .ok_or(ScreenshotError::BadFrameSize(frame.len()))
}

/// Write `frame` to `path`; the format follows the file extension.
pub fn save_png<P: AsRef<Path>>(frame: &[u8], path: P) -> Result<(), ScreenshotError> {
    let img = frame_to_image(frame)?;
    img.save(path.as_ref())?;
    log::info!("screenshot written to {}", path.as_ref().display());
    Ok(())
}
