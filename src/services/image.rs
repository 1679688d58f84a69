use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageResult};
use std::io::Cursor;
use std::path::Path;

const JPEG_QUALITY: u8 = 85;

/// Height that keeps the aspect ratio at `target_width`, rounded to the nearest pixel.
pub fn scaled_height(width: u32, height: u32, target_width: u32) -> u32 {
    if width == 0 {
        return 1;
    }
    let scaled = (f64::from(height) * f64::from(target_width) / f64::from(width)).round();
    (scaled as u32).max(1)
}

pub fn resize_to_width(img: &DynamicImage, target_width: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    let new_height = scaled_height(width, height, target_width);
    img.resize_exact(
        target_width,
        new_height,
        image::imageops::FilterType::Lanczos3,
    )
}

pub fn encode_jpeg(img: &DynamicImage) -> ImageResult<Vec<u8>> {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
    rgb.write_with_encoder(encoder)?;
    Ok(buffer.into_inner())
}

/// Scales a decoded frame to `target_width` and writes it to `dest` as JPEG.
pub fn write_thumbnail(frame: &DynamicImage, target_width: u32, dest: &Path) -> ImageResult<()> {
    let resized = resize_to_width(frame, target_width);
    let data = encode_jpeg(&resized)?;
    std::fs::write(dest, data).map_err(image::ImageError::IoError)
}
