use super::{frame_reaches, seek_in_ticks, ExtractRequest, FrameExtractor, ThumbnailError};
use crate::services::image::write_thumbnail;
use async_trait::async_trait;
use ffmpeg_next as ffmpeg;
use image::{DynamicImage, RgbImage};
use std::io;
use std::sync::OnceLock;

/// Decodes the frame in-process with libavformat/libavcodec.
#[derive(Debug, Default, Clone, Copy)]
pub struct LibraryExtractor;

fn ensure_initialized() -> Result<(), ThumbnailError> {
    static INIT: OnceLock<Result<(), String>> = OnceLock::new();
    INIT.get_or_init(|| ffmpeg::init().map_err(|e| e.to_string()))
        .clone()
        .map_err(|e| ThumbnailError::Open(format!("ffmpeg initialization failed: {e}")))
}

#[async_trait]
impl FrameExtractor for LibraryExtractor {
    fn name(&self) -> &'static str {
        "library"
    }

    async fn extract(&self, request: &ExtractRequest) -> Result<(), ThumbnailError> {
        let request = request.clone();
        tokio::task::spawn_blocking(move || extract_frame(&request))
            .await
            .map_err(|e| ThumbnailError::Io(io::Error::other(e)))?
    }
}

/// Demuxer, decoder and scaler are dropped on every return path.
fn extract_frame(request: &ExtractRequest) -> Result<(), ThumbnailError> {
    ensure_initialized()?;

    let mut input = ffmpeg::format::input(&request.video)
        .map_err(|e| ThumbnailError::Open(format!("{}: {e}", request.video.display())))?;

    let stream = input
        .streams()
        .best(ffmpeg::media::Type::Video)
        .ok_or(ThumbnailError::NoVideoStream)?;
    let stream_index = stream.index();
    let time_base = stream.time_base();
    let target = seek_in_ticks(request.seek, time_base.numerator(), time_base.denominator());

    let context = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
        .map_err(|e| ThumbnailError::Open(format!("codec context: {e}")))?;
    let mut decoder = context
        .decoder()
        .video()
        .map_err(|e| ThumbnailError::Open(format!("video decoder: {e}")))?;

    // AV_TIME_BASE is microseconds
    let position = i64::try_from(request.seek.as_micros()).unwrap_or(i64::MAX);
    input
        .seek(position, ..position)
        .map_err(|e| ThumbnailError::Decode(format!("seek to {:?}: {e}", request.seek)))?;

    let mut frame = ffmpeg::frame::Video::empty();
    let mut decoded = false;
    'packets: for (stream, packet) in input.packets() {
        if stream.index() != stream_index {
            continue;
        }
        if let Err(e) = decoder.send_packet(&packet) {
            tracing::debug!("Skipping packet during thumbnail extraction: {e}");
            continue;
        }
        while decoder.receive_frame(&mut frame).is_ok() {
            if frame_reaches(frame.timestamp().or(frame.pts()), target) {
                decoded = true;
                break 'packets;
            }
        }
    }
    if !decoded && decoder.send_eof().is_ok() {
        while decoder.receive_frame(&mut frame).is_ok() {
            if frame_reaches(frame.timestamp().or(frame.pts()), target) {
                decoded = true;
                break;
            }
        }
    }
    if !decoded {
        return Err(ThumbnailError::Decode(format!(
            "no frame after {:?} in {}",
            request.seek,
            request.video.display()
        )));
    }

    let mut scaler = ffmpeg::software::scaling::Context::get(
        frame.format(),
        frame.width(),
        frame.height(),
        ffmpeg::format::Pixel::RGB24,
        frame.width(),
        frame.height(),
        ffmpeg::software::scaling::flag::Flags::BILINEAR,
    )
    .map_err(|e| ThumbnailError::Decode(format!("scaler: {e}")))?;

    let mut rgb = ffmpeg::frame::Video::empty();
    scaler
        .run(&frame, &mut rgb)
        .map_err(|e| ThumbnailError::Decode(format!("scale: {e}")))?;

    let width = rgb.width();
    let height = rgb.height();
    let stride = rgb.stride(0);
    let row_bytes = width as usize * 3;
    let data = rgb.data(0);

    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        pixels.extend_from_slice(&data[start..start + row_bytes]);
    }

    let buffer = RgbImage::from_raw(width, height, pixels)
        .ok_or_else(|| ThumbnailError::Decode("frame buffer size mismatch".into()))?;
    write_thumbnail(&DynamicImage::ImageRgb8(buffer), request.width, &request.dest)?;
    Ok(())
}
