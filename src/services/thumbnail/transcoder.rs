use super::{ExtractRequest, FrameExtractor, ThumbnailError};
use crate::services::image::write_thumbnail;
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Grabs the frame with an external `ffmpeg` process, then scales and encodes it in-process.
#[derive(Debug, Clone)]
pub struct TranscoderExtractor {
    program: PathBuf,
    timeout: Duration,
}

impl TranscoderExtractor {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    async fn grab_frame(&self, request: &ExtractRequest, frame_path: &Path) -> Result<(), ThumbnailError> {
        let mut child = Command::new(&self.program)
            .arg("-nostdin")
            .arg("-y")
            .arg("-loglevel")
            .arg("error")
            .arg("-ss")
            .arg(format!("{:.3}", request.seek.as_secs_f64()))
            .arg("-i")
            .arg(request.video.as_os_str())
            .arg("-frames:v")
            .arg("1")
            .arg(frame_path.as_os_str())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ThumbnailError::Process(format!(
                    "failed to spawn {}: {}",
                    self.program.display(),
                    e
                ))
            })?;

        let status = match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(status) => status?,
            Err(_) => {
                let _ = child.kill().await;
                return Err(ThumbnailError::Timeout(self.timeout));
            }
        };

        if !status.success() {
            return Err(ThumbnailError::Process(format!(
                "{} exited with {} for {}",
                self.program.display(),
                status,
                request.video.display()
            )));
        }

        // ffmpeg exits cleanly without output when the seek lands past the end
        match tokio::fs::metadata(frame_path).await {
            Ok(meta) if meta.len() > 0 => Ok(()),
            _ => Err(ThumbnailError::Decode(format!(
                "no frame at {:?} in {}",
                request.seek,
                request.video.display()
            ))),
        }
    }
}

#[async_trait]
impl FrameExtractor for TranscoderExtractor {
    fn name(&self) -> &'static str {
        "transcoder"
    }

    async fn extract(&self, request: &ExtractRequest) -> Result<(), ThumbnailError> {
        let frame_path = request.dest.with_extension("frame.png");

        let result = match self.grab_frame(request, &frame_path).await {
            Ok(()) => {
                let frame_file = frame_path.clone();
                let dest = request.dest.clone();
                let width = request.width;
                tokio::task::spawn_blocking(move || -> Result<(), ThumbnailError> {
                    let frame = image::open(&frame_file)
                        .map_err(|e| ThumbnailError::Decode(e.to_string()))?;
                    write_thumbnail(&frame, width, &dest)?;
                    Ok(())
                })
                .await
                .map_err(|e| ThumbnailError::Io(io::Error::other(e)))
                .and_then(|inner| inner)
            }
            Err(e) => Err(e),
        };

        let _ = tokio::fs::remove_file(&frame_path).await;
        result
    }
}
