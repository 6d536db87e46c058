use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::foundation::core::Bitmap;
use crate::foundation::error::{RasterError, RasterResult};

/// Default bound on a single seek-and-decode request.
pub const DEFAULT_SEEK_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Clone, Debug, PartialEq)]
/// Basic metadata about a video source.
pub struct VideoInfo {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Duration in seconds, when the container reports one.
    pub duration_sec: Option<f64>,
}

/// Result of one bounded seek request.
#[derive(Clone, Debug)]
pub enum SeekOutcome {
    /// The frame at the requested time.
    Decoded(Bitmap),
    /// The decoder did not answer within the timeout.
    TimedOut,
}

/// A seekable source of decoded video frames.
///
/// Implementations must return bitmaps of exactly `info().width x info().height`.
pub trait VideoSource {
    /// Source metadata.
    fn info(&self) -> &VideoInfo;

    /// Decode the frame shown at `time_sec`, giving up after `timeout`.
    fn seek_frame(&mut self, time_sec: f64, timeout: Duration) -> RasterResult<SeekOutcome>;
}

/// Options for [`extract_frames`].
#[derive(Clone, Copy, Debug)]
pub struct ExtractOpts {
    /// Bound on each seek request.
    pub seek_timeout: Duration,
}

impl Default for ExtractOpts {
    fn default() -> Self {
        Self {
            seek_timeout: DEFAULT_SEEK_TIMEOUT,
        }
    }
}

/// Sample times for `count` frames spaced `interval_sec` apart.
///
/// When the source is shorter than `count * interval_sec`, the interval is stretched to
/// `duration / count` so the samples still span the whole clip.
pub fn sample_times(duration_sec: f64, count: u32, interval_sec: f64) -> RasterResult<Vec<f64>> {
    if !duration_sec.is_finite() || duration_sec <= 0.0 {
        return Err(RasterError::media("cannot determine video duration"));
    }
    if !interval_sec.is_finite() || interval_sec < 0.0 {
        return Err(RasterError::validation("frame interval must be finite and >= 0"));
    }
    if count == 0 {
        return Ok(Vec::new());
    }
    let requested = f64::from(count) * interval_sec;
    let max_time = duration_sec.min(requested);
    let step = if max_time < requested {
        duration_sec / f64::from(count)
    } else {
        interval_sec
    };
    Ok((0..count).map(|i| f64::from(i) * step).collect())
}

/// Pull `count` frames from `source`, best effort.
///
/// A seek that times out or fails is logged and replaced by the previous frame (or a white
/// frame when nothing has been decoded yet), so the result always has `count` entries.
#[tracing::instrument(skip(source, opts))]
pub fn extract_frames(
    source: &mut dyn VideoSource,
    count: u32,
    interval_sec: f64,
    opts: ExtractOpts,
) -> RasterResult<Vec<Bitmap>> {
    let info = source.info().clone();
    let duration = info
        .duration_sec
        .ok_or_else(|| RasterError::media("cannot determine video duration"))?;
    let times = sample_times(duration, count, interval_sec)?;

    let mut frames: Vec<Bitmap> = Vec::with_capacity(times.len());
    for (i, &t) in times.iter().enumerate() {
        let decoded = match source.seek_frame(t, opts.seek_timeout) {
            Ok(SeekOutcome::Decoded(frame)) if frame.dims() == (info.width, info.height) => {
                Some(frame)
            }
            Ok(SeekOutcome::Decoded(frame)) => {
                tracing::warn!(
                    time_sec = t,
                    got_w = frame.width(),
                    got_h = frame.height(),
                    "decoded frame has unexpected size, reusing previous frame"
                );
                None
            }
            Ok(SeekOutcome::TimedOut) => {
                tracing::warn!(time_sec = t, "seek timeout, proceeding anyway");
                None
            }
            Err(err) => {
                tracing::warn!(time_sec = t, error = %err, "seek failed, proceeding anyway");
                None
            }
        };
        let frame = match decoded {
            Some(frame) => frame,
            None => match frames.last() {
                Some(prev) => prev.clone(),
                None => Bitmap::white(info.width, info.height)?,
            },
        };
        tracing::debug!(frame = i + 1, total = count, "extracted frame");
        frames.push(frame);
    }
    Ok(frames)
}

/// Video source backed by the system `ffprobe` / `ffmpeg` binaries.
#[derive(Clone, Debug)]
pub struct FfmpegVideoSource {
    #[cfg_attr(not(feature = "media-ffmpeg"), allow(dead_code))]
    path: PathBuf,
    info: VideoInfo,
}

impl FfmpegVideoSource {
    /// Probe `path` and prepare it for seeking.
    #[cfg(feature = "media-ffmpeg")]
    pub fn open(path: impl AsRef<Path>) -> RasterResult<Self> {
        let path = path.as_ref();
        let info = probe_video(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            info,
        })
    }

    /// Probe `path` and prepare it for seeking.
    ///
    /// Returns an error when the `media-ffmpeg` feature is disabled.
    #[cfg(not(feature = "media-ffmpeg"))]
    pub fn open(path: impl AsRef<Path>) -> RasterResult<Self> {
        let _ = path.as_ref();
        Err(RasterError::media(
            "video sources require the 'media-ffmpeg' feature",
        ))
    }
}

impl VideoSource for FfmpegVideoSource {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    #[cfg(feature = "media-ffmpeg")]
    fn seek_frame(&mut self, time_sec: f64, timeout: Duration) -> RasterResult<SeekOutcome> {
        decode_frame_with_timeout(&self.path, &self.info, time_sec, timeout)
    }

    #[cfg(not(feature = "media-ffmpeg"))]
    fn seek_frame(&mut self, _time_sec: f64, _timeout: Duration) -> RasterResult<SeekOutcome> {
        Err(RasterError::media(
            "video sources require the 'media-ffmpeg' feature",
        ))
    }
}

/// Probe width, height and duration through `ffprobe`.
#[cfg(feature = "media-ffmpeg")]
pub fn probe_video(source_path: &Path) -> RasterResult<VideoInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| RasterError::media(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(RasterError::media(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| RasterError::media(format!("ffprobe json parse failed: {e}")))?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| RasterError::media("no video stream found"))?;
    let width = video_stream
        .width
        .ok_or_else(|| RasterError::media("missing video width from ffprobe"))?;
    let height = video_stream
        .height
        .ok_or_else(|| RasterError::media("missing video height from ffprobe"))?;
    let duration_sec = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .or(video_stream.duration.as_deref())
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0);

    Ok(VideoInfo {
        width,
        height,
        duration_sec,
    })
}

#[cfg(not(feature = "media-ffmpeg"))]
/// Probe width, height and duration through `ffprobe`.
///
/// Returns an error when the `media-ffmpeg` feature is disabled.
pub fn probe_video(_source_path: &Path) -> RasterResult<VideoInfo> {
    Err(RasterError::media(
        "video sources require the 'media-ffmpeg' feature",
    ))
}

#[cfg(feature = "media-ffmpeg")]
fn decode_frame_with_timeout(
    path: &Path,
    info: &VideoInfo,
    time_sec: f64,
    timeout: Duration,
) -> RasterResult<SeekOutcome> {
    use std::io::Read;
    use std::process::{Command, Stdio};
    use std::sync::mpsc;

    let mut child = Command::new("ffmpeg")
        .args(["-v", "error", "-ss", &format!("{time_sec:.6}")])
        .arg("-i")
        .arg(path)
        .args([
            "-frames:v",
            "1",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "pipe:1",
        ])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| RasterError::media(format!("failed to spawn ffmpeg: {e}")))?;

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| RasterError::media("ffmpeg stdout unavailable"))?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| RasterError::media("ffmpeg stderr unavailable"))?;

    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let mut data = Vec::new();
        let mut log = String::new();
        let res = stdout
            .read_to_end(&mut data)
            .and_then(|_| stderr.read_to_string(&mut log));
        let _ = tx.send(res.map(|_| (data, log)));
    });

    let (data, log) = match rx.recv_timeout(timeout) {
        Ok(Ok(v)) => v,
        Ok(Err(e)) => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(RasterError::media(format!("read ffmpeg output: {e}")));
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(SeekOutcome::TimedOut);
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            let _ = child.wait();
            return Err(RasterError::media("ffmpeg reader thread exited"));
        }
    };

    let status = child
        .wait()
        .map_err(|e| RasterError::media(format!("wait for ffmpeg: {e}")))?;
    if !status.success() {
        return Err(RasterError::media(format!(
            "ffmpeg frame decode failed at {time_sec:.3}s for '{}': {}",
            path.display(),
            log.trim()
        )));
    }

    let expected = info.width as usize * info.height as usize * 4;
    if expected == 0 || data.len() < expected {
        return Err(RasterError::media(format!(
            "decoded frame has invalid size: got {} bytes, expected {expected}",
            data.len()
        )));
    }
    let mut data = data;
    data.truncate(expected);
    Ok(SeekOutcome::Decoded(Bitmap::from_rgba8(
        info.width,
        info.height,
        data,
    )?))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/media.rs"]
mod tests;
