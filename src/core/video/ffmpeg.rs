//! ffmpeg/ffprobe 视频读取适配器
//!
//! 元数据走 ffprobe 的 JSON 输出，帧数据走 ffmpeg 子进程的
//! rawvideo 管道（RGB24），边读边产出，不落盘。

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use log::{debug, warn};
use serde::Deserialize;

use super::error::VideoError;
use super::frame::{Frame, VideoMetadata};
use super::reader::{FrameIter, VideoReader};

/// 基于 ffmpeg CLI 的视频读取器
#[derive(Debug, Default)]
pub struct FfmpegVideoReader;

impl FfmpegVideoReader {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    nb_frames: Option<String>,
}

/// 解析 "30000/1001" 形式的帧率
fn parse_rate(rate: &str) -> Option<f64> {
    match rate.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                None
            } else {
                Some(num / den)
            }
        }
        None => rate.trim().parse().ok(),
    }
}

fn metadata_from_probe_json(path: &Path, json: &[u8]) -> Result<VideoMetadata, VideoError> {
    let probe: FfprobeOutput = serde_json::from_slice(json)?;

    let stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type == "video")
        .ok_or_else(|| VideoError::SourceUnreadable {
            path: path.to_path_buf(),
            reason: "no video stream".into(),
        })?;

    let fps = stream
        .avg_frame_rate
        .as_deref()
        .and_then(parse_rate)
        .filter(|f| *f > 0.0)
        .or_else(|| stream.r_frame_rate.as_deref().and_then(parse_rate))
        .filter(|f| *f > 0.0)
        .ok_or_else(|| VideoError::SourceUnreadable {
            path: path.to_path_buf(),
            reason: "no usable frame rate".into(),
        })?;

    let duration = probe
        .format
        .duration
        .as_deref()
        .and_then(|d| d.trim().parse::<f64>().ok())
        .unwrap_or(0.0);

    let total_frames = stream
        .nb_frames
        .as_deref()
        .and_then(|n| n.trim().parse::<u64>().ok())
        .unwrap_or_else(|| (duration * fps) as u64);

    Ok(VideoMetadata {
        width: stream.width.unwrap_or(0),
        height: stream.height.unwrap_or(0),
        fps,
        total_frames,
        duration_seconds: duration,
    })
}

impl VideoReader for FfmpegVideoReader {
    fn metadata(&self, video_path: &str) -> Result<VideoMetadata, VideoError> {
        let path = Path::new(video_path);
        if !path.exists() {
            return Err(VideoError::SourceUnreadable {
                path: path.to_path_buf(),
                reason: "file not found".into(),
            });
        }
        which::which("ffprobe").map_err(|_| VideoError::BinaryNotFound("ffprobe"))?;

        let output = Command::new("ffprobe")
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(video_path)
            .stdin(Stdio::null())
            .output()?;

        if !output.status.success() {
            return Err(VideoError::SourceUnreadable {
                path: path.to_path_buf(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        metadata_from_probe_json(path, &output.stdout)
    }

    fn read_frames(&self, video_path: &str, sample_interval: u64) -> Result<FrameIter, VideoError> {
        let meta = self.metadata(video_path)?;
        if meta.width == 0 || meta.height == 0 {
            return Err(VideoError::SourceUnreadable {
                path: PathBuf::from(video_path),
                reason: "stream reports zero dimensions".into(),
            });
        }
        which::which("ffmpeg").map_err(|_| VideoError::BinaryNotFound("ffmpeg"))?;

        debug!(
            "🎬 ffmpeg rawvideo pipe: {} ({}x{} @ {:.2}fps)",
            video_path, meta.width, meta.height, meta.fps
        );

        let mut child = Command::new("ffmpeg")
            .args(["-v", "error", "-i"])
            .arg(video_path)
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24", "pipe:1"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let stdout = child.stdout.take().ok_or_else(|| {
            VideoError::SourceUnreadable {
                path: PathBuf::from(video_path),
                reason: "ffmpeg stdout unavailable".into(),
            }
        })?;

        Ok(Box::new(RawFrameStream {
            child,
            stdout,
            path: PathBuf::from(video_path),
            width: meta.width,
            height: meta.height,
            fps: meta.fps,
            sample_interval: sample_interval.max(1),
            next_number: 0,
            done: false,
        }))
    }
}

/// rawvideo 管道上的帧流。消费方提前停止时 Drop 负责杀掉子进程。
struct RawFrameStream {
    child: Child,
    stdout: ChildStdout,
    path: PathBuf,
    width: u32,
    height: u32,
    fps: f64,
    sample_interval: u64,
    next_number: u64,
    done: bool,
}

impl RawFrameStream {
    fn frame_size(&self) -> usize {
        (self.width * self.height * 3) as usize
    }

    fn finish(&mut self) -> Option<VideoError> {
        self.done = true;
        match self.child.wait() {
            Ok(status) if status.success() => None,
            Ok(status) => Some(VideoError::SourceUnreadable {
                path: self.path.clone(),
                reason: format!("ffmpeg exited with {}", status),
            }),
            Err(e) => Some(VideoError::Io(e)),
        }
    }
}

impl Iterator for RawFrameStream {
    type Item = Result<Frame, VideoError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }

            let mut buf = vec![0u8; self.frame_size()];
            match self.stdout.read_exact(&mut buf) {
                Ok(()) => {
                    let number = self.next_number;
                    self.next_number += 1;
                    if number % self.sample_interval != 0 {
                        continue; // 解码了但不在采样点上
                    }
                    let timestamp = number as f64 / self.fps;
                    return Some(Ok(Frame::new(number, timestamp, self.width, self.height, buf)));
                }
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    return self.finish().map(Err);
                }
                Err(e) => {
                    self.done = true;
                    let _ = self.child.kill();
                    let _ = self.child.wait();
                    return Some(Err(VideoError::Io(e)));
                }
            }
        }
    }
}

impl Drop for RawFrameStream {
    fn drop(&mut self) {
        if !self.done {
            warn!("⏹️ frame stream dropped early, killing ffmpeg");
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}
