//! 音轨提取端口 - 从视频里抽出适合语音识别的 WAV

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::info;

use super::error::AudioError;

/// 音轨提取端口。输出 WAV（默认 16kHz 单声道 PCM16）。
pub trait AudioExtractor {
    /// 提取音轨，`output_path` 为空时写入临时文件，返回实际输出路径
    fn extract_audio(
        &self,
        video_path: &str,
        output_path: Option<&Path>,
    ) -> Result<PathBuf, AudioError>;
}

/// 调用 ffmpeg 子进程做音轨提取
pub struct FfmpegAudioExtractor {
    sample_rate: u32,
    channels: u32,
}

impl FfmpegAudioExtractor {
    pub fn new() -> Self {
        Self {
            sample_rate: 16_000,
            channels: 1,
        }
    }

    pub fn with_format(sample_rate: u32, channels: u32) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }
}

impl Default for FfmpegAudioExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioExtractor for FfmpegAudioExtractor {
    fn extract_audio(
        &self,
        video_path: &str,
        output_path: Option<&Path>,
    ) -> Result<PathBuf, AudioError> {
        which::which("ffmpeg")
            .map_err(|_| AudioError::Extraction("ffmpeg not found on PATH".into()))?;

        let output = match output_path {
            Some(p) => p.to_path_buf(),
            None => tempfile::Builder::new()
                .prefix("lecture_audio_")
                .suffix(".wav")
                .tempfile()?
                .into_temp_path()
                .keep()
                .map_err(|e| AudioError::Io(e.error))?,
        };

        info!("🎵 Extracting audio: {} -> {}", video_path, output.display());

        let result = Command::new("ffmpeg")
            .args(["-y", "-i"])
            .arg(video_path)
            .args(["-vn", "-acodec", "pcm_s16le"])
            .args(["-ar", &self.sample_rate.to_string()])
            .args(["-ac", &self.channels.to_string()])
            .arg(&output)
            .stdin(Stdio::null())
            .output()?;

        if !result.status.success() {
            return Err(AudioError::Extraction(format!(
                "ffmpeg exited with {}: {}",
                result.status,
                String::from_utf8_lossy(&result.stderr).trim()
            )));
        }

        if !output.exists() {
            return Err(AudioError::Extraction(format!(
                "ffmpeg succeeded but output file not created: {}",
                output.display()
            )));
        }

        Ok(output)
    }
}

/// 不做真实提取的 fake，测试用
pub struct FakeAudioExtractor {
    audio_file_path: PathBuf,
    should_fail: bool,
    calls: Cell<u32>,
}

impl FakeAudioExtractor {
    pub fn new(audio_file_path: impl Into<PathBuf>) -> Self {
        Self {
            audio_file_path: audio_file_path.into(),
            should_fail: false,
            calls: Cell::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            audio_file_path: PathBuf::new(),
            should_fail: true,
            calls: Cell::new(0),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.calls.get()
    }
}

impl AudioExtractor for FakeAudioExtractor {
    fn extract_audio(
        &self,
        _video_path: &str,
        output_path: Option<&Path>,
    ) -> Result<PathBuf, AudioError> {
        self.calls.set(self.calls.get() + 1);
        if self.should_fail {
            return Err(AudioError::Extraction("fake extraction failure".into()));
        }
        Ok(output_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.audio_file_path.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fake_returns_configured_path() {
        let fake = FakeAudioExtractor::new("/tmp/fake_audio.wav");
        let path = fake.extract_audio("video.mp4", None).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/fake_audio.wav"));
        assert_eq!(fake.call_count(), 1);
    }

    #[test]
    fn test_fake_prefers_explicit_output_path() {
        let fake = FakeAudioExtractor::new("/tmp/fake_audio.wav");
        let path = fake
            .extract_audio("video.mp4", Some(Path::new("/tmp/explicit.wav")))
            .unwrap();
        assert_eq!(path, PathBuf::from("/tmp/explicit.wav"));
    }

    #[test]
    fn test_failing_fake_errors() {
        let fake = FakeAudioExtractor::failing();
        assert!(matches!(
            fake.extract_audio("video.mp4", None),
            Err(AudioError::Extraction(_))
        ));
        assert_eq!(fake.call_count(), 1);
    }
}
