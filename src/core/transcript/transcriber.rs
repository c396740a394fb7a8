//! 视频转写用例 - 端口注入的编排层
//!
//! 关键帧筛选是硬约束：视频源读不出来整个调用失败。
//! 视觉转写与音频转写是可选增强，单项失败只记日志不中断。

use log::{info, warn};
use thiserror::Error;

use super::models::{AudioSegment, FrameResult, TranscriptResult};
use super::timeline::assign_segments;
use crate::core::audio::{AudioExtractor, AudioTranscriber};
use crate::core::video::{
    select_distinct_frames, DistinctFrames, FrameIter, SelectorConfig, VideoError, VideoReader,
};
use crate::core::vision::VisionTranscriber;

pub const DEFAULT_VISION_PROMPT: &str = "Transcribe all text visible in this presentation slide. \
    Include headings, bullet points, and any other text. Format it clearly.";

#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error("video error: {0}")]
    Video(#[from] VideoError),
}

/// 转写配置
#[derive(Debug, Clone)]
pub struct TranscriberConfig {
    /// 相似度高于等于该值的帧视为重复（0-1）
    pub similarity_threshold: f32,
    /// 两次捕获之间的最小帧数间隔
    pub min_frame_interval: u64,
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.92,
            min_frame_interval: 15,
        }
    }
}

/// 单次处理的选项
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// 每 N 帧检查一次变化
    pub sample_interval: u64,
    /// 视觉转写提示词，空则用默认
    pub prompt: Option<String>,
    pub transcribe_visuals: bool,
    pub transcribe_audio: bool,
    /// false 表示纯音频模式，不抽帧
    pub extract_frames: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            sample_interval: 30,
            prompt: None,
            transcribe_visuals: true,
            transcribe_audio: true,
            extract_frames: true,
        }
    }
}

/// 视频转写用例
pub struct VideoTranscriber {
    video_reader: Box<dyn VideoReader>,
    vision: Option<Box<dyn VisionTranscriber>>,
    audio_extractor: Option<Box<dyn AudioExtractor>>,
    audio_transcriber: Option<Box<dyn AudioTranscriber>>,
    config: TranscriberConfig,
}

impl VideoTranscriber {
    pub fn new(video_reader: Box<dyn VideoReader>) -> Self {
        Self {
            video_reader,
            vision: None,
            audio_extractor: None,
            audio_transcriber: None,
            config: TranscriberConfig::default(),
        }
    }

    pub fn with_config(mut self, config: TranscriberConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_vision(mut self, vision: Box<dyn VisionTranscriber>) -> Self {
        self.vision = Some(vision);
        self
    }

    pub fn with_audio(
        mut self,
        extractor: Box<dyn AudioExtractor>,
        transcriber: Box<dyn AudioTranscriber>,
    ) -> Self {
        self.audio_extractor = Some(extractor);
        self.audio_transcriber = Some(transcriber);
        self
    }

    /// 惰性抽取关键帧流。每次调用从全新选择器状态开始。
    pub fn extract_distinct_frames(
        &self,
        video_path: &str,
        sample_interval: u64,
    ) -> Result<DistinctFrames<FrameIter>, VideoError> {
        let frames = self.video_reader.read_frames(video_path, sample_interval)?;
        Ok(select_distinct_frames(
            frames,
            SelectorConfig {
                similarity_threshold: self.config.similarity_threshold,
                min_frame_interval: self.config.min_frame_interval,
            },
        ))
    }

    /// 处理整个视频：关键帧 + 可选视觉转写 + 可选语音转写 + 时间线归并
    pub fn process_video(
        &self,
        video_path: &str,
        options: &ProcessOptions,
    ) -> Result<TranscriptResult, TranscribeError> {
        let prompt = options.prompt.as_deref().unwrap_or(DEFAULT_VISION_PROMPT);

        let mut frames: Vec<FrameResult> = Vec::new();
        if options.extract_frames {
            for captured in self.extract_distinct_frames(video_path, options.sample_interval)? {
                let mut result = FrameResult::new(captured?);

                if options.transcribe_visuals {
                    if let Some(vision) = &self.vision {
                        match vision.transcribe_image(&result.captured.frame, prompt) {
                            Ok(text) => result.transcription = Some(text),
                            Err(e) => warn!(
                                "⚠️ Vision transcription failed for frame {}: {}",
                                result.frame_number(),
                                e
                            ),
                        }
                    }
                }

                frames.push(result);
            }
            info!("🖼️ {} distinct frames captured from {}", frames.len(), video_path);
        }

        let audio_segments = if options.transcribe_audio {
            self.transcribe_audio_best_effort(video_path)
        } else {
            Vec::new()
        };

        assign_segments(&mut frames, &audio_segments);

        Ok(TranscriptResult {
            frames,
            audio_segments,
        })
    }

    /// 音频链路：提取或转写任一步失败都降级为"没有音频"
    fn transcribe_audio_best_effort(&self, video_path: &str) -> Vec<AudioSegment> {
        let (extractor, transcriber) = match (&self.audio_extractor, &self.audio_transcriber) {
            (Some(e), Some(t)) => (e, t),
            _ => return Vec::new(),
        };

        let audio_path = match extractor.extract_audio(video_path, None) {
            Ok(path) => path,
            Err(e) => {
                warn!("⚠️ Audio extraction failed, continuing without audio: {}", e);
                return Vec::new();
            }
        };

        match transcriber.transcribe_audio(&audio_path.to_string_lossy()) {
            Ok(segments) => {
                info!("🎙️ {} audio segments transcribed", segments.len());
                segments
            }
            Err(e) => {
                warn!("⚠️ Audio transcription failed, continuing without audio: {}", e);
                Vec::new()
            }
        }
    }
}
