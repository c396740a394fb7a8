//! 一站式转写入口 - 用 ffmpeg 适配器串起整条流水线

use crate::core::transcript::{
    ProcessOptions, TranscribeError, TranscriberConfig, TranscriptResult, VideoTranscriber,
};
use crate::core::video::FfmpegVideoReader;
use crate::core::vision::OllamaVisionAdapter;

/// 视觉转写配置
#[derive(Debug, Clone)]
pub struct VisionOptions {
    /// Ollama 服务地址，例如 http://localhost:11434
    pub base_url: String,
    /// 视觉模型名，例如 llava
    pub model: String,
    /// 自定义提示词，空则用默认
    pub prompt: Option<String>,
}

/// 一站式转写选项
#[derive(Debug, Clone)]
pub struct TranscribeOptions {
    /// 每 N 帧检查一次变化
    pub sample_interval: u64,
    /// 相似度高于等于该值的帧视为重复（0-1）
    pub similarity_threshold: f32,
    /// 两次捕获之间的最小帧数间隔
    pub min_frame_interval: u64,
    /// 只转写音频，不抽帧
    pub audio_only: bool,
    /// 配置后启用视觉转写
    pub vision: Option<VisionOptions>,
    /// sherpa-ncnn 模型目录（含 sherpa-ncnn/ 与 silero-vad/），
    /// 配置后启用语音转写
    #[cfg(feature = "sherpa")]
    pub asr_models_dir: Option<String>,
}

impl Default for TranscribeOptions {
    fn default() -> Self {
        Self {
            sample_interval: 30,
            similarity_threshold: 0.92,
            min_frame_interval: 15,
            audio_only: false,
            vision: None,
            #[cfg(feature = "sherpa")]
            asr_models_dir: None,
        }
    }
}

/// 转写一个视频文件，返回关键帧 + 时间线归并后的语音段
///
/// 视频源读取失败会让整个调用失败；视觉/语音增强失败只降级。
/// 报告渲染（markdown、zip 等）由调用方基于返回值自行处理。
pub fn transcribe_video(
    video_path: &str,
    options: TranscribeOptions,
) -> Result<TranscriptResult, TranscribeError> {
    let mut transcriber = VideoTranscriber::new(Box::new(FfmpegVideoReader::new())).with_config(
        TranscriberConfig {
            similarity_threshold: options.similarity_threshold,
            min_frame_interval: options.min_frame_interval,
        },
    );

    let mut prompt = None;
    let transcribe_visuals = options.vision.is_some();
    if let Some(vision) = &options.vision {
        prompt = vision.prompt.clone();
        transcriber = transcriber.with_vision(Box::new(OllamaVisionAdapter::new(
            vision.base_url.clone(),
            vision.model.clone(),
        )));
    }

    #[cfg(feature = "sherpa")]
    let (transcriber, transcribe_audio) =
        attach_sherpa_audio(transcriber, options.asr_models_dir.as_deref());
    #[cfg(not(feature = "sherpa"))]
    let transcribe_audio = false;

    let process_options = ProcessOptions {
        sample_interval: options.sample_interval,
        prompt,
        transcribe_visuals,
        transcribe_audio,
        extract_frames: !options.audio_only,
    };

    transcriber.process_video(video_path, &process_options)
}

/// 模型装不上按无音频继续，帧流水线照常工作
#[cfg(feature = "sherpa")]
fn attach_sherpa_audio(
    transcriber: VideoTranscriber,
    models_dir: Option<&str>,
) -> (VideoTranscriber, bool) {
    use crate::core::audio::{FfmpegAudioExtractor, SherpaAudioTranscriber};
    use log::warn;

    if let Some(dir) = models_dir {
        match SherpaAudioTranscriber::new(dir) {
            Ok(asr) => {
                let transcriber = transcriber
                    .with_audio(Box::new(FfmpegAudioExtractor::new()), Box::new(asr));
                return (transcriber, true);
            }
            Err(e) => warn!("⚠️ ASR model load failed, continuing without audio: {}", e),
        }
    }
    (transcriber, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_match_pipeline_defaults() {
        let options = TranscribeOptions::default();
        assert_eq!(options.sample_interval, 30);
        assert_eq!(options.similarity_threshold, 0.92);
        assert_eq!(options.min_frame_interval, 15);
        assert!(!options.audio_only);
        assert!(options.vision.is_none());
    }

    #[test]
    fn test_missing_video_fails_with_video_error() {
        let result = transcribe_video("/definitely/not/here.mp4", TranscribeOptions::default());
        assert!(matches!(result, Err(TranscribeError::Video(_))));
    }
}
