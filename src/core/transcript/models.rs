use serde::{Deserialize, Serialize};

use crate::core::video::CapturedFrame;

/// 一段带时间戳的语音转写文本，半开区间 [start, end)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioSegment {
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub text: String,
}

impl AudioSegment {
    pub fn new(start_seconds: f64, end_seconds: f64, text: impl Into<String>) -> Self {
        Self {
            start_seconds,
            end_seconds,
            text: text.into(),
        }
    }
}

/// 一张已捕获帧及其附属内容：视觉转写 + 归属到它时间窗内的语音段
#[derive(Debug, Clone)]
pub struct FrameResult {
    pub captured: CapturedFrame,
    pub transcription: Option<String>,
    pub audio_segments: Vec<AudioSegment>,
}

impl FrameResult {
    pub fn new(captured: CapturedFrame) -> Self {
        Self {
            captured,
            transcription: None,
            audio_segments: Vec::new(),
        }
    }

    pub fn frame_number(&self) -> u64 {
        self.captured.frame_number()
    }

    pub fn timestamp_seconds(&self) -> f64 {
        self.captured.timestamp_seconds()
    }
}

/// 完整转写结果：有序关键帧 + 完整的扁平语音段列表
///
/// 报告层只消费这个结构；没有任何关键帧时语音段仍完整保留
/// （纯音频结果由调用方决定如何呈现）。
#[derive(Debug, Clone, Default)]
pub struct TranscriptResult {
    pub frames: Vec<FrameResult>,
    pub audio_segments: Vec<AudioSegment>,
}
