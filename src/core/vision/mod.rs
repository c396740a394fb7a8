//! 视觉转写端口 - 把幻灯片帧交给视觉模型读出文字

use std::cell::Cell;
use std::collections::HashMap;

use thiserror::Error;

use crate::core::video::Frame;

pub mod ollama;

pub use ollama::OllamaVisionAdapter;

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("HTTP 请求失败: {0}")]
    Http(#[from] reqwest::Error),
    #[error("响应 JSON 解析失败: {0}")]
    Json(#[from] serde_json::Error),
    #[error("图片编码失败: {0}")]
    Encode(String),
    #[error("视觉模型调用失败: {0}")]
    Api(String),
}

/// 视觉转写端口
///
/// 具体模型（Ollama、云端 API 等）可替换，调用方把每帧的
/// 转写失败当作尽力而为的单项跳过，不影响整体流程。
pub trait VisionTranscriber {
    fn transcribe_image(&self, frame: &Frame, prompt: &str) -> Result<String, VisionError>;
}

/// 返回预置文本的 fake，测试用
pub struct FakeVisionTranscriber {
    default_response: String,
    responses_by_prompt: HashMap<String, String>,
    should_fail: bool,
    calls: Cell<u32>,
}

impl FakeVisionTranscriber {
    pub fn new(default_response: impl Into<String>) -> Self {
        Self {
            default_response: default_response.into(),
            responses_by_prompt: HashMap::new(),
            should_fail: false,
            calls: Cell::new(0),
        }
    }

    pub fn with_response_for_prompt(mut self, prompt: impl Into<String>, response: impl Into<String>) -> Self {
        self.responses_by_prompt.insert(prompt.into(), response.into());
        self
    }

    pub fn failing() -> Self {
        Self {
            default_response: String::new(),
            responses_by_prompt: HashMap::new(),
            should_fail: true,
            calls: Cell::new(0),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.calls.get()
    }
}

impl VisionTranscriber for FakeVisionTranscriber {
    fn transcribe_image(&self, _frame: &Frame, prompt: &str) -> Result<String, VisionError> {
        self.calls.set(self.calls.get() + 1);
        if self.should_fail {
            return Err(VisionError::Api("fake transcription failure".into()));
        }
        Ok(self
            .responses_by_prompt
            .get(prompt)
            .cloned()
            .unwrap_or_else(|| self.default_response.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Frame {
        Frame::new(0, 0.0, 4, 4, vec![128; 4 * 4 * 3])
    }

    #[test]
    fn test_fake_returns_default_response() {
        let fake = FakeVisionTranscriber::new("slide text");
        let text = fake.transcribe_image(&frame(), "any prompt").unwrap();
        assert_eq!(text, "slide text");
        assert_eq!(fake.call_count(), 1);
    }

    #[test]
    fn test_fake_matches_prompt_specific_response() {
        let fake = FakeVisionTranscriber::new("default")
            .with_response_for_prompt("read headings", "Heading A");
        assert_eq!(fake.transcribe_image(&frame(), "read headings").unwrap(), "Heading A");
        assert_eq!(fake.transcribe_image(&frame(), "other").unwrap(), "default");
    }

    #[test]
    fn test_failing_fake_errors() {
        let fake = FakeVisionTranscriber::failing();
        assert!(fake.transcribe_image(&frame(), "p").is_err());
    }
}
