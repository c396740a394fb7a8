//! Ollama 视觉模型适配器（llava 系列）

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use log::debug;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{VisionError, VisionTranscriber};
use crate::core::video::Frame;

/// 上传前的最长边限制，超过则按比例缩小
const MAX_IMAGE_SIDE: u32 = 1280;

pub struct OllamaVisionAdapter {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    images: Vec<String>,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

impl OllamaVisionAdapter {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .unwrap();
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    fn encode_frame(&self, frame: &Frame) -> Result<String, VisionError> {
        let frame = match scaled_size(frame.width, frame.height, MAX_IMAGE_SIDE) {
            Some((w, h)) => frame
                .resize_to(w, h)
                .map_err(|e| VisionError::Encode(e.to_string()))?,
            None => frame.clone(),
        };
        let png = frame
            .encode_png()
            .map_err(|e| VisionError::Encode(e.to_string()))?;
        Ok(BASE64.encode(png))
    }
}

impl VisionTranscriber for OllamaVisionAdapter {
    fn transcribe_image(&self, frame: &Frame, prompt: &str) -> Result<String, VisionError> {
        let encoded = self.encode_frame(frame)?;
        debug!(
            "🖼️ Ollama vision request: model={} frame #{}",
            self.model, frame.frame_number
        );

        let request = GenerateRequest {
            model: &self.model,
            prompt,
            images: vec![encoded],
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .header("content-type", "application/json")
            .body(serde_json::to_string(&request)?)
            .send()?
            .error_for_status()?;

        let body: GenerateResponse = serde_json::from_str(&response.text()?)?;
        Ok(body.response.unwrap_or_default())
    }
}

/// 需要缩放时返回目标尺寸，否则 None
fn scaled_size(width: u32, height: u32, max_side: u32) -> Option<(u32, u32)> {
    let longest = width.max(height);
    if longest <= max_side {
        return None;
    }
    let scale = max_side as f64 / longest as f64;
    Some((
        ((width as f64 * scale).round() as u32).max(1),
        ((height as f64 * scale).round() as u32).max(1),
    ))
}
