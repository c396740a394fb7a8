use std::io::Cursor;

use image::{ImageOutputFormat, RgbImage};

use super::error::VideoError;

/// 帧数据结构 - RGB24 紧凑排列
#[derive(Debug, Clone)]
pub struct Frame {
    pub frame_number: u64,
    pub timestamp_seconds: f64,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>, // RGB 格式，每像素 3 字节
}

impl Frame {
    pub fn new(
        frame_number: u64,
        timestamp_seconds: f64,
        width: u32,
        height: u32,
        data: Vec<u8>,
    ) -> Self {
        Self {
            frame_number,
            timestamp_seconds,
            width,
            height,
            data,
        }
    }

    pub fn pixel_count(&self) -> usize {
        (self.width * self.height) as usize
    }

    /// 校验像素数据与尺寸一致，哈希/编码前的入口检查
    pub fn validate(&self) -> Result<(), VideoError> {
        if self.width == 0 || self.height == 0 || self.data.is_empty() {
            return Err(VideoError::InvalidFrame("empty image".into()));
        }
        let expected = self.pixel_count() * 3;
        if self.data.len() != expected {
            return Err(VideoError::InvalidFrame(format!(
                "pixel buffer is {} bytes, expected {} for {}x{} RGB",
                self.data.len(),
                expected,
                self.width,
                self.height
            )));
        }
        Ok(())
    }

    /// 转换为灰度（亮度）平面
    pub fn to_gray(&self) -> Vec<u8> {
        self.data
            .chunks_exact(3)
            .map(|rgb| {
                let r = rgb[0] as u32;
                let g = rgb[1] as u32;
                let b = rgb[2] as u32;
                ((r * 299 + g * 587 + b * 114) / 1000) as u8
            })
            .collect()
    }

    pub fn resize_to(&self, target_width: u32, target_height: u32) -> Result<Frame, VideoError> {
        self.validate()?;
        let img = RgbImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| VideoError::InvalidFrame("pixel buffer mismatch".into()))?;
        let resized = image::imageops::resize(
            &img,
            target_width,
            target_height,
            image::imageops::FilterType::Triangle,
        );

        Ok(Frame {
            frame_number: self.frame_number,
            timestamp_seconds: self.timestamp_seconds,
            width: target_width,
            height: target_height,
            data: resized.into_raw(),
        })
    }

    /// 编码为 PNG 字节，供视觉模型与报告层使用
    pub fn encode_png(&self) -> Result<Vec<u8>, VideoError> {
        self.validate()?;
        let img = RgbImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| VideoError::InvalidFrame("pixel buffer mismatch".into()))?;
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageOutputFormat::Png)
            .map_err(|e| VideoError::Image(e.to_string()))?;
        Ok(buffer.into_inner())
    }
}

/// 视频元数据
#[derive(Debug, Clone, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: u64,
    pub duration_seconds: f64,
}
