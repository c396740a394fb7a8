use super::error::VideoError;
use super::frame::{Frame, VideoMetadata};

/// 帧迭代器 - 惰性、可失败
pub type FrameIter = Box<dyn Iterator<Item = Result<Frame, VideoError>> + Send>;

/// 视频读取端口
///
/// 屏蔽具体解码实现（ffmpeg 子进程、测试 fake 等），
/// 保证帧号严格递增、时间戳由帧号与帧率推出。
pub trait VideoReader {
    fn metadata(&self, video_path: &str) -> Result<VideoMetadata, VideoError>;

    /// 按采样步长读帧，`sample_interval = 1` 表示逐帧。0 按 1 处理。
    fn read_frames(&self, video_path: &str, sample_interval: u64) -> Result<FrameIter, VideoError>;
}

/// 返回预置帧序列的 fake，测试用
pub struct FakeVideoReader {
    metadata: VideoMetadata,
    frames: Vec<Frame>,
}

impl FakeVideoReader {
    pub fn new(metadata: VideoMetadata, frames: Vec<Frame>) -> Self {
        Self { metadata, frames }
    }
}

impl VideoReader for FakeVideoReader {
    fn metadata(&self, _video_path: &str) -> Result<VideoMetadata, VideoError> {
        Ok(self.metadata.clone())
    }

    fn read_frames(&self, _video_path: &str, sample_interval: u64) -> Result<FrameIter, VideoError> {
        let step = sample_interval.max(1) as usize;
        let frames: Vec<Frame> = self
            .frames
            .iter()
            .enumerate()
            .filter(|(i, _)| i % step == 0)
            .map(|(_, f)| f.clone())
            .collect();
        Ok(Box::new(frames.into_iter().map(Ok)))
    }
}
